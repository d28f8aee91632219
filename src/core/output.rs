//! Terminal rendering for diagnostics and advisories.
//!
//! Everything goes to stderr so PNPM keeps exclusive use of stdout.

use colored::Colorize;

/// Hard failure text, printed in red.
pub fn print_error(message: &str) {
    eprintln!("{}", message.bright_red());
}

/// Advisory that does not stop the invocation.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".bright_yellow(), message.bright_yellow());
}

/// A precondition failure: the diagnostic followed by its one-line fix.
pub fn report_precondition(message: &str, hint: &str) {
    eprintln!();
    print_error(message);
    eprintln!("  {} {}", "▸".bright_cyan(), hint.bright_white());
    eprintln!();
}

/// A policy rejection: the diagnostic on the error stream, then the bypass
/// advisory (if any) on the warning stream.
pub fn report_rejection(diagnostic: &str, advisory: Option<&str>) {
    eprintln!();
    print_error(diagnostic);
    if let Some(advisory) = advisory {
        print_warning(advisory);
    }
    eprintln!();
}
