//! rush-pnpm: run a Rush workspace's PNPM under Rush's rules.
//!
//! The wrapper sits between the user and the PNPM binary that `rush install`
//! placed in `common/temp`. For each invocation it:
//!
//! 1. checks the workspace is configured for PNPM workspaces and installed
//! 2. classifies the PNPM verb (rejecting commands that would fight Rush,
//!    warning on ones that leave state to resync)
//! 3. exports `NPM_CONFIG_WORKSPACE_DIR`, the store dir, and the workspace's
//!    configured environment variables
//! 4. runs PNPM with inherited stdio and forwards its exit code
//! 5. after a successful `patch-commit`, copies the patches and lockfile
//!    into their committed locations
//!
//! # Examples
//!
//! ```bash
//! rush-pnpm why react
//! rush-pnpm patch left-pad@1.3.0
//! rush-pnpm patch-commit /tmp/abc123
//! rush-pnpm --rush-skip-checks add left-pad   # bypass the policy table
//! ```
//!
//! Set `RUSH_PNPM_LOG=debug` to trace classification and spawning.
//!
//! # Crate Structure
//!
//! - [`core`]: policy engine, environment merge, invocation and sync

pub mod core;

use crate::core::environment;
use crate::core::error::RushPnpmError;
use crate::core::invoke::{self, InvocationOutcome, InvocationRequest};
use crate::core::output;
use crate::core::spawn::ProcessSpawner;
use tracing_subscriber::EnvFilter;

/// Filter directives for developer logging, e.g. `RUSH_PNPM_LOG=debug`.
pub const LOG_ENV_VAR: &str = "RUSH_PNPM_LOG";

/// Run the wrapper against the real process state. The returned outcome's
/// `exit_status` is what the process should exit with.
pub fn run() -> InvocationOutcome {
    init_logging();

    let outcome = match collect_args() {
        Ok(args) => match std::env::current_dir() {
            Ok(cwd) => invoke::invoke(
                InvocationRequest {
                    cwd,
                    args,
                    base_env: environment::process_environment(),
                },
                &ProcessSpawner,
            ),
            Err(e) => InvocationOutcome {
                exit_status: InvocationOutcome::FAILURE_STATUS,
                failure_reason: Some(RushPnpmError::IoError(e)),
            },
        },
        Err(e) => InvocationOutcome {
            exit_status: InvocationOutcome::FAILURE_STATUS,
            failure_reason: Some(e),
        },
    };

    report_failure(&outcome);
    outcome
}

/// Single top-level error handler. Failures printed where they happened
/// are skipped.
pub fn report_failure(outcome: &InvocationOutcome) {
    match &outcome.failure_reason {
        None => {}
        Some(e) if e.is_already_reported() => {}
        Some(e) => output::print_error(&format!("Error: {}", e)),
    }
}

fn collect_args() -> Result<Vec<String>, RushPnpmError> {
    std::env::args_os()
        .skip(1)
        .map(|arg| {
            arg.into_string().map_err(|raw| {
                output::report_precondition(
                    &format!("Argument is not valid UTF-8: {:?}", raw),
                    "Pass arguments as UTF-8 text.",
                );
                RushPnpmError::AlreadyReported
            })
        })
        .collect()
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
