//! Verb classification for arguments headed to PNPM.
//!
//! Only the leading verb is inspected; the rest of PNPM's grammar is opaque.
//! Rules run in a fixed order and the first match wins:
//! - `--rush-skip-checks` as the first token disables every check
//! - empty, help and bare version invocations pass straight through
//! - the first token must look like a verb
//! - `--rush-skip-checks` right after the verb also disables the table
//! - `--rush-skip-checks` anywhere else is rejected
//! - the verb policy table decides the rest

use regex::Regex;
use std::sync::LazyLock;

/// Bypass sentinel. Never forwarded to PNPM.
pub const SKIP_CHECKS_FLAG: &str = "--rush-skip-checks";

const HELP_FLAGS: [&str; 3] = ["-h", "--help", "-?"];
const VERSION_FLAGS: [&str; 2] = ["-v", "--version"];

static VERB_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+([a-z0-9-])*$").expect("static regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    Allow,
    AllowWithWarning {
        advisory: String,
    },
    Reject {
        diagnostic: String,
        advisory: Option<String>,
    },
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        !matches!(self, PolicyDecision::Reject { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbPolicy {
    /// Conflicts with how Rush manages the workspace.
    Blocked,
    /// Superseded by `rush install` / `rush update`.
    InstallFamily,
    /// Allowed, but may leave the workspace needing `rush update`.
    StateMutating,
    KnownSafe,
    Unknown,
}

impl VerbPolicy {
    pub fn of(verb: &str) -> Self {
        match verb {
            "import" => VerbPolicy::Blocked,
            "add" | "install" | "i" | "install-test" | "it" => VerbPolicy::InstallFamily,
            "link" | "ln" | "remove" | "rm" | "unlink" | "update" | "up" => {
                VerbPolicy::StateMutating
            }
            "audit" | "exec" | "list" | "ls" | "outdated" | "pack" | "patch" | "patch-commit"
            | "prune" | "publish" | "rebuild" | "rb" | "root" | "run" | "start" | "store"
            | "test" | "t" | "why" => VerbPolicy::KnownSafe,
            _ => VerbPolicy::Unknown,
        }
    }

    fn decide(self, verb: &str) -> PolicyDecision {
        match self {
            VerbPolicy::Blocked => PolicyDecision::Reject {
                diagnostic: format!(
                    "The \"pnpm {}\" command is incompatible with Rush's environment.",
                    verb
                ),
                advisory: Some(skip_checks_advisory()),
            },
            VerbPolicy::InstallFamily => PolicyDecision::Reject {
                diagnostic: format!(
                    "The \"pnpm {}\" command is incompatible with Rush's environment. \
                     Use the \"rush install\" or \"rush update\" commands instead.",
                    verb
                ),
                advisory: Some(skip_checks_advisory()),
            },
            VerbPolicy::StateMutating => PolicyDecision::AllowWithWarning {
                advisory: format!(
                    "Rush: The \"pnpm {}\" command may change the workspace state. \
                     Run \"rush update\" afterwards to resynchronize it.",
                    verb
                ),
            },
            VerbPolicy::KnownSafe => PolicyDecision::Allow,
            VerbPolicy::Unknown => PolicyDecision::Reject {
                diagnostic: format!(
                    "The \"pnpm {}\" command has not been tested with Rush's environment. \
                     It may be incompatible.",
                    verb
                ),
                advisory: Some(skip_checks_advisory()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub decision: PolicyDecision,
    /// The recognized verb, kept for post-invocation handling.
    pub verb: Option<String>,
}

impl Classification {
    fn pass_through(decision: PolicyDecision) -> Self {
        Self {
            decision,
            verb: None,
        }
    }
}

pub fn skip_checks_advisory() -> String {
    format!(
        "To bypass this check, add \"{}\" as the very first command line option.",
        SKIP_CHECKS_FLAG
    )
}

pub fn is_verb(token: &str) -> bool {
    VERB_PATTERN.is_match(token)
}

/// Classify `args`, removing the bypass sentinel when it is in an accepted
/// position. No other mutation happens.
pub fn classify(args: &mut Vec<String>) -> Classification {
    if args.first().map(String::as_str) == Some(SKIP_CHECKS_FLAG) {
        args.remove(0);
        tracing::debug!("checks skipped via leading {}", SKIP_CHECKS_FLAG);
        return Classification::pass_through(PolicyDecision::Allow);
    }

    let Some(first) = args.first().cloned() else {
        return Classification::pass_through(PolicyDecision::Allow);
    };

    if args.iter().any(|a| HELP_FLAGS.contains(&a.as_str())) {
        return Classification::pass_through(PolicyDecision::Allow);
    }

    if args.len() == 1 && VERSION_FLAGS.contains(&first.as_str()) {
        return Classification::pass_through(PolicyDecision::Allow);
    }

    if !is_verb(&first) {
        return Classification::pass_through(PolicyDecision::Reject {
            diagnostic: format!(
                "The \"rush-pnpm\" wrapper expects a command verb before \"{}\"",
                first
            ),
            advisory: Some(skip_checks_advisory()),
        });
    }

    let verb = first;

    if args.get(1).map(String::as_str) == Some(SKIP_CHECKS_FLAG) {
        args.remove(1);
        tracing::debug!(verb = %verb, "checks skipped via {} after verb", SKIP_CHECKS_FLAG);
        return Classification {
            decision: PolicyDecision::Allow,
            verb: Some(verb),
        };
    }

    // Past the verb the grammar belongs to PNPM, so a sentinel here cannot
    // be told apart from an option value.
    if args.iter().any(|a| a == SKIP_CHECKS_FLAG) {
        return Classification {
            decision: PolicyDecision::Reject {
                diagnostic: format!(
                    "The \"{}\" option must be the first parameter for the \"rush-pnpm\" command.",
                    SKIP_CHECKS_FLAG
                ),
                advisory: None,
            },
            verb: Some(verb),
        };
    }

    let policy = VerbPolicy::of(&verb);
    tracing::debug!(verb = %verb, ?policy, "classified verb");
    Classification {
        decision: policy.decide(&verb),
        verb: Some(verb),
    }
}
