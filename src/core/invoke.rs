//! End-to-end control flow for one `rush-pnpm` invocation.
//!
//! configuration → classification → environment merge → spawn → post sync.
//! Nothing is spawned unless every earlier step passed.

use crate::core::config::{self, RushConfig};
use crate::core::environment::{self, EffectiveEnvironment};
use crate::core::error::RushPnpmError;
use crate::core::output;
use crate::core::policy::{self, PolicyDecision};
use crate::core::spawn::{SpawnRequest, Spawner};
use crate::core::sync;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Directory the wrapper was started from; the workspace is found above it.
    pub cwd: PathBuf,
    /// Tokens after the program name.
    pub args: Vec<String>,
    pub base_env: BTreeMap<String, String>,
}

#[derive(Debug)]
pub struct InvocationOutcome {
    pub exit_status: i32,
    pub failure_reason: Option<RushPnpmError>,
}

impl InvocationOutcome {
    /// Status used for every failure that is not PNPM's own exit code.
    pub const FAILURE_STATUS: i32 = 1;

    fn failed(reason: RushPnpmError) -> Self {
        Self {
            exit_status: Self::FAILURE_STATUS,
            failure_reason: Some(reason),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.exit_status == 0 && self.failure_reason.is_none()
    }
}

/// Run one invocation to completion. Never panics on user input and never
/// touches the process exit code; the caller does that once with
/// `exit_status`.
pub fn invoke(request: InvocationRequest, spawner: &dyn Spawner) -> InvocationOutcome {
    let mut outcome = InvocationOutcome {
        exit_status: InvocationOutcome::FAILURE_STATUS,
        failure_reason: None,
    };

    let InvocationRequest {
        cwd,
        mut args,
        base_env,
    } = request;

    let config = match resolve_config(&cwd) {
        Ok(config) => config,
        Err(e) => return InvocationOutcome::failed(report(e)),
    };

    let classification = policy::classify(&mut args);
    match &classification.decision {
        PolicyDecision::Allow => {}
        PolicyDecision::AllowWithWarning { advisory } => output::print_warning(advisory),
        PolicyDecision::Reject {
            diagnostic,
            advisory,
        } => {
            return InvocationOutcome::failed(report(RushPnpmError::PolicyRejected {
                diagnostic: diagnostic.clone(),
                advisory: advisory.clone(),
            }));
        }
    }

    let env = build_environment(&config, &base_env);
    let request = SpawnRequest {
        program: &config.layout.pnpm_binary,
        args: &args,
        env: &env,
    };

    match spawner.spawn_and_wait(&request) {
        Err(source) => {
            return InvocationOutcome::failed(RushPnpmError::SpawnFailed {
                program: config.layout.pnpm_binary.clone(),
                source,
            });
        }
        Ok(None) => {
            return InvocationOutcome::failed(RushPnpmError::NoExitStatus {
                program: config.layout.pnpm_binary.clone(),
            });
        }
        Ok(Some(code)) => outcome.exit_status = code,
    }

    if outcome.exit_status != 0 {
        tracing::debug!(exit_status = outcome.exit_status, "skipping post-invocation sync");
        return outcome;
    }

    if let Some(verb) = classification.verb.as_deref()
        && let Err(e) = sync::run_post_invocation(verb, &config.layout)
    {
        return InvocationOutcome::failed(e);
    }

    outcome
}

fn resolve_config(cwd: &std::path::Path) -> Result<RushConfig, RushPnpmError> {
    let root = config::find_workspace_root(cwd)?;
    tracing::debug!(root = %root.display(), "found workspace root");
    let config = RushConfig::load(&root)?;
    config.ensure_ready()?;
    Ok(config)
}

fn build_environment(
    config: &RushConfig,
    base_env: &BTreeMap<String, String>,
) -> EffectiveEnvironment {
    let store_dir = config.store_dir(base_env);
    environment::merge_environment(
        base_env,
        &config.layout.common_temp,
        store_dir.as_deref(),
        &config.environment_overrides,
    )
}

/// Print a precondition or policy failure where it happens and convert it
/// to `AlreadyReported`. Other errors pass through for the top-level handler.
fn report(err: RushPnpmError) -> RushPnpmError {
    match err {
        RushPnpmError::Precondition { message, hint } => {
            output::report_precondition(&message, &hint);
            RushPnpmError::AlreadyReported
        }
        RushPnpmError::PolicyRejected {
            diagnostic,
            advisory,
        } => {
            output::report_rejection(&diagnostic, advisory.as_deref());
            RushPnpmError::AlreadyReported
        }
        other => other,
    }
}
