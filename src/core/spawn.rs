//! Synchronous subprocess service.

use crate::core::environment::EffectiveEnvironment;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Copy)]
pub struct SpawnRequest<'a> {
    pub program: &'a Path,
    pub args: &'a [String],
    pub env: &'a EffectiveEnvironment,
}

/// Runs a child to completion.
///
/// `Ok(None)` means the child ended without an exit code (killed by a
/// signal on Unix). `Err` means it could not be started at all.
pub trait Spawner {
    fn spawn_and_wait(&self, request: &SpawnRequest<'_>) -> io::Result<Option<i32>>;
}

/// Real spawner: inherits stdin, stdout and stderr so interactive PNPM
/// prompts keep working.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    fn spawn_and_wait(&self, request: &SpawnRequest<'_>) -> io::Result<Option<i32>> {
        tracing::debug!(
            program = %request.program.display(),
            args = ?request.args,
            "spawning"
        );
        let status = Command::new(request.program)
            .args(request.args)
            .envs(request.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()?;
        tracing::debug!(?status, "child exited");
        Ok(status.code())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn reports_child_exit_code() {
        let env = BTreeMap::new();
        let args = vec!["-c".to_string(), "exit 7".to_string()];
        let request = SpawnRequest {
            program: Path::new("/bin/sh"),
            args: &args,
            env: &env,
        };
        assert_eq!(ProcessSpawner.spawn_and_wait(&request).unwrap(), Some(7));
    }

    #[test]
    fn passes_merged_environment() {
        let mut env = BTreeMap::new();
        env.insert("RUSH_PNPM_SPAWN_PROBE".to_string(), "42".to_string());
        let args = vec![
            "-c".to_string(),
            "test \"$RUSH_PNPM_SPAWN_PROBE\" = 42".to_string(),
        ];
        let request = SpawnRequest {
            program: Path::new("/bin/sh"),
            args: &args,
            env: &env,
        };
        assert_eq!(ProcessSpawner.spawn_and_wait(&request).unwrap(), Some(0));
    }

    #[test]
    fn signal_termination_has_no_exit_code() {
        let env = BTreeMap::new();
        let args = vec!["-c".to_string(), "kill -9 $$".to_string()];
        let request = SpawnRequest {
            program: Path::new("/bin/sh"),
            args: &args,
            env: &env,
        };
        assert_eq!(ProcessSpawner.spawn_and_wait(&request).unwrap(), None);
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let env = BTreeMap::new();
        let request = SpawnRequest {
            program: Path::new("/definitely/not/here/pnpm"),
            args: &[],
            env: &env,
        };
        assert!(ProcessSpawner.spawn_and_wait(&request).is_err());
    }
}
