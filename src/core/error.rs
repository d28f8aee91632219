use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RushPnpmError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Failed to parse {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },
    #[error("{message}")]
    Precondition { message: String, hint: String },
    #[error("{diagnostic}")]
    PolicyRejected {
        diagnostic: String,
        advisory: Option<String>,
    },
    #[error("Failed to invoke {program}: {source}")]
    SpawnFailed {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{program} terminated without reporting an exit status")]
    NoExitStatus { program: PathBuf },
    /// The failure was already printed where it happened; the top-level
    /// handler must only set the exit status.
    #[error("already reported")]
    AlreadyReported,
}

impl RushPnpmError {
    pub fn precondition(message: impl Into<String>, hint: impl Into<String>) -> Self {
        RushPnpmError::Precondition {
            message: message.into(),
            hint: hint.into(),
        }
    }

    pub fn is_already_reported(&self) -> bool {
        matches!(self, RushPnpmError::AlreadyReported)
    }
}
