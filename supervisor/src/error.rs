//! Supervisor-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to spawn {role} worker: {message}")]
    WorkerSpawnFailed { role: String, message: String },

    #[error("No binary found for {role} worker: {message}")]
    BinaryNotFound { role: String, message: String },

    #[error("Shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SupervisorError {
    pub fn spawn(role: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::WorkerSpawnFailed {
            role: role.to_string(),
            message: message.into(),
        }
    }

    pub fn binary(role: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::BinaryNotFound {
            role: role.to_string(),
            message: message.into(),
        }
    }
}

pub type SupervisorResult<T> = Result<T, SupervisorError>;
