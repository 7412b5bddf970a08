//! Service-worker-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceWorkerError {
    #[error("Failed to spawn service process: {message}")]
    SpawnFailed { message: String },

    #[error("Service runner not found: {message}")]
    RunnerNotFound { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceWorkerError {
    pub fn spawn(message: impl Into<String>) -> Self {
        Self::SpawnFailed { message: message.into() }
    }

    pub fn runner(message: impl Into<String>) -> Self {
        Self::RunnerNotFound { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

pub type ServiceWorkerResult<T> = Result<T, ServiceWorkerError>;
