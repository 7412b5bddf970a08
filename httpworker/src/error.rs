//! HTTP-worker-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HttpWorkerError {
    #[error("Command dispatch failed: {message}")]
    CommandFailed { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Shared component error")]
    Shared(#[from] SharedError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpWorkerError {
    pub fn command(message: impl Into<String>) -> Self {
        Self::CommandFailed { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

pub type HttpWorkerResult<T> = Result<T, HttpWorkerError>;
