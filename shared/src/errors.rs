//! Shared error types for the daemon processes

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SharedError {
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    #[error("Channel error: {message}")]
    Channel { message: String },

    #[error("Signal handler setup failed: {message}")]
    Signal { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SharedError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol { message: message.into() }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel { message: message.into() }
    }

    pub fn signal(message: impl Into<String>) -> Self {
        Self::Signal { message: message.into() }
    }
}

pub type SharedResult<T> = Result<T, SharedError>;
