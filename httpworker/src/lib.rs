//! HTTP control-plane worker for the host service runtime
//!
//! Owns the write ends of the worker command channels. The load-bearing
//! piece is the commander: one framed write followed by the wake signal is
//! the only contract the service worker relies on. The HTTP routing on top
//! is deliberately thin.

pub mod error;
pub mod services;
pub mod traits;
pub mod web;

// Re-export commonly used types
pub use error::{HttpWorkerError, HttpWorkerResult};
pub use services::RealServiceCommander;
pub use traits::CommandSink;
