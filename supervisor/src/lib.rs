//! Root supervisor for the host service runtime
//!
//! Spawns the three category workers (image, service, HTTP), wires the
//! command channels between them, and enforces the fail-fast policy: the
//! first unexpected worker exit - or an operator interrupt - terminates
//! every remaining worker exactly once.

pub mod error;
pub mod services;
pub mod supervisor;
pub mod traits;

// Re-export commonly used types
pub use error::{SupervisorError, SupervisorResult};
pub use services::{RealTerminator, RealWorkerLauncher};
pub use supervisor::RootSupervisor;
pub use traits::{CommandedWorker, Terminator, WorkerHandle, WorkerLauncher};
