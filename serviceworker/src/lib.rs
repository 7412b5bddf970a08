//! Service worker for the host service runtime
//!
//! Supervises dynamically spawned service processes: decodes framed commands
//! arriving on the channel written by the HTTP worker, spawns the external
//! runner per command, and tracks every live service in an in-memory
//! registry. A single service dying is never fatal here - only the root
//! applies cascade policy.

pub mod anchor;
pub mod error;
pub mod registry;
pub mod services;
pub mod supervisor;
pub mod traits;

// Re-export commonly used types
pub use error::{ServiceWorkerError, ServiceWorkerResult};
pub use registry::ServiceRegistry;
pub use services::RealServiceSpawner;
pub use supervisor::ServiceSupervisor;
pub use traits::{ServiceSpawner, SpawnedService};
