//! Trait definitions with mockall annotations for testing

use nix::unistd::Pid;
use shared::ObjectId;
use tokio::process::Child;

use crate::error::ServiceWorkerResult;

/// One freshly spawned service child
#[derive(Debug)]
pub struct SpawnedService {
    pub pid: Pid,
    pub child: Child,
}

/// Service process creation seam
///
/// The real implementation resolves and invokes the external runner
/// executable; mocks let command handling be tested without spawning it.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ServiceSpawner: Send + Sync {
    /// Spawn the runner for a new service object with free-form arguments
    async fn spawn_add(&self, object_id: &ObjectId, args: &[String])
        -> ServiceWorkerResult<SpawnedService>;

    /// Respawn the runner for a service object known to the external source
    /// of truth
    async fn spawn_restore(&self, object_id: &ObjectId) -> ServiceWorkerResult<SpawnedService>;
}
