//! Trait definitions with mockall annotations for testing

use shared::ObjectId;

use crate::error::HttpWorkerResult;

/// Command dispatch seam between the HTTP handlers and the service channel
#[mockall::automock]
#[async_trait::async_trait]
pub trait CommandSink: Send + Sync {
    /// Queue a new service: frame the ADD command, write it, wake the worker
    async fn add(&self, object_id: &ObjectId, args: &[String]) -> HttpWorkerResult<()>;

    /// Queue a restore: frame the RESTORE command, write it, wake the worker
    async fn restore(&self, object_id: &ObjectId) -> HttpWorkerResult<()>;
}
