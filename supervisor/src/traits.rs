//! Trait definitions with mockall annotations for testing
//!
//! These seams let the cascade policy and worker wiring be exercised
//! without spawning the real worker binaries.

use std::os::fd::OwnedFd;

use nix::unistd::Pid;
use shared::Role;
use tokio::process::Child;

use crate::error::SupervisorResult;

/// Parent-side record of one spawned worker
#[derive(Debug)]
pub struct WorkerHandle {
    pub role: Role,
    pub pid: Pid,
    pub child: Child,
}

/// A commanded worker: its handle plus the root-held write end of its
/// command channel. The write end stays here only until it is transferred
/// to the HTTP worker.
#[derive(Debug)]
pub struct CommandedWorker {
    pub handle: WorkerHandle,
    pub command_writer: OwnedFd,
}

/// Worker process creation - the only path that creates category workers
#[mockall::automock]
#[async_trait::async_trait]
pub trait WorkerLauncher: Send + Sync {
    /// Spawn the image worker holding the read end of a fresh command channel
    async fn spawn_image_worker(&self) -> SupervisorResult<CommandedWorker>;

    /// Spawn the service worker holding the read end of a fresh command channel
    async fn spawn_service_worker(&self) -> SupervisorResult<CommandedWorker>;

    /// Spawn the HTTP worker, handing it both command writer ends and the
    /// service worker's pid. The fds are inherited at spawn; the caller's
    /// copies are consumed here (ownership transfer).
    async fn spawn_http_worker(
        &self,
        image_writer: OwnedFd,
        service_writer: OwnedFd,
        service_pid: Pid,
    ) -> SupervisorResult<WorkerHandle>;
}

/// Termination-request seam, separate from the launcher so the one-shot
/// cascade sweep is observable in tests
#[mockall::automock]
pub trait Terminator: Send + Sync {
    /// Ask one process to terminate; best-effort, never waits
    fn request_termination(&self, pid: Pid);
}
