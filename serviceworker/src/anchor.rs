//! Anchor process support
//!
//! The anchor is a no-op child the service supervisor keeps in its
//! supervised set so the set is never empty while no services are running.
//! It parks until asked to terminate and exits cleanly.

use std::process::Stdio;

use nix::unistd::Pid;
use tokio::process::Command;
use tokio::signal::unix::{signal, SignalKind};

use crate::error::{ServiceWorkerError, ServiceWorkerResult};
use crate::traits::SpawnedService;

/// Run as the anchor: wait for a termination request, then exit
pub async fn run() -> ServiceWorkerResult<()> {
    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;

    tokio::select! {
        _ = terminate.recv() => {}
        _ = interrupt.recv() => {}
    }
    Ok(())
}

/// Spawn the anchor by re-invoking this worker's own binary in anchor mode
pub async fn spawn() -> ServiceWorkerResult<SpawnedService> {
    let exe = std::env::current_exe()?;

    let child = Command::new(exe)
        .arg("--anchor")
        .stdin(Stdio::null())
        .spawn()
        .map_err(|e| ServiceWorkerError::spawn(format!("anchor: {e}")))?;
    let pid = child
        .id()
        .map(|id| Pid::from_raw(id as i32))
        .ok_or_else(|| ServiceWorkerError::spawn("anchor exited before its pid was recorded"))?;

    Ok(SpawnedService { pid, child })
}
