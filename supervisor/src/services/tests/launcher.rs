//! Tests for RealWorkerLauncher
//!
//! Real spawns use stand-in worker scripts so the tests do not depend on the
//! sibling binaries being built.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use shared::command_channel;
use tempfile::TempDir;

use crate::error::SupervisorError;
use crate::services::launcher::{
    RealWorkerLauncher, HTTP_WORKER_BIN_ENV, IMAGE_WORKER_BIN_ENV,
};
use crate::traits::WorkerLauncher;
use shared::Role;

fn write_fake_worker(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, "#!/bin/sh\ntrap 'exit 0' TERM\nwhile :; do sleep 1; done\n").unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

#[tokio::test]
async fn test_spawn_commanded_worker_via_env_override() {
    Role::init_supervisor();
    let dir = TempDir::new().unwrap();
    let script = write_fake_worker(&dir, "fake-imageworker");
    std::env::set_var(IMAGE_WORKER_BIN_ENV, &script);

    let launcher = RealWorkerLauncher::new();
    let worker = launcher.spawn_image_worker().await.unwrap();

    assert_eq!(worker.handle.role, Role::ImageWorker);
    // The child is alive and owns the read end; the writer stays with us
    assert!(signal::kill(worker.handle.pid, None).is_ok());

    signal::kill(worker.handle.pid, Signal::SIGKILL).unwrap();
    let mut child = worker.handle.child;
    child.wait().await.unwrap();
}

#[tokio::test]
async fn test_missing_worker_binary_is_a_resolution_error() {
    Role::init_supervisor();
    // No env override, no sibling binary, nothing plausible on PATH
    let launcher = RealWorkerLauncher::new();
    let result = launcher.spawn_service_worker().await;

    assert!(matches!(result, Err(SupervisorError::BinaryNotFound { .. })));
}

#[tokio::test]
async fn test_unspawnable_binary_is_a_spawn_error() {
    Role::init_supervisor();
    std::env::set_var(HTTP_WORKER_BIN_ENV, "/nonexistent/httpworker");

    let (_image_read, image_writer) = command_channel().unwrap();
    let (_service_read, service_writer) = command_channel().unwrap();

    let launcher = RealWorkerLauncher::new();
    let result = launcher
        .spawn_http_worker(image_writer, service_writer, Pid::this())
        .await;

    assert!(matches!(result, Err(SupervisorError::WorkerSpawnFailed { .. })));
}
