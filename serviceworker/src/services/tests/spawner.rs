//! Tests for RealServiceSpawner
//!
//! A stand-in runner script records its environment and argument vector so
//! the invocation contract can be asserted without the real runner.

use std::path::{Path, PathBuf};
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use shared::{ObjectId, Role, RUNNER_ENV};
use tempfile::TempDir;
use tokio::time::sleep;

use crate::error::ServiceWorkerError;
use crate::services::spawner::RealServiceSpawner;
use crate::traits::ServiceSpawner;

fn write_recording_runner(dir: &TempDir, out: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.path().join("service-runner");
    let script = format!(
        "#!/bin/sh\n{{\n  echo \"$SERVICE_OBJECT_ID\"\n  echo \"$@\"\n}} > {}\nsleep 30\n",
        out.display()
    );
    std::fs::write(&path, script).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

async fn read_recorded(path: &Path) -> Vec<String> {
    for _ in 0..50 {
        if let Ok(contents) = std::fs::read_to_string(path) {
            let lines: Vec<String> = contents.lines().map(str::to_string).collect();
            if lines.len() >= 2 {
                return lines;
            }
        }
        sleep(Duration::from_millis(50)).await;
    }
    panic!("runner never recorded its invocation at {}", path.display());
}

#[tokio::test]
async fn test_spawn_add_invocation_contract() {
    Role::init_service_worker();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("invocation");
    let runner = write_recording_runner(&dir, &out);

    let spawner = RealServiceSpawner::new().with_runner(runner);
    let service = spawner
        .spawn_add(&ObjectId::new("obj-1"), &["--flag".to_string(), "value".to_string()])
        .await
        .unwrap();

    let lines = read_recorded(&out).await;
    assert_eq!(lines[0], "obj-1");
    assert_eq!(lines[1], "-- --flag value");

    signal::kill(service.pid, Signal::SIGKILL).unwrap();
    let mut child = service.child;
    child.wait().await.unwrap();
}

#[tokio::test]
async fn test_spawn_restore_invocation_contract() {
    Role::init_service_worker();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("invocation");
    let runner = write_recording_runner(&dir, &out);

    let spawner = RealServiceSpawner::new().with_runner(runner);
    let service = spawner.spawn_restore(&ObjectId::new("obj-2")).await.unwrap();

    let lines = read_recorded(&out).await;
    assert_eq!(lines[0], "obj-2");
    assert_eq!(lines[1], "--restore obj-2");

    signal::kill(service.pid, Signal::SIGKILL).unwrap();
    let mut child = service.child;
    child.wait().await.unwrap();
}

#[tokio::test]
async fn test_runner_resolution_env_override_then_absent() {
    Role::init_service_worker();
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("invocation");
    let runner = write_recording_runner(&dir, &out);

    // With the override set, resolution finds the script and caches it
    std::env::set_var(RUNNER_ENV, &runner);
    let spawner = RealServiceSpawner::new();
    let service = spawner.spawn_restore(&ObjectId::new("obj-3")).await.unwrap();
    signal::kill(service.pid, Signal::SIGKILL).unwrap();
    let mut child = service.child;
    child.wait().await.unwrap();

    // Without it, a fresh spawner falls back to PATH and finds nothing
    std::env::remove_var(RUNNER_ENV);
    let fresh = RealServiceSpawner::new();
    let result = fresh.spawn_restore(&ObjectId::new("obj-4")).await;
    assert!(matches!(result, Err(ServiceWorkerError::RunnerNotFound { .. })));
}

#[tokio::test]
async fn test_unspawnable_runner_is_a_spawn_error() {
    Role::init_service_worker();
    let spawner = RealServiceSpawner::new().with_runner(PathBuf::from("/nonexistent/service-runner"));
    let result = spawner.spawn_add(&ObjectId::new("obj-5"), &[]).await;
    assert!(matches!(result, Err(ServiceWorkerError::SpawnFailed { .. })));
}
