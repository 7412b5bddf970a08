//! Real service spawner
//!
//! Resolves the external runner executable once per supervisor lifetime,
//! then invokes it per command with the object id exported into the child's
//! environment.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::OnceLock;

use nix::unistd::Pid;
use shared::{process_debug, ObjectId, Role, OBJECT_ID_ENV, RUNNER_BIN, RUNNER_ENV};
use tokio::process::Command;

use crate::error::{ServiceWorkerError, ServiceWorkerResult};
use crate::traits::{ServiceSpawner, SpawnedService};

/// Real service spawner implementation
pub struct RealServiceSpawner {
    /// Runner path, resolved on first use and cached for this lifetime
    runner: OnceLock<PathBuf>,
}

impl RealServiceSpawner {
    pub fn new() -> Self {
        Self {
            runner: OnceLock::new(),
        }
    }

    /// Pin the runner executable instead of resolving it (fluent API)
    pub fn with_runner(self, path: PathBuf) -> Self {
        let _ = self.runner.set(path);
        self
    }

    /// Resolve the runner: env override, then PATH; cached after first use
    fn resolve_runner(&self) -> ServiceWorkerResult<&PathBuf> {
        if let Some(path) = self.runner.get() {
            return Ok(path);
        }

        let resolved = match std::env::var(RUNNER_ENV) {
            Ok(path) => PathBuf::from(path),
            Err(_) => search_path(RUNNER_BIN).ok_or_else(|| {
                ServiceWorkerError::runner(format!(
                    "{RUNNER_BIN} not on PATH and {RUNNER_ENV} not set"
                ))
            })?,
        };

        Ok(self.runner.get_or_init(|| resolved))
    }

    async fn spawn(&self, object_id: &ObjectId, args: Vec<String>) -> ServiceWorkerResult<SpawnedService> {
        let runner = self.resolve_runner()?;

        let mut cmd = Command::new(runner);
        cmd.args(&args)
            .env(OBJECT_ID_ENV, object_id.as_str())
            .stdin(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| ServiceWorkerError::spawn(format!("{}: {e}", runner.display())))?;
        let pid = child
            .id()
            .map(|id| Pid::from_raw(id as i32))
            .ok_or_else(|| ServiceWorkerError::spawn("service exited before its pid was recorded"))?;

        process_debug!(
            Role::current(),
            "🧩 Spawned runner for {} (pid {}): {} {}",
            object_id,
            pid,
            runner.display(),
            args.join(" ")
        );

        Ok(SpawnedService { pid, child })
    }
}

impl Default for RealServiceSpawner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ServiceSpawner for RealServiceSpawner {
    async fn spawn_add(&self, object_id: &ObjectId, args: &[String])
        -> ServiceWorkerResult<SpawnedService>
    {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("--".to_string());
        argv.extend_from_slice(args);
        self.spawn(object_id, argv).await
    }

    async fn spawn_restore(&self, object_id: &ObjectId) -> ServiceWorkerResult<SpawnedService> {
        let argv = vec!["--restore".to_string(), object_id.as_str().to_string()];
        self.spawn(object_id, argv).await
    }
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
