//! Real worker launcher
//!
//! Creates the command channels and spawns the worker binaries with explicit
//! role parameters. This is the only worker-creation path in the daemon; the
//! service worker's dynamic service spawns follow the same shape but target
//! the external runner executable instead of a sibling binary.

use std::os::fd::AsRawFd;
use std::os::fd::OwnedFd;
use std::path::PathBuf;
use std::process::Stdio;

use nix::unistd::Pid;
use shared::{command_channel, process_debug, set_inheritable, Role};
use tokio::process::{Child, Command};

use crate::error::{SupervisorError, SupervisorResult};
use crate::traits::{CommandedWorker, WorkerHandle, WorkerLauncher};

/// Environment overrides for worker binary locations
pub const IMAGE_WORKER_BIN_ENV: &str = "SUPERVISOR_IMAGEWORKER_BIN";
pub const SERVICE_WORKER_BIN_ENV: &str = "SUPERVISOR_SERVICEWORKER_BIN";
pub const HTTP_WORKER_BIN_ENV: &str = "SUPERVISOR_HTTPWORKER_BIN";

/// Real worker launcher implementation
pub struct RealWorkerLauncher {
    /// Log level to pass to spawned workers
    log_level: String,

    /// Listen port to pass to the HTTP worker
    http_port: u16,
}

impl RealWorkerLauncher {
    /// Create new launcher with default settings
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            http_port: 8080,
        }
    }

    /// Configure log level (fluent API)
    pub fn with_log_level(mut self, log_level: String) -> Self {
        self.log_level = log_level;
        self
    }

    /// Configure the HTTP worker port (fluent API)
    pub fn with_http_port(mut self, port: u16) -> Self {
        self.http_port = port;
        self
    }

    /// Resolve a worker binary: env override, then sibling of the current
    /// executable, then PATH
    fn resolve_worker_bin(&self, role: Role, env_key: &str) -> SupervisorResult<PathBuf> {
        if let Ok(path) = std::env::var(env_key) {
            return Ok(PathBuf::from(path));
        }

        let name = role.as_str();
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let candidate = dir.join(name);
                if candidate.is_file() {
                    return Ok(candidate);
                }
            }
        }

        search_path(name).ok_or_else(|| {
            SupervisorError::binary(
                role,
                format!("{name} not found next to the daemon or on PATH ({env_key} overrides)"),
            )
        })
    }

    /// Spawn one commanded worker: fresh channel, read end to the child,
    /// write end kept for later transfer to the HTTP worker
    async fn spawn_commanded_worker(&self, role: Role, env_key: &str) -> SupervisorResult<CommandedWorker> {
        let (read_end, write_end) = command_channel()?;
        // Only the read end belongs in this child
        set_inheritable(&write_end, false)?;

        let bin = self.resolve_worker_bin(role, env_key)?;
        let mut cmd = Command::new(&bin);
        cmd.arg("--channel-fd")
            .arg(read_end.as_raw_fd().to_string())
            .arg("--log-level")
            .arg(&self.log_level)
            .stdin(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| SupervisorError::spawn(role, format!("{}: {e}", bin.display())))?;
        let pid = child_pid(&child, role)?;

        // The worker holds its inherited copy of the read end now
        drop(read_end);

        process_debug!(
            Role::current(),
            "🏭 Spawned {} (pid {}) from {}",
            role,
            pid,
            bin.display()
        );

        Ok(CommandedWorker {
            handle: WorkerHandle { role, pid, child },
            command_writer: write_end,
        })
    }
}

impl Default for RealWorkerLauncher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl WorkerLauncher for RealWorkerLauncher {
    async fn spawn_image_worker(&self) -> SupervisorResult<CommandedWorker> {
        self.spawn_commanded_worker(Role::ImageWorker, IMAGE_WORKER_BIN_ENV).await
    }

    async fn spawn_service_worker(&self) -> SupervisorResult<CommandedWorker> {
        self.spawn_commanded_worker(Role::ServiceWorker, SERVICE_WORKER_BIN_ENV).await
    }

    async fn spawn_http_worker(
        &self,
        image_writer: OwnedFd,
        service_writer: OwnedFd,
        service_pid: Pid,
    ) -> SupervisorResult<WorkerHandle> {
        let role = Role::HttpWorker;
        let bin = self.resolve_worker_bin(role, HTTP_WORKER_BIN_ENV)?;

        // This child is the one meant to inherit both writer ends
        set_inheritable(&image_writer, true)?;
        set_inheritable(&service_writer, true)?;

        let mut cmd = Command::new(&bin);
        cmd.arg("--image-channel-fd")
            .arg(image_writer.as_raw_fd().to_string())
            .arg("--service-channel-fd")
            .arg(service_writer.as_raw_fd().to_string())
            .arg("--service-pid")
            .arg(service_pid.as_raw().to_string())
            .arg("--port")
            .arg(self.http_port.to_string())
            .arg("--log-level")
            .arg(&self.log_level)
            .stdin(Stdio::null());

        let child = cmd
            .spawn()
            .map_err(|e| SupervisorError::spawn(role, format!("{}: {e}", bin.display())))?;
        let pid = child_pid(&child, role)?;

        // Ownership transfer: the HTTP worker now holds the only writer
        // copies, the root's close here
        drop(image_writer);
        drop(service_writer);

        process_debug!(
            Role::current(),
            "🌐 Spawned {} (pid {}) commanding service pid {}",
            role,
            pid,
            service_pid
        );

        Ok(WorkerHandle { role, pid, child })
    }
}

fn child_pid(child: &Child, role: Role) -> SupervisorResult<Pid> {
    child
        .id()
        .map(|id| Pid::from_raw(id as i32))
        .ok_or_else(|| SupervisorError::spawn(role, "child exited before its pid was recorded"))
}

fn search_path(name: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}
