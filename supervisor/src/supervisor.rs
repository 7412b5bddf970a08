//! Root supervisor implementation
//!
//! Spawns the category workers, transfers the command-channel writer ends to
//! the HTTP worker, then watches all three pids. The first unexpected exit
//! or operator interrupt triggers exactly one cascade-termination sweep;
//! everything after that is an expected consequence of the shutdown already
//! in progress.

use async_trait::async_trait;
use shared::{
    logging, process_debug, process_error, process_info, process_warn, ChildExit, EventLoop, Flow,
    LoopExit, LoopHandler, Role, SignalEvent, SupervisedSet,
};

use crate::error::SupervisorResult;
use crate::traits::{Terminator, WorkerHandle, WorkerLauncher};

/// Root supervisor that owns the worker fleet
pub struct RootSupervisor<L, T>
where
    L: WorkerLauncher + Send + Sync + 'static,
    T: Terminator + Send + Sync + 'static,
{
    launcher: L,
    terminator: T,

    /// True until the first unexpected exit or external interrupt is
    /// observed; the cascade sweep fires at most once per lifetime
    first_fail: bool,
}

impl<L, T> RootSupervisor<L, T>
where
    L: WorkerLauncher + Send + Sync + 'static,
    T: Terminator + Send + Sync + 'static,
{
    pub fn new(launcher: L, terminator: T) -> Self {
        Self {
            launcher,
            terminator,
            first_fail: true,
        }
    }

    /// Spawn the fleet and supervise it until every worker has been reaped
    pub async fn run(&mut self) -> SupervisorResult<LoopExit> {
        process_debug!(Role::current(), "🚀 Spawning category workers...");

        let image = self.launcher.spawn_image_worker().await?;
        let service = match self.launcher.spawn_service_worker().await {
            Ok(worker) => worker,
            Err(e) => {
                // Do not strand an already-running worker behind a failed start
                self.terminator.request_termination(image.handle.pid);
                return Err(e);
            }
        };
        let service_pid = service.handle.pid;
        let http = match self
            .launcher
            .spawn_http_worker(image.command_writer, service.command_writer, service_pid)
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                self.terminator.request_termination(image.handle.pid);
                self.terminator.request_termination(service_pid);
                return Err(e);
            }
        };

        process_info!(
            Role::current(),
            "✅ Workers running: image={}, service={}, http={}",
            image.handle.pid,
            service_pid,
            http.pid
        );

        let mut event_loop = EventLoop::new();
        event_loop.watch_interrupt()?;
        adopt(event_loop.supervised_mut(), image.handle);
        adopt(event_loop.supervised_mut(), service.handle);
        adopt(event_loop.supervised_mut(), http);

        let exit = event_loop.run(self).await?;
        process_info!(Role::current(), "🏁 Worker fleet fully reaped ({:?})", exit);
        Ok(exit)
    }

    /// One cascade sweep over the remaining pids; `first_fail` guarantees
    /// at-most-once regardless of which trigger fired first
    fn cascade(&mut self, supervised: &SupervisedSet) {
        for pid in supervised.pids() {
            self.terminator.request_termination(pid);
        }
        self.first_fail = false;
    }
}

fn adopt(supervised: &mut SupervisedSet, handle: WorkerHandle) {
    supervised.adopt(handle.pid, handle.child);
}

#[async_trait]
impl<L, T> LoopHandler for RootSupervisor<L, T>
where
    L: WorkerLauncher + Send + Sync + 'static,
    T: Terminator + Send + Sync + 'static,
{
    async fn on_signal(&mut self, event: SignalEvent, supervised: &mut SupervisedSet) -> Flow {
        match event {
            SignalEvent::Interrupt => {
                if self.first_fail {
                    logging::log_shutdown(Role::current(), "interrupt received, terminating all workers");
                    self.cascade(supervised);
                } else {
                    process_debug!(
                        Role::current(),
                        "Interrupt during an in-progress shutdown, nothing further to do"
                    );
                }
            }
            other => {
                process_warn!(Role::current(), "⚠️ Unexpected signal event {:?} at root", other);
            }
        }
        Flow::Continue
    }

    async fn on_child_exit(&mut self, exit: ChildExit, supervised: &mut SupervisedSet) -> Flow {
        if self.first_fail {
            process_error!(
                Role::current(),
                "❌ Worker pid {} exited unexpectedly ({}), terminating {} remaining workers",
                exit.pid,
                exit.status,
                supervised.len()
            );
            self.cascade(supervised);
        } else {
            process_debug!(
                Role::current(),
                "Worker pid {} exited during shutdown ({})",
                exit.pid,
                exit.status
            );
        }
        Flow::Continue
    }
}
