//! Service supervisor implementation
//!
//! Wakes on SIGUSR1 to drain and execute framed commands, supervises every
//! spawned service plus the anchor child, and answers SIGTERM with one
//! best-effort termination sweep. Per-frame decode or spawn failures are
//! logged and absorbed; they never unwind the loop.

use async_trait::async_trait;
use nix::sys::signal::Signal;
use shared::{
    logging, process_debug, process_info, process_warn, ChildExit, Command, CommandReceiver,
    EventLoop, Flow, FrameDecoder, LoopExit, LoopHandler, ObjectId, Role, SignalEvent,
    SupervisedSet,
};

use crate::error::ServiceWorkerResult;
use crate::registry::ServiceRegistry;
use crate::traits::{ServiceSpawner, SpawnedService};

/// Supervisor for dynamically spawned service processes
pub struct ServiceSupervisor<S>
where
    S: ServiceSpawner + Send + Sync + 'static,
{
    spawner: S,
    receiver: CommandReceiver,
    decoder: FrameDecoder,
    registry: ServiceRegistry,
}

impl<S> ServiceSupervisor<S>
where
    S: ServiceSpawner + Send + Sync + 'static,
{
    pub fn new(spawner: S, receiver: CommandReceiver) -> Self {
        Self {
            spawner,
            receiver,
            decoder: FrameDecoder::new(),
            registry: ServiceRegistry::new(),
        }
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    /// Supervise until every child (anchor included) has been reaped.
    ///
    /// The anchor keeps the supervised set non-empty while no services run,
    /// so the loop only drains once termination has swept everything.
    pub async fn run(&mut self, anchor: SpawnedService) -> ServiceWorkerResult<LoopExit> {
        let mut event_loop = EventLoop::new();
        event_loop.watch_wake()?;
        event_loop.watch_terminate()?;
        event_loop.supervised_mut().adopt(anchor.pid, anchor.child);

        process_info!(
            Role::current(),
            "✅ Service worker ready (anchor pid {})",
            anchor.pid
        );

        let exit = event_loop.run(self).await?;
        process_info!(Role::current(), "🏁 Service worker drained ({:?})", exit);
        Ok(exit)
    }

    /// Drain the command channel and execute every frame it completed
    pub async fn process_commands(&mut self, supervised: &mut SupervisedSet) {
        let bytes = match self.receiver.drain() {
            Ok(bytes) => bytes,
            Err(e) => {
                logging::log_error(Role::current(), "Command channel drain", &e);
                return;
            }
        };
        if bytes.is_empty() {
            process_debug!(Role::current(), "Woken with nothing to read");
            return;
        }

        for decoded in self.decoder.push(&bytes) {
            match decoded {
                Ok(command) => self.execute(command, supervised).await,
                // The bad frame is already consumed; later frames are unaffected
                Err(e) => logging::log_error(Role::current(), "Frame decode", &e),
            }
        }
    }

    async fn execute(&mut self, command: Command, supervised: &mut SupervisedSet) {
        match command {
            Command::Add { object_id, args } => {
                if self.reject_duplicate(&object_id) {
                    return;
                }
                match self.spawner.spawn_add(&object_id, &args).await {
                    Ok(service) => self.adopt_service(object_id, service, supervised),
                    Err(e) => logging::log_error(Role::current(), "ADD spawn", &e),
                }
            }
            Command::Restore { object_id } => {
                if self.reject_duplicate(&object_id) {
                    return;
                }
                match self.spawner.spawn_restore(&object_id).await {
                    Ok(service) => self.adopt_service(object_id, service, supervised),
                    Err(e) => logging::log_error(Role::current(), "RESTORE spawn", &e),
                }
            }
            Command::Unknown { word } => {
                process_warn!(Role::current(), "⚠️ Unknown command word {:?} ignored", word);
            }
        }
    }

    fn reject_duplicate(&self, object_id: &ObjectId) -> bool {
        if self.registry.contains(object_id) {
            process_warn!(
                Role::current(),
                "⚠️ Command for live object {} rejected, existing service wins",
                object_id
            );
            return true;
        }
        false
    }

    fn adopt_service(
        &mut self,
        object_id: ObjectId,
        service: SpawnedService,
        supervised: &mut SupervisedSet,
    ) {
        supervised.adopt(service.pid, service.child);
        self.registry.insert(object_id.clone(), service.pid);
        process_info!(
            Role::current(),
            "🧩 Service {} running as pid {} ({} live)",
            object_id,
            service.pid,
            self.registry.len()
        );
    }
}

#[async_trait]
impl<S> LoopHandler for ServiceSupervisor<S>
where
    S: ServiceSpawner + Send + Sync + 'static,
{
    async fn on_signal(&mut self, event: SignalEvent, supervised: &mut SupervisedSet) -> Flow {
        match event {
            SignalEvent::Wake => {
                self.process_commands(supervised).await;
            }
            SignalEvent::Terminate => {
                logging::log_shutdown(Role::current(), "termination requested, signaling all services");
                // Best-effort: the handler returns without waiting, and the
                // loop drains as the children exit. There is no forced-kill
                // escalation for a child that ignores the request.
                supervised.signal_all(Signal::SIGTERM);
            }
            SignalEvent::Interrupt => {
                process_warn!(Role::current(), "⚠️ Unexpected interrupt at service worker");
            }
        }
        Flow::Continue
    }

    async fn on_child_exit(&mut self, exit: ChildExit, supervised: &mut SupervisedSet) -> Flow {
        match self.registry.remove_by_pid(exit.pid) {
            Some(object_id) => {
                // A single service dying is not fatal here; no cascade
                process_info!(
                    Role::current(),
                    "Service {} (pid {}) exited ({}), {} services and {} children remain",
                    object_id,
                    exit.pid,
                    exit.status,
                    self.registry.len(),
                    supervised.len()
                );
            }
            None => {
                process_debug!(
                    Role::current(),
                    "Untracked child pid {} exited ({})",
                    exit.pid,
                    exit.status
                );
            }
        }
        Flow::Continue
    }
}
