//! Signal and child-exit event loop shared by the supervising processes
//!
//! One loop instance owns the signal streams it was asked to watch and the
//! set of child processes it supervises. Each cycle delivers exactly one
//! event to the handler; handlers run sequentially on the loop's task and
//! never concurrently with the loop's own bookkeeping. The loop applies no
//! failure policy - that belongs to the owning supervisor.

use std::collections::HashSet;
use std::process::ExitStatus;

use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::process::Child;
use tokio::signal::unix::{signal as signal_stream, Signal as SignalStream, SignalKind};
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::errors::{SharedError, SharedResult};

/// Signals a loop can watch, abstracted from their OS numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalEvent {
    /// Operator interrupt (SIGINT)
    Interrupt,
    /// Termination request (SIGTERM)
    Terminate,
    /// Command-available wake-up (SIGUSR1)
    Wake,
}

/// One reaped child, delivered to the handler after the set was updated
#[derive(Debug)]
pub struct ChildExit {
    pub pid: Pid,
    pub status: ExitStatus,
}

/// Handler verdict after each dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Why [`EventLoop::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Every supervised child has been reaped
    Drained,
    /// A handler requested termination
    Stopped,
}

/// Event sink driven by the loop
#[async_trait]
pub trait LoopHandler: Send {
    async fn on_signal(&mut self, event: SignalEvent, supervised: &mut SupervisedSet) -> Flow;

    async fn on_child_exit(&mut self, exit: ChildExit, supervised: &mut SupervisedSet) -> Flow;
}

/// Child processes currently watched by one event loop.
///
/// Invariant: every pid here was adopted by the owning supervisor and has
/// not yet been reaped. Mutated only from the loop's own thread of control.
pub struct SupervisedSet {
    reapers: JoinSet<(Pid, std::io::Result<ExitStatus>)>,
    pids: HashSet<i32>,
}

impl SupervisedSet {
    pub fn new() -> Self {
        Self {
            reapers: JoinSet::new(),
            pids: HashSet::new(),
        }
    }

    /// Take ownership of a spawned child and watch it for exit
    pub fn adopt(&mut self, pid: Pid, mut child: Child) {
        self.pids.insert(pid.as_raw());
        self.reapers.spawn(async move { (pid, child.wait().await) });
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid.as_raw())
    }

    pub fn len(&self) -> usize {
        self.pids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    pub fn pids(&self) -> Vec<Pid> {
        self.pids.iter().map(|&raw| Pid::from_raw(raw)).collect()
    }

    /// Best-effort signal to every supervised pid; returns how many were
    /// actually signaled. ESRCH means the child already exited but its
    /// reaping has not been dispatched yet.
    pub fn signal_all(&self, sig: Signal) -> usize {
        let mut sent = 0;
        for pid in self.pids() {
            match signal::kill(pid, sig) {
                Ok(()) => {
                    debug!("📤 Sent {} to pid {}", sig, pid);
                    sent += 1;
                }
                Err(nix::errno::Errno::ESRCH) => {
                    debug!("Pid {} already gone, not signaled", pid);
                }
                Err(e) => {
                    warn!("⚠️ Failed to signal pid {}: {}", pid, e);
                }
            }
        }
        sent
    }

    fn remove(&mut self, pid: Pid) {
        self.pids.remove(&pid.as_raw());
    }

    async fn next_exit(&mut self) -> Option<(Pid, std::io::Result<ExitStatus>)> {
        loop {
            match self.reapers.join_next().await {
                Some(Ok(pair)) => return Some(pair),
                Some(Err(e)) => {
                    warn!("⚠️ Reaper task failed: {}", e);
                    continue;
                }
                None => return None,
            }
        }
    }
}

impl Default for SupervisedSet {
    fn default() -> Self {
        Self::new()
    }
}

enum LoopEvent {
    Signal(SignalEvent),
    ChildExit(ChildExit),
}

/// Single-threaded reactor multiplexing registered signals and supervised
/// child exits into one ordered, sequentially dispatched event stream
pub struct EventLoop {
    interrupt: Option<SignalStream>,
    terminate: Option<SignalStream>,
    wake: Option<SignalStream>,
    supervised: SupervisedSet,
}

impl EventLoop {
    pub fn new() -> Self {
        Self {
            interrupt: None,
            terminate: None,
            wake: None,
            supervised: SupervisedSet::new(),
        }
    }

    /// Watch SIGINT and deliver it as [`SignalEvent::Interrupt`]
    pub fn watch_interrupt(&mut self) -> SharedResult<()> {
        self.interrupt = Some(watch(SignalKind::interrupt(), "SIGINT")?);
        Ok(())
    }

    /// Watch SIGTERM and deliver it as [`SignalEvent::Terminate`]
    pub fn watch_terminate(&mut self) -> SharedResult<()> {
        self.terminate = Some(watch(SignalKind::terminate(), "SIGTERM")?);
        Ok(())
    }

    /// Watch SIGUSR1 and deliver it as [`SignalEvent::Wake`]
    pub fn watch_wake(&mut self) -> SharedResult<()> {
        self.wake = Some(watch(SignalKind::user_defined1(), "SIGUSR1")?);
        Ok(())
    }

    pub fn supervised(&self) -> &SupervisedSet {
        &self.supervised
    }

    pub fn supervised_mut(&mut self) -> &mut SupervisedSet {
        &mut self.supervised
    }

    /// Run until the supervised set drains or a handler requests a stop.
    ///
    /// The exited pid is removed from the set before its handler runs, so
    /// handlers always observe the remaining pids.
    pub async fn run<H: LoopHandler>(&mut self, handler: &mut H) -> SharedResult<LoopExit> {
        loop {
            if self.supervised.is_empty() {
                return Ok(LoopExit::Drained);
            }

            let flow = match self.next_event().await? {
                LoopEvent::Signal(event) => handler.on_signal(event, &mut self.supervised).await,
                LoopEvent::ChildExit(exit) => {
                    self.supervised.remove(exit.pid);
                    handler.on_child_exit(exit, &mut self.supervised).await
                }
            };

            if flow == Flow::Stop {
                return Ok(LoopExit::Stopped);
            }
        }
    }

    async fn next_event(&mut self) -> SharedResult<LoopEvent> {
        tokio::select! {
            Some(()) = recv(&mut self.interrupt) => Ok(LoopEvent::Signal(SignalEvent::Interrupt)),
            Some(()) = recv(&mut self.terminate) => Ok(LoopEvent::Signal(SignalEvent::Terminate)),
            Some(()) = recv(&mut self.wake) => Ok(LoopEvent::Signal(SignalEvent::Wake)),
            Some((pid, result)) = self.supervised.next_exit() => {
                let status = result
                    .map_err(|e| SharedError::channel(format!("waiting on pid {pid} failed: {e}")))?;
                Ok(LoopEvent::ChildExit(ChildExit { pid, status }))
            }
        }
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

fn watch(kind: SignalKind, name: &str) -> SharedResult<SignalStream> {
    signal_stream(kind).map_err(|e| SharedError::signal(format!("{name} handler: {e}")))
}

async fn recv(stream: &mut Option<SignalStream>) -> Option<()> {
    match stream {
        Some(stream) => stream.recv().await,
        None => std::future::pending().await,
    }
}
