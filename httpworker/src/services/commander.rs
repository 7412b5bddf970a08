//! Service channel commander
//!
//! Owns the write end of the service worker's command channel. Writes are
//! serialized so frames never interleave, and the wake signal is sent only
//! after a frame has been written in full - the service worker's drain
//! contract depends on that ordering.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::sync::Mutex;

use shared::protocol::{encode_add, encode_restore};
use shared::{process_debug, CommandSender, ObjectId, Role};

use crate::error::{HttpWorkerError, HttpWorkerResult};
use crate::traits::CommandSink;

/// Real command dispatcher over the service channel
pub struct RealServiceCommander {
    sender: Mutex<CommandSender>,
    service_pid: Pid,
}

impl RealServiceCommander {
    pub fn new(sender: CommandSender, service_pid: Pid) -> Self {
        Self {
            sender: Mutex::new(sender),
            service_pid,
        }
    }

    async fn dispatch(&self, frame: Vec<u8>) -> HttpWorkerResult<()> {
        {
            let mut sender = self.sender.lock().await;
            sender.send(&frame).await?;
        }

        signal::kill(self.service_pid, Signal::SIGUSR1).map_err(|e| {
            HttpWorkerError::command(format!("waking service worker {}: {e}", self.service_pid))
        })?;

        process_debug!(
            Role::current(),
            "📤 Dispatched {} byte frame and woke pid {}",
            frame.len(),
            self.service_pid
        );
        Ok(())
    }
}

#[async_trait::async_trait]
impl CommandSink for RealServiceCommander {
    async fn add(&self, object_id: &ObjectId, args: &[String]) -> HttpWorkerResult<()> {
        let frame = encode_add(object_id, args).map_err(HttpWorkerError::from)?;
        self.dispatch(frame).await
    }

    async fn restore(&self, object_id: &ObjectId) -> HttpWorkerResult<()> {
        let frame = encode_restore(object_id).map_err(HttpWorkerError::from)?;
        self.dispatch(frame).await
    }
}
