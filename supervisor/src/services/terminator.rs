//! Real termination requester
//!
//! Termination stays cooperative: a SIGTERM is a request, not a guarantee.
//! Forced-kill escalation after a timeout would live here if it is ever
//! added; the base contract deliberately does not include it.

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::traits::Terminator;

pub struct RealTerminator;

impl RealTerminator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealTerminator {
    fn default() -> Self {
        Self::new()
    }
}

impl Terminator for RealTerminator {
    fn request_termination(&self, pid: Pid) {
        match signal::kill(pid, Signal::SIGTERM) {
            Ok(()) => debug!("📤 Requested termination of pid {}", pid),
            Err(nix::errno::Errno::ESRCH) => debug!("Pid {} already gone", pid),
            Err(e) => warn!("⚠️ Failed to request termination of pid {}: {}", pid, e),
        }
    }
}
