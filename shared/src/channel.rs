//! Pipe channels between the daemon's processes
//!
//! A channel is one anonymous pipe: the read end goes to the worker being
//! commanded, the write end to whoever commands it. Ends are inherited across
//! spawn and reconstructed in the child from the descriptor number passed on
//! its command line.

use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::fcntl::{fcntl, FcntlArg, FdFlag, OFlag};
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;

use crate::errors::{SharedError, SharedResult};

/// Create the two ends of a command channel as (read, write).
///
/// Neither end carries CLOEXEC: both survive into spawned children, and the
/// spawner drops whichever copies it does not keep.
pub fn command_channel() -> SharedResult<(OwnedFd, OwnedFd)> {
    nix::unistd::pipe().map_err(|e| SharedError::channel(format!("pipe creation failed: {e}")))
}

/// Control whether a channel end survives into the next spawned child.
///
/// Spawners keep every end close-on-exec except the one the next child is
/// meant to inherit, so ends are never leaked into unrelated processes.
pub fn set_inheritable(fd: &OwnedFd, inheritable: bool) -> SharedResult<()> {
    let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFD)
        .map_err(|e| SharedError::channel(format!("F_GETFD failed: {e}")))?;
    let mut flags = FdFlag::from_bits_truncate(flags);
    flags.set(FdFlag::FD_CLOEXEC, !inheritable);
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFD(flags))
        .map_err(|e| SharedError::channel(format!("F_SETFD failed: {e}")))?;
    Ok(())
}

fn set_nonblocking(fd: &OwnedFd) -> SharedResult<()> {
    let flags = fcntl(fd.as_raw_fd(), FcntlArg::F_GETFL)
        .map_err(|e| SharedError::channel(format!("F_GETFL failed: {e}")))?;
    let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
    fcntl(fd.as_raw_fd(), FcntlArg::F_SETFL(flags))
        .map_err(|e| SharedError::channel(format!("F_SETFL failed: {e}")))?;
    Ok(())
}

/// Read half of a command channel, owned by the commanded worker
pub struct CommandReceiver {
    rx: pipe::Receiver,
}

impl CommandReceiver {
    /// Reconstruct the read end from an inherited descriptor number.
    ///
    /// The caller asserts that `fd` is open in this process and not owned by
    /// anything else; this takes ownership of it.
    pub fn from_raw_fd(fd: RawFd) -> SharedResult<Self> {
        let owned = unsafe { OwnedFd::from_raw_fd(fd) };
        Self::from_owned_fd(owned)
    }

    pub fn from_owned_fd(fd: OwnedFd) -> SharedResult<Self> {
        set_nonblocking(&fd)?;
        let rx = pipe::Receiver::from_owned_fd(fd)
            .map_err(|e| SharedError::channel(format!("not a usable pipe read end: {e}")))?;
        Ok(Self { rx })
    }

    /// Drain everything currently buffered without blocking.
    ///
    /// An empty result means nothing was pending (or every writer is gone);
    /// the wake contract guarantees data is present when a wake follows a
    /// write, but a spurious wake must not stall the loop.
    pub fn drain(&mut self) -> SharedResult<Vec<u8>> {
        let mut bytes = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            match self.rx.try_read(&mut chunk) {
                Ok(0) => break, // every write end closed
                Ok(n) => bytes.extend_from_slice(&chunk[..n]),
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(SharedError::channel(format!("channel read failed: {e}"))),
            }
        }
        Ok(bytes)
    }
}

/// Write half of a command channel, owned by the commanding process
pub struct CommandSender {
    tx: pipe::Sender,
}

impl CommandSender {
    /// Reconstruct the write end from an inherited descriptor number.
    ///
    /// Same ownership contract as [`CommandReceiver::from_raw_fd`].
    pub fn from_raw_fd(fd: RawFd) -> SharedResult<Self> {
        let owned = unsafe { OwnedFd::from_raw_fd(fd) };
        Self::from_owned_fd(owned)
    }

    pub fn from_owned_fd(fd: OwnedFd) -> SharedResult<Self> {
        set_nonblocking(&fd)?;
        let tx = pipe::Sender::from_owned_fd(fd)
            .map_err(|e| SharedError::channel(format!("not a usable pipe write end: {e}")))?;
        Ok(Self { tx })
    }

    /// Write one complete frame to the channel
    pub async fn send(&mut self, frame: &[u8]) -> SharedResult<()> {
        self.tx
            .write_all(frame)
            .await
            .map_err(|e| SharedError::channel(format!("channel write failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_add, Command, FrameDecoder};
    use crate::types::ObjectId;

    #[tokio::test]
    async fn test_send_then_drain_round_trip() {
        let (read_end, write_end) = command_channel().unwrap();
        let mut sender = CommandSender::from_owned_fd(write_end).unwrap();
        let mut receiver = CommandReceiver::from_owned_fd(read_end).unwrap();

        let frame = encode_add(&ObjectId::new("obj-1"), &["--flag".to_string()]).unwrap();
        sender.send(&frame).await.unwrap();

        let bytes = receiver.drain().unwrap();
        assert_eq!(bytes, frame);

        let commands = FrameDecoder::new().push(&bytes);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Ok(Command::Add { .. })));
    }

    #[tokio::test]
    async fn test_drain_without_data_is_empty_not_blocking() {
        let (read_end, _write_end) = command_channel().unwrap();
        let mut receiver = CommandReceiver::from_owned_fd(read_end).unwrap();

        assert!(receiver.drain().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drain_after_writer_closed_returns_buffered_bytes() {
        let (read_end, write_end) = command_channel().unwrap();
        let mut sender = CommandSender::from_owned_fd(write_end).unwrap();
        let mut receiver = CommandReceiver::from_owned_fd(read_end).unwrap();

        sender.send(b"leftover").await.unwrap();
        drop(sender);

        assert_eq!(receiver.drain().unwrap(), b"leftover");
        assert!(receiver.drain().unwrap().is_empty());
    }
}
