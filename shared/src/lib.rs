//! Shared plumbing for the host daemon processes
//!
//! Contains only what more than one worker role needs: role identity, the
//! framed command protocol, pipe channels, the signal/child-exit event loop,
//! and logging. Role-internal types stay in their respective crates.

pub mod channel;
pub mod errors;
pub mod event_loop;
pub mod logging;
pub mod protocol;
pub mod types;

pub use errors::*;
pub use types::*;

pub use channel::{command_channel, set_inheritable, CommandReceiver, CommandSender};
pub use event_loop::{ChildExit, EventLoop, Flow, LoopExit, LoopHandler, SignalEvent, SupervisedSet};
pub use protocol::{Command, FrameDecoder};
