//! Tests for RealServiceCommander
//!
//! The wake target is a real child process: observing it die to the
//! (unhandled) SIGUSR1 proves the signal was sent after the write.

use std::time::Duration;

use nix::sys::signal;
use nix::unistd::Pid;
use tokio::time::sleep;

use shared::{command_channel, Command, CommandReceiver, CommandSender, FrameDecoder, ObjectId, Role};

use crate::error::HttpWorkerError;
use crate::services::commander::RealServiceCommander;
use crate::traits::CommandSink;

async fn spawn_wake_target() -> (Pid, tokio::process::Child) {
    let child = tokio::process::Command::new("sleep").arg("30").spawn().unwrap();
    let pid = Pid::from_raw(child.id().unwrap() as i32);
    (pid, child)
}

fn pipe_pair() -> (CommandSender, CommandReceiver) {
    let (read_end, write_end) = command_channel().unwrap();
    (
        CommandSender::from_owned_fd(write_end).unwrap(),
        CommandReceiver::from_owned_fd(read_end).unwrap(),
    )
}

#[tokio::test]
async fn test_add_writes_frame_then_wakes() {
    Role::init_http_worker();
    let (sender, mut receiver) = pipe_pair();
    let (pid, mut child) = spawn_wake_target().await;

    let commander = RealServiceCommander::new(sender, pid);
    commander
        .add(&ObjectId::new("obj-1"), &["--flag".to_string()])
        .await
        .unwrap();

    // The frame is on the channel, complete
    let commands = FrameDecoder::new().push(&receiver.drain().unwrap());
    assert_eq!(commands.len(), 1);
    match commands.into_iter().next().unwrap().unwrap() {
        Command::Add { object_id, args } => {
            assert_eq!(object_id, ObjectId::new("obj-1"));
            assert_eq!(args, vec!["--flag".to_string()]);
        }
        other => panic!("expected ADD, got {other:?}"),
    }

    // The wake target dies to the unhandled SIGUSR1 - the signal was sent
    let status = tokio::time::timeout(Duration::from_secs(5), child.wait())
        .await
        .expect("wake target should have been signaled")
        .unwrap();
    assert!(!status.success());
}

#[tokio::test]
async fn test_restore_frame_round_trips() {
    Role::init_http_worker();
    let (sender, mut receiver) = pipe_pair();
    let (pid, mut child) = spawn_wake_target().await;

    let commander = RealServiceCommander::new(sender, pid);
    commander.restore(&ObjectId::new("obj-9")).await.unwrap();

    let commands = FrameDecoder::new().push(&receiver.drain().unwrap());
    assert_eq!(commands.len(), 1);
    assert!(matches!(
        commands.into_iter().next().unwrap().unwrap(),
        Command::Restore { object_id } if object_id == ObjectId::new("obj-9")
    ));

    child.wait().await.unwrap();
}

#[tokio::test]
async fn test_wake_failure_surfaces_as_command_error() {
    Role::init_http_worker();
    let (sender, _receiver) = pipe_pair();

    // A child that is already reaped cannot be signaled
    let (pid, mut child) = spawn_wake_target().await;
    signal::kill(pid, signal::Signal::SIGKILL).unwrap();
    child.wait().await.unwrap();
    sleep(Duration::from_millis(50)).await;

    let commander = RealServiceCommander::new(sender, pid);
    let result = commander.restore(&ObjectId::new("obj-1")).await;
    assert!(matches!(result, Err(HttpWorkerError::CommandFailed { .. })));
}
