//! Main entry point for the image worker binary
//!
//! The image-management logic lives outside this core and is not implemented
//! yet; the role exists so fleet wiring and cascade behavior are complete.
//! The worker holds its command channel end and parks until asked to
//! terminate.

use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};

use shared::{logging, process_info, CommandReceiver, Role, SharedResult};

/// Image-management worker
#[derive(Parser)]
#[command(name = "imageworker")]
#[command(about = "Image-management worker for the host service runtime")]
pub struct Args {
    /// Inherited read end of the command channel
    #[arg(long)]
    pub channel_fd: i32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> SharedResult<()> {
    let args = Args::parse();

    Role::init_image_worker();
    logging::init_tracing(Some(&args.log_level));
    logging::log_startup(Role::current(), "image worker");

    // Keep the channel end open so the HTTP worker's writes cannot fail;
    // image commands are not handled yet
    let _receiver = CommandReceiver::from_raw_fd(args.channel_fd)?;
    process_info!(Role::current(), "✅ Image worker ready (commands not handled yet)");

    let mut terminate = signal(SignalKind::terminate())?;
    let mut interrupt = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = terminate.recv() => {}
        _ = interrupt.recv() => {}
    }

    logging::log_shutdown(Role::current(), "termination requested");
    Ok(())
}
