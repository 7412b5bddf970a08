//! Main entry point for the service worker binary

use clap::Parser;

use serviceworker::{anchor, RealServiceSpawner, ServiceSupervisor, ServiceWorkerError, ServiceWorkerResult};
use shared::{logging, CommandReceiver, Role};

/// Service worker: spawns and supervises service processes on command
#[derive(Parser)]
#[command(name = "serviceworker")]
#[command(about = "Spawns and supervises service processes on framed commands")]
pub struct Args {
    /// Inherited read end of the command channel
    #[arg(long, conflicts_with = "anchor")]
    pub channel_fd: Option<i32>,

    /// Run as the no-op anchor child instead of the supervisor
    #[arg(long)]
    pub anchor: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> ServiceWorkerResult<()> {
    let args = Args::parse();
    Role::init_service_worker();

    if args.anchor {
        // Quiet no-op mode: park until terminated
        return anchor::run().await;
    }

    logging::init_tracing(Some(&args.log_level));
    logging::log_startup(Role::current(), "service worker");

    let fd = args
        .channel_fd
        .ok_or_else(|| ServiceWorkerError::config("--channel-fd is required outside anchor mode"))?;
    let receiver = CommandReceiver::from_raw_fd(fd)?;

    let mut supervisor = ServiceSupervisor::new(RealServiceSpawner::new(), receiver);
    let anchor = anchor::spawn().await?;
    let exit = supervisor.run(anchor).await?;

    logging::log_success(Role::current(), &format!("Service worker stopped ({exit:?})"));
    Ok(())
}
