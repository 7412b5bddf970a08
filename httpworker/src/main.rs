//! Main entry point for the HTTP worker binary

use std::sync::Arc;

use clap::Parser;
use nix::unistd::Pid;

use httpworker::{web, HttpWorkerResult, RealServiceCommander};
use shared::{logging, process_info, CommandSender, Role};

/// HTTP control-plane worker
#[derive(Parser)]
#[command(name = "httpworker")]
#[command(about = "HTTP control plane commanding the service worker")]
pub struct Args {
    /// Inherited write end of the image worker's command channel
    #[arg(long)]
    pub image_channel_fd: i32,

    /// Inherited write end of the service worker's command channel
    #[arg(long)]
    pub service_channel_fd: i32,

    /// Pid of the service worker to wake after each write
    #[arg(long)]
    pub service_pid: i32,

    /// HTTP listen port
    #[arg(long, default_value = "8080")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> HttpWorkerResult<()> {
    let args = Args::parse();

    Role::init_http_worker();
    logging::init_tracing(Some(&args.log_level));
    logging::log_startup(Role::current(), "HTTP control-plane worker");

    // Held for the image API; no image commands are defined yet
    let _image_channel = CommandSender::from_raw_fd(args.image_channel_fd)?;

    let service_channel = CommandSender::from_raw_fd(args.service_channel_fd)?;
    let commander = Arc::new(RealServiceCommander::new(
        service_channel,
        Pid::from_raw(args.service_pid),
    ));

    let app = web::router(commander);
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    process_info!(
        Role::current(),
        "🌐 Serving control API on {}",
        listener.local_addr()?
    );

    axum::serve(listener, app).await?;
    Ok(())
}
