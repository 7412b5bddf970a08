//! Main entry point for the root supervisor binary

use clap::Parser;

use shared::{logging, Role};
use supervisor::{RealTerminator, RealWorkerLauncher, RootSupervisor, SupervisorResult};

/// Root supervisor for the host service runtime
#[derive(Parser)]
#[command(name = "supervisor")]
#[command(about = "Supervises the image, service and HTTP workers on this host")]
pub struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Listen port handed to the HTTP worker
    #[arg(long, default_value = "8080")]
    pub http_port: u16,
}

#[tokio::main]
async fn main() -> SupervisorResult<()> {
    let args = Args::parse();

    // Worker binary and runner overrides may live in .env
    dotenv::dotenv().ok();

    Role::init_supervisor();
    logging::init_tracing(Some(&args.log_level));
    logging::log_startup(Role::current(), "root supervisor daemon");

    let launcher = RealWorkerLauncher::new()
        .with_log_level(args.log_level.clone())
        .with_http_port(args.http_port);
    let mut supervisor = RootSupervisor::new(launcher, RealTerminator::new());

    let exit = supervisor.run().await?;

    logging::log_success(Role::current(), &format!("Supervisor stopped ({exit:?})"));
    Ok(())
}
