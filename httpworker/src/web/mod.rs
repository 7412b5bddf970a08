//! HTTP surface wiring

pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::traits::CommandSink;

/// Build the control API router over a command sink
pub fn router<C>(commander: Arc<C>) -> Router
where
    C: CommandSink + Send + Sync + 'static,
{
    Router::new()
        .route("/api/services", post(handlers::api::add_service::<C>))
        .route("/api/services/restore", post(handlers::api::restore_service::<C>))
        .route("/api/status", get(handlers::api::get_status))
        .with_state(commander)
}
