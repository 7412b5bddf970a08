//! REST API handlers
//!
//! HTTP endpoints over the service command channel. Authentication and
//! richer response shaping belong to the control plane proper; these
//! handlers only guarantee that an accepted request became one framed
//! write followed by a wake.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use shared::ObjectId;

use crate::traits::CommandSink;

#[derive(Debug, Serialize, Deserialize)]
pub struct AddServiceRequest {
    pub object_id: String,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreServiceRequest {
    pub object_id: String,
}

/// Start a new service - POST /api/services
pub async fn add_service<C>(
    State(commander): State<Arc<C>>,
    Json(request): Json<AddServiceRequest>,
) -> Result<Json<Value>, StatusCode>
where
    C: CommandSink + Send + Sync + 'static,
{
    let object_id = ObjectId::new(request.object_id.as_str());
    match commander.add(&object_id, &request.args).await {
        Ok(()) => Ok(Json(json!({
            "status": "accepted",
            "message": format!("Service '{}' queued for start", request.object_id)
        }))),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Restore an existing service - POST /api/services/restore
pub async fn restore_service<C>(
    State(commander): State<Arc<C>>,
    Json(request): Json<RestoreServiceRequest>,
) -> Result<Json<Value>, StatusCode>
where
    C: CommandSink + Send + Sync + 'static,
{
    let object_id = ObjectId::new(request.object_id.as_str());
    match commander.restore(&object_id).await {
        Ok(()) => Ok(Json(json!({
            "status": "accepted",
            "message": format!("Service '{}' queued for restore", request.object_id)
        }))),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Worker status - GET /api/status
pub async fn get_status() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "data": {
            "worker": "httpworker",
            "version": env!("CARGO_PKG_VERSION")
        }
    }))
}
