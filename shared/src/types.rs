//! Core role and identifier types used throughout the daemon

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Global role singleton - set once at process startup
static ROLE: OnceLock<Role> = OnceLock::new();

/// Fixed category of a daemon process, decided at spawn time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Root supervisor process (singleton)
    Supervisor,
    /// Image-management worker
    ImageWorker,
    /// Service-management worker
    ServiceWorker,
    /// HTTP control-plane worker
    HttpWorker,
}

impl Role {
    /// Initialize the global role for the root supervisor
    pub fn init_supervisor() -> &'static Role {
        ROLE.get_or_init(|| Role::Supervisor)
    }

    /// Initialize the global role for the image worker
    pub fn init_image_worker() -> &'static Role {
        ROLE.get_or_init(|| Role::ImageWorker)
    }

    /// Initialize the global role for the service worker
    pub fn init_service_worker() -> &'static Role {
        ROLE.get_or_init(|| Role::ServiceWorker)
    }

    /// Initialize the global role for the HTTP worker
    pub fn init_http_worker() -> &'static Role {
        ROLE.get_or_init(|| Role::HttpWorker)
    }

    /// Get the global role (must be initialized first)
    pub fn current() -> &'static Role {
        ROLE.get().expect("Role not initialized - call init_* first")
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supervisor => "supervisor",
            Role::ImageWorker => "imageworker",
            Role::ServiceWorker => "serviceworker",
            Role::HttpWorker => "httpworker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "supervisor" => Ok(Role::Supervisor),
            "imageworker" => Ok(Role::ImageWorker),
            "serviceworker" => Ok(Role::ServiceWorker),
            "httpworker" => Ok(Role::HttpWorker),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

/// Opaque identifier of a managed service object, assigned by the control plane
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Environment variable carrying the object id into spawned service processes
pub const OBJECT_ID_ENV: &str = "SERVICE_OBJECT_ID";

/// Environment override for the service runner executable location
pub const RUNNER_ENV: &str = "SERVICE_RUNNER";

/// Default runner executable name looked up on PATH
pub const RUNNER_BIN: &str = "service-runner";
