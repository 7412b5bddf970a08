//! Shared logging utilities for consistent tracing across all processes

use crate::types::Role;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Initialize tracing subscriber with role-specific filtering
///
/// Uses the global role that must be initialized first.
pub fn init_tracing(log_level: Option<&str>) {
    use tracing_subscriber::{fmt, EnvFilter};

    let role = Role::current();
    let base_level = log_level.unwrap_or("info");

    let env_filter = match role {
        Role::Supervisor => format!("supervisor={base_level},shared={base_level}"),
        Role::ImageWorker => format!("imageworker={base_level},shared={base_level}"),
        Role::ServiceWorker => format!("serviceworker={base_level},shared={base_level}"),
        Role::HttpWorker => {
            format!("httpworker={base_level},shared={base_level},axum={base_level},tower=warn,hyper=warn")
        }
    };

    fmt()
        .with_env_filter(EnvFilter::new(&env_filter))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Get formatted timestamp for consistent logging
pub fn format_timestamp() -> String {
    let now: DateTime<Utc> = Utc::now();
    now.format("%H:%M:%S%.3f").to_string()
}

/// Macro for process-aware info logging
#[macro_export]
macro_rules! process_info {
    ($role:expr, $($arg:tt)*) => {
        tracing::info!(
            process = %$role,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware warning logging
#[macro_export]
macro_rules! process_warn {
    ($role:expr, $($arg:tt)*) => {
        tracing::warn!(
            process = %$role,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware error logging
#[macro_export]
macro_rules! process_error {
    ($role:expr, $($arg:tt)*) => {
        tracing::error!(
            process = %$role,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Macro for process-aware debug logging
#[macro_export]
macro_rules! process_debug {
    ($role:expr, $($arg:tt)*) => {
        tracing::debug!(
            process = %$role,
            timestamp = shared::logging::format_timestamp(),
            $($arg)*
        );
    };
}

/// Contextual logging helper for startup messages
pub fn log_startup(role: &Role, details: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "🚀 Starting {}",
        details
    );
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(role: &Role, reason: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "🛑 Shutting down: {}",
        reason
    );
}

/// Contextual logging helper for error conditions
pub fn log_error(role: &Role, context: &str, error: &dyn std::fmt::Display) {
    error!(
        process = %role,
        timestamp = format_timestamp(),
        error = %error,
        "❌ {} failed: {}",
        context,
        error
    );
}

/// Contextual logging helper for success conditions
pub fn log_success(role: &Role, message: &str) {
    info!(
        process = %role,
        timestamp = format_timestamp(),
        "✅ {}",
        message
    );
}
