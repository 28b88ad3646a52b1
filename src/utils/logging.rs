//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SchoolDesk application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::models::RegistrationStatus;
use crate::utils::errors::{SchoolDeskError, Result};

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| SchoolDeskError::Config(format!("Invalid log filter: {}", e)))?;

    let (file_layer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "schooldesk.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (
                Some(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .map_err(|e| SchoolDeskError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log event management actions
pub fn log_event_action(event_id: i64, action: &str, user_id: i64, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        user_id = user_id,
        details = details,
        "Event action performed"
    );
}

/// Log a registration moving between states
pub fn log_registration_transition(
    event_id: i64,
    user_id: i64,
    from: Option<RegistrationStatus>,
    to: Option<RegistrationStatus>,
    actor_id: i64,
) {
    info!(
        event_id = event_id,
        user_id = user_id,
        from = from.map(|s| s.as_str()).unwrap_or("NONE"),
        to = to.map(|s| s.as_str()).unwrap_or("NONE"),
        actor_id = actor_id,
        "Registration transition"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log a refused operation
pub fn log_access_denied(actor_id: i64, action: &str, reason: &str) {
    warn!(
        actor_id = actor_id,
        action = action,
        reason = reason,
        "Access denied"
    );
}

/// Log database operations
pub fn log_database_operation(operation: &str, table: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation completed"
        );
    } else {
        error!(
            operation = operation,
            table = table,
            duration_ms = duration_ms,
            "Database operation failed"
        );
    }
}
