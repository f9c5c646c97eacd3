//! Rendering `tracing` events with the spans they happened in.
//!
//! Every event becomes a box. The spans active at the time show up as
//! nested groups holding the span's fields, root span first.
//!
//! If you currently use `tracing_subscriber::fmt::init()`, this shows how to
//! replace that setup with `BoxLayer`.

use boxlog::{HandlerOptions, Level, PrettyHandler};
use boxlog_tracing::BoxLayer;
use tracing::instrument;
use tracing_subscriber::{Registry, layer::SubscriberExt};

#[derive(Debug, thiserror::Error)]
#[error("permission denied")]
struct PermissionError;

#[instrument(fields(table = "users"))]
fn query_database(query: &str) -> Result<u64, PermissionError> {
    tracing::debug!(rows = 0u64, "query returned nothing");
    Err(PermissionError)
}

#[instrument(fields(role = "admin"))]
fn check_user_permission(user_id: u64) -> Result<(), PermissionError> {
    query_database("SELECT permissions FROM users WHERE id = ?")?;
    Ok(())
}

#[instrument]
fn handle_api_request(request_id: &str, endpoint: &str) {
    tracing::info!("handling request");
    if let Err(error) = check_user_permission(12345) {
        tracing::error!(error = &error as &dyn std::error::Error, "request failed");
    }
}

fn main() {
    let handler = PrettyHandler::new(
        std::io::stdout(),
        HandlerOptions::from_env().with_level(Level::Debug),
    );
    let subscriber = Registry::default().with(BoxLayer::new(handler).with_target(true));

    tracing::subscriber::set_global_default(subscriber).expect("failed to set default subscriber");

    handle_api_request("req-abc-123", "/api/admin/users");
}
