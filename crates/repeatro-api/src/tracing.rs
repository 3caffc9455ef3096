//! Tracing and logging configuration for the service
//!
//! Development gets pretty, human-readable output. Production gets flattened
//! JSON lines carrying the request span fields (request id, method, uri).

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is unset.
///
/// The service crates log at `debug` in development. Query logging from sqlx
/// stays at `warn` so slow-statement warnings still come through.
pub fn default_directives(env: &Environment) -> &'static str {
    if env.is_development() {
        "info,repeatro_api=debug,repeatro_db=debug,tower_http=debug,sqlx=warn"
    } else {
        "warn,repeatro_api=info,repeatro_db=info,tower_http=info,tower_governor=warn,sqlx=warn"
    }
}

fn env_filter(env: &Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(env)))
}

/// Install the global subscriber for `env`.
///
/// `RUST_LOG` overrides [`default_directives`] (e.g. `RUST_LOG=repeatro_api=trace`).
pub fn init_tracing(env: &Environment) {
    let filter = env_filter(env);

    if env.is_development() {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(filter),
            )
            .init();
    } else {
        // One flat JSON object per event; the request span supplies request_id
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .flatten_event(true)
                    .with_target(true)
                    .with_filter(filter),
            )
            .init();
    }

    tracing::info!(environment = ?env, "tracing initialized");
}
