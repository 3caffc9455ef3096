//! Per-client rate limiting for the unauthenticated endpoints.
//!
//! Clients are keyed by IP using `SmartIpKeyExtractor`, which prefers
//! `X-Forwarded-For`/`X-Real-IP` and falls back to the peer address. The server
//! must therefore be served with `into_make_service_with_connect_info`.

/// Seconds between two replenished requests on `/auth/register` and `/auth/login`.
pub const AUTH_REPLENISH_SECONDS: u64 = 2;

/// Requests a client may send in a burst before being throttled.
pub const AUTH_BURST_SIZE: u32 = 10;

/// Build a `GovernorLayer` keyed by client IP.
///
/// A macro rather than a function so the caller does not have to spell out
/// the layer's generic parameters.
#[macro_export]
macro_rules! make_rate_limit_layer {
    ($replenish_seconds:expr, $burst_size:expr) => {{
        let config = ::tower_governor::governor::GovernorConfigBuilder::default()
            .per_second($replenish_seconds)
            .burst_size($burst_size)
            .key_extractor(::tower_governor::key_extractor::SmartIpKeyExtractor)
            .use_headers()
            .finish()
            .expect("rate limit period and burst size must be non-zero");
        ::tower_governor::GovernorLayer::new(config)
    }};
}
