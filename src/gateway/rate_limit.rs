// Per-client request budget for the API prefixes

use axum::Router;
use std::time::Duration;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tracing::{info, warn};

use crate::config::RateLimitSettings;

/// Interval after which one spent request is returned to the budget
///
/// The limiter is a token bucket holding `max_requests` tokens that refills
/// completely over one window.
pub fn replenish_interval(settings: &RateLimitSettings) -> Duration {
    let window_ms = settings.window.as_millis() as u64;
    let per_request = window_ms / u64::from(settings.max_requests.max(1));
    Duration::from_millis(per_request.max(1))
}

/// Wrap `router` in a limiter keyed by client IP
///
/// The client IP is taken from X-Forwarded-For, X-Real-IP or Forwarded,
/// falling back to the peer address.
pub fn apply_rate_limit<S>(router: Router<S>, settings: Option<RateLimitSettings>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let Some(settings) = settings else {
        info!("Rate limiting disabled");
        return router;
    };

    let config = GovernorConfigBuilder::default()
        .per_millisecond(replenish_interval(&settings).as_millis() as u64)
        .burst_size(settings.max_requests)
        .key_extractor(SmartIpKeyExtractor)
        .finish();

    match config {
        Some(config) => {
            info!(
                "Rate limiting {} requests per {}s",
                settings.max_requests,
                settings.window.as_secs()
            );
            router.layer(GovernorLayer {
                config: Box::leak(Box::new(config)),
            })
        }
        None => {
            warn!("Rate limit settings rejected by the limiter, continuing without it");
            router
        }
    }
}
