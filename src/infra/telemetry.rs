use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
///
/// Logs go to stderr so `quire render` can write the document to stdout.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

/// Register descriptions for the render cache counters.
pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "quire_render_cache_hit_total",
            Unit::Count,
            "Renders served from a finished cache entry."
        );
        describe_counter!(
            "quire_render_cache_miss_total",
            Unit::Count,
            "Renders that started a new computation."
        );
        describe_counter!(
            "quire_render_cache_coalesced_total",
            Unit::Count,
            "Renders that joined an in-flight computation for the same page version."
        );
        describe_counter!(
            "quire_render_cache_bypass_total",
            Unit::Count,
            "Renders for a page version older than the cached one."
        );
        describe_counter!(
            "quire_render_cache_evict_total",
            Unit::Count,
            "Cache entries dropped, labelled by reason (stale or capacity)."
        );
    });
}
