//! Tracing subscriber setup.
//!
//! Events always go to stdout in the configured [`LogFormat`]. When
//! `SHOP_LOG_DIR` is set they are also written as JSON lines to a daily-rotated
//! `shop.<date>.log` file in that directory. Error and warning events are
//! forwarded to Sentry.
//!
//! JSON events are flattened and carry the fields of the innermost span under
//! `"span"`, which for handler events is the per-request span with
//! `request_id` and `session_id`.

use std::path::Path;

use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{LogFormat, ShopConfig};

/// Log files kept in `SHOP_LOG_DIR` before the oldest is deleted.
pub const MAX_LOG_FILES: usize = 4;

/// Prefix of rotated log file names.
pub const LOG_FILE_PREFIX: &str = "shop";

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to open log directory: {0}")]
    Appender(#[from] InitError),

    #[error("Failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// One flattened JSON object per event.
pub fn json_layer<S, W>(writer: W) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(writer)
        .boxed()
}

fn stdout_layer<S>(format: LogFormat) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    match format {
        LogFormat::Json => json_layer(std::io::stdout),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().pretty().boxed(),
    }
}

/// Open a non-blocking writer onto daily-rotated files in `dir`.
///
/// Buffered lines are flushed when the returned guard is dropped.
pub fn file_writer(dir: &Path) -> Result<(NonBlocking, WorkerGuard), TelemetryError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?;
    Ok(tracing_appender::non_blocking(appender))
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber.
///
/// The returned guard must be held until shutdown when file logging is on.
pub fn init(config: &ShopConfig) -> Result<Option<WorkerGuard>, TelemetryError> {
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cartwheel_storefront=info,tower_http=info".into());

    let (file_layer, guard) = match config.log_dir.as_deref() {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            (Some(json_layer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer(config.log_format))
        .with(file_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .try_init()?;

    Ok(guard)
}
