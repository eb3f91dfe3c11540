//! Sentry and tracing setup.
//!
//! Sentry is where authorization failures get reported. Binaries call
//! [`init_sentry`] before [`init_tracing`] and keep the returned guard alive
//! for the life of the process.

use marketplace_core::UserId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{AdminConfig, LogFormat};
use crate::error::AccessError;

/// Initialize Sentry error tracking and return guard that must be kept alive.
///
/// Returns `None` when no DSN is configured.
#[must_use]
pub fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
#[must_use]
pub fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global tracing subscriber.
///
/// Uses `RUST_LOG` when set, then the configured filter, then `default_filter`.
pub fn init_tracing(config: &AdminConfig, default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| {
            config
                .log_filter
                .as_deref()
                .and_then(|f| tracing_subscriber::EnvFilter::try_new(f).ok())
        })
        .unwrap_or_else(|| default_filter.into());

    let is_json = config.log_format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Capture an access error in Sentry and log it with the event id.
pub fn report_access_error(err: &AccessError) {
    let event_id = sentry::capture_error(err);
    tracing::error!(
        error = %err,
        sentry_event_id = %event_id,
        "Authorization fetch failed"
    );
}

/// Set or clear the Sentry user context for the signed-in user.
pub fn set_sentry_user(user_id: Option<UserId>) {
    sentry::configure_scope(|scope| {
        scope.set_user(user_id.map(|id| sentry::User {
            id: Some(id.to_string()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::DirectoryError;

    #[test]
    fn test_report_access_error_captures_event() {
        let events = sentry::test::with_captured_events(|| {
            report_access_error(&AccessError::FetchFailed {
                user_id: UserId::random(),
                source: DirectoryError::Unavailable("timeout".to_string()),
            });
        });
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_set_sentry_user_sets_and_clears_scope() {
        let user_id = UserId::random();
        let events = sentry::test::with_captured_events(|| {
            set_sentry_user(Some(user_id));
            sentry::capture_message("signed in", sentry::Level::Info);
            set_sentry_user(None);
            sentry::capture_message("signed out", sentry::Level::Info);
        });

        assert_eq!(events.len(), 2);
        let user = events[0].user.as_ref().unwrap();
        assert_eq!(user.id.as_deref(), Some(user_id.to_string().as_str()));
        assert!(events[1].user.is_none());
    }
}
