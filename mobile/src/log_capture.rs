use std::sync::{Arc, OnceLock, RwLock};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{reload, EnvFilter, Layer};

/// Mirrors tracing events into the in-app log panel buffer.
pub struct LogCaptureLayer;

struct MessageVisitor {
    message: String,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

pub(crate) fn level_name(level: &tracing::Level) -> &'static str {
    match *level {
        tracing::Level::ERROR => "ERROR",
        tracing::Level::WARN => "WARN",
        tracing::Level::INFO => "INFO",
        tracing::Level::DEBUG => "DEBUG",
        tracing::Level::TRACE => "TRACE",
    }
}

impl<S> Layer<S> for LogCaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = metadata.level();

        let mut visitor = MessageVisitor {
            message: String::new(),
        };
        event.record(&mut visitor);

        let log_line = format!("[{}] {}: {}", level, metadata.target(), visitor.message);

        crate::dialer_app::append_log(level_name(level), log_line);
    }
}

// Type-erased reload handle using a closure
type ReloadFn = Box<dyn Fn(&str) + Send + Sync>;

static RELOAD_HANDLE: OnceLock<Arc<RwLock<Option<ReloadFn>>>> = OnceLock::new();

fn get_reload_handle() -> &'static Arc<RwLock<Option<ReloadFn>>> {
    RELOAD_HANDLE.get_or_init(|| Arc::new(RwLock::new(None)))
}

/// Store the reload handle for later use (type-erased)
pub fn set_reload_fn<F>(reload_fn: F)
where
    F: Fn(&str) + Send + Sync + 'static,
{
    if let Ok(mut handle) = get_reload_handle().write() {
        *handle = Some(Box::new(reload_fn));
    }
}

/// Update the tracing log level at runtime
pub fn update_tracing_level(level: &str) {
    if let Ok(handle) = get_reload_handle().read() {
        if let Some(ref reload_fn) = *handle {
            reload_fn(level);
        }
    }
}

/// Log level saved in settings, lowercased for `EnvFilter`. Falls back to "error".
pub fn configured_log_level() -> String {
    crate::Config::new()
        .and_then(|config| config.load_settings())
        .map(|settings| settings.log_level.to_lowercase())
        .unwrap_or_else(|_| "error".to_string())
}

/// Filter for a level string; unparsable input falls back to "error".
pub fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("error"))
}

/// Installs the global subscriber: reloadable filter, fmt output and the
/// in-app capture layer. `RUST_LOG` wins over `log_level` when set.
pub fn init_tracing(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| build_filter(log_level));
    let (filter, reload_handle) = reload::Layer::new(env_filter);

    set_reload_fn(move |level: &str| {
        if let Err(e) = reload_handle.reload(build_filter(level)) {
            eprintln!("Failed to reload log filter: {}", e);
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(LogCaptureLayer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_build_filter_falls_back_to_error() {
        assert_eq!(build_filter("debug").to_string(), "debug");
        assert_eq!(build_filter("dialer=notalevel").to_string(), "error");
    }

    #[test]
    fn test_update_tracing_level_calls_reload_fn() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        set_reload_fn(|level: &str| {
            assert_eq!(level, "debug");
            CALLS.fetch_add(1, Ordering::SeqCst);
        });
        update_tracing_level("debug");

        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_level_name() {
        assert_eq!(level_name(&tracing::Level::WARN), "WARN");
        assert_eq!(level_name(&tracing::Level::TRACE), "TRACE");
    }
}
