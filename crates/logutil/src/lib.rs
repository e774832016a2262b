//! Utilities for logging.
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::MakeWriter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    HumanReadable,
    Json,
}

/// Install the global subscriber.
///
/// `default_level` applies when `RUST_LOG` is unset or unparseable. Calling
/// this more than once keeps the first subscriber.
pub fn configure_global_logger<W>(default_level: Level, format: LogFormat, make_writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(default_level).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer);

    let result = match format {
        LogFormat::HumanReadable => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if result.is_err() {
        tracing::debug!("global logger already configured");
    }
}

/// Logger for tests, output is captured by the test harness.
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}
