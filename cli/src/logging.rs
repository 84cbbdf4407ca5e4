use tracing::metadata::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `-v` raises the level step by step; without it `RUST_LOG` decides, and
/// nothing is logged when that is unset either.
pub fn log_init(verbose: u8) {
    let level = match verbose {
        0 => None,
        1 => Some(LevelFilter::WARN),
        2 => Some(LevelFilter::INFO),
        3 => Some(LevelFilter::DEBUG),
        _ => Some(LevelFilter::TRACE),
    };

    let builder = SubscriberBuilder::default().with_writer(std::io::stderr);
    match level {
        Some(level) => builder.with_max_level(level).init(),
        None => builder
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
            .init(),
    }
}
