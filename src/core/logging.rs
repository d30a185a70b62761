use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::config::Config;

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `config.log_level`.
/// Fails if a subscriber is already installed or the level does not parse.
pub fn init_logging(config: &Config) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("warn,lorekeep={}", config.log_level))?,
    };
    let registry = tracing_subscriber::registry().with(filter);
    if config.log_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .try_init()?;
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()?;
    }
    Ok(())
}
