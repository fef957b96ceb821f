use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "gsignin=info";

/// `-v` flags win over `RUST_LOG`, which wins over [`DEFAULT_FILTER`].
pub fn filter_for(verbosity: u8, rust_log: Option<&str>) -> Result<EnvFilter> {
    let filter = match verbosity {
        0 => match rust_log {
            Some(directives) if !directives.is_empty() => EnvFilter::try_new(directives)?,
            _ => EnvFilter::new(DEFAULT_FILTER),
        },
        1 => EnvFilter::try_new("gsignin=debug")?,
        _ => EnvFilter::try_new("trace")?,
    };
    Ok(filter)
}

/// Logs go to stderr; stdout stays free for command output.
pub fn init(verbosity: u8) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = filter_for(verbosity, rust_log.as_deref())?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .compact(),
        )
        .try_init()?;

    Ok(())
}
