//! Tracing subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. `RUST_LOG` overrides `default_filter`.
pub fn initialize(default_filter: &str) -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        // polars and the GUI stack are chatty at debug level
        format!("{default_filter},winit=warn,wgpu=warn,eframe=warn")
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_new(&filter)?)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()?;

    tracing::debug!("Log filter: {}", filter);
    Ok(())
}
