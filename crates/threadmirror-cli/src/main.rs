//! ThreadMirror CLI entry point.

use clap::Parser;
use threadmirror_cli::{run, Cli};
use threadmirror_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Filter precedence: RUST_LOG, then the config file, then the default.
    let fallback_filter = Config::load(&cli.config)
        .ok()
        .and_then(|c| c.logging.filter)
        .unwrap_or_else(|| "threadmirror=info".into());

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    run(cli).await
}
