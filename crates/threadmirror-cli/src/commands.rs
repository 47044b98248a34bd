//! Command implementations.

use anyhow::Context;
use std::path::Path;
use threadmirror_core::Config;

/// Validate the configuration file and report the configured routes.
pub fn check(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;

    println!(
        "ok: {} -> {}, {} route(s)",
        config.source_space,
        config.target_space,
        config.routes.len()
    );
    for route in &config.routes {
        match route.source_topic {
            Some(topic) => println!("  topic {} -> topic {}", topic, route.target_topic),
            None => println!("  general -> topic {}", route.target_topic),
        }
    }
    Ok(())
}

/// Load the configuration and run the bridge until the event stream ends.
#[cfg(feature = "telegram")]
pub async fn run_bridge(config_path: &Path) -> anyhow::Result<()> {
    use std::sync::Arc;
    use threadmirror_engine::telegram::{run_event_listener, TelegramTransport};
    use threadmirror_engine::{Engine, EngineConfig, RouteTable};
    use tokio::sync::mpsc;
    use tracing::info;

    let config = Config::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;
    let token = Config::api_token()?;

    let transport = Arc::new(TelegramTransport::new(token.expose_secret()));
    let routes = RouteTable::from_config(&config.routes);
    let engine = Engine::new(
        routes,
        transport.clone(),
        EngineConfig::from_config(&config),
    );

    info!(
        source = %config.source_space,
        target = %config.target_space,
        "starting bridge"
    );

    let (tx, rx) = mpsc::channel(1024);
    let listener = tokio::spawn(run_event_listener(
        transport.bot().clone(),
        config.source_space,
        tx,
    ));

    engine.run(rx).await?;
    listener.abort();
    Ok(())
}

/// Without a transport backend compiled in there is nothing to run.
#[cfg(not(feature = "telegram"))]
pub async fn run_bridge(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    config.validate()?;
    anyhow::bail!("this build has no transport backend; rebuild with `--features telegram`")
}
