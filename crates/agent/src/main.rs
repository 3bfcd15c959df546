//! `plant-monitor-agent` -- replays a houseplant sensor feed.
//!
//! Loads plant definitions, applies a newline-delimited JSON feed of
//! readings, threshold changes and membership events, and logs metric
//! transitions and the global "any plant has a problem" signal.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default  | Description                              |
//! |----------------------|----------|----------|------------------------------------------|
//! | `PLANT_CONFIG_PATH`  | yes      | --       | JSON array of plant definitions          |
//! | `PLANT_FEED_PATH`    | no       | stdin    | Feed file (`-` also means stdin)         |
//! | `LOG_FORMAT`         | no       | `pretty` | `pretty` or `json`                       |
//! | `EVENT_BUS_CAPACITY` | no       | `1024`   | Broadcast channel capacity               |
//! | `RUST_LOG`           | no       | `info`   | `EnvFilter` directives for the three crates |

use plant_monitor_agent::config::{AgentConfig, LogFormat};
use plant_monitor_agent::runner;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "plant_monitor_agent=info,plant_monitor_core=info,plant_monitor_events=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    init_tracing(LogFormat::from_value(
        std::env::var("LOG_FORMAT").ok().as_deref(),
    ));

    let config = AgentConfig::from_env()?;
    let feed = config
        .feed_path
        .as_ref()
        .map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
    tracing::info!(
        plant_config = %config.plant_config_path.display(),
        feed = %feed,
        "Starting plant-monitor-agent",
    );

    let status = runner::run(&config).await?;
    if status.any_problem {
        tracing::warn!(
            plants = status.detail.plants_with_problems.len(),
            problems = status.detail.total_problems,
            "Plants need attention"
        );
    }
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}
