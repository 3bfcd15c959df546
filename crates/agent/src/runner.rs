//! Feed replay loop.

use anyhow::Context;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use plant_monitor_core::parse_definitions;
use plant_monitor_events::GlobalProblemStatus;

use crate::config::AgentConfig;
use crate::feed;
use crate::monitor::PlantMonitor;

/// Counters for one replayed feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub lines: usize,
    pub applied: usize,
    /// Lines that were not valid feed JSON.
    pub malformed: usize,
    /// Well-formed commands the monitor refused (unknown plant, duplicate, ...).
    pub rejected: usize,
}

/// Apply every line of `reader` to the monitor.
///
/// Malformed lines and rejected commands are logged and skipped; only I/O
/// errors abort the replay.
pub async fn replay<R>(monitor: &mut PlantMonitor, reader: R) -> anyhow::Result<FeedStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read feed")? {
        stats.lines += 1;
        let command = match feed::parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line = stats.lines, error = %e, "Skipping malformed feed line");
                stats.malformed += 1;
                continue;
            }
        };

        let plant_id = command.plant_id().clone();
        if let Err(e) = monitor.apply(command) {
            tracing::warn!(line = stats.lines, plant_id = %plant_id, error = %e, "Feed command rejected");
            stats.rejected += 1;
            continue;
        }
        stats.applied += 1;
        monitor.process_notifications();
    }

    Ok(stats)
}

/// Load plant definitions, replay the configured feed and return the final
/// global status.
pub async fn run(config: &AgentConfig) -> anyhow::Result<GlobalProblemStatus> {
    let raw = tokio::fs::read_to_string(&config.plant_config_path)
        .await
        .with_context(|| {
            format!(
                "Failed to read plant definitions from {}",
                config.plant_config_path.display()
            )
        })?;
    let definitions = parse_definitions(&raw)?;

    let mut monitor = PlantMonitor::new(config.event_bus_capacity);
    monitor.load(definitions)?;
    monitor.process_notifications();
    tracing::info!(
        plants = monitor.registry().tracked_plants().len(),
        "Plant definitions loaded"
    );

    let stats = match &config.feed_path {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open feed {}", path.display()))?;
            replay(&mut monitor, BufReader::new(file)).await?
        }
        None => replay(&mut monitor, BufReader::new(tokio::io::stdin())).await?,
    };

    let status = monitor.status();
    tracing::info!(
        lines = stats.lines,
        applied = stats.applied,
        malformed = stats.malformed,
        rejected = stats.rejected,
        any_problem = status.any_problem,
        detail = %serde_json::to_string(&status.detail)?,
        "Feed complete"
    );

    monitor.shutdown();
    Ok(status)
}
