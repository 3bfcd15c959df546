use std::path::PathBuf;

use anyhow::{bail, Context};

use plant_monitor_events::DEFAULT_CAPACITY;

/// Output format of the `fmt` tracing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; unrecognised values fall back to pretty.
    pub fn from_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Agent configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// JSON file holding the plant definitions.
    pub plant_config_path: PathBuf,
    /// Newline-delimited JSON feed; `None` reads stdin.
    pub feed_path: Option<PathBuf>,
    pub log_format: LogFormat,
    pub event_bus_capacity: usize,
}

impl AgentConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var              | Default  |
    /// |----------------------|----------|
    /// | `PLANT_CONFIG_PATH`  | required |
    /// | `PLANT_FEED_PATH`    | stdin    |
    /// | `LOG_FORMAT`         | `pretty` |
    /// | `EVENT_BUS_CAPACITY` | `1024`   |
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let plant_config_path = lookup("PLANT_CONFIG_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .context("PLANT_CONFIG_PATH environment variable is required")?;

        let feed_path = lookup("PLANT_FEED_PATH")
            .filter(|v| !v.trim().is_empty() && v != "-")
            .map(PathBuf::from);

        let log_format = LogFormat::from_value(lookup("LOG_FORMAT").as_deref());

        let event_bus_capacity = match lookup("EVENT_BUS_CAPACITY") {
            None => DEFAULT_CAPACITY,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => {
                    tracing::warn!(value = %raw, "Invalid EVENT_BUS_CAPACITY, using default");
                    DEFAULT_CAPACITY
                }
                Ok(n) => n,
            },
        };

        if plant_config_path.is_dir() {
            bail!(
                "PLANT_CONFIG_PATH points to a directory: {}",
                plant_config_path.display()
            );
        }

        Ok(Self {
            plant_config_path,
            feed_path,
            log_format,
            event_bus_capacity,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
