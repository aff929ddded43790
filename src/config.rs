use crate::server::SamplingConfig;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub sampling: SamplingSection,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SamplingSection {
    /// Utilization observation window; each snapshot takes at least this long.
    pub interval_ms: u64,
    pub retry_initial_ms: u64,
    pub retry_max_ms: u64,
    /// Failure events buffered for the consumer before new ones are dropped.
    #[serde(default = "default_failure_capacity")]
    pub failure_capacity: usize,
}

fn default_failure_capacity() -> usize {
    16
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub pretty: bool,
    /// Exit after printing this many snapshots; runs until signalled when unset.
    #[serde(default)]
    pub limit: Option<u64>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path, e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.sampling.interval_ms > 0,
            "sampling.interval_ms must be > 0, got {}",
            self.sampling.interval_ms
        );
        anyhow::ensure!(
            self.sampling.retry_initial_ms > 0,
            "sampling.retry_initial_ms must be > 0, got {}",
            self.sampling.retry_initial_ms
        );
        anyhow::ensure!(
            self.sampling.retry_max_ms >= self.sampling.retry_initial_ms,
            "sampling.retry_max_ms must be >= sampling.retry_initial_ms ({}), got {}",
            self.sampling.retry_initial_ms,
            self.sampling.retry_max_ms
        );
        anyhow::ensure!(
            self.sampling.failure_capacity > 0,
            "sampling.failure_capacity must be > 0, got {}",
            self.sampling.failure_capacity
        );
        if let Some(limit) = self.output.limit {
            anyhow::ensure!(limit > 0, "output.limit must be > 0 when set, got {}", limit);
        }
        Ok(())
    }

    pub fn sampling_config(&self) -> SamplingConfig {
        SamplingConfig {
            interval: Duration::from_millis(self.sampling.interval_ms),
            retry_initial: Duration::from_millis(self.sampling.retry_initial_ms),
            retry_max: Duration::from_millis(self.sampling.retry_max_ms),
            failure_capacity: self.sampling.failure_capacity,
        }
    }
}
