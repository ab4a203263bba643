use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Dispatch tuning parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Maximum retry rounds after the initial dispatch (0 = no retries).
    pub max_retries: u32,
    /// Optional delay in seconds between retry rounds. Unset = re-dispatch
    /// immediately, which matches how the crawl has always been run.
    #[serde(default)]
    pub round_delay_secs: Option<f64>,
    /// Delay in milliseconds between successive worker starts, so several
    /// browser sessions do not all come up at the same instant.
    pub worker_stagger_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            round_delay_secs: None,
            worker_stagger_ms: 500,
        }
    }
}

/// Global configuration loaded from `~/.config/sawari/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Number of parallel extraction workers.
    pub workers: usize,
    /// Per-job extraction timeout in seconds. The extractor process is
    /// killed when this elapses.
    pub job_timeout_secs: u64,
    /// Optional dispatch tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub dispatch: Option<DispatchConfig>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            workers: 6,
            job_timeout_secs: 150,
            dispatch: None,
        }
    }
}

impl CrawlConfig {
    pub fn job_timeout(&self) -> Duration {
        Duration::from_secs(self.job_timeout_secs)
    }

    /// Dispatch tuning with defaults filled in for a missing section.
    pub fn dispatch(&self) -> DispatchConfig {
        self.dispatch.clone().unwrap_or_default()
    }
}

impl DispatchConfig {
    pub fn round_delay(&self) -> Option<Duration> {
        self.round_delay_secs.map(Duration::from_secs_f64)
    }

    pub fn worker_stagger(&self) -> Duration {
        Duration::from_millis(self.worker_stagger_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("sawari")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<CrawlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = CrawlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: CrawlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = CrawlConfig::default();
        assert_eq!(cfg.workers, 6);
        assert_eq!(cfg.job_timeout_secs, 150);
        assert!(cfg.dispatch.is_none());
        let d = cfg.dispatch();
        assert_eq!(d.max_retries, 2);
        assert!(d.round_delay().is_none());
        assert_eq!(d.worker_stagger_ms, 500);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = CrawlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: CrawlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.workers, cfg.workers);
        assert_eq!(parsed.job_timeout_secs, cfg.job_timeout_secs);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            workers = 4
            job_timeout_secs = 90
        "#;
        let cfg: CrawlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.job_timeout_secs, 90);
        assert!(cfg.dispatch.is_none());
    }

    #[test]
    fn config_toml_dispatch_section() {
        let toml = r#"
            workers = 6
            job_timeout_secs = 150

            [dispatch]
            max_retries = 3
            round_delay_secs = 1.5
            worker_stagger_ms = 250
        "#;
        let cfg: CrawlConfig = toml::from_str(toml).unwrap();
        let d = cfg.dispatch();
        assert_eq!(d.max_retries, 3);
        assert!((d.round_delay_secs.unwrap() - 1.5).abs() < 1e-9);
        assert_eq!(d.worker_stagger(), Duration::from_millis(250));
    }
}
