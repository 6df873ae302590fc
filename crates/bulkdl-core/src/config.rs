use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Engine defaults loaded from `~/.config/bulkdl/config.toml`.
///
/// These are the fallback knobs for the CLI; library callers set the same
/// values through [`crate::DownloaderBuilder`] and may ignore this file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkdlConfig {
    /// Number of parallel worker threads per batch.
    pub num_workers: usize,
    /// Consecutive failures one worker tolerates before cooling down.
    pub err_tolerance: u32,
    /// Seconds a tripped worker pauses before continuing.
    pub cooldown_secs: u64,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Targets processed between ledger flushes.
    pub batch_size: usize,
}

impl Default for BulkdlConfig {
    fn default() -> Self {
        Self {
            num_workers: 4,
            err_tolerance: 1000,
            cooldown_secs: 0,
            timeout_secs: 600,
            batch_size: 1024,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bulkdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BulkdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BulkdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BulkdlConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BulkdlConfig::default();
        assert_eq!(cfg.num_workers, 4);
        assert_eq!(cfg.err_tolerance, 1000);
        assert_eq!(cfg.cooldown_secs, 0);
        assert_eq!(cfg.timeout_secs, 600);
        assert_eq!(cfg.batch_size, 1024);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = BulkdlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: BulkdlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.num_workers, cfg.num_workers);
        assert_eq!(parsed.err_tolerance, cfg.err_tolerance);
        assert_eq!(parsed.cooldown_secs, cfg.cooldown_secs);
        assert_eq!(parsed.timeout_secs, cfg.timeout_secs);
        assert_eq!(parsed.batch_size, cfg.batch_size);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            num_workers = 8
            err_tolerance = 5
            cooldown_secs = 30
            timeout_secs = 20
            batch_size = 256
        "#;
        let cfg: BulkdlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.num_workers, 8);
        assert_eq!(cfg.err_tolerance, 5);
        assert_eq!(cfg.cooldown_secs, 30);
        assert_eq!(cfg.timeout_secs, 20);
        assert_eq!(cfg.batch_size, 256);
    }
}
