use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::field::SLOT_POOL_SIZE;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("round duration must be positive")]
    NonPositiveDuration,
    #[error("target count must be in 1..={SLOT_POOL_SIZE}, got {0}")]
    TargetCountOutOfRange(usize),
    #[error("concurrency must be in 1..=target count ({target_count}), got {concurrency}")]
    ConcurrencyOutOfRange {
        concurrency: usize,
        target_count: usize,
    },
    #[error("rotation interval must be positive")]
    NonPositiveRotation,
    #[error("cannot reconfigure while a round is running")]
    RoundInProgress,
}

/// Validated per-round parameters. Construction is the validation point:
/// a `RoundConfig` in hand means every field is usable as-is, which is what
/// keeps the field's rejection sampling from ever spinning forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundConfig {
    pub duration: Duration,
    pub target_count: usize,
    pub concurrency: usize,
    pub rotation_interval: Duration,
}

impl RoundConfig {
    pub fn new(
        duration: Duration,
        target_count: usize,
        concurrency: usize,
        rotation_interval: Duration,
    ) -> Result<Self, ConfigError> {
        if duration.is_zero() {
            return Err(ConfigError::NonPositiveDuration);
        }
        if target_count == 0 || target_count > SLOT_POOL_SIZE {
            return Err(ConfigError::TargetCountOutOfRange(target_count));
        }
        if concurrency == 0 || concurrency > target_count {
            return Err(ConfigError::ConcurrencyOutOfRange {
                concurrency,
                target_count,
            });
        }
        if rotation_interval.is_zero() {
            return Err(ConfigError::NonPositiveRotation);
        }
        Ok(Self {
            duration,
            target_count,
            concurrency,
            rotation_interval,
        })
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        // 10 second round, full nine-slot grid, four moles up at a time,
        // new set every second
        Self {
            duration: Duration::from_secs(10),
            target_count: 9,
            concurrency: 4,
            rotation_interval: Duration::from_millis(1000),
        }
    }
}

/// Saved settings, written back after any Idle-screen adjustment so the
/// last-used round shape becomes the next run's default. Plain primitive
/// units on disk; validated only when turned back into a `RoundConfig`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub round_secs: u64,
    pub target_count: usize,
    pub concurrency: usize,
    pub rotation_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self::from(&RoundConfig::default())
    }
}

impl From<&RoundConfig> for Config {
    fn from(rc: &RoundConfig) -> Self {
        Self {
            round_secs: rc.duration.as_secs(),
            target_count: rc.target_count,
            concurrency: rc.concurrency,
            rotation_ms: rc.rotation_interval.as_millis() as u64,
        }
    }
}

impl Config {
    /// A hand-edited or stale file can hold any numbers, so this revalidates.
    pub fn to_round_config(&self) -> Result<RoundConfig, ConfigError> {
        RoundConfig::new(
            Duration::from_secs(self.round_secs),
            self.target_count,
            self.concurrency,
            Duration::from_millis(self.rotation_ms),
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "whak") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("whak_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    fn valid() -> RoundConfig {
        RoundConfig::default()
    }

    #[test]
    fn test_default_round_config_is_valid() {
        let d = valid();
        assert!(RoundConfig::new(d.duration, d.target_count, d.concurrency, d.rotation_interval)
            .is_ok());
    }

    #[test]
    fn test_rejects_zero_duration() {
        let d = valid();
        assert_matches!(
            RoundConfig::new(Duration::ZERO, d.target_count, d.concurrency, d.rotation_interval),
            Err(ConfigError::NonPositiveDuration)
        );
    }

    #[test]
    fn test_rejects_target_count_outside_pool() {
        let d = valid();
        assert_matches!(
            RoundConfig::new(d.duration, 0, 1, d.rotation_interval),
            Err(ConfigError::TargetCountOutOfRange(0))
        );
        assert_matches!(
            RoundConfig::new(d.duration, SLOT_POOL_SIZE + 1, 1, d.rotation_interval),
            Err(ConfigError::TargetCountOutOfRange(_))
        );
    }

    #[test]
    fn test_rejects_concurrency_above_target_count() {
        let d = valid();
        assert_matches!(
            RoundConfig::new(d.duration, 3, 4, d.rotation_interval),
            Err(ConfigError::ConcurrencyOutOfRange {
                concurrency: 4,
                target_count: 3
            })
        );
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let d = valid();
        assert_matches!(
            RoundConfig::new(d.duration, 9, 0, d.rotation_interval),
            Err(ConfigError::ConcurrencyOutOfRange { concurrency: 0, .. })
        );
    }

    #[test]
    fn test_rejects_zero_rotation_interval() {
        let d = valid();
        assert_matches!(
            RoundConfig::new(d.duration, d.target_count, d.concurrency, Duration::ZERO),
            Err(ConfigError::NonPositiveRotation)
        );
    }

    #[test]
    fn test_concurrency_equal_to_target_count_is_valid() {
        let d = valid();
        assert!(RoundConfig::new(d.duration, 5, 5, d.rotation_interval).is_ok());
    }

    #[test]
    fn test_saved_config_mirrors_round_config() {
        let rc = RoundConfig::new(
            Duration::from_secs(30),
            6,
            2,
            Duration::from_millis(750),
        )
        .unwrap();

        let cfg = Config::from(&rc);
        assert_eq!(cfg.round_secs, 30);
        assert_eq!(cfg.rotation_ms, 750);
        assert_eq!(cfg.to_round_config().unwrap(), rc);
    }

    #[test]
    fn test_stale_saved_config_is_revalidated() {
        let cfg = Config {
            round_secs: 10,
            target_count: 2,
            concurrency: 7,
            rotation_ms: 1000,
        };
        assert_matches!(
            cfg.to_round_config(),
            Err(ConfigError::ConcurrencyOutOfRange { .. })
        );
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = Config {
            round_secs: 45,
            target_count: 6,
            concurrency: 3,
            rotation_ms: 500,
        };
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn load_falls_back_to_defaults_on_missing_or_garbage_file() {
        let dir = tempdir().unwrap();

        let store = FileConfigStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), Config::default());

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, b"not json").unwrap();
        let store = FileConfigStore::with_path(&garbage);
        assert_eq!(store.load(), Config::default());
    }
}
