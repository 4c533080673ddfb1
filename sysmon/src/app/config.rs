use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use sysmon_core::{config::MonitorConfig, fs};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
#[serde(default)] // Ensures new fields don't break existing configurations
pub struct RendererConfig {
    pub dark_theme: bool,
    pub vsync: bool,
    pub show_processes: bool,
    pub show_alerts: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            dark_theme: true,
            vsync: true,
            show_processes: true,
            show_alerts: true,
        }
    }
}

/// Application configuration.
///
/// # Config JSON
///
/// Configuration for `SysMon` is stored (by default) in `~/.config/sysmon/config.json`
/// with defaults that can be customized in the settings window.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
#[serde(default)] // Ensures new fields don't break existing configurations
pub struct Config {
    pub monitor: MonitorConfig,
    pub renderer: RendererConfig,
    /// Custom location given on the command line.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Config {
    pub const BASE_DIR: &'static str = "sysmon";
    pub const WINDOW_TITLE: &'static str = "System Monitor";
    pub const FILENAME: &'static str = "config.json";
    pub const WINDOW_SIZE: (f32, f32) = (1200.0, 700.0);
    pub const MIN_WINDOW_SIZE: (f32, f32) = (900.0, 600.0);

    #[must_use]
    pub fn default_config_dir() -> PathBuf {
        dirs::config_local_dir().map_or_else(
            || PathBuf::from("config"),
            |dir| dir.join(Self::BASE_DIR),
        )
    }

    #[must_use]
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(Self::FILENAME)
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(Self::default_config_path)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = self.config_path();
        let data = serde_json::to_vec_pretty(&self).context("failed to serialize config")?;
        fs::save_raw(&path, &data).context("failed to save config")?;
        info!("Saved configuration to {path:?}");

        Ok(())
    }

    pub fn load(path: Option<PathBuf>) -> Self {
        let config_path = path.clone().unwrap_or_else(Self::default_config_path);

        let mut config = fs::exists(&config_path)
            .then(|| {
                info!("Loading saved configuration: {}", fs::filename(&config_path));
                fs::load_raw(&config_path)
                    .context("failed to load config")
                    .and_then(|data| Ok(serde_json::from_slice::<Self>(&data)?))
                    .with_context(|| format!("failed to parse {config_path:?}"))
                    .unwrap_or_else(|err| {
                        error!(
                            "Invalid config: {config_path:?}, reverting to defaults. Error: {err:?}",
                        );
                        Self::default()
                    })
            })
            .unwrap_or_else(|| {
                info!("Loading default configuration");
                Self::default()
            });

        if let Err(err) = config.monitor.validate() {
            error!("Invalid monitor config, reverting to defaults. Error: {err:?}");
            config.monitor = MonitorConfig::default();
        }
        config.path = path;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("sysmon-config-{}-{name}", std::process::id()))
            .join(Config::FILENAME)
    }

    #[test]
    fn save_and_load() {
        let path = temp_path("roundtrip");
        let mut config = Config {
            path: Some(path.clone()),
            ..Config::default()
        };
        config.renderer.dark_theme = false;
        config.monitor.thresholds.cpu = 65.0;
        config.save().expect("saved config");

        let loaded = Config::load(Some(path.clone()));
        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn invalid_file_reverts_to_defaults() {
        let path = temp_path("invalid");
        fs::save_raw(&path, b"{ not json").expect("saved data");
        let loaded = Config::load(Some(path.clone()));
        assert_eq!(loaded.monitor, MonitorConfig::default());
        assert_eq!(loaded.renderer, RendererConfig::default());
        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }

    #[test]
    fn invalid_monitor_values_revert() {
        let path = temp_path("interval");
        let mut config = Config::default();
        config.monitor.update_interval = Duration::from_millis(5);
        config.renderer.vsync = false;
        fs::save_raw(&path, &serde_json::to_vec(&config).expect("serialized"))
            .expect("saved data");
        let loaded = Config::load(Some(path.clone()));
        assert_eq!(loaded.monitor.update_interval, MonitorConfig::DEFAULT_INTERVAL);
        assert!(!loaded.renderer.vsync);
        let _ = std::fs::remove_dir_all(path.parent().expect("parent dir"));
    }
}
