use crate::app::config::Config;
use clap::Parser;
use std::{path::PathBuf, time::Duration};

/// `SysMon` CLI Config Options
#[derive(Parser, Debug, Default)]
#[command(version, author, about, long_about = None)]
#[must_use]
pub struct Opts {
    /// Update interval in milliseconds. [default: 1000]
    #[arg(short, long, value_name = "MS")]
    pub interval: Option<u64>,
    /// Number of samples kept for charts. [default: 60]
    #[arg(short = 'n', long, value_name = "N")]
    pub history: Option<usize>,
    /// Path whose mount point is reported as disk usage. [default: "/" or "C:\"]
    #[arg(long, value_name = "PATH")]
    pub disk: Option<PathBuf>,
    /// Start with the light theme.
    #[arg(long)]
    pub light: bool,
    /// Custom Config path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// "Default Config" (skip user config)
    #[arg(long)]
    pub clean: bool,
    /// Print samples as JSON lines instead of opening a window.
    #[arg(long)]
    pub headless: bool,
    /// Stop after N samples in headless mode.
    #[arg(long, value_name = "N", requires = "headless")]
    pub count: Option<u64>,
}

impl Opts {
    /// Loads a base `Config`, merging with CLI options
    pub fn load(self) -> anyhow::Result<Config> {
        let base = if self.clean {
            Config::default()
        } else {
            Config::load(self.config.clone())
        };
        self.extend(base)
    }

    /// Overrides `config` with any options given on the command line.
    pub fn extend(self, mut config: Config) -> anyhow::Result<Config> {
        if let Some(interval) = self.interval {
            config
                .monitor
                .set_update_interval(Duration::from_millis(interval))?;
        }
        if let Some(history) = self.history {
            config.monitor.set_history_size(history)?;
        }
        if let Some(disk) = self.disk {
            config.monitor.disk_path = disk;
        }
        if self.light {
            config.renderer.dark_theme = false;
        }
        if self.config.is_some() {
            config.path = self.config;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let opts = Opts::try_parse_from([
            "sysmon", "-i", "500", "-n", "120", "--light", "--headless", "--count", "3",
        ])
        .expect("valid opts");
        assert_eq!(opts.interval, Some(500));
        assert_eq!(opts.count, Some(3));
        assert!(opts.headless);

        let config = opts.extend(Config::default()).expect("valid config");
        assert_eq!(config.monitor.update_interval, Duration::from_millis(500));
        assert_eq!(config.monitor.history_size, 120);
        assert!(!config.renderer.dark_theme);
    }

    #[test]
    fn count_requires_headless() {
        assert!(Opts::try_parse_from(["sysmon", "--count", "3"]).is_err());
    }

    #[test]
    fn rejects_short_interval() {
        let opts = Opts::try_parse_from(["sysmon", "--interval", "10"]).expect("valid opts");
        assert!(opts.extend(Config::default()).is_err());
    }

    #[test]
    fn cli_definition() {
        use clap::CommandFactory;
        Opts::command().debug_assert();
    }
}
