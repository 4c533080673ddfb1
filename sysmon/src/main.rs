//! A desktop system monitor with real-time charts
//!
//! USAGE:
//!     sysmon [FLAGS] [OPTIONS]
//!
//! FLAGS:
//!         --light       Start with the light theme.
//!         --clean       Ignore the saved configuration.
//!         --headless    Print samples as JSON lines instead of opening a window.
//!     -h, --help        Prints help information
//!     -V, --version     Prints version information
//!
//! OPTIONS:
//!     -i, --interval <MS>    Update interval in milliseconds [default: 1000]
//!     -n, --history <N>      Number of samples kept for charts [default: 60]
//!         --disk <PATH>      Path whose mount point is reported as disk usage.
//!     -c, --config <PATH>    Custom config path.
//!         --count <N>        Stop after N samples in headless mode.

use clap::Parser;
use sysmon::{app::App, headless, logging, opts::Opts};

fn main() -> sysmon::Result<()> {
    let _log_guard = logging::init();

    let opts = Opts::parse();
    tracing::debug!("CLI Options: {opts:?}");
    let headless_count = opts.headless.then_some(opts.count);
    let config = opts.load()?;

    match headless_count {
        Some(count) => headless::run(&config.monitor, count),
        None => App::run(config),
    }
}
