use std::{env, path::PathBuf};
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::{NonBlocking, WorkerGuard},
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    filter::Targets,
    fmt,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    Registry,
};

const LOG_PREFIX: &str = "sysmon";

fn create_registry() -> Layered<Targets, Registry> {
    let default_filter = if cfg!(debug_assertions) {
        "sysmon=debug,sysmon_core=debug"
    } else {
        "sysmon=info,sysmon_core=info"
    }
    .parse::<Targets>()
    .expect("valid filter");
    let filter = match env::var("RUST_LOG") {
        Ok(filter) => filter.parse::<Targets>().unwrap_or(default_filter),
        Err(_) => default_filter,
    };

    tracing_subscriber::registry().with(filter)
}

/// Stderr output, plus the log file when `file_writer` is set.
fn create_subscriber(file_writer: Option<NonBlocking>) -> impl Subscriber + Send + Sync {
    let file_layer = file_writer.map(|writer| {
        fmt::layer()
            .compact()
            .with_line_number(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_ansi(false)
            .with_writer(writer)
    });
    let stderr_layer = fmt::layer()
        .compact()
        .with_line_number(true)
        .with_thread_names(true)
        .with_writer(std::io::stderr);

    create_registry().with(file_layer).with(stderr_layer)
}

#[must_use]
pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(LOG_PREFIX).join("logs"))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

/// Keeps the non-blocking file writer alive. Logs are flushed when dropped.
#[derive(Debug)]
#[must_use]
pub struct Guard {
    _inner: Option<WorkerGuard>,
}

/// Initialize logging.
pub fn init() -> Guard {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(3)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .build(log_dir());
    let (file_writer, guard) = match file_appender {
        Ok(file_appender) => {
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            (Some(file_writer), Some(guard))
        }
        Err(err) => {
            eprintln!("failed to create log file, logging to stderr only: {err:?}");
            (None, None)
        }
    };

    if let Err(err) = create_subscriber(file_writer).try_init() {
        eprintln!("setting tracing default failed: {err:?}");
    }

    Guard { _inner: guard }
}
