#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod alert;
pub mod config;
pub mod error;
pub mod format;
pub mod fs;
pub mod history;
pub mod monitor;
pub mod process;
pub mod rate;
pub mod sample;
pub mod source;
pub mod sys;

pub mod prelude {
    //! The prelude re-exports the common types used to sample and display metrics.

    pub use crate::{
        alert::{Alert, Alerts, Metric, Thresholds},
        config::MonitorConfig,
        history::{Histories, History, Series, Stats},
        monitor::Monitor,
        process::{ProcessInfo, SortBy},
        rate::{FrameCounter, RateCounter},
        sample::{IoRate, Sample, Usage},
        source::{Counters, MetricsSource},
    };
}
