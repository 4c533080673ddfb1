use crate::app::config::Config;
use sysmon_core::{process::ProcessInfo, sample::Sample};

/// Events sent from the sampling thread.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum SamplingEvent {
    Sample(Box<Sample>),
    Processes(Vec<ProcessInfo>),
}

/// Events raised by the dashboard.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum UiEvent {
    ConfigChanged(Box<Config>),
    Terminate,
}

#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum AppEvent {
    Sampling(SamplingEvent),
    Ui(UiEvent),
}

impl From<SamplingEvent> for AppEvent {
    fn from(event: SamplingEvent) -> Self {
        Self::Sampling(event)
    }
}

impl From<UiEvent> for AppEvent {
    fn from(event: UiEvent) -> Self {
        Self::Ui(event)
    }
}

impl From<Sample> for SamplingEvent {
    fn from(sample: Sample) -> Self {
        Self::Sample(Box::new(sample))
    }
}
