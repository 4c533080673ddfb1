use crate::{
    process::ProcessInfo,
    source::{Counters, MetricsSource},
};
use std::path::PathBuf;

/// Browsers expose no system counters, so every reading is unavailable.
#[derive(Default, Debug)]
#[must_use]
pub struct System;

impl System {
    pub fn new(_disk_path: PathBuf) -> Self {
        Self
    }
}

impl MetricsSource for System {
    fn refresh(&mut self) {}

    fn counters(&self) -> Counters {
        Counters::default()
    }

    fn processes(&self) -> Vec<ProcessInfo> {
        Vec::new()
    }
}
