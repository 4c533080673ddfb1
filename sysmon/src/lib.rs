#![doc = include_str!("../../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod app;
pub mod error;
pub mod headless;
pub mod logging;
pub mod opts;

pub use error::{Error, Result};
