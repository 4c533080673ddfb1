//! Raw file helpers used to persist configuration.

use std::{
    fs::{create_dir_all, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::warn;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[must_use]
pub enum Error {
    #[error("invalid path: {0:?}")]
    InvalidPath(PathBuf),
    #[error("{context}: {source:?}")]
    Io {
        source: std::io::Error,
        context: String,
    },
}

impl Error {
    pub fn io(source: std::io::Error, context: impl Into<String>) -> Self {
        Self::Io {
            source,
            context: context.into(),
        }
    }
}

impl From<Error> for crate::error::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidPath(path) => Self::InvalidPath(path),
            Error::Io { source, context } => Self::Io { context, source },
        }
    }
}

fn writer(path: &Path) -> Result<impl Write> {
    let Some(directory) = path.parent() else {
        return Err(Error::InvalidPath(path.to_path_buf()));
    };
    if !directory.as_os_str().is_empty() && !directory.exists() {
        create_dir_all(directory)
            .map_err(|err| Error::io(err, format!("failed to create directory {directory:?}")))?;
    }
    File::create(path)
        .map_err(|source| Error::io(source, format!("failed to create file {path:?}")))
}

fn reader(path: &Path) -> Result<impl Read> {
    File::open(path).map_err(|source| Error::io(source, format!("failed to open file {path:?}")))
}

#[must_use]
pub fn exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}

pub fn save_raw(path: impl AsRef<Path>, value: &[u8]) -> Result<()> {
    let mut writer = writer(path.as_ref())?;
    writer
        .write_all(value)
        .map_err(|err| Error::io(err, "failed to save data"))?;
    Ok(())
}

pub fn load_raw(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let mut reader = reader(path.as_ref())?;
    let mut data = vec![];
    reader
        .read_to_end(&mut data)
        .map_err(|err| Error::io(err, "failed to load data"))?;
    Ok(data)
}

pub fn filename(path: &Path) -> &str {
    path.file_name()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or_else(|| {
            warn!("invalid path without file_name: {path:?}");
            "??"
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_load_raw() {
        let dir = std::env::temp_dir().join(format!("sysmon-fs-{}", std::process::id()));
        let path = dir.join("nested").join("data.json");
        save_raw(&path, b"{\"a\":1}").expect("saved data");
        assert!(exists(&path));
        assert_eq!(load_raw(&path).expect("loaded data"), b"{\"a\":1}");
        assert_eq!(filename(&path), "data.json");
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn load_missing_file() {
        let path = std::env::temp_dir().join("sysmon-definitely-missing.json");
        assert!(matches!(load_raw(path), Err(Error::Io { .. })));
    }
}
