use std::fs;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset unavailable: {0}")]
    Unavailable(String),
}

/// Where the primary dataset comes from.
pub trait DatasetSource {
    /// Human-readable origin for logs.
    fn describe(&self) -> String;

    fn read(&self) -> Result<String, SourceError>;
}

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DatasetSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> Result<String, SourceError> {
        fs::read_to_string(&self.path).map_err(|source| SourceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// A payload already in memory (bundled assets, tests).
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    payload: String,
}

impl StaticSource {
    pub fn new(name: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: payload.into(),
        }
    }
}

impl DatasetSource for StaticSource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> Result<String, SourceError> {
        Ok(self.payload.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::{DatasetSource, FileSource, SourceError, StaticSource};

    #[test]
    fn missing_file_reports_path() {
        let src = FileSource::new("/definitely/not/here.geojson");
        match src.read() {
            Err(SourceError::Io { path, .. }) => {
                assert_eq!(path.to_str(), Some("/definitely/not/here.geojson"));
            }
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn static_source_returns_payload() {
        let src = StaticSource::new("inline", "{}");
        assert_eq!(src.describe(), "inline");
        assert_eq!(src.read().expect("read"), "{}");
    }
}
