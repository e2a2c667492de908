// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use crate::engine::{NeuroflowError, Result};

/// Environment variable overriding the sample data root
pub const DATA_HOME_VAR: &str = "NIWORKFLOWS_DATA_HOME";

/// Downsampled BIDS dataset used by the registration tests
pub const DS003_DOWNSAMPLED: &str = "ds003_downsampled";

/// Local tree of pre-fetched sample datasets
#[derive(Debug, Clone)]
pub struct SampleData {
    root: PathBuf,
}

impl SampleData {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `$NIWORKFLOWS_DATA_HOME`, else `~/.cache/neuroflow`
    pub fn from_env() -> Self {
        let root = std::env::var_os(DATA_HOME_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| super::cache_home().join("neuroflow"));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of a named dataset, which must exist
    pub fn dataset(&self, name: &str) -> Result<PathBuf> {
        let path = self.root.join(name);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(NeuroflowError::DataNotFound {
                name: name.to_string(),
                path: self.root.display().to_string(),
            })
        }
    }

    pub fn ds003_downsampled(&self) -> Result<PathBuf> {
        self.dataset(DS003_DOWNSAMPLED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let data = SampleData::new(dir.path());
        let err = data.ds003_downsampled().unwrap_err();
        assert!(matches!(err, NeuroflowError::DataNotFound { .. }));
        assert!(err.to_string().contains(DS003_DOWNSAMPLED));
    }

    #[test]
    fn test_existing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(DS003_DOWNSAMPLED)).unwrap();
        let data = SampleData::new(dir.path());
        assert_eq!(
            data.ds003_downsampled().unwrap(),
            dir.path().join(DS003_DOWNSAMPLED)
        );
    }

    #[test]
    fn test_file_is_not_a_dataset() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ds"), b"").unwrap();
        assert!(SampleData::new(dir.path()).dataset("ds").is_err());
    }
}
