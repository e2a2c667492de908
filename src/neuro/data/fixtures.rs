// SPDX-License-Identifier: MIT

//! Test fixtures
//!
//! Resolves the reference templates and sample images the workflow tests
//! run against, and isolates each test in its own working directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::sample::SampleData;
use super::templates::{TemplateFetcher, TemplateStore};
use crate::engine::{HostInfo, NeuroflowError, Result, SystemHost};

/// CI-provided processor budget
pub const NPROCS_VAR: &str = "CIRCLE_NPROCS";

const DEFAULT_NPROCS: usize = 8;

/// Template files the fixtures hand out, as (template, suffix)
pub const FIXTURE_TEMPLATES: &[(&str, &str)] = &[
    ("MNI152Lin", "res-01_T1w.nii.gz"),
    ("MNI152Lin", "res-02_T1w.nii.gz"),
    ("MNI152Lin", "res-02_desc-brain_mask.nii.gz"),
    ("OASIS30ANTs", "res-01_T1w.nii.gz"),
];

/// Working directory switched into a fresh temporary directory.
///
/// The previous directory is restored and the temporary one removed on drop.
pub struct TempDirGuard {
    dir: TempDir,
    previous: PathBuf,
}

impl TempDirGuard {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        if let Err(e) = std::env::set_current_dir(&self.previous) {
            log::warn!(
                "Could not restore working directory {}: {}",
                self.previous.display(),
                e
            );
        }
    }
}

/// Switch into a new temporary directory for the lifetime of the guard
pub fn enter_temp_dir() -> Result<TempDirGuard> {
    let previous = std::env::current_dir()?;
    let dir = tempfile::tempdir()?;
    std::env::set_current_dir(dir.path())?;
    log::debug!("Entered temporary directory {}", dir.path().display());
    Ok(TempDirGuard { dir, previous })
}

/// Thread budget: `CIRCLE_NPROCS` (default 8) capped at the host count
pub fn nthreads_from(value: Option<&str>, host: &dyn HostInfo) -> Result<usize> {
    let requested = match value {
        Some(v) => v.trim().parse::<usize>().map_err(|_| {
            NeuroflowError::config(format!("{} must be an integer, got '{}'", NPROCS_VAR, v))
        })?,
        None => DEFAULT_NPROCS,
    };
    Ok(requested.min(host.cpu_count()))
}

/// Paths and settings shared by the workflow tests
pub struct Fixtures {
    templates: TemplateStore,
    data: SampleData,
    host: Arc<dyn HostInfo>,
}

impl Fixtures {
    pub fn new(templates: TemplateStore, data: SampleData, host: Arc<dyn HostInfo>) -> Self {
        Self {
            templates,
            data,
            host,
        }
    }

    /// Roots from the environment, real host
    pub fn from_env() -> Self {
        Self::new(
            TemplateStore::from_env(),
            SampleData::from_env(),
            Arc::new(SystemHost),
        )
    }

    pub fn templates(&self) -> &TemplateStore {
        &self.templates
    }

    /// Directory holding the 1mm MNI152Lin template
    pub fn mni_dir(&self) -> Result<PathBuf> {
        self.template_dir("MNI152Lin", "res-01_T1w.nii.gz")
    }

    /// Directory holding the 1mm OASIS30ANTs template
    pub fn oasis_dir(&self) -> Result<PathBuf> {
        self.template_dir("OASIS30ANTs", "res-01_T1w.nii.gz")
    }

    pub fn reference(&self) -> Result<PathBuf> {
        self.templates.get("MNI152Lin", "res-02_T1w.nii.gz")
    }

    pub fn reference_mask(&self) -> Result<PathBuf> {
        self.templates
            .get("MNI152Lin", "res-02_desc-brain_mask.nii.gz")
    }

    /// T1w image of the first subject in the downsampled sample dataset
    pub fn moving(&self) -> Result<PathBuf> {
        Ok(self
            .data
            .ds003_downsampled()?
            .join("sub-01/anat/sub-01_T1w.nii.gz"))
    }

    pub fn nthreads(&self) -> Result<usize> {
        let value = std::env::var(NPROCS_VAR).ok();
        nthreads_from(value.as_deref(), self.host.as_ref())
    }

    /// Download any fixture template that is not present yet
    pub async fn prefetch(&self, fetcher: &dyn TemplateFetcher) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(FIXTURE_TEMPLATES.len());
        for (template, suffix) in FIXTURE_TEMPLATES {
            paths.push(self.templates.fetch(fetcher, template, suffix).await?);
        }
        Ok(paths)
    }

    fn template_dir(&self, template: &str, suffix: &str) -> Result<PathBuf> {
        let file = self.templates.get(template, suffix)?;
        Ok(file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.templates.root().to_path_buf()))
    }
}
