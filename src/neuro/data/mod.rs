// SPDX-License-Identifier: MIT

//! Reference data provisioning
//!
//! Template and sample-dataset lookup used by the test fixtures, plus the
//! fixtures themselves.

use std::path::PathBuf;

pub mod fixtures;
pub mod sample;
pub mod templates;

pub use fixtures::{enter_temp_dir, nthreads_from, Fixtures, TempDirGuard};
pub use sample::SampleData;
pub use templates::{HttpFetcher, TemplateFetcher, TemplateStore};

/// `$XDG_CACHE_HOME`, else `~/.cache`, else a relative `.cache`
pub(crate) fn cache_home() -> PathBuf {
    std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
}
