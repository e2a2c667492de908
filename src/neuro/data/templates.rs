// SPDX-License-Identifier: MIT

//! Reference template lookup
//!
//! Templates live in a TemplateFlow-style tree:
//! `<root>/tpl-<name>/tpl-<name>_<suffix>`. Lookups are local; a
//! `TemplateFetcher` can fill in files that are missing.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};
use url::Url;

use crate::engine::{NeuroflowError, Result};

/// Environment variable overriding the template root
pub const TEMPLATEFLOW_HOME_VAR: &str = "TEMPLATEFLOW_HOME";

static DEFAULT_TEMPLATE_URL: Lazy<Url> = Lazy::new(|| {
    Url::parse("https://templateflow.s3.amazonaws.com/").expect("static URL is valid")
});

/// Something that can download a template file into place
#[async_trait]
pub trait TemplateFetcher: Send + Sync {
    /// Fetch `relative` (a path below the template root) into `dest`
    async fn fetch(&self, relative: &str, dest: &Path) -> Result<()>;
}

/// Downloads templates over HTTP(S)
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_TEMPLATE_URL.clone())
    }

    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full download URL for a path below the template root
    pub fn url_for(&self, relative: &str) -> Result<Url> {
        self.base_url
            .join(relative)
            .map_err(|e| NeuroflowError::fetch(relative, e.to_string()))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TemplateFetcher for HttpFetcher {
    async fn fetch(&self, relative: &str, dest: &Path) -> Result<()> {
        let url = self.url_for(relative)?;
        log::info!("Downloading {} -> {}", url, dest.display());

        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(NeuroflowError::fetch(
                url.as_str(),
                format!("HTTP {}", response.status()),
            ));
        }
        let bytes = response.bytes().await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        // Only a complete download ever appears under the final name
        let partial = partial_path(dest);
        if let Err(e) = tokio::fs::write(&partial, &bytes).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        tokio::fs::rename(&partial, dest).await?;
        Ok(())
    }
}

/// Sibling path a download is staged at before being renamed into place
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    dest.with_file_name(name)
}

/// Local template tree
#[derive(Debug, Clone)]
pub struct TemplateStore {
    root: PathBuf,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root from `$TEMPLATEFLOW_HOME`, else `~/.cache/templateflow`
    pub fn from_env() -> Self {
        let root = std::env::var_os(TEMPLATEFLOW_HOME_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| super::cache_home().join("templateflow"));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path below the root, without checking that it exists
    pub fn relative_path(template: &str, suffix: &str) -> String {
        format!("tpl-{t}/tpl-{t}_{s}", t = template, s = suffix)
    }

    pub fn path(&self, template: &str, suffix: &str) -> PathBuf {
        self.root.join(Self::relative_path(template, suffix))
    }

    /// Resolve a template file that must already be present
    pub fn get(&self, template: &str, suffix: &str) -> Result<PathBuf> {
        let path = self.path(template, suffix);
        if path.is_file() {
            Ok(path)
        } else {
            Err(NeuroflowError::TemplateNotFound {
                template: template.to_string(),
                suffix: suffix.to_string(),
                path: path.display().to_string(),
            })
        }
    }

    /// Resolve a template file, downloading it first when missing
    pub async fn fetch(
        &self,
        fetcher: &dyn TemplateFetcher,
        template: &str,
        suffix: &str,
    ) -> Result<PathBuf> {
        let path = self.path(template, suffix);
        if path.is_file() {
            log::debug!("Template hit: {}", path.display());
            return Ok(path);
        }
        if let Err(e) = fetcher
            .fetch(&Self::relative_path(template, suffix), &path)
            .await
        {
            // Whatever a failed fetcher left behind is not a usable template
            for leftover in [partial_path(&path), path] {
                if leftover.exists() {
                    log::warn!("Removing incomplete download {}", leftover.display());
                    let _ = tokio::fs::remove_file(&leftover).await;
                }
            }
            return Err(e);
        }
        self.get(template, suffix)
    }
}
