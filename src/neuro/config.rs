// SPDX-License-Identifier: MIT

//! Pipeline configuration - YAML file loading and parsing

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::engine::Result;
use crate::neuro::anat::{BrainExtractionInputs, BrainExtractionOptions};

/// Top-level pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Options for the brain-extraction workflow
    pub workflow: BrainExtractionOptions,
    /// Values preset on the input node
    pub inputs: BrainExtractionInputs,
}

/// Loads pipeline configurations from YAML files
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load a configuration from a YAML file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<PipelineConfig> {
        let path = path.as_ref();
        log::debug!("Loading pipeline config from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_yaml(&content)
    }

    /// Parse a configuration from a YAML string
    pub fn parse_yaml(content: &str) -> Result<PipelineConfig> {
        let config: PipelineConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
