// SPDX-License-Identifier: MIT

//! ANTs tool descriptors

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::engine::Interface;

static N4_INPUTS: Lazy<Vec<String>> = Lazy::new(|| {
    ["input_image", "mask_image", "weight_image"]
        .iter()
        .map(|s| s.to_string())
        .collect()
});

static N4_OUTPUTS_WITH_BIAS: Lazy<Vec<String>> =
    Lazy::new(|| vec!["output_image".to_string(), "bias_image".to_string()]);

static N4_OUTPUTS: Lazy<Vec<String>> = Lazy::new(|| vec!["output_image".to_string()]);

/// Environment variable ITK tools read their thread budget from
pub const ITK_THREADS_VAR: &str = "ITK_GLOBAL_DEFAULT_NUMBER_OF_THREADS";

/// Descriptor for the `N4BiasFieldCorrection` binary.
///
/// Only `dimension`, `save_bias`, `copy_header` and `num_threads` are set by
/// the workflows in this crate; the remaining knobs keep the tool's own
/// defaults unless given.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct N4BiasFieldCorrection {
    pub dimension: u8,
    pub save_bias: bool,
    /// Copy the input header onto the outputs after the run
    pub copy_header: bool,
    pub num_threads: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bspline_fitting_distance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shrink_factor: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_iterations: Option<Vec<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub convergence_threshold: Option<f64>,
}

impl Default for N4BiasFieldCorrection {
    fn default() -> Self {
        Self {
            dimension: 3,
            save_bias: false,
            copy_header: false,
            num_threads: 1,
            bspline_fitting_distance: None,
            shrink_factor: None,
            n_iterations: None,
            convergence_threshold: None,
        }
    }
}

impl N4BiasFieldCorrection {
    /// Variables the engine must export when running the tool
    pub fn environment(&self) -> Vec<(String, String)> {
        vec![(ITK_THREADS_VAR.to_string(), self.num_threads.to_string())]
    }

    /// Output file names derived from the input image name
    pub fn output_names(&self, input_image: &str) -> (String, Option<String>) {
        let stem = image_stem(input_image);
        let corrected = format!("{}_corrected.nii.gz", stem);
        let bias = self.save_bias.then(|| format!("{}_bias.nii.gz", stem));
        (corrected, bias)
    }
}

impl Interface for N4BiasFieldCorrection {
    fn name(&self) -> &str {
        "N4BiasFieldCorrection"
    }

    fn input_fields(&self) -> &[String] {
        &N4_INPUTS
    }

    fn output_fields(&self) -> &[String] {
        if self.save_bias {
            &N4_OUTPUTS_WITH_BIAS
        } else {
            &N4_OUTPUTS
        }
    }

    fn parameters(&self) -> Value {
        let mut params = serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()));
        if let Value::Object(map) = &mut params {
            let env: Map<String, Value> = self
                .environment()
                .into_iter()
                .map(|(k, v)| (k, Value::String(v)))
                .collect();
            map.insert("environ".to_string(), Value::Object(env));
        }
        params
    }

    fn command_line(&self, inputs: &Map<String, Value>) -> Option<Vec<String>> {
        let input_image = inputs.get("input_image")?.as_str()?;

        let mut args = vec![
            "N4BiasFieldCorrection".to_string(),
            "-d".to_string(),
            self.dimension.to_string(),
            "--input-image".to_string(),
            input_image.to_string(),
        ];

        if let Some(mask) = inputs.get("mask_image").and_then(Value::as_str) {
            args.extend(["--mask-image".to_string(), mask.to_string()]);
        }
        if let Some(weight) = inputs.get("weight_image").and_then(Value::as_str) {
            args.extend(["--weight-image".to_string(), weight.to_string()]);
        }
        if let Some(shrink) = self.shrink_factor {
            args.extend(["-s".to_string(), shrink.to_string()]);
        }
        if let Some(iterations) = &self.n_iterations {
            let iters = iterations
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join("x");
            let conv = match self.convergence_threshold {
                Some(t) => format!("[{},{}]", iters, t),
                None => format!("[{}]", iters),
            };
            args.extend(["-c".to_string(), conv]);
        }
        if let Some(distance) = self.bspline_fitting_distance {
            args.extend(["-b".to_string(), format!("[{}]", distance)]);
        }

        let (corrected, bias) = self.output_names(input_image);
        let output = match bias {
            Some(bias) => format!("[{},{}]", corrected, bias),
            None => corrected,
        };
        args.extend(["--output".to_string(), output]);

        Some(args)
    }
}

/// File name without directories or NIfTI extensions
fn image_stem(path: &str) -> String {
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    for ext in [".nii.gz", ".nii", ".mgz", ".nrrd"] {
        if let Some(stem) = name.strip_suffix(ext) {
            return stem.to_string();
        }
    }
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name)
        .to_string()
}
