// SPDX-License-Identifier: MIT

//! Anatomical preprocessing workflows

pub mod ants;

pub use ants::{
    brain_extraction, set_inputs, BrainExtractionInputs, BrainExtractionOptions,
    BrainExtractionOutputs,
};
