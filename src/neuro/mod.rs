// SPDX-License-Identifier: MIT

pub mod anat;
pub mod config;
pub mod data;
pub mod interfaces;
