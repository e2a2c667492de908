// SPDX-License-Identifier: MIT

//! Descriptors for external neuroimaging command-line tools

pub mod ants;
