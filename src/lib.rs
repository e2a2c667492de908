// SPDX-License-Identifier: MIT

//! neuroflow: neuroimaging preprocessing workflow graphs
//!
//! Workflows are built from nodes that describe external command-line
//! tools. Building a workflow never runs anything; the resulting graph is
//! handed to an execution engine as a `WorkflowSpec`.

pub mod engine;
pub mod neuro;
