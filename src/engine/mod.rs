// SPDX-License-Identifier: MIT

//! Graph-construction primitives
//!
//! This module provides the building blocks that neuroimaging workflows
//! are assembled from: interfaces, nodes, connections and the workflow
//! container itself. Execution is left to an external engine.

pub mod error;
mod graph;
pub mod host;
pub mod interface;
pub mod list;
mod node;
mod workflow;

pub use error::{FieldDirection, GraphError, NeuroflowError, Result};
pub use graph::Graph;
pub use host::{resolve_thread_count, FixedHost, HostInfo, SystemHost};
pub use interface::{FieldRecord, IdentityInterface, Interface};
pub use list::{as_list, OneOrMany};
pub use node::{Node, NodeKind};
pub use workflow::{Connection, NodeSpec, Transform, Workflow, WorkflowSpec};
