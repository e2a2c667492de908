// SPDX-License-Identifier: MIT

//! Workflow nodes
//!
//! A node pairs an interface with a name, an execution kind (run once, or
//! once per element of the iterated fields) and any input values preset at
//! construction time.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

use super::error::GraphError;
use super::interface::Interface;

/// How the engine should invoke a node
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    /// One invocation
    Single,
    /// One invocation per element of each iterfield
    Map { iterfield: Vec<String> },
}

/// A node in a workflow graph
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    interface: Arc<dyn Interface>,
    kind: NodeKind,
    n_procs: Option<usize>,
    inputs: Map<String, Value>,
}

impl Node {
    /// Create a node that runs its interface once
    pub fn new(interface: impl Interface + 'static, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: Arc::new(interface),
            kind: NodeKind::Single,
            n_procs: None,
            inputs: Map::new(),
        }
    }

    /// Create a map node iterating over `iterfield`
    pub fn map<I, S>(
        interface: impl Interface + 'static,
        name: impl Into<String>,
        iterfield: I,
        n_procs: Option<usize>,
    ) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let iterfield: Vec<String> = iterfield.into_iter().map(Into::into).collect();
        if iterfield.is_empty() {
            return Err(GraphError::EmptyIterfield(name));
        }
        if let Some(field) = iterfield.iter().find(|f| !interface.has_input(f)) {
            return Err(GraphError::unknown_input(&name, field));
        }

        Ok(Self {
            name,
            interface: Arc::new(interface),
            kind: NodeKind::Map { iterfield },
            n_procs,
            inputs: Map::new(),
        })
    }

    /// Limit how many processors the engine may give this node
    pub fn with_n_procs(mut self, n_procs: usize) -> Self {
        self.n_procs = Some(n_procs);
        self
    }

    /// Preset an input value
    pub fn set_input(&mut self, field: &str, value: Value) -> Result<(), GraphError> {
        if !self.interface.has_input(field) {
            return Err(GraphError::unknown_input(&self.name, field));
        }
        self.inputs.insert(field.to_string(), value);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interface(&self) -> &dyn Interface {
        self.interface.as_ref()
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn is_map(&self) -> bool {
        matches!(self.kind, NodeKind::Map { .. })
    }

    pub fn n_procs(&self) -> Option<usize> {
        self.n_procs
    }

    pub fn inputs(&self) -> &Map<String, Value> {
        &self.inputs
    }
}
