// SPDX-License-Identifier: MIT

//! Workflow graphs
//!
//! A `Workflow` is a named container of nodes and field-level connections.
//! It is only a plan: nothing here runs a tool. Every connection is checked
//! when it is added, so a finished workflow always refers to real nodes and
//! declared fields and is acyclic. `to_spec` turns it into a plain
//! serializable document for the executing engine.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::GraphError;
use super::graph::Graph;
use super::interface::Interface;
use super::list::as_list;
use super::node::{Node, NodeKind};

/// Value conversion applied while data crosses a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transform {
    /// Wrap a single text value into a one-element list
    AsList,
}

impl Transform {
    pub fn apply(&self, value: Value) -> Value {
        match self {
            Transform::AsList => as_list(value),
        }
    }
}

/// A directed, field-level edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Connection {
    pub source: String,
    pub source_field: String,
    pub target: String,
    pub target_field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

/// A named graph of nodes and connections
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    nodes: Vec<Node>,
    connections: Vec<Connection>,
}

impl Workflow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a node; names are unique within a workflow
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node(node.name()).is_some() {
            return Err(GraphError::DuplicateNode(node.name().to_string()));
        }
        log::debug!(
            "[{}] adding node '{}' ({})",
            self.name,
            node.name(),
            node.interface().name()
        );
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> Result<(), GraphError> {
        for node in nodes {
            self.add_node(node)?;
        }
        Ok(())
    }

    /// Connect `source.source_field` to `target.target_field`
    pub fn connect(
        &mut self,
        source: &str,
        source_field: &str,
        target: &str,
        target_field: &str,
    ) -> Result<(), GraphError> {
        self.connect_with(source, source_field, target, target_field, None)
    }

    /// Connect with an optional value transform
    pub fn connect_with(
        &mut self,
        source: &str,
        source_field: &str,
        target: &str,
        target_field: &str,
        transform: Option<Transform>,
    ) -> Result<(), GraphError> {
        let src = self
            .node(source)
            .ok_or_else(|| GraphError::NodeNotFound(source.to_string()))?;
        let dst = self
            .node(target)
            .ok_or_else(|| GraphError::NodeNotFound(target.to_string()))?;

        if !src.interface().has_output(source_field) {
            return Err(GraphError::unknown_output(source, source_field));
        }
        if !dst.interface().has_input(target_field) {
            return Err(GraphError::unknown_input(target, target_field));
        }
        if self
            .connections
            .iter()
            .any(|c| c.target == target && c.target_field == target_field)
        {
            return Err(GraphError::InputAlreadyConnected {
                node: target.to_string(),
                field: target_field.to_string(),
            });
        }
        // A path target -> source means the new edge would close a loop
        if let Some(mut cycle) = self.graph().find_path(target, source) {
            cycle.push(target.to_string());
            return Err(GraphError::CircularDependency(cycle));
        }

        log::debug!(
            "[{}] connecting {}.{} -> {}.{}",
            self.name,
            source,
            source_field,
            target,
            target_field
        );
        self.connections.push(Connection {
            source: source.to_string(),
            source_field: source_field.to_string(),
            target: target.to_string(),
            target_field: target_field.to_string(),
            transform,
        });
        Ok(())
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name() == name)
    }

    pub fn node_mut(&mut self, name: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.name() == name)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections feeding the given node
    pub fn incoming(&self, node: &str) -> impl Iterator<Item = &Connection> {
        let node = node.to_string();
        self.connections.iter().filter(move |c| c.target == node)
    }

    /// Connections leaving the given node
    pub fn outgoing(&self, node: &str) -> impl Iterator<Item = &Connection> {
        let node = node.to_string();
        self.connections.iter().filter(move |c| c.source == node)
    }

    /// Node-level traversal view
    pub fn graph(&self) -> Graph {
        Graph::new(
            self.nodes.iter().map(|n| n.name()),
            self.connections
                .iter()
                .map(|c| (c.source.as_str(), c.target.as_str())),
        )
    }

    /// Serializable description for the executing engine
    pub fn to_spec(&self) -> WorkflowSpec {
        let graph = self.graph();
        // connect() keeps the graph acyclic, so this always succeeds
        let order: Vec<&str> = graph
            .topological_order()
            .unwrap_or_else(|| self.nodes.iter().map(|n| n.name()).collect());

        let nodes = order
            .into_iter()
            .filter_map(|name| self.node(name))
            .map(|node| NodeSpec {
                name: node.name().to_string(),
                interface: node.interface().name().to_string(),
                kind: node.kind().clone(),
                n_procs: node.n_procs(),
                parameters: node.interface().parameters(),
                inputs: node.inputs().clone(),
                command: node.interface().command_line(node.inputs()),
            })
            .collect();

        WorkflowSpec {
            name: self.name.clone(),
            nodes,
            connections: self.connections.clone(),
        }
    }
}

/// Plain-data form of a workflow, ordered so producers precede consumers
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WorkflowSpec {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// Plain-data form of a node
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeSpec {
    pub name: String,
    pub interface: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_procs: Option<usize>,
    #[serde(default)]
    pub parameters: Value,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub inputs: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

impl WorkflowSpec {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn node(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::interface::IdentityInterface;
    use serde_json::json;

    fn three_nodes() -> Workflow {
        let mut wf = Workflow::new("wf");
        wf.add_nodes([
            Node::new(IdentityInterface::new(["x"]), "a"),
            Node::new(IdentityInterface::new(["x", "y"]), "b"),
            Node::new(IdentityInterface::new(["y"]), "c"),
        ])
        .unwrap();
        wf
    }

    #[test]
    fn test_new_workflow_is_empty() {
        let wf = Workflow::new("bx");
        assert_eq!(wf.name(), "bx");
        assert!(wf.nodes().is_empty());
        assert!(wf.connections().is_empty());
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut wf = three_nodes();
        let err = wf
            .add_node(Node::new(IdentityInterface::new(["x"]), "a"))
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateNode("a".to_string()));
        assert_eq!(wf.nodes().len(), 3);
    }

    #[test]
    fn test_connect_validates_nodes_and_fields() {
        let mut wf = three_nodes();
        assert_eq!(
            wf.connect("zz", "x", "b", "x").unwrap_err(),
            GraphError::NodeNotFound("zz".to_string())
        );
        assert_eq!(
            wf.connect("a", "nope", "b", "x").unwrap_err(),
            GraphError::unknown_output("a", "nope")
        );
        assert_eq!(
            wf.connect("a", "x", "c", "x").unwrap_err(),
            GraphError::unknown_input("c", "x")
        );
        assert!(wf.connections().is_empty());
    }

    #[test]
    fn test_input_accepts_one_connection() {
        let mut wf = three_nodes();
        wf.connect("a", "x", "b", "x").unwrap();
        let err = wf.connect("c", "y", "b", "x").unwrap_err();
        assert!(matches!(err, GraphError::InputAlreadyConnected { .. }));
    }

    #[test]
    fn test_cycle_rejected() {
        let mut wf = three_nodes();
        wf.connect("a", "x", "b", "x").unwrap();
        wf.connect("b", "y", "c", "y").unwrap();

        // c -> b would loop b -> c -> b
        let err = wf.connect("c", "y", "b", "y").unwrap_err();
        assert_eq!(
            err,
            GraphError::CircularDependency(vec![
                "b".to_string(),
                "c".to_string(),
                "b".to_string()
            ])
        );

        let err = wf.connect("b", "x", "b", "y").unwrap_err();
        assert!(matches!(err, GraphError::CircularDependency(_)));
    }

    #[test]
    fn test_incoming_outgoing() {
        let mut wf = three_nodes();
        wf.connect_with("a", "x", "b", "x", Some(Transform::AsList))
            .unwrap();
        wf.connect("b", "y", "c", "y").unwrap();
        assert_eq!(wf.incoming("b").count(), 1);
        assert_eq!(wf.outgoing("b").count(), 1);
        assert_eq!(
            wf.incoming("b").next().unwrap().transform,
            Some(Transform::AsList)
        );
        assert_eq!(wf.graph().entry_points(), vec!["a"]);
    }

    #[test]
    fn test_transform_apply() {
        assert_eq!(Transform::AsList.apply(json!("t1")), json!(["t1"]));
        assert_eq!(Transform::AsList.apply(json!(["t1"])), json!(["t1"]));
    }

    #[test]
    fn test_spec_is_topologically_ordered() {
        let mut wf = Workflow::new("wf");
        wf.add_nodes([
            Node::new(IdentityInterface::new(["y"]), "sink"),
            Node::new(IdentityInterface::new(["y"]), "source"),
        ])
        .unwrap();
        wf.connect("source", "y", "sink", "y").unwrap();

        let spec = wf.to_spec();
        let names: Vec<_> = spec.nodes.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["source", "sink"]);
        assert_eq!(spec.connections.len(), 1);
    }

    #[test]
    fn test_spec_yaml_and_json() {
        let mut wf = three_nodes();
        wf.node_mut("a")
            .unwrap()
            .set_input("x", json!("in.nii.gz"))
            .unwrap();
        wf.connect_with("a", "x", "b", "x", Some(Transform::AsList))
            .unwrap();
        let spec = wf.to_spec();

        let yaml = spec.to_yaml().unwrap();
        assert!(yaml.contains("transform: as_list"));
        let back: WorkflowSpec = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.node("a").unwrap().inputs["x"], json!("in.nii.gz"));

        let json = spec.to_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "wf");
        assert_eq!(value["nodes"][0]["kind"]["type"], "single");
    }
}
