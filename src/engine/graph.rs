// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet, VecDeque};

/// Node-level view of a workflow for traversal and analysis.
///
/// Built from node names in insertion order plus `(from, to)` pairs, one
/// per connection (parallel connections between the same two nodes are
/// collapsed).
#[derive(Debug, Clone)]
pub struct Graph {
    order: Vec<String>,
    adjacency: HashMap<String, Vec<String>>,
    reverse_adjacency: HashMap<String, Vec<String>>,
}

impl Graph {
    /// Build a graph from nodes and edges.
    pub fn new<'a>(
        nodes: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut order = Vec::new();
        let mut adjacency: HashMap<String, Vec<String>> = HashMap::new();
        let mut reverse_adjacency: HashMap<String, Vec<String>> = HashMap::new();

        for node in nodes {
            order.push(node.to_string());
            adjacency.entry(node.to_string()).or_default();
            reverse_adjacency.entry(node.to_string()).or_default();
        }

        for (from, to) in edges {
            let down = adjacency.entry(from.to_string()).or_default();
            if !down.iter().any(|d| d == to) {
                down.push(to.to_string());
                reverse_adjacency
                    .entry(to.to_string())
                    .or_default()
                    .push(from.to_string());
            }
        }

        Self {
            order,
            adjacency,
            reverse_adjacency,
        }
    }

    /// Nodes with no incoming edges, in insertion order.
    pub fn entry_points(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|id| self.upstream(id).is_empty())
            .map(|s| s.as_str())
            .collect()
    }

    /// Nodes neither fed by nor feeding any other node.
    pub fn isolated(&self) -> Vec<&str> {
        self.order
            .iter()
            .filter(|id| self.upstream(id).is_empty() && self.downstream(id).is_empty())
            .map(|s| s.as_str())
            .collect()
    }

    /// Get downstream nodes for a given node.
    pub fn downstream(&self, node_id: &str) -> &[String] {
        self.adjacency
            .get(node_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Get upstream nodes for a given node.
    pub fn upstream(&self, node_id: &str) -> &[String] {
        self.reverse_adjacency
            .get(node_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// A path of node names from `from` to `to`, if one exists.
    pub fn find_path(&self, from: &str, to: &str) -> Option<Vec<String>> {
        let mut parent: HashMap<&str, &str> = HashMap::new();
        let mut seen: HashSet<&str> = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(current) = queue.pop_front() {
            if current == to {
                let mut path = vec![current.to_string()];
                let mut cursor = current;
                while let Some(&prev) = parent.get(cursor) {
                    path.push(prev.to_string());
                    cursor = prev;
                }
                path.reverse();
                return Some(path);
            }
            for next in self.downstream(current) {
                if seen.insert(next.as_str()) {
                    parent.insert(next.as_str(), current);
                    queue.push_back(next.as_str());
                }
            }
        }
        None
    }

    /// Kahn ordering; ties keep insertion order. `None` if cyclic.
    pub fn topological_order(&self) -> Option<Vec<&str>> {
        let mut in_degree: HashMap<&str, usize> = self
            .order
            .iter()
            .map(|id| (id.as_str(), self.upstream(id).len()))
            .collect();

        let mut result = Vec::with_capacity(self.order.len());
        let mut ready: VecDeque<&str> = self
            .order
            .iter()
            .filter(|id| in_degree[id.as_str()] == 0)
            .map(|s| s.as_str())
            .collect();

        while let Some(id) = ready.pop_front() {
            result.push(id);
            for next in self.downstream(id) {
                if let Some(d) = in_degree.get_mut(next.as_str()) {
                    *d -= 1;
                    if *d == 0 {
                        ready.push_back(next.as_str());
                    }
                }
            }
        }

        (result.len() == self.order.len()).then_some(result)
    }
}
