// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Undirected graph with typed, name-keyed nodes
//!
//! Nodes and adjacency lists keep insertion order, so edge listings are
//! stable across runs: each edge is reported once, from the endpoint that was
//! added first.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Node role in an insight graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Category,
    Concept,
    Restaurant,
}

/// An edge as listed by [`TypedGraph::edges`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct TypedGraph {
    nodes: Vec<(String, NodeKind)>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
    weights: HashMap<(usize, usize), Option<f64>>,
}

impl TypedGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node or update the kind of an existing one; returns its index
    pub fn add_node(&mut self, name: &str, kind: NodeKind) -> usize {
        if let Some(&id) = self.index.get(name) {
            self.nodes[id].1 = kind;
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push((name.to_string(), kind));
        self.index.insert(name.to_string(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Connect two nodes. A repeated edge keeps its position and takes the
    /// new weight.
    pub fn add_edge(&mut self, a: usize, b: usize, weight: Option<f64>) {
        let key = (a.min(b), a.max(b));
        if self.weights.insert(key, weight).is_none() {
            self.adjacency[a].push(b);
            if a != b {
                self.adjacency[b].push(a);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.weights.len()
    }

    pub fn node_kind(&self, name: &str) -> Option<NodeKind> {
        self.index.get(name).map(|&id| self.nodes[id].1)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&str, NodeKind)> {
        self.nodes.iter().map(|(name, kind)| (name.as_str(), *kind))
    }

    pub fn edges(&self) -> Vec<EdgeRef<'_>> {
        let mut seen = vec![false; self.nodes.len()];
        let mut edges = Vec::with_capacity(self.weights.len());
        for (u, neighbours) in self.adjacency.iter().enumerate() {
            for &v in neighbours {
                if !seen[v] {
                    edges.push(EdgeRef {
                        source: &self.nodes[u].0,
                        target: &self.nodes[v].0,
                        weight: self.weights.get(&(u.min(v), u.max(v))).copied().flatten(),
                    });
                }
            }
            seen[u] = true;
        }
        edges
    }
}
