use petgraph::{graph::NodeIndex, Directed, Graph};
use serde::Serialize;
use std::collections::HashMap;

/// A compiled type that takes part in at least one call relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassNode {
    /// Dotted binary name.
    pub id: String,
    pub is_private: bool,
    pub total_fields: usize,
    pub static_fields: usize,
    pub total_methods: usize,
    pub static_methods: usize,
}

impl ClassNode {
    pub fn instance_fields(&self) -> usize {
        self.total_fields - self.static_fields
    }

    pub fn instance_methods(&self) -> usize {
        self.total_methods - self.static_methods
    }
}

/// Number of call sites from the source type that reach the target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallEdge {
    pub weight: u32,
}

pub type ClassGraph = Graph<ClassNode, CallEdge, Directed>;

#[derive(Default)]
pub struct ClassGraphBuilder {
    graph: ClassGraph,
    node_map: HashMap<String, NodeIndex>,
}

impl ClassGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `node` unless a node with the same id exists.
    pub fn add_node(&mut self, node: ClassNode) -> NodeIndex {
        if let Some(index) = self.node_map.get(&node.id) {
            return *index;
        }
        let id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_map.insert(id, index);
        index
    }

    /// Records one more call from `source` to `target`. Self edges are ignored.
    pub fn add_call(&mut self, source: ClassNode, target: ClassNode) {
        if source.id == target.id {
            return;
        }
        let source = self.add_node(source);
        let target = self.add_node(target);
        match self.graph.find_edge(source, target) {
            Some(edge) => self.graph[edge].weight += 1,
            None => {
                self.graph.add_edge(source, target, CallEdge { weight: 1 });
            }
        }
    }

    pub fn get_node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_map.get(id).copied()
    }

    pub fn build(self) -> ClassGraph {
        self.graph
    }
}
