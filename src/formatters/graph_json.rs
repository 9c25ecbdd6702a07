use anyhow::Result;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::engine::ClassGraph;

pub const GRAPH_CREATOR: &str = "classmap";
pub const GRAPH_VERSION: &str = "1";

/// Writes a class graph as a node/edge list with per-node member counts and
/// per-edge call weights.
pub struct GraphJsonFormatter {
    pretty: bool,
}

impl GraphJsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_to_file(&self, graph: &ClassGraph, output_path: &Path) -> Result<()> {
        let document = self.format_graph(graph);
        let content = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        fs::write(output_path, content)?;
        Ok(())
    }

    pub fn format_graph(&self, graph: &ClassGraph) -> Value {
        let node_indices: Vec<NodeIndex> = graph.node_indices().collect();

        let mut nodes = Vec::with_capacity(node_indices.len());
        for &idx in &node_indices {
            if let Some(node) = graph.node_weight(idx) {
                nodes.push(json!({
                    "id": node.id,
                    "label": node.id,
                    "is_class_private": node.is_private,
                    "num_total_fields": node.total_fields,
                    "num_static_fields": node.static_fields,
                    "num_instance_fields": node.instance_fields(),
                    "num_total_methods": node.total_methods,
                    "num_static_methods": node.static_methods,
                    "num_instance_methods": node.instance_methods(),
                }));
            }
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        for edge_ref in graph.edge_references() {
            let source = &graph[edge_ref.source()];
            let target = &graph[edge_ref.target()];
            edges.push(json!({
                "source": source.id,
                "target": target.id,
                "weight": edge_ref.weight().weight,
            }));
        }

        json!({
            "creator": GRAPH_CREATOR,
            "version": GRAPH_VERSION,
            "nodes": nodes,
            "edges": edges,
        })
    }
}

impl Default for GraphJsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
