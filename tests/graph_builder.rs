use classmap::engine::{ClassGraph, ClassGraphBuilder, ClassNode};
use classmap::formatters::GraphJsonFormatter;
use serde_json::Value;

fn make_node(id: &str, fields: usize, methods: usize) -> ClassNode {
    ClassNode {
        id: id.to_string(),
        is_private: false,
        total_fields: fields,
        static_fields: 0,
        total_methods: methods,
        static_methods: 1,
    }
}

#[test]
fn graph_builder_accumulates_call_weights() {
    let mut gb = ClassGraphBuilder::new();

    let a = make_node("com.x.A", 1, 2);
    let b = make_node("com.x.B", 0, 3);
    let c = make_node("com.x.C", 2, 1);

    gb.add_call(a.clone(), b.clone());
    gb.add_call(a.clone(), b.clone());
    gb.add_call(b.clone(), c.clone());
    gb.add_call(c.clone(), c.clone());

    assert!(gb.get_node_index("com.x.A").is_some());
    let graph: ClassGraph = gb.build();
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.edge_count(), 2);

    let weights: Vec<u32> = graph.edge_weights().map(|edge| edge.weight).collect();
    assert_eq!(weights, vec![2, 1]);
}

#[test]
fn graph_builder_skips_self_calls_entirely() {
    let mut gb = ClassGraphBuilder::new();
    let lonely = make_node("com.x.Lonely", 0, 1);
    gb.add_call(lonely.clone(), lonely);

    let graph = gb.build();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn graph_json_formatter_outputs_nodes_and_weighted_edges() {
    let mut gb = ClassGraphBuilder::new();
    gb.add_call(make_node("com.x.A", 1, 2), make_node("com.x.B", 0, 3));
    gb.add_call(make_node("com.x.A", 1, 2), make_node("com.x.B", 0, 3));
    let graph = gb.build();

    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("callGraph.json");
    GraphJsonFormatter::new()
        .with_pretty(false)
        .format_to_file(&graph, &path)
        .unwrap();

    let data = std::fs::read_to_string(&path).unwrap();
    let v: Value = serde_json::from_str(&data).unwrap();

    assert_eq!(v["creator"], "classmap");
    assert_eq!(v["version"], "1");
    assert_eq!(v["nodes"].as_array().unwrap().len(), 2);

    let a = &v["nodes"][0];
    assert_eq!(a["id"], "com.x.A");
    assert_eq!(a["label"], "com.x.A");
    assert_eq!(a["num_total_methods"], 2);
    assert_eq!(a["num_instance_methods"], 1);
    assert_eq!(a["num_instance_fields"], 1);

    let edge = &v["edges"][0];
    assert_eq!(edge["source"], "com.x.A");
    assert_eq!(edge["target"], "com.x.B");
    assert_eq!(edge["weight"], 2);
}
