pub mod graph_json;
pub mod tables;

pub use graph_json::GraphJsonFormatter;
pub use tables::{
    instrumentation_config, TableWriter, CALL_GRAPH_FILE, INSTRUMENTATION_CONFIG_FILE,
    REFERENCE_TABLE_FILE, SYMBOL_TABLE_FILE,
};
