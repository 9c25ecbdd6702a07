use log::LevelFilter;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use crate::config::AgentStream;
use crate::engine::GraphEngine;
use crate::error::{ClassmapError, Result};
use crate::logging::{level_name, LogContext};

pub const SYMBOL_TABLE_FILE: &str = "symTable.json";
pub const REFERENCE_TABLE_FILE: &str = "refTable.json";
pub const INSTRUMENTATION_CONFIG_FILE: &str = "instrumenter-config.json";
pub const CALL_GRAPH_FILE: &str = "callGraph.json";

/// Persists run artifacts into one output directory.
pub struct TableWriter {
    output_dir: PathBuf,
    log: LogContext,
}

impl TableWriter {
    pub fn new(output_dir: impl Into<PathBuf>, log: LogContext) -> Self {
        Self {
            output_dir: output_dir.into(),
            log,
        }
    }

    pub fn ensure_output_dir(&self) -> Result<()> {
        if self.output_dir.is_dir() {
            return Ok(());
        }
        fs::create_dir_all(&self.output_dir).map_err(|source| ClassmapError::OutputWrite {
            path: self.output_dir.clone(),
            source,
        })?;
        self.log.info(format_args!(
            "Created directory {}",
            self.output_dir.display()
        ));
        Ok(())
    }

    pub fn write_compact<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        self.write_json(file_name, value, false)
    }

    pub fn write_pretty<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        self.write_json(file_name, value, true)
    }

    /// Asks the engine to export its graph. When it produces nothing, or
    /// fails, an empty document is written in its place.
    pub fn write_call_graph(&self, engine: &mut dyn GraphEngine) -> Result<(PathBuf, bool)> {
        let path = self.output_dir.join(CALL_GRAPH_FILE);
        self.log
            .info(format_args!("Writing file {}", path.display()));
        match engine.build_and_export(&path) {
            Ok(true) => return Ok((path, true)),
            Ok(false) => {
                self.log
                    .info(format_args!("No call graph entry points were found"));
            }
            Err(err) => {
                self.log
                    .error(format_args!("Call graph construction failed: {:#}", err));
            }
        }
        let path = self.write_file(CALL_GRAPH_FILE, &json!({}), true)?;
        Ok((path, false))
    }

    fn write_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T, pretty: bool) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        self.log
            .info(format_args!("Writing file {}", path.display()));
        self.write_file(file_name, value, pretty)
    }

    fn write_file<T: Serialize + ?Sized>(&self, file_name: &str, value: &T, pretty: bool) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let to_error = |source: io::Error| ClassmapError::OutputWrite {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(to_error)?;
        let mut writer = BufWriter::new(file);
        let serialized = if pretty {
            serde_json::to_writer_pretty(&mut writer, value)
        } else {
            serde_json::to_writer(&mut writer, value)
        };
        serialized.map_err(|err| to_error(err.into()))?;
        writer.flush().map_err(to_error)?;
        Ok(path)
    }
}

/// Configuration document handed to the runtime instrumentation agent.
pub fn instrumentation_config(agent_stream: AgentStream, level: LevelFilter) -> Value {
    json!({
        "filter": {
            "type": "sym-ref-tables",
            "version": "1.0",
            "config": ".",
        },
        "generator": {
            "type": "println",
            "version": "1.0",
            "config": agent_stream.config_value(),
        },
        "logging": level_name(level),
    })
}
