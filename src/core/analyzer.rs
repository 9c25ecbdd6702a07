use anyhow::Result;
use std::path::PathBuf;

use super::collector::TypeCollector;
use super::filter::{FilterMode, TypeFilter, DEFAULT_PACKAGE_MARKER};
use super::traversal::{ArchiveWalker, TraversalStats};
use crate::config::AnalyzerConfig;
use crate::engine::{CallGraphBuilder, GraphEngine};
use crate::formatters::{
    instrumentation_config, TableWriter, INSTRUMENTATION_CONFIG_FILE, REFERENCE_TABLE_FILE,
    SYMBOL_TABLE_FILE,
};
use crate::logging::LogContext;

/// What a completed run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub traversal: TraversalStats,
    pub indexed_types: usize,
    pub symbol_entries: usize,
    pub written: Vec<PathBuf>,
    pub call_graph_exported: bool,
}

/// One inventory run: traverse the inputs, build the tables, write them.
pub struct Analyzer {
    config: AnalyzerConfig,
    log: LogContext,
    engine: Option<Box<dyn GraphEngine>>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let log = LogContext::new(config.log_level);
        Self::with_log_context(config, log)
    }

    pub fn with_log_context(config: AnalyzerConfig, log: LogContext) -> Self {
        let engine = config.call_graph.map(|algorithm| {
            Box::new(CallGraphBuilder::new(algorithm, log.clone())) as Box<dyn GraphEngine>
        });
        Self {
            config,
            log,
            engine,
        }
    }

    /// Replaces the graph engine chosen from the configuration.
    pub fn with_engine(mut self, engine: Box<dyn GraphEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn log(&self) -> &LogContext {
        &self.log
    }

    /// Runs the analysis. Only failures to write artifacts are returned;
    /// the graph engine is cleaned up either way.
    pub fn run(self) -> Result<RunSummary> {
        let Analyzer {
            config,
            log,
            engine,
        } = self;

        log.info(format_args!("Starting analysis"));
        log_configuration(&config, &log);

        let has_engine = engine.is_some();
        let filter = TypeFilter::new(config.packages.clone(), config.allow_any_legal_types);
        let mut collector = TypeCollector::new(log.clone(), filter)
            .with_index_duplicate_types(config.index_duplicate_types)
            .with_engine(engine);

        let mut summary = RunSummary::default();
        if config.table_outputs.sym_ref_tables() || has_engine {
            let walker = ArchiveWalker::new(log.clone());
            for input in &config.inputs {
                summary.traversal += walker.walk_path(input, &mut collector);
            }
            for library in config.library_archives(&log) {
                log.info(format_args!("Adding extra library {}", library.display()));
                summary.traversal += walker.walk_path(&library, &mut collector);
            }
        } else {
            log.debug(format_args!(
                "No symbol tables or call graph requested; skipping traversal"
            ));
        }

        let written = write_artifacts(&config, &log, &mut collector, &mut summary);
        collector.cleanup_engine();
        written?;

        summary.indexed_types = collector.indexed_count();
        summary.symbol_entries = collector.symbols().len();
        log.info(format_args!(
            "Indexed {} types into {} symbols",
            summary.indexed_types, summary.symbol_entries
        ));
        Ok(summary)
    }
}

fn log_configuration(config: &AnalyzerConfig, log: &LogContext) {
    log.debug(format_args!("Output directory: {}", config.output_dir.display()));
    if let Some(filter) = &config.packages {
        let mut packages: Vec<String> = filter
            .packages()
            .iter()
            .map(|package| package.clone().unwrap_or_else(|| DEFAULT_PACKAGE_MARKER.to_string()))
            .collect();
        packages.sort();
        let list = match filter.mode() {
            FilterMode::Include => "include",
            FilterMode::Exclude => "exclude",
        };
        log.debug(format_args!("Package {} list: {}", list, packages.join(", ")));
    }
    log.debug(format_args!(
        "Agent output stream: {}",
        config.agent_stream.config_value()
    ));
    if let Some(algorithm) = config.call_graph {
        log.debug(format_args!("Call graph algorithm: {}", algorithm));
    }
}

fn write_artifacts(
    config: &AnalyzerConfig,
    log: &LogContext,
    collector: &mut TypeCollector,
    summary: &mut RunSummary,
) -> Result<()> {
    let writer = TableWriter::new(&config.output_dir, log.clone());
    writer.ensure_output_dir()?;

    if config.table_outputs.sym_ref_tables() {
        let symbols = collector.symbols();
        summary
            .written
            .push(writer.write_compact(SYMBOL_TABLE_FILE, symbols.table())?);
        let references = collector
            .references()
            .to_value(symbols.resolve_duplicate_groups());
        summary
            .written
            .push(writer.write_compact(REFERENCE_TABLE_FILE, &references)?);
    }

    if config.table_outputs.instrumentation_config() {
        let document = instrumentation_config(config.agent_stream, config.log_level);
        summary
            .written
            .push(writer.write_pretty(INSTRUMENTATION_CONFIG_FILE, &document)?);
    }

    if let Some(engine) = collector.engine_mut() {
        let (path, exported) = writer.write_call_graph(engine)?;
        summary.written.push(path);
        summary.call_graph_exported = exported;
    }

    Ok(())
}
