use clap::ValueEnum;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::container::ContainerType;
use crate::core::filter::PackageFilter;
use crate::engine::CallGraphAlgorithm;
use crate::logging::LogContext;

/// Which table artifacts a run writes.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum TableOutputs {
    /// Symbol, reference and instrumentation config documents.
    #[default]
    All,
    SymRefTables,
    InstrumentationConfig,
    None,
}

impl TableOutputs {
    pub fn sym_ref_tables(self) -> bool {
        matches!(self, TableOutputs::All | TableOutputs::SymRefTables)
    }

    pub fn instrumentation_config(self) -> bool {
        matches!(self, TableOutputs::All | TableOutputs::InstrumentationConfig)
    }
}

/// Stream the instrumentation agent prints to.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, ValueEnum)]
pub enum AgentStream {
    Stdout,
    #[default]
    Stderr,
}

impl AgentStream {
    /// Value written to the instrumentation config.
    pub fn config_value(self) -> &'static str {
        match self {
            AgentStream::Stdout => "out",
            AgentStream::Stderr => "err",
        }
    }
}

/// Everything one run needs to know.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub extra_libraries: Vec<PathBuf>,
    pub packages: Option<PackageFilter>,
    pub allow_any_legal_types: bool,
    pub index_duplicate_types: bool,
    pub agent_stream: AgentStream,
    pub table_outputs: TableOutputs,
    pub call_graph: Option<CallGraphAlgorithm>,
    pub log_level: LevelFilter,
}

impl AnalyzerConfig {
    pub fn new<I, P>(inputs: I, output_dir: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output_dir: output_dir.into(),
            extra_libraries: Vec::new(),
            packages: None,
            allow_any_legal_types: false,
            index_duplicate_types: false,
            agent_stream: AgentStream::default(),
            table_outputs: TableOutputs::default(),
            call_graph: None,
            log_level: LevelFilter::Info,
        }
    }

    pub fn with_extra_libraries<I, P>(mut self, libraries: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.extra_libraries
            .extend(libraries.into_iter().map(Into::into));
        self
    }

    pub fn with_packages(mut self, packages: PackageFilter) -> Self {
        self.packages = Some(packages);
        self
    }

    pub fn with_allow_any_legal_types(mut self, allow: bool) -> Self {
        self.allow_any_legal_types = allow;
        self
    }

    pub fn with_index_duplicate_types(mut self, index: bool) -> Self {
        self.index_duplicate_types = index;
        self
    }

    pub fn with_agent_stream(mut self, stream: AgentStream) -> Self {
        self.agent_stream = stream;
        self
    }

    pub fn with_table_outputs(mut self, outputs: TableOutputs) -> Self {
        self.table_outputs = outputs;
        self
    }

    pub fn with_call_graph(mut self, algorithm: Option<CallGraphAlgorithm>) -> Self {
        self.call_graph = algorithm;
        self
    }

    pub fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    /// Library archives to traverse after the primary inputs. Directories
    /// contribute the `.jar` files directly inside them.
    pub fn library_archives(&self, log: &LogContext) -> Vec<PathBuf> {
        let mut archives = Vec::new();
        for library in &self.extra_libraries {
            if library.is_dir() {
                let mut found: Vec<PathBuf> = WalkDir::new(library)
                    .min_depth(1)
                    .max_depth(1)
                    .into_iter()
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.into_path())
                    .filter(|path| path.is_file())
                    .collect();
                found.sort();
                for path in found {
                    push_if_jar(&mut archives, path, log);
                }
            } else {
                push_if_jar(&mut archives, library.clone(), log);
            }
        }
        archives
    }
}

fn push_if_jar(archives: &mut Vec<PathBuf>, path: PathBuf, log: &LogContext) {
    if is_jar(&path) {
        archives.push(path);
    } else {
        log.trace(format_args!(
            "Ignoring extra library {}: not a .jar",
            path.display()
        ));
    }
}

fn is_jar(path: &Path) -> bool {
    path.file_name()
        .map(|name| ContainerType::classify(&name.to_string_lossy()) == ContainerType::Jar)
        .unwrap_or(false)
}
