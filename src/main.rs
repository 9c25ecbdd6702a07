use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use classmap::core::filter::{FilterMode, PackageFilter};
use classmap::engine::CallGraphAlgorithm;
use classmap::{AgentStream, Analyzer, AnalyzerConfig, LogContext, TableOutputs};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "classmap",
    version = "0.1.0",
    author = "classmap developers",
    about = "Structural inventory of compiled JVM application archives"
)]
struct Cli {
    /// Application archives (jar, war, ear, rar, zip, eba, cba) or class files
    #[arg(value_name = "ARCHIVE", required = true, num_args = 1..)]
    inputs: Vec<PathBuf>,

    /// Directory the tables are written to
    #[arg(short, long, value_name = "DIR", default_value = "classmap-out")]
    output: PathBuf,

    /// Extra library jars, or directories holding them
    #[arg(short = 'l', long, value_name = "PATH", value_delimiter = ',')]
    extra_libs: Vec<PathBuf>,

    /// Comma-separated packages to restrict the analysis to; `<default>` names the unnamed package
    #[arg(short, long, value_name = "PKGS", value_delimiter = ',')]
    packages: Option<Vec<String>>,

    /// Whether the package list includes or excludes
    #[arg(long, value_enum, default_value_t = FilterMode::Exclude)]
    package_mode: FilterMode,

    /// Also build a class-level call graph with the given algorithm
    #[arg(short = 'g', long, value_name = "ALGORITHM", value_enum)]
    call_graph: Option<CallGraphAlgorithm>,

    /// Index interfaces, enums, annotations and local/anonymous classes too
    #[arg(long)]
    allow_any_types: bool,

    /// Index every copy of a type found more than once, not only the first
    #[arg(long)]
    index_duplicate_types: bool,

    /// Stream the instrumentation agent prints to
    #[arg(long, value_enum, default_value_t = AgentStream::Stderr)]
    agent_stream: AgentStream,

    /// Which table documents to write
    #[arg(short, long, value_enum, default_value_t = TableOutputs::All)]
    tables: TableOutputs,

    /// Logging verbosity
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level.filter());
    run(cli)
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            if record.level() == Level::Info {
                writeln!(buf, "{}", record.args())
            } else {
                writeln!(buf, "[{:<5}] {}", record.level(), record.args())
            }
        })
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        inputs,
        output,
        extra_libs,
        packages,
        package_mode,
        call_graph,
        allow_any_types,
        index_duplicate_types,
        agent_stream,
        tables,
        log_level,
    } = cli;

    let start_time = Instant::now();
    let log = LogContext::new(log_level.filter());

    let mut config = AnalyzerConfig::new(inputs, &output)
        .with_extra_libraries(extra_libs)
        .with_allow_any_legal_types(allow_any_types)
        .with_index_duplicate_types(index_duplicate_types)
        .with_agent_stream(agent_stream)
        .with_table_outputs(tables)
        .with_call_graph(call_graph)
        .with_log_level(log_level.filter());
    if let Some(packages) = packages {
        config = config.with_packages(PackageFilter::from_tokens(packages, package_mode, &log));
    }

    let summary = Analyzer::with_log_context(config, log.clone()).run()?;

    log.info(format_args!(
        "Analysis complete in {:.2}s: {} types, {} warnings, {} errors. Output: {}",
        start_time.elapsed().as_secs_f64(),
        summary.indexed_types,
        log.warnings(),
        log.errors(),
        output.display()
    ));

    Ok(())
}
