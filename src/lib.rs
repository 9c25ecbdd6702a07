//! # CLASSMAP
//!
//! Structural inventory of compiled JVM applications.
//!
//! CLASSMAP walks application archives (jar, war, ear, rar, zip and the eba/cba
//! bundle formats, nested to any depth), extracts a descriptor for every
//! compiled type it finds and writes a set of JSON documents describing them.
//!
//! ## Artifacts
//!
//! - **symTable.json**: one record per type with fields, methods, modifiers and supertypes
//! - **refTable.json**: source file, qualified name and duplicate cross references
//! - **instrumenter-config.json**: configuration for the runtime instrumentation agent
//! - **callGraph.json**: weighted class-level call graph, when requested

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod parsers;

pub use crate::config::{AgentStream, AnalyzerConfig, TableOutputs};
pub use crate::core::{Analyzer, RunSummary};
pub use crate::error::ClassmapError;
pub use crate::logging::LogContext;
