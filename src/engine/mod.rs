pub mod call_graph;
pub mod graph;

use anyhow::Result;
use clap::ValueEnum;
use std::fmt;
use std::path::Path;

use crate::core::descriptor::TypeDescriptor;

pub use call_graph::CallGraphBuilder;
pub use graph::{CallEdge, ClassGraph, ClassGraphBuilder, ClassNode};

/// Whole-program analysis collaborator fed with every accepted type.
pub trait GraphEngine {
    /// Registers a compiled type as part of the application scope.
    fn add_candidate(&mut self, descriptor: &TypeDescriptor, bytes: &[u8]);

    /// Analyses the registered scope and writes the graph to `path`.
    /// Returns `false` without writing when there is nothing to analyse.
    fn build_and_export(&mut self, path: &Path) -> Result<bool>;

    /// Releases temporary resources held for registered types.
    fn cleanup(&mut self);
}

/// How call sites are resolved to target types.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum CallGraphAlgorithm {
    /// Dispatch only to subtypes instantiated somewhere in scope.
    Rta,
    /// Each call resolves to the declared target only.
    ZeroCfa,
    /// Calls also dispatch to every overriding subtype in scope.
    #[default]
    ZeroOneCfa,
}

impl CallGraphAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            CallGraphAlgorithm::Rta => "rta",
            CallGraphAlgorithm::ZeroCfa => "zero-cfa",
            CallGraphAlgorithm::ZeroOneCfa => "zero-one-cfa",
        }
    }
}

impl fmt::Display for CallGraphAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
