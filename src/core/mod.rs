pub mod analyzer;
pub mod collector;
pub mod container;
pub mod descriptor;
pub mod filter;
pub mod references;
pub mod symbols;
pub mod traversal;

pub use analyzer::{Analyzer, RunSummary};
pub use collector::TypeCollector;
pub use container::{ContainerType, Nesting};
pub use descriptor::{Capability, FieldDescriptor, MethodDescriptor, TypeDescriptor};
pub use filter::{FilterMode, PackageFilter, TypeFilter, DEFAULT_PACKAGE_MARKER};
pub use references::ReferenceTableBuilder;
pub use symbols::{DuplicateGroup, SymbolTableBuilder};
pub use traversal::{ArchiveWalker, TraversalStats, TypeSink};
