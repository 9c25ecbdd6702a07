use std::collections::HashSet;

use super::descriptor::TypeDescriptor;
use super::filter::TypeFilter;
use super::references::ReferenceTableBuilder;
use super::symbols::SymbolTableBuilder;
use super::traversal::TypeSink;
use crate::engine::GraphEngine;
use crate::logging::LogContext;

/// Receives the traversal stream, applies acceptance and the qualified-name
/// policy, and feeds accepted types to the tables and the graph engine.
pub struct TypeCollector {
    log: LogContext,
    filter: TypeFilter,
    index_duplicate_types: bool,
    symbols: SymbolTableBuilder,
    references: ReferenceTableBuilder,
    engine: Option<Box<dyn GraphEngine>>,
    indexed: HashSet<String>,
    duplicates: HashSet<String>,
    skipped: HashSet<String>,
}

impl TypeCollector {
    pub fn new(log: LogContext, filter: TypeFilter) -> Self {
        Self {
            log,
            filter,
            index_duplicate_types: false,
            symbols: SymbolTableBuilder::new(),
            references: ReferenceTableBuilder::new(),
            engine: None,
            indexed: HashSet::new(),
            duplicates: HashSet::new(),
            skipped: HashSet::new(),
        }
    }

    /// Index every occurrence of a qualified name instead of only the first.
    pub fn with_index_duplicate_types(mut self, index: bool) -> Self {
        self.index_duplicate_types = index;
        self
    }

    pub fn with_engine(mut self, engine: Option<Box<dyn GraphEngine>>) -> Self {
        self.engine = engine;
        self
    }

    pub fn symbols(&self) -> &SymbolTableBuilder {
        &self.symbols
    }

    pub fn references(&self) -> &ReferenceTableBuilder {
        &self.references
    }

    pub fn engine_mut(&mut self) -> Option<&mut (dyn GraphEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    /// Distinct qualified names indexed so far.
    pub fn indexed_count(&self) -> usize {
        self.indexed.len()
    }

    pub fn cleanup_engine(&mut self) {
        if let Some(engine) = self.engine.as_deref_mut() {
            engine.cleanup();
        }
    }
}

impl TypeSink for TypeCollector {
    fn accept(&mut self, descriptor: TypeDescriptor, bytes: &[u8]) {
        let qualified_name = descriptor.qualified_name();

        if !self.filter.accepts(&descriptor) {
            if self.skipped.insert(qualified_name) {
                self.log
                    .trace(format_args!("Skipping type {}", descriptor.binary_name));
            }
            return;
        }

        let first_occurrence = !self.indexed.contains(&qualified_name);
        if !first_occurrence {
            if self.duplicates.insert(qualified_name.clone()) {
                self.log
                    .warn(format_args!("Duplicate type {}", descriptor.binary_name));
            }
            if !self.index_duplicate_types {
                return;
            }
        }

        self.log
            .info(format_args!("Analyzing type {}", descriptor.binary_name));
        let key = self.symbols.accept(&descriptor);
        self.references.accept(&descriptor, &key);

        if first_occurrence {
            if let Some(engine) = self.engine.as_deref_mut() {
                engine.add_candidate(&descriptor, bytes);
            }
            self.indexed.insert(qualified_name);
        }
    }
}
