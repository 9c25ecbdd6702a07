use anyhow::{Context, Result};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::graph::{ClassGraph, ClassGraphBuilder, ClassNode};
use super::{CallGraphAlgorithm, GraphEngine};
use crate::core::descriptor::TypeDescriptor;
use crate::formatters::GraphJsonFormatter;
use crate::logging::LogContext;
use crate::parsers::bytecode::{scan_code, Instruction, InvokeKind};
use crate::parsers::{parse_class, AccessFlags, ClassParseError, MemberRef};

/// Bytes of a registered type, kept on disk when possible.
enum StoredBytes {
    File(NamedTempFile),
    Memory(Vec<u8>),
}

struct Candidate {
    name: String,
    bytes: StoredBytes,
}

/// Class-level call graph over the registered application types, built from
/// the invocation instructions of their method bodies.
pub struct CallGraphBuilder {
    algorithm: CallGraphAlgorithm,
    log: LogContext,
    candidates: Vec<Candidate>,
}

impl CallGraphBuilder {
    pub fn new(algorithm: CallGraphAlgorithm, log: LogContext) -> Self {
        Self {
            algorithm,
            log,
            candidates: Vec::new(),
        }
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Registered types currently held in temporary files.
    pub fn temp_file_count(&self) -> usize {
        self.candidates
            .iter()
            .filter(|candidate| matches!(candidate.bytes, StoredBytes::File(_)))
            .count()
    }

    fn materialize(&self, bytes: &[u8]) -> StoredBytes {
        let written = tempfile::Builder::new()
            .prefix("classmap")
            .suffix(".class")
            .tempfile()
            .and_then(|mut file| file.write_all(bytes).map(|_| file));
        match written {
            Ok(file) => StoredBytes::File(file),
            Err(err) => {
                self.log.warn(format_args!(
                    "Could not create a temporary file, keeping type in memory: {}",
                    err
                ));
                StoredBytes::Memory(bytes.to_vec())
            }
        }
    }

    /// Builds the class graph, or `None` when the scope or the set of entry
    /// points is empty.
    pub fn build_graph(&self) -> Option<ClassGraph> {
        if self.candidates.is_empty() {
            return None;
        }

        let scope = self.load_scope();
        let entry_points: Vec<(&str, &ScopeMethod)> = scope
            .order
            .iter()
            .filter_map(|name| scope.classes.get(name).map(|class| (name, class)))
            .flat_map(|(name, class)| {
                class
                    .methods
                    .iter()
                    .filter(|method| method.is_public && method.has_code)
                    .map(move |method| (name.as_str(), method))
            })
            .collect();
        if entry_points.is_empty() {
            return None;
        }

        self.log.debug(format_args!(
            "Call graph scope: {} types, {} entry points",
            scope.classes.len(),
            entry_points.len()
        ));

        let mut builder = ClassGraphBuilder::new();
        for (source, method) in entry_points {
            for (kind, call) in &method.calls {
                for target in scope.targets(self.algorithm, *kind, call) {
                    if let (Some(source), Some(target)) =
                        (scope.class_node(source), scope.class_node(target))
                    {
                        builder.add_call(source, target);
                    }
                }
            }
        }

        Some(builder.build())
    }

    /// Re-reads and parses every registered type. Parsing runs in parallel;
    /// the scope is assembled in registration order.
    fn load_scope(&self) -> Scope {
        let parsed: Vec<Option<ParsedClass>> = self
            .candidates
            .par_iter()
            .map(|candidate| {
                let bytes = match &candidate.bytes {
                    StoredBytes::File(file) => match fs::read(file.path()) {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            self.log.warn(format_args!(
                                "Could not re-read {} for call graph: {}",
                                candidate.name, err
                            ));
                            return None;
                        }
                    },
                    StoredBytes::Memory(bytes) => bytes.clone(),
                };
                match parse_scope_class(&bytes) {
                    Ok(parsed) => Some(parsed),
                    Err(err) => {
                        self.log.warn(format_args!(
                            "Leaving {} out of the call graph: {}",
                            candidate.name, err
                        ));
                        None
                    }
                }
            })
            .collect();

        let mut scope = Scope::default();
        for parsed in parsed.into_iter().flatten() {
            scope.add_class(parsed);
        }
        scope.index_subtypes();
        scope
    }
}

impl GraphEngine for CallGraphBuilder {
    fn add_candidate(&mut self, descriptor: &TypeDescriptor, bytes: &[u8]) {
        let stored = self.materialize(bytes);
        self.candidates.push(Candidate {
            name: descriptor.binary_name.clone(),
            bytes: stored,
        });
    }

    fn build_and_export(&mut self, path: &Path) -> Result<bool> {
        self.log.info(format_args!(
            "Building call graph ({}) over {} types",
            self.algorithm,
            self.candidates.len()
        ));
        let Some(graph) = self.build_graph() else {
            return Ok(false);
        };
        GraphJsonFormatter::new()
            .format_to_file(&graph, path)
            .with_context(|| format!("failed to export call graph to {}", path.display()))?;
        Ok(true)
    }

    fn cleanup(&mut self) {
        // Dropping a NamedTempFile deletes it.
        self.candidates.clear();
    }
}

struct ScopeMethod {
    name: String,
    descriptor: String,
    is_public: bool,
    is_static: bool,
    has_code: bool,
    calls: Vec<(InvokeKind, MemberRef)>,
}

struct ScopeClass {
    binary_name: String,
    flags: AccessFlags,
    super_class: Option<String>,
    interfaces: Vec<String>,
    static_fields: usize,
    instance_fields: usize,
    methods: Vec<ScopeMethod>,
}

impl ScopeClass {
    fn declares(&self, name: &str, descriptor: &str) -> bool {
        self.methods
            .iter()
            .any(|method| method.name == name && method.descriptor == descriptor)
    }

    fn implements(&self, name: &str, descriptor: &str) -> bool {
        self.methods.iter().any(|method| {
            method.name == name && method.descriptor == descriptor && method.has_code
        })
    }

    fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.super_class
            .as_deref()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }
}

struct ParsedClass {
    name: String,
    class: ScopeClass,
    instantiated: Vec<String>,
}

fn parse_scope_class(bytes: &[u8]) -> Result<ParsedClass, ClassParseError> {
    let class = parse_class(bytes)?;
    let flags = AccessFlags::merge_inner(class.access_flags, class.inner_access_flags()?);

    let static_fields = class
        .fields
        .iter()
        .filter(|field| AccessFlags(field.access_flags).is_static())
        .count();

    let mut instantiated = Vec::new();
    let mut methods = Vec::with_capacity(class.methods.len());
    for method in &class.methods {
        let method_flags = AccessFlags(method.access_flags);
        let code = method.code()?;
        let mut calls = Vec::new();
        if let Some(code) = code {
            for instruction in scan_code(code)? {
                match instruction {
                    Instruction::Invoke { kind, index } => {
                        calls.push((kind, class.constant_pool.member_ref(index)?));
                    }
                    Instruction::New { index } => {
                        instantiated.push(class.constant_pool.class_name(index)?.to_string());
                    }
                }
            }
        }
        methods.push(ScopeMethod {
            name: method.name.clone(),
            descriptor: method.descriptor.clone(),
            is_public: method_flags.is_public(),
            is_static: method_flags.is_static(),
            has_code: code.is_some(),
            calls,
        });
    }

    Ok(ParsedClass {
        name: class.this_class.clone(),
        class: ScopeClass {
            binary_name: class.this_class.replace('/', "."),
            flags,
            super_class: class.super_class.clone(),
            interfaces: class.interfaces.clone(),
            static_fields,
            instance_fields: class.fields.len() - static_fields,
            methods,
        },
        instantiated,
    })
}

/// Registered types keyed by internal name.
#[derive(Default)]
struct Scope {
    classes: HashMap<String, ScopeClass>,
    order: Vec<String>,
    instantiated: HashSet<String>,
    subtypes: HashMap<String, Vec<String>>,
}

impl Scope {
    fn add_class(&mut self, parsed: ParsedClass) {
        let ParsedClass {
            name,
            class,
            instantiated,
        } = parsed;
        self.instantiated.extend(instantiated);
        if self.classes.contains_key(&name) {
            return;
        }
        self.order.push(name.clone());
        self.classes.insert(name, class);
    }

    fn index_subtypes(&mut self) {
        for (name, class) in &self.classes {
            for parent in class.supertypes() {
                self.subtypes
                    .entry(parent.to_string())
                    .or_default()
                    .push(name.clone());
            }
        }
        for children in self.subtypes.values_mut() {
            children.sort();
        }
    }

    /// In-scope type declaring `name`/`descriptor` as seen from `owner`,
    /// searching the superclass chain before interfaces.
    fn declaring_class<'s>(&'s self, owner: &'s str, name: &str, descriptor: &str) -> Option<&'s str> {
        let mut queue = VecDeque::from([owner]);
        let mut visited = HashSet::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            let Some(class) = self.classes.get(current) else {
                continue;
            };
            if class.declares(name, descriptor) {
                return Some(current);
            }
            queue.extend(class.supertypes());
        }
        None
    }

    /// Every in-scope subtype of `owner`, transitively.
    fn all_subtypes<'s>(&'s self, owner: &'s str) -> Vec<&'s str> {
        let mut found = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![owner];
        while let Some(current) = stack.pop() {
            for child in self.subtypes.get(current).into_iter().flatten() {
                if visited.insert(child.as_str()) {
                    found.push(child.as_str());
                    stack.push(child.as_str());
                }
            }
        }
        found
    }

    fn targets<'s>(
        &'s self,
        algorithm: CallGraphAlgorithm,
        kind: InvokeKind,
        call: &'s MemberRef,
    ) -> BTreeSet<&'s str> {
        let mut targets = BTreeSet::new();
        if let Some(declared) = self.declaring_class(&call.owner, &call.name, &call.descriptor) {
            targets.insert(declared);
        }

        if algorithm == CallGraphAlgorithm::ZeroCfa || !kind.is_dynamic_dispatch() {
            return targets;
        }

        for subtype in self.all_subtypes(&call.owner) {
            let Some(class) = self.classes.get(subtype) else {
                continue;
            };
            if !class.implements(&call.name, &call.descriptor) {
                continue;
            }
            if algorithm == CallGraphAlgorithm::Rta && !self.instantiated.contains(subtype) {
                continue;
            }
            targets.insert(subtype);
        }
        targets
    }

    fn class_node(&self, name: &str) -> Option<ClassNode> {
        let class = self.classes.get(name)?;

        // Field totals include fields inherited from in-scope superclasses.
        let mut static_fields = 0;
        let mut total_fields = 0;
        let mut visited = HashSet::new();
        let mut current = Some(class);
        while let Some(ancestor) = current {
            if !visited.insert(ancestor.binary_name.as_str()) {
                break;
            }
            static_fields += ancestor.static_fields;
            total_fields += ancestor.static_fields + ancestor.instance_fields;
            current = ancestor
                .super_class
                .as_deref()
                .and_then(|parent| self.classes.get(parent));
        }

        let static_methods = class.methods.iter().filter(|method| method.is_static).count();
        Some(ClassNode {
            id: class.binary_name.clone(),
            is_private: class.flags.is_private(),
            total_fields,
            static_fields,
            total_methods: class.methods.len(),
            static_methods,
        })
    }
}
