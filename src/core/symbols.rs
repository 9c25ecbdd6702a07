use serde_json::{json, Map, Value};
use std::collections::HashMap;

use super::descriptor::{FieldDescriptor, MethodDescriptor, TypeDescriptor};
use crate::parsers::MemberKind;

const OBJECT_CLASS: &str = "java.lang.Object";

/// Symbol keys that arose from the same nominal key. The anchor is the
/// nominal key itself and is always the first member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub anchor: String,
    pub members: Vec<String>,
}

/// Accumulates one record per accepted type, keyed by a collision-free
/// symbol key, in insertion order.
#[derive(Debug, Default)]
pub struct SymbolTableBuilder {
    table: Map<String, Value>,
    groups: Vec<DuplicateGroup>,
    group_index: HashMap<String, usize>,
    duplicate_counters: HashMap<String, usize>,
}

impl SymbolTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record for `descriptor` and returns the key it was stored under.
    pub fn accept(&mut self, descriptor: &TypeDescriptor) -> String {
        let nominal = symbol_key(descriptor);
        let record = render_type(descriptor);

        if !self.table.contains_key(&nominal) {
            self.table.insert(nominal.clone(), record);
            return nominal;
        }

        let key = self.next_duplicate_key(&nominal);
        let group = match self.group_index.get(&nominal) {
            Some(&index) => index,
            None => {
                self.groups.push(DuplicateGroup {
                    anchor: nominal.clone(),
                    members: vec![nominal.clone()],
                });
                self.group_index.insert(nominal.clone(), self.groups.len() - 1);
                self.groups.len() - 1
            }
        };
        self.groups[group].members.push(key.clone());
        self.table.insert(key.clone(), record);
        key
    }

    fn next_duplicate_key(&mut self, nominal: &str) -> String {
        let counter = self.duplicate_counters.entry(nominal.to_string()).or_insert(0);
        loop {
            *counter += 1;
            let candidate = format!("{} [Duplicate_#{:03}]", nominal, counter);
            if !self.table.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.table.get(key)
    }

    pub fn duplicate_groups(&self) -> &[DuplicateGroup] {
        &self.groups
    }

    /// For every duplicate group, maps each member's source file to its key.
    pub fn resolve_duplicate_groups(&self) -> Map<String, Value> {
        let mut resolved = Map::new();
        for group in &self.groups {
            let mut files = Map::new();
            for member in &group.members {
                if let Some(file) = self
                    .table
                    .get(member)
                    .and_then(|record| record.get("file"))
                    .and_then(Value::as_str)
                {
                    files.insert(file.to_string(), Value::String(member.clone()));
                }
            }
            resolved.insert(group.anchor.clone(), Value::Object(files));
        }
        resolved
    }

    pub fn table(&self) -> &Map<String, Value> {
        &self.table
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.table)
    }
}

/// Nominal symbol key: the simple name with nested separators as `::`.
pub fn symbol_key(descriptor: &TypeDescriptor) -> String {
    descriptor.simple_name().replace('$', "::")
}

/// Method keys in declaration order. Repeated names get an
/// `[overloaded_#NNN]` suffix from their second occurrence on.
pub fn method_keys(methods: &[MethodDescriptor]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    methods
        .iter()
        .map(|method| {
            let occurrences = seen.entry(method.name.as_str()).or_insert(0);
            *occurrences += 1;
            if *occurrences == 1 {
                method.name.clone()
            } else {
                format!("{} [overloaded_#{:03}]", method.name, *occurrences - 1)
            }
        })
        .collect()
}

fn render_type(descriptor: &TypeDescriptor) -> Value {
    let modifiers = descriptor.modifiers.names(MemberKind::Type);

    let mut fields = Map::new();
    for field in &descriptor.fields {
        fields.insert(field.name.clone(), render_field(field));
    }

    let mut methods = Map::new();
    let mut signatures = Map::new();
    for (key, method) in method_keys(&descriptor.methods)
        .into_iter()
        .zip(&descriptor.methods)
    {
        signatures.insert(method.signature(), Value::String(key.clone()));
        methods.insert(key, render_method(method));
    }

    let header = render_header(descriptor, &modifiers);
    json!({
        "classVar": fields,
        "funcL": methods,
        "file": descriptor.source_path(),
        "super": render_super(descriptor),
        "modifier": modifiers,
        "header": header,
        "rawEnd": 0,
        "Enum": [],
        "FQCN": descriptor.qualified_name(),
        "Jparser": descriptor.class_name(),
        "funcSig": signatures,
    })
}

fn extended_class(descriptor: &TypeDescriptor) -> Option<&str> {
    descriptor
        .super_class
        .as_deref()
        .filter(|name| *name != OBJECT_CLASS)
}

fn render_header(descriptor: &TypeDescriptor, modifiers: &[&str]) -> String {
    let mut header = String::new();
    for capability in &descriptor.capabilities {
        header.push_str(capability.header_annotation());
        header.push(' ');
    }
    for modifier in modifiers {
        header.push_str(modifier);
        header.push(' ');
    }
    header.push_str("class ");
    header.push_str(descriptor.local_name());
    if let Some(super_class) = extended_class(descriptor) {
        header.push_str(" extends ");
        header.push_str(super_class);
    }
    if !descriptor.interfaces.is_empty() {
        header.push_str(" implements ");
        header.push_str(&descriptor.interfaces.join(", "));
    }
    header.push_str(" {");
    header
}

fn render_super(descriptor: &TypeDescriptor) -> Value {
    let mut object = Map::new();
    if !descriptor.interfaces.is_empty() {
        object.insert(
            "implements".to_string(),
            json!({ "impl_start": 0, "values": descriptor.interfaces }),
        );
    }
    if let Some(super_class) = extended_class(descriptor) {
        object.insert(
            "extends".to_string(),
            json!({
                "ext_start": 0,
                "values": [super_class],
                "CoreType": [[super_class]],
            }),
        );
    }

    if object.is_empty() {
        Value::Null
    } else {
        Value::Object(object)
    }
}

fn render_field(field: &FieldDescriptor) -> Value {
    let modifiers = field.modifiers.names(MemberKind::Field);
    let mut raw = String::new();
    for modifier in &modifiers {
        raw.push_str(modifier);
        raw.push(' ');
    }
    raw.push_str(&format!("{} {};", field.type_name, field.name));

    json!({
        "Var": field.type_name,
        "CoreType": [field.type_name],
        "VarAST": type_ast(&field.type_name),
        "Start": 0,
        "End": 0,
        "modifier": modifiers,
        "RawStr": raw,
    })
}

fn render_method(method: &MethodDescriptor) -> Value {
    let (core_type, ret_type_ast) = match &method.return_type {
        Some(name) => (json!([name]), type_ast(name)),
        None => (json!([]), json!("")),
    };

    let throws = if method.throws.is_empty() {
        Value::Null
    } else {
        json!(method.throws)
    };

    let mut args = Map::new();
    for (index, parameter) in method.parameters.iter().enumerate() {
        args.insert(
            format!("arg{}", index),
            json!({
                "Type": parameter,
                "CoreType": [parameter],
                "TypeAST": type_ast(parameter),
            }),
        );
    }

    let signature = method.signature();
    json!({
        "RetType": method.return_type_name(),
        "RetCoreType": core_type,
        "RetTypeAST": ret_type_ast,
        "Throws": throws,
        "Args": args,
        "Locals": {},
        "modifier": method.modifiers.names(MemberKind::Method),
        "header": format!("{} {} {{", method.return_type_name(), signature),
        "rawEnd": 0,
        "signature": signature,
    })
}

fn type_ast(type_name: &str) -> Value {
    json!({
        "name": type_name,
        "dimensions": [],
        "arguments": null,
        "sub_type": null,
    })
}
