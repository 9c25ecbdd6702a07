use serde_json::{json, Map, Value};

use super::descriptor::TypeDescriptor;

/// Reference table schema version understood by downstream consumers.
pub const REFERENCE_TABLE_VERSION: &str = "v2.0.0r44";

/// Cross-reference views derived from the accepted type stream. Every map is
/// append-only.
#[derive(Debug, Default)]
pub struct ReferenceTableBuilder {
    files: Map<String, Value>,
    qualified_names: Map<String, Value>,
    class_names: Map<String, Value>,
}

impl ReferenceTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `descriptor` under the symbol key it was assigned.
    pub fn accept(&mut self, descriptor: &TypeDescriptor, key: &str) {
        let source_path = descriptor.source_path();

        let file = self
            .files
            .entry(source_path.clone())
            .or_insert_with(|| new_file_entry(descriptor));
        if let Value::Object(file) = file {
            let local_name = descriptor.local_name().to_string();
            let joined = match file.get(&local_name).and_then(Value::as_str) {
                Some(existing) => format!("{},{}", existing, key),
                None => key.to_string(),
            };
            file.insert(local_name, Value::String(joined));
        }

        let keys = self
            .qualified_names
            .entry(descriptor.qualified_name())
            .or_insert_with(|| json!([]));
        if let Value::Array(keys) = keys {
            keys.push(Value::String(key.to_string()));
        }

        let parsed = self
            .class_names
            .entry(source_path)
            .or_insert_with(|| json!({}));
        if let Value::Object(parsed) = parsed {
            parsed.insert(descriptor.class_name(), Value::String(key.to_string()));
        }
    }

    /// Keys recorded for a qualified name, in assignment order.
    pub fn keys_for(&self, qualified_name: &str) -> Vec<&str> {
        self.qualified_names
            .get(qualified_name)
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn file(&self, source_path: &str) -> Option<&Map<String, Value>> {
        self.files.get(source_path).and_then(Value::as_object)
    }

    /// Assembles the persisted document with the resolved duplicate groups.
    pub fn to_value(&self, duplicate_classes: Map<String, Value>) -> Value {
        json!({
            "Files": self.files,
            "Dup_Class": duplicate_classes,
            "Version": REFERENCE_TABLE_VERSION,
            "Enums": {},
            "FQCN": self.qualified_names,
            "Jparser": self.class_names,
        })
    }
}

fn new_file_entry(descriptor: &TypeDescriptor) -> Value {
    let mut entry = Map::new();
    if let Some(package) = descriptor.package_name() {
        entry.insert("package".to_string(), Value::String(package.to_string()));
    }
    entry.insert("import".to_string(), json!([]));
    Value::Object(entry)
}
