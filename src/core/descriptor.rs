use std::collections::BTreeSet;

use crate::parsers::signature::internal_to_source_name;
use crate::parsers::{
    parse_class, parse_field_type, parse_method_descriptor, AccessFlags, ClassFile,
    ClassParseError, MemberInfo,
};

/// Root under which synthetic source and binary paths are placed.
pub const SOURCE_ROOT: &str = "project/src/main/java/";

/// Type used for a field whose descriptor cannot be resolved.
pub const UNRESOLVED_TYPE: &str = "java.lang.Object";

/// Separator the compiler uses between an enclosing type and a nested one.
pub const NESTED_SEPARATOR: char = '$';

const MODULE_INFO: &str = "module-info";
const PACKAGE_INFO: &str = "package-info";

/// Framework roles recognised from a type's annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    Entity,
    ServerEndpoint,
    WebServlet,
    Path,
    RequestScoped,
    SessionScoped,
}

impl Capability {
    pub fn from_annotation(descriptor: &str) -> Option<Self> {
        let name = descriptor.strip_prefix('L')?.strip_suffix(';')?;
        let name = name
            .strip_prefix("javax/")
            .or_else(|| name.strip_prefix("jakarta/"))?;
        match name {
            "persistence/Entity" => Some(Capability::Entity),
            "websocket/server/ServerEndpoint" => Some(Capability::ServerEndpoint),
            "servlet/annotation/WebServlet" => Some(Capability::WebServlet),
            "ws/rs/Path" => Some(Capability::Path),
            "enterprise/context/RequestScoped" => Some(Capability::RequestScoped),
            "enterprise/context/SessionScoped" => Some(Capability::SessionScoped),
            _ => None,
        }
    }

    /// Annotation text placed in front of a class header.
    pub fn header_annotation(self) -> &'static str {
        match self {
            Capability::Entity => "@Entity",
            Capability::ServerEndpoint => "@ServerEndpoint(\"\")",
            Capability::WebServlet => "@WebServlet(\"\")",
            Capability::Path => "@Path(\"\")",
            Capability::RequestScoped => "@RequestScoped",
            Capability::SessionScoped => "@SessionScoped",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub modifiers: AccessFlags,
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub modifiers: AccessFlags,
    pub is_constructor: bool,
    pub parameters: Vec<String>,
    /// `None` for `void` and constructors.
    pub return_type: Option<String>,
    pub throws: Vec<String>,
}

impl MethodDescriptor {
    pub fn return_type_name(&self) -> &str {
        self.return_type.as_deref().unwrap_or("void")
    }

    /// `name(T1, T2)`
    pub fn signature(&self) -> String {
        format!("{}({})", self.name, self.parameters.join(", "))
    }
}

/// Structural description of one compiled type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Dotted binary name, nested separators kept: `a.b.Outer$Inner`.
    pub binary_name: String,
    pub modifiers: AccessFlags,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
    pub methods: Vec<MethodDescriptor>,
    pub capabilities: BTreeSet<Capability>,
}

impl TypeDescriptor {
    /// Parses compiled-type bytes into a descriptor.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ClassParseError> {
        let class = parse_class(bytes)?;
        Self::from_class(&class)
    }

    pub fn from_class(class: &ClassFile<'_>) -> Result<Self, ClassParseError> {
        let binary_name = class.this_class.replace('/', ".");
        let modifiers = AccessFlags::merge_inner(class.access_flags, class.inner_access_flags()?);
        let capabilities = class
            .annotation_types()?
            .iter()
            .filter_map(|descriptor| Capability::from_annotation(descriptor))
            .collect();

        let mut descriptor = TypeDescriptor {
            binary_name,
            modifiers,
            super_class: class.super_class.as_deref().map(internal_to_source_name),
            interfaces: class
                .interfaces
                .iter()
                .map(|name| internal_to_source_name(name))
                .collect(),
            fields: Vec::new(),
            methods: Vec::new(),
            capabilities,
        };

        descriptor.fields = class
            .fields
            .iter()
            .filter(|field| !field.name.contains(NESTED_SEPARATOR))
            .map(extract_field)
            .collect();

        let mut methods = Vec::new();
        for method in &class.methods {
            if descriptor.keeps_method(method) {
                methods.push(descriptor.extract_method(method, class)?);
            }
        }
        descriptor.methods = methods;

        Ok(descriptor)
    }

    /// `a.b.Outer.$Inner`
    pub fn qualified_name(&self) -> String {
        self.binary_name.replace(NESTED_SEPARATOR, ".$")
    }

    /// `a.b.Outer.Inner`
    pub fn class_name(&self) -> String {
        self.binary_name.replace(NESTED_SEPARATOR, ".")
    }

    /// `Outer$Inner`
    pub fn simple_name(&self) -> &str {
        self.binary_name
            .rsplit_once('.')
            .map(|(_, simple)| simple)
            .unwrap_or(&self.binary_name)
    }

    /// `Inner`
    pub fn local_name(&self) -> &str {
        let simple = self.simple_name();
        simple
            .rsplit_once(NESTED_SEPARATOR)
            .map(|(_, local)| local)
            .unwrap_or(simple)
    }

    /// `None` for the default package.
    pub fn package_name(&self) -> Option<&str> {
        self.binary_name.rsplit_once('.').map(|(package, _)| package)
    }

    pub fn is_nested(&self) -> bool {
        self.binary_name.contains(NESTED_SEPARATOR)
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }

    /// Source file declaring this type (its top-level enclosing type).
    pub fn source_path(&self) -> String {
        let top_level = self
            .binary_name
            .split(NESTED_SEPARATOR)
            .next()
            .unwrap_or(&self.binary_name);
        format!("{}{}.java", SOURCE_ROOT, top_level.replace('.', "/"))
    }

    pub fn binary_path(&self) -> String {
        format!("{}{}.class", SOURCE_ROOT, self.binary_name.replace('.', "/"))
    }

    /// Module and package descriptors are never indexed.
    pub fn is_pseudo_type(&self) -> bool {
        matches!(self.simple_name(), MODULE_INFO | PACKAGE_INFO)
    }

    /// Local or anonymous types: the innermost segment starts with a digit.
    pub fn is_local_or_anonymous(&self) -> bool {
        self.simple_name()
            .rsplit_once(NESTED_SEPARATOR)
            .and_then(|(_, local)| local.chars().next())
            .map(|first| first.is_ascii_digit())
            .unwrap_or(false)
    }

    /// Whether this is an ordinary named class worth indexing. With
    /// `allow_any_legal_types` interfaces, enums, annotations and
    /// local/anonymous types are accepted too.
    pub fn is_standard_named_type(&self, allow_any_legal_types: bool) -> bool {
        if self.is_pseudo_type() {
            return false;
        }
        if allow_any_legal_types {
            return true;
        }
        let flags = self.modifiers;
        if flags.is_interface() || flags.is_enum() || flags.is_annotation() {
            return false;
        }
        !self.is_local_or_anonymous()
    }

    fn keeps_method(&self, method: &MemberInfo<'_>) -> bool {
        if method.is_constructor() {
            return true;
        }
        if method.is_static_initializer() || method.name.contains(NESTED_SEPARATOR) {
            return false;
        }
        let flags = AccessFlags(method.access_flags);
        !flags.is_synthetic() && !flags.contains(AccessFlags::BRIDGE)
    }

    fn extract_method(
        &self,
        method: &MemberInfo<'_>,
        class: &ClassFile<'_>,
    ) -> Result<MethodDescriptor, ClassParseError> {
        let is_constructor = method.is_constructor();
        let name = if is_constructor {
            self.local_name().to_string()
        } else {
            method.name.clone()
        };

        let (mut parameters, return_type) = match parse_method_descriptor(&method.descriptor) {
            Ok(types) => (
                types.parameters.iter().map(ToString::to_string).collect(),
                types.return_type.map(|ty| ty.to_string()),
            ),
            Err(_) => (Vec::new(), None),
        };

        // Inner (non-static) constructors receive the enclosing instance first.
        if is_constructor && self.is_nested() && !self.is_static() && !parameters.is_empty() {
            parameters.remove(0);
        }

        let throws = method
            .exceptions(&class.constant_pool)?
            .iter()
            .map(|name| internal_to_source_name(name))
            .collect();

        Ok(MethodDescriptor {
            name,
            modifiers: AccessFlags(method.access_flags),
            is_constructor,
            parameters,
            return_type,
            throws,
        })
    }
}

fn extract_field(field: &MemberInfo<'_>) -> FieldDescriptor {
    let type_name = parse_field_type(&field.descriptor)
        .map(|ty| ty.to_string())
        .unwrap_or_else(|_| UNRESOLVED_TYPE.to_string());
    FieldDescriptor {
        name: field.name.clone(),
        modifiers: AccessFlags(field.access_flags),
        type_name,
    }
}
