#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::ZipWriter;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ENUM: u16 = 0x4000;

/// Instructions understood by `ClassBuilder` method bodies.
#[derive(Debug, Clone)]
pub enum Op {
    InvokeVirtual(String, String, String),
    InvokeSpecial(String, String, String),
    InvokeStatic(String, String, String),
    InvokeInterface(String, String, String),
    New(String),
    Pop,
}

pub fn invoke_virtual(owner: &str, name: &str, descriptor: &str) -> Op {
    Op::InvokeVirtual(owner.into(), name.into(), descriptor.into())
}

pub fn invoke_special(owner: &str, name: &str, descriptor: &str) -> Op {
    Op::InvokeSpecial(owner.into(), name.into(), descriptor.into())
}

pub fn invoke_static(owner: &str, name: &str, descriptor: &str) -> Op {
    Op::InvokeStatic(owner.into(), name.into(), descriptor.into())
}

pub fn invoke_interface(owner: &str, name: &str, descriptor: &str) -> Op {
    Op::InvokeInterface(owner.into(), name.into(), descriptor.into())
}

pub fn new_instance(class: &str) -> Op {
    Op::New(class.into())
}

struct Method {
    access: u16,
    name: String,
    descriptor: String,
    code: Option<Vec<Op>>,
    exceptions: Vec<String>,
}

struct InnerClass {
    inner: String,
    outer: Option<String>,
    name: Option<String>,
    flags: u16,
}

struct Annotation {
    descriptor: String,
    string_value: Option<(String, String)>,
}

/// Assembles minimal but well-formed compiled types. Names are internal
/// (slash separated).
pub struct ClassBuilder {
    access: u16,
    this_class: String,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<(u16, String, String)>,
    methods: Vec<Method>,
    inner_classes: Vec<InnerClass>,
    annotations: Vec<Annotation>,
}

impl ClassBuilder {
    /// A public class extending `java/lang/Object`.
    pub fn new(name: &str) -> Self {
        Self {
            access: ACC_PUBLIC | ACC_SUPER,
            this_class: name.to_string(),
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            inner_classes: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn extends(mut self, super_class: &str) -> Self {
        self.super_class = Some(super_class.to_string());
        self
    }

    pub fn without_super(mut self) -> Self {
        self.super_class = None;
        self
    }

    pub fn implements(mut self, interface: &str) -> Self {
        self.interfaces.push(interface.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields
            .push((access, name.to_string(), descriptor.to_string()));
        self
    }

    /// Method with an empty body.
    pub fn method(self, access: u16, name: &str, descriptor: &str) -> Self {
        self.method_calling(access, name, descriptor, Vec::new())
    }

    /// Method whose body runs `ops` and returns.
    pub fn method_calling(mut self, access: u16, name: &str, descriptor: &str, ops: Vec<Op>) -> Self {
        self.methods.push(Method {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code: Some(ops),
            exceptions: Vec::new(),
        });
        self
    }

    /// Method without a Code attribute.
    pub fn abstract_method(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.methods.push(Method {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            code: None,
            exceptions: Vec::new(),
        });
        self
    }

    /// Declares thrown exceptions on the most recently added method.
    pub fn throws(mut self, exceptions: &[&str]) -> Self {
        if let Some(method) = self.methods.last_mut() {
            method
                .exceptions
                .extend(exceptions.iter().map(|name| name.to_string()));
        }
        self
    }

    pub fn inner_class(mut self, inner: &str, outer: Option<&str>, name: Option<&str>, flags: u16) -> Self {
        self.inner_classes.push(InnerClass {
            inner: inner.to_string(),
            outer: outer.map(str::to_string),
            name: name.map(str::to_string),
            flags,
        });
        self
    }

    pub fn annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push(Annotation {
            descriptor: descriptor.to_string(),
            string_value: None,
        });
        self
    }

    /// Annotation carrying one string element, e.g. `@Path(value = "x")`.
    pub fn annotation_with_value(mut self, descriptor: &str, element: &str, value: &str) -> Self {
        self.annotations.push(Annotation {
            descriptor: descriptor.to_string(),
            string_value: Some((element.to_string(), value.to_string())),
        });
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        put_u2(&mut body, self.access);
        let this_index = pool.class(&self.this_class);
        put_u2(&mut body, this_index);
        let super_index = self
            .super_class
            .as_deref()
            .map(|name| pool.class(name))
            .unwrap_or(0);
        put_u2(&mut body, super_index);

        put_u2(&mut body, self.interfaces.len() as u16);
        for interface in &self.interfaces {
            let index = pool.class(interface);
            put_u2(&mut body, index);
        }

        put_u2(&mut body, self.fields.len() as u16);
        for (access, name, descriptor) in &self.fields {
            put_u2(&mut body, *access);
            put_u2(&mut body, pool.utf8(name));
            put_u2(&mut body, pool.utf8(descriptor));
            put_u2(&mut body, 0);
        }

        put_u2(&mut body, self.methods.len() as u16);
        for method in &self.methods {
            put_u2(&mut body, method.access);
            put_u2(&mut body, pool.utf8(&method.name));
            put_u2(&mut body, pool.utf8(&method.descriptor));

            let mut attributes = Vec::new();
            if let Some(ops) = &method.code {
                let code = encode_code(ops, &mut pool);
                let mut data = Vec::new();
                put_u2(&mut data, 10);
                put_u2(&mut data, 10);
                put_u4(&mut data, code.len() as u32);
                data.extend_from_slice(&code);
                put_u2(&mut data, 0);
                put_u2(&mut data, 0);
                attributes.push((pool.utf8("Code"), data));
            }
            if !method.exceptions.is_empty() {
                let mut data = Vec::new();
                put_u2(&mut data, method.exceptions.len() as u16);
                for exception in &method.exceptions {
                    put_u2(&mut data, pool.class(exception));
                }
                attributes.push((pool.utf8("Exceptions"), data));
            }
            put_attributes(&mut body, &attributes);
        }

        let mut attributes = Vec::new();
        if !self.inner_classes.is_empty() {
            let mut data = Vec::new();
            put_u2(&mut data, self.inner_classes.len() as u16);
            for inner in &self.inner_classes {
                put_u2(&mut data, pool.class(&inner.inner));
                let outer = inner.outer.as_deref().map(|name| pool.class(name)).unwrap_or(0);
                put_u2(&mut data, outer);
                let name = inner.name.as_deref().map(|name| pool.utf8(name)).unwrap_or(0);
                put_u2(&mut data, name);
                put_u2(&mut data, inner.flags);
            }
            attributes.push((pool.utf8("InnerClasses"), data));
        }
        if !self.annotations.is_empty() {
            let mut data = Vec::new();
            put_u2(&mut data, self.annotations.len() as u16);
            for annotation in &self.annotations {
                put_u2(&mut data, pool.utf8(&annotation.descriptor));
                match &annotation.string_value {
                    Some((element, value)) => {
                        put_u2(&mut data, 1);
                        put_u2(&mut data, pool.utf8(element));
                        data.push(b's');
                        put_u2(&mut data, pool.utf8(value));
                    }
                    None => put_u2(&mut data, 0),
                }
            }
            attributes.push((pool.utf8("RuntimeVisibleAnnotations"), data));
        }
        put_attributes(&mut body, &attributes);

        let mut bytes = Vec::new();
        put_u4(&mut bytes, 0xCAFE_BABE);
        put_u2(&mut bytes, 0);
        put_u2(&mut bytes, 52);
        put_u2(&mut bytes, pool.entries.len() as u16 + 1);
        for entry in &pool.entries {
            bytes.extend_from_slice(entry);
        }
        bytes.extend_from_slice(&body);
        bytes
    }
}

/// Constant pool with interning; indices start at 1.
#[derive(Default)]
struct Pool {
    entries: Vec<Vec<u8>>,
    interned: HashMap<Vec<u8>, u16>,
}

impl Pool {
    fn intern(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(index) = self.interned.get(&entry) {
            return *index;
        }
        self.entries.push(entry.clone());
        let index = self.entries.len() as u16;
        self.interned.insert(entry, index);
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        let mut entry = vec![1];
        put_u2(&mut entry, value.len() as u16);
        entry.extend_from_slice(value.as_bytes());
        self.intern(entry)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        let mut entry = vec![7];
        put_u2(&mut entry, name_index);
        self.intern(entry)
    }

    fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut entry = vec![12];
        put_u2(&mut entry, name_index);
        put_u2(&mut entry, descriptor_index);
        self.intern(entry)
    }

    fn member_ref(&mut self, tag: u8, owner: &str, name: &str, descriptor: &str) -> u16 {
        let class_index = self.class(owner);
        let nat_index = self.name_and_type(name, descriptor);
        let mut entry = vec![tag];
        put_u2(&mut entry, class_index);
        put_u2(&mut entry, nat_index);
        self.intern(entry)
    }
}

fn encode_code(ops: &[Op], pool: &mut Pool) -> Vec<u8> {
    let mut code = Vec::new();
    for op in ops {
        match op {
            Op::InvokeVirtual(owner, name, descriptor) => {
                code.push(0xb6);
                put_u2(&mut code, pool.member_ref(10, owner, name, descriptor));
            }
            Op::InvokeSpecial(owner, name, descriptor) => {
                code.push(0xb7);
                put_u2(&mut code, pool.member_ref(10, owner, name, descriptor));
            }
            Op::InvokeStatic(owner, name, descriptor) => {
                code.push(0xb8);
                put_u2(&mut code, pool.member_ref(10, owner, name, descriptor));
            }
            Op::InvokeInterface(owner, name, descriptor) => {
                code.push(0xb9);
                put_u2(&mut code, pool.member_ref(11, owner, name, descriptor));
                code.push(1);
                code.push(0);
            }
            Op::New(class) => {
                code.push(0xbb);
                put_u2(&mut code, pool.class(class));
            }
            Op::Pop => code.push(0x57),
        }
    }
    code.push(0xb1);
    code
}

fn put_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    put_u2(out, attributes.len() as u16);
    for (name_index, data) in attributes {
        put_u2(out, *name_index);
        put_u4(out, data.len() as u32);
        out.extend_from_slice(data);
    }
}

fn put_u2(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

fn put_u4(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Public class with a public constructor, ready to be packed into an archive.
pub fn simple_class(name: &str) -> Vec<u8> {
    ClassBuilder::new(name)
        .method(ACC_PUBLIC, "<init>", "()V")
        .build()
}

/// In-memory zip-family archive.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    pub fn entry(mut self, name: &str, bytes: &[u8]) -> Self {
        self.writer
            .start_file(name, FileOptions::default())
            .unwrap();
        self.writer.write_all(bytes).unwrap();
        self
    }

    pub fn directory(mut self, name: &str) -> Self {
        self.writer
            .add_directory(name, FileOptions::default())
            .unwrap();
        self
    }

    /// Adds the class under its internal name.
    pub fn class(self, internal_name: &str, bytes: &[u8]) -> Self {
        let name = format!("{}.class", internal_name);
        self.entry(&name, bytes)
    }

    pub fn build(mut self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, bytes).unwrap();
    path
}
