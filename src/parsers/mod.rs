pub mod bytecode;
pub mod classfile;
pub mod modifiers;
pub mod signature;

use thiserror::Error;

pub use classfile::{parse_class, AttributeInfo, ClassFile, ConstantPool, MemberInfo, MemberRef};
pub use modifiers::{AccessFlags, MemberKind};
pub use signature::{parse_field_type, parse_method_descriptor, FieldType, MethodDescriptorTypes};

#[derive(Debug, Error)]
pub enum ClassParseError {
    #[error("unexpected end of class file")]
    UnexpectedEof,
    #[error("invalid class file magic header")]
    InvalidMagic,
    #[error("unsupported constant pool tag {tag}")]
    UnsupportedConstant { tag: u8 },
    #[error("invalid constant pool index {index}")]
    InvalidConstantIndex { index: u16 },
    #[error("malformed descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("invalid opcode 0x{opcode:02x} at bytecode offset {offset}")]
    InvalidBytecode { offset: usize, opcode: u8 },
}
