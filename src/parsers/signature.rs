use std::fmt;

use super::ClassParseError;

/// A field type as written in a descriptor, rendered the way source code
/// spells it (`int`, `java.lang.String`, `a.b.Outer.Inner[]`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Base(&'static str),
    Object(String),
    Array(Box<FieldType>),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(name) => f.write_str(name),
            FieldType::Object(internal) => f.write_str(&internal_to_source_name(internal)),
            FieldType::Array(element) => write!(f, "{}[]", element),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptorTypes {
    pub parameters: Vec<FieldType>,
    /// `None` for `void`.
    pub return_type: Option<FieldType>,
}

/// `a/b/Outer$Inner` -> `a.b.Outer.Inner`
pub fn internal_to_source_name(internal: &str) -> String {
    internal.replace(['/', '$'], ".")
}

pub fn parse_field_type(descriptor: &str) -> Result<FieldType, ClassParseError> {
    let mut parser = DescriptorParser::new(descriptor);
    let ty = parser.parse_type()?;
    if parser.remaining() != 0 {
        return Err(ClassParseError::InvalidDescriptor(descriptor.to_string()));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(descriptor: &str) -> Result<MethodDescriptorTypes, ClassParseError> {
    let mut parser = DescriptorParser::new(descriptor);
    parser.expect(b'(')?;
    let mut parameters = Vec::new();
    while !parser.peek_is(b')')? {
        parameters.push(parser.parse_type()?);
    }
    parser.expect(b')')?;
    let return_type = if parser.peek_is(b'V')? {
        parser.pos += 1;
        None
    } else {
        Some(parser.parse_type()?)
    };

    if parser.remaining() != 0 {
        return Err(ClassParseError::InvalidDescriptor(descriptor.to_string()));
    }

    Ok(MethodDescriptorTypes {
        parameters,
        return_type,
    })
}

struct DescriptorParser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> DescriptorParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    fn remaining(&self) -> usize {
        self.bytes().len().saturating_sub(self.pos)
    }

    fn malformed(&self) -> ClassParseError {
        ClassParseError::InvalidDescriptor(self.source.to_string())
    }

    fn expect(&mut self, expected: u8) -> Result<(), ClassParseError> {
        if self.bytes().get(self.pos) != Some(&expected) {
            return Err(self.malformed());
        }
        self.pos += 1;
        Ok(())
    }

    fn peek_is(&self, expected: u8) -> Result<bool, ClassParseError> {
        self.bytes()
            .get(self.pos)
            .map(|byte| *byte == expected)
            .ok_or_else(|| self.malformed())
    }

    fn parse_type(&mut self) -> Result<FieldType, ClassParseError> {
        let tag = *self.bytes().get(self.pos).ok_or_else(|| self.malformed())?;
        self.pos += 1;
        let base = match tag {
            b'B' => "byte",
            b'C' => "char",
            b'D' => "double",
            b'F' => "float",
            b'I' => "int",
            b'J' => "long",
            b'S' => "short",
            b'Z' => "boolean",
            b'L' => return self.parse_object_type(),
            b'[' => return Ok(FieldType::Array(Box::new(self.parse_type()?))),
            _ => return Err(self.malformed()),
        };
        Ok(FieldType::Base(base))
    }

    fn parse_object_type(&mut self) -> Result<FieldType, ClassParseError> {
        let start = self.pos;
        let end = self.source[start..]
            .find(';')
            .map(|offset| start + offset)
            .ok_or_else(|| self.malformed())?;
        if end == start {
            return Err(self.malformed());
        }
        self.pos = end + 1;
        Ok(FieldType::Object(self.source[start..end].to_string()))
    }
}
