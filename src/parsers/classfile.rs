use super::ClassParseError;

const MAGIC: u32 = 0xCAFE_BABE;

/// A parsed compiled type. Attribute payloads borrow from the input bytes.
#[derive(Debug, Clone)]
pub struct ClassFile<'a> {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    /// Internal (slash separated) name of this type.
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<MemberInfo<'a>>,
    pub methods: Vec<MemberInfo<'a>>,
    pub attributes: Vec<AttributeInfo<'a>>,
}

#[derive(Debug, Clone)]
pub struct MemberInfo<'a> {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<AttributeInfo<'a>>,
}

#[derive(Debug, Clone)]
pub struct AttributeInfo<'a> {
    pub name: String,
    pub data: &'a [u8],
}

/// Symbolic reference to a field or method of another type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

pub fn parse_class(bytes: &[u8]) -> Result<ClassFile<'_>, ClassParseError> {
    let mut reader = ClassReader::new(bytes);
    reader.expect_magic()?;
    let minor_version = reader.read_u2()?;
    let major_version = reader.read_u2()?;
    let constant_pool = ConstantPool::parse(&mut reader)?;

    let access_flags = reader.read_u2()?;
    let this_index = reader.read_u2()?;
    let super_index = reader.read_u2()?;

    let this_class = constant_pool.class_name(this_index)?.to_string();
    let super_class = if super_index == 0 {
        None
    } else {
        Some(constant_pool.class_name(super_index)?.to_string())
    };

    let interfaces_count = reader.read_u2()?;
    let mut interfaces = Vec::with_capacity(interfaces_count as usize);
    for _ in 0..interfaces_count {
        let index = reader.read_u2()?;
        interfaces.push(constant_pool.class_name(index)?.to_string());
    }

    let fields = read_members(&mut reader, &constant_pool)?;
    let methods = read_members(&mut reader, &constant_pool)?;
    let attributes = read_attributes(&mut reader, &constant_pool)?;

    Ok(ClassFile {
        minor_version,
        major_version,
        constant_pool,
        access_flags,
        this_class,
        super_class,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

impl<'a> ClassFile<'a> {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo<'a>> {
        find_attribute(&self.attributes, name)
    }

    /// Access flags recorded for this type in its own InnerClasses table.
    pub fn inner_access_flags(&self) -> Result<Option<u16>, ClassParseError> {
        let Some(attribute) = self.attribute("InnerClasses") else {
            return Ok(None);
        };

        let mut reader = ClassReader::new(attribute.data);
        let count = reader.read_u2()?;
        for _ in 0..count {
            let inner_index = reader.read_u2()?;
            reader.read_u2()?; // outer_class_info_index
            reader.read_u2()?; // inner_name_index
            let flags = reader.read_u2()?;
            if inner_index != 0 && self.constant_pool.class_name(inner_index)? == self.this_class {
                return Ok(Some(flags));
            }
        }
        Ok(None)
    }

    /// Type descriptors of every visible and invisible annotation on this type.
    pub fn annotation_types(&self) -> Result<Vec<String>, ClassParseError> {
        let mut types = Vec::new();
        for name in ["RuntimeVisibleAnnotations", "RuntimeInvisibleAnnotations"] {
            if let Some(attribute) = self.attribute(name) {
                let mut reader = ClassReader::new(attribute.data);
                let count = reader.read_u2()?;
                for _ in 0..count {
                    let type_index = reader.read_u2()?;
                    types.push(self.constant_pool.utf8(type_index)?.to_string());
                    skip_annotation_pairs(&mut reader)?;
                }
            }
        }
        Ok(types)
    }
}

impl<'a> MemberInfo<'a> {
    pub fn attribute(&self, name: &str) -> Option<&AttributeInfo<'a>> {
        find_attribute(&self.attributes, name)
    }

    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }

    pub fn is_static_initializer(&self) -> bool {
        self.name == "<clinit>"
    }

    /// Internal names listed in the Exceptions attribute.
    pub fn exceptions(&self, pool: &ConstantPool) -> Result<Vec<String>, ClassParseError> {
        let Some(attribute) = self.attribute("Exceptions") else {
            return Ok(Vec::new());
        };
        let mut reader = ClassReader::new(attribute.data);
        let count = reader.read_u2()?;
        let mut exceptions = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let index = reader.read_u2()?;
            exceptions.push(pool.class_name(index)?.to_string());
        }
        Ok(exceptions)
    }

    /// Bytecode of the Code attribute, if the method has a body.
    pub fn code(&self) -> Result<Option<&'a [u8]>, ClassParseError> {
        let Some(attribute) = self.attribute("Code") else {
            return Ok(None);
        };
        let mut reader = ClassReader::new(attribute.data);
        reader.read_u2()?; // max_stack
        reader.read_u2()?; // max_locals
        let length = reader.read_u4()? as usize;
        Ok(Some(reader.read_slice(length)?))
    }
}

fn find_attribute<'s, 'a>(
    attributes: &'s [AttributeInfo<'a>],
    name: &str,
) -> Option<&'s AttributeInfo<'a>> {
    attributes.iter().find(|attribute| attribute.name == name)
}

#[derive(Debug, Clone)]
enum Constant {
    Utf8(String),
    Class {
        name_index: u16,
    },
    MemberRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
    Other,
    Unusable,
}

#[derive(Debug, Clone)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    fn parse(reader: &mut ClassReader<'_>) -> Result<Self, ClassParseError> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Constant::Unusable); // index 0 unused

        let mut index = 1;
        while index < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                1 => {
                    let length = reader.read_u2()? as usize;
                    let bytes = reader.read_slice(length)?;
                    Constant::Utf8(decode_utf8(bytes))
                }
                3 | 4 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                5 | 6 => {
                    reader.skip(8)?;
                    entries.push(Constant::Other);
                    index += 1;
                    Constant::Unusable
                }
                7 => Constant::Class {
                    name_index: reader.read_u2()?,
                },
                8 | 16 | 19 | 20 => {
                    reader.read_u2()?;
                    Constant::Other
                }
                9 | 10 | 11 => Constant::MemberRef {
                    class_index: reader.read_u2()?,
                    name_and_type_index: reader.read_u2()?,
                },
                12 => Constant::NameAndType {
                    name_index: reader.read_u2()?,
                    descriptor_index: reader.read_u2()?,
                },
                15 => {
                    reader.skip(3)?;
                    Constant::Other
                }
                17 | 18 => {
                    reader.skip(4)?;
                    Constant::Other
                }
                other => return Err(ClassParseError::UnsupportedConstant { tag: other }),
            };

            entries.push(entry);
            index += 1;
        }

        Ok(Self { entries })
    }

    fn get(&self, index: u16) -> Result<&Constant, ClassParseError> {
        self.entries
            .get(index as usize)
            .ok_or(ClassParseError::InvalidConstantIndex { index })
    }

    pub fn utf8(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value.as_str()),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    pub fn class_name(&self, index: u16) -> Result<&str, ClassParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }

    pub fn member_ref(&self, index: u16) -> Result<MemberRef, ClassParseError> {
        match self.get(index)? {
            Constant::MemberRef {
                class_index,
                name_and_type_index,
            } => {
                let owner = self.class_name(*class_index)?.to_string();
                match self.get(*name_and_type_index)? {
                    Constant::NameAndType {
                        name_index,
                        descriptor_index,
                    } => Ok(MemberRef {
                        owner,
                        name: self.utf8(*name_index)?.to_string(),
                        descriptor: self.utf8(*descriptor_index)?.to_string(),
                    }),
                    _ => Err(ClassParseError::InvalidConstantIndex {
                        index: *name_and_type_index,
                    }),
                }
            }
            _ => Err(ClassParseError::InvalidConstantIndex { index }),
        }
    }
}

// Constant pool strings are "modified UTF-8"; anything std cannot decode is
// kept lossily rather than rejecting the whole type.
fn decode_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(value) => value.to_string(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

fn read_members<'a>(
    reader: &mut ClassReader<'a>,
    pool: &ConstantPool,
) -> Result<Vec<MemberInfo<'a>>, ClassParseError> {
    let count = reader.read_u2()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access_flags = reader.read_u2()?;
        let name_index = reader.read_u2()?;
        let descriptor_index = reader.read_u2()?;
        let attributes = read_attributes(reader, pool)?;
        members.push(MemberInfo {
            access_flags,
            name: pool.utf8(name_index)?.to_string(),
            descriptor: pool.utf8(descriptor_index)?.to_string(),
            attributes,
        });
    }
    Ok(members)
}

fn read_attributes<'a>(
    reader: &mut ClassReader<'a>,
    pool: &ConstantPool,
) -> Result<Vec<AttributeInfo<'a>>, ClassParseError> {
    let count = reader.read_u2()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = reader.read_u2()?;
        let length = reader.read_u4()? as usize;
        let data = reader.read_slice(length)?;
        attributes.push(AttributeInfo {
            name: pool.utf8(name_index)?.to_string(),
            data,
        });
    }
    Ok(attributes)
}

fn skip_annotation_pairs(reader: &mut ClassReader<'_>) -> Result<(), ClassParseError> {
    let pairs = reader.read_u2()?;
    for _ in 0..pairs {
        reader.read_u2()?; // element_name_index
        skip_element_value(reader)?;
    }
    Ok(())
}

fn skip_element_value(reader: &mut ClassReader<'_>) -> Result<(), ClassParseError> {
    let tag = reader.read_u1()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            reader.read_u2()?;
        }
        b'e' => {
            reader.read_u2()?; // type_name_index
            reader.read_u2()?; // const_name_index
        }
        b'@' => {
            reader.read_u2()?; // type_index
            skip_annotation_pairs(reader)?;
        }
        b'[' => {
            let values = reader.read_u2()?;
            for _ in 0..values {
                skip_element_value(reader)?;
            }
        }
        other => {
            return Err(ClassParseError::InvalidDescriptor(format!(
                "unknown annotation element tag '{}'",
                other as char
            )))
        }
    }
    Ok(())
}

pub(crate) struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn expect_magic(&mut self) -> Result<(), ClassParseError> {
        if self.read_u4()? != MAGIC {
            return Err(ClassParseError::InvalidMagic);
        }
        Ok(())
    }

    pub(crate) fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        let value = *self
            .data
            .get(self.pos)
            .ok_or(ClassParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(value)
    }

    pub(crate) fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        let bytes = self.read_slice(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub(crate) fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        let bytes = self.read_slice(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or(ClassParseError::UnexpectedEof)?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }
}
