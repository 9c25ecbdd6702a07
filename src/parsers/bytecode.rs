use super::classfile::ClassReader;
use super::ClassParseError;

const NEW: u8 = 0xbb;
const INVOKEVIRTUAL: u8 = 0xb6;
const INVOKESPECIAL: u8 = 0xb7;
const INVOKESTATIC: u8 = 0xb8;
const INVOKEINTERFACE: u8 = 0xb9;
const TABLESWITCH: u8 = 0xaa;
const LOOKUPSWITCH: u8 = 0xab;
const WIDE: u8 = 0xc4;
const IINC: u8 = 0x84;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvokeKind {
    Virtual,
    Special,
    Static,
    Interface,
}

impl InvokeKind {
    /// Whether the call target is chosen by the receiver's runtime type.
    pub fn is_dynamic_dispatch(self) -> bool {
        matches!(self, InvokeKind::Virtual | InvokeKind::Interface)
    }
}

/// An instruction of interest, carrying its constant pool operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Invoke { kind: InvokeKind, index: u16 },
    New { index: u16 },
}

/// Walks a method body and collects invocation and allocation instructions.
pub fn scan_code(code: &[u8]) -> Result<Vec<Instruction>, ClassParseError> {
    let mut reader = ClassReader::new(code);
    let mut found = Vec::new();

    while !reader.is_empty() {
        let offset = reader.position();
        let opcode = reader.read_u1()?;
        match opcode {
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC => {
                let kind = match opcode {
                    INVOKEVIRTUAL => InvokeKind::Virtual,
                    INVOKESPECIAL => InvokeKind::Special,
                    _ => InvokeKind::Static,
                };
                let index = reader.read_u2()?;
                found.push(Instruction::Invoke { kind, index });
            }
            INVOKEINTERFACE => {
                let index = reader.read_u2()?;
                reader.skip(2)?; // count, 0
                found.push(Instruction::Invoke {
                    kind: InvokeKind::Interface,
                    index,
                });
            }
            NEW => {
                let index = reader.read_u2()?;
                found.push(Instruction::New { index });
            }
            TABLESWITCH => {
                reader.skip(switch_padding(offset))?;
                reader.skip(4)?; // default
                let low = reader.read_u4()? as i32;
                let high = reader.read_u4()? as i32;
                let entries = i64::from(high) - i64::from(low) + 1;
                if entries < 0 {
                    return Err(ClassParseError::InvalidBytecode { offset, opcode });
                }
                reader.skip(entries as usize * 4)?;
            }
            LOOKUPSWITCH => {
                reader.skip(switch_padding(offset))?;
                reader.skip(4)?; // default
                let pairs = reader.read_u4()? as i32;
                if pairs < 0 {
                    return Err(ClassParseError::InvalidBytecode { offset, opcode });
                }
                reader.skip(pairs as usize * 8)?;
            }
            WIDE => {
                let widened = reader.read_u1()?;
                reader.skip(if widened == IINC { 4 } else { 2 })?;
            }
            _ => {
                let length = operand_length(opcode)
                    .ok_or(ClassParseError::InvalidBytecode { offset, opcode })?;
                reader.skip(length)?;
            }
        }
    }

    Ok(found)
}

// Switch operands start at the next 4-byte boundary after the opcode.
fn switch_padding(opcode_offset: usize) -> usize {
    (4 - (opcode_offset + 1) % 4) % 4
}

/// Operand byte count of fixed-length opcodes.
fn operand_length(opcode: u8) -> Option<usize> {
    let length = match opcode {
        0x00..=0x0f => 0,
        0x10 => 1,
        0x11 => 2,
        0x12 => 1,
        0x13 | 0x14 => 2,
        0x15..=0x19 => 1,
        0x1a..=0x35 => 0,
        0x36..=0x3a => 1,
        0x3b..=0x83 => 0,
        0x84 => 2,
        0x85..=0x98 => 0,
        0x99..=0xa8 => 2,
        0xa9 => 1,
        0xac..=0xb1 => 0,
        0xb2..=0xb5 => 2,
        0xba => 4,
        0xbc => 1,
        0xbd => 2,
        0xbe | 0xbf => 0,
        0xc0 | 0xc1 => 2,
        0xc2 | 0xc3 => 0,
        0xc5 => 3,
        0xc6 | 0xc7 => 2,
        0xc8 | 0xc9 => 4,
        0xca => 0,
        _ => return None,
    };
    Some(length)
}
