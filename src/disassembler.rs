//! # Disassembler
//!
//! Decodes machine code back into instruction listings through the same
//! opcode table the assembler encodes with. Typical input is a program
//! image's dense dump over its code range.
//!
//! Relative operands are rendered as their raw offset byte rather than a
//! resolved target address, so a disassembled listing re-assembles to the
//! identical bytes.

use std::fmt;

use crate::addressing::AddressingMode;
use crate::opcodes::{decode, OpcodeEntry};

/// One decoded instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Address of the opcode byte.
    pub address: u16,

    /// Table entry for the opcode.
    pub entry: &'static OpcodeEntry,

    /// Operand bytes, little-endian, zero to two of them.
    pub operand: Vec<u8>,
}

impl Instruction {
    /// Operand interpreted as a little-endian value.
    fn operand_value(&self) -> u16 {
        match self.operand.as_slice() {
            [lo] => u16::from(*lo),
            [lo, hi] => u16::from(*lo) | (u16::from(*hi) << 8),
            _ => 0,
        }
    }

    /// Total encoded size in bytes.
    pub fn size_bytes(&self) -> u8 {
        self.entry.size_bytes()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mnemonic = self.entry.mnemonic;
        let value = self.operand_value();
        match self.entry.mode {
            AddressingMode::Implied => write!(f, "{mnemonic}"),
            AddressingMode::Accumulator => write!(f, "{mnemonic} A"),
            AddressingMode::Immediate => write!(f, "{mnemonic} #${value:02X}"),
            AddressingMode::ZeroPage | AddressingMode::Relative => {
                write!(f, "{mnemonic} ${value:02X}")
            }
            AddressingMode::ZeroPageX => write!(f, "{mnemonic} ${value:02X},X"),
            AddressingMode::ZeroPageY => write!(f, "{mnemonic} ${value:02X},Y"),
            AddressingMode::Absolute => write!(f, "{mnemonic} ${value:04X}"),
            AddressingMode::AbsoluteX => write!(f, "{mnemonic} ${value:04X},X"),
            AddressingMode::AbsoluteY => write!(f, "{mnemonic} ${value:04X},Y"),
            AddressingMode::Indirect => write!(f, "{mnemonic} (${value:04X})"),
            AddressingMode::IndirectX => write!(f, "{mnemonic} (${value:02X},X)"),
            AddressingMode::IndirectY => write!(f, "{mnemonic} (${value:02X}),Y"),
        }
    }
}

/// Decodes one instruction from the front of `bytes`.
///
/// Returns `None` for an illegal opcode byte or a truncated instruction.
pub fn decode_instruction(bytes: &[u8], address: u16) -> Option<Instruction> {
    let opcode = *bytes.first()?;
    let entry = decode(opcode)?;
    let size = entry.size_bytes() as usize;
    if bytes.len() < size {
        return None;
    }
    Some(Instruction {
        address,
        entry,
        operand: bytes[1..size].to_vec(),
    })
}

/// Decodes instructions from `bytes` until the end of input, an illegal
/// byte, or a truncated trailing instruction.
///
/// # Examples
///
/// ```
/// use emu6502::disassembler::disassemble;
///
/// // LDA #$05; STA $10; BRK
/// let listing = disassemble(&[0xA9, 0x05, 0x85, 0x10, 0x00], 0x0200);
/// let text: Vec<String> = listing.iter().map(|i| i.to_string()).collect();
/// assert_eq!(text, vec!["LDA #$05", "STA $10", "BRK"]);
/// ```
pub fn disassemble(bytes: &[u8], origin: u16) -> Vec<Instruction> {
    let mut listing = Vec::new();
    let mut offset = 0usize;
    while offset < bytes.len() {
        let address = origin.wrapping_add(offset as u16);
        let Some(instruction) = decode_instruction(&bytes[offset..], address) else {
            break;
        };
        offset += instruction.size_bytes() as usize;
        listing.push(instruction);
    }
    listing
}
