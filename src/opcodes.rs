//! # Opcode Table
//!
//! Single source of truth for 6502 instruction metadata, consumed by both
//! sides of the crate: the assembler picks encoding variants from it, the
//! CPU decodes fetched bytes through it, and the disassembler walks it in
//! reverse. Keeping one declarative list guarantees the two subsystems
//! agree bit-for-bit.
//!
//! Two derived views exist:
//!
//! - **Decoding**: a compile-time dense 256-slot index, opcode byte →
//!   table entry ([`decode`]).
//! - **Encoding**: a lazily-built map, mnemonic → documented variants
//!   ([`variants_of`]).
//!
//! The table lists the 151 documented opcodes plus the common undocumented
//! NOP variants (marked [`OpcodeEntry::undocumented`]); those decode and
//! execute but are never selected by the assembler. Every other byte value
//! is illegal and fatal to execution.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use strum::{Display, EnumString};

use crate::addressing::AddressingMode;

/// Instruction mnemonic.
///
/// `Display` renders the canonical uppercase form; `FromStr` accepts any
/// case, matching the assembler's case-insensitive source syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Mnemonic {
    Adc, And, Asl, Bcc, Bcs, Beq, Bit, Bmi, Bne, Bpl, Brk, Bvc, Bvs,
    Clc, Cld, Cli, Clv, Cmp, Cpx, Cpy, Dec, Dex, Dey, Eor, Inc, Inx,
    Iny, Jmp, Jsr, Lda, Ldx, Ldy, Lsr, Nop, Ora, Pha, Php, Pla, Plp,
    Rol, Ror, Rti, Rts, Sbc, Sec, Sed, Sei, Sta, Stx, Sty, Tax, Tay,
    Tsx, Txa, Txs, Tya,
}

/// Static metadata for one `(mnemonic, addressing mode)` encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeEntry {
    /// Instruction mnemonic.
    pub mnemonic: Mnemonic,

    /// How the operand bytes are interpreted.
    pub mode: AddressingMode,

    /// The encoded opcode byte.
    pub opcode: u8,

    /// Cycle cost before any penalty. Branch entries store the not-taken
    /// cost; taken and page-crossing penalties are charged by the CPU.
    pub base_cycles: u8,

    /// Whether an indexed read crossing a page boundary costs one extra
    /// cycle. Always false for writes and read-modify-write entries, which
    /// pay their worst-case cost unconditionally.
    pub page_penalty: bool,

    /// True for undocumented opcodes (the NOP variants). Decoded and
    /// executed, but never chosen when encoding source text.
    pub undocumented: bool,
}

impl OpcodeEntry {
    /// Number of operand bytes following the opcode byte (0, 1 or 2).
    pub const fn operand_bytes(&self) -> u8 {
        self.mode.operand_bytes()
    }

    /// Total instruction size in bytes, opcode included.
    pub const fn size_bytes(&self) -> u8 {
        1 + self.mode.operand_bytes()
    }
}

const fn op(mnemonic: Mnemonic, mode: AddressingMode, opcode: u8, base_cycles: u8) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        mode,
        opcode,
        base_cycles,
        page_penalty: false,
        undocumented: false,
    }
}

/// Variant of [`op`] for indexed reads that pay the page-crossing cycle.
const fn op_p(mnemonic: Mnemonic, mode: AddressingMode, opcode: u8, base_cycles: u8) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic,
        mode,
        opcode,
        base_cycles,
        page_penalty: true,
        undocumented: false,
    }
}

/// Undocumented NOP variant.
const fn xnop(mode: AddressingMode, opcode: u8, base_cycles: u8, page_penalty: bool) -> OpcodeEntry {
    OpcodeEntry {
        mnemonic: Mnemonic::Nop,
        mode,
        opcode,
        base_cycles,
        page_penalty,
        undocumented: true,
    }
}

use AddressingMode::*;
use Mnemonic::*;

/// Every valid `(mnemonic, addressing mode)` pair, grouped by mnemonic.
pub static OPCODES: [OpcodeEntry; 178] = OPCODE_LIST;

const OPCODE_LIST: [OpcodeEntry; 178] = [
    op(Adc, Immediate, 0x69, 2),
    op(Adc, ZeroPage, 0x65, 3),
    op(Adc, ZeroPageX, 0x75, 4),
    op(Adc, Absolute, 0x6D, 4),
    op_p(Adc, AbsoluteX, 0x7D, 4),
    op_p(Adc, AbsoluteY, 0x79, 4),
    op(Adc, IndirectX, 0x61, 6),
    op_p(Adc, IndirectY, 0x71, 5),
    op(And, Immediate, 0x29, 2),
    op(And, ZeroPage, 0x25, 3),
    op(And, ZeroPageX, 0x35, 4),
    op(And, Absolute, 0x2D, 4),
    op_p(And, AbsoluteX, 0x3D, 4),
    op_p(And, AbsoluteY, 0x39, 4),
    op(And, IndirectX, 0x21, 6),
    op_p(And, IndirectY, 0x31, 5),
    op(Asl, Accumulator, 0x0A, 2),
    op(Asl, ZeroPage, 0x06, 5),
    op(Asl, ZeroPageX, 0x16, 6),
    op(Asl, Absolute, 0x0E, 6),
    op(Asl, AbsoluteX, 0x1E, 7),
    op(Bcc, Relative, 0x90, 2),
    op(Bcs, Relative, 0xB0, 2),
    op(Beq, Relative, 0xF0, 2),
    op(Bit, ZeroPage, 0x24, 3),
    op(Bit, Absolute, 0x2C, 4),
    op(Bmi, Relative, 0x30, 2),
    op(Bne, Relative, 0xD0, 2),
    op(Bpl, Relative, 0x10, 2),
    op(Brk, Implied, 0x00, 7),
    op(Bvc, Relative, 0x50, 2),
    op(Bvs, Relative, 0x70, 2),
    op(Clc, Implied, 0x18, 2),
    op(Cld, Implied, 0xD8, 2),
    op(Cli, Implied, 0x58, 2),
    op(Clv, Implied, 0xB8, 2),
    op(Cmp, Immediate, 0xC9, 2),
    op(Cmp, ZeroPage, 0xC5, 3),
    op(Cmp, ZeroPageX, 0xD5, 4),
    op(Cmp, Absolute, 0xCD, 4),
    op_p(Cmp, AbsoluteX, 0xDD, 4),
    op_p(Cmp, AbsoluteY, 0xD9, 4),
    op(Cmp, IndirectX, 0xC1, 6),
    op_p(Cmp, IndirectY, 0xD1, 5),
    op(Cpx, Immediate, 0xE0, 2),
    op(Cpx, ZeroPage, 0xE4, 3),
    op(Cpx, Absolute, 0xEC, 4),
    op(Cpy, Immediate, 0xC0, 2),
    op(Cpy, ZeroPage, 0xC4, 3),
    op(Cpy, Absolute, 0xCC, 4),
    op(Dec, ZeroPage, 0xC6, 5),
    op(Dec, ZeroPageX, 0xD6, 6),
    op(Dec, Absolute, 0xCE, 6),
    op(Dec, AbsoluteX, 0xDE, 7),
    op(Dex, Implied, 0xCA, 2),
    op(Dey, Implied, 0x88, 2),
    op(Eor, Immediate, 0x49, 2),
    op(Eor, ZeroPage, 0x45, 3),
    op(Eor, ZeroPageX, 0x55, 4),
    op(Eor, Absolute, 0x4D, 4),
    op_p(Eor, AbsoluteX, 0x5D, 4),
    op_p(Eor, AbsoluteY, 0x59, 4),
    op(Eor, IndirectX, 0x41, 6),
    op_p(Eor, IndirectY, 0x51, 5),
    op(Inc, ZeroPage, 0xE6, 5),
    op(Inc, ZeroPageX, 0xF6, 6),
    op(Inc, Absolute, 0xEE, 6),
    op(Inc, AbsoluteX, 0xFE, 7),
    op(Inx, Implied, 0xE8, 2),
    op(Iny, Implied, 0xC8, 2),
    op(Jmp, Absolute, 0x4C, 3),
    op(Jmp, Indirect, 0x6C, 5),
    op(Jsr, Absolute, 0x20, 6),
    op(Lda, Immediate, 0xA9, 2),
    op(Lda, ZeroPage, 0xA5, 3),
    op(Lda, ZeroPageX, 0xB5, 4),
    op(Lda, Absolute, 0xAD, 4),
    op_p(Lda, AbsoluteX, 0xBD, 4),
    op_p(Lda, AbsoluteY, 0xB9, 4),
    op(Lda, IndirectX, 0xA1, 6),
    op_p(Lda, IndirectY, 0xB1, 5),
    op(Ldx, Immediate, 0xA2, 2),
    op(Ldx, ZeroPage, 0xA6, 3),
    op(Ldx, ZeroPageY, 0xB6, 4),
    op(Ldx, Absolute, 0xAE, 4),
    op_p(Ldx, AbsoluteY, 0xBE, 4),
    op(Ldy, Immediate, 0xA0, 2),
    op(Ldy, ZeroPage, 0xA4, 3),
    op(Ldy, ZeroPageX, 0xB4, 4),
    op(Ldy, Absolute, 0xAC, 4),
    op_p(Ldy, AbsoluteX, 0xBC, 4),
    op(Lsr, Accumulator, 0x4A, 2),
    op(Lsr, ZeroPage, 0x46, 5),
    op(Lsr, ZeroPageX, 0x56, 6),
    op(Lsr, Absolute, 0x4E, 6),
    op(Lsr, AbsoluteX, 0x5E, 7),
    op(Nop, Implied, 0xEA, 2),
    op(Ora, Immediate, 0x09, 2),
    op(Ora, ZeroPage, 0x05, 3),
    op(Ora, ZeroPageX, 0x15, 4),
    op(Ora, Absolute, 0x0D, 4),
    op_p(Ora, AbsoluteX, 0x1D, 4),
    op_p(Ora, AbsoluteY, 0x19, 4),
    op(Ora, IndirectX, 0x01, 6),
    op_p(Ora, IndirectY, 0x11, 5),
    op(Pha, Implied, 0x48, 3),
    op(Php, Implied, 0x08, 3),
    op(Pla, Implied, 0x68, 4),
    op(Plp, Implied, 0x28, 4),
    op(Rol, Accumulator, 0x2A, 2),
    op(Rol, ZeroPage, 0x26, 5),
    op(Rol, ZeroPageX, 0x36, 6),
    op(Rol, Absolute, 0x2E, 6),
    op(Rol, AbsoluteX, 0x3E, 7),
    op(Ror, Accumulator, 0x6A, 2),
    op(Ror, ZeroPage, 0x66, 5),
    op(Ror, ZeroPageX, 0x76, 6),
    op(Ror, Absolute, 0x6E, 6),
    op(Ror, AbsoluteX, 0x7E, 7),
    op(Rti, Implied, 0x40, 6),
    op(Rts, Implied, 0x60, 6),
    op(Sbc, Immediate, 0xE9, 2),
    op(Sbc, ZeroPage, 0xE5, 3),
    op(Sbc, ZeroPageX, 0xF5, 4),
    op(Sbc, Absolute, 0xED, 4),
    op_p(Sbc, AbsoluteX, 0xFD, 4),
    op_p(Sbc, AbsoluteY, 0xF9, 4),
    op(Sbc, IndirectX, 0xE1, 6),
    op_p(Sbc, IndirectY, 0xF1, 5),
    op(Sec, Implied, 0x38, 2),
    op(Sed, Implied, 0xF8, 2),
    op(Sei, Implied, 0x78, 2),
    op(Sta, ZeroPage, 0x85, 3),
    op(Sta, ZeroPageX, 0x95, 4),
    op(Sta, Absolute, 0x8D, 4),
    op(Sta, AbsoluteX, 0x9D, 5),
    op(Sta, AbsoluteY, 0x99, 5),
    op(Sta, IndirectX, 0x81, 6),
    op(Sta, IndirectY, 0x91, 6),
    op(Stx, ZeroPage, 0x86, 3),
    op(Stx, ZeroPageY, 0x96, 4),
    op(Stx, Absolute, 0x8E, 4),
    op(Sty, ZeroPage, 0x84, 3),
    op(Sty, ZeroPageX, 0x94, 4),
    op(Sty, Absolute, 0x8C, 4),
    op(Tax, Implied, 0xAA, 2),
    op(Tay, Implied, 0xA8, 2),
    op(Tsx, Implied, 0xBA, 2),
    op(Txa, Implied, 0x8A, 2),
    op(Txs, Implied, 0x9A, 2),
    op(Tya, Implied, 0x98, 2),
    // Undocumented NOP variants. They perform the operand access of their
    // addressing mode and discard the value.
    xnop(Implied, 0x1A, 2, false),
    xnop(Implied, 0x3A, 2, false),
    xnop(Implied, 0x5A, 2, false),
    xnop(Implied, 0x7A, 2, false),
    xnop(Implied, 0xDA, 2, false),
    xnop(Implied, 0xFA, 2, false),
    xnop(Immediate, 0x80, 2, false),
    xnop(Immediate, 0x82, 2, false),
    xnop(Immediate, 0x89, 2, false),
    xnop(Immediate, 0xC2, 2, false),
    xnop(Immediate, 0xE2, 2, false),
    xnop(ZeroPage, 0x04, 3, false),
    xnop(ZeroPage, 0x44, 3, false),
    xnop(ZeroPage, 0x64, 3, false),
    xnop(ZeroPageX, 0x14, 4, false),
    xnop(ZeroPageX, 0x34, 4, false),
    xnop(ZeroPageX, 0x54, 4, false),
    xnop(ZeroPageX, 0x74, 4, false),
    xnop(ZeroPageX, 0xD4, 4, false),
    xnop(ZeroPageX, 0xF4, 4, false),
    xnop(Absolute, 0x0C, 4, false),
    xnop(AbsoluteX, 0x1C, 4, true),
    xnop(AbsoluteX, 0x3C, 4, true),
    xnop(AbsoluteX, 0x5C, 4, true),
    xnop(AbsoluteX, 0x7C, 4, true),
    xnop(AbsoluteX, 0xDC, 4, true),
    xnop(AbsoluteX, 0xFC, 4, true),
];

/// Dense decode index, opcode byte → position in [`OPCODES`]. Built at
/// compile time from the same list, so it cannot drift out of sync.
const DECODE_INDEX: [Option<u8>; 256] = build_decode_index(&OPCODE_LIST);

const fn build_decode_index(list: &[OpcodeEntry; 178]) -> [Option<u8>; 256] {
    let mut table = [None; 256];
    let mut i = 0;
    while i < list.len() {
        table[list[i].opcode as usize] = Some(i as u8);
        i += 1;
    }
    table
}

/// Looks up the table entry for an opcode byte.
///
/// Returns `None` for illegal bytes, which the CPU treats as fatal.
///
/// # Examples
///
/// ```
/// use emu6502::opcodes::{decode, Mnemonic};
/// use emu6502::AddressingMode;
///
/// let lda = decode(0xA9).unwrap();
/// assert_eq!(lda.mnemonic, Mnemonic::Lda);
/// assert_eq!(lda.mode, AddressingMode::Immediate);
/// assert_eq!(lda.base_cycles, 2);
///
/// assert!(decode(0x02).is_none());
/// ```
pub fn decode(opcode: u8) -> Option<&'static OpcodeEntry> {
    DECODE_INDEX[opcode as usize].map(|i| &OPCODES[i as usize])
}

static ENCODE_TABLE: Lazy<HashMap<Mnemonic, Vec<&'static OpcodeEntry>>> = Lazy::new(|| {
    let mut map: HashMap<Mnemonic, Vec<&'static OpcodeEntry>> = HashMap::new();
    for entry in OPCODES.iter().filter(|e| !e.undocumented) {
        map.entry(entry.mnemonic).or_default().push(entry);
    }
    map
});

/// The documented encoding variants of a mnemonic, for the assembler.
pub fn variants_of(mnemonic: Mnemonic) -> &'static [&'static OpcodeEntry] {
    ENCODE_TABLE
        .get(&mnemonic)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// The documented encoding of `(mnemonic, mode)`, if the pair is valid.
pub fn encoding_of(mnemonic: Mnemonic, mode: AddressingMode) -> Option<&'static OpcodeEntry> {
    variants_of(mnemonic)
        .iter()
        .copied()
        .find(|e| e.mode == mode)
}
