//! # Addressing Modes
//!
//! This module defines the 13 addressing modes of the 6502. The mode decides
//! how the operand bytes that follow an opcode are interpreted: as a value,
//! as an effective address, or as a branch offset.

/// 6502 addressing mode enumeration.
///
/// Shared vocabulary of the CPU and the assembler: the CPU uses the mode to
/// compute effective addresses during execution, the assembler uses it to
/// pick an encoding variant for a parsed operand.
///
/// # Operand Sizes
///
/// - **0 bytes**: Implied, Accumulator
/// - **1 byte**: Immediate, ZeroPage, ZeroPageX, ZeroPageY, Relative,
///   IndirectX, IndirectY
/// - **2 bytes**: Absolute, AbsoluteX, AbsoluteY, Indirect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressingMode {
    /// No operand, the operation is implied by the instruction.
    ///
    /// Examples: CLC, RTS, NOP
    Implied,

    /// Operates directly on the accumulator register.
    ///
    /// Examples: ASL A, LSR A, ROL A
    Accumulator,

    /// 8-bit constant embedded in the instruction.
    ///
    /// Example: LDA #$10
    Immediate,

    /// 8-bit address within the zero page (0x0000-0x00FF).
    ///
    /// Example: LDA $80
    ZeroPage,

    /// Zero-page address indexed by X; wraps within the zero page.
    ///
    /// Example: LDA $80,X
    ZeroPageX,

    /// Zero-page address indexed by Y; wraps within the zero page.
    ///
    /// Example: LDX $80,Y
    ZeroPageY,

    /// Signed 8-bit offset relative to the PC; branch instructions only.
    ///
    /// Example: BNE loop
    Relative,

    /// Full 16-bit little-endian address.
    ///
    /// Example: JMP $1234
    Absolute,

    /// 16-bit address indexed by X. Reads pay +1 cycle on page crossing.
    ///
    /// Example: LDA $1234,X
    AbsoluteX,

    /// 16-bit address indexed by Y. Reads pay +1 cycle on page crossing.
    ///
    /// Example: LDA $1234,Y
    AbsoluteY,

    /// Jump through a 16-bit pointer; JMP only.
    ///
    /// Reproduces the NMOS page-boundary bug: the pointer's high byte is
    /// fetched from the same page as the low byte.
    ///
    /// Example: JMP ($FFFC)
    Indirect,

    /// Indexed indirect: pointer at (operand + X) within the zero page.
    ///
    /// Example: LDA ($40,X)
    IndirectX,

    /// Indirect indexed: pointer at operand, then + Y. Reads pay +1 cycle
    /// on page crossing.
    ///
    /// Example: LDA ($40),Y
    IndirectY,
}

impl AddressingMode {
    /// Number of operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::Relative
            | Self::IndirectX
            | Self::IndirectY => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }

    /// True for the zero-page family of modes.
    pub const fn is_zero_page(self) -> bool {
        matches!(self, Self::ZeroPage | Self::ZeroPageX | Self::ZeroPageY)
    }

    /// The 16-bit counterpart of a zero-page mode, if one exists.
    ///
    /// Used by the assembler: a byte-sized operand that could encode as
    /// either `$xx` or `$00xx` prefers the zero-page form, so its absolute
    /// counterpart is dropped from the candidate set.
    pub const fn absolute_form(self) -> Option<AddressingMode> {
        match self {
            Self::ZeroPage => Some(Self::Absolute),
            Self::ZeroPageX => Some(Self::AbsoluteX),
            Self::ZeroPageY => Some(Self::AbsoluteY),
            _ => None,
        }
    }
}
