//! Property-based assembler invariants: relocation patch correctness,
//! idempotence, and the disassembly round trip.

use emu6502::disassembler::disassemble;
use emu6502::{assemble, AssemblyErrorKind};
use proptest::prelude::*;
use std::fmt::Write as _;

/// A small encodable instruction grammar for generated programs.
#[derive(Debug, Clone)]
enum GenInstr {
    Implied(&'static str),
    Immediate(&'static str, u8),
    ZeroPage(&'static str, u8),
    Absolute(&'static str, u16),
}

impl GenInstr {
    fn render(&self, out: &mut String) {
        match self {
            GenInstr::Implied(m) => writeln!(out, "    {m}").unwrap(),
            GenInstr::Immediate(m, v) => writeln!(out, "    {m} #${v:02X}").unwrap(),
            GenInstr::ZeroPage(m, v) => writeln!(out, "    {m} ${v:02X}").unwrap(),
            GenInstr::Absolute(m, v) => writeln!(out, "    {m} ${v:04X}").unwrap(),
        }
    }
}

fn instr_strategy() -> impl Strategy<Value = GenInstr> {
    prop_oneof![
        prop::sample::select(vec!["NOP", "CLC", "SEC", "INX", "INY", "DEX", "TAX", "TYA"])
            .prop_map(GenInstr::Implied),
        (
            prop::sample::select(vec!["LDA", "LDX", "LDY", "ADC", "AND", "ORA", "EOR", "CMP"]),
            any::<u8>()
        )
            .prop_map(|(m, v)| GenInstr::Immediate(m, v)),
        (
            prop::sample::select(vec!["LDA", "STA", "ASL", "INC", "DEC", "BIT"]),
            any::<u8>()
        )
            .prop_map(|(m, v)| GenInstr::ZeroPage(m, v)),
        (
            prop::sample::select(vec!["LDA", "STA", "CPX", "ORA"]),
            0x0100u16..=0xFFFF
        )
            .prop_map(|(m, v)| GenInstr::Absolute(m, v)),
    ]
}

fn program_source(instrs: &[GenInstr]) -> String {
    let mut source = String::from("    .org $0200\n");
    for instr in instrs {
        instr.render(&mut source);
    }
    source
}

proptest! {
    /// Assembling the same source twice yields byte-identical images and
    /// equal programs.
    #[test]
    fn assembly_is_idempotent(instrs in prop::collection::vec(instr_strategy(), 1..24)) {
        let source = program_source(&instrs);
        let first = assemble(&source).unwrap();
        let second = assemble(&source).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.image.dump_dense(), second.image.dump_dense());
    }

    /// Disassembling an assembled image and reassembling the listing
    /// reproduces the original bytes.
    #[test]
    fn disassembly_round_trips(instrs in prop::collection::vec(instr_strategy(), 1..24)) {
        let original = assemble(&program_source(&instrs)).unwrap();
        let (origin, _) = original.image.code_range().unwrap();
        let bytes = original.image.dump_dense();

        let listing = disassemble(&bytes, origin);
        let mut rebuilt_source = format!("    .org ${origin:04X}\n");
        for instruction in &listing {
            writeln!(rebuilt_source, "    {instruction}").unwrap();
        }
        let rebuilt = assemble(&rebuilt_source).unwrap();

        prop_assert_eq!(rebuilt.image.dump_dense(), bytes);
    }

    /// An absolute relocation's patch bytes are the little-endian target
    /// offset, wherever the target lands.
    #[test]
    fn absolute_relocations_encode_their_targets(target in 0x0300u16..0x8000) {
        let source = format!(
            "    .org $0200\n    JMP THERE\n    .org ${target:04X}\nTHERE:\n    BRK\n"
        );
        let program = assemble(&source).unwrap();

        prop_assert_eq!(program.image.get(0x0201), Some((target & 0xFF) as u8));
        prop_assert_eq!(program.image.get(0x0202), Some((target >> 8) as u8));
        prop_assert_eq!(program.symbol_offset("THERE"), Some(target));
    }

    /// Every in-range branch displacement encodes as its two's-complement
    /// byte; the relocation invariant holds for the whole range.
    #[test]
    fn relative_relocations_cover_the_signed_range(delta in -128i32..=127) {
        // Patch site at 0x0201; target = site + 1 + delta
        let target = (0x0202 + delta) as u16;
        // Targets inside the branch instruction itself would collide
        prop_assume!(!(0x0200u16..0x0202).contains(&target));

        let source = format!(
            "    .org $0200\n    BNE THERE\n    .org ${target:04X}\nTHERE:\n    NOP\n"
        );
        let program = assemble(&source).unwrap();

        prop_assert_eq!(program.image.get(0x0201), Some(delta as i8 as u8));
    }

    /// One past the range in either direction is a relocation error.
    #[test]
    fn out_of_range_branches_fail(delta in prop::sample::select(vec![-129i32, 128, 200, -200])) {
        let target = (0x0202 + delta) as u16;
        let source = format!(
            "    .org $0200\n    BNE THERE\n    .org ${target:04X}\nTHERE:\n    NOP\n"
        );
        let err = assemble(&source).unwrap_err();
        prop_assert!(matches!(err.kind, AssemblyErrorKind::Relocation(_)));
    }
}
