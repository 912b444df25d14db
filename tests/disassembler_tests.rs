//! Disassembler listings and the assemble/disassemble round trip.

use emu6502::disassembler::disassemble;
use emu6502::{assemble, Mnemonic};

#[test]
fn listing_addresses_follow_instruction_sizes() {
    // LDA #$01; STA $0300; JMP $0200
    let bytes = [0xA9, 0x01, 0x8D, 0x00, 0x03, 0x4C, 0x00, 0x02];
    let listing = disassemble(&bytes, 0x0200);

    assert_eq!(listing.len(), 3);
    assert_eq!(listing[0].address, 0x0200);
    assert_eq!(listing[1].address, 0x0202);
    assert_eq!(listing[2].address, 0x0205);
    assert_eq!(listing[2].entry.mnemonic, Mnemonic::Jmp);
}

#[test]
fn assembled_program_disassembles_to_equivalent_text() {
    let program = assemble(
        "
        .org $0200
    START:
        LDA #$05
        CLC
        ADC #$03
        STA $10
        BRK
    ",
    )
    .unwrap();

    let (origin, _) = program.image.code_range().unwrap();
    let listing = disassemble(&program.image.dump_dense(), origin);
    let text: Vec<String> = listing.iter().map(|i| i.to_string()).collect();

    assert_eq!(
        text,
        vec!["LDA #$05", "CLC", "ADC #$03", "STA $10", "BRK"]
    );
}

#[test]
fn disassembled_text_reassembles_to_identical_bytes() {
    let original = assemble(
        "
        .org $0200
        LDX #$0A
        DEX
        BNE $FD
        LDA $1234,Y
        ASL A
        JMP ($3000)
        BRK
    ",
    )
    .unwrap();

    let (origin, _) = original.image.code_range().unwrap();
    let bytes = original.image.dump_dense();
    let listing = disassemble(&bytes, origin);

    // Rebuild source from the listing and assemble again
    let mut source = format!(".org ${origin:04X}\n");
    for instruction in &listing {
        source.push_str(&instruction.to_string());
        source.push('\n');
    }
    let rebuilt = assemble(&source).unwrap();

    assert_eq!(rebuilt.image.dump_dense(), bytes);
    assert_eq!(rebuilt.image.code_range(), original.image.code_range());
}
