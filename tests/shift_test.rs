//! Shifts, rotates and the increment/decrement family, including the
//! read-modify-write cycle structure.

use emu6502::{Cpu, CycleClock, FlatMemory, Memory};

fn setup_cpu() -> Cpu<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write_bytes(0xFFFC, &[0x00, 0x80]);
    Cpu::new(memory, CycleClock::new())
}

fn step(cpu: &mut Cpu<FlatMemory>) {
    cpu.execute_next_instruction().unwrap();
}

#[test]
fn asl_accumulator_moves_bit_seven_into_carry() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x0A]); // ASL A
    cpu.set_a(0b1100_0001);

    step(&mut cpu);

    assert_eq!(cpu.a(), 0b1000_0010);
    assert!(cpu.flag_c());
    assert!(cpu.flag_n());
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn lsr_moves_bit_zero_into_carry_and_clears_negative() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x4A]); // LSR A
    cpu.set_a(0b0000_0011);
    cpu.set_flag_n(true);

    step(&mut cpu);

    assert_eq!(cpu.a(), 0b0000_0001);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

#[test]
fn rol_and_ror_rotate_through_carry() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x2A, 0x6A]); // ROL A; ROR A
    cpu.set_a(0b1000_0000);
    cpu.set_flag_c(true);

    step(&mut cpu); // ROL: carry in to bit 0, bit 7 out
    assert_eq!(cpu.a(), 0b0000_0001);
    assert!(cpu.flag_c());

    step(&mut cpu); // ROR: carry in to bit 7, bit 0 out
    assert_eq!(cpu.a(), 0b1000_0000);
    assert!(cpu.flag_c());
}

#[test]
fn asl_zero_page_is_five_cycles() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x06, 0x10]); // ASL $10
    cpu.memory_mut().store(0x0010, 0x40);

    step(&mut cpu);

    assert_eq!(cpu.memory().read_range(0x0010, 1), vec![0x80]);
    assert!(cpu.flag_n());
    assert_eq!(cpu.cycles(), 5);
}

#[test]
fn inc_absolute_x_always_pays_seven_cycles() {
    let mut cpu = setup_cpu();
    // No page crossing involved; read-modify-write still costs 7
    cpu.memory_mut().write_bytes(0x8000, &[0xFE, 0x00, 0x12]); // INC $1200,X
    cpu.set_x(0x05);
    cpu.memory_mut().store(0x1205, 0x7F);

    step(&mut cpu);

    assert_eq!(cpu.memory().read_range(0x1205, 1), vec![0x80]);
    assert!(cpu.flag_n());
    assert_eq!(cpu.cycles(), 7);
}

#[test]
fn dec_wraps_through_zero() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xC6, 0x10, 0xC6, 0x10]); // DEC $10 x2
    cpu.memory_mut().store(0x0010, 0x01);

    step(&mut cpu);
    assert_eq!(cpu.memory().read_range(0x0010, 1), vec![0x00]);
    assert!(cpu.flag_z());

    step(&mut cpu);
    assert_eq!(cpu.memory().read_range(0x0010, 1), vec![0xFF]);
    assert!(cpu.flag_n());
}

#[test]
fn register_inc_dec_set_nz() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xE8, 0xCA, 0xCA]); // INX; DEX; DEX
    cpu.set_x(0xFF);

    step(&mut cpu); // INX wraps to 0
    assert_eq!(cpu.x(), 0x00);
    assert!(cpu.flag_z());
    assert_eq!(cpu.cycles(), 2);

    step(&mut cpu); // DEX to 0xFF
    assert_eq!(cpu.x(), 0xFF);
    assert!(cpu.flag_n());

    step(&mut cpu); // DEX to 0xFE
    assert_eq!(cpu.x(), 0xFE);
}

#[test]
fn transfers_move_values_and_respect_txs_flag_exception() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xAA, 0x9A, 0xBA]); // TAX; TXS; TSX
    cpu.set_a(0x00);
    cpu.set_flag_z(false);

    step(&mut cpu); // TAX sets Z
    assert_eq!(cpu.x(), 0x00);
    assert!(cpu.flag_z());

    cpu.set_x(0x80);
    cpu.set_flag_n(false);
    step(&mut cpu); // TXS affects no flags
    assert_eq!(cpu.sp(), 0x80);
    assert!(!cpu.flag_n());

    step(&mut cpu); // TSX sets N from 0x80
    assert_eq!(cpu.x(), 0x80);
    assert!(cpu.flag_n());
}
