//! Arithmetic and logic: ADC/SBC flag matrices (binary and BCD), the
//! compare family, BIT and the bitwise operations.

use emu6502::{Cpu, CycleClock, FlatMemory, Memory};

fn setup_cpu() -> Cpu<FlatMemory> {
    let mut memory = FlatMemory::new();
    memory.write_bytes(0xFFFC, &[0x00, 0x80]);
    Cpu::new(memory, CycleClock::new())
}

fn step(cpu: &mut Cpu<FlatMemory>) {
    cpu.execute_next_instruction().unwrap();
}

/// Runs `ADC #operand` once with the given accumulator and carry.
fn adc_immediate(a: u8, operand: u8, carry: bool) -> Cpu<FlatMemory> {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x69, operand]);
    cpu.set_a(a);
    cpu.set_flag_c(carry);
    step(&mut cpu);
    cpu
}

#[test]
fn adc_basic_addition() {
    let cpu = adc_immediate(0x10, 0x05, false);
    assert_eq!(cpu.a(), 0x15);
    assert!(!cpu.flag_c() && !cpu.flag_z() && !cpu.flag_v() && !cpu.flag_n());
    assert_eq!(cpu.cycles(), 2);
}

#[test]
fn adc_includes_carry_in() {
    let cpu = adc_immediate(0x10, 0x05, true);
    assert_eq!(cpu.a(), 0x16);
}

#[test]
fn adc_sets_carry_and_zero_on_wraparound() {
    let cpu = adc_immediate(0x01, 0xFF, false);
    assert_eq!(cpu.a(), 0x00);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
    assert!(!cpu.flag_v()); // 1 + (-1) does not overflow signed
}

#[test]
fn adc_signed_overflow_positive_operands() {
    // 0x50 + 0x50 = 0xA0: two positives yielding a negative
    let cpu = adc_immediate(0x50, 0x50, false);
    assert_eq!(cpu.a(), 0xA0);
    assert!(cpu.flag_v());
    assert!(cpu.flag_n());
    assert!(!cpu.flag_c());
}

#[test]
fn adc_signed_overflow_negative_operands() {
    // 0x90 + 0x90 = 0x120: two negatives yielding a positive
    let cpu = adc_immediate(0x90, 0x90, false);
    assert_eq!(cpu.a(), 0x20);
    assert!(cpu.flag_v());
    assert!(cpu.flag_c());
    assert!(!cpu.flag_n());
}

#[test]
fn sbc_with_borrow_semantics() {
    // SEC first: carry set means no borrow
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xE9, 0x05]); // SBC #$05
    cpu.set_a(0x10);
    cpu.set_flag_c(true);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x0B);
    assert!(cpu.flag_c()); // no borrow out

    // Carry clear borrows one more
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xE9, 0x05]);
    cpu.set_a(0x10);
    cpu.set_flag_c(false);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x0A);
}

#[test]
fn sbc_underflow_clears_carry() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xE9, 0x01]); // SBC #$01
    cpu.set_a(0x00);
    cpu.set_flag_c(true);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0xFF);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n());
}

// ========== BCD mode ==========

#[test]
fn adc_decimal_mode_adds_packed_bcd() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x69, 0x05, 0x69, 0x99]);
    cpu.set_flag_d(true);
    cpu.set_a(0x05);
    cpu.set_flag_c(false);

    step(&mut cpu); // 05 + 05 = 10 (BCD)
    assert_eq!(cpu.a(), 0x10);
    assert!(!cpu.flag_c());

    step(&mut cpu); // 10 + 99 = 09 carry 1 (BCD)
    assert_eq!(cpu.a(), 0x09);
    assert!(cpu.flag_c());
}

#[test]
fn sbc_decimal_mode_subtracts_packed_bcd() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xE9, 0x05]); // SBC #$05
    cpu.set_flag_d(true);
    cpu.set_a(0x10);
    cpu.set_flag_c(true);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x05);
    assert!(cpu.flag_c());
}

#[test]
fn decimal_flag_is_ignored_when_bcd_is_disabled() {
    let mut cpu = setup_cpu();
    cpu.set_decimal_enabled(false);
    cpu.memory_mut().write_bytes(0x8000, &[0x69, 0x05]);
    cpu.set_flag_d(true);
    cpu.set_a(0x05);
    cpu.set_flag_c(false);
    step(&mut cpu);
    assert_eq!(cpu.a(), 0x0A); // plain binary
}

// ========== Compares ==========

#[test]
fn cmp_sets_carry_when_a_is_not_below_operand() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xC9, 0x30]); // CMP #$30
    cpu.set_a(0x40);
    step(&mut cpu);
    assert!(cpu.flag_c());
    assert!(!cpu.flag_z());
    assert!(!cpu.flag_n());
    // A is untouched
    assert_eq!(cpu.a(), 0x40);
}

#[test]
fn cmp_equal_sets_zero_and_carry() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xC9, 0x40]);
    cpu.set_a(0x40);
    step(&mut cpu);
    assert!(cpu.flag_c());
    assert!(cpu.flag_z());
}

#[test]
fn cmp_below_clears_carry_and_sets_negative_from_difference() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xC9, 0x50]);
    cpu.set_a(0x40);
    step(&mut cpu);
    assert!(!cpu.flag_c());
    assert!(cpu.flag_n()); // 0x40 - 0x50 = 0xF0
}

#[test]
fn cpx_and_cpy_compare_their_registers() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0xE0, 0x10, 0xC0, 0x20]);
    cpu.set_x(0x10);
    cpu.set_y(0x10);

    step(&mut cpu); // CPX #$10
    assert!(cpu.flag_z() && cpu.flag_c());

    step(&mut cpu); // CPY #$20
    assert!(!cpu.flag_z() && !cpu.flag_c());
}

// ========== Bitwise ==========

#[test]
fn and_ora_eor_update_a_and_nz() {
    let mut cpu = setup_cpu();
    cpu.memory_mut()
        .write_bytes(0x8000, &[0x29, 0x0F, 0x09, 0x80, 0x49, 0xFF]);
    cpu.set_a(0x5A);

    step(&mut cpu); // AND #$0F
    assert_eq!(cpu.a(), 0x0A);

    step(&mut cpu); // ORA #$80
    assert_eq!(cpu.a(), 0x8A);
    assert!(cpu.flag_n());

    step(&mut cpu); // EOR #$FF
    assert_eq!(cpu.a(), 0x75);
    assert!(!cpu.flag_n());
}

#[test]
fn bit_copies_operand_bits_into_n_and_v() {
    let mut cpu = setup_cpu();
    cpu.memory_mut().write_bytes(0x8000, &[0x24, 0x10]); // BIT $10
    cpu.memory_mut().store(0x0010, 0xC0);
    cpu.set_a(0x3F);

    step(&mut cpu);

    assert!(cpu.flag_z()); // A & M == 0
    assert!(cpu.flag_n()); // bit 7 of M
    assert!(cpu.flag_v()); // bit 6 of M
    assert_eq!(cpu.a(), 0x3F); // A untouched
    assert_eq!(cpu.cycles(), 3);
}
