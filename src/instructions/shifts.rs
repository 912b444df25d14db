//! # Shifts and Rotates
//!
//! ASL, LSR, ROL and ROR, each in accumulator and read-modify-write forms.
//! The shifted-out bit lands in C; rotates shift the old C in at the other
//! end. Memory forms go through [`Cpu::read_modify_write`], which issues
//! the double write the hardware performs.

use crate::addressing::AddressingMode;
use crate::clock::Clock;
use crate::cpu::Cpu;
use crate::memory::Memory;

/// ASL: arithmetic shift left. Bit 7 moves into C. Flags: C, N, Z.
pub(crate) fn asl<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    apply(cpu, mode, |cpu, value| {
        cpu.flag_c = value & 0x80 != 0;
        value << 1
    });
}

/// LSR: logical shift right. Bit 0 moves into C. Flags: C, N (cleared), Z.
pub(crate) fn lsr<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    apply(cpu, mode, |cpu, value| {
        cpu.flag_c = value & 0x01 != 0;
        value >> 1
    });
}

/// ROL: rotate left through carry. Flags: C, N, Z.
pub(crate) fn rol<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    apply(cpu, mode, |cpu, value| {
        let carry_in = cpu.flag_c as u8;
        cpu.flag_c = value & 0x80 != 0;
        (value << 1) | carry_in
    });
}

/// ROR: rotate right through carry. Flags: C, N, Z.
pub(crate) fn ror<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    apply(cpu, mode, |cpu, value| {
        let carry_in = (cpu.flag_c as u8) << 7;
        cpu.flag_c = value & 0x01 != 0;
        (value >> 1) | carry_in
    });
}

fn apply<M: Memory, C: Clock>(
    cpu: &mut Cpu<M, C>,
    mode: AddressingMode,
    f: impl Fn(&mut Cpu<M, C>, u8) -> u8,
) {
    if mode == AddressingMode::Accumulator {
        cpu.implied_cycle();
        let old = cpu.a;
        let new = f(cpu, old);
        cpu.a = new;
        cpu.set_nz(new);
    } else {
        cpu.read_modify_write(mode, |cpu, old| {
            let new = f(cpu, old);
            cpu.set_nz(new);
            new
        });
    }
}
