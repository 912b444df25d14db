//! # Increments and Decrements
//!
//! Memory forms (INC/DEC) are read-modify-write; register forms
//! (INX/INY/DEX/DEY) are implied. All set N and Z; none touch C.

use crate::addressing::AddressingMode;
use crate::clock::Clock;
use crate::cpu::Cpu;
use crate::memory::Memory;

/// INC: increment a memory cell. Flags: N, Z.
pub(crate) fn inc<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    cpu.read_modify_write(mode, |cpu, old| {
        let new = old.wrapping_add(1);
        cpu.set_nz(new);
        new
    });
}

/// DEC: decrement a memory cell. Flags: N, Z.
pub(crate) fn dec<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    cpu.read_modify_write(mode, |cpu, old| {
        let new = old.wrapping_sub(1);
        cpu.set_nz(new);
        new
    });
}

/// INX: increment X. Flags: N, Z.
pub(crate) fn inx<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.x = cpu.x.wrapping_add(1);
    let x = cpu.x;
    cpu.set_nz(x);
}

/// INY: increment Y. Flags: N, Z.
pub(crate) fn iny<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.y = cpu.y.wrapping_add(1);
    let y = cpu.y;
    cpu.set_nz(y);
}

/// DEX: decrement X. Flags: N, Z.
pub(crate) fn dex<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.x = cpu.x.wrapping_sub(1);
    let x = cpu.x;
    cpu.set_nz(x);
}

/// DEY: decrement Y. Flags: N, Z.
pub(crate) fn dey<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.y = cpu.y.wrapping_sub(1);
    let y = cpu.y;
    cpu.set_nz(y);
}
