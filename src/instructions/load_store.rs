//! # Loads and Stores
//!
//! LDA/LDX/LDY set N and Z from the loaded value; STA/STX/STY affect no
//! flags. Stores never pay the page-crossing cycle: the hardware always
//! issues the worst-case discarded read first, which
//! [`Cpu::effective_address`] models via [`Access::Write`].

use crate::addressing::AddressingMode;
use crate::clock::Clock;
use crate::cpu::{Access, Cpu};
use crate::memory::Memory;

/// LDA: load the accumulator. Flags: N, Z.
pub(crate) fn lda<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    let value = cpu.read_operand(mode);
    cpu.a = value;
    cpu.set_nz(value);
}

/// LDX: load the X register. Flags: N, Z.
pub(crate) fn ldx<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    let value = cpu.read_operand(mode);
    cpu.x = value;
    cpu.set_nz(value);
}

/// LDY: load the Y register. Flags: N, Z.
pub(crate) fn ldy<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    let value = cpu.read_operand(mode);
    cpu.y = value;
    cpu.set_nz(value);
}

/// STA: store the accumulator. No flags.
pub(crate) fn sta<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    let addr = cpu.effective_address(mode, Access::Write);
    let a = cpu.a;
    cpu.bus_write(addr, a);
}

/// STX: store the X register. No flags.
pub(crate) fn stx<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    let addr = cpu.effective_address(mode, Access::Write);
    let x = cpu.x;
    cpu.bus_write(addr, x);
}

/// STY: store the Y register. No flags.
pub(crate) fn sty<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, mode: AddressingMode) {
    let addr = cpu.effective_address(mode, Access::Write);
    let y = cpu.y;
    cpu.bus_write(addr, y);
}
