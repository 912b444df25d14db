//! # Register Transfers
//!
//! Two-cycle implied moves between registers. All set N and Z from the
//! moved value except TXS, which affects no flags.

use crate::clock::Clock;
use crate::cpu::Cpu;
use crate::memory::Memory;

/// TAX: A -> X. Flags: N, Z.
pub(crate) fn tax<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.x = cpu.a;
    let x = cpu.x;
    cpu.set_nz(x);
}

/// TAY: A -> Y. Flags: N, Z.
pub(crate) fn tay<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.y = cpu.a;
    let y = cpu.y;
    cpu.set_nz(y);
}

/// TXA: X -> A. Flags: N, Z.
pub(crate) fn txa<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.a = cpu.x;
    let a = cpu.a;
    cpu.set_nz(a);
}

/// TYA: Y -> A. Flags: N, Z.
pub(crate) fn tya<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.a = cpu.y;
    let a = cpu.a;
    cpu.set_nz(a);
}

/// TSX: SP -> X. Flags: N, Z.
pub(crate) fn tsx<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.x = cpu.sp;
    let x = cpu.x;
    cpu.set_nz(x);
}

/// TXS: X -> SP. No flags.
pub(crate) fn txs<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    cpu.implied_cycle();
    cpu.sp = cpu.x;
}
