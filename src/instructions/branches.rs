//! # Conditional Branches
//!
//! All eight branches share one implementation: fetch the signed offset,
//! then redirect the PC when the tested flag matches.
//!
//! Cycle costs: 2 when not taken, +1 when taken, +1 more when the target
//! lies in a different page than the instruction's end. The penalties are
//! charged through the discarded reads the hardware issues while the PC
//! bytes are being fixed up.

use crate::clock::Clock;
use crate::cpu::{page_crossed, Cpu};
use crate::memory::Memory;

/// BCC: branch if carry clear.
pub(crate) fn bcc<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = !cpu.flag_c;
    branch(cpu, taken);
}

/// BCS: branch if carry set.
pub(crate) fn bcs<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = cpu.flag_c;
    branch(cpu, taken);
}

/// BEQ: branch if zero set.
pub(crate) fn beq<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = cpu.flag_z;
    branch(cpu, taken);
}

/// BNE: branch if zero clear.
pub(crate) fn bne<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = !cpu.flag_z;
    branch(cpu, taken);
}

/// BMI: branch if negative set.
pub(crate) fn bmi<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = cpu.flag_n;
    branch(cpu, taken);
}

/// BPL: branch if negative clear.
pub(crate) fn bpl<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = !cpu.flag_n;
    branch(cpu, taken);
}

/// BVS: branch if overflow set.
pub(crate) fn bvs<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = cpu.flag_v;
    branch(cpu, taken);
}

/// BVC: branch if overflow clear.
pub(crate) fn bvc<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>) {
    let taken = !cpu.flag_v;
    branch(cpu, taken);
}

fn branch<M: Memory, C: Clock>(cpu: &mut Cpu<M, C>, taken: bool) {
    let offset = cpu.fetch_byte() as i8;
    if !taken {
        return;
    }

    let base = cpu.pc;
    let target = base.wrapping_add_signed(i16::from(offset));

    // Discarded fetch while the low PC byte is rewritten
    let _ = cpu.bus_read(base);
    if page_crossed(base, target) {
        // Second discarded fetch at the not-yet-fixed-up address
        let _ = cpu.bus_read((base & 0xFF00) | (target & 0x00FF));
    }
    cpu.pc = target;
}
