//! # CPU Core
//!
//! The 6502 register file and the fetch-decode-execute loop.
//!
//! ## Execution model
//!
//! - [`Cpu::execute_next_instruction`] runs exactly one instruction.
//! - [`Cpu::execute_with_timeout`] runs instructions until BRK, a wall-clock
//!   timeout (checked only at instruction boundaries), or an illegal opcode,
//!   and reports which of the three happened as a [`HaltReason`].
//!
//! ## Cycle accounting
//!
//! Every memory access goes through [`Cpu::bus_read`]/[`Cpu::bus_write`],
//! which tick the clock once per access. Instruction handlers issue the
//! exact bus transactions the NMOS 6502 performs, including the discarded
//! reads of indexed and read-modify-write addressing, so cycle counts fall
//! out of the access sequence instead of being added up separately.
//!
//! The order of accesses within one instruction is fixed: opcode fetch,
//! operand fetches left to right, discarded index/pointer reads, the data
//! access, then any write. Memory-mapped devices observe this order.

use std::time::{Duration, Instant};

use log::trace;
use thiserror::Error;

use crate::addressing::AddressingMode;
use crate::clock::{Clock, CycleClock};
use crate::instructions;
use crate::memory::Memory;
use crate::opcodes::{decode, Mnemonic};

/// Why the CPU stopped executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HaltReason {
    /// A BRK instruction executed (its full push-and-vector semantics
    /// included). `pc` is the address of the BRK opcode.
    #[error("BRK executed at {pc:#06x}")]
    Brk {
        /// Address of the BRK opcode byte.
        pc: u16,
    },

    /// The wall-clock budget ran out between instructions.
    #[error("execution timed out after {cycles} cycles")]
    Timeout {
        /// Total clock cycles at the moment of the timeout.
        cycles: u64,
    },

    /// A byte with no opcode table entry was fetched for execution.
    #[error("illegal opcode {byte:#04x} at {pc:#06x}")]
    IllegalOpcode {
        /// Address the byte was fetched from.
        pc: u16,
        /// The offending byte.
        byte: u8,
    },
}

/// The kind of data access an instruction performs at its effective
/// address. Decides whether page-crossing costs a cycle: reads pay it only
/// when actually crossing, writes and read-modify-writes always pay the
/// worst case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Access {
    Read,
    Write,
    Modify,
}

/// 6502 CPU state and execution context.
///
/// Generic over its [`Memory`] and [`Clock`], both owned by value: while
/// the CPU runs, nothing else touches the bus or the cycle counter.
///
/// # Examples
///
/// ```
/// use emu6502::{Cpu, CycleClock, FlatMemory, Memory};
///
/// let mut memory = FlatMemory::new();
/// // Reset vector -> 0x0200, program: LDA #$05; BRK
/// memory.write_bytes(0xFFFC, &[0x00, 0x02]);
/// memory.write_bytes(0x0200, &[0xA9, 0x05, 0x00]);
///
/// let mut cpu = Cpu::new(memory, CycleClock::new());
/// assert_eq!(cpu.pc(), 0x0200);
///
/// cpu.execute_next_instruction().unwrap();
/// assert_eq!(cpu.a(), 0x05);
/// assert_eq!(cpu.cycles(), 2);
/// ```
pub struct Cpu<M: Memory, C: Clock = CycleClock> {
    /// Accumulator.
    pub(crate) a: u8,

    /// X index register.
    pub(crate) x: u8,

    /// Y index register.
    pub(crate) y: u8,

    /// Program counter.
    pub(crate) pc: u16,

    /// Stack pointer; the stack lives at `0x0100 + sp` and grows downward.
    pub(crate) sp: u8,

    /// Negative flag (bit 7 of the last result).
    pub(crate) flag_n: bool,

    /// Overflow flag (signed overflow of ADC/SBC, bit 6 of BIT operands).
    pub(crate) flag_v: bool,

    /// Break flag; set when a BRK has executed. Only observable in pushed
    /// status bytes and via [`status`](Self::status).
    pub(crate) flag_b: bool,

    /// Decimal mode flag.
    pub(crate) flag_d: bool,

    /// Interrupt disable flag.
    pub(crate) flag_i: bool,

    /// Zero flag.
    pub(crate) flag_z: bool,

    /// Carry flag.
    pub(crate) flag_c: bool,

    /// Whether ADC/SBC honor the decimal flag. When false the flag can be
    /// set and cleared but arithmetic stays binary.
    decimal_enabled: bool,

    pub(crate) memory: M,
    pub(crate) clock: C,
}

impl<M: Memory, C: Clock> Cpu<M, C> {
    /// Creates a CPU over `memory` and `clock` and applies
    /// [`reset`](Self::reset), so the PC comes up pointing at the reset
    /// vector target.
    pub fn new(memory: M, clock: C) -> Self {
        let mut cpu = Self {
            a: 0,
            x: 0,
            y: 0,
            pc: 0,
            sp: 0xFD,
            flag_n: false,
            flag_v: false,
            flag_b: false,
            flag_d: false,
            flag_i: true,
            flag_z: false,
            flag_c: false,
            decimal_enabled: true,
            memory,
            clock,
        };
        cpu.reset();
        cpu
    }

    /// Applies the 6502 reset sequence: PC is loaded from the vector at
    /// `0xFFFC`/`0xFFFD`, SP becomes `0xFD`, interrupts are disabled and
    /// decimal mode is cleared. The clock keeps its count; reset consumes
    /// no emulated cycles.
    pub fn reset(&mut self) {
        let lo = u16::from(self.memory.load(0xFFFC));
        let hi = u16::from(self.memory.load(0xFFFD));
        self.pc = (hi << 8) | lo;
        self.sp = 0xFD;
        self.flag_i = true;
        self.flag_d = false;
    }

    /// Enables or disables BCD arithmetic. With BCD disabled the `D` flag
    /// still exists but ADC/SBC ignore it.
    pub fn set_decimal_enabled(&mut self, enabled: bool) {
        self.decimal_enabled = enabled;
    }

    /// Executes one full instruction, advancing PC and the clock.
    ///
    /// Returns `Err(HaltReason::Brk)` after executing a BRK (stack pushes
    /// and vector load included) and `Err(HaltReason::IllegalOpcode)` when
    /// the fetched byte has no table entry.
    pub fn execute_next_instruction(&mut self) -> Result<(), HaltReason> {
        let pc = self.pc;
        let opcode = self.bus_read(pc);
        self.pc = pc.wrapping_add(1);

        let Some(entry) = decode(opcode) else {
            return Err(HaltReason::IllegalOpcode { pc, byte: opcode });
        };

        match entry.mnemonic {
            Mnemonic::Adc => instructions::alu::adc(self, entry.mode),
            Mnemonic::And => instructions::alu::and(self, entry.mode),
            Mnemonic::Asl => instructions::shifts::asl(self, entry.mode),
            Mnemonic::Bcc => instructions::branches::bcc(self),
            Mnemonic::Bcs => instructions::branches::bcs(self),
            Mnemonic::Beq => instructions::branches::beq(self),
            Mnemonic::Bit => instructions::alu::bit(self, entry.mode),
            Mnemonic::Bmi => instructions::branches::bmi(self),
            Mnemonic::Bne => instructions::branches::bne(self),
            Mnemonic::Bpl => instructions::branches::bpl(self),
            Mnemonic::Brk => {
                instructions::control::brk(self);
                return Err(HaltReason::Brk { pc });
            }
            Mnemonic::Bvc => instructions::branches::bvc(self),
            Mnemonic::Bvs => instructions::branches::bvs(self),
            Mnemonic::Clc => instructions::flags::clc(self),
            Mnemonic::Cld => instructions::flags::cld(self),
            Mnemonic::Cli => instructions::flags::cli(self),
            Mnemonic::Clv => instructions::flags::clv(self),
            Mnemonic::Cmp => instructions::alu::cmp(self, entry.mode),
            Mnemonic::Cpx => instructions::alu::cpx(self, entry.mode),
            Mnemonic::Cpy => instructions::alu::cpy(self, entry.mode),
            Mnemonic::Dec => instructions::inc_dec::dec(self, entry.mode),
            Mnemonic::Dex => instructions::inc_dec::dex(self),
            Mnemonic::Dey => instructions::inc_dec::dey(self),
            Mnemonic::Eor => instructions::alu::eor(self, entry.mode),
            Mnemonic::Inc => instructions::inc_dec::inc(self, entry.mode),
            Mnemonic::Inx => instructions::inc_dec::inx(self),
            Mnemonic::Iny => instructions::inc_dec::iny(self),
            Mnemonic::Jmp => instructions::control::jmp(self, entry.mode),
            Mnemonic::Jsr => instructions::control::jsr(self),
            Mnemonic::Lda => instructions::load_store::lda(self, entry.mode),
            Mnemonic::Ldx => instructions::load_store::ldx(self, entry.mode),
            Mnemonic::Ldy => instructions::load_store::ldy(self, entry.mode),
            Mnemonic::Lsr => instructions::shifts::lsr(self, entry.mode),
            Mnemonic::Nop => instructions::control::nop(self, entry.mode),
            Mnemonic::Ora => instructions::alu::ora(self, entry.mode),
            Mnemonic::Pha => instructions::stack::pha(self),
            Mnemonic::Php => instructions::stack::php(self),
            Mnemonic::Pla => instructions::stack::pla(self),
            Mnemonic::Plp => instructions::stack::plp(self),
            Mnemonic::Rol => instructions::shifts::rol(self, entry.mode),
            Mnemonic::Ror => instructions::shifts::ror(self, entry.mode),
            Mnemonic::Rti => instructions::control::rti(self),
            Mnemonic::Rts => instructions::control::rts(self),
            Mnemonic::Sbc => instructions::alu::sbc(self, entry.mode),
            Mnemonic::Sec => instructions::flags::sec(self),
            Mnemonic::Sed => instructions::flags::sed(self),
            Mnemonic::Sei => instructions::flags::sei(self),
            Mnemonic::Sta => instructions::load_store::sta(self, entry.mode),
            Mnemonic::Stx => instructions::load_store::stx(self, entry.mode),
            Mnemonic::Sty => instructions::load_store::sty(self, entry.mode),
            Mnemonic::Tax => instructions::transfer::tax(self),
            Mnemonic::Tay => instructions::transfer::tay(self),
            Mnemonic::Tsx => instructions::transfer::tsx(self),
            Mnemonic::Txa => instructions::transfer::txa(self),
            Mnemonic::Txs => instructions::transfer::txs(self),
            Mnemonic::Tya => instructions::transfer::tya(self),
        }

        Ok(())
    }

    /// Runs instructions until BRK, an illegal opcode, or until `timeout`
    /// of wall-clock time has elapsed. The timeout is only checked between
    /// instructions; an instruction is never interrupted mid-fetch.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use emu6502::{Cpu, CycleClock, FlatMemory, HaltReason};
    ///
    /// let mut memory = FlatMemory::new();
    /// memory.write_bytes(0xFFFC, &[0x00, 0x02]);
    /// memory.write_bytes(0x0200, &[0xEA, 0x00]); // NOP; BRK
    ///
    /// let mut cpu = Cpu::new(memory, CycleClock::new());
    /// let halt = cpu.execute_with_timeout(Duration::from_secs(1));
    /// assert_eq!(halt, HaltReason::Brk { pc: 0x0201 });
    /// ```
    pub fn execute_with_timeout(&mut self, timeout: Duration) -> HaltReason {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() >= deadline {
                return HaltReason::Timeout {
                    cycles: self.clock.current_cycle(),
                };
            }
            if let Err(halt) = self.execute_next_instruction() {
                return halt;
            }
        }
    }

    // ========== Bus primitives ==========

    /// Reads one byte over the bus; costs one cycle.
    pub(crate) fn bus_read(&mut self, addr: u16) -> u8 {
        self.clock.wait_for_next_cycle();
        let value = self.memory.load(addr);
        trace!("mem read  [{addr:04x}] -> {value:02x}");
        value
    }

    /// Writes one byte over the bus; costs one cycle.
    pub(crate) fn bus_write(&mut self, addr: u16, value: u8) {
        self.clock.wait_for_next_cycle();
        trace!("mem write [{addr:04x}] <- {value:02x}");
        self.memory.store(addr, value);
    }

    /// Fetches the byte at PC and advances PC.
    pub(crate) fn fetch_byte(&mut self) -> u8 {
        let value = self.bus_read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        value
    }

    /// Fetches a little-endian word at PC and advances PC by two.
    pub(crate) fn fetch_word(&mut self) -> u16 {
        let lo = u16::from(self.fetch_byte());
        let hi = u16::from(self.fetch_byte());
        (hi << 8) | lo
    }

    /// The discarded next-byte read every implied/accumulator instruction
    /// performs while executing internally.
    pub(crate) fn implied_cycle(&mut self) {
        let _ = self.bus_read(self.pc);
    }

    // ========== Stack primitives ==========

    pub(crate) fn push(&mut self, value: u8) {
        self.bus_write(0x0100 | u16::from(self.sp), value);
        self.sp = self.sp.wrapping_sub(1);
    }

    pub(crate) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.bus_read(0x0100 | u16::from(self.sp))
    }

    /// The discarded stack read issued while SP is being adjusted.
    pub(crate) fn stack_peek_cycle(&mut self) {
        let _ = self.bus_read(0x0100 | u16::from(self.sp));
    }

    // ========== Effective addresses ==========

    /// Computes the effective address for a memory-operand addressing
    /// mode, issuing the operand fetches and the discarded reads the
    /// hardware performs. Shared by every instruction that touches memory.
    pub(crate) fn effective_address(&mut self, mode: AddressingMode, access: Access) -> u16 {
        match mode {
            AddressingMode::ZeroPage => u16::from(self.fetch_byte()),
            AddressingMode::ZeroPageX => {
                let base = self.fetch_byte();
                // Discarded read while the index is added; wraps in page 0
                let _ = self.bus_read(u16::from(base));
                u16::from(base.wrapping_add(self.x))
            }
            AddressingMode::ZeroPageY => {
                let base = self.fetch_byte();
                let _ = self.bus_read(u16::from(base));
                u16::from(base.wrapping_add(self.y))
            }
            AddressingMode::Absolute => self.fetch_word(),
            AddressingMode::AbsoluteX => {
                let index = self.x;
                self.indexed_absolute(index, access)
            }
            AddressingMode::AbsoluteY => {
                let index = self.y;
                self.indexed_absolute(index, access)
            }
            AddressingMode::IndirectX => {
                let base = self.fetch_byte();
                let _ = self.bus_read(u16::from(base));
                let ptr = base.wrapping_add(self.x);
                let lo = u16::from(self.bus_read(u16::from(ptr)));
                let hi = u16::from(self.bus_read(u16::from(ptr.wrapping_add(1))));
                (hi << 8) | lo
            }
            AddressingMode::IndirectY => {
                let ptr = self.fetch_byte();
                let lo = u16::from(self.bus_read(u16::from(ptr)));
                let hi = u16::from(self.bus_read(u16::from(ptr.wrapping_add(1))));
                let base = (hi << 8) | lo;
                let effective = base.wrapping_add(u16::from(self.y));
                if access != Access::Read || page_crossed(base, effective) {
                    let _ = self.bus_read((base & 0xFF00) | (effective & 0x00FF));
                }
                effective
            }
            AddressingMode::Indirect => {
                let ptr = self.fetch_word();
                let lo = u16::from(self.bus_read(ptr));
                // NMOS bug: the high pointer byte comes from the same page
                let hi_addr = (ptr & 0xFF00) | (ptr.wrapping_add(1) & 0x00FF);
                let hi = u16::from(self.bus_read(hi_addr));
                (hi << 8) | lo
            }
            AddressingMode::Implied
            | AddressingMode::Accumulator
            | AddressingMode::Immediate
            | AddressingMode::Relative => {
                unreachable!("addressing mode {mode:?} has no effective address")
            }
        }
    }

    fn indexed_absolute(&mut self, index: u8, access: Access) -> u16 {
        let base = self.fetch_word();
        let effective = base.wrapping_add(u16::from(index));
        if access != Access::Read || page_crossed(base, effective) {
            // Read at the partially-computed address: always present for
            // writes and modifies, only on page crossing for reads
            let _ = self.bus_read((base & 0xFF00) | (effective & 0x00FF));
        }
        effective
    }

    /// Reads the operand value for a read instruction.
    pub(crate) fn read_operand(&mut self, mode: AddressingMode) -> u8 {
        match mode {
            AddressingMode::Immediate => self.fetch_byte(),
            mode => {
                let addr = self.effective_address(mode, Access::Read);
                self.bus_read(addr)
            }
        }
    }

    /// Runs a read-modify-write cycle at the operand address: read, write
    /// the unmodified value back (as the hardware does), write the result.
    pub(crate) fn read_modify_write(
        &mut self,
        mode: AddressingMode,
        f: impl FnOnce(&mut Self, u8) -> u8,
    ) {
        let addr = self.effective_address(mode, Access::Modify);
        let old = self.bus_read(addr);
        self.bus_write(addr, old);
        let new = f(self, old);
        self.bus_write(addr, new);
    }

    // ========== Flag helpers ==========

    /// Sets N and Z from a result byte.
    pub(crate) fn set_nz(&mut self, value: u8) {
        self.flag_n = value & 0x80 != 0;
        self.flag_z = value == 0;
    }

    /// Whether ADC/SBC should use packed-BCD arithmetic right now.
    pub(crate) fn decimal_active(&self) -> bool {
        self.decimal_enabled && self.flag_d
    }

    // ========== State accessors ==========

    /// Accumulator value.
    pub fn a(&self) -> u8 {
        self.a
    }

    /// X index register value.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Y index register value.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Program counter value.
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Stack pointer value; the full stack address is `0x0100 + sp`.
    pub fn sp(&self) -> u8 {
        self.sp
    }

    /// Total cycles elapsed on the clock.
    pub fn cycles(&self) -> u64 {
        self.clock.current_cycle()
    }

    /// The status register packed as `N V 1 B D I Z C` (bit 5 reads 1).
    pub fn status(&self) -> u8 {
        let mut status = 0b0010_0000;
        if self.flag_n {
            status |= 0b1000_0000;
        }
        if self.flag_v {
            status |= 0b0100_0000;
        }
        if self.flag_b {
            status |= 0b0001_0000;
        }
        if self.flag_d {
            status |= 0b0000_1000;
        }
        if self.flag_i {
            status |= 0b0000_0100;
        }
        if self.flag_z {
            status |= 0b0000_0010;
        }
        if self.flag_c {
            status |= 0b0000_0001;
        }
        status
    }

    /// Unpacks a status byte into the flags. Bits 4 and 5 are ignored, as
    /// they are by PLP and RTI on hardware.
    pub fn set_status(&mut self, value: u8) {
        self.flag_n = value & 0b1000_0000 != 0;
        self.flag_v = value & 0b0100_0000 != 0;
        self.flag_d = value & 0b0000_1000 != 0;
        self.flag_i = value & 0b0000_0100 != 0;
        self.flag_z = value & 0b0000_0010 != 0;
        self.flag_c = value & 0b0000_0001 != 0;
    }

    /// Negative flag.
    pub fn flag_n(&self) -> bool {
        self.flag_n
    }

    /// Overflow flag.
    pub fn flag_v(&self) -> bool {
        self.flag_v
    }

    /// Break flag.
    pub fn flag_b(&self) -> bool {
        self.flag_b
    }

    /// Decimal mode flag.
    pub fn flag_d(&self) -> bool {
        self.flag_d
    }

    /// Interrupt disable flag.
    pub fn flag_i(&self) -> bool {
        self.flag_i
    }

    /// Zero flag.
    pub fn flag_z(&self) -> bool {
        self.flag_z
    }

    /// Carry flag.
    pub fn flag_c(&self) -> bool {
        self.flag_c
    }

    // ========== State setters (test and host setup) ==========

    /// Sets the accumulator.
    pub fn set_a(&mut self, value: u8) {
        self.a = value;
    }

    /// Sets the X index register.
    pub fn set_x(&mut self, value: u8) {
        self.x = value;
    }

    /// Sets the Y index register.
    pub fn set_y(&mut self, value: u8) {
        self.y = value;
    }

    /// Sets the program counter.
    pub fn set_pc(&mut self, value: u16) {
        self.pc = value;
    }

    /// Sets the stack pointer.
    pub fn set_sp(&mut self, value: u8) {
        self.sp = value;
    }

    /// Sets the carry flag.
    pub fn set_flag_c(&mut self, value: bool) {
        self.flag_c = value;
    }

    /// Sets the zero flag.
    pub fn set_flag_z(&mut self, value: bool) {
        self.flag_z = value;
    }

    /// Sets the negative flag.
    pub fn set_flag_n(&mut self, value: bool) {
        self.flag_n = value;
    }

    /// Sets the overflow flag.
    pub fn set_flag_v(&mut self, value: bool) {
        self.flag_v = value;
    }

    /// Sets the decimal mode flag.
    pub fn set_flag_d(&mut self, value: bool) {
        self.flag_d = value;
    }

    /// Sets the interrupt disable flag.
    pub fn set_flag_i(&mut self, value: bool) {
        self.flag_i = value;
    }

    /// Shared access to the memory behind the bus.
    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Mutable access to the memory behind the bus; does not consume
    /// cycles.
    pub fn memory_mut(&mut self) -> &mut M {
        &mut self.memory
    }

    /// The clock driving this CPU.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

/// True when `from` and `to` lie in different 256-byte pages.
pub(crate) fn page_crossed(from: u16, to: u16) -> bool {
    (from & 0xFF00) != (to & 0xFF00)
}
