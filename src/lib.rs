//! # emu6502
//!
//! A cycle-accurate NMOS 6502 emulator paired with a symbolic assembler.
//! The two halves share one opcode table and one address-space vocabulary,
//! so assembler output is always valid CPU input.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use emu6502::{assemble, Cpu, CycleClock, FlatMemory, HaltReason};
//!
//! let program = assemble(
//!     r#"
//!     .org $0200
//! START:
//!     LDA #$05
//!     CLC
//!     ADC #$03
//!     STA $10
//!     BRK
//! "#,
//! )
//! .unwrap();
//!
//! let mut memory = FlatMemory::new();
//! program.write_to(&mut memory);
//!
//! let mut cpu = Cpu::new(memory, CycleClock::new());
//! cpu.set_pc(program.symbol_offset("START").unwrap());
//!
//! let halt = cpu.execute_with_timeout(Duration::from_secs(1));
//! assert!(matches!(halt, HaltReason::Brk { .. }));
//! assert_eq!(cpu.a(), 0x08);
//! ```
//!
//! ## Architecture
//!
//! - **Table-driven**: all opcode metadata lives in a single declarative
//!   list ([`opcodes`]), with a compile-time decode index and a lazy
//!   encode map derived from it.
//! - **Cycle accuracy**: the CPU ticks its clock once per bus access and
//!   issues the exact access sequence of the hardware, discarded reads
//!   included, so timing falls out of structure rather than bookkeeping.
//! - **Capability traits**: [`Memory`] and [`Clock`] are narrow traits the
//!   CPU is monomorphized over; flat RAM and a counting clock are
//!   provided, mappers and pacing clocks plug in from outside.
//! - **Forward references**: the assembler is single-pass, with a
//!   relocation fixup list per symbol ([`program`]).
//!
//! ## Modules
//!
//! - [`cpu`] - register file and fetch-decode-execute loop
//! - [`memory`] / [`clock`] - bus capabilities consumed by the CPU
//! - [`opcodes`] / [`addressing`] - the shared instruction vocabulary
//! - [`assembler`] - source text to [`program::Program`]
//! - [`disassembler`] - machine code back to listings

pub mod addressing;
pub mod assembler;
pub mod clock;
pub mod cpu;
pub mod disassembler;
pub mod memory;
pub mod opcodes;
pub mod program;

// Instruction semantics, internal to the CPU
mod instructions;

pub use addressing::AddressingMode;
pub use assembler::{assemble, AssemblyError, AssemblyErrorKind};
pub use clock::{Clock, CycleClock};
pub use cpu::{Cpu, HaltReason};
pub use memory::{FlatMemory, Memory, UNINITIALIZED_FILL};
pub use opcodes::{decode, Mnemonic, OpcodeEntry, OPCODES};
pub use program::{Program, RelocationMode, SparseImage};
