//! CPU emulation for the r16 machine.
//!
//! This module implements the full architecture:
//! - a fixed-capacity, word-addressable memory
//! - 16 general registers, PC, FLAGS and the reserved stack pointers
//! - the fetch-decode-execute engine with the fixed opcode table

pub mod decode;
pub mod execute;
pub mod flags;
pub mod memory;
pub mod registers;

pub use decode::Instruction;
pub use execute::{Cpu, CpuError, CpuState, Trace};
pub use flags::{Cond, Flags};
pub use memory::{Memory, MemoryError};
pub use registers::{Registers, START_ADDR};
