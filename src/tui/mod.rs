//! TUI debugger for the r16 emulator.
//!
//! An interactive terminal frontend composed purely from the core's
//! public surface:
//! - step / run-to-halt / pause / reset controls
//! - register and flag visualization
//! - memory examine and deposit
//! - width-aware disassembly from the current PC

mod app;
mod ui;

pub use app::{run_debugger, DebuggerApp};
