//! Hack CPU simulator
//!
//! Loads Hack assembly text, resolves symbols the way the Hack assembler
//! does (predefined symbols, labels, then variables from RAM[16]) and runs
//! it on a model of the Hack CPU. Used to check translated programs
//! end to end.

pub mod cpu;
pub mod loader;

pub use cpu::{Cpu, CpuState, EmuError, RAM_SIZE};
pub use loader::{load_program, Instr, Rom};
