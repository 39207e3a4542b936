//! Hack VM ABI
//!
//! Memory map and calling convention shared by everything that emits or
//! executes translated code.
//!
//! RAM layout:
//! - 0..=4: SP, LCL, ARG, THIS, THAT
//! - 5..=12: temp segment
//! - 13..=15: scratch cells used inside a single command expansion
//! - 16..=255: static variables, allocated by the assembler
//! - 256..: the global stack, growing upward

use crate::asm::Address;
use std::fmt;

/// Named RAM cells with a fixed address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reg {
    SP, LCL, ARG, THIS, THAT,
    R13, R14, R15,
}

impl Reg {
    pub fn address(self) -> u16 {
        match self {
            Reg::SP => 0,
            Reg::LCL => 1,
            Reg::ARG => 2,
            Reg::THIS => 3,
            Reg::THAT => 4,
            Reg::R13 => 13,
            Reg::R14 => 14,
            Reg::R15 => 15,
        }
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Reg::SP => "SP",
            Reg::LCL => "LCL",
            Reg::ARG => "ARG",
            Reg::THIS => "THIS",
            Reg::THAT => "THAT",
            Reg::R13 => "R13",
            Reg::R14 => "R14",
            Reg::R15 => "R15",
        };
        f.write_str(name)
    }
}

impl From<Reg> for Address {
    fn from(reg: Reg) -> Self {
        Address::Symbol(reg.to_string())
    }
}

/// First RAM cell of the temp segment
pub const TEMP_BASE: u16 = 5;

/// Number of cells in the temp segment
pub const TEMP_SIZE: u16 = 8;

/// Initial stack pointer set by the bootstrap
pub const STACK_BASE: u16 = 256;

/// First address handed out to assembler variables (statics)
pub const FIRST_VARIABLE_ADDRESS: u16 = 16;

/// Hack VM calling convention
///
/// A call pushes the return address followed by the caller's LCL, ARG,
/// THIS and THAT, then the callee's `function` prologue pushes one zero per
/// local:
///
/// ```text
/// ARG ->  arg 0 .. arg n-1
///         return address
///         saved LCL
///         saved ARG
///         saved THIS
///         saved THAT
/// LCL ->  local 0 .. local k-1
/// SP  ->
/// ```
pub struct CallingConvention;

impl CallingConvention {
    /// Words saved between the arguments and the locals
    pub const FRAME_HEADER_WORDS: u16 = 5;

    /// Segment pointers saved by a call, in push order
    pub const SAVED_POINTERS: [Reg; 4] = [Reg::LCL, Reg::ARG, Reg::THIS, Reg::THAT];

    /// Scratch cell holding a computed segment address during push/pop
    pub const EFFECTIVE_ADDRESS: Reg = Reg::R13;

    /// Scratch cell holding the callee's ARG while a frame is torn down
    pub const FRAME_BASE: Reg = Reg::R14;

    /// Scratch cell holding the return address while a frame is torn down
    pub const RETURN_ADDRESS: Reg = Reg::R15;

    /// Name of the entry point invoked by the bootstrap
    pub const ENTRY_POINT: &'static str = "Sys.init";
}

/// Symbols every Hack assembler predefines
pub fn predefined_symbols() -> Vec<(String, u16)> {
    let mut symbols: Vec<(String, u16)> = [Reg::SP, Reg::LCL, Reg::ARG, Reg::THIS, Reg::THAT]
        .iter()
        .map(|reg| (reg.to_string(), reg.address()))
        .collect();
    symbols.extend((0..16).map(|n| (format!("R{}", n), n)));
    symbols.push(("SCREEN".to_string(), 16384));
    symbols.push(("KBD".to_string(), 24576));
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_display() {
        assert_eq!(format!("{}", Reg::SP), "SP");
        assert_eq!(format!("{}", Reg::THAT), "THAT");
        assert_eq!(format!("{}", Reg::R13), "R13");
        assert_eq!(Address::from(Reg::ARG), Address::Symbol("ARG".to_string()));
    }

    #[test]
    fn test_register_addresses_match_predefined_symbols() {
        let symbols = predefined_symbols();
        for reg in [Reg::SP, Reg::LCL, Reg::ARG, Reg::THIS, Reg::THAT, Reg::R13, Reg::R14, Reg::R15] {
            let name = reg.to_string();
            let (_, address) = symbols.iter().find(|(s, _)| *s == name).unwrap();
            assert_eq!(*address, reg.address());
        }
    }

    #[test]
    fn test_scratch_cells_do_not_overlap_temp() {
        let temp = TEMP_BASE..TEMP_BASE + TEMP_SIZE;
        for reg in [
            CallingConvention::EFFECTIVE_ADDRESS,
            CallingConvention::FRAME_BASE,
            CallingConvention::RETURN_ADDRESS,
        ] {
            assert!(!temp.contains(&reg.address()));
            assert!(reg.address() < FIRST_VARIABLE_ADDRESS);
        }
    }
}
