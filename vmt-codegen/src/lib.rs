//! Hack VM Translator - Code Generation Primitives
//!
//! This crate holds everything that knows about the target machine:
//!
//! - The Hack instruction model and its textual form
//! - The memory map and calling convention (ABI)
//! - Stateless encoding primitives used by the command emitter

pub mod asm;
pub mod abi;
pub mod encode;

pub use asm::{Address, AsmParseError, Comp, Dest, HackInst, Jump};
pub use abi::{CallingConvention, Reg};

/// Render instructions as assembly text, one per line with a trailing newline
pub fn emit_instructions(instructions: &[HackInst]) -> String {
    let mut output = String::new();
    for inst in instructions {
        output.push_str(&inst.to_string());
        output.push('\n');
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_instructions() {
        let instructions = vec![
            HackInst::comment("push constant 7"),
            HackInst::at(7u16),
            HackInst::assign(Dest::D, Comp::A),
            HackInst::label("END"),
            HackInst::at("END"),
            HackInst::branch(Comp::Zero, Jump::JMP),
        ];

        let asm = emit_instructions(&instructions);
        assert_eq!(asm, "// push constant 7\n@7\nD=A\n(END)\n@END\n0;JMP\n");
    }

    #[test]
    fn test_emit_nothing() {
        assert_eq!(emit_instructions(&[]), "");
    }
}
