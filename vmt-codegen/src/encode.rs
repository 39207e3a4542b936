//! Stateless encoding primitives
//!
//! Each function maps one micro-operation to the instruction sequence that
//! performs it. Nothing here keeps state: anything that must be unique
//! (branch labels) is passed in by the caller.

use crate::abi::{CallingConvention, Reg};
use crate::asm::{Address, Comp, Dest, HackInst, Jump};

/// A = address
pub fn load_a(address: impl Into<Address>) -> Vec<HackInst> {
    vec![HackInst::at(address)]
}

/// D = address (immediate load)
pub fn load_d_immediate(address: impl Into<Address>) -> Vec<HackInst> {
    vec![
        HackInst::at(address),
        HackInst::assign(Dest::D, Comp::A),
    ]
}

/// D = RAM[address]
pub fn load_d(address: impl Into<Address>) -> Vec<HackInst> {
    vec![
        HackInst::at(address),
        HackInst::assign(Dest::D, Comp::M),
    ]
}

/// A = RAM[pointer]
pub fn load_a_indirect(pointer: impl Into<Address>) -> Vec<HackInst> {
    vec![
        HackInst::at(pointer),
        HackInst::assign(Dest::A, Comp::M),
    ]
}

/// D = RAM[RAM[pointer]]
pub fn load_d_indirect(pointer: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_a_indirect(pointer);
    insts.push(HackInst::assign(Dest::D, Comp::M));
    insts
}

/// RAM[address] = D
pub fn store_d(address: impl Into<Address>) -> Vec<HackInst> {
    vec![
        HackInst::at(address),
        HackInst::assign(Dest::M, Comp::D),
    ]
}

/// RAM[RAM[pointer]] = D
pub fn store_d_indirect(pointer: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_a_indirect(pointer);
    insts.push(HackInst::assign(Dest::M, Comp::D));
    insts
}

/// RAM[address] = value
pub fn store_immediate(value: impl Into<Address>, address: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_d_immediate(value);
    insts.extend(store_d(address));
    insts
}

/// RAM[to] = RAM[from]
pub fn copy(from: impl Into<Address>, to: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_d(from);
    insts.extend(store_d(to));
    insts
}

/// D = D + A
pub fn add_a_to_d() -> HackInst {
    HackInst::assign(Dest::D, Comp::DPlusA)
}

/// D = D - A
pub fn sub_a_from_d() -> HackInst {
    HackInst::assign(Dest::D, Comp::DMinusA)
}

/// D = A - D
pub fn sub_d_from_a() -> HackInst {
    HackInst::assign(Dest::D, Comp::AMinusD)
}

/// D = -D
pub fn neg_d() -> HackInst {
    HackInst::assign(Dest::D, Comp::NegD)
}

/// D = D & A
pub fn and_a_into_d() -> HackInst {
    HackInst::assign(Dest::D, Comp::DAndA)
}

/// D = D | A
pub fn or_a_into_d() -> HackInst {
    HackInst::assign(Dest::D, Comp::DOrA)
}

/// D = !D
pub fn not_d() -> HackInst {
    HackInst::assign(Dest::D, Comp::NotD)
}

/// RAM[address] += 1
pub fn increment(address: impl Into<Address>) -> Vec<HackInst> {
    vec![
        HackInst::at(address),
        HackInst::assign(Dest::M, Comp::MPlusOne),
    ]
}

/// RAM[address] -= 1
pub fn decrement(address: impl Into<Address>) -> Vec<HackInst> {
    vec![
        HackInst::at(address),
        HackInst::assign(Dest::M, Comp::MMinusOne),
    ]
}

/// RAM[SP] = D; SP += 1
pub fn push_d() -> Vec<HackInst> {
    let mut insts = store_d_indirect(Reg::SP);
    insts.extend(increment(Reg::SP));
    insts
}

/// SP -= 1; D = RAM[SP]
pub fn pop_d() -> Vec<HackInst> {
    let mut insts = decrement(Reg::SP);
    insts.extend(load_d_indirect(Reg::SP));
    insts
}

/// SP -= 1; A = RAM[SP]
pub fn pop_a() -> Vec<HackInst> {
    let mut insts = decrement(Reg::SP);
    insts.extend(load_a_indirect(Reg::SP));
    insts.push(HackInst::assign(Dest::A, Comp::M));
    insts
}

/// Push a literal value (or the address a symbol resolves to)
pub fn push_immediate(value: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_d_immediate(value);
    insts.extend(push_d());
    insts
}

/// Push RAM[address]
pub fn push_from(address: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_d(address);
    insts.extend(push_d());
    insts
}

/// Pop into RAM[address]
pub fn pop_into(address: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = pop_d();
    insts.extend(store_d(address));
    insts
}

/// RAM[R13] = RAM[base] + index
pub fn effective_address(base: Reg, index: u16) -> Vec<HackInst> {
    let mut insts = load_d(base);
    insts.extend(load_a(index));
    insts.push(add_a_to_d());
    insts.extend(store_d(CallingConvention::EFFECTIVE_ADDRESS));
    insts
}

/// Push RAM[RAM[base] + index]
pub fn push_indirect(base: Reg, index: u16) -> Vec<HackInst> {
    let mut insts = effective_address(base, index);
    insts.extend(load_d_indirect(CallingConvention::EFFECTIVE_ADDRESS));
    insts.extend(push_d());
    insts
}

/// Pop into RAM[RAM[base] + index]
///
/// The address is computed before the pop, so D is free for the value.
pub fn pop_indirect(base: Reg, index: u16) -> Vec<HackInst> {
    let mut insts = effective_address(base, index);
    insts.extend(pop_d());
    insts.extend(store_d_indirect(CallingConvention::EFFECTIVE_ADDRESS));
    insts
}

/// Replace D with the boolean encoding of `D <jump>`: -1 if the condition
/// holds, 0 otherwise
///
/// `true_label` and `end_label` are declared inside this expansion and must
/// be unique to it.
pub fn set_d_if(jump: Jump, true_label: &str, end_label: &str) -> Vec<HackInst> {
    vec![
        HackInst::at(true_label),
        HackInst::branch(Comp::D, jump),
        HackInst::assign(Dest::D, Comp::Zero),
        HackInst::at(end_label),
        HackInst::branch(Comp::Zero, Jump::JMP),
        HackInst::label(true_label),
        HackInst::assign(Dest::D, Comp::MinusOne),
        HackInst::label(end_label),
    ]
}

/// Unconditional jump to a label
pub fn jump_to(label: &str) -> Vec<HackInst> {
    vec![
        HackInst::at(label),
        HackInst::branch(Comp::Zero, Jump::JMP),
    ]
}

/// Jump to a label when D is non-zero
pub fn jump_if_d_nonzero(label: &str) -> Vec<HackInst> {
    vec![
        HackInst::at(label),
        HackInst::branch(Comp::D, Jump::JNE),
    ]
}

/// Jump to the address stored in RAM[pointer]
pub fn jump_indirect(pointer: impl Into<Address>) -> Vec<HackInst> {
    let mut insts = load_a_indirect(pointer);
    insts.push(HackInst::branch(Comp::Zero, Jump::JMP));
    insts
}

/// Declare a label
pub fn label(name: &str) -> HackInst {
    HackInst::label(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(insts: &[HackInst]) -> Vec<String> {
        insts.iter().map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_push_and_pop_d() {
        assert_eq!(text(&push_d()), vec!["@SP", "A=M", "M=D", "@SP", "M=M+1"]);
        assert_eq!(text(&pop_d()), vec!["@SP", "M=M-1", "@SP", "A=M", "D=M"]);
        assert_eq!(text(&pop_a()), vec!["@SP", "M=M-1", "@SP", "A=M", "A=M"]);
    }

    #[test]
    fn test_push_immediate() {
        assert_eq!(
            text(&push_immediate(17u16)),
            vec!["@17", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn test_effective_address_uses_scratch_cell() {
        assert_eq!(
            text(&effective_address(Reg::LCL, 3)),
            vec!["@LCL", "D=M", "@3", "D=D+A", "@R13", "M=D"]
        );
    }

    #[test]
    fn test_pop_indirect_computes_address_first() {
        let insts = text(&pop_indirect(Reg::THAT, 2));
        assert_eq!(&insts[..6], &["@THAT", "D=M", "@2", "D=D+A", "@R13", "M=D"]);
        assert_eq!(&insts[insts.len() - 3..], &["@R13", "A=M", "M=D"]);
    }

    #[test]
    fn test_set_d_if_uses_given_labels() {
        assert_eq!(
            text(&set_d_if(Jump::JLT, "T", "E")),
            vec!["@T", "D;JLT", "D=0", "@E", "0;JMP", "(T)", "D=-1", "(E)"]
        );
    }

    #[test]
    fn test_jumps() {
        assert_eq!(text(&jump_to("LOOP")), vec!["@LOOP", "0;JMP"]);
        assert_eq!(text(&jump_if_d_nonzero("LOOP")), vec!["@LOOP", "D;JNE"]);
        assert_eq!(text(&jump_indirect(Reg::R15)), vec!["@R15", "A=M", "0;JMP"]);
    }

    #[test]
    fn test_memory_transfers() {
        assert_eq!(text(&copy(Reg::SP, Reg::LCL)), vec!["@SP", "D=M", "@LCL", "M=D"]);
        assert_eq!(text(&store_immediate(256u16, Reg::SP)), vec!["@256", "D=A", "@SP", "M=D"]);
        assert_eq!(text(&push_from("Main.0")), vec!["@Main.0", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
        assert_eq!(text(&pop_into(7u16)), vec!["@SP", "M=M-1", "@SP", "A=M", "D=M", "@7", "M=D"]);
    }
}
