//! Command emitter
//!
//! Expands each VM command into a self-contained instruction fragment. The
//! only state is the `NameGenerator`, which numbers call sites and
//! comparison expansions across the whole program.

use crate::command::{ArithmeticOp, Command, Segment};
use crate::naming::{static_symbol, FunctionScope, NameGenerator, HALT_LABEL};
use log::trace;
use vmt_codegen::abi::{CallingConvention, Reg, STACK_BASE, TEMP_BASE};
use vmt_codegen::asm::{Address, HackInst, Jump};
use vmt_codegen::encode;
use vmt_common::CommandError;

/// Where a command appears: its unit (for statics) and function scope (for labels)
#[derive(Debug, Clone, Copy)]
pub struct EmitContext<'a> {
    pub unit: &'a str,
    pub scope: &'a FunctionScope,
}

#[derive(Debug, Default)]
pub struct CommandEmitter {
    names: NameGenerator,
}

impl CommandEmitter {
    pub fn new() -> Self {
        Self {
            names: NameGenerator::new(),
        }
    }

    pub fn names(&self) -> &NameGenerator {
        &self.names
    }

    /// Expand one command
    pub fn emit(&mut self, command: &Command, ctx: &EmitContext) -> Result<Vec<HackInst>, CommandError> {
        let insts = match command {
            Command::Push { segment, index } => self.push(*segment, *index, ctx.unit),
            Command::Pop { segment, index } => self.pop(*segment, *index, ctx.unit)?,
            Command::Arithmetic(op) => self.arithmetic(*op),
            Command::Label(name) => self.label(ctx.scope, name),
            Command::Goto(name) => self.goto(ctx.scope, name),
            Command::IfGoto(name) => self.if_goto(ctx.scope, name),
            Command::Function { name, locals } => self.function(name, *locals),
            Command::Call { name, args } => self.call(name, *args),
            Command::Return => self.ret(),
        };
        trace!("{} -> {} instructions", command, insts.len());
        Ok(insts)
    }

    pub fn push(&self, segment: Segment, index: u16, unit: &str) -> Vec<HackInst> {
        match segment {
            Segment::Constant => encode::push_immediate(index),
            Segment::Local => encode::push_indirect(Reg::LCL, index),
            Segment::Argument => encode::push_indirect(Reg::ARG, index),
            Segment::This => encode::push_indirect(Reg::THIS, index),
            Segment::That => encode::push_indirect(Reg::THAT, index),
            Segment::Temp => encode::push_from(TEMP_BASE + index),
            Segment::Pointer => encode::push_from(pointer_register(index)),
            Segment::Static => encode::push_from(static_symbol(unit, index)),
        }
    }

    pub fn pop(&self, segment: Segment, index: u16, unit: &str) -> Result<Vec<HackInst>, CommandError> {
        let insts = match segment {
            Segment::Constant => {
                return Err(CommandError::unsupported_segment("cannot pop to constant"));
            }
            Segment::Local => encode::pop_indirect(Reg::LCL, index),
            Segment::Argument => encode::pop_indirect(Reg::ARG, index),
            Segment::This => encode::pop_indirect(Reg::THIS, index),
            Segment::That => encode::pop_indirect(Reg::THAT, index),
            Segment::Temp => encode::pop_into(TEMP_BASE + index),
            Segment::Pointer => encode::pop_into(pointer_register(index)),
            Segment::Static => encode::pop_into(static_symbol(unit, index)),
        };
        Ok(insts)
    }

    /// Binary ops pop y then x and push `x op y`; unary ops rewrite the top
    pub fn arithmetic(&mut self, op: ArithmeticOp) -> Vec<HackInst> {
        match op {
            ArithmeticOp::Add => binary(encode::add_a_to_d()),
            ArithmeticOp::Sub => binary(encode::sub_d_from_a()),
            ArithmeticOp::And => binary(encode::and_a_into_d()),
            ArithmeticOp::Or => binary(encode::or_a_into_d()),
            ArithmeticOp::Neg => unary(encode::neg_d()),
            ArithmeticOp::Not => unary(encode::not_d()),
            ArithmeticOp::Eq => self.comparison(Jump::JEQ),
            ArithmeticOp::Gt => self.comparison(Jump::JGT),
            ArithmeticOp::Lt => self.comparison(Jump::JLT),
        }
    }

    /// D = x - y, then -1 / 0 by the sign test
    fn comparison(&mut self, jump: Jump) -> Vec<HackInst> {
        let labels = self.names.comparison_labels();
        let mut insts = encode::pop_d();
        insts.extend(encode::pop_a());
        insts.push(encode::sub_d_from_a());
        insts.extend(encode::set_d_if(jump, &labels.true_label, &labels.end_label));
        insts.extend(encode::push_d());
        insts
    }

    pub fn label(&self, scope: &FunctionScope, name: &str) -> Vec<HackInst> {
        vec![encode::label(&scope.qualify(name))]
    }

    pub fn goto(&self, scope: &FunctionScope, name: &str) -> Vec<HackInst> {
        encode::jump_to(&scope.qualify(name))
    }

    /// Jumps when the popped value is anything but zero
    pub fn if_goto(&self, scope: &FunctionScope, name: &str) -> Vec<HackInst> {
        let mut insts = encode::pop_d();
        insts.extend(encode::jump_if_d_nonzero(&scope.qualify(name)));
        insts
    }

    /// Entry label followed by one zero push per local
    pub fn function(&self, name: &str, locals: u16) -> Vec<HackInst> {
        let mut insts = vec![encode::label(name)];
        for _ in 0..locals {
            insts.extend(encode::push_immediate(0u16));
        }
        insts
    }

    pub fn call(&mut self, name: &str, args: u16) -> Vec<HackInst> {
        let return_label = self.names.return_label(name);
        trace!("call {} {} returns to {}", name, args, return_label);

        let mut insts = encode::push_immediate(return_label.as_str());
        for pointer in CallingConvention::SAVED_POINTERS {
            insts.extend(encode::push_from(pointer));
        }

        // ARG = SP - 5 - args
        insts.extend(encode::load_d(Reg::SP));
        insts.extend(encode::load_a(CallingConvention::FRAME_HEADER_WORDS));
        insts.push(encode::sub_a_from_d());
        insts.extend(encode::load_a(args));
        insts.push(encode::sub_a_from_d());
        insts.extend(encode::store_d(Reg::ARG));

        // LCL = SP
        insts.extend(encode::copy(Reg::SP, Reg::LCL));

        insts.extend(encode::jump_to(name));
        insts.push(encode::label(&return_label));
        insts
    }

    /// Tear down the current frame
    ///
    /// The return address and frame base are captured first: restoring ARG
    /// and LCL overwrites the only pointers into the saved frame.
    pub fn ret(&self) -> Vec<HackInst> {
        let ret_addr = CallingConvention::RETURN_ADDRESS;
        let frame_base = CallingConvention::FRAME_BASE;
        let mut insts = Vec::new();

        // R15 = RAM[LCL - 5]
        insts.extend(encode::load_d(Reg::LCL));
        insts.extend(encode::load_a(CallingConvention::FRAME_HEADER_WORDS));
        insts.push(encode::sub_a_from_d());
        insts.extend(encode::store_d(ret_addr));
        insts.extend(encode::load_d_indirect(ret_addr));
        insts.extend(encode::store_d(ret_addr));

        // R14 = ARG, RAM[R14] = return value
        insts.extend(encode::copy(Reg::ARG, frame_base));
        insts.extend(encode::pop_d());
        insts.extend(encode::store_d_indirect(frame_base));

        // Saved pointers sit just below LCL, popped in reverse push order
        insts.extend(encode::copy(Reg::LCL, Reg::SP));
        for pointer in CallingConvention::SAVED_POINTERS.iter().rev() {
            insts.extend(encode::pop_into(*pointer));
        }

        // SP = R14 + 1
        insts.extend(encode::copy(frame_base, Reg::SP));
        insts.extend(encode::increment(Reg::SP));

        insts.extend(encode::jump_indirect(ret_addr));
        insts
    }

    /// SP = 256, then `call Sys.init 0`
    pub fn bootstrap(&mut self) -> Vec<HackInst> {
        let mut insts = encode::store_immediate(STACK_BASE, Reg::SP);
        insts.extend(self.call(CallingConvention::ENTRY_POINT, 0));
        insts
    }

    /// Terminal self-jump so execution never runs off the end of the program
    pub fn halt_loop(&self) -> Vec<HackInst> {
        let mut insts = vec![encode::label(HALT_LABEL)];
        insts.extend(encode::jump_to(HALT_LABEL));
        insts
    }
}

fn pointer_register(index: u16) -> Address {
    if index == 0 {
        Reg::THIS.into()
    } else {
        Reg::THAT.into()
    }
}

fn binary(combine: HackInst) -> Vec<HackInst> {
    let mut insts = encode::pop_d();
    insts.extend(encode::pop_a());
    insts.push(combine);
    insts.extend(encode::push_d());
    insts
}

fn unary(transform: HackInst) -> Vec<HackInst> {
    let mut insts = encode::pop_d();
    insts.push(transform);
    insts.extend(encode::push_d());
    insts
}
