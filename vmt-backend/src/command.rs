//! VM command vocabulary
//!
//! One line of VM source is one `Command`. Parsing validates arity, numeric
//! operands, segment names and index ranges, so everything downstream can
//! assume a well-formed command.

use std::fmt;
use std::str::FromStr;
use vmt_codegen::abi::TEMP_SIZE;
use vmt_codegen::asm::{is_valid_symbol, MAX_ADDRESS_VALUE};
use vmt_common::CommandError;

/// Memory segments addressable by `push` and `pop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

impl Segment {
    pub fn keyword(self) -> &'static str {
        match self {
            Segment::Constant => "constant",
            Segment::Local => "local",
            Segment::Argument => "argument",
            Segment::This => "this",
            Segment::That => "that",
            Segment::Temp => "temp",
            Segment::Pointer => "pointer",
            Segment::Static => "static",
        }
    }

    /// Largest index the segment can address
    pub fn max_index(self) -> u16 {
        match self {
            Segment::Temp => TEMP_SIZE - 1,
            Segment::Pointer => 1,
            _ => MAX_ADDRESS_VALUE,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for Segment {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "constant" => Ok(Segment::Constant),
            "local" => Ok(Segment::Local),
            "argument" => Ok(Segment::Argument),
            "this" => Ok(Segment::This),
            "that" => Ok(Segment::That),
            "temp" => Ok(Segment::Temp),
            "pointer" => Ok(Segment::Pointer),
            "static" => Ok(Segment::Static),
            other => Err(CommandError::unsupported_segment(format!(
                "unknown segment `{}`",
                other
            ))),
        }
    }
}

/// Stack arithmetic, logic and comparison commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl ArithmeticOp {
    pub fn keyword(self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Neg => "neg",
            ArithmeticOp::Eq => "eq",
            ArithmeticOp::Gt => "gt",
            ArithmeticOp::Lt => "lt",
            ArithmeticOp::And => "and",
            ArithmeticOp::Or => "or",
            ArithmeticOp::Not => "not",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "add" => Some(ArithmeticOp::Add),
            "sub" => Some(ArithmeticOp::Sub),
            "neg" => Some(ArithmeticOp::Neg),
            "eq" => Some(ArithmeticOp::Eq),
            "gt" => Some(ArithmeticOp::Gt),
            "lt" => Some(ArithmeticOp::Lt),
            "and" => Some(ArithmeticOp::And),
            "or" => Some(ArithmeticOp::Or),
            "not" => Some(ArithmeticOp::Not),
            _ => None,
        }
    }
}

/// A single VM command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Push { segment: Segment, index: u16 },
    Pop { segment: Segment, index: u16 },
    Arithmetic(ArithmeticOp),
    Label(String),
    Goto(String),
    IfGoto(String),
    Function { name: String, locals: u16 },
    Call { name: String, args: u16 },
    Return,
}

impl Command {
    /// Parse one preprocessed line (no comments, not blank)
    pub fn parse(line: &str) -> Result<Command, CommandError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let (keyword, operands) = match tokens.split_first() {
            Some((keyword, operands)) => (*keyword, operands),
            None => return Err(CommandError::malformed("empty command")),
        };

        if let Some(op) = ArithmeticOp::from_keyword(keyword) {
            expect_operands(keyword, operands, 0)?;
            return Ok(Command::Arithmetic(op));
        }

        match keyword {
            "push" | "pop" => {
                expect_operands(keyword, operands, 2)?;
                let segment: Segment = operands[0].parse()?;
                let index = parse_number("index", operands[1])?;
                if keyword == "pop" && segment == Segment::Constant {
                    return Err(CommandError::unsupported_segment("cannot pop to constant"));
                }
                if index > segment.max_index() {
                    return Err(CommandError::unsupported_segment(format!(
                        "index {} out of range for segment `{}` (max {})",
                        index,
                        segment,
                        segment.max_index()
                    )));
                }
                if keyword == "push" {
                    Ok(Command::Push { segment, index })
                } else {
                    Ok(Command::Pop { segment, index })
                }
            }
            "label" | "goto" | "if-goto" => {
                expect_operands(keyword, operands, 1)?;
                let name = parse_symbol("label", operands[0])?;
                Ok(match keyword {
                    "label" => Command::Label(name),
                    "goto" => Command::Goto(name),
                    _ => Command::IfGoto(name),
                })
            }
            "function" => {
                expect_operands(keyword, operands, 2)?;
                let name = parse_symbol("function name", operands[0])?;
                let locals = parse_count("local count", operands[1])?;
                Ok(Command::Function { name, locals })
            }
            "call" => {
                expect_operands(keyword, operands, 2)?;
                let name = parse_symbol("function name", operands[0])?;
                let args = parse_count("argument count", operands[1])?;
                Ok(Command::Call { name, args })
            }
            "return" => {
                expect_operands(keyword, operands, 0)?;
                Ok(Command::Return)
            }
            other => Err(CommandError::malformed(format!("unknown command `{}`", other))),
        }
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Push { segment, index } => write!(f, "push {} {}", segment, index),
            Command::Pop { segment, index } => write!(f, "pop {} {}", segment, index),
            Command::Arithmetic(op) => f.write_str(op.keyword()),
            Command::Label(name) => write!(f, "label {}", name),
            Command::Goto(name) => write!(f, "goto {}", name),
            Command::IfGoto(name) => write!(f, "if-goto {}", name),
            Command::Function { name, locals } => write!(f, "function {} {}", name, locals),
            Command::Call { name, args } => write!(f, "call {} {}", name, args),
            Command::Return => f.write_str("return"),
        }
    }
}

fn expect_operands(keyword: &str, operands: &[&str], expected: usize) -> Result<(), CommandError> {
    if operands.len() != expected {
        return Err(CommandError::malformed(format!(
            "`{}` expects {} operand{}, found {}",
            keyword,
            expected,
            if expected == 1 { "" } else { "s" },
            operands.len()
        )));
    }
    Ok(())
}

fn parse_number(what: &str, token: &str) -> Result<u16, CommandError> {
    token.parse::<u16>().map_err(|_| {
        CommandError::malformed(format!("{} `{}` is not a non-negative 16-bit integer", what, token))
    })
}

/// Local and argument counts end up in an address instruction
fn parse_count(what: &str, token: &str) -> Result<u16, CommandError> {
    let count = parse_number(what, token)?;
    if count > MAX_ADDRESS_VALUE {
        return Err(CommandError::malformed(format!(
            "{} {} exceeds {}",
            what, count, MAX_ADDRESS_VALUE
        )));
    }
    Ok(count)
}

fn parse_symbol(what: &str, token: &str) -> Result<String, CommandError> {
    if !is_valid_symbol(token) {
        return Err(CommandError::malformed(format!("invalid {} `{}`", what, token)));
    }
    Ok(token.to_string())
}
