//! Hack Assembly Instruction Definitions
//!
//! This module defines the instruction model of the Hack platform: one data
//! register (D), one address register (A) and the memory cell it selects (M).

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest value an address instruction can load (15 bits)
pub const MAX_ADDRESS_VALUE: u16 = 0x7FFF;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmParseError {
    #[error("invalid instruction `{text}`: {reason}")]
    Invalid { text: String, reason: String },
}

impl AsmParseError {
    fn invalid(text: &str, reason: impl Into<String>) -> Self {
        AsmParseError::Invalid {
            text: text.to_string(),
            reason: reason.into(),
        }
    }
}

/// Destination of a compute instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dest {
    M, D, MD, A, AM, AD, AMD,
}

impl Dest {
    pub fn writes_a(self) -> bool {
        matches!(self, Dest::A | Dest::AM | Dest::AD | Dest::AMD)
    }

    pub fn writes_d(self) -> bool {
        matches!(self, Dest::D | Dest::MD | Dest::AD | Dest::AMD)
    }

    pub fn writes_m(self) -> bool {
        matches!(self, Dest::M | Dest::MD | Dest::AM | Dest::AMD)
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Dest::M => "M",
            Dest::D => "D",
            Dest::MD => "MD",
            Dest::A => "A",
            Dest::AM => "AM",
            Dest::AD => "AD",
            Dest::AMD => "AMD",
        };
        f.write_str(text)
    }
}

impl FromStr for Dest {
    type Err = AsmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Dest::M),
            "D" => Ok(Dest::D),
            "MD" | "DM" => Ok(Dest::MD),
            "A" => Ok(Dest::A),
            "AM" | "MA" => Ok(Dest::AM),
            "AD" | "DA" => Ok(Dest::AD),
            "AMD" | "ADM" | "MAD" | "MDA" | "DAM" | "DMA" => Ok(Dest::AMD),
            _ => Err(AsmParseError::invalid(s, "unknown destination")),
        }
    }
}

/// Jump condition of a compute instruction, tested against the computed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Jump {
    JGT, JEQ, JGE, JLT, JNE, JLE, JMP,
}

impl Jump {
    /// Whether the jump is taken for the given computed value
    pub fn is_taken(self, value: i16) -> bool {
        match self {
            Jump::JGT => value > 0,
            Jump::JEQ => value == 0,
            Jump::JGE => value >= 0,
            Jump::JLT => value < 0,
            Jump::JNE => value != 0,
            Jump::JLE => value <= 0,
            Jump::JMP => true,
        }
    }
}

impl fmt::Display for Jump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Jump::JGT => "JGT",
            Jump::JEQ => "JEQ",
            Jump::JGE => "JGE",
            Jump::JLT => "JLT",
            Jump::JNE => "JNE",
            Jump::JLE => "JLE",
            Jump::JMP => "JMP",
        };
        f.write_str(text)
    }
}

impl FromStr for Jump {
    type Err = AsmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "JGT" => Ok(Jump::JGT),
            "JEQ" => Ok(Jump::JEQ),
            "JGE" => Ok(Jump::JGE),
            "JLT" => Ok(Jump::JLT),
            "JNE" => Ok(Jump::JNE),
            "JLE" => Ok(Jump::JLE),
            "JMP" => Ok(Jump::JMP),
            _ => Err(AsmParseError::invalid(s, "unknown jump condition")),
        }
    }
}

/// The computations the Hack ALU can perform
///
/// Every variant that reads A has an M twin that reads the memory cell
/// selected by A instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    A,
    M,
    NotD,
    NotA,
    NotM,
    NegD,
    NegA,
    NegM,
    DPlusOne,
    APlusOne,
    MPlusOne,
    DMinusOne,
    AMinusOne,
    MMinusOne,
    DPlusA,
    DPlusM,
    DMinusA,
    DMinusM,
    AMinusD,
    MMinusD,
    DAndA,
    DAndM,
    DOrA,
    DOrM,
}

impl Comp {
    pub const ALL: [Comp; 28] = [
        Comp::Zero, Comp::One, Comp::MinusOne,
        Comp::D, Comp::A, Comp::M,
        Comp::NotD, Comp::NotA, Comp::NotM,
        Comp::NegD, Comp::NegA, Comp::NegM,
        Comp::DPlusOne, Comp::APlusOne, Comp::MPlusOne,
        Comp::DMinusOne, Comp::AMinusOne, Comp::MMinusOne,
        Comp::DPlusA, Comp::DPlusM,
        Comp::DMinusA, Comp::DMinusM,
        Comp::AMinusD, Comp::MMinusD,
        Comp::DAndA, Comp::DAndM,
        Comp::DOrA, Comp::DOrM,
    ];

    pub fn mnemonic(self) -> &'static str {
        match self {
            Comp::Zero => "0",
            Comp::One => "1",
            Comp::MinusOne => "-1",
            Comp::D => "D",
            Comp::A => "A",
            Comp::M => "M",
            Comp::NotD => "!D",
            Comp::NotA => "!A",
            Comp::NotM => "!M",
            Comp::NegD => "-D",
            Comp::NegA => "-A",
            Comp::NegM => "-M",
            Comp::DPlusOne => "D+1",
            Comp::APlusOne => "A+1",
            Comp::MPlusOne => "M+1",
            Comp::DMinusOne => "D-1",
            Comp::AMinusOne => "A-1",
            Comp::MMinusOne => "M-1",
            Comp::DPlusA => "D+A",
            Comp::DPlusM => "D+M",
            Comp::DMinusA => "D-A",
            Comp::DMinusM => "D-M",
            Comp::AMinusD => "A-D",
            Comp::MMinusD => "M-D",
            Comp::DAndA => "D&A",
            Comp::DAndM => "D&M",
            Comp::DOrA => "D|A",
            Comp::DOrM => "D|M",
        }
    }

    /// Whether the computation reads the memory cell selected by A
    pub fn reads_memory(self) -> bool {
        self.mnemonic().contains('M')
    }
}

impl fmt::Display for Comp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for Comp {
    type Err = AsmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Commutative spellings some hand-written programs use
        let canonical = match s {
            "1+D" => "D+1",
            "1+A" => "A+1",
            "1+M" => "M+1",
            "A+D" => "D+A",
            "M+D" => "D+M",
            "A&D" => "D&A",
            "M&D" => "D&M",
            "A|D" => "D|A",
            "M|D" => "D|M",
            other => other,
        };
        Comp::ALL
            .iter()
            .copied()
            .find(|comp| comp.mnemonic() == canonical)
            .ok_or_else(|| AsmParseError::invalid(s, "unknown computation"))
    }
}

/// Operand of an address instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Literal value, at most 15 bits
    Value(u16),
    /// Symbol resolved by the assembler (label, predefined or variable)
    Symbol(String),
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Value(value) => write!(f, "{}", value),
            Address::Symbol(name) => f.write_str(name),
        }
    }
}

impl From<u16> for Address {
    fn from(value: u16) -> Self {
        Address::Value(value)
    }
}

impl From<&str> for Address {
    fn from(name: &str) -> Self {
        Address::Symbol(name.to_string())
    }
}

impl From<String> for Address {
    fn from(name: String) -> Self {
        Address::Symbol(name)
    }
}

/// Check that a name can be used as an assembler symbol
///
/// Symbols are letters, digits, `_`, `.`, `$` and `:`, and must not start
/// with a digit.
pub fn is_valid_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if !first.is_ascii_digit() && is_symbol_char(first) => {}
        _ => return false,
    }
    chars.all(is_symbol_char)
}

fn is_symbol_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '$' | ':')
}

/// Hack Assembly Instructions
///
/// `At` and `Compute` occupy one word of program memory each. `Label`
/// declares a symbol for the address of the next real instruction and
/// `Comment` is dropped by the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HackInst {
    At(Address),
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
    Label(String),
    Comment(String),
}

impl HackInst {
    pub fn at(address: impl Into<Address>) -> Self {
        HackInst::At(address.into())
    }

    /// `dest=comp`
    pub fn assign(dest: Dest, comp: Comp) -> Self {
        HackInst::Compute { dest: Some(dest), comp, jump: None }
    }

    /// `comp;jump`
    pub fn branch(comp: Comp, jump: Jump) -> Self {
        HackInst::Compute { dest: None, comp, jump: Some(jump) }
    }

    pub fn label(name: impl Into<String>) -> Self {
        HackInst::Label(name.into())
    }

    pub fn comment(text: impl Into<String>) -> Self {
        HackInst::Comment(text.into())
    }

    /// Whether this occupies a word of program memory
    pub fn is_executable(&self) -> bool {
        matches!(self, HackInst::At(_) | HackInst::Compute { .. })
    }
}

impl fmt::Display for HackInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HackInst::At(address) => write!(f, "@{}", address),
            HackInst::Compute { dest, comp, jump } => {
                if let Some(dest) = dest {
                    write!(f, "{}=", dest)?;
                }
                write!(f, "{}", comp)?;
                if let Some(jump) = jump {
                    write!(f, ";{}", jump)?;
                }
                Ok(())
            }
            HackInst::Label(name) => write!(f, "({})", name),
            HackInst::Comment(text) => write!(f, "// {}", text),
        }
    }
}

impl FromStr for HackInst {
    type Err = AsmParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();

        if let Some(text) = line.strip_prefix("//") {
            return Ok(HackInst::Comment(text.trim().to_string()));
        }

        if let Some(rest) = line.strip_prefix('(') {
            let name = rest
                .strip_suffix(')')
                .ok_or_else(|| AsmParseError::invalid(line, "unterminated label"))?;
            if !is_valid_symbol(name) {
                return Err(AsmParseError::invalid(line, "invalid label name"));
            }
            return Ok(HackInst::Label(name.to_string()));
        }

        if let Some(operand) = line.strip_prefix('@') {
            if operand.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                let value: u16 = operand
                    .parse()
                    .map_err(|_| AsmParseError::invalid(line, "invalid numeric address"))?;
                if value > MAX_ADDRESS_VALUE {
                    return Err(AsmParseError::invalid(line, "address exceeds 15 bits"));
                }
                return Ok(HackInst::At(Address::Value(value)));
            }
            if !is_valid_symbol(operand) {
                return Err(AsmParseError::invalid(line, "invalid symbol"));
            }
            return Ok(HackInst::At(Address::Symbol(operand.to_string())));
        }

        let (dest, rest) = match line.split_once('=') {
            Some((dest, rest)) => (Some(dest.trim().parse::<Dest>()?), rest),
            None => (None, line),
        };
        let (comp, jump) = match rest.split_once(';') {
            Some((comp, jump)) => (comp.trim(), Some(jump.trim().parse::<Jump>()?)),
            None => (rest.trim(), None),
        };
        if dest.is_none() && jump.is_none() {
            return Err(AsmParseError::invalid(line, "compute instruction has no effect"));
        }

        Ok(HackInst::Compute {
            dest,
            comp: comp.parse()?,
            jump,
        })
    }
}
