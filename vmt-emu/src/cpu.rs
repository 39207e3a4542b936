//! Hack CPU model

use crate::loader::{Instr, Rom};
use log::trace;
use thiserror::Error;
use vmt_codegen::asm::{AsmParseError, Comp, Jump};

/// Words of data memory (15-bit address space)
pub const RAM_SIZE: usize = 0x8000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EmuError {
    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: AsmParseError,
    },

    #[error("memory access at {address} out of range (pc {pc})")]
    MemoryOutOfRange { address: u16, pc: u16 },

    #[error("program counter {0} ran past the end of the program")]
    PcOutOfRange(u16),

    #[error("label `{0}` is declared more than once")]
    DuplicateLabel(String),

    #[error("no halt loop reached within {0} steps")]
    StepLimit(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Running,
    /// Sitting in a `(L) @L 0;JMP` loop
    Halted,
}

pub struct Cpu {
    pub ram: Vec<u16>,
    pub a: u16,
    pub d: u16,
    pub pc: u16,
    pub state: CpuState,
    pub steps: u64,
}

impl Default for Cpu {
    fn default() -> Self {
        Self::new()
    }
}

impl Cpu {
    pub fn new() -> Self {
        Self {
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            state: CpuState::Running,
            steps: 0,
        }
    }

    /// Read a RAM cell as a signed word
    pub fn peek(&self, address: u16) -> Result<i16, EmuError> {
        self.read(address).map(|word| word as i16)
    }

    pub fn poke(&mut self, address: u16, value: i16) -> Result<(), EmuError> {
        self.write(address, value as u16)
    }

    /// Run until the program settles in a halt loop
    pub fn run(&mut self, rom: &Rom, max_steps: u64) -> Result<u64, EmuError> {
        while self.state == CpuState::Running {
            if self.steps >= max_steps {
                return Err(EmuError::StepLimit(max_steps));
            }
            self.step(rom)?;
        }
        Ok(self.steps)
    }

    /// Execute one instruction
    pub fn step(&mut self, rom: &Rom) -> Result<(), EmuError> {
        if is_halt_loop(rom, self.pc) {
            trace!("halt loop at {}", self.pc);
            self.state = CpuState::Halted;
            return Ok(());
        }

        let inst = *rom
            .instructions
            .get(self.pc as usize)
            .ok_or(EmuError::PcOutOfRange(self.pc))?;
        self.steps += 1;

        match inst {
            Instr::Load(value) => {
                self.a = value;
                self.pc += 1;
            }
            Instr::Compute { dest, comp, jump } => {
                let address = self.a;
                let m = if comp.reads_memory() {
                    self.read(address)?
                } else {
                    0
                };
                let value = eval(comp, self.a, self.d, m);

                if let Some(dest) = dest {
                    if dest.writes_m() {
                        self.write(address, value)?;
                    }
                    if dest.writes_a() {
                        self.a = value;
                    }
                    if dest.writes_d() {
                        self.d = value;
                    }
                }

                match jump {
                    Some(jump) if jump.is_taken(value as i16) => self.pc = address,
                    _ => self.pc += 1,
                }
            }
        }
        Ok(())
    }

    fn read(&self, address: u16) -> Result<u16, EmuError> {
        self.ram
            .get(address as usize)
            .copied()
            .ok_or(EmuError::MemoryOutOfRange { address, pc: self.pc })
    }

    fn write(&mut self, address: u16, value: u16) -> Result<(), EmuError> {
        let pc = self.pc;
        let cell = self
            .ram
            .get_mut(address as usize)
            .ok_or(EmuError::MemoryOutOfRange { address, pc })?;
        *cell = value;
        Ok(())
    }
}

/// `@p` that loads its own address followed by an unconditional jump
fn is_halt_loop(rom: &Rom, pc: u16) -> bool {
    let at = pc as usize;
    matches!(
        (rom.instructions.get(at), rom.instructions.get(at + 1)),
        (
            Some(Instr::Load(target)),
            Some(Instr::Compute { comp: Comp::Zero, jump: Some(Jump::JMP), .. })
        ) if *target == pc
    )
}

fn eval(comp: Comp, a: u16, d: u16, m: u16) -> u16 {
    match comp {
        Comp::Zero => 0,
        Comp::One => 1,
        Comp::MinusOne => 0xFFFF,
        Comp::D => d,
        Comp::A => a,
        Comp::M => m,
        Comp::NotD => !d,
        Comp::NotA => !a,
        Comp::NotM => !m,
        Comp::NegD => d.wrapping_neg(),
        Comp::NegA => a.wrapping_neg(),
        Comp::NegM => m.wrapping_neg(),
        Comp::DPlusOne => d.wrapping_add(1),
        Comp::APlusOne => a.wrapping_add(1),
        Comp::MPlusOne => m.wrapping_add(1),
        Comp::DMinusOne => d.wrapping_sub(1),
        Comp::AMinusOne => a.wrapping_sub(1),
        Comp::MMinusOne => m.wrapping_sub(1),
        Comp::DPlusA => d.wrapping_add(a),
        Comp::DPlusM => d.wrapping_add(m),
        Comp::DMinusA => d.wrapping_sub(a),
        Comp::DMinusM => d.wrapping_sub(m),
        Comp::AMinusD => a.wrapping_sub(d),
        Comp::MMinusD => m.wrapping_sub(d),
        Comp::DAndA => d & a,
        Comp::DAndM => d & m,
        Comp::DOrA => d | a,
        Comp::DOrM => d | m,
    }
}
