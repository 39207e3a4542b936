//! Assembly loading and symbol resolution

use crate::cpu::EmuError;
use log::debug;
use std::collections::HashMap;
use vmt_codegen::abi::{predefined_symbols, FIRST_VARIABLE_ADDRESS};
use vmt_codegen::asm::{Address, Comp, Dest, HackInst, Jump};

/// One word of program memory with symbols resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Load(u16),
    Compute {
        dest: Option<Dest>,
        comp: Comp,
        jump: Option<Jump>,
    },
}

/// A loaded program
#[derive(Debug, Clone)]
pub struct Rom {
    pub instructions: Vec<Instr>,
    /// Label name -> program address
    pub labels: HashMap<String, u16>,
    /// Variable name -> RAM address, for symbols that were neither
    /// predefined nor declared as labels
    pub variables: HashMap<String, u16>,
}

impl Rom {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn label(&self, name: &str) -> Option<u16> {
        self.labels.get(name).copied()
    }

    pub fn variable(&self, name: &str) -> Option<u16> {
        self.variables.get(name).copied()
    }
}

/// Parse and resolve assembly text
pub fn load_program(text: &str) -> Result<Rom, EmuError> {
    let mut parsed = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let code = match line.find("//") {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();
        if code.is_empty() {
            continue;
        }
        let inst: HackInst = code.parse().map_err(|source| EmuError::Parse {
            line: idx + 1,
            source,
        })?;
        parsed.push(inst);
    }

    // First pass: label addresses
    let mut labels = HashMap::new();
    let mut address: u16 = 0;
    for inst in &parsed {
        match inst {
            HackInst::Label(name) => {
                if labels.insert(name.clone(), address).is_some() {
                    return Err(EmuError::DuplicateLabel(name.clone()));
                }
            }
            inst if inst.is_executable() => address += 1,
            _ => {}
        }
    }

    // Second pass: resolve symbols, allocating variables on first use
    let predefined: HashMap<String, u16> = predefined_symbols().into_iter().collect();
    let mut variables = HashMap::new();
    let mut next_variable = FIRST_VARIABLE_ADDRESS;
    let mut instructions = Vec::with_capacity(address as usize);
    for inst in parsed {
        match inst {
            HackInst::At(Address::Value(value)) => instructions.push(Instr::Load(value)),
            HackInst::At(Address::Symbol(name)) => {
                let known = predefined.get(&name).or_else(|| labels.get(&name)).copied();
                let value = match known {
                    Some(value) => value,
                    None => *variables.entry(name).or_insert_with(|| {
                        let allocated = next_variable;
                        next_variable += 1;
                        allocated
                    }),
                };
                instructions.push(Instr::Load(value));
            }
            HackInst::Compute { dest, comp, jump } => {
                instructions.push(Instr::Compute { dest, comp, jump })
            }
            HackInst::Label(_) | HackInst::Comment(_) => {}
        }
    }

    debug!(
        "Loaded {} instructions, {} labels, {} variables",
        instructions.len(),
        labels.len(),
        variables.len()
    );
    Ok(Rom {
        instructions,
        labels,
        variables,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    #[test]
    fn test_labels_resolve_to_next_instruction() {
        let rom = load_program(indoc! {"
            // comment
            @LOOP
            (LOOP)
            D=D+1 // trailing
            (AFTER)
            @LOOP
            0;JMP
        "})
        .unwrap();

        assert_eq!(rom.len(), 4);
        assert_eq!(rom.label("LOOP"), Some(1));
        assert_eq!(rom.label("AFTER"), Some(2));
        assert_eq!(rom.instructions[0], Instr::Load(1));
    }

    #[test]
    fn test_variables_allocated_from_16() {
        let rom = load_program("@Main.0\n@Main.1\n@Main.0\n@SP\n@R13\n@SCREEN").unwrap();
        assert_eq!(rom.variable("Main.0"), Some(16));
        assert_eq!(rom.variable("Main.1"), Some(17));
        assert_eq!(
            rom.instructions,
            vec![
                Instr::Load(16),
                Instr::Load(17),
                Instr::Load(16),
                Instr::Load(0),
                Instr::Load(13),
                Instr::Load(16384),
            ]
        );
    }

    #[test]
    fn test_duplicate_label_is_rejected() {
        let err = load_program("(END)\n@END\n0;JMP\n(END)\n@END\n0;JMP").unwrap_err();
        assert_eq!(err, EmuError::DuplicateLabel("END".to_string()));
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = load_program("@1\nD=D*A").unwrap_err();
        assert!(matches!(err, EmuError::Parse { line: 2, .. }));
    }
}
