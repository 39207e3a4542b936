//! Program assembler
//!
//! Merges every unit's fragments into one program in a single pass, so the
//! call-site numbering stays consistent across units, and adds either the
//! bootstrap prefix or the terminal halt loop.

use crate::emitter::CommandEmitter;
use crate::options::TranslateOptions;
use crate::translator::{CompilationUnit, UnitTranslator};
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;
use vmt_codegen::asm::HackInst;
use vmt_codegen::emit_instructions;
use vmt_common::TranslateError;

/// A fully translated program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<HackInst>,
    pub has_bootstrap: bool,
}

impl Program {
    pub fn to_asm(&self) -> String {
        emit_instructions(&self.instructions)
    }

    /// Number of instructions that occupy program memory
    pub fn executable_len(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_executable()).count()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_asm())
    }
}

pub struct ProgramAssembler {
    options: TranslateOptions,
}

impl ProgramAssembler {
    pub fn new(options: TranslateOptions) -> Self {
        Self { options }
    }

    pub fn assemble(&self, units: &[CompilationUnit]) -> Result<Program, TranslateError> {
        if units.is_empty() {
            return Err(TranslateError::NoUnits);
        }
        let mut seen = HashSet::new();
        for unit in units {
            if !seen.insert(unit.name.as_str()) {
                return Err(TranslateError::DuplicateUnit(unit.name.clone()));
            }
        }

        // Fresh per run: numbering must never carry over between programs
        let mut emitter = CommandEmitter::new();
        let has_bootstrap = self.options.bootstrap.applies_to(units.len());
        let mut instructions = Vec::new();

        if has_bootstrap {
            debug!("Prepending bootstrap");
            if self.options.emit_source_comments {
                instructions.push(HackInst::comment("bootstrap"));
            }
            instructions.extend(emitter.bootstrap());
        }

        for unit in units {
            let fragments = UnitTranslator::new(&mut emitter, &self.options).translate(unit)?;
            for fragment in fragments {
                instructions.extend(fragment.instructions);
            }
        }

        if !has_bootstrap {
            debug!("Appending halt loop");
            if self.options.emit_source_comments {
                instructions.push(HackInst::comment("halt"));
            }
            instructions.extend(emitter.halt_loop());
        }

        check_unique_labels(&instructions)?;

        let program = Program {
            instructions,
            has_bootstrap,
        };
        info!(
            "Translated {} unit(s): {} instructions, {} call sites, {} comparisons",
            units.len(),
            program.executable_len(),
            emitter.names().call_sites(),
            emitter.names().comparisons()
        );
        Ok(program)
    }
}

/// User labels share one namespace with the synthesized ones
fn check_unique_labels(instructions: &[HackInst]) -> Result<(), TranslateError> {
    let mut declared = HashSet::new();
    for inst in instructions {
        if let HackInst::Label(name) = inst {
            if !declared.insert(name.as_str()) {
                return Err(TranslateError::DuplicateLabel(name.clone()));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::BootstrapPolicy;
    use pretty_assertions::assert_eq;

    fn lines(program: &Program) -> Vec<String> {
        program
            .instructions
            .iter()
            .filter(|i| !matches!(i, HackInst::Comment(_)))
            .map(|i| i.to_string())
            .collect()
    }

    fn assemble(units: &[CompilationUnit]) -> Program {
        ProgramAssembler::new(TranslateOptions::default()).assemble(units).unwrap()
    }

    #[test]
    fn test_single_unit_ends_with_halt_loop() {
        let program = assemble(&[CompilationUnit::new("Simple", "push constant 1")]);
        let lines = lines(&program);

        assert!(!program.has_bootstrap);
        assert_eq!(&lines[lines.len() - 3..], &["(END)", "@END", "0;JMP"]);
        assert!(!lines.iter().any(|l| l.contains("Sys.init")));
    }

    #[test]
    fn test_multi_unit_starts_with_bootstrap() {
        let program = assemble(&[
            CompilationUnit::new("Sys", "function Sys.init 0\ncall Main.main 0"),
            CompilationUnit::new("Main", "function Main.main 0\npush constant 0\nreturn"),
        ]);
        let lines = lines(&program);

        assert!(program.has_bootstrap);
        assert_eq!(&lines[..4], &["@256", "D=A", "@SP", "M=D"]);
        assert_eq!(lines[4], "@Sys.init$ret.1");
        assert!(lines.contains(&"(Sys.init$ret.1)".to_string()));
        assert!(lines.contains(&"(Main.main$ret.2)".to_string()));
        assert!(!lines.contains(&"(END)".to_string()));
    }

    #[test]
    fn test_call_counter_spans_units() {
        let program = assemble(&[
            CompilationUnit::new("A", "function A.f 0\ncall B.g 0\ncall B.g 0"),
            CompilationUnit::new("B", "function B.g 0\ncall A.f 0"),
        ]);
        let return_labels: Vec<String> = lines(&program)
            .into_iter()
            .filter(|l| l.starts_with('(') && l.contains("$ret."))
            .collect();
        assert_eq!(
            return_labels,
            vec!["(Sys.init$ret.1)", "(B.g$ret.2)", "(B.g$ret.3)", "(A.f$ret.4)"]
        );
    }

    #[test]
    fn test_each_run_restarts_numbering() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        let units = [CompilationUnit::new("Main", "call Main.f 0")];
        let first = assembler.assemble(&units).unwrap();
        let second = assembler.assemble(&units).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_bootstrap_policy_override() {
        let options = TranslateOptions {
            bootstrap: BootstrapPolicy::Always,
            ..TranslateOptions::default()
        };
        let program = ProgramAssembler::new(options)
            .assemble(&[CompilationUnit::new("Sys", "function Sys.init 0")])
            .unwrap();
        assert!(program.has_bootstrap);
        assert!(!lines(&program).contains(&"(END)".to_string()));
    }

    #[test]
    fn test_no_units_and_duplicates() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        assert_eq!(assembler.assemble(&[]), Err(TranslateError::NoUnits));
        assert_eq!(
            assembler.assemble(&[CompilationUnit::new("A", ""), CompilationUnit::new("A", "")]),
            Err(TranslateError::DuplicateUnit("A".to_string()))
        );
    }

    #[test]
    fn test_user_label_colliding_with_comparison_label() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        let result = assembler.assemble(&[CompilationUnit::new(
            "CMP",
            "function CMP 0\npush constant 1\npush constant 1\neq\nlabel TRUE.1\nreturn",
        )]);
        assert_eq!(result, Err(TranslateError::DuplicateLabel("CMP$TRUE.1".to_string())));
    }

    #[test]
    fn test_function_named_like_halt_label() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        let result = assembler.assemble(&[CompilationUnit::new(
            "Main",
            "function END 0\npush constant 0\nreturn",
        )]);
        assert_eq!(result, Err(TranslateError::DuplicateLabel("END".to_string())));
    }

    #[test]
    fn test_function_defined_in_two_units() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        let result = assembler.assemble(&[
            CompilationUnit::new("A", "function Main.f 0\nreturn"),
            CompilationUnit::new("B", "label X\nfunction Main.f 0\nreturn"),
        ]);
        assert_eq!(result, Err(TranslateError::DuplicateLabel("Main.f".to_string())));
    }

    #[test]
    fn test_invalid_unit_name_is_rejected() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        let result = assembler.assemble(&[CompilationUnit::new("my-prog", "push static 0\npop static 1")]);
        assert_eq!(result, Err(TranslateError::InvalidUnitName("my-prog".to_string())));
    }

    #[test]
    fn test_error_aborts_whole_program() {
        let assembler = ProgramAssembler::new(TranslateOptions::default());
        let result = assembler.assemble(&[
            CompilationUnit::new("Good", "function Good.f 0\nreturn"),
            CompilationUnit::new("Bad", "function Bad.f 0\npush nowhere 1"),
        ]);
        let err = result.unwrap_err();
        assert_eq!(err.location().unwrap().unit, "Bad");
    }

    #[test]
    fn test_asm_text_is_newline_terminated() {
        let program = assemble(&[CompilationUnit::new("Main", "push constant 2")]);
        let asm = program.to_asm();
        assert!(asm.starts_with("// push constant 2\n@2\nD=A\n"));
        assert!(asm.ends_with("(END)\n@END\n0;JMP\n"));
        assert_eq!(program.to_string(), asm);
    }
}
