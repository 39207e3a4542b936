//! Unit translator
//!
//! Drives one compilation unit through preprocessing, parsing and the
//! command emitter, producing one fragment per kept source line.

use crate::command::Command;
use crate::emitter::{CommandEmitter, EmitContext};
use crate::naming::FunctionScope;
use crate::options::TranslateOptions;
use crate::preprocess::{self, SourceLine};
use log::debug;
use vmt_codegen::asm::{is_valid_symbol, HackInst};
use vmt_common::{SourceLocation, TranslateError};

/// One source file's commands; its name scopes the `static` segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilationUnit {
    pub name: String,
    pub source: String,
}

impl CompilationUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// The instructions produced for one VM source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub location: SourceLocation,
    pub text: String,
    pub instructions: Vec<HackInst>,
}

pub struct UnitTranslator<'a> {
    emitter: &'a mut CommandEmitter,
    options: &'a TranslateOptions,
}

impl<'a> UnitTranslator<'a> {
    pub fn new(emitter: &'a mut CommandEmitter, options: &'a TranslateOptions) -> Self {
        Self { emitter, options }
    }

    pub fn translate(&mut self, unit: &CompilationUnit) -> Result<Vec<Fragment>, TranslateError> {
        debug!("Translating unit {}", unit.name);
        if !is_valid_symbol(&unit.name) {
            return Err(TranslateError::InvalidUnitName(unit.name.clone()));
        }

        let mut scope = FunctionScope::unit_level(&unit.name);
        let mut fragments = Vec::new();

        for SourceLine { line, text } in preprocess::source_lines(&unit.source) {
            let location = SourceLocation::new(&unit.name, line);
            let command = Command::parse(&text)
                .map_err(|e| TranslateError::at(location.clone(), &text, e))?;

            if let Command::Function { name, locals } = &command {
                debug!("  function {} ({} locals) at {}", name, locals, location);
                scope = FunctionScope::function(name);
            }

            let ctx = EmitContext {
                unit: &unit.name,
                scope: &scope,
            };
            let mut instructions = Vec::new();
            if self.options.emit_source_comments {
                instructions.push(HackInst::comment(text.as_str()));
            }
            instructions.extend(
                self.emitter
                    .emit(&command, &ctx)
                    .map_err(|e| TranslateError::at(location.clone(), &text, e))?,
            );

            fragments.push(Fragment {
                location,
                text,
                instructions,
            });
        }

        debug!("Unit {} produced {} fragments", unit.name, fragments.len());
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use vmt_common::CommandError;

    fn translate(source: &str) -> Result<Vec<Fragment>, TranslateError> {
        let mut emitter = CommandEmitter::new();
        let options = TranslateOptions::default();
        UnitTranslator::new(&mut emitter, &options).translate(&CompilationUnit::new("Main", source))
    }

    fn labels(fragments: &[Fragment]) -> Vec<String> {
        fragments
            .iter()
            .flat_map(|f| f.instructions.iter())
            .filter_map(|i| match i {
                HackInst::Label(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_one_fragment_per_kept_line() {
        let fragments = translate(indoc! {"
            // Adds two numbers
            push constant 7

            push constant 8 // second
            add
        "})
        .unwrap();

        assert_eq!(fragments.len(), 3);
        assert_eq!(fragments[1].text, "push constant 8");
        assert_eq!(fragments[1].location, SourceLocation::new("Main", 4));
        assert_eq!(fragments[2].instructions[0], HackInst::comment("add"));
    }

    #[test]
    fn test_comments_can_be_disabled() {
        let mut emitter = CommandEmitter::new();
        let options = TranslateOptions {
            emit_source_comments: false,
            ..TranslateOptions::default()
        };
        let fragments = UnitTranslator::new(&mut emitter, &options)
            .translate(&CompilationUnit::new("Main", "push constant 1"))
            .unwrap();
        assert!(fragments[0]
            .instructions
            .iter()
            .all(|i| !matches!(i, HackInst::Comment(_))));
    }

    #[test]
    fn test_same_label_in_two_functions() {
        let fragments = translate(indoc! {"
            function Main.a 0
            label LOOP
            goto LOOP
            function Main.b 0
            label LOOP
            goto LOOP
        "})
        .unwrap();

        assert_eq!(
            labels(&fragments),
            vec!["Main.a", "Main.a$LOOP", "Main.b", "Main.b$LOOP"]
        );
    }

    #[test]
    fn test_labels_before_any_function_use_unit_scope() {
        let fragments = translate("label START\ngoto START").unwrap();
        assert_eq!(labels(&fragments), vec!["Main$START"]);
    }

    #[test]
    fn test_error_reports_unit_line_and_text() {
        let err = translate("push constant 1\n\npop constant 1\nadd").unwrap_err();
        assert_eq!(
            err,
            TranslateError::at(
                SourceLocation::new("Main", 3),
                "pop constant 1",
                CommandError::unsupported_segment("cannot pop to constant"),
            )
        );
    }

    #[test]
    fn test_unknown_command_fails() {
        let err = translate("push constant 1\nmul").unwrap_err();
        assert!(matches!(err.command_error(), Some(CommandError::Malformed(_))));
        assert_eq!(err.location().unwrap().line, 2);
    }

    #[test]
    fn test_unit_name_must_be_a_symbol() {
        let mut emitter = CommandEmitter::new();
        let options = TranslateOptions::default();
        let mut translator = UnitTranslator::new(&mut emitter, &options);

        for name in ["my-prog", "1st", "has space", ""] {
            let err = translator
                .translate(&CompilationUnit::new(name, "push static 0
pop static 1"))
                .unwrap_err();
            assert_eq!(err, TranslateError::InvalidUnitName(name.to_string()));
        }
        assert!(translator
            .translate(&CompilationUnit::new("My_Prog2", "push static 0"))
            .is_ok());
    }

    #[test]
    fn test_empty_unit_produces_nothing() {
        assert!(translate("// nothing here\n").unwrap().is_empty());
    }
}
