//! Hack VM Translator - Backend
//!
//! This crate translates VM commands into Hack assembly: parsing the command
//! vocabulary, expanding each command into an instruction fragment, and
//! merging compilation units into one program.

pub mod command;
pub mod emitter;
pub mod naming;
pub mod options;
pub mod preprocess;
pub mod program;
pub mod translator;

pub use command::{ArithmeticOp, Command, Segment};
pub use emitter::{CommandEmitter, EmitContext};
pub use naming::{FunctionScope, NameGenerator};
pub use options::{BootstrapPolicy, TranslateOptions};
pub use program::{Program, ProgramAssembler};
pub use translator::{CompilationUnit, Fragment, UnitTranslator};
pub use vmt_common::{CommandError, SourceLocation, TranslateError};

/// Translate a whole program with the given options
pub fn translate_program(
    units: &[CompilationUnit],
    options: TranslateOptions,
) -> Result<Program, TranslateError> {
    ProgramAssembler::new(options).assemble(units)
}
