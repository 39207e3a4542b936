//! Error handling for the Hack VM translator
//!
//! `CommandError` describes what is wrong with a single VM command, and
//! `TranslateError` attaches the unit, line and offending text to it. Any
//! error aborts the whole-program translation.

use crate::source_loc::SourceLocation;
use thiserror::Error;

/// Problems detected while parsing or emitting a single VM command
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown keyword, wrong arity, non-numeric operand or invalid symbol
    #[error("malformed command: {0}")]
    Malformed(String),

    /// `pop constant`, unknown segment name or an index the segment cannot address
    #[error("unsupported segment: {0}")]
    UnsupportedSegment(String),
}

impl CommandError {
    pub fn malformed(message: impl Into<String>) -> Self {
        CommandError::Malformed(message.into())
    }

    pub fn unsupported_segment(message: impl Into<String>) -> Self {
        CommandError::UnsupportedSegment(message.into())
    }
}

/// Whole-program translation error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("{location}: {source} in `{text}`")]
    Command {
        location: SourceLocation,
        text: String,
        #[source]
        source: CommandError,
    },

    #[error("no compilation units to translate")]
    NoUnits,

    #[error("duplicate compilation unit `{0}`")]
    DuplicateUnit(String),

    /// The unit name ends up in static symbols and label scopes
    #[error("compilation unit name `{0}` is not a valid assembler symbol")]
    InvalidUnitName(String),

    #[error("label `{0}` is declared more than once")]
    DuplicateLabel(String),
}

impl TranslateError {
    /// Attach a location and the offending source text to a command error
    pub fn at(location: SourceLocation, text: &str, source: CommandError) -> Self {
        TranslateError::Command {
            location,
            text: text.to_string(),
            source,
        }
    }

    /// The underlying command error, if this error came from a VM command
    pub fn command_error(&self) -> Option<&CommandError> {
        match self {
            TranslateError::Command { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            TranslateError::Command { location, .. } => Some(location),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let err = CommandError::malformed("expected 2 operands, found 1");
        assert_eq!(err.to_string(), "malformed command: expected 2 operands, found 1");

        let err = CommandError::unsupported_segment("cannot pop to constant");
        assert_eq!(err.to_string(), "unsupported segment: cannot pop to constant");
    }

    #[test]
    fn test_translate_error_carries_context() {
        let err = TranslateError::at(
            SourceLocation::new("Main", 7),
            "pop constant 3",
            CommandError::unsupported_segment("cannot pop to constant"),
        );

        assert_eq!(
            err.to_string(),
            "Main.vm:7: unsupported segment: cannot pop to constant in `pop constant 3`"
        );
        assert_eq!(err.location(), Some(&SourceLocation::new("Main", 7)));
        assert!(matches!(err.command_error(), Some(CommandError::UnsupportedSegment(_))));
    }

    #[test]
    fn test_program_level_errors() {
        assert_eq!(TranslateError::NoUnits.to_string(), "no compilation units to translate");
        assert_eq!(TranslateError::NoUnits.command_error(), None);
        assert_eq!(
            TranslateError::DuplicateUnit("Main".to_string()).to_string(),
            "duplicate compilation unit `Main`"
        );
        assert_eq!(
            TranslateError::InvalidUnitName("my-prog".to_string()).to_string(),
            "compilation unit name `my-prog` is not a valid assembler symbol"
        );
        assert_eq!(
            TranslateError::DuplicateLabel("END".to_string()).to_string(),
            "label `END` is declared more than once"
        );
        assert_eq!(TranslateError::DuplicateLabel("END".to_string()).location(), None);
    }
}
