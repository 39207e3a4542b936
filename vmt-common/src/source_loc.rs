//! Source location tracking for error reporting
//!
//! VM source is line oriented, so a location is just the compilation unit
//! and a 1-based line number in the original (unstripped) text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line within a compilation unit (line is 1-based)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub unit: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(unit: &str, line: u32) -> Self {
        Self {
            unit: unit.to_string(),
            line,
        }
    }

    /// Create a dummy location for testing
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.vm:{}", self.unit, self.line)
    }
}
