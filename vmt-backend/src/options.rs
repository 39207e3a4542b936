//! Translation options
//!
//! Options deserialize from JSON with every field optional, so a config file
//! only needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// When to prepend the `Sys.init` bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BootstrapPolicy {
    /// Only for programs made of more than one unit
    #[default]
    Auto,
    Always,
    Never,
}

impl BootstrapPolicy {
    pub fn applies_to(self, unit_count: usize) -> bool {
        match self {
            BootstrapPolicy::Auto => unit_count > 1,
            BootstrapPolicy::Always => true,
            BootstrapPolicy::Never => false,
        }
    }
}

impl fmt::Display for BootstrapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BootstrapPolicy::Auto => write!(f, "auto"),
            BootstrapPolicy::Always => write!(f, "always"),
            BootstrapPolicy::Never => write!(f, "never"),
        }
    }
}

impl FromStr for BootstrapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(BootstrapPolicy::Auto),
            "always" => Ok(BootstrapPolicy::Always),
            "never" => Ok(BootstrapPolicy::Never),
            other => Err(format!(
                "unknown bootstrap policy `{}` (expected auto, always or never)",
                other
            )),
        }
    }
}

/// Options for one whole-program translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Precede each fragment with its VM source line as a comment
    pub emit_source_comments: bool,
    pub bootstrap: BootstrapPolicy,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            emit_source_comments: true,
            bootstrap: BootstrapPolicy::Auto,
        }
    }
}
