//! Centralized naming for synthesized symbols
//!
//! Every label the translator invents comes from here. A `NameGenerator`
//! lives for exactly one whole-program translation, so call-site and
//! comparison numbering is program-wide and restarts only with a new run.

/// Label of the terminal loop appended to programs without a bootstrap
pub const HALT_LABEL: &str = "END";

/// Prefix of the label pair declared inside each comparison expansion
const COMPARISON_PREFIX: &str = "CMP";

/// The function whose body the current line belongs to
///
/// `label`, `goto` and `if-goto` targets are qualified with the scope name,
/// so the same local label in two functions never collides. Lines before
/// the first `function` of a unit are scoped to the unit itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionScope {
    name: String,
}

impl FunctionScope {
    pub fn unit_level(unit: &str) -> Self {
        Self { name: unit.to_string() }
    }

    pub fn function(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    /// `<scope>$<label>`
    pub fn qualify(&self, label: &str) -> String {
        format!("{}${}", self.name, label)
    }
}

/// Labels for one comparison expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonLabels {
    pub true_label: String,
    pub end_label: String,
}

#[derive(Debug)]
pub struct NameGenerator {
    next_call_site: u32,
    next_comparison: u32,
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl NameGenerator {
    pub fn new() -> Self {
        Self {
            next_call_site: 1,
            next_comparison: 1,
        }
    }

    /// `<function>$ret.<n>`, unique for every translated call
    pub fn return_label(&mut self, function: &str) -> String {
        let id = self.next_call_site;
        self.next_call_site += 1;
        format!("{}$ret.{}", function, id)
    }

    pub fn comparison_labels(&mut self) -> ComparisonLabels {
        let id = self.next_comparison;
        self.next_comparison += 1;
        ComparisonLabels {
            true_label: format!("{}$TRUE.{}", COMPARISON_PREFIX, id),
            end_label: format!("{}$END.{}", COMPARISON_PREFIX, id),
        }
    }

    /// Number of call sites named so far
    pub fn call_sites(&self) -> u32 {
        self.next_call_site - 1
    }

    /// Number of comparison expansions named so far
    pub fn comparisons(&self) -> u32 {
        self.next_comparison - 1
    }
}

/// `<unit>.<index>`, resolved to a RAM cell by the assembler
pub fn static_symbol(unit: &str, index: u16) -> String {
    format!("{}.{}", unit, index)
}
