//! Comment and blank-line stripping
//!
//! Kept lines remember their original 1-based line number so errors can
//! point back into the unmodified file.

/// A non-blank source line with comments removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub line: u32,
    pub text: String,
}

pub fn source_lines(source: &str) -> Vec<SourceLine> {
    source
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let code = match raw.find("//") {
                Some(pos) => &raw[..pos],
                None => raw,
            };
            let text = code.trim();
            if text.is_empty() {
                None
            } else {
                Some(SourceLine {
                    line: idx as u32 + 1,
                    text: text.to_string(),
                })
            }
        })
        .collect()
}
