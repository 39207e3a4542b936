//! Input discovery and output paths

use anyhow::{anyhow, bail, Context, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use vmt_backend::CompilationUnit;

const SOURCE_EXTENSION: &str = "vm";
const OUTPUT_EXTENSION: &str = "asm";

fn has_source_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
}

/// The `.vm` files making up the program at `input`, in translation order
pub fn discover(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_dir() {
        let mut files = Vec::new();
        let entries = fs::read_dir(input)
            .with_context(|| format!("failed to read directory {}", input.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && has_source_extension(&path) {
                files.push(path);
            }
        }
        if files.is_empty() {
            bail!("no .vm files in {}", input.display());
        }
        files.sort();
        debug!("Found {} source file(s) in {}", files.len(), input.display());
        Ok(files)
    } else if input.is_file() {
        if !has_source_extension(input) {
            bail!("{} is not a .vm file", input.display());
        }
        Ok(vec![input.to_path_buf()])
    } else {
        bail!("{} does not exist", input.display())
    }
}

/// Unit name of a source file: its stem
pub fn unit_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("cannot derive a unit name from {}", path.display()))
}

pub fn read_units(files: &[PathBuf]) -> Result<Vec<CompilationUnit>> {
    files
        .iter()
        .map(|path| {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(CompilationUnit::new(unit_name(path)?, source))
        })
        .collect()
}

/// `X.asm` beside `X.vm`, or `<dir>/<dirname>.asm` for a directory
pub fn default_output(input: &Path) -> Result<PathBuf> {
    if !input.is_dir() {
        return Ok(input.with_extension(OUTPUT_EXTENSION));
    }
    // `.` and similar have no file name until resolved
    let resolved = fs::canonicalize(input)
        .with_context(|| format!("failed to resolve {}", input.display()))?;
    let name = resolved
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| anyhow!("cannot name output for {}", input.display()))?;
    Ok(input.join(format!("{}.{}", name, OUTPUT_EXTENSION)))
}
