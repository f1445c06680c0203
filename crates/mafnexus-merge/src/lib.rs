//! mafnexus-merge — union of several MAF files into one.
//!
//! - `header`: ordered header union with optional strict validation
//! - `rows`: rectangular row assembly against the union header
//! - front ends for explicit paths, a directory, or a list file

pub mod header;
pub mod rows;

use std::path::{Path, PathBuf};

use mafnexus_common::{write_maf, MafNexusError, Result};
use tracing::info;

pub use header::{merge_headers, LEADING_COLUMNS};
pub use rows::merge_data;

/// Write the merged table and return its absolute path.
pub fn dump_to(headers: &[String], rows: &[Vec<String>], path: &Path) -> Result<PathBuf> {
    write_maf(path, &[], headers, rows)
}

/// Merge `files` (in order) into `output`. `source` names the caller's input
/// in the error raised when fewer than two files survive validation.
fn merge_into(files: &[PathBuf], output: &Path, strict: bool, source: &str) -> Result<PathBuf> {
    let (headers, valid) = merge_headers(files, strict)?;
    match valid.len() {
        0 => {
            return Err(MafNexusError::MergeFailed(format!(
                "No valid MAF files found in {}, nothing to merge",
                source
            )))
        }
        1 => {
            return Err(MafNexusError::MergeFailed(format!(
                "Only one valid MAF file found in {} ({}), nothing to merge",
                source,
                valid[0].display()
            )))
        }
        _ => {}
    }

    let rows = merge_data(&headers, &valid)?;
    let path = dump_to(&headers, &rows, output)?;
    info!(
        files = valid.len(),
        columns = headers.len(),
        rows = rows.len(),
        output = %path.display(),
        "Merge complete"
    );
    Ok(path)
}

pub fn merge_files(files: &[PathBuf], output: &Path, strict: bool) -> Result<PathBuf> {
    merge_into(files, output, strict, "the given file list")
}

/// Merge every regular file in `dir`, in file-name order.
pub fn merge_directory(dir: &Path, output: &Path, strict: bool) -> Result<PathBuf> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    merge_into(&files, output, strict, &format!("directory {}", dir.display()))
}

/// Merge the files named one per line in `list` (blank and `#` lines skipped).
pub fn merge_list_file(list: &Path, output: &Path, strict: bool) -> Result<PathBuf> {
    let content = std::fs::read_to_string(list)?;
    let files: Vec<PathBuf> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(PathBuf::from)
        .collect();
    merge_into(&files, output, strict, &format!("list file {}", list.display()))
}
