//! Header union.

use std::path::PathBuf;

use mafnexus_common::maf::{missing_required_columns, read_header};
use mafnexus_common::Result;
use tracing::{debug, warn};

/// Columns every merged file starts with.
pub const LEADING_COLUMNS: [&str; 2] = ["Hugo_Symbol", "Entrez_Gene_Id"];

/// Union the headers of `files` in argument order, first-seen wins.
///
/// With `strict`, a file lacking any required column is dropped entirely.
/// A file without a header line, or one that cannot be read as text, is
/// dropped too. Returns the union and the files that contributed to it.
pub fn merge_headers(files: &[PathBuf], strict: bool) -> Result<(Vec<String>, Vec<PathBuf>)> {
    let mut headers: Vec<String> = LEADING_COLUMNS.iter().map(|s| s.to_string()).collect();
    let mut valid = Vec::new();

    for file in files {
        let header = match read_header(file) {
            Ok(Some(header)) => header,
            Ok(None) => {
                warn!(path = %file.display(), "No header line, skipping file");
                continue;
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Unreadable file, skipping");
                continue;
            }
        };
        if strict {
            let missing = missing_required_columns(&header);
            if !missing.is_empty() {
                warn!(path = %file.display(), ?missing, "Missing required columns, skipping file");
                continue;
            }
        }
        for name in header {
            if !headers.contains(&name) {
                headers.push(name);
            }
        }
        valid.push(file.clone());
    }

    debug!(columns = headers.len(), valid = valid.len(), "Merged headers");
    Ok((headers, valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mafnexus_test_utils::{tempdir, write_maf_fixture};

    #[test]
    fn test_union_order() {
        let dir = tempdir().unwrap();
        let a = write_maf_fixture(dir.path(), "a.maf", &["#c"], &["Hugo_Symbol", "Center"], &[&["TP53", "MSK"]]);
        let b = write_maf_fixture(dir.path(), "b.maf", &[], &["Hugo_Symbol", "Chromosome"], &[&["KRAS", "12"]]);
        let (headers, valid) = merge_headers(&[a, b], false).unwrap();
        assert_eq!(headers, vec!["Hugo_Symbol", "Entrez_Gene_Id", "Center", "Chromosome"]);
        assert_eq!(valid.len(), 2);
    }

    #[test]
    fn test_leading_columns_always_present() {
        let (headers, valid) = merge_headers(&[], false).unwrap();
        assert_eq!(headers, LEADING_COLUMNS.to_vec());
        assert!(valid.is_empty());
    }

    #[test]
    fn test_unreadable_file_is_skipped() {
        let dir = tempdir().unwrap();
        let a = write_maf_fixture(dir.path(), "a.maf", &[], &["Hugo_Symbol", "Center"], &[&["TP53", "MSK"]]);
        let binary = dir.path().join("b.maf.gz");
        std::fs::write(&binary, [0x1f, 0x8b, 0xff, 0xfe, b'\n']).unwrap();
        let (headers, valid) = merge_headers(&[a.clone(), binary], false).unwrap();
        assert_eq!(valid, vec![a]);
        assert_eq!(headers, vec!["Hugo_Symbol", "Entrez_Gene_Id", "Center"]);
    }

    #[test]
    fn test_strict_drops_incomplete_file() {
        let dir = tempdir().unwrap();
        let full = write_maf_fixture(
            dir.path(),
            "full.maf",
            &[],
            &["Chromosome", "Start_Position", "End_Position", "Reference_Allele", "Tumor_Seq_Allele1"],
            &[&["1", "1", "1", "A", "T"]],
        );
        let partial = write_maf_fixture(dir.path(), "partial.maf", &[], &["Hugo_Symbol", "Extra"], &[&["X", "y"]]);
        let (headers, valid) = merge_headers(&[full.clone(), partial], true).unwrap();
        assert_eq!(valid, vec![full]);
        assert!(!headers.contains(&"Extra".to_string()));
    }
}
