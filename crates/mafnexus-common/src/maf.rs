//! Tab-delimited MAF table reading and writing.
//!
//! A MAF file is zero or more `#` comment lines, one header line, then one
//! data line per record. Comments are kept verbatim so they can be passed
//! through to the output.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MafNexusError, Result};
use crate::record::Record;

/// Columns a file must declare when strict checks are on.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    "Chromosome",
    "Start_Position",
    "End_Position",
    "Reference_Allele",
    "Tumor_Seq_Allele1",
];

pub fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

/// Required columns absent from `header`, in [`REQUIRED_COLUMNS`] order.
pub fn missing_required_columns(header: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|required| !header.iter().any(|h| h == *required))
        .map(|s| s.to_string())
        .collect()
}

pub fn split_line(line: &str) -> Vec<String> {
    line.split('\t').map(String::from).collect()
}

/// Split a data line and reconcile its width against the header.
/// A mismatch is logged; missing cells become "" and surplus cells are dropped.
pub fn split_data_line(line: &str, width: usize, path: &Path, line_no: usize) -> Vec<String> {
    let mut cells = split_line(line);
    if cells.len() != width {
        warn!(
            path = %path.display(),
            line = line_no,
            expected = width,
            found = cells.len(),
            "Row width differs from header"
        );
        cells.resize(width, String::new());
    }
    cells
}

/// Read only the header of a MAF file (first non-comment line).
/// Returns `None` for a file with no header line.
pub fn read_header(path: &Path) -> Result<Option<Vec<String>>> {
    let reader = BufReader::new(File::open(path)?);
    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end_matches('\r');
        if is_comment(line) {
            continue;
        }
        return Ok(Some(split_line(line)));
    }
    Ok(None)
}

// ── MafTable ──────────────────────────────────────────────────────────────────

/// A fully loaded MAF file.
#[derive(Debug, Clone, Default)]
pub struct MafTable {
    pub path: PathBuf,
    pub comments: Vec<String>,
    pub header: Vec<String>,
    pub records: Vec<Record>,
}

impl MafTable {
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse MAF text. `path` is only used for diagnostics.
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let mut table = MafTable {
            path: path.to_path_buf(),
            ..Default::default()
        };
        let mut in_header = true;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim_end_matches('\r');
            if in_header {
                if is_comment(line) {
                    table.comments.push(line.to_string());
                    continue;
                }
                table.header = split_line(line);
                in_header = false;
                continue;
            }
            if line.is_empty() {
                continue;
            }
            let cells = split_data_line(line, table.header.len(), path, idx + 1);
            table.records.push(Record::from_row(&table.header, &cells));
        }

        if in_header {
            return Err(MafNexusError::MalformedTable {
                path: path.to_path_buf(),
                reason: "no header line found".to_string(),
            });
        }

        debug!(
            path = %path.display(),
            comments = table.comments.len(),
            columns = table.header.len(),
            records = table.records.len(),
            "Loaded MAF table"
        );
        Ok(table)
    }

    pub fn missing_required(&self) -> Vec<String> {
        missing_required_columns(&self.header)
    }

    /// Fail with `ValidationFailed` when any required column is absent.
    pub fn validate_required(&self) -> Result<()> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(MafNexusError::ValidationFailed {
                path: self.path.clone(),
                missing,
            })
        }
    }
}

/// Write comments, a header and rows as a MAF file.
/// Returns the absolute path of the written file.
pub fn write_maf<I, R>(path: &Path, comments: &[String], header: &[String], rows: I) -> Result<PathBuf>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    for comment in comments {
        writeln!(writer, "{}", comment)?;
    }
    writeln!(writer, "{}", header.join("\t"))?;
    for row in rows {
        writeln!(writer, "{}", row.as_ref().join("\t"))?;
    }
    writer.flush()?;
    Ok(std::fs::canonicalize(path)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::MafColumn;

    const MAF: &str = "#version 2.4\n#center test\nHugo_Symbol\tChromosome\tStart_Position\tEnd_Position\tReference_Allele\tTumor_Seq_Allele1\tExtra\n\
BRAF\t7\t140453136\t140453136\tA\tA\tfoo\n\
KRAS\t12\t25398284\t25398284\tC\tC\n";

    #[test]
    fn test_parse_keeps_comments_and_header() {
        let table = MafTable::parse(Path::new("test.maf"), MAF).unwrap();
        assert_eq!(table.comments, vec!["#version 2.4", "#center test"]);
        assert_eq!(table.header.len(), 7);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].get(MafColumn::HugoSymbol), "BRAF");
        assert_eq!(table.records[0].value("Extra"), Some("foo"));
    }

    #[test]
    fn test_short_row_is_padded() {
        let table = MafTable::parse(Path::new("test.maf"), MAF).unwrap();
        assert_eq!(table.records[1].value("Extra"), Some(""));
    }

    #[test]
    fn test_validate_required() {
        let table = MafTable::parse(Path::new("test.maf"), MAF).unwrap();
        assert!(table.validate_required().is_ok());

        let table = MafTable::parse(Path::new("bad.maf"), "Hugo_Symbol\tChromosome\nTP53\t17\n").unwrap();
        match table.validate_required() {
            Err(MafNexusError::ValidationFailed { missing, .. }) => {
                assert_eq!(missing, vec!["Start_Position", "End_Position", "Reference_Allele", "Tumor_Seq_Allele1"]);
            }
            other => panic!("expected ValidationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_comment_only_file_is_malformed() {
        let err = MafTable::parse(Path::new("empty.maf"), "#only\n#comments\n").unwrap_err();
        assert!(matches!(err, MafNexusError::MalformedTable { .. }));
    }

    #[test]
    fn test_write_then_read_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.maf");
        let header = vec!["A".to_string(), "B".to_string()];
        let rows = vec![vec!["1".to_string(), "2".to_string()]];
        let written = write_maf(&path, &["#c".to_string()], &header, &rows).unwrap();
        assert!(written.is_absolute());
        assert_eq!(read_header(&path).unwrap(), Some(header));
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "#c\nA\tB\n1\t2\n");
    }
}
