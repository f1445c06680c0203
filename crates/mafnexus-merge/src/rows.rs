//! Row assembly.

use std::path::PathBuf;

use mafnexus_common::maf::{is_comment, split_data_line, split_line};
use mafnexus_common::Result;
use tracing::debug;

/// Rebuild every data row of `files` against the union `headers`.
/// Columns a file does not declare are filled with "".
pub fn merge_data(headers: &[String], files: &[PathBuf]) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    for file in files {
        let content = std::fs::read_to_string(file)?;
        let mut lines = content
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
            .skip_while(|(_, l)| is_comment(l));

        let Some((_, header_line)) = lines.next() else {
            continue;
        };
        let file_header = split_line(header_line);
        // Position of each union column in this file, if declared.
        let positions: Vec<Option<usize>> = headers
            .iter()
            .map(|h| file_header.iter().position(|f| f == h))
            .collect();

        let before = rows.len();
        for (line_no, line) in lines {
            if line.is_empty() {
                continue;
            }
            let cells = split_data_line(line, file_header.len(), file, line_no);
            rows.push(
                positions
                    .iter()
                    .map(|p| p.map(|i| cells[i].clone()).unwrap_or_default())
                    .collect(),
            );
        }
        debug!(path = %file.display(), rows = rows.len() - before, "Merged rows");
    }
    Ok(rows)
}
