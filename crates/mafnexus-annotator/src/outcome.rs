//! Outcome classification and the failure report.
//!
//! Every resolved record gets a primary outcome (SUCCESS, NULL_HGVS_CLASSIFICATION
//! or OTHER). An ambiguous allele is tracked beside it: such a record is
//! counted under AMBIGUOUS_ALLELE and may also land in one of the failure
//! buckets. Classification never fails; it only appends to the accumulators.

use std::fmt;
use std::path::{Path, PathBuf};

use mafnexus_common::{write_maf, MafColumn, Result};
use serde::Serialize;
use tracing::debug;

use crate::location::derive_variant_allele;
use crate::resolver::AnnotatedRecord;

/// Classifications for which empty HGVS notation is expected.
pub const NON_CODING_CLASSIFICATIONS: [&str; 7] =
    ["3'UTR", "5'UTR", "3'Flank", "5'Flank", "IGR", "Intron", "RNA"];

pub const ERROR_REPORT_HEADER: [&str; 9] = [
    "SAMPLE_ID",
    "CHR",
    "START",
    "END",
    "REF",
    "ALT",
    "VARIANT_CLASSIFICATION",
    "FAILURE_REASON",
    "URL",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnnotationOutcome {
    #[default]
    Success,
    AmbiguousAllele,
    NullHgvsClassification,
    Other,
}

impl AnnotationOutcome {
    pub fn label(self) -> &'static str {
        match self {
            AnnotationOutcome::Success => "SUCCESS",
            AnnotationOutcome::AmbiguousAllele => "AMBIGUOUS_ALLELE",
            AnnotationOutcome::NullHgvsClassification => "NULL_HGVS_CLASSIFICATION",
            AnnotationOutcome::Other => "OTHER",
        }
    }
}

impl fmt::Display for AnnotationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub sample_id: String,
    pub chromosome: String,
    pub start: String,
    pub end: String,
    pub reference_allele: String,
    pub tumor_seq_allele1: String,
    pub tumor_seq_allele2: String,
    pub variant_classification: String,
    pub reason: AnnotationOutcome,
    pub request_url: String,
}

impl Diagnostic {
    fn for_record(record: &AnnotatedRecord, reason: AnnotationOutcome, request_url: &str) -> Self {
        Self {
            sample_id: record.get(MafColumn::TumorSampleBarcode).to_string(),
            chromosome: record.get(MafColumn::Chromosome).to_string(),
            start: record.get(MafColumn::StartPosition).to_string(),
            end: record.get(MafColumn::EndPosition).to_string(),
            reference_allele: record.get(MafColumn::ReferenceAllele).to_string(),
            tumor_seq_allele1: record.get(MafColumn::TumorSeqAllele1).to_string(),
            tumor_seq_allele2: record.get(MafColumn::TumorSeqAllele2).to_string(),
            variant_classification: record.get(MafColumn::VariantClassification).to_string(),
            reason,
            request_url: request_url.to_string(),
        }
    }

    pub fn to_row(&self) -> Vec<String> {
        let alt = derive_variant_allele(
            &self.reference_allele,
            &self.tumor_seq_allele1,
            &self.tumor_seq_allele2,
        );
        vec![
            self.sample_id.clone(),
            self.chromosome.clone(),
            self.start.clone(),
            self.end.clone(),
            self.reference_allele.clone(),
            alt.allele,
            self.variant_classification.clone(),
            self.reason.label().to_string(),
            self.request_url.clone(),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub ambiguous_allele: usize,
    pub null_hgvs_classification: usize,
    pub other: usize,
}

#[derive(Debug, Default)]
pub struct AnnotationOutcomeClassifier {
    counts: OutcomeCounts,
    diagnostics: Vec<Diagnostic>,
}

impl AnnotationOutcomeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label `record`, update counters and append diagnostics.
    /// Returns the tag stored on the record.
    pub fn classify(
        &mut self,
        record: &mut AnnotatedRecord,
        call_failed: bool,
        request_url: &str,
    ) -> AnnotationOutcome {
        self.counts.processed += 1;

        let primary = if call_failed {
            AnnotationOutcome::Other
        } else if record.hgvsc.is_empty() && record.hgvsp.is_empty() {
            let classification = record.get(MafColumn::VariantClassification);
            if NON_CODING_CLASSIFICATIONS.contains(&classification) {
                AnnotationOutcome::Other
            } else {
                AnnotationOutcome::NullHgvsClassification
            }
        } else {
            AnnotationOutcome::Success
        };

        if record.ambiguous_allele {
            self.counts.ambiguous_allele += 1;
            self.diagnostics.push(Diagnostic::for_record(record, AnnotationOutcome::AmbiguousAllele, request_url));
        }
        match primary {
            AnnotationOutcome::NullHgvsClassification => self.counts.null_hgvs_classification += 1,
            AnnotationOutcome::Other => self.counts.other += 1,
            _ => {}
        }
        if primary != AnnotationOutcome::Success {
            self.diagnostics.push(Diagnostic::for_record(record, primary, request_url));
        }

        let tag = match primary {
            AnnotationOutcome::Success if record.ambiguous_allele => AnnotationOutcome::AmbiguousAllele,
            other => other,
        };
        if tag == AnnotationOutcome::Success {
            self.counts.succeeded += 1;
        } else {
            self.counts.failed += 1;
            debug!(
                sample = record.get(MafColumn::TumorSampleBarcode),
                chromosome = record.get(MafColumn::Chromosome),
                start = record.get(MafColumn::StartPosition),
                outcome = %tag,
                "Record not annotated"
            );
        }
        record.status = tag;
        tag
    }

    pub fn counts(&self) -> OutcomeCounts {
        self.counts
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Write the failure report as a tab-separated file.
    pub fn write_error_report(&self, path: &Path) -> Result<PathBuf> {
        let header: Vec<String> = ERROR_REPORT_HEADER.iter().map(|s| s.to_string()).collect();
        write_maf(path, &[], &header, self.diagnostics.iter().map(Diagnostic::to_row))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
