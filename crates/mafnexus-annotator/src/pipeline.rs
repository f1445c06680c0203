//! Annotation driver.
//!
//! Reads a MAF file, queries the annotation service record by record (or in
//! batches), resolves and classifies every record, then writes the annotated
//! file and the optional failure report. Per-run state lives in an explicit
//! [`RunContext`]; a failed call only ever downgrades the affected records.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use mafnexus_common::{write_maf, MafColumn, MafTable, Record, Result};
use mafnexus_config::AnnotationConfig;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::canonical::{selector_for, CanonicalTranscriptSelector, IsoformOverrides};
use crate::client::{AnnotationService, GenomeNexusClient};
use crate::location::GenomicLocation;
use crate::models::AnnotationResponse;
use crate::outcome::{AnnotationOutcomeClassifier, OutcomeCounts};
use crate::resolver::{annotated_header, AnnotatedRecord, FieldResolver};
use crate::stats::AnnotationSummaryStatistics;

pub const MUTATION_ASSESSOR_FIELD: &str = "mutation_assessor";

// ── Run context ───────────────────────────────────────────────────────────────

/// State accumulated over one annotation run.
#[derive(Debug)]
pub struct RunContext {
    pub run_id: Uuid,
    /// Input comment lines, written back verbatim.
    pub comments: Vec<String>,
    /// Non-standard input columns seen so far.
    pub extension_columns: BTreeSet<String>,
    pub classifier: AnnotationOutcomeClassifier,
    pub stats: AnnotationSummaryStatistics,
}

impl RunContext {
    pub fn new(comments: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            comments,
            extension_columns: BTreeSet::new(),
            classifier: AnnotationOutcomeClassifier::new(),
            stats: AnnotationSummaryStatistics::new(),
        }
    }

    pub fn register_header(&mut self, header: &[String]) {
        for name in header {
            if MafColumn::from_name(name).is_none() {
                self.extension_columns.insert(name.clone());
            }
        }
    }
}

// ── Options and result ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AnnotatorOptions {
    pub replace_symbol_entrez: bool,
    /// 0 sends one request per record.
    pub post_interval_size: usize,
    pub strict_maf_checks: bool,
    pub include_mutation_assessor: bool,
}

impl AnnotatorOptions {
    pub fn from_config(config: &AnnotationConfig) -> Self {
        Self {
            replace_symbol_entrez: config.replace_symbol_entrez,
            post_interval_size: config.post_interval_size,
            strict_maf_checks: config.strict_maf_checks,
            include_mutation_assessor: config.has_enrichment(MUTATION_ASSESSOR_FIELD),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnnotationRunResult {
    pub run_id: Uuid,
    pub output_path: PathBuf,
    pub error_report_path: Option<PathBuf>,
    pub counts: OutcomeCounts,
    pub report: String,
    pub duration_ms: u64,
}

// ── Annotator ─────────────────────────────────────────────────────────────────

pub struct Annotator {
    service: Arc<dyn AnnotationService>,
    selector: Box<dyn CanonicalTranscriptSelector>,
    resolver: FieldResolver,
    options: AnnotatorOptions,
}

impl Annotator {
    pub fn new(
        service: Arc<dyn AnnotationService>,
        selector: Box<dyn CanonicalTranscriptSelector>,
        options: AnnotatorOptions,
    ) -> Self {
        Self {
            service,
            selector,
            resolver: FieldResolver::new(options.replace_symbol_entrez),
            options,
        }
    }

    /// Wire up the HTTP client and canonical strategy from configuration.
    pub fn from_config(config: &AnnotationConfig) -> Result<Self> {
        let service = Arc::new(GenomeNexusClient::from_config(config)?);
        let overrides = config
            .isoform_override_file
            .as_deref()
            .map(|path| IsoformOverrides::from_path(Path::new(path)))
            .transpose()?;
        let selector = selector_for(config.canonical_strategy, overrides);
        info!(
            base_url = %config.base_url,
            strategy = selector.name(),
            batch = config.post_interval_size,
            "Annotator configured"
        );
        Ok(Self::new(service, selector, AnnotatorOptions::from_config(config)))
    }

    pub fn options(&self) -> &AnnotatorOptions {
        &self.options
    }

    /// Annotate `input` into `output`. Structural problems (unreadable input,
    /// missing required columns under strict checks, unwritable output) are
    /// errors; per-record failures are only counted.
    #[instrument(skip(self, input, output, error_report), fields(input = %input.display()))]
    pub async fn annotate_file(
        &self,
        input: &Path,
        output: &Path,
        error_report: Option<&Path>,
    ) -> Result<AnnotationRunResult> {
        let t0 = Instant::now();
        let table = MafTable::read(input)?;
        if self.options.strict_maf_checks {
            table.validate_required()?;
        }

        let mut ctx = RunContext::new(table.comments.clone());
        ctx.register_header(&table.header);
        info!(run_id = %ctx.run_id, records = table.records.len(), "Starting annotation run");

        let annotated = self.annotate_records(&table.records, &mut ctx).await;

        let header = annotated_header(
            ctx.extension_columns.iter().map(String::as_str),
            self.options.include_mutation_assessor,
        );
        let output_path = write_maf(
            output,
            &ctx.comments,
            &header,
            annotated.iter().map(|r| r.to_row(&header)),
        )?;

        let error_report_path = match error_report {
            Some(path) => Some(ctx.classifier.write_error_report(path)?),
            None => None,
        };

        let counts = ctx.classifier.counts();
        let report = ctx.stats.report(&counts);
        info!("{}", report);
        info!(
            run_id = %ctx.run_id,
            processed = counts.processed,
            failed = counts.failed,
            output = %output_path.display(),
            "Annotation run complete"
        );

        Ok(AnnotationRunResult {
            run_id: ctx.run_id,
            output_path,
            error_report_path,
            counts,
            report,
            duration_ms: t0.elapsed().as_millis() as u64,
        })
    }

    /// Annotate records in order, one call per record or one per chunk.
    pub async fn annotate_records(&self, records: &[Record], ctx: &mut RunContext) -> Vec<AnnotatedRecord> {
        let mut out = Vec::with_capacity(records.len());
        if self.options.post_interval_size == 0 {
            for record in records {
                let (location, _) = GenomicLocation::from_record(record);
                let t = Instant::now();
                let result = self.service.annotate(&location).await;
                ctx.stats.record_response_time(t.elapsed());
                let response = match result {
                    Ok(r) => Some(r),
                    Err(e) => {
                        warn!(key = %location, error = %e, "Annotation call failed");
                        None
                    }
                };
                out.push(self.finish(record, &location, response.as_ref(), ctx));
            }
            return out;
        }

        for chunk in records.chunks(self.options.post_interval_size) {
            let locations: Vec<GenomicLocation> =
                chunk.iter().map(|r| GenomicLocation::from_record(r).0).collect();
            let t = Instant::now();
            let result = self.service.annotate_batch(&locations).await;
            ctx.stats.record_response_time(t.elapsed());
            let responses: Vec<Option<AnnotationResponse>> = match result {
                Ok(results) if results.len() == chunk.len() => results
                    .into_iter()
                    .zip(&locations)
                    .map(|(r, location)| match r {
                        Ok(response) => Some(response),
                        Err(e) => {
                            warn!(key = %location, error = %e, "Annotation call failed");
                            None
                        }
                    })
                    .collect(),
                Ok(results) => {
                    warn!(
                        expected = chunk.len(),
                        got = results.len(),
                        "Batch response count differs from request count"
                    );
                    vec![None; chunk.len()]
                }
                Err(e) => {
                    warn!(n = chunk.len(), error = %e, "Batch annotation call failed");
                    vec![None; chunk.len()]
                }
            };
            debug!(n = chunk.len(), "Batch resolved");
            for ((record, location), response) in chunk.iter().zip(&locations).zip(&responses) {
                out.push(self.finish(record, location, response.as_ref(), ctx));
            }
        }
        out
    }

    fn finish(
        &self,
        record: &Record,
        location: &GenomicLocation,
        response: Option<&AnnotationResponse>,
        ctx: &mut RunContext,
    ) -> AnnotatedRecord {
        let mut annotated = self.resolver.resolve(record, response, self.selector.as_ref());
        let url = self.service.request_url(location);
        ctx.classifier.classify(&mut annotated, response.is_none(), &url);
        annotated
    }
}
