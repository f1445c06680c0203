//! End-to-end annotation runs against an in-memory annotation service.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use mafnexus_annotator::{
    AnnotationResponse, AnnotationService, Annotator, AnnotatorOptions, FirstTranscriptSelector,
    GenomicLocation,
};
use mafnexus_common::{MafNexusError, Result};
use mafnexus_test_utils::pretty_assertions::assert_eq;
use mafnexus_test_utils::{braf_v600e_response, cell, intron_response, read_table, tempdir, write_maf_fixture, BASIC_HEADER};
use serde_json::Value;

/// How the mock answers a batched request.
#[derive(Default, Clone, Copy)]
enum BatchMode {
    /// One result per location.
    #[default]
    PerLocation,
    /// The whole request fails.
    Fail,
    /// One response short of the request.
    DropLast,
}

/// Serves canned payloads by request key; unknown keys fail like a timeout
/// and an empty object fails like an empty response.
#[derive(Default)]
struct MockService {
    payloads: HashMap<String, Value>,
    batch_mode: BatchMode,
    calls: AtomicUsize,
    batch_calls: AtomicUsize,
}

impl MockService {
    fn with(mut self, key: &str, payload: Value) -> Self {
        self.payloads.insert(key.to_string(), payload);
        self
    }

    fn batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    fn lookup(&self, location: &GenomicLocation) -> Result<AnnotationResponse> {
        let key = location.encode();
        let payload = self
            .payloads
            .get(&key)
            .ok_or_else(|| MafNexusError::AnnotationCallFailed(format!("{}: timed out", key)))?;
        if payload.as_object().is_some_and(|map| map.is_empty()) {
            return Err(MafNexusError::AnnotationCallFailed(format!("{}: empty response", key)));
        }
        Ok(serde_json::from_value(payload.clone())?)
    }
}

#[async_trait]
impl AnnotationService for MockService {
    async fn annotate(&self, location: &GenomicLocation) -> Result<AnnotationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.lookup(location)
    }

    async fn annotate_batch(
        &self,
        locations: &[GenomicLocation],
    ) -> Result<Vec<Result<AnnotationResponse>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        let mut results: Vec<Result<AnnotationResponse>> = locations.iter().map(|l| self.lookup(l)).collect();
        match self.batch_mode {
            BatchMode::PerLocation => {}
            BatchMode::Fail => {
                return Err(MafNexusError::AnnotationCallFailed("batch: 503 Service Unavailable".into()))
            }
            BatchMode::DropLast => {
                results.pop();
            }
        }
        Ok(results)
    }

    fn request_url(&self, location: &GenomicLocation) -> String {
        format!("mock://annotation/genomic/{}", location.encode())
    }
}

const BRAF_KEY: &str = "7,140453136,140453136,A,T";
const TP53_KEY: &str = "17,7579312,7579312,C,T";

fn header() -> Vec<&'static str> {
    let mut h = BASIC_HEADER.to_vec();
    h.push("Variant_Classification");
    h.push("Custom_Note");
    h
}

fn annotator(service: Arc<MockService>, options: AnnotatorOptions) -> Annotator {
    Annotator::new(service, Box::new(FirstTranscriptSelector), options)
}

#[tokio::test]
async fn test_annotate_file_single_requests() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &["#version 2.4"],
        &header(),
        &[
            &["braf", "S1", "7", "140453136", "140453136", "A", "T", "T", "Missense", "note1"],
            &["TP53", "S2", "17", "7579312", "7579312", "C", "C", "T", "Intron", "note2"],
            &["KRAS", "S3", "12", "25398284", "25398284", "C", "C", "A", "Missense_Mutation", "note3"],
        ],
    );
    let service = Arc::new(
        MockService::default()
            .with(BRAF_KEY, braf_v600e_response())
            .with(TP53_KEY, intron_response()),
    );
    let result = annotator(service.clone(), AnnotatorOptions::default())
        .annotate_file(&input, &dir.path().join("out/annotated.maf"), Some(dir.path().join("errors.txt").as_path()))
        .await
        .unwrap();

    assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    assert_eq!(result.counts.processed, 3);
    assert_eq!(result.counts.succeeded, 1);
    assert_eq!(result.counts.other, 2);
    assert!(result.report.contains("Records processed: 3"));

    let text = std::fs::read_to_string(&result.output_path).unwrap();
    assert!(text.starts_with("#version 2.4\nHugo_Symbol\t"));

    let (header, rows) = read_table(&result.output_path);
    assert_eq!(header.last().map(String::as_str), Some("Custom_Note"));
    assert_eq!(rows.len(), 3);

    let braf = &rows[0];
    assert_eq!(cell(&header, braf, "Hugo_Symbol"), "braf");
    assert_eq!(cell(&header, braf, "NCBI_Build"), "GRCh37");
    assert_eq!(cell(&header, braf, "Variant_Classification"), "Missense_Mutation");
    assert_eq!(cell(&header, braf, "HGVSp_Short"), "p.V600E");
    assert_eq!(cell(&header, braf, "Protein_position"), "600");
    assert_eq!(cell(&header, braf, "dbSNP_RS"), "rs113488022");
    assert_eq!(cell(&header, braf, "gnomAD_NFE_AF"), "1.8e-05");
    assert_eq!(cell(&header, braf, "Annotation_Status"), "SUCCESS");
    assert_eq!(cell(&header, braf, "Custom_Note"), "note1");

    // Intronic variant: no HGVS but an allow-listed classification.
    assert_eq!(cell(&header, &rows[1], "Annotation_Status"), "OTHER");
    // No payload for KRAS: classification falls back to the original.
    assert_eq!(cell(&header, &rows[2], "Variant_Classification"), "Missense_Mutation");
    assert_eq!(cell(&header, &rows[2], "HGVSc"), "");
    assert_eq!(cell(&header, &rows[2], "Annotation_Status"), "OTHER");

    let errors = std::fs::read_to_string(result.error_report_path.unwrap()).unwrap();
    let lines: Vec<&str> = errors.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[2].starts_with("S3\t12\t25398284\t25398284\tC\tA\tMissense_Mutation\tOTHER\tmock://"));
}

#[tokio::test]
async fn test_batched_requests_preserve_order() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &[],
        &header(),
        &[
            &["TP53", "S2", "17", "7579312", "7579312", "C", "C", "T", "Intron", ""],
            &["braf", "S1", "7", "140453136", "140453136", "A", "T", "T", "Missense", ""],
            &["TP53", "S4", "17", "7579312", "7579312", "C", "C", "T", "Intron", ""],
        ],
    );
    let service = Arc::new(
        MockService::default()
            .with(BRAF_KEY, braf_v600e_response())
            .with(TP53_KEY, intron_response()),
    );
    let options = AnnotatorOptions { post_interval_size: 2, replace_symbol_entrez: true, ..Default::default() };
    let result = annotator(service.clone(), options)
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap();

    assert_eq!(service.batch_calls.load(Ordering::SeqCst), 2);
    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    assert!(result.error_report_path.is_none());

    let (header, rows) = read_table(&result.output_path);
    let samples: Vec<&str> = rows.iter().map(|r| cell(&header, r, "Tumor_Sample_Barcode")).collect();
    assert_eq!(samples, vec!["S2", "S1", "S4"]);
    assert_eq!(cell(&header, &rows[1], "Hugo_Symbol"), "BRAF");
    assert_eq!(cell(&header, &rows[1], "Entrez_Gene_Id"), "673");
}

#[tokio::test]
async fn test_failed_batch_marks_whole_chunk() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &[],
        &header(),
        &[
            &["braf", "S1", "7", "140453136", "140453136", "A", "T", "T", "Missense", ""],
            &["TP53", "S2", "17", "7579312", "7579312", "C", "C", "T", "Intron", ""],
        ],
    );
    let service = Arc::new(
        MockService::default()
            .with(BRAF_KEY, braf_v600e_response())
            .with(TP53_KEY, intron_response())
            .batch_mode(BatchMode::Fail),
    );
    let options = AnnotatorOptions { post_interval_size: 10, ..Default::default() };
    let result = annotator(service, options)
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap();
    assert_eq!(result.counts.processed, 2);
    assert_eq!(result.counts.other, 2);
    assert_eq!(result.counts.succeeded, 0);
}

#[tokio::test]
async fn test_batch_element_failure_only_marks_its_record() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &[],
        &header(),
        &[
            &["braf", "S1", "7", "140453136", "140453136", "A", "T", "T", "Missense", ""],
            &["TP53", "S2", "17", "7579312", "7579312", "C", "C", "T", "Intron", ""],
            &["KRAS", "S3", "12", "25398284", "25398284", "C", "C", "A", "Missense_Mutation", ""],
        ],
    );
    // TP53 answers with an empty object, KRAS is unknown.
    let service = Arc::new(
        MockService::default()
            .with(BRAF_KEY, braf_v600e_response())
            .with(TP53_KEY, serde_json::json!({})),
    );
    let options = AnnotatorOptions { post_interval_size: 10, ..Default::default() };
    let result = annotator(service.clone(), options)
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap();

    assert_eq!(service.batch_calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.counts.processed, 3);
    assert_eq!(result.counts.succeeded, 1);
    assert_eq!(result.counts.other, 2);

    let (header, rows) = read_table(&result.output_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(cell(&header, &rows[0], "HGVSp_Short"), "p.V600E");
    assert_eq!(cell(&header, &rows[0], "Annotation_Status"), "SUCCESS");
    assert_eq!(cell(&header, &rows[1], "Annotation_Status"), "OTHER");
    assert_eq!(cell(&header, &rows[2], "Annotation_Status"), "OTHER");
}

#[tokio::test]
async fn test_short_batch_response_keeps_every_record() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &[],
        &header(),
        &[
            &["braf", "S1", "7", "140453136", "140453136", "A", "T", "T", "Missense", ""],
            &["TP53", "S2", "17", "7579312", "7579312", "C", "C", "T", "Intron", ""],
            &["braf", "S3", "7", "140453136", "140453136", "A", "T", "T", "Missense", ""],
        ],
    );
    let service = Arc::new(
        MockService::default()
            .with(BRAF_KEY, braf_v600e_response())
            .with(TP53_KEY, intron_response())
            .batch_mode(BatchMode::DropLast),
    );
    let options = AnnotatorOptions { post_interval_size: 3, ..Default::default() };
    let result = annotator(service, options)
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap();

    assert_eq!(result.counts.processed, 3);
    assert_eq!(result.counts.succeeded, 0);
    assert_eq!(result.counts.other, 3);

    let (header, rows) = read_table(&result.output_path);
    let samples: Vec<&str> = rows.iter().map(|r| cell(&header, r, "Tumor_Sample_Barcode")).collect();
    assert_eq!(samples, vec!["S1", "S2", "S3"]);
    assert_eq!(cell(&header, &rows[0], "HGVSp_Short"), "");
}

#[tokio::test]
async fn test_ambiguous_allele_counted() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &[],
        &header(),
        &[&["X", "S9", "1", "100", "101", "CT", "CT", "CT", "Missense_Mutation", ""]],
    );
    let result = annotator(Arc::new(MockService::default()), AnnotatorOptions::default())
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap();
    assert_eq!(result.counts.ambiguous_allele, 1);
    assert_eq!(result.counts.other, 1);
    assert_eq!(result.counts.failed, 1);
}

#[tokio::test]
async fn test_strict_checks_abort_on_missing_columns() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(dir.path(), "bad.maf", &[], &["Hugo_Symbol", "Chromosome"], &[&["TP53", "17"]]);
    let options = AnnotatorOptions { strict_maf_checks: true, ..Default::default() };
    let err = annotator(Arc::new(MockService::default()), options)
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MafNexusError::ValidationFailed { .. }));
}

#[tokio::test]
async fn test_mutation_assessor_columns() {
    let dir = tempdir().unwrap();
    let input = write_maf_fixture(
        dir.path(),
        "input.maf",
        &[],
        &header(),
        &[&["braf", "S1", "7", "140453136", "140453136", "A", "T", "T", "Missense", ""]],
    );
    let service = Arc::new(MockService::default().with(BRAF_KEY, braf_v600e_response()));
    let options = AnnotatorOptions { include_mutation_assessor: true, ..Default::default() };
    let result = annotator(service, options)
        .annotate_file(&input, &dir.path().join("annotated.maf"), None)
        .await
        .unwrap();
    let (header, rows) = read_table(&result.output_path);
    assert_eq!(cell(&header, &rows[0], "MA:FImpact"), "neutral");
    assert_eq!(cell(&header, &rows[0], "MA:FIS"), "0.805");
}
