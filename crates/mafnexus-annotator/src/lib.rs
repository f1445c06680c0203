//! mafnexus-annotator — MAF annotation against a variant-annotation service.
//! Covers the per-record flow:
//! - Genomic location key derivation
//! - Canonical transcript selection
//! - Colocated population-frequency matching
//! - Field resolution into an annotated record
//! - Outcome classification and run statistics

pub mod canonical;
pub mod client;
pub mod colocated;
pub mod location;
pub mod models;
pub mod outcome;
pub mod pipeline;
pub mod resolver;
pub mod stats;

pub use canonical::{CanonicalTranscriptSelector, FirstTranscriptSelector, IsoformOverrideSelector, IsoformOverrides};
pub use client::{AnnotationService, GenomeNexusClient};
pub use location::{derive_variant_allele, DerivedAllele, GenomicLocation};
pub use models::AnnotationResponse;
pub use outcome::{AnnotationOutcome, AnnotationOutcomeClassifier, OutcomeCounts};
pub use pipeline::{AnnotationRunResult, Annotator, AnnotatorOptions, RunContext};
pub use resolver::{AnnotatedRecord, FieldResolver};
pub use stats::AnnotationSummaryStatistics;
