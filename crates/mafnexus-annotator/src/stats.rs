//! Run statistics and the summary report.
//!
//! The number formats here are part of the human-readable report and are
//! kept stable: averages with three decimals, totals as integers.

use std::fmt::Write as _;
use std::time::{Duration, Instant};

use crate::outcome::OutcomeCounts;

#[derive(Debug, Clone)]
pub struct AnnotationSummaryStatistics {
    started: Instant,
    response_times_ms: Vec<u64>,
}

impl Default for AnnotationSummaryStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationSummaryStatistics {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            response_times_ms: Vec::new(),
        }
    }

    pub fn record_response_time(&mut self, elapsed: Duration) {
        self.add_sample_ms(elapsed.as_millis() as u64);
    }

    pub fn add_sample_ms(&mut self, ms: u64) {
        self.response_times_ms.push(ms);
    }

    pub fn samples(&self) -> usize {
        self.response_times_ms.len()
    }

    /// Mean response time in ms, three decimals; "0.000" with no samples.
    pub fn average_response_time(&self) -> String {
        if self.response_times_ms.is_empty() {
            return "0.000".to_string();
        }
        let total: u64 = self.response_times_ms.iter().sum();
        format!("{:.3}", total as f64 / self.response_times_ms.len() as f64)
    }

    /// Summed response time in ms; "0" with no samples.
    pub fn total_response_time(&self) -> String {
        self.response_times_ms.iter().sum::<u64>().to_string()
    }

    /// Whole seconds since construction.
    pub fn total_run_time(&self) -> String {
        self.started.elapsed().as_secs().to_string()
    }

    pub fn report(&self, counts: &OutcomeCounts) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Annotation summary");
        let _ = writeln!(out, "\tRecords processed: {}", counts.processed);
        let _ = writeln!(out, "\tRecords annotated successfully: {}", counts.succeeded);
        let _ = writeln!(out, "\tRecords failed: {}", counts.failed);
        let _ = writeln!(out, "\t\tAmbiguous allele: {}", counts.ambiguous_allele);
        let _ = writeln!(out, "\t\tNull HGVS / classification: {}", counts.null_hgvs_classification);
        let _ = writeln!(out, "\t\tOther: {}", counts.other);
        let _ = writeln!(out, "\tAverage response time (ms): {}", self.average_response_time());
        let _ = writeln!(out, "\tTotal response time (ms): {}", self.total_response_time());
        let _ = write!(out, "\tTotal run time (s): {}", self.total_run_time());
        out
    }
}
