//! Canonical transcript selection.
//!
//! Two interchangeable strategies share one trait:
//! - `FirstTranscriptSelector`: the service's own ranking, first transcript wins
//! - `IsoformOverrideSelector`: prefer transcripts from an isoform-override
//!   set, breaking ties with the most severe consequence

use std::collections::HashSet;
use std::path::Path;

use mafnexus_common::{MafNexusError, Result};
use mafnexus_config::CanonicalStrategy;
use tracing::{debug, info};

use crate::models::TranscriptConsequence;

pub trait CanonicalTranscriptSelector: Send + Sync {
    /// Pick one transcript, or none. Absence is not an error.
    fn select<'a>(
        &self,
        transcripts: &'a [TranscriptConsequence],
        most_severe_consequence: Option<&str>,
    ) -> Option<&'a TranscriptConsequence>;

    fn name(&self) -> &'static str;
}

/// Default policy: first transcript in service order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTranscriptSelector;

impl CanonicalTranscriptSelector for FirstTranscriptSelector {
    fn select<'a>(
        &self,
        transcripts: &'a [TranscriptConsequence],
        _most_severe_consequence: Option<&str>,
    ) -> Option<&'a TranscriptConsequence> {
        transcripts.first()
    }

    fn name(&self) -> &'static str {
        "default"
    }
}

// ── Isoform overrides ─────────────────────────────────────────────────────────

/// Transcript ids that should be preferred as canonical.
/// Ids are compared without their version suffix.
#[derive(Debug, Clone, Default)]
pub struct IsoformOverrides {
    transcripts: HashSet<String>,
}

const TRANSCRIPT_COLUMNS: [&str; 3] = ["enst_id", "transcript_id", "isoform_override"];

fn unversioned(id: &str) -> &str {
    id.split('.').next().unwrap_or(id)
}

impl IsoformOverrides {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            transcripts: ids
                .into_iter()
                .map(|id| unversioned(id.as_ref().trim()).to_string())
                .filter(|id| !id.is_empty())
                .collect(),
        }
    }

    /// Load overrides from a tab-separated file whose header names a transcript column.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut lines = content
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header = lines.next().ok_or_else(|| MafNexusError::MalformedTable {
            path: path.to_path_buf(),
            reason: "isoform override file is empty".to_string(),
        })?;
        let column = header
            .split('\t')
            .position(|h| TRANSCRIPT_COLUMNS.contains(&h.trim().to_lowercase().as_str()))
            .ok_or_else(|| MafNexusError::MalformedTable {
                path: path.to_path_buf(),
                reason: format!("no transcript column (one of {})", TRANSCRIPT_COLUMNS.join(", ")),
            })?;

        let overrides = Self::new(lines.filter_map(|l| l.split('\t').nth(column)));
        info!(path = %path.display(), n = overrides.len(), "Loaded isoform overrides");
        Ok(overrides)
    }

    pub fn contains(&self, transcript_id: &str) -> bool {
        self.transcripts.contains(unversioned(transcript_id))
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}

/// Override-aware policy.
///
/// Candidates are the transcripts in the override set, or failing that the
/// transcripts the service marks canonical. A single candidate wins outright.
/// Otherwise the first transcript (among the candidates if any, else among
/// all) carrying the most severe consequence is chosen.
#[derive(Debug, Clone, Default)]
pub struct IsoformOverrideSelector {
    overrides: IsoformOverrides,
}

impl IsoformOverrideSelector {
    pub fn new(overrides: IsoformOverrides) -> Self {
        Self { overrides }
    }
}

impl CanonicalTranscriptSelector for IsoformOverrideSelector {
    fn select<'a>(
        &self,
        transcripts: &'a [TranscriptConsequence],
        most_severe_consequence: Option<&str>,
    ) -> Option<&'a TranscriptConsequence> {
        let mut candidates: Vec<&TranscriptConsequence> = transcripts
            .iter()
            .filter(|t| t.transcript_id.as_deref().is_some_and(|id| self.overrides.contains(id)))
            .collect();
        if candidates.is_empty() {
            candidates = transcripts.iter().filter(|t| t.is_canonical()).collect();
        }
        if candidates.len() == 1 {
            return candidates.pop();
        }

        let severe = most_severe_consequence?;
        let pool: Vec<&TranscriptConsequence> = if candidates.is_empty() {
            transcripts.iter().collect()
        } else {
            candidates
        };
        let chosen = pool.into_iter().find(|t| t.has_consequence(severe));
        debug!(
            most_severe = severe,
            transcript = chosen.and_then(|t| t.transcript_id.as_deref()),
            "Canonical transcript chosen by consequence"
        );
        chosen
    }

    fn name(&self) -> &'static str {
        "isoform_override"
    }
}

/// Build the configured strategy.
pub fn selector_for(
    strategy: CanonicalStrategy,
    overrides: Option<IsoformOverrides>,
) -> Box<dyn CanonicalTranscriptSelector> {
    match strategy {
        CanonicalStrategy::Default => Box::new(FirstTranscriptSelector),
        CanonicalStrategy::IsoformOverride => {
            Box::new(IsoformOverrideSelector::new(overrides.unwrap_or_default()))
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
