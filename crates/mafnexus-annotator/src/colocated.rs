//! Colocated variant matching.
//!
//! Population frequencies come from at most one colocated variant: the first
//! one carrying a dbSNP `rs` id. That variant is rejected outright when any
//! of its present gnomAD alleles disagrees with the record's tumor allele.

use tracing::debug;

use crate::models::ColocatedVariant;

pub fn match_colocated_variant<'a>(
    variants: &'a [ColocatedVariant],
    tumor_seq_allele1: &str,
) -> Option<&'a ColocatedVariant> {
    let candidate = variants
        .iter()
        .find(|v| v.db_snp_id.as_deref().is_some_and(|id| id.starts_with("rs")))?;

    if !tumor_seq_allele1.is_empty()
        && candidate.present_gnomad_alleles().any(|a| a != tumor_seq_allele1)
    {
        debug!(
            db_snp_id = candidate.db_snp_id.as_deref(),
            tumor_seq_allele1,
            "Colocated variant allele mismatch, dropping match"
        );
        return None;
    }
    Some(candidate)
}
