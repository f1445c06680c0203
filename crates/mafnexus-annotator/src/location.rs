//! Genomic location keys.
//!
//! The annotation service is queried with `chr,start,end,ref,alt`, where the
//! alt allele is derived from the two tumor-seq alleles of the record.

use mafnexus_common::{MafColumn, MafNexusError, Record, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// The variant allele picked for a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedAllele {
    pub allele: String,
    /// Both tumor-seq alleles equal the reference allele.
    pub ambiguous: bool,
}

/// Pick the variant allele: allele 2 when it differs from the reference,
/// else allele 1 when it differs, else the reference itself.
///
/// Blank alleles are never picked. The result is flagged ambiguous only when
/// both alleles equal the reference.
pub fn derive_variant_allele(reference: &str, allele1: &str, allele2: &str) -> DerivedAllele {
    let differs = |allele: &str| !allele.is_empty() && allele != reference;

    if differs(allele2) {
        return DerivedAllele { allele: allele2.to_string(), ambiguous: false };
    }
    if differs(allele1) {
        return DerivedAllele { allele: allele1.to_string(), ambiguous: false };
    }
    DerivedAllele {
        allele: reference.to_string(),
        ambiguous: allele1 == reference && allele2 == reference,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenomicLocation {
    pub chromosome: String,
    pub start: String,
    pub end: String,
    pub reference_allele: String,
    pub variant_allele: String,
}

impl GenomicLocation {
    /// Build the query location for a record, returning the allele derivation
    /// alongside so the caller can flag ambiguous alleles.
    pub fn from_record(record: &Record) -> (Self, DerivedAllele) {
        let reference = record.get(MafColumn::ReferenceAllele);
        let derived = derive_variant_allele(
            reference,
            record.get(MafColumn::TumorSeqAllele1),
            record.get(MafColumn::TumorSeqAllele2),
        );
        if derived.allele == reference {
            debug!(
                sample = record.sample_id(),
                chromosome = record.get(MafColumn::Chromosome),
                start = record.get(MafColumn::StartPosition),
                "Variant allele equals reference allele, querying anyway"
            );
        }
        let location = GenomicLocation {
            chromosome: record.get(MafColumn::Chromosome).to_string(),
            start: record.get(MafColumn::StartPosition).to_string(),
            end: record.get(MafColumn::EndPosition).to_string(),
            reference_allele: reference.to_string(),
            variant_allele: derived.allele.clone(),
        };
        (location, derived)
    }

    /// The request key, `chr,start,end,ref,alt`.
    pub fn encode(&self) -> String {
        format!(
            "{},{},{},{},{}",
            self.chromosome, self.start, self.end, self.reference_allele, self.variant_allele
        )
    }

    pub fn decode(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split(',').collect();
        match parts.as_slice() {
            [chromosome, start, end, reference, variant] => Ok(GenomicLocation {
                chromosome: chromosome.to_string(),
                start: start.to_string(),
                end: end.to_string(),
                reference_allele: reference.to_string(),
                variant_allele: variant.to_string(),
            }),
            _ => Err(MafNexusError::Other(anyhow::anyhow!(
                "Invalid genomic location key '{}': expected 5 comma-separated fields",
                key
            ))),
        }
    }
}

impl fmt::Display for GenomicLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allele2_preferred() {
        let d = derive_variant_allele("A", "G", "T");
        assert_eq!(d.allele, "T");
        assert!(!d.ambiguous);
    }

    #[test]
    fn test_falls_back_to_allele1() {
        let d = derive_variant_allele("A", "G", "A");
        assert_eq!(d.allele, "G");
        assert!(!d.ambiguous);
    }

    #[test]
    fn test_ambiguous_when_both_equal_reference() {
        let d = derive_variant_allele("CT", "CT", "CT");
        assert_eq!(d.allele, "CT");
        assert!(d.ambiguous);
    }

    #[test]
    fn test_blank_alleles_are_not_ambiguous() {
        let d = derive_variant_allele("A", "", "");
        assert_eq!(d.allele, "A");
        assert!(!d.ambiguous);
    }

    #[test]
    fn test_encode_decode() {
        let loc = GenomicLocation {
            chromosome: "7".into(),
            start: "140453136".into(),
            end: "140453136".into(),
            reference_allele: "A".into(),
            variant_allele: "T".into(),
        };
        assert_eq!(loc.encode(), "7,140453136,140453136,A,T");
        assert_eq!(GenomicLocation::decode(&loc.encode()).unwrap(), loc);
        assert!(GenomicLocation::decode("7,1,2,A").is_err());
    }

    #[test]
    fn test_from_record() {
        let mut record = Record::new();
        record.set(MafColumn::Chromosome, "12");
        record.set(MafColumn::StartPosition, "25398284");
        record.set(MafColumn::EndPosition, "25398284");
        record.set(MafColumn::ReferenceAllele, "C");
        record.set(MafColumn::TumorSeqAllele1, "C");
        record.set(MafColumn::TumorSeqAllele2, "T");
        let (loc, derived) = GenomicLocation::from_record(&record);
        assert_eq!(loc.encode(), "12,25398284,25398284,C,T");
        assert!(!derived.ambiguous);
    }

    #[test]
    fn test_serializes_camel_case() {
        let loc = GenomicLocation::decode("1,10,10,A,G").unwrap();
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["referenceAllele"], "A");
        assert_eq!(json["variantAllele"], "G");
    }
}
