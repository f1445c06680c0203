//! Annotation service response model.
//!
//! Only the fields the resolver reads are modelled. Field names are accepted
//! in both the snake_case and camelCase spellings the service has used, and
//! numeric values that are sometimes sent as strings are read leniently.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationResponse {
    #[serde(default, alias = "assemblyName")]
    pub assembly_name: Option<String>,

    #[serde(default, alias = "mostSevereConsequence")]
    pub most_severe_consequence: Option<String>,

    #[serde(default, alias = "annotationSummary")]
    pub annotation_summary: Option<AnnotationSummary>,

    #[serde(default, alias = "colocatedVariants", deserialize_with = "de::null_as_default")]
    pub colocated_variants: Vec<ColocatedVariant>,

    #[serde(default, alias = "mutationAssessor")]
    pub mutation_assessor: Option<MutationAssessor>,
}

impl AnnotationResponse {
    pub fn transcript_consequences(&self) -> &[TranscriptConsequence] {
        self.annotation_summary
            .as_ref()
            .map(|s| s.transcript_consequences.as_slice())
            .unwrap_or(&[])
    }

    pub fn genomic_location(&self) -> Option<&SummaryLocation> {
        self.annotation_summary.as_ref()?.genomic_location.as_ref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnnotationSummary {
    #[serde(default, alias = "genomicLocation")]
    pub genomic_location: Option<SummaryLocation>,

    #[serde(default, alias = "strandSign")]
    pub strand_sign: Option<String>,

    #[serde(default, alias = "variantType")]
    pub variant_type: Option<String>,

    #[serde(default, alias = "canonicalTranscriptId")]
    pub canonical_transcript_id: Option<String>,

    #[serde(default, alias = "transcriptConsequences", deserialize_with = "de::null_as_default")]
    pub transcript_consequences: Vec<TranscriptConsequence>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryLocation {
    #[serde(default, deserialize_with = "de::lossy_string")]
    pub chromosome: Option<String>,
    #[serde(default, deserialize_with = "de::lossy_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "de::lossy_string")]
    pub end: Option<String>,
    #[serde(default, alias = "referenceAllele")]
    pub reference_allele: Option<String>,
    #[serde(default, alias = "variantAllele")]
    pub variant_allele: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranscriptConsequence {
    #[serde(default, alias = "transcriptId")]
    pub transcript_id: Option<String>,

    #[serde(default, alias = "hugoGeneSymbol", alias = "gene_symbol")]
    pub hugo_gene_symbol: Option<String>,

    #[serde(default, alias = "entrezGeneId", deserialize_with = "de::lossy_string")]
    pub entrez_gene_id: Option<String>,

    #[serde(default, alias = "variantClassification")]
    pub variant_classification: Option<String>,

    #[serde(default)]
    pub hgvsc: Option<String>,

    #[serde(default)]
    pub hgvsp: Option<String>,

    #[serde(default, alias = "hgvspShort")]
    pub hgvsp_short: Option<String>,

    #[serde(default, alias = "proteinPosition")]
    pub protein_position: Option<ProteinPosition>,

    #[serde(default, alias = "codonChange", alias = "codons")]
    pub codon_change: Option<String>,

    #[serde(default, alias = "refSeq")]
    pub ref_seq: Option<String>,

    #[serde(default, alias = "consequenceTerms", deserialize_with = "de::terms")]
    pub consequence_terms: Vec<String>,

    /// Service-side canonical marker ("1" / true).
    #[serde(default, deserialize_with = "de::lossy_string")]
    pub canonical: Option<String>,
}

impl TranscriptConsequence {
    pub fn is_canonical(&self) -> bool {
        matches!(self.canonical.as_deref(), Some("1") | Some("true"))
    }

    pub fn has_consequence(&self, term: &str) -> bool {
        self.consequence_terms.iter().any(|t| t == term)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProteinPosition {
    #[serde(default, deserialize_with = "de::lossy_string")]
    pub start: Option<String>,
    #[serde(default, deserialize_with = "de::lossy_string")]
    pub end: Option<String>,
}

/// A known variant at the queried position, source of population frequencies.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColocatedVariant {
    #[serde(default, rename = "dbSnpId", alias = "db_snp_id")]
    pub db_snp_id: Option<String>,

    #[serde(default, alias = "gnomadAfrAllele")]
    pub gnomad_afr_allele: Option<String>,
    #[serde(default, alias = "gnomadAfrMaf", deserialize_with = "de::lossy_string")]
    pub gnomad_afr_maf: Option<String>,

    #[serde(default, alias = "gnomadEasAllele")]
    pub gnomad_eas_allele: Option<String>,
    #[serde(default, alias = "gnomadEasMaf", deserialize_with = "de::lossy_string")]
    pub gnomad_eas_maf: Option<String>,

    #[serde(default, alias = "gnomadNfeAllele")]
    pub gnomad_nfe_allele: Option<String>,
    #[serde(default, alias = "gnomadNfeMaf", deserialize_with = "de::lossy_string")]
    pub gnomad_nfe_maf: Option<String>,
}

impl ColocatedVariant {
    /// The afr/eas/nfe allele fields that are present.
    pub fn present_gnomad_alleles(&self) -> impl Iterator<Item = &str> {
        [&self.gnomad_afr_allele, &self.gnomad_eas_allele, &self.gnomad_nfe_allele]
            .into_iter()
            .filter_map(|a| a.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationAssessor {
    #[serde(default)]
    pub annotation: Option<MutationAssessorAnnotation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MutationAssessorAnnotation {
    #[serde(default, alias = "functionalImpact")]
    pub functional_impact: Option<String>,
    #[serde(default, alias = "functionalImpactScore", deserialize_with = "de::lossy_string")]
    pub functional_impact_score: Option<String>,
    #[serde(default, alias = "msaLink")]
    pub msa_link: Option<String>,
    #[serde(default, alias = "pdbLink")]
    pub pdb_link: Option<String>,
}

mod de {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    /// Strings, numbers and booleans all read as `Some(String)`; null as `None`.
    pub fn lossy_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }

    /// Consequence terms arrive either as a list or as one comma-separated string.
    pub fn terms<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        Ok(match Option::<Value>::deserialize(d)? {
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
