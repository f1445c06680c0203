//! Field resolution.
//!
//! Builds one [`AnnotatedRecord`] from the original record, the service
//! response, the chosen canonical transcript and the matched colocated
//! variant. The general rule is "fresh non-empty value, else original, else
//! empty", with the per-field exceptions encoded in [`FieldResolver::resolve_with`].

use regex::Regex;

use mafnexus_common::{MafColumn, Record};

use crate::canonical::CanonicalTranscriptSelector;
use crate::colocated::match_colocated_variant;
use crate::location::{derive_variant_allele, DerivedAllele};
use crate::models::{AnnotationResponse, ColocatedVariant, TranscriptConsequence};
use crate::outcome::AnnotationOutcome;

/// Annotation columns appended after the standard MAF columns.
pub const ANNOTATION_COLUMNS: [&str; 13] = [
    "HGVSc",
    "HGVSp",
    "HGVSp_Short",
    "Transcript_ID",
    "RefSeq",
    "Protein_position",
    "Codons",
    "Hotspot",
    "Consequence",
    "gnomAD_AFR_AF",
    "gnomAD_EAS_AF",
    "gnomAD_NFE_AF",
    "Annotation_Status",
];

/// Emitted only when mutation assessor enrichment is requested.
pub const MUTATION_ASSESSOR_COLUMNS: [&str; 4] = ["MA:FImpact", "MA:FIS", "MA:link.MSA", "MA:link.PDB"];

/// Extension column read as the last protein-position fallback.
const PROTEIN_POSITION_EXTENSION: &str = "Protein_position";

/// Output header: standard columns, annotation columns, optional mutation
/// assessor columns, then extension columns sorted by name. Extension names
/// that collide with any earlier column are dropped.
pub fn annotated_header<'a, I>(extension_columns: I, include_mutation_assessor: bool) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut header: Vec<String> = MafColumn::ALL.iter().map(|c| c.name().to_string()).collect();
    header.extend(ANNOTATION_COLUMNS.iter().map(|s| s.to_string()));
    if include_mutation_assessor {
        header.extend(MUTATION_ASSESSOR_COLUMNS.iter().map(|s| s.to_string()));
    }

    let mut extensions: Vec<&str> = extension_columns
        .into_iter()
        .filter(|name| {
            MafColumn::from_name(name).is_none()
                && !ANNOTATION_COLUMNS.contains(name)
                && !MUTATION_ASSESSOR_COLUMNS.contains(name)
        })
        .collect();
    extensions.sort_unstable();
    extensions.dedup();
    header.extend(extensions.into_iter().map(String::from));
    header
}

/// A record after resolution. `record` holds the resolved standard columns
/// and the untouched extension columns.
#[derive(Debug, Clone, Default)]
pub struct AnnotatedRecord {
    pub record: Record,
    pub variant_allele: String,
    pub ambiguous_allele: bool,

    pub hgvsc: String,
    pub hgvsp: String,
    pub hgvsp_short: String,
    pub transcript_id: String,
    pub refseq: String,
    pub protein_position_start: String,
    pub protein_position_end: String,
    pub protein_position: String,
    pub codon_change: String,
    pub hotspot: String,
    pub consequence: String,

    pub gnomad_afr_af: String,
    pub gnomad_eas_af: String,
    pub gnomad_nfe_af: String,
    pub dbsnp_id: String,

    pub ma_functional_impact: String,
    pub ma_functional_impact_score: String,
    pub ma_msa_link: String,
    pub ma_pdb_link: String,

    pub status: AnnotationOutcome,
}

impl AnnotatedRecord {
    pub fn get(&self, column: MafColumn) -> &str {
        self.record.get(column)
    }

    /// Any output column by name.
    pub fn value(&self, name: &str) -> Option<&str> {
        let v = match name {
            "HGVSc" => &self.hgvsc,
            "HGVSp" => &self.hgvsp,
            "HGVSp_Short" => &self.hgvsp_short,
            "Transcript_ID" => &self.transcript_id,
            "RefSeq" => &self.refseq,
            "Protein_position" => &self.protein_position,
            "Codons" => &self.codon_change,
            "Hotspot" => &self.hotspot,
            "Consequence" => &self.consequence,
            "gnomAD_AFR_AF" => &self.gnomad_afr_af,
            "gnomAD_EAS_AF" => &self.gnomad_eas_af,
            "gnomAD_NFE_AF" => &self.gnomad_nfe_af,
            "Annotation_Status" => return Some(self.status.label()),
            "MA:FImpact" => &self.ma_functional_impact,
            "MA:FIS" => &self.ma_functional_impact_score,
            "MA:link.MSA" => &self.ma_msa_link,
            "MA:link.PDB" => &self.ma_pdb_link,
            _ => return self.record.value(name),
        };
        Some(v.as_str())
    }

    pub fn to_row(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|name| self.value(name).unwrap_or("").to_string())
            .collect()
    }
}

// ── Resolver ──────────────────────────────────────────────────────────────────

pub struct FieldResolver {
    replace_symbol_entrez: bool,
    re_protein_start: Regex,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn or_empty(value: Option<&str>) -> String {
    value.unwrap_or("").to_string()
}

/// Annotation-only transcript fields never fall back to the original record.
fn transcript_field<F>(canonical: Option<&TranscriptConsequence>, f: F) -> String
where
    F: Fn(&TranscriptConsequence) -> Option<&str>,
{
    or_empty(canonical.and_then(f))
}

impl FieldResolver {
    pub fn new(replace_symbol_entrez: bool) -> Self {
        Self {
            replace_symbol_entrez,
            re_protein_start: Regex::new(r"^p\.[A-Za-z](\d+)").expect("static pattern"),
        }
    }

    /// Select the canonical transcript and colocated match from `response`,
    /// then resolve. A `None` response (failed call) resolves from the
    /// original record alone.
    pub fn resolve(
        &self,
        record: &Record,
        response: Option<&AnnotationResponse>,
        selector: &dyn CanonicalTranscriptSelector,
    ) -> AnnotatedRecord {
        let canonical = response.and_then(|r| {
            selector.select(r.transcript_consequences(), r.most_severe_consequence.as_deref())
        });
        let colocated = response.and_then(|r| {
            match_colocated_variant(&r.colocated_variants, record.get(MafColumn::TumorSeqAllele1))
        });
        self.resolve_with(record, response, canonical, colocated)
    }

    pub fn resolve_with(
        &self,
        original: &Record,
        response: Option<&AnnotationResponse>,
        canonical: Option<&TranscriptConsequence>,
        colocated: Option<&ColocatedVariant>,
    ) -> AnnotatedRecord {
        let summary = response.and_then(|r| r.annotation_summary.as_ref());
        let location = response.and_then(|r| r.genomic_location());
        let mut record = original.clone();

        // Gene identity is only replaced on request.
        if self.replace_symbol_entrez {
            if let Some(symbol) = non_empty(canonical.and_then(|t| t.hugo_gene_symbol.as_deref())) {
                record.set(MafColumn::HugoSymbol, symbol);
            }
            if let Some(entrez) = non_empty(canonical.and_then(|t| t.entrez_gene_id.as_deref())) {
                record.set(MafColumn::EntrezGeneId, entrez);
            }
        }

        let located = [
            (MafColumn::Chromosome, location.and_then(|l| l.chromosome.as_deref())),
            (MafColumn::StartPosition, location.and_then(|l| l.start.as_deref())),
            (MafColumn::EndPosition, location.and_then(|l| l.end.as_deref())),
            (MafColumn::ReferenceAllele, location.and_then(|l| l.reference_allele.as_deref())),
        ];
        for (column, fresh) in located {
            if let Some(v) = non_empty(fresh) {
                record.set(column, v);
            }
        }

        if let Some(assembly) = non_empty(response.and_then(|r| r.assembly_name.as_deref())) {
            record.set(MafColumn::NcbiBuild, assembly);
        }
        if let Some(strand) = non_empty(summary.and_then(|s| s.strand_sign.as_deref())) {
            record.set(MafColumn::Strand, strand);
        }
        if let Some(class) = non_empty(canonical.and_then(|t| t.variant_classification.as_deref())) {
            record.set(MafColumn::VariantClassification, class);
        }
        // No fallback to the original variant type.
        record.set(
            MafColumn::VariantType,
            or_empty(summary.and_then(|s| s.variant_type.as_deref())),
        );

        let DerivedAllele { allele, ambiguous } = derive_variant_allele(
            original.get(MafColumn::ReferenceAllele),
            original.get(MafColumn::TumorSeqAllele1),
            original.get(MafColumn::TumorSeqAllele2),
        );
        let variant_allele = non_empty(location.and_then(|l| l.variant_allele.as_deref()))
            .map(String::from)
            .unwrap_or(allele);

        let hgvsp_short = transcript_field(canonical, |t| t.hgvsp_short.as_deref());
        let position = canonical.and_then(|t| t.protein_position.as_ref());
        let protein_position_start = or_empty(position.and_then(|p| p.start.as_deref()));
        let protein_position_end = or_empty(position.and_then(|p| p.end.as_deref()));
        let protein_position = self.protein_position(&protein_position_start, &hgvsp_short, original);

        let (gnomad_afr_af, gnomad_eas_af, gnomad_nfe_af, dbsnp_id) = match colocated {
            Some(cv) => (
                or_empty(cv.gnomad_afr_maf.as_deref()),
                or_empty(cv.gnomad_eas_maf.as_deref()),
                or_empty(cv.gnomad_nfe_maf.as_deref()),
                or_empty(cv.db_snp_id.as_deref()),
            ),
            None => Default::default(),
        };
        if !dbsnp_id.is_empty() {
            record.set(MafColumn::DbSnpRs, dbsnp_id.as_str());
        }

        let assessor = response
            .and_then(|r| r.mutation_assessor.as_ref())
            .and_then(|m| m.annotation.as_ref());

        AnnotatedRecord {
            record,
            variant_allele,
            ambiguous_allele: ambiguous,
            hgvsc: transcript_field(canonical, |t| t.hgvsc.as_deref()),
            hgvsp: transcript_field(canonical, |t| t.hgvsp.as_deref()),
            hgvsp_short,
            transcript_id: transcript_field(canonical, |t| t.transcript_id.as_deref()),
            refseq: transcript_field(canonical, |t| t.ref_seq.as_deref()),
            protein_position_start,
            protein_position_end,
            protein_position,
            codon_change: transcript_field(canonical, |t| t.codon_change.as_deref()),
            hotspot: "0".to_string(),
            consequence: canonical.map(|t| t.consequence_terms.join(",")).unwrap_or_default(),
            gnomad_afr_af,
            gnomad_eas_af,
            gnomad_nfe_af,
            dbsnp_id,
            ma_functional_impact: or_empty(assessor.and_then(|a| a.functional_impact.as_deref())),
            ma_functional_impact_score: or_empty(assessor.and_then(|a| a.functional_impact_score.as_deref())),
            ma_msa_link: or_empty(assessor.and_then(|a| a.msa_link.as_deref())),
            ma_pdb_link: or_empty(assessor.and_then(|a| a.pdb_link.as_deref())),
            status: AnnotationOutcome::default(),
        }
    }

    /// Start position, else the residue number in `p.V600E`, else the
    /// record's own `Protein_position` column.
    fn protein_position(&self, start: &str, hgvsp_short: &str, original: &Record) -> String {
        if !start.is_empty() {
            return start.to_string();
        }
        if let Some(caps) = self.re_protein_start.captures(hgvsp_short) {
            return caps[1].to_string();
        }
        or_empty(original.extensions().get(PROTEIN_POSITION_EXTENSION))
    }
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::new(false)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
