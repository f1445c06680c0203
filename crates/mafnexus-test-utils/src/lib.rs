//! Shared test fixtures for the mafnexus workspace.
//!
//! - MAF fixture writers backed by `tempfile`
//! - Canned annotation service payloads

use std::path::{Path, PathBuf};

pub use pretty_assertions;
pub use tempfile::{tempdir, TempDir};

/// The minimal header accepted by strict checks, plus sample and allele 2.
pub const BASIC_HEADER: [&str; 8] = [
    "Hugo_Symbol",
    "Tumor_Sample_Barcode",
    "Chromosome",
    "Start_Position",
    "End_Position",
    "Reference_Allele",
    "Tumor_Seq_Allele1",
    "Tumor_Seq_Allele2",
];

/// Write a tab-separated MAF fixture into `dir` and return its path.
pub fn write_maf_fixture(
    dir: &Path,
    name: &str,
    comments: &[&str],
    header: &[&str],
    rows: &[&[&str]],
) -> PathBuf {
    let mut text = String::new();
    for comment in comments {
        text.push_str(comment);
        text.push('\n');
    }
    text.push_str(&header.join("\t"));
    text.push('\n');
    for row in rows {
        text.push_str(&row.join("\t"));
        text.push('\n');
    }
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write MAF fixture");
    path
}

/// Read a written table back as (header, rows), skipping `#` lines.
pub fn read_table(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let text = std::fs::read_to_string(path).expect("read table");
    let mut lines = text.lines().filter(|l| !l.starts_with('#'));
    let header = lines
        .next()
        .map(|l| l.split('\t').map(String::from).collect())
        .unwrap_or_default();
    let rows = lines.map(|l| l.split('\t').map(String::from).collect()).collect();
    (header, rows)
}

/// Column value of `row` by header name.
pub fn cell<'a>(header: &[String], row: &'a [String], name: &str) -> &'a str {
    header
        .iter()
        .position(|h| h == name)
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .unwrap_or_else(|| panic!("column {} not found", name))
}

// ── Canned payloads ───────────────────────────────────────────────────────────

/// BRAF V600E on GRCh37, with one colocated dbSNP variant.
pub fn braf_v600e_response() -> serde_json::Value {
    serde_json::json!({
        "variant": "7:g.140453136A>T",
        "assembly_name": "GRCh37",
        "most_severe_consequence": "missense_variant",
        "annotation_summary": {
            "variant": "7:g.140453136A>T",
            "genomicLocation": {
                "chromosome": "7",
                "start": 140453136,
                "end": 140453136,
                "referenceAllele": "A",
                "variantAllele": "T"
            },
            "strandSign": "-",
            "variantType": "SNP",
            "assemblyName": "GRCh37",
            "canonicalTranscriptId": "ENST00000288602",
            "transcriptConsequences": [{
                "transcriptId": "ENST00000288602",
                "hugoGeneSymbol": "BRAF",
                "entrezGeneId": "673",
                "variantClassification": "Missense_Mutation",
                "hgvsc": "ENST00000288602.6:c.1799T>A",
                "hgvsp": "p.Val600Glu",
                "hgvspShort": "p.V600E",
                "proteinPosition": {"start": 600, "end": 600},
                "codonChange": "gTg/gAg",
                "refSeq": "NM_004333.4",
                "consequenceTerms": "missense_variant"
            }]
        },
        "colocatedVariants": [
            {"dbSnpId": "COSM476"},
            {"dbSnpId": "rs113488022", "gnomad_nfe_allele": "T", "gnomad_nfe_maf": "1.8e-05"}
        ],
        "mutation_assessor": {
            "annotation": {
                "functionalImpact": "neutral",
                "functionalImpactScore": 0.805,
                "msaLink": "http://mutationassessor.org/r3/?cm=msa&ty=f&p=BRAF_HUMAN",
                "pdbLink": "http://mutationassessor.org/r3/pdb.php?prot=BRAF_HUMAN"
            }
        }
    })
}

/// An intronic variant with no transcript-level HGVS.
pub fn intron_response() -> serde_json::Value {
    serde_json::json!({
        "assembly_name": "GRCh37",
        "most_severe_consequence": "intron_variant",
        "annotation_summary": {
            "strandSign": "+",
            "variantType": "SNP",
            "transcriptConsequences": [{
                "transcriptId": "ENST00000269305",
                "hugoGeneSymbol": "TP53",
                "entrezGeneId": "7157",
                "variantClassification": "Intron",
                "consequenceTerms": ["intron_variant"]
            }]
        }
    })
}
