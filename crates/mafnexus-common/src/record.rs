//! MAF record model.
//!
//! The standard MAF columns are declared once, statically, in [`maf_columns!`]:
//! each entry yields an enum variant, a typed field on [`MafFields`] and the
//! column name used in file headers. Header names that miss the registry are
//! routed to the record's [`ExtensionMap`].

use serde::{Deserialize, Serialize};

macro_rules! maf_columns {
    ($( $variant:ident => $field:ident : $name:literal ),+ $(,)?) => {
        /// A standard MAF column, in canonical output order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum MafColumn {
            $($variant),+
        }

        impl MafColumn {
            /// Every standard column in declaration (= output) order.
            pub const ALL: &'static [MafColumn] = &[$(MafColumn::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(MafColumn::$variant => $name),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(MafColumn::$variant),)+
                    _ => None,
                }
            }
        }

        /// Typed storage for the standard MAF columns.
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
        pub struct MafFields {
            $(pub $field: String),+
        }

        impl MafFields {
            pub fn get(&self, column: MafColumn) -> &str {
                match column {
                    $(MafColumn::$variant => &self.$field),+
                }
            }

            pub fn slot_mut(&mut self, column: MafColumn) -> &mut String {
                match column {
                    $(MafColumn::$variant => &mut self.$field),+
                }
            }
        }
    };
}

maf_columns! {
    HugoSymbol => hugo_symbol: "Hugo_Symbol",
    EntrezGeneId => entrez_gene_id: "Entrez_Gene_Id",
    Center => center: "Center",
    NcbiBuild => ncbi_build: "NCBI_Build",
    Chromosome => chromosome: "Chromosome",
    StartPosition => start_position: "Start_Position",
    EndPosition => end_position: "End_Position",
    Strand => strand: "Strand",
    VariantClassification => variant_classification: "Variant_Classification",
    VariantType => variant_type: "Variant_Type",
    ReferenceAllele => reference_allele: "Reference_Allele",
    TumorSeqAllele1 => tumor_seq_allele1: "Tumor_Seq_Allele1",
    TumorSeqAllele2 => tumor_seq_allele2: "Tumor_Seq_Allele2",
    DbSnpRs => dbsnp_rs: "dbSNP_RS",
    DbSnpValStatus => dbsnp_val_status: "dbSNP_Val_Status",
    TumorSampleBarcode => tumor_sample_barcode: "Tumor_Sample_Barcode",
    MatchedNormSampleBarcode => matched_norm_sample_barcode: "Matched_Norm_Sample_Barcode",
    MatchNormSeqAllele1 => match_norm_seq_allele1: "Match_Norm_Seq_Allele1",
    MatchNormSeqAllele2 => match_norm_seq_allele2: "Match_Norm_Seq_Allele2",
    TumorValidationAllele1 => tumor_validation_allele1: "Tumor_Validation_Allele1",
    TumorValidationAllele2 => tumor_validation_allele2: "Tumor_Validation_Allele2",
    MatchNormValidationAllele1 => match_norm_validation_allele1: "Match_Norm_Validation_Allele1",
    MatchNormValidationAllele2 => match_norm_validation_allele2: "Match_Norm_Validation_Allele2",
    VerificationStatus => verification_status: "Verification_Status",
    ValidationStatus => validation_status: "Validation_Status",
    MutationStatus => mutation_status: "Mutation_Status",
    SequencingPhase => sequencing_phase: "Sequencing_Phase",
    SequenceSource => sequence_source: "Sequence_Source",
    ValidationMethod => validation_method: "Validation_Method",
    Score => score: "Score",
    BamFile => bam_file: "BAM_File",
    Sequencer => sequencer: "Sequencer",
    TumorSampleUuid => tumor_sample_uuid: "Tumor_Sample_UUID",
    MatchedNormSampleUuid => matched_norm_sample_uuid: "Matched_Norm_Sample_UUID",
    TRefCount => t_ref_count: "t_ref_count",
    TAltCount => t_alt_count: "t_alt_count",
    NRefCount => n_ref_count: "n_ref_count",
    NAltCount => n_alt_count: "n_alt_count",
}

// ── Extension map ─────────────────────────────────────────────────────────────

/// Non-standard columns of a record, kept in first-seen order.
///
/// Keys naming a standard column are refused so an extension can never
/// shadow a typed field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionMap {
    entries: Vec<(String, String)>,
}

impl ExtensionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `key`. Returns `false` (and stores nothing) when
    /// `key` is a standard MAF column.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> bool {
        let key = key.into();
        if MafColumn::from_name(&key).is_some() {
            return false;
        }
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries sorted by key, for serialization.
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut out: Vec<_> = self.iter().collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One data line of a MAF file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub fields: MafFields,
    extensions: ExtensionMap,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a header and the cells of one data line.
    /// Cells beyond the header are ignored; missing cells read as "".
    pub fn from_row<S: AsRef<str>>(header: &[String], cells: &[S]) -> Self {
        let mut record = Record::new();
        for (i, name) in header.iter().enumerate() {
            let value = cells.get(i).map(|c| c.as_ref()).unwrap_or("");
            match MafColumn::from_name(name) {
                Some(column) => record.set(column, value),
                None => {
                    record.extensions.insert(name.as_str(), value);
                }
            }
        }
        record
    }

    pub fn get(&self, column: MafColumn) -> &str {
        self.fields.get(column)
    }

    pub fn set(&mut self, column: MafColumn, value: impl Into<String>) {
        *self.fields.slot_mut(column) = value.into();
    }

    /// Look up any column by header name, standard or extension.
    pub fn value(&self, name: &str) -> Option<&str> {
        match MafColumn::from_name(name) {
            Some(column) => Some(self.get(column)),
            None => self.extensions.get(name),
        }
    }

    pub fn extensions(&self) -> &ExtensionMap {
        &self.extensions
    }

    /// Cells in the order of `header`; unknown names yield "".
    pub fn to_row(&self, header: &[String]) -> Vec<String> {
        header
            .iter()
            .map(|name| self.value(name).unwrap_or("").to_string())
            .collect()
    }

    pub fn sample_id(&self) -> &str {
        self.get(MafColumn::TumorSampleBarcode)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
