//! The eleven supported clinical vocabularies and their per-vocabulary defaults
//!
//! Every vocabulary maps to one endpoint of the Clinical Table Search Service
//! plus a set of default field lists used when the caller does not override
//! them. The defaults live in one table per vocabulary so they stay auditable
//! and testable; nothing is derived from another vocabulary's entry.

use crate::search::error::SearchError;

/// A clinical code system reachable through the lookup tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vocabulary {
    Icd10Cm,
    Icd11,
    HcpcsLii,
    NpiOrganizations,
    NpiIndividuals,
    HpoVocabulary,
    Conditions,
    RxTerms,
    LoincQuestions,
    NcbiGenes,
    MajorSurgeriesImplants,
}

/// All vocabularies in the fixed wire order used by validation messages
pub const ALL_VOCABULARIES: [Vocabulary; 11] = [
    Vocabulary::Icd10Cm,
    Vocabulary::Icd11,
    Vocabulary::HcpcsLii,
    Vocabulary::NpiOrganizations,
    Vocabulary::NpiIndividuals,
    Vocabulary::HpoVocabulary,
    Vocabulary::Conditions,
    Vocabulary::RxTerms,
    Vocabulary::LoincQuestions,
    Vocabulary::NcbiGenes,
    Vocabulary::MajorSurgeriesImplants,
];

/// How a vocabulary's positional display array becomes the `display` value
#[derive(Debug, Clone, Copy)]
pub enum DisplayMapping {
    /// Join all display-array elements with `" | "` (the common case)
    JoinWithPipe,
    /// Pick fixed display-array indices into named result fields
    Positional {
        display_index: usize,
        named: &'static [(usize, &'static str)],
    },
}

/// Immutable per-vocabulary configuration record
#[derive(Debug, Clone, Copy)]
pub struct VocabularyDefaults {
    /// Endpoint segment under `/api/<path>/v3/search`
    pub path: &'static str,
    /// Default `sf` (search field) list
    pub search_fields: &'static str,
    /// Default `df` (display field) list
    pub display_fields: &'static str,
    /// Default `cf` (code field) name
    pub code_field: &'static str,
    /// Default `ef` (extra field) list, when the vocabulary has one
    pub extra_fields: Option<&'static str>,
    /// Display-array handling for this vocabulary
    pub display: DisplayMapping,
    /// Upstream extra-field name to output key renames
    pub renames: &'static [(&'static str, &'static str)],
    /// Human-readable description shown in the tool schema
    pub description: &'static str,
}

const NPI_NAMED_FIELDS: &[(usize, &str)] = &[(2, "providerType"), (3, "address")];

const ICD10CM: VocabularyDefaults = VocabularyDefaults {
    path: "icd10cm",
    search_fields: "code,name",
    display_fields: "code,name",
    code_field: "code",
    extra_fields: None,
    display: DisplayMapping::JoinWithPipe,
    renames: &[],
    description: "ICD-10-CM diagnosis codes",
};

const ICD11: VocabularyDefaults = VocabularyDefaults {
    path: "icd11_codes",
    search_fields: "code,title",
    display_fields: "code,title",
    code_field: "code",
    extra_fields: None,
    display: DisplayMapping::JoinWithPipe,
    renames: &[],
    description: "ICD-11 classification codes",
};

const HCPCS: VocabularyDefaults = VocabularyDefaults {
    path: "hcpcs",
    search_fields: "code,display",
    display_fields: "code,display",
    code_field: "code",
    extra_fields: None,
    display: DisplayMapping::JoinWithPipe,
    renames: &[],
    description: "HCPCS Level II procedure and supply codes",
};

const NPI_ORG: VocabularyDefaults = VocabularyDefaults {
    path: "npi_org",
    search_fields: "NPI,name.full,addr_practice.full",
    display_fields: "NPI,name.full,provider_type,addr_practice.full",
    code_field: "NPI",
    extra_fields: None,
    display: DisplayMapping::Positional {
        display_index: 1,
        named: NPI_NAMED_FIELDS,
    },
    renames: &[],
    description: "NPI registry, healthcare organizations",
};

const NPI_IDV: VocabularyDefaults = VocabularyDefaults {
    path: "npi_idv",
    search_fields: "NPI,name.full,provider_type,addr_practice.full",
    display_fields: "NPI,name.full,provider_type,addr_practice.full",
    code_field: "NPI",
    extra_fields: None,
    display: DisplayMapping::Positional {
        display_index: 1,
        named: NPI_NAMED_FIELDS,
    },
    renames: &[],
    description: "NPI registry, individual providers",
};

const HPO: VocabularyDefaults = VocabularyDefaults {
    path: "hpo",
    search_fields: "name,synonym.term,id",
    display_fields: "id,name",
    code_field: "id",
    extra_fields: None,
    display: DisplayMapping::JoinWithPipe,
    renames: &[],
    description: "Human Phenotype Ontology terms",
};

const CONDITIONS: VocabularyDefaults = VocabularyDefaults {
    path: "conditions",
    search_fields: "primary_name,consumer_name,word_synonyms,synonyms",
    display_fields: "primary_name",
    code_field: "key_id",
    extra_fields: Some("icd10cm_codes"),
    display: DisplayMapping::JoinWithPipe,
    renames: &[("icd10cm_codes", "icd10cmCodes")],
    description: "Consumer-oriented medical conditions",
};

const RXTERMS: VocabularyDefaults = VocabularyDefaults {
    path: "rxterms",
    search_fields: "DISPLAY_NAME",
    display_fields: "DISPLAY_NAME",
    code_field: "RXCUIS",
    extra_fields: Some("STRENGTHS_AND_FORMS,RXCUIS"),
    display: DisplayMapping::JoinWithPipe,
    renames: &[
        ("STRENGTHS_AND_FORMS", "strengthsAndForms"),
        ("RXCUIS", "rxcuis"),
    ],
    description: "RxTerms drug names with strengths and forms",
};

const LOINC_ITEMS: VocabularyDefaults = VocabularyDefaults {
    path: "loinc_items",
    search_fields: "text,code",
    display_fields: "text",
    code_field: "code",
    extra_fields: None,
    display: DisplayMapping::JoinWithPipe,
    renames: &[],
    description: "LOINC question items",
};

const NCBI_GENES: VocabularyDefaults = VocabularyDefaults {
    path: "ncbi_genes",
    search_fields: "Symbol,name",
    display_fields: "Symbol,description",
    code_field: "GeneID",
    extra_fields: Some("type_of_gene,chromosome"),
    display: DisplayMapping::JoinWithPipe,
    renames: &[("type_of_gene", "typeOfGene")],
    description: "NCBI gene symbols and descriptions",
};

const PROCEDURES: VocabularyDefaults = VocabularyDefaults {
    path: "procedures",
    search_fields: "consumer_name,primary_name",
    display_fields: "consumer_name",
    code_field: "key_id",
    extra_fields: None,
    display: DisplayMapping::JoinWithPipe,
    renames: &[],
    description: "Major surgeries and implants",
};

impl Vocabulary {
    /// Wire name of the vocabulary as callers send it in `method`
    pub fn as_str(&self) -> &'static str {
        match self {
            Vocabulary::Icd10Cm => "icd-10-cm",
            Vocabulary::Icd11 => "icd-11",
            Vocabulary::HcpcsLii => "hcpcs-LII",
            Vocabulary::NpiOrganizations => "npi-organizations",
            Vocabulary::NpiIndividuals => "npi-individuals",
            Vocabulary::HpoVocabulary => "hpo-vocabulary",
            Vocabulary::Conditions => "conditions",
            Vocabulary::RxTerms => "rx-terms",
            Vocabulary::LoincQuestions => "loinc-questions",
            Vocabulary::NcbiGenes => "ncbi-genes",
            Vocabulary::MajorSurgeriesImplants => "major-surgeries-implants",
        }
    }

    /// Parse a caller-supplied method name against the closed vocabulary set
    pub fn parse(method: &str) -> Result<Self, SearchError> {
        ALL_VOCABULARIES
            .iter()
            .copied()
            .find(|v| v.as_str() == method)
            .ok_or_else(|| SearchError::validation(unknown_method_message()))
    }

    /// Per-vocabulary default field lists and endpoint path
    pub fn defaults(&self) -> &'static VocabularyDefaults {
        match self {
            Vocabulary::Icd10Cm => &ICD10CM,
            Vocabulary::Icd11 => &ICD11,
            Vocabulary::HcpcsLii => &HCPCS,
            Vocabulary::NpiOrganizations => &NPI_ORG,
            Vocabulary::NpiIndividuals => &NPI_IDV,
            Vocabulary::HpoVocabulary => &HPO,
            Vocabulary::Conditions => &CONDITIONS,
            Vocabulary::RxTerms => &RXTERMS,
            Vocabulary::LoincQuestions => &LOINC_ITEMS,
            Vocabulary::NcbiGenes => &NCBI_GENES,
            Vocabulary::MajorSurgeriesImplants => &PROCEDURES,
        }
    }

    /// Output key for an upstream extra-field name, applying vocabulary renames
    pub fn output_field_name(&self, upstream: &str) -> String {
        self.defaults()
            .renames
            .iter()
            .find(|(from, _)| *from == upstream)
            .map(|(_, to)| (*to).to_string())
            .unwrap_or_else(|| upstream.to_string())
    }
}

/// Validation message enumerating the permitted methods in fixed order
pub fn unknown_method_message() -> String {
    let names: Vec<&str> = ALL_VOCABULARIES.iter().map(|v| v.as_str()).collect();
    format!("method must be one of: {}", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_wire_name() {
        for vocab in ALL_VOCABULARIES {
            let parsed = Vocabulary::parse(vocab.as_str()).unwrap();
            assert_eq!(parsed, vocab);
        }
    }

    #[test]
    fn unknown_method_lists_all_eleven_in_order() {
        let err = Vocabulary::parse("snomed-ct").unwrap_err();
        let message = err.to_string();
        assert_eq!(
            message,
            "method must be one of: icd-10-cm, icd-11, hcpcs-LII, npi-organizations, \
             npi-individuals, hpo-vocabulary, conditions, rx-terms, loinc-questions, \
             ncbi-genes, major-surgeries-implants"
        );
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(Vocabulary::parse("ICD-10-CM").is_err());
        assert!(Vocabulary::parse("hcpcs-lii").is_err());
    }

    #[test]
    fn every_vocabulary_has_nonempty_defaults() {
        for vocab in ALL_VOCABULARIES {
            let defaults = vocab.defaults();
            assert!(!defaults.path.is_empty());
            assert!(!defaults.search_fields.is_empty());
            assert!(!defaults.display_fields.is_empty());
            assert!(!defaults.code_field.is_empty());
        }
    }

    #[test]
    fn rxterms_extra_fields_are_renamed() {
        assert_eq!(
            Vocabulary::RxTerms.output_field_name("STRENGTHS_AND_FORMS"),
            "strengthsAndForms"
        );
        // Unrenamed fields pass through untouched
        assert_eq!(Vocabulary::RxTerms.output_field_name("other"), "other");
    }
}
