//! Code lookup tables.
//!
//! A data-driven descriptor table maps a normalised item name to the terminology term it is
//! coded with. Tables are built once, never mutated, and shared by reference across requests.
//!
//! A miss is an expected outcome: callers degrade by omitting the code, never by inventing one.

use crate::constants::{LOINC_SYSTEM, SNOMED_SYSTEM};
use fhir::CodeableTerm;
use std::collections::HashMap;

/// The group a descriptor belongs to. The same name may appear in several groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TermCategory {
    OralCancerIndicator,
    LungCancerIndicator,
    Comorbidity,
    WomensHealth,
    Allergen,
}

impl TermCategory {
    pub const ALL: [TermCategory; 5] = [
        TermCategory::OralCancerIndicator,
        TermCategory::LungCancerIndicator,
        TermCategory::Comorbidity,
        TermCategory::WomensHealth,
        TermCategory::Allergen,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TermCategory::OralCancerIndicator => "oral cancer indicator",
            TermCategory::LungCancerIndicator => "lung cancer indicator",
            TermCategory::Comorbidity => "comorbidity",
            TermCategory::WomensHealth => "women's health observation",
            TermCategory::Allergen => "allergen",
        }
    }
}

/// One row of the lookup table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TermDescriptor {
    /// Canonical display name.
    pub name: &'static str,
    /// Extra spellings accepted for the same term.
    pub aliases: &'static [&'static str],
    pub system: &'static str,
    pub code: &'static str,
    pub category: TermCategory,
}

impl TermDescriptor {
    pub fn term(&self) -> CodeableTerm {
        CodeableTerm::new(self.system, self.code, self.name)
    }
}

const fn loinc(
    name: &'static str,
    aliases: &'static [&'static str],
    code: &'static str,
    category: TermCategory,
) -> TermDescriptor {
    TermDescriptor {
        name,
        aliases,
        system: LOINC_SYSTEM,
        code,
        category,
    }
}

const fn snomed(name: &'static str, code: &'static str, category: TermCategory) -> TermDescriptor {
    TermDescriptor {
        name,
        aliases: &[],
        system: SNOMED_SYSTEM,
        code,
        category,
    }
}

use TermCategory::*;

static STANDARD_TERMS: &[TermDescriptor] = &[
    // Oral cancer work-up
    loinc("FNAC report", &[], "87179-8", OralCancerIndicator),
    loinc(
        "CECT head neck thorax report/ PET Ct/ MRI",
        &["cect head neck thorax report/pet ct/mri"],
        "24627-2",
        OralCancerIndicator,
    ),
    // Lung cancer work-up
    loinc("2 D ECHO with PASP", &["2d echo with pasp"], "34552-0", LungCancerIndicator),
    loinc("FDG PETCT", &["fdg pet ct"], "81553-0", LungCancerIndicator),
    loinc("MRI brain", &[], "24590-2", LungCancerIndicator),
    loinc("Fiber optic bronchoscopy", &["fibre optic bronchoscopy"], "18744-3", LungCancerIndicator),
    loinc(
        "Endobronchial ultrasound with ROSE reports",
        &[],
        "100231-0",
        LungCancerIndicator,
    ),
    loinc("Pulmonary function tests with DLCO", &[], "58477-1", LungCancerIndicator),
    loinc("V/Q scan in pneumonectomy", &[], "39942-8", LungCancerIndicator),
    loinc("6MWT", &["6 minute walk test"], "64098-7", LungCancerIndicator),
    loinc(
        "Molecular markers/NGS as needed",
        &["molecular markers/nsg as needed"],
        "73977-1",
        LungCancerIndicator,
    ),
    // Co-morbidities
    snomed("Hypertension", "38341003", Comorbidity),
    snomed("Coronary artery disease", "53741008", Comorbidity),
    snomed("Chronic obstructive pulmonary disease", "13645005", Comorbidity),
    snomed("Diabetes mellitus", "73211009", Comorbidity),
    // Women's health
    loinc("Pregnancy status", &[], "82810-3", WomensHealth),
    loinc("Menstrual cycle", &[], "8678-5", WomensHealth),
    loinc("Obstetric history", &[], "10162-6", WomensHealth),
    loinc("Breast health", &[], "10193-1", WomensHealth),
    loinc("Age at menarche", &[], "42798-9", WomensHealth),
    // Allergens
    snomed("Penicillin", "764146007", Allergen),
    snomed("Peanut", "762952008", Allergen),
    snomed("Latex", "111088007", Allergen),
    snomed("Egg", "102263004", Allergen),
    snomed("Milk", "3718001", Allergen),
];

/// Normalises an item name for lookup: trimmed, lowercase, inner whitespace collapsed.
pub fn normalise_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Immutable name to term tables.
#[derive(Clone, Debug, Default)]
pub struct CodeTables {
    entries: Vec<TermDescriptor>,
    index: HashMap<(TermCategory, String), usize>,
}

impl CodeTables {
    /// The built-in tables for OP consultation documents.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_TERMS.iter().copied())
    }

    /// Builds tables from descriptors. Later descriptors never replace an earlier one with the
    /// same normalised name in the same category.
    pub fn from_entries(descriptors: impl IntoIterator<Item = TermDescriptor>) -> Self {
        let mut tables = Self::default();
        for descriptor in descriptors {
            let position = tables.entries.len();
            let keys = std::iter::once(descriptor.name).chain(descriptor.aliases.iter().copied());
            for key in keys {
                tables
                    .index
                    .entry((descriptor.category, normalise_name(key)))
                    .or_insert(position);
            }
            tables.entries.push(descriptor);
        }
        tables
    }

    /// Returns the descriptor for `name` within one category.
    pub fn descriptor(&self, category: TermCategory, name: &str) -> Option<&TermDescriptor> {
        self.index
            .get(&(category, normalise_name(name)))
            .and_then(|&i| self.entries.get(i))
    }

    /// Looks `name` up within one category.
    pub fn lookup_in(&self, category: TermCategory, name: &str) -> Option<CodeableTerm> {
        self.descriptor(category, name).map(TermDescriptor::term)
    }

    /// Looks `name` up across every category, returning the first match in category order.
    pub fn lookup(&self, name: &str) -> Option<(TermCategory, CodeableTerm)> {
        TermCategory::ALL
            .iter()
            .find_map(|&c| self.lookup_in(c, name).map(|term| (c, term)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
