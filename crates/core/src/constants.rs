//! Constants used throughout the assembly engine.
//!
//! Code systems, structure-definition profiles, fixed document metadata and section headers.
//! Per-item terminology lives in [`crate::terminology`] and [`crate::matcher`], not here.

pub use fhir::datatypes::{LOINC_SYSTEM, SNOMED_SYSTEM};

/// Default BCP-47 language tag of generated documents.
pub const DEFAULT_LANGUAGE: &str = "en-IN";

/// Default system URI for document and bundle identifiers.
pub const DEFAULT_IDENTIFIER_SYSTEM: &str = "https://ndhm.in/phr";

pub const CONDITION_CLINICAL_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/condition-clinical";
pub const ALLERGY_CLINICAL_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-clinical";
pub const ALLERGY_VERIFICATION_SYSTEM: &str =
    "http://terminology.hl7.org/CodeSystem/allergyintolerance-verification";

// Profiles
pub const PROFILE_OP_CONSULT_RECORD: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/OPConsultRecord";
pub const PROFILE_CONDITION: &str = "https://nrces.in/ndhm/fhir/r4/StructureDefinition/Condition";
pub const PROFILE_OBSERVATION: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/Observation";
pub const PROFILE_OBSERVATION_WOMEN_HEALTH: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/ObservationWomenHealth";
pub const PROFILE_DIAGNOSTIC_REPORT: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/DiagnosticReportLab";
pub const PROFILE_DOCUMENT_REFERENCE: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/DocumentReference";
pub const PROFILE_ALLERGY_INTOLERANCE: &str =
    "https://nrces.in/ndhm/fhir/r4/StructureDefinition/AllergyIntolerance";

// Document header
pub const DOCUMENT_TITLE: &str = "OP Consultation Record";
pub const DOCUMENT_TYPE_CODE: &str = "371530004";
pub const DOCUMENT_TYPE_DISPLAY: &str = "Clinical consultation report";

// Section headers (SNOMED CT)
pub const DIAGNOSTIC_REPORTS_TITLE: &str = "Diagnostic Reports";
pub const DIAGNOSTIC_REPORTS_CODE: &str = "721981007";
pub const DIAGNOSTIC_REPORTS_DISPLAY: &str = "Diagnostic studies report";

pub const ORAL_CANCER_TITLE: &str = "Oral Cancer History";
pub const LUNG_CANCER_TITLE: &str = "Lung Cancer History";
pub const MEDICAL_HISTORY_CODE: &str = "371529009";
pub const MEDICAL_HISTORY_DISPLAY: &str = "History and physical report";

pub const COMORBIDITIES_TITLE: &str = "Co-morbidities";
pub const COMORBIDITIES_CODE: &str = "398192003";
pub const COMORBIDITIES_DISPLAY: &str = "Co-morbid conditions";

pub const WOMEN_HEALTH_TITLE: &str = "Women's Health Observations";
pub const WOMEN_HEALTH_CODE: &str = "404684003";
pub const WOMEN_HEALTH_DISPLAY: &str = "Clinical finding";

pub const ALLERGIES_TITLE: &str = "Allergies";
pub const ALLERGIES_CODE: &str = "722446000";
pub const ALLERGIES_DISPLAY: &str = "Allergy record";

// Cancer conditions (SNOMED CT)
pub const ORAL_CANCER_CODE: &str = "363505006";
pub const ORAL_CANCER_DISPLAY: &str = "Malignant tumor of oral cavity";
pub const LUNG_CANCER_CODE: &str = "363358000";
pub const LUNG_CANCER_DISPLAY: &str = "Malignant tumor of lung";

// Diagnostics
pub const CBC_CODE: &str = "26604007";
pub const CBC_DISPLAY: &str = "Complete blood count";
pub const HAEMOGLOBIN_CODE: &str = "718-7";
pub const HAEMOGLOBIN_DISPLAY: &str = "Hemoglobin [Mass/volume] in Blood";
pub const GRAM_PER_DECILITER: &str = "g/dL";
pub const BIOPSY_HISTOPATHOLOGY_CODE: &str = "22634-0";
pub const BIOPSY_HISTOPATHOLOGY_DISPLAY: &str = "Pathology report";
pub const LIPID_PANEL_CODE: &str = "57698-3";
pub const LIPID_PANEL_DISPLAY: &str = "Lipid panel with direct LDL - Serum or Plasma";
pub const RENAL_PANEL_CODE: &str = "24362-6";
pub const RENAL_PANEL_DISPLAY: &str = "Renal function 2000 panel - Serum or Plasma";
