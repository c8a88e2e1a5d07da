//! Clinical encounter input.
//!
//! Responsibilities:
//! - Define the wire shape of one assembly request (camelCase JSON or YAML).
//! - Decide which categories a request asks for.
//! - Preserve document order for indicator maps; they decode into ordered lists, never hash
//!   maps, so the generated sections follow the caller's order exactly.
//!
//! Notes:
//! - Unknown keys are rejected so that misspelled category fields surface as input errors
//!   instead of silently producing a smaller document.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use crate::{AssemblyError, AssemblyResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A clinical category, in emission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Diagnostics,
    OralCancer,
    LungCancer,
    Comorbidities,
    WomensHealth,
    Allergies,
}

impl Category {
    /// Every category in the fixed order sections are emitted.
    pub const ORDERED: [Category; 6] = [
        Category::Diagnostics,
        Category::OralCancer,
        Category::LungCancer,
        Category::Comorbidities,
        Category::WomensHealth,
        Category::Allergies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Diagnostics => "diagnostics",
            Category::OralCancer => "oralCancer",
            Category::LungCancer => "lungCancer",
            Category::Comorbidities => "comorbidities",
            Category::WomensHealth => "womensHealth",
            Category::Allergies => "allergies",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One assembly request.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClinicalData {
    /// Requested categories. `None` requests every category that carries data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,
    pub patient: PatientInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<Diagnostic>,
    #[serde(default, skip_serializing_if = "IndicatorMap::is_empty")]
    pub oral_cancer: IndicatorMap,
    #[serde(default, skip_serializing_if = "IndicatorMap::is_empty")]
    pub lung_cancer: IndicatorMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub co_morbidities: Vec<CoMorbidity>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub observation_women_health: Vec<WomenHealthObservation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allergy_intolerance: Vec<AllergyInput>,
}

impl ClinicalData {
    pub fn is_requested(&self, category: Category) -> bool {
        match &self.categories {
            None => true,
            Some(list) => list.contains(&category),
        }
    }

    /// Rejects numeric lab results that have no JSON representation.
    ///
    /// YAML admits `.nan` and `.inf`; they would encode as `null` and the document would no
    /// longer decode.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::InvalidInput`] naming the first non-finite value.
    pub fn check_lab_values(&self) -> AssemblyResult<()> {
        let Some(diagnostic) = &self.diagnostic else {
            return Ok(());
        };
        if let Some(hb) = diagnostic.cbc.as_ref().and_then(|c| c.hemoglobin) {
            if !hb.is_finite() {
                return Err(AssemblyError::InvalidInput(format!(
                    "haemoglobin must be a finite number, got {hb}"
                )));
            }
        }

        let panels = diagnostic
            .bio_chemistry
            .iter()
            .flat_map(|b| [&b.lipid_profile, &b.renal_function])
            .flatten();
        for test in panels.flat_map(|p| &p.tests) {
            if let LabValue::Number(n) = test.result {
                if !n.is_finite() {
                    return Err(AssemblyError::InvalidInput(format!(
                        "result of {} must be a finite number, got {n}",
                        test.test_name
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PatientInput {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Diagnostic {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cbc: Option<Cbc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biopsy_histopathology_report: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio_chemistry: Option<BioChemistry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Cbc {
    /// Haemoglobin in g/dL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hemoglobin: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BioChemistry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lipid_profile: Option<PanelInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renal_function: Option<PanelInput>,
}

/// A lab panel carried either as an opaque attachment or as discrete tests.
///
/// When both are present the attachment wins.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PanelInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    #[serde(default, alias = "lipidTests", skip_serializing_if = "Vec::is_empty")]
    pub tests: Vec<LabTest>,
}

impl PanelInput {
    /// Returns the attachment text if it carries any content.
    pub fn attachment(&self) -> Option<&str> {
        self.attachment
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.attachment().is_none() && self.tests.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LabTest {
    pub test_name: String,
    pub result: LabValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_of_measurement: Option<String>,
}

/// A lab result: numeric when the lab reported a number, free text otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabValue {
    Number(f64),
    Text(String),
}

impl LabValue {
    /// Returns the numeric value, parsing textual results such as `"182"`.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LabValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            LabValue::Text(t) => t.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

impl fmt::Display for LabValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LabValue::Number(n) => write!(f, "{n}"),
            LabValue::Text(t) => f.write_str(t),
        }
    }
}

/// A named indicator and its free-text report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Indicator {
    pub name: String,
    pub report: String,
}

/// Indicator name to report text, in document order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndicatorMap(pub Vec<Indicator>);

impl IndicatorMap {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Indicator> {
        self.0.iter()
    }
}

impl FromIterator<(String, String)> for IndicatorMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, report)| Indicator { name, report })
                .collect(),
        )
    }
}

impl Serialize for IndicatorMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for indicator in &self.0 {
            map.serialize_entry(&indicator.name, &indicator.report)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for IndicatorMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = IndicatorMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of indicator name to report text")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, report)) = access.next_entry::<String, String>()? {
                    entries.push(Indicator { name, report });
                }
                Ok(IndicatorMap(entries))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CoMorbidity {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WomenHealthObservation {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AllergyInput {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub allergy_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_maps_keep_document_order() {
        let data: ClinicalData = serde_json::from_str(
            r#"{
                "patient": {"id": "p1"},
                "lungCancer": {"PFT DLCO": "reduced", "2D Echo": "normal", "EBUS": "n0"}
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = data.lung_cancer.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["PFT DLCO", "2D Echo", "EBUS"]);
    }

    #[test]
    fn absent_categories_request_everything() {
        let data: ClinicalData = serde_json::from_str(r#"{"patient": {"id": "p1"}}"#).unwrap();
        assert!(Category::ORDERED.iter().all(|c| data.is_requested(*c)));

        let data: ClinicalData =
            serde_json::from_str(r#"{"categories": ["allergies"], "patient": {"id": "p1"}}"#)
                .unwrap();
        assert!(data.is_requested(Category::Allergies));
        assert!(!data.is_requested(Category::Diagnostics));
    }

    #[test]
    fn lipid_tests_alias_and_mixed_results() {
        let panel: PanelInput = serde_json::from_str(
            r#"{"lipidTests": [
                {"testName": "HDL", "result": 45, "unitOfMeasurement": "mg/dL"},
                {"testName": "Fasting status", "result": "fasting"}
            ]}"#,
        )
        .unwrap();

        assert_eq!(panel.tests.len(), 2);
        assert_eq!(panel.tests[0].result.as_number(), Some(45.0));
        assert_eq!(panel.tests[1].result.as_number(), None);
        assert_eq!(panel.tests[1].result.to_string(), "fasting");
    }

    #[test]
    fn blank_attachment_counts_as_empty() {
        let panel = PanelInput {
            attachment: Some("  ".into()),
            tests: Vec::new(),
        };
        assert!(panel.is_empty());
        assert_eq!(panel.attachment(), None);
    }

    #[test]
    fn strict_validation_rejects_unknown_keys() {
        let err = serde_json::from_str::<ClinicalData>(
            r#"{"patient": {"id": "p1"}, "coMorbidity": [{"name": "Hypertension"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("coMorbidity"));
    }

    #[test]
    fn indicator_map_serialises_as_ordered_object() {
        let map: IndicatorMap = vec![
            ("MRI".to_string(), "clear".to_string()),
            ("FNAC Report".to_string(), "benign".to_string()),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            serde_json::to_string(&map).unwrap(),
            r#"{"MRI":"clear","FNAC Report":"benign"}"#
        );
    }

    #[test]
    fn non_finite_numbers_are_not_numeric_results() {
        assert_eq!(LabValue::Number(f64::INFINITY).as_number(), None);
        assert_eq!(LabValue::Number(f64::NAN).as_number(), None);
        assert_eq!(LabValue::Text("NaN".into()).as_number(), None);
        assert_eq!(LabValue::Number(4.5).as_number(), Some(4.5));
    }

    #[test]
    fn yaml_nan_haemoglobin_is_invalid_input() {
        let data: ClinicalData =
            serde_yaml::from_str("patient:\n  id: p1\ndiagnostic:\n  cbc:\n    hemoglobin: .nan\n")
                .unwrap();
        let err = data.check_lab_values().unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidInput(ref m) if m.contains("haemoglobin")));
    }

    #[test]
    fn yaml_infinite_lipid_result_is_invalid_input() {
        let data: ClinicalData = serde_yaml::from_str(
            "patient:\n  id: p1\ndiagnostic:\n  bioChemistry:\n    lipidProfile:\n      tests:\n        - testName: HDL\n          result: .inf\n",
        )
        .unwrap();
        let err = data.check_lab_values().unwrap_err();
        assert!(matches!(err, AssemblyError::InvalidInput(ref m) if m.contains("HDL")));
    }

    #[test]
    fn finite_lab_values_pass() {
        let data: ClinicalData = serde_json::from_str(
            r#"{"patient": {"id": "p1"}, "diagnostic": {"cbc": {"hemoglobin": 12.1},
                "bioChemistry": {"renalFunction": {"tests": [{"testName": "Creatinine", "result": 0.9}]}}}}"#,
        )
        .unwrap();
        assert!(data.check_lab_values().is_ok());
    }
}
