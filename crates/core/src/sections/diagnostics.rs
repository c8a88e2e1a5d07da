//! Diagnostic reports: haemoglobin, biopsy histopathology and biochemistry panels.

use super::{section_with, AssemblyContext, SectionAssembler};
use crate::constants::{
    BIOPSY_HISTOPATHOLOGY_CODE, BIOPSY_HISTOPATHOLOGY_DISPLAY, CBC_CODE, CBC_DISPLAY,
    DIAGNOSTIC_REPORTS_CODE, DIAGNOSTIC_REPORTS_DISPLAY, DIAGNOSTIC_REPORTS_TITLE,
    GRAM_PER_DECILITER, HAEMOGLOBIN_CODE, HAEMOGLOBIN_DISPLAY, LIPID_PANEL_CODE,
    LIPID_PANEL_DISPLAY, LOINC_SYSTEM, RENAL_PANEL_CODE, RENAL_PANEL_DISPLAY, SNOMED_SYSTEM,
};
use crate::input::{Category, ClinicalData, Diagnostic, LabValue, PanelInput};
use crate::matcher::{PanelMatcher, LIPID_PANEL, RENAL_PANEL};
use crate::resources::{ObservationProfile, ObservationValue};
use crate::warning::WarningKind;
use crate::AssemblyResult;
use fhir::{CodeableTerm, Reference, Section};

pub struct DiagnosticsAssembler;

impl SectionAssembler for DiagnosticsAssembler {
    fn category(&self) -> Category {
        Category::Diagnostics
    }

    fn is_present(&self, data: &ClinicalData) -> bool {
        let Some(d) = &data.diagnostic else {
            return false;
        };
        let panels = d.bio_chemistry.as_ref().is_some_and(|b| {
            [&b.lipid_profile, &b.renal_function]
                .into_iter()
                .flatten()
                .any(|p| !p.is_empty())
        });
        d.cbc.as_ref().is_some_and(|c| c.hemoglobin.is_some())
            || biopsy_report(d).is_some()
            || panels
    }

    fn assemble(
        &self,
        data: &ClinicalData,
        ctx: &mut AssemblyContext<'_>,
    ) -> AssemblyResult<Vec<Section>> {
        let Some(diagnostic) = &data.diagnostic else {
            return Ok(Vec::new());
        };
        let mut reports = Vec::new();

        if let Some(hb) = diagnostic.cbc.as_ref().and_then(|c| c.hemoglobin) {
            let observation = ctx.factory.observation(
                ObservationProfile::General,
                Some(CodeableTerm::new(LOINC_SYSTEM, HAEMOGLOBIN_CODE, HAEMOGLOBIN_DISPLAY)),
                HAEMOGLOBIN_DISPLAY,
                ObservationValue::Quantity {
                    value: hb,
                    unit: Some(GRAM_PER_DECILITER.into()),
                },
            );
            let result = ctx.bundle.register(observation)?;
            let report = ctx.factory.diagnostic_report(
                Some(CodeableTerm::new(SNOMED_SYSTEM, CBC_CODE, CBC_DISPLAY)),
                CBC_DISPLAY,
                vec![result],
            );
            reports.push(ctx.bundle.register(report)?);
        }

        if let Some(text) = biopsy_report(diagnostic) {
            let code = CodeableTerm::new(
                LOINC_SYSTEM,
                BIOPSY_HISTOPATHOLOGY_CODE,
                BIOPSY_HISTOPATHOLOGY_DISPLAY,
            );
            reports.push(ctx.attach_report(Some(code), "Biopsy histopathology report", text)?);
        }

        if let Some(bio) = &diagnostic.bio_chemistry {
            let panels = [
                (&bio.lipid_profile, &LIPID_PANEL, LIPID_PANEL_CODE, LIPID_PANEL_DISPLAY),
                (&bio.renal_function, &RENAL_PANEL, RENAL_PANEL_CODE, RENAL_PANEL_DISPLAY),
            ];
            for (panel, matcher, code, display) in panels {
                let Some(panel) = panel else { continue };
                let term = CodeableTerm::new(LOINC_SYSTEM, code, display);
                if let Some(report) = assemble_panel(ctx, panel, matcher, term)? {
                    reports.push(report);
                }
            }
        }

        tracing::debug!(reports = reports.len(), "assembled diagnostics");
        Ok(section_with(
            DIAGNOSTIC_REPORTS_TITLE,
            CodeableTerm::new(SNOMED_SYSTEM, DIAGNOSTIC_REPORTS_CODE, DIAGNOSTIC_REPORTS_DISPLAY),
            reports,
        ))
    }
}

fn biopsy_report(d: &Diagnostic) -> Option<&str> {
    d.biopsy_histopathology_report
        .as_deref()
        .filter(|t| !t.trim().is_empty())
}

/// Builds one panel: an attached report, or one observation per recognised test plus a report
/// resulting them. Returns `None` when no test is recognised.
fn assemble_panel(
    ctx: &mut AssemblyContext<'_>,
    panel: &PanelInput,
    matcher: &PanelMatcher,
    term: CodeableTerm,
) -> AssemblyResult<Option<Reference>> {
    let title = term.label().unwrap_or(matcher.panel).to_string();

    if let Some(attachment) = panel.attachment() {
        return ctx.attach_report(Some(term), &title, attachment).map(Some);
    }

    let mut results = Vec::new();
    for test in &panel.tests {
        if test.test_name.trim().is_empty() {
            ctx.warn(Category::Diagnostics, matcher.panel, WarningKind::BlankItem);
            continue;
        }
        let Some(code) = matcher.term(&test.test_name) else {
            ctx.warn(Category::Diagnostics, &test.test_name, WarningKind::UnrecognizedItem);
            continue;
        };

        let value = match (&test.result, test.result.as_number()) {
            (_, Some(value)) => ObservationValue::Quantity {
                value,
                unit: test.unit_of_measurement.clone(),
            },
            (LabValue::Text(t), None) => ObservationValue::Text(t.clone()),
            (LabValue::Number(_), None) => ObservationValue::Absent,
        };
        let observation =
            ctx.factory
                .observation(ObservationProfile::General, Some(code), &test.test_name, value);
        results.push(ctx.bundle.register(observation)?);
    }

    if results.is_empty() {
        return Ok(None);
    }
    let report = ctx.factory.diagnostic_report(Some(term), &title, results);
    ctx.bundle.register(report).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{data, Harness};
    use fhir::Resource;

    #[test]
    fn haemoglobin_yields_observation_and_cbc_report() {
        let h = Harness::new();
        let input = data(r#"{"patient": {"id": "pat-1"}, "diagnostic": {"cbc": {"hemoglobin": 13.2}}}"#);
        let (sections, resources, warnings) = h.run(&DiagnosticsAssembler, &input);

        assert!(warnings.is_empty());
        assert_eq!(resources.len(), 2);
        let Resource::Observation(obs) = &resources[0] else {
            panic!("expected observation first");
        };
        assert_eq!(obs.code.as_ref().unwrap().code(), Some("718-7"));
        assert_eq!(obs.value_quantity.as_ref().unwrap().unit.as_deref(), Some("g/dL"));
        let Resource::DiagnosticReport(report) = &resources[1] else {
            panic!("expected report second");
        };
        assert_eq!(report.result[0].reference, resources[0].locator());

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].entry[0].reference, resources[1].locator());
    }

    #[test]
    fn attachments_become_document_and_report() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "diagnostic": {
                "biopsyHistopathologyReport": "no malignancy",
                "bioChemistry": {"renalFunction": {"attachment": "creatinine normal"}}
            }}"#,
        );
        let (sections, resources, _) = h.run(&DiagnosticsAssembler, &input);

        let kinds: Vec<&str> = resources.iter().map(|r| r.kind().as_str()).collect();
        assert_eq!(
            kinds,
            ["DocumentReference", "DiagnosticReport", "DocumentReference", "DiagnosticReport"]
        );
        let Resource::DiagnosticReport(renal) = &resources[3] else {
            panic!("expected renal report");
        };
        assert_eq!(renal.code.as_ref().unwrap().code(), Some("24362-6"));
        assert_eq!(renal.result[0].reference, resources[2].locator());
        assert_eq!(sections[0].entry.len(), 2);
    }

    #[test]
    fn discrete_lipid_tests_are_classified() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "diagnostic": {"bioChemistry": {"lipidProfile": {"tests": [
                {"testName": "Total Cholesterol", "result": 182, "unitOfMeasurement": "mg/dL"},
                {"testName": "Triglycerides Fasting", "result": "140", "unitOfMeasurement": "mg/dL"},
                {"testName": "Vitamin D", "result": 30}
            ]}}}}"#,
        );
        let (sections, resources, warnings) = h.run(&DiagnosticsAssembler, &input);

        let codes: Vec<Option<&str>> = resources
            .iter()
            .map(|r| match r {
                Resource::Observation(o) => o.code.as_ref().and_then(|c| c.code()),
                Resource::DiagnosticReport(d) => d.code.as_ref().and_then(|c| c.code()),
                _ => None,
            })
            .collect();
        assert_eq!(codes, [Some("2093-3"), Some("3043-7"), Some("57698-3")]);
        assert!(!resources.iter().any(|r| matches!(r, Resource::DocumentReference(_))));

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "Vitamin D");
        assert_eq!(warnings[0].kind, WarningKind::UnrecognizedItem);
        assert_eq!(sections[0].entry.len(), 1);
    }

    #[test]
    fn panel_without_recognised_tests_emits_nothing() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "diagnostic": {"bioChemistry": {"lipidProfile": {"tests": [
                {"testName": "Vitamin D", "result": 30}
            ]}}}}"#,
        );
        assert!(DiagnosticsAssembler.is_present(&input));

        let (sections, resources, warnings) = h.run(&DiagnosticsAssembler, &input);
        assert!(sections.is_empty());
        assert!(resources.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn empty_diagnostic_block_is_absent() {
        let input = data(r#"{"patient": {"id": "pat-1"}, "diagnostic": {"cbc": {}}}"#);
        assert!(!DiagnosticsAssembler.is_present(&input));
    }

    #[test]
    fn attachment_wins_over_discrete_tests() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "diagnostic": {"bioChemistry": {"lipidProfile": {
                "attachment": "lipid report scan",
                "tests": [{"testName": "HDL", "result": 45, "unitOfMeasurement": "mg/dL"}]
            }}}}"#,
        );
        let (sections, resources, warnings) = h.run(&DiagnosticsAssembler, &input);

        assert!(warnings.is_empty());
        let kinds: Vec<&str> = resources.iter().map(|r| r.kind().as_str()).collect();
        assert_eq!(kinds, ["DocumentReference", "DiagnosticReport"]);
        assert!(!resources.iter().any(|r| matches!(r, Resource::Observation(_))));

        let Resource::DiagnosticReport(report) = &resources[1] else {
            panic!("expected lipid report");
        };
        assert_eq!(report.code.as_ref().unwrap().code(), Some("57698-3"));
        assert_eq!(report.result.len(), 1);
        assert_eq!(report.result[0].reference, resources[0].locator());
        assert_eq!(sections[0].entry[0].reference, resources[1].locator());
    }

    #[test]
    fn discrete_renal_tests_become_resulted_observations() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "diagnostic": {"bioChemistry": {"renalFunction": {"tests": [
                {"testName": "Creatinine", "result": 0.9, "unitOfMeasurement": "mg/dL"},
                {"testName": "Blood Urea Nitrogen", "result": "14", "unitOfMeasurement": "mg/dL"},
                {"testName": "Cystatin C", "result": 1.1}
            ]}}}}"#,
        );
        let (sections, resources, warnings) = h.run(&DiagnosticsAssembler, &input);

        let kinds: Vec<&str> = resources.iter().map(|r| r.kind().as_str()).collect();
        assert_eq!(kinds, ["Observation", "Observation", "DiagnosticReport"]);

        let Resource::Observation(creatinine) = &resources[0] else {
            panic!("expected creatinine observation");
        };
        assert_eq!(creatinine.code.as_ref().unwrap().code(), Some("2160-0"));
        assert_eq!(creatinine.value_quantity.as_ref().unwrap().value, 0.9);
        let Resource::Observation(bun) = &resources[1] else {
            panic!("expected urea nitrogen observation");
        };
        assert_eq!(bun.code.as_ref().unwrap().code(), Some("3094-0"));
        assert_eq!(bun.value_quantity.as_ref().unwrap().value, 14.0);

        let Resource::DiagnosticReport(report) = &resources[2] else {
            panic!("expected renal report");
        };
        assert_eq!(report.code.as_ref().unwrap().code(), Some("24362-6"));
        let results: Vec<&str> = report.result.iter().map(|r| r.reference.as_str()).collect();
        assert_eq!(results, [resources[0].locator(), resources[1].locator()]);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "Cystatin C");
        assert_eq!(sections[0].entry.len(), 1);
        assert_eq!(sections[0].entry[0].reference, resources[2].locator());
    }
}
