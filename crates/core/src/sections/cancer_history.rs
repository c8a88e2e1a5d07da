//! Oral and lung cancer history.
//!
//! Both categories share one assembler shape: a cancer condition followed by one attached report
//! per recognised work-up indicator. Only the indicator table and the condition term differ.

use super::{section_with, AssemblyContext, SectionAssembler};
use crate::constants::{
    LUNG_CANCER_CODE, LUNG_CANCER_DISPLAY, LUNG_CANCER_TITLE, MEDICAL_HISTORY_CODE,
    MEDICAL_HISTORY_DISPLAY, ORAL_CANCER_CODE, ORAL_CANCER_DISPLAY, ORAL_CANCER_TITLE,
    SNOMED_SYSTEM,
};
use crate::input::{Category, ClinicalData, IndicatorMap};
use crate::terminology::TermCategory;
use crate::warning::WarningKind;
use crate::AssemblyResult;
use fhir::{CodeableTerm, Section};

pub struct CancerHistoryAssembler {
    category: Category,
    indicators: TermCategory,
    title: &'static str,
    condition_code: &'static str,
    condition_display: &'static str,
    slice: fn(&ClinicalData) -> &IndicatorMap,
}

pub static ORAL_CANCER: CancerHistoryAssembler = CancerHistoryAssembler {
    category: Category::OralCancer,
    indicators: TermCategory::OralCancerIndicator,
    title: ORAL_CANCER_TITLE,
    condition_code: ORAL_CANCER_CODE,
    condition_display: ORAL_CANCER_DISPLAY,
    slice: oral_indicators,
};

pub static LUNG_CANCER: CancerHistoryAssembler = CancerHistoryAssembler {
    category: Category::LungCancer,
    indicators: TermCategory::LungCancerIndicator,
    title: LUNG_CANCER_TITLE,
    condition_code: LUNG_CANCER_CODE,
    condition_display: LUNG_CANCER_DISPLAY,
    slice: lung_indicators,
};

fn oral_indicators(data: &ClinicalData) -> &IndicatorMap {
    &data.oral_cancer
}

fn lung_indicators(data: &ClinicalData) -> &IndicatorMap {
    &data.lung_cancer
}

impl SectionAssembler for CancerHistoryAssembler {
    fn category(&self) -> Category {
        self.category
    }

    fn is_present(&self, data: &ClinicalData) -> bool {
        !(self.slice)(data).is_empty()
    }

    fn assemble(
        &self,
        data: &ClinicalData,
        ctx: &mut AssemblyContext<'_>,
    ) -> AssemblyResult<Vec<Section>> {
        let mut recognised = Vec::new();
        for indicator in (self.slice)(data).iter() {
            if indicator.name.trim().is_empty() {
                ctx.warn(self.category, &indicator.name, WarningKind::BlankItem);
                continue;
            }
            match ctx.tables.lookup_in(self.indicators, &indicator.name) {
                Some(term) => recognised.push((indicator, term)),
                None => ctx.warn(self.category, &indicator.name, WarningKind::UnrecognizedItem),
            }
        }

        if recognised.is_empty() {
            return Ok(Vec::new());
        }

        let condition = ctx.factory.condition(
            Some(CodeableTerm::new(
                SNOMED_SYSTEM,
                self.condition_code,
                self.condition_display,
            )),
            self.condition_display,
        );
        let mut entry = vec![ctx.bundle.register(condition)?];

        for (indicator, term) in recognised {
            entry.push(ctx.attach_report(Some(term), indicator.name.trim(), &indicator.report)?);
        }

        tracing::debug!(category = %self.category, entries = entry.len(), "assembled cancer history");
        Ok(section_with(
            self.title,
            CodeableTerm::new(SNOMED_SYSTEM, MEDICAL_HISTORY_CODE, MEDICAL_HISTORY_DISPLAY),
            entry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{data, Harness};
    use fhir::Resource;

    #[test]
    fn recognised_indicators_follow_the_condition_in_input_order() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "lungCancer": {
                "MRI brain": "no metastasis",
                "6MWT": "420 m"
            }}"#,
        );
        let (sections, resources, warnings) = h.run(&LUNG_CANCER, &input);

        assert!(warnings.is_empty());
        let Resource::Condition(condition) = &resources[0] else {
            panic!("expected condition first");
        };
        assert_eq!(condition.code.as_ref().unwrap().code(), Some(LUNG_CANCER_CODE));

        let report_codes: Vec<&str> = resources
            .iter()
            .filter_map(|r| match r {
                Resource::DiagnosticReport(d) => d.code.as_ref().and_then(|c| c.code()),
                _ => None,
            })
            .collect();
        assert_eq!(report_codes, ["24590-2", "64098-7"]);

        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].title, LUNG_CANCER_TITLE);
        assert_eq!(sections[0].entry.len(), 3);
    }

    #[test]
    fn unknown_indicator_produces_no_resource() {
        let h = Harness::new();
        let input = data(r#"{"patient": {"id": "pat-1"}, "lungCancer": {"Unknown Test": "n/a"}}"#);
        let (sections, resources, warnings) = h.run(&LUNG_CANCER, &input);

        assert!(sections.is_empty());
        assert!(resources.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::UnrecognizedItem);
        assert_eq!(warnings[0].category, Category::LungCancer);
    }

    #[test]
    fn indicators_are_scoped_to_their_cancer() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "oralCancer": {"MRI brain": "x", "FNAC report": "benign"}}"#,
        );
        let (sections, resources, warnings) = h.run(&ORAL_CANCER, &input);

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "MRI brain");
        assert_eq!(resources.len(), 3);
        assert_eq!(sections[0].title, ORAL_CANCER_TITLE);
    }
}
