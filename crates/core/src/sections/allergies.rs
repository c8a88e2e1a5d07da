use super::{section_with, AssemblyContext, SectionAssembler};
use crate::constants::{ALLERGIES_CODE, ALLERGIES_DISPLAY, ALLERGIES_TITLE, SNOMED_SYSTEM};
use crate::input::{Category, ClinicalData};
use crate::terminology::TermCategory;
use crate::warning::WarningKind;
use crate::AssemblyResult;
use fhir::{CodeableTerm, Section};

/// One allergy record per reported allergy.
pub struct AllergiesAssembler;

impl SectionAssembler for AllergiesAssembler {
    fn category(&self) -> Category {
        Category::Allergies
    }

    fn is_present(&self, data: &ClinicalData) -> bool {
        !data.allergy_intolerance.is_empty()
    }

    fn assemble(
        &self,
        data: &ClinicalData,
        ctx: &mut AssemblyContext<'_>,
    ) -> AssemblyResult<Vec<Section>> {
        let mut entry = Vec::new();
        for item in &data.allergy_intolerance {
            if item.name.trim().is_empty() {
                ctx.warn(Category::Allergies, &item.name, WarningKind::BlankItem);
                continue;
            }
            let code = ctx.tables.lookup_in(TermCategory::Allergen, &item.name);
            if code.is_none() {
                ctx.warn(Category::Allergies, &item.name, WarningKind::UnresolvedTerm);
            }
            let allergy = ctx
                .factory
                .allergy(code, &item.name, item.allergy_type.as_deref());
            entry.push(ctx.bundle.register(allergy)?);
        }

        tracing::debug!(entries = entry.len(), "assembled allergies");
        Ok(section_with(
            ALLERGIES_TITLE,
            CodeableTerm::new(SNOMED_SYSTEM, ALLERGIES_CODE, ALLERGIES_DISPLAY),
            entry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::test_support::{data, Harness};
    use fhir::{AllergyCategory, Resource};

    #[test]
    fn allergies_are_coded_and_categorised() {
        let h = Harness::new();
        let input = data(
            r#"{"patient": {"id": "pat-1"}, "allergyIntolerance": [
                {"name": "Peanut", "type": "food"},
                {"name": "Dust mite", "type": "environmental"}
            ]}"#,
        );
        let (sections, resources, warnings) = h.run(&AllergiesAssembler, &input);

        let Resource::AllergyIntolerance(peanut) = &resources[0] else {
            panic!("expected allergy");
        };
        assert_eq!(peanut.code.as_ref().unwrap().code(), Some("762952008"));
        assert_eq!(peanut.category, vec![AllergyCategory::Food]);

        let Resource::AllergyIntolerance(dust) = &resources[1] else {
            panic!("expected allergy");
        };
        assert!(dust.code.is_none());
        assert_eq!(dust.category, vec![AllergyCategory::Environment]);
        assert_eq!(
            dust.note[0].text,
            "The patient reports of: Dust mite allergy which is of type: environmental"
        );

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item, "Dust mite");
        assert_eq!(sections[0].entry.len(), 2);
    }
}
