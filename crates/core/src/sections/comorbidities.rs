use super::{section_with, AssemblyContext, SectionAssembler};
use crate::constants::{COMORBIDITIES_CODE, COMORBIDITIES_DISPLAY, COMORBIDITIES_TITLE, SNOMED_SYSTEM};
use crate::input::{Category, ClinicalData};
use crate::terminology::TermCategory;
use crate::warning::WarningKind;
use crate::AssemblyResult;
use fhir::{CodeableTerm, Section};

/// One condition per listed co-morbidity, coded when the name is known.
pub struct ComorbiditiesAssembler;

impl SectionAssembler for ComorbiditiesAssembler {
    fn category(&self) -> Category {
        Category::Comorbidities
    }

    fn is_present(&self, data: &ClinicalData) -> bool {
        !data.co_morbidities.is_empty()
    }

    fn assemble(
        &self,
        data: &ClinicalData,
        ctx: &mut AssemblyContext<'_>,
    ) -> AssemblyResult<Vec<Section>> {
        let mut entry = Vec::new();
        for item in &data.co_morbidities {
            if item.name.trim().is_empty() {
                ctx.warn(Category::Comorbidities, &item.name, WarningKind::BlankItem);
                continue;
            }
            let code = ctx.tables.lookup_in(TermCategory::Comorbidity, &item.name);
            if code.is_none() {
                ctx.warn(Category::Comorbidities, &item.name, WarningKind::UnresolvedTerm);
            }
            let condition = ctx.factory.condition(code, &item.name);
            entry.push(ctx.bundle.register(condition)?);
        }

        tracing::debug!(entries = entry.len(), "assembled comorbidities");
        Ok(section_with(
            COMORBIDITIES_TITLE,
            CodeableTerm::new(SNOMED_SYSTEM, COMORBIDITIES_CODE, COMORBIDITIES_DISPLAY),
            entry,
        ))
    }
}
