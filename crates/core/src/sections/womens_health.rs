use super::{section_with, AssemblyContext, SectionAssembler};
use crate::constants::{SNOMED_SYSTEM, WOMEN_HEALTH_CODE, WOMEN_HEALTH_DISPLAY, WOMEN_HEALTH_TITLE};
use crate::input::{Category, ClinicalData};
use crate::resources::{ObservationProfile, ObservationValue};
use crate::terminology::TermCategory;
use crate::warning::WarningKind;
use crate::AssemblyResult;
use fhir::{CodeableTerm, Section};

/// One women's-health observation per listed item, with the reported value as text.
pub struct WomensHealthAssembler;

impl SectionAssembler for WomensHealthAssembler {
    fn category(&self) -> Category {
        Category::WomensHealth
    }

    fn is_present(&self, data: &ClinicalData) -> bool {
        !data.observation_women_health.is_empty()
    }

    fn assemble(
        &self,
        data: &ClinicalData,
        ctx: &mut AssemblyContext<'_>,
    ) -> AssemblyResult<Vec<Section>> {
        let mut entry = Vec::new();
        for item in &data.observation_women_health {
            if item.name.trim().is_empty() {
                ctx.warn(Category::WomensHealth, &item.name, WarningKind::BlankItem);
                continue;
            }
            let code = ctx.tables.lookup_in(TermCategory::WomensHealth, &item.name);
            if code.is_none() {
                ctx.warn(Category::WomensHealth, &item.name, WarningKind::UnresolvedTerm);
            }
            let value = match item.value.as_deref().map(str::trim) {
                Some(v) if !v.is_empty() => ObservationValue::Text(v.to_string()),
                _ => ObservationValue::Absent,
            };
            let observation =
                ctx.factory
                    .observation(ObservationProfile::WomenHealth, code, &item.name, value);
            entry.push(ctx.bundle.register(observation)?);
        }

        tracing::debug!(entries = entry.len(), "assembled women's health");
        Ok(section_with(
            WOMEN_HEALTH_TITLE,
            CodeableTerm::new(SNOMED_SYSTEM, WOMEN_HEALTH_CODE, WOMEN_HEALTH_DISPLAY),
            entry,
        ))
    }
}
