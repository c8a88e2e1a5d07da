//! Section assemblers.
//!
//! One assembler per clinical category. Each one reads its slice of the input, builds resources
//! through the shared [`ResourceFactory`], registers them with the in-progress bundle and returns
//! the sections that reference them.
//!
//! Assemblers run in the fixed order returned by [`assemblers`]. That order is the order of
//! sections in the document header.

mod allergies;
mod cancer_history;
mod comorbidities;
mod diagnostics;
mod womens_health;

pub use allergies::AllergiesAssembler;
pub use cancer_history::{CancerHistoryAssembler, LUNG_CANCER, ORAL_CANCER};
pub use comorbidities::ComorbiditiesAssembler;
pub use diagnostics::DiagnosticsAssembler;
pub use womens_health::WomensHealthAssembler;

use crate::bundle::BundleBuilder;
use crate::input::{Category, ClinicalData};
use crate::resources::ResourceFactory;
use crate::terminology::CodeTables;
use crate::warning::{AssemblyWarning, WarningKind};
use crate::AssemblyResult;
use fhir::{CodeableTerm, Reference, Section};

/// Request-local state shared by the assemblers of one document.
pub struct AssemblyContext<'a> {
    pub factory: &'a ResourceFactory<'a>,
    pub tables: &'a CodeTables,
    pub bundle: BundleBuilder,
    pub warnings: Vec<AssemblyWarning>,
}

impl<'a> AssemblyContext<'a> {
    pub fn new(factory: &'a ResourceFactory<'a>, tables: &'a CodeTables, bundle: BundleBuilder) -> Self {
        Self {
            factory,
            tables,
            bundle,
            warnings: Vec::new(),
        }
    }

    /// Records a non-fatal degradation.
    pub fn warn(&mut self, category: Category, item: &str, kind: WarningKind) {
        let warning = AssemblyWarning::new(category, item.trim(), kind);
        tracing::warn!(%category, item = %warning.item, ?kind, "item degraded");
        self.warnings.push(warning);
    }

    /// Wraps opaque report content in a document reference and a diagnostic report that results
    /// it. Returns the reference to the report.
    pub fn attach_report(
        &mut self,
        code: Option<CodeableTerm>,
        title: &str,
        content: &str,
    ) -> AssemblyResult<Reference> {
        let document = self.factory.document_reference(code.clone(), title, content);
        let document_ref = self.bundle.register(document)?;
        let report = self
            .factory
            .diagnostic_report(code, title, vec![document_ref]);
        self.bundle.register(report)
    }
}

/// Builds the sections of one clinical category.
pub trait SectionAssembler: Send + Sync {
    fn category(&self) -> Category;

    /// Whether the input carries any data for this category.
    fn is_present(&self, data: &ClinicalData) -> bool;

    /// Builds zero or more sections, registering every resource they reference.
    ///
    /// # Errors
    ///
    /// Only structural faults are errors. Unresolved or unrecognised items are recorded as
    /// warnings on the context.
    fn assemble(
        &self,
        data: &ClinicalData,
        ctx: &mut AssemblyContext<'_>,
    ) -> AssemblyResult<Vec<Section>>;
}

/// Every assembler, in emission order.
pub fn assemblers() -> [&'static dyn SectionAssembler; 6] {
    [
        &DiagnosticsAssembler,
        &ORAL_CANCER,
        &LUNG_CANCER,
        &ComorbiditiesAssembler,
        &WomensHealthAssembler,
        &AllergiesAssembler,
    ]
}

/// Builds a section, or nothing when it would have no entries.
pub(crate) fn section_with(
    title: &str,
    code: CodeableTerm,
    entry: Vec<Reference>,
) -> Vec<Section> {
    if entry.is_empty() {
        return Vec::new();
    }
    let mut section = Section::new(title, code);
    section.entry = entry;
    vec![section]
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use artifacts_uuid::{FixedClock, ResourceId, SequentialIdProvider};
    use chrono::{TimeZone, Utc};
    use fhir::Resource;

    pub struct Harness {
        pub ids: SequentialIdProvider,
        pub clock: FixedClock,
        pub tables: CodeTables,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                ids: SequentialIdProvider::new("r").unwrap(),
                clock: FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()),
                tables: CodeTables::standard(),
            }
        }

        /// Runs one assembler and returns its sections, the registered resources and warnings.
        pub fn run(
            &self,
            assembler: &dyn SectionAssembler,
            data: &ClinicalData,
        ) -> (Vec<Section>, Vec<Resource>, Vec<AssemblyWarning>) {
            let factory = ResourceFactory::new(&self.ids, &self.clock, "pat-1", None).unwrap();
            let bundle = BundleBuilder::new(
                ResourceId::parse("bundle").unwrap(),
                "urn:test",
                self.clock.0,
                ResourceId::parse("header").unwrap(),
            );
            let mut ctx = AssemblyContext::new(&factory, &self.tables, bundle);
            let sections = assembler.assemble(data, &mut ctx).unwrap();
            let resources = ctx.bundle.into_resources();
            (sections, resources, ctx.warnings)
        }
    }

    pub fn data(json: &str) -> ClinicalData {
        serde_json::from_str(json).unwrap()
    }
}
