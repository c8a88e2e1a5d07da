//! Document composer.
//!
//! Builds the header, runs every requested assembler in the fixed category order and hands the
//! result to the bundle builder. Either a complete, consistent bundle comes back or an error
//! does; a partially built bundle never leaves this module.

use crate::bundle::BundleBuilder;
use crate::config::AssemblyConfig;
use crate::constants::{DOCUMENT_TITLE, DOCUMENT_TYPE_CODE, DOCUMENT_TYPE_DISPLAY, SNOMED_SYSTEM};
use crate::input::ClinicalData;
use crate::resources::ResourceFactory;
use crate::sections::{assemblers, AssemblyContext};
use crate::warning::AssemblyWarning;
use crate::AssemblyResult;
use artifacts_uuid::{Clock, IdentityProvider};
use fhir::{Bundle, CodeableTerm, Composition, CompositionStatus, Identifier, ResourceKind};

/// A finished document and the degradations met while building it.
#[derive(Clone, Debug)]
pub struct AssembledDocument {
    pub bundle: Bundle,
    pub warnings: Vec<AssemblyWarning>,
}

pub struct DocumentComposer<'a> {
    cfg: &'a AssemblyConfig,
    ids: &'a dyn IdentityProvider,
    clock: &'a dyn Clock,
}

impl<'a> DocumentComposer<'a> {
    pub fn new(
        cfg: &'a AssemblyConfig,
        ids: &'a dyn IdentityProvider,
        clock: &'a dyn Clock,
    ) -> Self {
        Self { cfg, ids, clock }
    }

    /// Assembles one document.
    ///
    /// # Errors
    ///
    /// Returns an [`crate::AssemblyError`] on a missing or invalid patient reference, a
    /// non-finite lab value, or when the finished bundle fails its consistency check.
    pub fn compose(&self, data: &ClinicalData) -> AssemblyResult<AssembledDocument> {
        data.check_lab_values()?;
        let factory = ResourceFactory::new(
            self.ids,
            self.clock,
            &data.patient.id,
            data.patient.name.as_deref(),
        )?;

        let header = factory.stamp(ResourceKind::Composition);
        let bundle_id = self.ids.new_id();
        let builder = BundleBuilder::new(
            bundle_id,
            self.cfg.identifier_system(),
            header.at,
            header.id.clone(),
        );
        let mut ctx = AssemblyContext::new(&factory, self.cfg.tables(), builder);

        let mut sections = Vec::new();
        for assembler in assemblers() {
            let category = assembler.category();
            if !data.is_requested(category) || !assembler.is_present(data) {
                continue;
            }
            sections.extend(assembler.assemble(data, &mut ctx)?);
        }

        let composition = Composition {
            identifier: Identifier {
                system: self.cfg.identifier_system().to_string(),
                value: header.id.to_string(),
            },
            id: header.id,
            meta: Some(header.meta),
            language: self.cfg.language().to_string(),
            status: CompositionStatus::Final,
            doc_type: CodeableTerm::new(SNOMED_SYSTEM, DOCUMENT_TYPE_CODE, DOCUMENT_TYPE_DISPLAY),
            subject: header.subject,
            date: header.at,
            title: DOCUMENT_TITLE.to_string(),
            section: sections,
        };

        let AssemblyContext {
            bundle, warnings, ..
        } = ctx;
        let bundle = bundle.finish(composition)?;

        Ok(AssembledDocument { bundle, warnings })
    }
}
