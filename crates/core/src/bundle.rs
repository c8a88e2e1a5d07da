//! Bundle builder and consistency check.
//!
//! Entries are appended strictly in construction order. The header slot is reserved before any
//! resource is registered so that the header is always the first entry, even though its section
//! list is only known once every assembler has run.

use crate::{AssemblyError, AssemblyResult};
use artifacts_uuid::ResourceId;
use chrono::{DateTime, Utc};
use fhir::{
    Bundle, BundleEntry, BundleTag, BundleType, Composition, Identifier, Reference, Resource,
    ResourceKind,
};
use std::collections::HashSet;

/// Accumulates the resources of one document.
#[derive(Debug)]
pub struct BundleBuilder {
    id: ResourceId,
    identifier_system: String,
    timestamp: DateTime<Utc>,
    header_id: ResourceId,
    ids: HashSet<String>,
    entries: Vec<BundleEntry>,
}

impl BundleBuilder {
    /// Starts a bundle whose first entry will be the header `header_id`.
    pub fn new(
        id: ResourceId,
        identifier_system: impl Into<String>,
        timestamp: DateTime<Utc>,
        header_id: ResourceId,
    ) -> Self {
        let mut ids = HashSet::new();
        ids.insert(header_id.as_str().to_owned());
        Self {
            id,
            identifier_system: identifier_system.into(),
            timestamp,
            header_id,
            ids,
            entries: Vec::new(),
        }
    }

    /// Appends a resource and returns a reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::DuplicateIdentifier`] if the id is already in the bundle, and
    /// [`AssemblyError::HeaderNotFirst`] for a second composition.
    pub fn register(&mut self, resource: impl Into<Resource>) -> AssemblyResult<Reference> {
        let resource = resource.into();
        if resource.kind() == ResourceKind::Composition {
            return Err(AssemblyError::HeaderNotFirst);
        }
        if !self.ids.insert(resource.id().as_str().to_owned()) {
            return Err(AssemblyError::DuplicateIdentifier(
                resource.id().to_string(),
            ));
        }

        let reference = Reference::to(resource.kind(), resource.id());
        self.entries.push(BundleEntry::new(resource));
        Ok(reference)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn into_resources(self) -> Vec<Resource> {
        self.entries.into_iter().map(|e| e.resource).collect()
    }

    /// Places the header first, then checks the finished bundle.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::HeaderNotFirst`] if `header` is not the reserved header, or any
    /// error reported by [`check_consistency`].
    pub fn finish(self, header: Composition) -> AssemblyResult<Bundle> {
        if header.id != self.header_id {
            return Err(AssemblyError::HeaderNotFirst);
        }

        let mut entry = Vec::with_capacity(self.entries.len() + 1);
        entry.push(BundleEntry::new(Resource::Composition(header)));
        entry.extend(self.entries);

        let bundle = Bundle {
            resource_type: BundleTag::Bundle,
            identifier: Identifier {
                system: self.identifier_system,
                value: self.id.to_string(),
            },
            id: self.id,
            meta: None,
            bundle_type: BundleType::Document,
            timestamp: self.timestamp,
            entry,
        };

        check_consistency(&bundle)?;
        Ok(bundle)
    }
}

/// Verifies the structural invariants of a document bundle.
///
/// - the first entry, and only the first, is the composition header
/// - each entry locator matches its resource's kind and id
/// - identifiers are unique
/// - every section entry and report result resolves to a bundle entry
///
/// # Errors
///
/// Returns the first violation found.
pub fn check_consistency(bundle: &Bundle) -> AssemblyResult<()> {
    if bundle.composition().is_none() {
        return Err(AssemblyError::HeaderNotFirst);
    }

    let mut ids = HashSet::new();
    let mut locators = HashSet::new();
    for (i, entry) in bundle.entry.iter().enumerate() {
        if i > 0 && entry.resource.kind() == ResourceKind::Composition {
            return Err(AssemblyError::HeaderNotFirst);
        }
        let locator = entry.resource.locator();
        if entry.full_url != locator {
            return Err(AssemblyError::LocatorMismatch {
                full_url: entry.full_url.clone(),
                locator,
            });
        }
        if !ids.insert(entry.resource.id().as_str()) {
            return Err(AssemblyError::DuplicateIdentifier(
                entry.resource.id().to_string(),
            ));
        }
        locators.insert(entry.full_url.as_str());
    }

    for entry in &bundle.entry {
        for reference in entry.resource.internal_references() {
            if !locators.contains(reference.reference.as_str()) {
                return Err(AssemblyError::DanglingReference {
                    from: entry.full_url.clone(),
                    reference: reference.reference.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use artifacts_uuid::{FixedClock, SequentialIdProvider};
    use chrono::TimeZone;
    use fhir::{CodeableTerm, CompositionStatus, Section};

    use crate::resources::ResourceFactory;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn id(s: &str) -> ResourceId {
        ResourceId::parse(s).unwrap()
    }

    fn header(sections: Vec<Section>) -> Composition {
        Composition {
            id: id("header"),
            meta: None,
            language: "en-IN".into(),
            identifier: Identifier {
                system: "https://ndhm.in/phr".into(),
                value: "header".into(),
            },
            status: CompositionStatus::Final,
            doc_type: CodeableTerm::new("http://snomed.info/sct", "371530004", "Clinical consultation report"),
            subject: Reference::to(ResourceKind::Patient, &id("pat-1")),
            date: ts(),
            title: "OP Consultation Record".into(),
            section: sections,
        }
    }

    #[test]
    fn header_is_first_then_construction_order() {
        let ids = SequentialIdProvider::new("r").unwrap();
        let clock = FixedClock(ts());
        let factory = ResourceFactory::new(&ids, &clock, "pat-1", None).unwrap();

        let mut builder = BundleBuilder::new(id("bundle"), "https://ndhm.in/phr", ts(), id("header"));
        let first = builder.register(factory.condition(None, "A")).unwrap();
        let second = builder.register(factory.condition(None, "B")).unwrap();

        let mut section = Section::new("Co-morbidities", CodeableTerm::new("s", "c", "d"));
        section.entry = vec![first.clone(), second.clone()];
        let bundle = builder.finish(header(vec![section])).unwrap();

        let urls: Vec<&str> = bundle.entry.iter().map(|e| e.full_url.as_str()).collect();
        assert_eq!(urls, ["Composition/header", "Condition/r-1", "Condition/r-2"]);
        assert_eq!(bundle.identifier.value, "bundle");
        assert_eq!(bundle.bundle_type, BundleType::Document);
    }

    #[test]
    fn duplicate_identifiers_are_rejected() {
        let ids = SequentialIdProvider::new("r").unwrap();
        let clock = FixedClock(ts());
        let factory = ResourceFactory::new(&ids, &clock, "pat-1", None).unwrap();
        let condition = factory.condition(None, "A");

        let mut builder = BundleBuilder::new(id("bundle"), "urn:x", ts(), id("header"));
        builder.register(condition.clone()).unwrap();
        assert!(matches!(
            builder.register(condition),
            Err(AssemblyError::DuplicateIdentifier(_))
        ));

        let mut clash = factory.condition(None, "B");
        clash.id = id("header");
        assert!(matches!(
            builder.register(clash),
            Err(AssemblyError::DuplicateIdentifier(_))
        ));
    }

    #[test]
    fn dangling_section_entries_are_a_structural_fault() {
        let builder = BundleBuilder::new(id("bundle"), "urn:x", ts(), id("header"));
        let mut section = Section::new("Allergies", CodeableTerm::new("s", "c", "d"));
        section
            .entry
            .push(Reference::to(ResourceKind::AllergyIntolerance, &id("missing")));

        let err = builder.finish(header(vec![section])).unwrap_err();
        assert!(matches!(
            err,
            AssemblyError::DanglingReference { ref reference, .. } if reference == "AllergyIntolerance/missing"
        ));
    }

    #[test]
    fn finish_rejects_a_foreign_header() {
        let builder = BundleBuilder::new(id("bundle"), "urn:x", ts(), id("other"));
        assert!(matches!(
            builder.finish(header(Vec::new())),
            Err(AssemblyError::HeaderNotFirst)
        ));
    }

    #[test]
    fn consistency_check_catches_tampered_locators() {
        let builder = BundleBuilder::new(id("bundle"), "urn:x", ts(), id("header"));
        let mut bundle = builder.finish(header(Vec::new())).unwrap();
        bundle.entry[0].full_url = "Composition/elsewhere".into();
        assert!(matches!(
            check_consistency(&bundle),
            Err(AssemblyError::LocatorMismatch { .. })
        ));
    }
}
