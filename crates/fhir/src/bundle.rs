//! The document bundle: header plus every resource it references, in construction order.

use crate::composition::Composition;
use crate::datatypes::{Identifier, Meta};
use crate::resources::Resource;
use crate::ResourceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The `resourceType` marker of a bundle. Serialises as `"Bundle"` and rejects anything else.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BundleTag {
    #[default]
    Bundle,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BundleType {
    Document,
    Collection,
}

/// One bundle entry: a locator and the resource it names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundleEntry {
    pub full_url: String,
    pub resource: Resource,
}

impl BundleEntry {
    /// Wraps a resource, deriving its locator from kind and id.
    pub fn new(resource: Resource) -> Self {
        Self {
            full_url: resource.locator(),
            resource,
        }
    }
}

/// A FHIR document bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Bundle {
    pub resource_type: BundleTag,
    pub id: ResourceId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
    pub identifier: Identifier,
    #[serde(rename = "type")]
    pub bundle_type: BundleType,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

impl Bundle {
    /// Returns the document header, if the first entry is a composition.
    pub fn composition(&self) -> Option<&Composition> {
        match self.entry.first().map(|e| &e.resource) {
            Some(Resource::Composition(c)) => Some(c),
            _ => None,
        }
    }

    /// Finds the entry whose locator is `full_url`.
    pub fn find(&self, full_url: &str) -> Option<&Resource> {
        self.entry
            .iter()
            .find(|e| e.full_url == full_url)
            .map(|e| &e.resource)
    }

    /// Iterates over every non-header resource, in bundle order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.entry
            .iter()
            .map(|e| &e.resource)
            .filter(|r| !matches!(r, Resource::Composition(_)))
    }
}
