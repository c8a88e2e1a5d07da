use crate::input::Category;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an item was degraded rather than fully coded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// The resource was created without a code.
    UnresolvedTerm,
    /// The item was not recognised and no resource was created.
    UnrecognizedItem,
    /// The item had no name and was skipped.
    BlankItem,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::UnresolvedTerm => "unresolvedTerm",
            WarningKind::UnrecognizedItem => "unrecognizedItem",
            WarningKind::BlankItem => "blankItem",
        }
    }
}

/// A non-fatal degradation reported alongside a generated document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblyWarning {
    pub category: Category,
    pub item: String,
    pub kind: WarningKind,
}

impl AssemblyWarning {
    pub fn new(category: Category, item: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            category,
            item: item.into(),
            kind,
        }
    }
}

impl fmt::Display for AssemblyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            WarningKind::UnresolvedTerm => "has no terminology code",
            WarningKind::UnrecognizedItem => "is not recognised and was skipped",
            WarningKind::BlankItem => "is blank and was skipped",
        };
        write!(f, "{}: '{}' {}", self.category, self.item, what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_their_serialised_form() {
        for kind in [
            WarningKind::UnresolvedTerm,
            WarningKind::UnrecognizedItem,
            WarningKind::BlankItem,
        ] {
            assert_eq!(serde_json::to_value(kind).unwrap(), kind.as_str());
        }
    }

    #[test]
    fn display_names_the_category_and_item() {
        let w = AssemblyWarning::new(Category::LungCancer, "Unknown Test", WarningKind::UnrecognizedItem);
        assert_eq!(
            w.to_string(),
            "lungCancer: 'Unknown Test' is not recognised and was skipped"
        );
    }
}
