//! Specificity-ordered classification of discrete lab-test names.
//!
//! Each panel owns a fixed, ordered rule list. The first rule that matches a normalised test
//! name wins; a name that matches nothing is skipped by the caller. Rules that overlap (a
//! name that is a strict prefix of another) are written as exact matches and ordered so the
//! more specific rule is tried first.

use crate::constants::LOINC_SYSTEM;
use crate::terminology::normalise_name;
use fhir::CodeableTerm;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchRule {
    Prefix(&'static str),
    Exact(&'static str),
}

impl MatchRule {
    fn matches(&self, normalised: &str) -> bool {
        match self {
            MatchRule::Prefix(p) => normalised.starts_with(p),
            MatchRule::Exact(e) => normalised == *e,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelRule {
    pub rule: MatchRule,
    pub code: &'static str,
    pub display: &'static str,
}

const fn rule(rule: MatchRule, code: &'static str, display: &'static str) -> PanelRule {
    PanelRule {
        rule,
        code,
        display,
    }
}

/// An ordered rule list for one lab panel.
#[derive(Debug)]
pub struct PanelMatcher {
    pub panel: &'static str,
    rules: &'static [PanelRule],
}

impl PanelMatcher {
    /// Returns the first rule matching `test_name`, if any.
    pub fn classify(&self, test_name: &str) -> Option<&'static PanelRule> {
        let normalised = normalise_name(test_name);
        self.rules.iter().find(|r| r.rule.matches(&normalised))
    }

    /// Returns the LOINC term for `test_name`, if any rule matches.
    pub fn term(&self, test_name: &str) -> Option<CodeableTerm> {
        self.classify(test_name)
            .map(|r| CodeableTerm::new(LOINC_SYSTEM, r.code, r.display))
    }
}

use MatchRule::{Exact, Prefix};

pub static LIPID_PANEL: PanelMatcher = PanelMatcher {
    panel: "lipid profile",
    rules: &[
        rule(Prefix("total"), "2093-3", "Cholesterol [Mass/volume] in Serum or Plasma"),
        rule(Prefix("hdl"), "2085-9", "HDL Cholesterol"),
        rule(Prefix("ldl"), "13457-7", "LDL Cholesterol (calculated)"),
        rule(Prefix("vldl"), "13458-5", "VLDL Cholesterol (calculated)"),
        rule(
            Exact("triglycerides fasting"),
            "3043-7",
            "Triglyceride [Mass/volume] in Serum or Plasma --fasting",
        ),
        rule(Exact("triglycerides"), "2571-8", "Triglyceride [Mass/volume] in Serum or Plasma"),
        rule(Exact("fasting duration"), "87527-8", "Fasting duration"),
        rule(Exact("fasting status"), "49541-6", "Fasting status - Reported"),
    ],
};

pub static RENAL_PANEL: PanelMatcher = PanelMatcher {
    panel: "renal function",
    rules: &[
        rule(Prefix("creatinine"), "2160-0", "Creatinine [Mass/volume] in Serum or Plasma"),
        rule(Prefix("urea nitrogen"), "3094-0", "Urea nitrogen [Mass/volume] in Serum or Plasma"),
        rule(Exact("urea"), "3091-6", "Urea [Mass/volume] in Serum or Plasma"),
        rule(Prefix("bun"), "3094-0", "Urea nitrogen [Mass/volume] in Serum or Plasma"),
        rule(Exact("blood urea nitrogen"), "3094-0", "Urea nitrogen [Mass/volume] in Serum or Plasma"),
        rule(Prefix("egfr"), "33914-3", "Glomerular filtration rate/1.73 sq M.predicted"),
        rule(Prefix("sodium"), "2951-2", "Sodium [Moles/volume] in Serum or Plasma"),
        rule(Prefix("potassium"), "2823-3", "Potassium [Moles/volume] in Serum or Plasma"),
        rule(Exact("uric acid"), "3084-1", "Urate [Mass/volume] in Serum or Plasma"),
    ],
};
