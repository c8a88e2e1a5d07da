//! Human-readable narratives.
//!
//! A narrative is an XHTML `div` rendered purely from the fields it is given. It never contains
//! identifiers or timestamps, so two resources built from the same input carry the same text.

use fhir::{Narrative, NarrativeStatus};
use html_escape::encode_text;

const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// Renders a generated narrative from a heading and labelled lines.
///
/// Lines with an empty value are dropped.
pub fn render(heading: &str, lines: &[(&str, &str)]) -> Narrative {
    let mut div = format!(r#"<div xmlns="{XHTML_NS}"><p><b>{}</b></p>"#, encode_text(heading));
    for (label, value) in lines.iter().filter(|(_, v)| !v.trim().is_empty()) {
        div.push_str(&format!("<p>{}: {}</p>", encode_text(label), encode_text(value)));
    }
    div.push_str("</div>");

    Narrative {
        status: NarrativeStatus::Generated,
        div,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_in_values_is_escaped() {
        let n = render("Allergy <drug>", &[("Note", "A & B < C")]);
        assert_eq!(
            n.div,
            r#"<div xmlns="http://www.w3.org/1999/xhtml"><p><b>Allergy &lt;drug&gt;</b></p><p>Note: A &amp; B &lt; C</p></div>"#
        );
    }

    #[test]
    fn renders_heading_and_non_empty_lines() {
        let n = render("Condition", &[("Name", "Hypertension"), ("Note", "  ")]);
        assert_eq!(n.status, NarrativeStatus::Generated);
        assert_eq!(
            n.div,
            r#"<div xmlns="http://www.w3.org/1999/xhtml"><p><b>Condition</b></p><p>Name: Hypertension</p></div>"#
        );
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render("Observation", &[("Value", "13.2 g/dL")]);
        let b = render("Observation", &[("Value", "13.2 g/dL")]);
        assert_eq!(a, b);
    }
}
