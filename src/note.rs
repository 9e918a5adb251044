//! `COLOR:<n>` annotations embedded in table, column and reference notes.

use once_cell::sync::Lazy;
use regex::Regex;

static COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)COLOU?R:\s*(\d+)\b(.*)$").expect("valid color regex"));

/// What a note contributes to rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    pub color_index: Option<usize>,
    pub tooltip: Option<String>,
}

impl Annotation {
    pub fn is_empty(&self) -> bool {
        self.color_index.is_none() && self.tooltip.is_none()
    }
}

/// Extract the color index and trailing tooltip text from a note.
///
/// A note that doesn't carry the annotation yields an empty `Annotation`.
/// Indices too large for `usize` are treated as absent.
pub fn parse(note: Option<&str>) -> Annotation {
    let Some(caps) = note.and_then(|n| COLOR_RE.captures(n)) else {
        return Annotation::default();
    };

    let color_index = caps.get(1).and_then(|m| m.as_str().parse().ok());
    let tooltip = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    Annotation {
        color_index,
        tooltip,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_and_tooltip() {
        let a = parse(Some("COLOR: 3 Customer accounts"));
        assert_eq!(a.color_index, Some(3));
        assert_eq!(a.tooltip.as_deref(), Some("Customer accounts"));
    }

    #[test]
    fn test_case_insensitive_colour() {
        let a = parse(Some("colour:12"));
        assert_eq!(a.color_index, Some(12));
        assert_eq!(a.tooltip, None);
    }

    #[test]
    fn test_prefix_text_is_allowed() {
        let a = parse(Some("Billing data. Color: 1 see invoices"));
        assert_eq!(a.color_index, Some(1));
        assert_eq!(a.tooltip.as_deref(), Some("see invoices"));
    }

    #[test]
    fn test_multiline_tooltip() {
        let a = parse(Some("COLOR: 0\nfirst line\nsecond line"));
        assert_eq!(a.tooltip.as_deref(), Some("first line\nsecond line"));
    }

    #[test]
    fn test_no_annotation() {
        assert!(parse(None).is_empty());
        assert!(parse(Some("")).is_empty());
        assert!(parse(Some("just a note")).is_empty());
        assert!(parse(Some("COLOR: red")).is_empty());
        assert!(parse(Some("COLOR:5x")).is_empty());
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let note = Some("COLOUR: 7 twice the same");
        assert_eq!(parse(note), parse(note));
    }
}
