//! Fixed color palettes for table headers and reference edges.

/// Qualitative 8-color palette cycled over references.
pub const EDGE_COLORS: &[&str] = &[
    "#1B9E77", "#D95F02", "#7570B3", "#E7298A", "#66A61E", "#E6AB02", "#A6761D", "#666666",
];

/// Muted 6-color palette selected by `COLOR:<n>` notes.
pub const HEADER_COLORS: &[&str] = &[
    "#FFDCB6", "#253845", "#E7AD9D", "#66756E", "#8B3F31", "#966C41",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<String>,
}

impl Palette {
    pub fn new<S: Into<String>>(colors: impl IntoIterator<Item = S>) -> Self {
        Self {
            colors: colors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn edges() -> Self {
        Self::new(EDGE_COLORS.iter().copied())
    }

    pub fn headers() -> Self {
        Self::new(HEADER_COLORS.iter().copied())
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Color at `index`, wrapping around the palette. `None` only when empty.
    pub fn pick(&self, index: usize) -> Option<&str> {
        if self.colors.is_empty() {
            return None;
        }
        Some(self.colors[index % self.colors.len()].as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_wraps() {
        let p = Palette::headers();
        assert_eq!(p.pick(0), p.pick(HEADER_COLORS.len()));
        assert_eq!(p.pick(7), Some(HEADER_COLORS[1]));
    }

    #[test]
    fn test_empty_palette() {
        let p = Palette::new(Vec::<String>::new());
        assert!(p.is_empty());
        assert_eq!(p.pick(3), None);
    }
}
