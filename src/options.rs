use crate::palette::Palette;

/// Styling knobs for one conversion.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub font_name: String,
    pub font_size: u32,
    pub node_shape: String,
    /// Default edge color, also used for references when `edge_palette` is empty
    pub edge_color: String,
    pub label_distance: u32,
    pub rankdir: String,
    pub edge_palette: Palette,
    pub header_palette: Palette,
    /// Appended to the names of nullable columns
    pub nullable_marker: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            font_name: "Bitstream Vera Sans".to_string(),
            font_size: 8,
            node_shape: "none".to_string(),
            edge_color: "grey".to_string(),
            label_distance: 2,
            rankdir: "LR".to_string(),
            edge_palette: Palette::edges(),
            header_palette: Palette::headers(),
            nullable_marker: "?".to_string(),
        }
    }
}
