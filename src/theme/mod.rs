pub mod builtin;

use ratatui::style::Color;
use tracing::warn;

/// Semantic color tokens used by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeColors {
    /// Spark glyphs and the assistant accent.
    pub primary: Color,
    pub accent: Color,
    pub warning: Color,
    pub error: Color,
    pub text: Color,
    pub text_muted: Color,
    pub text_dim: Color,
    pub surface: Color,
    /// Background of user bubbles.
    pub bubble: Color,
}

/// Parse a hex color string like "#d97757" into a ratatui Color.
pub fn hex_to_color(hex: &str) -> Color {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Color::White;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
    Color::Rgb(r, g, b)
}

impl ThemeColors {
    /// Load a theme by name, falling back to "spark".
    pub fn by_name(name: &str) -> Self {
        builtin::get_theme(name).unwrap_or_else(|| {
            warn!(theme = name, available = ?builtin::list_themes(), "unknown theme, using spark");
            builtin::spark()
        })
    }
}
