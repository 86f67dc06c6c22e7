use ratatui::style::Color;

use super::{hex_to_color, ThemeColors};

pub fn spark() -> ThemeColors {
    ThemeColors {
        primary: hex_to_color("#d97757"),
        accent: hex_to_color("#7fb685"),
        warning: hex_to_color("#e0af68"),
        error: hex_to_color("#e06c75"),
        text: hex_to_color("#f4f1ea"),
        text_muted: hex_to_color("#9a958c"),
        text_dim: hex_to_color("#4a4740"),
        surface: hex_to_color("#1f1e1b"),
        bubble: hex_to_color("#3a3833"),
    }
}

pub fn nord() -> ThemeColors {
    ThemeColors {
        primary: hex_to_color("#88c0d0"),
        accent: hex_to_color("#a3be8c"),
        warning: hex_to_color("#ebcb8b"),
        error: hex_to_color("#bf616a"),
        text: hex_to_color("#eceff4"),
        text_muted: hex_to_color("#7b88a1"),
        text_dim: hex_to_color("#434c5e"),
        surface: hex_to_color("#2e3440"),
        bubble: hex_to_color("#3b4252"),
    }
}

/// Terminal default colors only, for monochrome displays.
pub fn mono() -> ThemeColors {
    ThemeColors {
        primary: Color::Reset,
        accent: Color::Reset,
        warning: Color::Reset,
        error: Color::Reset,
        text: Color::Reset,
        text_muted: Color::Reset,
        text_dim: Color::Reset,
        surface: Color::Reset,
        bubble: Color::Reset,
    }
}

/// Look up a theme by name.
pub fn get_theme(name: &str) -> Option<ThemeColors> {
    match name {
        "spark" | "default" => Some(spark()),
        "nord" => Some(nord()),
        "mono" => Some(mono()),
        _ => None,
    }
}

/// List all built-in theme names.
pub fn list_themes() -> Vec<&'static str> {
    vec!["spark", "nord", "mono"]
}
