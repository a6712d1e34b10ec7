//! Theme styling module for the TUI UI layer.
//!
//! The console ships the Nord palette (plus a high-contrast variant) and an
//! ANSI 256-color fallback, semantic theme roles, and helper builders for
//! Ratatui widgets and styles. Prefer these helpers over hard-coding colors.

use std::env;

use tracing::debug;

pub mod ansi256;
pub mod nord;
pub mod roles;
pub mod theme_helpers;

pub use ansi256::Ansi256Theme;
pub use nord::{NordTheme, NordThemeHighContrast};
pub use roles::Theme;

/// Environment variable selecting the palette (`nord`, `nord-high-contrast`).
pub const THEME_ENV: &str = "SIMCTL_THEME";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorCapability {
    Truecolor,
    Ansi256,
}

/// Selects a theme based on `SIMCTL_THEME` and terminal capabilities.
pub fn load() -> Box<dyn Theme> {
    if detect_color_capability() == ColorCapability::Ansi256 {
        debug!("ANSI-only terminal detected; using the fallback palette.");
        return Box::new(Ansi256Theme::new());
    }

    match env::var(THEME_ENV).map(|name| name.trim().to_ascii_lowercase()).as_deref() {
        Ok("nord-high-contrast" | "high-contrast") => Box::new(NordThemeHighContrast::new()),
        _ => Box::new(NordTheme::new()),
    }
}

fn detect_color_capability() -> ColorCapability {
    if let Some(mode) = env::var("SIMCTL_COLOR_MODE").ok().and_then(|value| parse_color_mode(value.trim())) {
        return mode;
    }

    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return ColorCapability::Truecolor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("truecolor") || term.contains("direct") {
        return ColorCapability::Truecolor;
    }

    ColorCapability::Ansi256
}

fn parse_color_mode(value: &str) -> Option<ColorCapability> {
    match value.to_ascii_lowercase().as_str() {
        "truecolor" | "24bit" => Some(ColorCapability::Truecolor),
        "ansi256" | "256" | "8bit" => Some(ColorCapability::Ansi256),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn ansi_terminals_get_the_indexed_palette() {
        temp_env::with_vars(
            [("SIMCTL_COLOR_MODE", Some("256")), (THEME_ENV, Some("nord"))],
            || assert!(matches!(load().roles().background, Color::Indexed(_))),
        );
    }

    #[test]
    fn truecolor_terminals_honour_the_theme_variable() {
        temp_env::with_vars(
            [("SIMCTL_COLOR_MODE", Some("truecolor")), (THEME_ENV, Some("high-contrast"))],
            || assert_eq!(load().roles().text, nord::TEXT_SELECTED),
        );
        temp_env::with_vars([("SIMCTL_COLOR_MODE", Some("truecolor")), (THEME_ENV, None)], || {
            assert_eq!(load().roles().text, nord::TEXT_PRIMARY)
        });
    }
}
