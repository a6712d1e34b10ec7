//! ANSI 256-color fallback theme for terminals without truecolor support.
//!
//! The indexed colors approximate the Nord palette so the console looks the
//! same family of colors inside macOS Terminal and other 8-bit terminals.

use ratatui::style::Color;

use super::roles::{Theme, ThemeRoles};

#[derive(Debug, Clone)]
pub struct Ansi256Theme {
    roles: ThemeRoles,
}

impl Ansi256Theme {
    pub fn new() -> Self {
        Self {
            roles: ThemeRoles {
                background: Color::Indexed(236),
                surface: Color::Indexed(237),
                surface_muted: Color::Indexed(239),
                border: Color::Indexed(239),
                divider: Color::Indexed(240),

                text: Color::Indexed(253),
                text_secondary: Color::Indexed(255),
                text_muted: Color::Indexed(245),

                accent_primary: Color::Indexed(110),
                accent_secondary: Color::Indexed(109),

                info: Color::Indexed(109),
                success: Color::Indexed(150),
                warning: Color::Indexed(173),
                error: Color::Indexed(167),

                selection_bg: Color::Indexed(240),
                selection_fg: Color::Indexed(255),
                focus: Color::Indexed(110),
                modal_bg: Color::Indexed(233),
                map_land: Color::Indexed(67),
                map_marker: Color::Indexed(167),
                table_row_even: Color::Indexed(235),
                table_row_odd: Color::Indexed(237),
            },
        }
    }
}

impl Theme for Ansi256Theme {
    fn roles(&self) -> &ThemeRoles {
        &self.roles
    }
}
