//! Key reference shown in the help modal.

use ratatui::{
    style::Modifier,
    text::{Line, Span, Text},
};
use simctl_types::Route;

use crate::ui::theme::Theme;

const GLOBAL_KEYS: &[(&str, &str)] = &[
    ("F1 / ?", "Show this help"),
    ("F6", "Cycle focus between navigation, screen and logs"),
    ("Ctrl+L", "Show or hide the logs pane"),
    ("Ctrl+C", "Quit"),
];

fn screen_keys(route: Route) -> &'static [(&'static str, &'static str)] {
    match route {
        Route::Login => &[("Enter", "Log in with the typed user name")],
        Route::Dashboard => &[("R", "Refresh the totals and the per-gateway chart")],
        Route::Gateways => &[
            ("Space / A", "Mark the row / mark every row"),
            ("N", "Add a gateway"),
            ("E / Enter", "Edit the selected gateway"),
            ("D", "Delete the marked gateways"),
            ("J / U", "Start / stop the gateway simulator"),
            ("S / X", "Start / stop the gateway uplink"),
            ("R", "Refresh"),
        ],
        Route::GatewayForm => &[
            ("↑ / ↓", "Move between fields"),
            ("← / →", "Change the type"),
            ("Ctrl+G", "Generate a MAC address"),
            ("Ctrl+F", "Search an address"),
            ("Ctrl+R", "Look up the address of the coordinates"),
            ("Ctrl+S", "Save"),
            ("Esc", "Back to the gateway list"),
        ],
        Route::Devices => &[
            ("Space / A", "Mark the row / mark every row"),
            ("N / Shift+N", "Add a LoRaWAN device / an SCTE-283 amplifier"),
            ("B", "Create devices in bulk"),
            ("E / Enter", "Edit the selected device"),
            ("D", "Delete the marked devices"),
            ("L", "Show the device log"),
            ("J / U", "Join / unjoin the marked devices"),
            ("S / X", "Start / stop the uplink of the marked devices"),
            ("R", "Refresh"),
        ],
        Route::DeviceWizard => &[
            ("PgDn / PgUp", "Next / previous tab (General must be complete)"),
            ("F2 / F3 / F4", "General / LoRaWAN / SCTE-283 section"),
            ("Ctrl+← / Ctrl+→", "Previous / next sub-tab"),
            ("Ctrl+G", "Generate the focused key"),
            ("Ctrl+R", "Show or hide secret keys"),
            ("Ctrl+A / Ctrl+D", "Add / remove a sensor (System tab)"),
            ("F5", "Steer the map (Location tab)"),
            ("Ctrl+F", "Search an address (Location tab)"),
            ("Ctrl+S", "Save and close"),
            ("Ctrl+N", "Save and start a new device"),
            ("Esc", "Back to the device list"),
        ],
        Route::BulkDevices => &[("← / →", "Pick gateway and region"), ("Ctrl+S", "Create"), ("Esc", "Back")],
        Route::DeviceLogs => &[("End", "Follow the tail"), ("C", "Copy the selected line"), ("R", "Refresh"), ("Esc", "Back")],
        Route::GatewayBridge => &[("C", "Copy the bridge address"), ("R", "Refresh")],
    }
}

fn section<'a>(theme: &dyn Theme, title: &'a str, keys: &[(&'a str, &'a str)]) -> Vec<Line<'a>> {
    let mut lines = vec![Line::styled(
        format!(" {title}:"),
        theme.text_secondary_style().add_modifier(Modifier::BOLD),
    )];
    lines.extend(keys.iter().map(|(key, action)| {
        Line::from(vec![
            Span::styled(format!("  {key:<18}"), theme.accent_emphasis_style()),
            Span::styled(*action, theme.text_primary_style()),
        ])
    }));
    lines.push(Line::from(""));
    lines
}

/// Keys of the current screen followed by the global ones.
pub(crate) fn build_help_text(theme: &dyn Theme, route: Route) -> Text<'static> {
    let mut lines = vec![Line::from("")];
    lines.extend(section(theme, route.title(), screen_keys(route)));
    lines.extend(section(theme, "Everywhere", GLOBAL_KEYS));
    Text::from(lines)
}
