use ratatui::layout::Rect;
use simctl_types::Route;

/// What activating a navigation item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavItemAction {
    Route(Route),
    Logout,
}

/// A single item in the vertical navigation bar.
///
/// Each item consists of a short display icon and a descriptive label shown
/// beside it when the bar is wide enough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavItem {
    /// Icon to display for the item (e.g., "[Dsh]").
    pub icon: String,
    pub label: String,
    pub action: NavItemAction,
}

impl NavItem {
    pub fn new(icon: impl Into<String>, label: impl Into<String>, action: NavItemAction) -> Self {
        Self {
            icon: icon.into(),
            label: label.into(),
            action,
        }
    }
}

/// State for the vertical navigation bar.
///
/// Owns the list of items, the cursor (the item Enter would activate), the
/// selection (the item matching the current route), and the last rendered
/// geometry for mouse hit testing.
#[derive(Debug, Default, Clone)]
pub struct NavBarState {
    pub items: Vec<NavItem>,
    /// Item matching the current route.
    pub selected_index: usize,
    /// Item under the keyboard cursor while the bar has focus.
    pub cursor_index: usize,
    /// Last rendered area of the nav bar; used for hit testing.
    pub last_area: Rect,
    /// Last computed per-item row areas for hit testing.
    pub per_item_areas: Vec<Rect>,
}

impl NavBarState {
    pub fn new(items: Vec<NavItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// The console's screens followed by logout.
    pub fn defaults_for_views() -> Self {
        let mut items: Vec<NavItem> = Route::NAVIGABLE
            .iter()
            .map(|route| NavItem::new(icon_for(*route), route.title(), NavItemAction::Route(*route)))
            .collect();
        items.push(NavItem::new("[Out]", "Logout", NavItemAction::Logout));
        Self::new(items)
    }

    /// Move the cursor, wrapping at both ends.
    pub fn cycle_cursor(&mut self, forward: bool) {
        let len = self.items.len();
        if len == 0 {
            return;
        }
        self.cursor_index = if forward {
            (self.cursor_index + 1) % len
        } else {
            (self.cursor_index + len - 1) % len
        };
    }

    pub fn cursor_item(&self) -> Option<&NavItem> {
        self.items.get(self.cursor_index)
    }

    /// Highlight the item for `route`. Screens without an item (forms, logs)
    /// highlight their parent list.
    pub fn set_route(&mut self, route: Route) {
        let anchor = match route {
            Route::GatewayForm => Route::Gateways,
            Route::DeviceWizard | Route::BulkDevices | Route::DeviceLogs => Route::Devices,
            other => other,
        };
        if let Some(index) = self.items.iter().position(|item| item.action == NavItemAction::Route(anchor)) {
            self.selected_index = index;
            self.cursor_index = index;
        }
    }
}

fn icon_for(route: Route) -> &'static str {
    match route {
        Route::Dashboard => "[Dsh]",
        Route::Gateways => "[Gwy]",
        Route::Devices => "[Dev]",
        Route::GatewayBridge => "[Brg]",
        _ => "[ ? ]",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_screens_highlight_their_list() {
        let mut state = NavBarState::defaults_for_views();
        state.set_route(Route::DeviceWizard);
        assert_eq!(state.items[state.selected_index].action, NavItemAction::Route(Route::Devices));
        state.set_route(Route::GatewayForm);
        assert_eq!(state.items[state.selected_index].action, NavItemAction::Route(Route::Gateways));
    }

    #[test]
    fn cursor_wraps() {
        let mut state = NavBarState::defaults_for_views();
        state.cycle_cursor(false);
        assert_eq!(state.cursor_item().map(|item| item.action), Some(NavItemAction::Logout));
        state.cycle_cursor(true);
        assert_eq!(state.cursor_index, 0);
    }
}
