use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::text::Span;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    widgets::{Block, Borders},
};
use simctl_types::Effect;

use super::state::NavItemAction;
use crate::ui::components::Component;
use crate::ui::utils::find_target_index_by_mouse_position;
use crate::{
    app::{App, FocusArea},
    ui::theme::theme_helpers::{self as th, render_button},
};

/// Vertical navigation bar listing the console's screens.
///
/// Renders a column of icon buttons with selection and focus styling. Enter
/// (or a click) on an item switches the main view or logs out.
#[derive(Debug, Default)]
pub struct VerticalNavBarComponent {
    /// Optional title for the surrounding block. When `None`, no title is shown.
    pub title: Option<String>,
}

impl VerticalNavBarComponent {
    pub fn new() -> Self {
        Self {
            title: Some("Views".to_string()),
        }
    }

    fn push_action_effect(effects: &mut Vec<Effect>, action: NavItemAction) {
        match action {
            NavItemAction::Route(route) => effects.push(Effect::SwitchTo(route)),
            NavItemAction::Logout => effects.push(Effect::Logout),
        }
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let row_count = app.nav_bar.items.len();
        let mut constraints = vec![Constraint::Length(3); row_count + 1];
        // Pins the last item (logout) to the bottom
        constraints[row_count - 1] = Constraint::Min(0);

        let mut layout = Layout::vertical(constraints).margin(1).split(area).to_vec();
        layout.swap_remove(layout.len() - 2);
        layout
    }
}

impl Component for VerticalNavBarComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let mut effects = vec![];
        match key.code {
            KeyCode::Down | KeyCode::Tab => app.nav_bar.cycle_cursor(true),
            KeyCode::Up | KeyCode::BackTab => app.nav_bar.cycle_cursor(false),
            KeyCode::Right | KeyCode::Esc => app.focus = FocusArea::Content,
            KeyCode::Enter => {
                if let Some(item) = app.nav_bar.cursor_item() {
                    Self::push_action_effect(&mut effects, item.action);
                    app.focus = FocusArea::Content;
                }
            }
            _ => {}
        };
        effects
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let mut effects = vec![];
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return effects;
        }
        let state = &app.nav_bar;
        let Some(index) = find_target_index_by_mouse_position(&state.last_area, &state.per_item_areas, mouse.column, mouse.row) else {
            return effects;
        };
        if let Some(item) = app.nav_bar.items.get(index) {
            Self::push_action_effect(&mut effects, item.action);
            app.nav_bar.cursor_index = index;
        }
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let focused = app.focus == FocusArea::NavBar;

        let block: Block = th::block(theme, self.title.as_deref(), focused).borders(Borders::ALL);
        frame.render_widget(block, area);

        if app.nav_bar.items.is_empty() {
            return;
        }

        let item_areas = self.get_preferred_layout(app, area);
        for (index, item) in app.nav_bar.items.iter().enumerate() {
            let is_selected = index == app.nav_bar.selected_index;
            let is_focused = focused && index == app.nav_bar.cursor_index;
            if let Some(row_area) = item_areas.get(index).copied() {
                render_button(frame, row_area, &item.icon, theme, is_focused, is_selected);
            }
        }
        app.nav_bar.last_area = area;
        app.nav_bar.per_item_areas = item_areas;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[(" Enter", " Select view "), (" ↑/↓", " Navigate ")])
    }
}
