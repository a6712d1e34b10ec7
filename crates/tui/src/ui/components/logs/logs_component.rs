//! Logs pane: a scrollable list of console events with a search filter.
//!
//! Every backend result and state change the console reports lands here.
//! Lines are redacted on insert, so copying a line never leaks a key.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use simctl_types::Effect;

use super::state::LogLevel;
use crate::app::{App, FocusArea};
use crate::ui::{components::component::Component, theme::theme_helpers as th};

#[derive(Debug, Default)]
pub struct LogsComponent {
    search_area: Rect,
    list_area: Rect,
}

impl LogsComponent {
    fn handle_search_keys(&self, app: &mut App, key: KeyEvent) {
        let search = &mut app.logs.search;
        match key.code {
            KeyCode::Esc | KeyCode::Enter => app.logs.search_active = false,
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => search.insert_char(c),
            KeyCode::Backspace => search.backspace(),
            KeyCode::Delete => search.delete(),
            KeyCode::Left => search.move_left(),
            KeyCode::Right => search.move_right(),
            _ => {}
        }
        app.logs.list_state.select(None);
    }
}

impl Component for LogsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        if app.logs.search_active {
            self.handle_search_keys(app, key);
            return effects;
        }

        match key.code {
            KeyCode::Esc => {
                if app.logs.has_search_query() {
                    app.logs.search.clear();
                } else {
                    app.focus = FocusArea::Content;
                }
            }
            KeyCode::Char('/') => app.logs.search_active = true,
            KeyCode::Char('f') if key.modifiers.contains(KeyModifiers::CONTROL) => app.logs.search_active = true,
            KeyCode::Up => app.logs.list_state.select_previous(),
            KeyCode::Down => app.logs.list_state.select_next(),
            KeyCode::PageUp => app.logs.list_state.scroll_up_by(10),
            KeyCode::PageDown => app.logs.list_state.scroll_down_by(10),
            KeyCode::Home => app.logs.list_state.select_first(),
            KeyCode::End => app.logs.list_state.select_last(),
            KeyCode::Char('c') => {
                if let Some(entry) = app.logs.selected_entry() {
                    effects.push(Effect::CopyToClipboardRequested(entry.to_string()));
                }
            }
            _ => {}
        }
        effects
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if self.search_area.contains(position) => {
                app.focus = FocusArea::Logs;
                app.logs.search_active = true;
            }
            MouseEventKind::Down(MouseButton::Left) if self.list_area.contains(position) => {
                app.focus = FocusArea::Logs;
                let row = usize::from(mouse.row - self.list_area.y);
                let index = app.logs.list_state.offset() + row;
                if index < app.logs.filtered_indices().len() {
                    app.logs.list_state.select(Some(index));
                }
            }
            MouseEventKind::ScrollUp if self.list_area.contains(position) => app.logs.list_state.scroll_up_by(3),
            MouseEventKind::ScrollDown if self.list_area.contains(position) => app.logs.list_state.scroll_down_by(3),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let focused = app.focus == FocusArea::Logs;
        let theme = &*app.ctx.theme;
        let filtered = app.logs.filtered_indices();
        let total = app.logs.entries.len();
        let title = if app.logs.has_search_query() {
            format!("Logs ({}/{total})", filtered.len())
        } else {
            format!("Logs ({total})")
        };
        let block = th::block(theme, Some(&title), focused);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);
        let [search_area, list_area] = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).areas(inner);

        let search_line = if app.logs.search_active || app.logs.has_search_query() {
            Line::from(vec![
                Span::styled("/ ", theme.accent_emphasis_style()),
                Span::styled(app.logs.search.input(), theme.text_primary_style()),
            ])
        } else {
            Line::from(Span::styled("/ to filter", theme.text_muted_style()))
        };
        frame.render_widget(Paragraph::new(search_line), search_area);
        if focused && app.logs.search_active {
            frame.set_cursor_position(Position::new(search_area.x + 2 + app.logs.search.cursor_columns(), search_area.y));
        }

        let items: Vec<ListItem> = filtered
            .iter()
            .map(|index| {
                let entry = &app.logs.entries[*index];
                let style = match entry.level {
                    LogLevel::Info => theme.text_primary_style(),
                    LogLevel::Warn => theme.status_warning(),
                    LogLevel::Error => theme.status_error(),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", entry.timestamp), theme.text_muted_style()),
                    Span::styled(entry.message.clone(), style),
                ]))
            })
            .collect();
        let list = List::new(items).highlight_style(if focused { th::table_selected_style(theme) } else { Style::default() });

        // Follow the tail until the operator selects a line.
        if app.logs.list_state.selected().is_none() {
            let visible = usize::from(list_area.height);
            *app.logs.list_state.offset_mut() = filtered.len().saturating_sub(visible);
        }
        frame.render_stateful_widget(list, list_area, &mut app.logs.list_state);

        let visible = usize::from(list_area.height);
        if focused && visible > 0 && filtered.len() > visible {
            let max_offset = filtered.len().saturating_sub(visible);
            let mut scrollbar_state = ScrollbarState::new(max_offset)
                .position(app.logs.list_state.offset().min(max_offset))
                .viewport_content_length(visible);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .thumb_style(Style::default().fg(theme.roles().accent_secondary))
                .track_style(Style::default().fg(theme.roles().divider));
            frame.render_stateful_widget(scrollbar, list_area, &mut scrollbar_state);
        }

        self.search_area = search_area;
        self.list_area = list_area;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let theme = &*app.ctx.theme;
        let mut spans = th::build_hint_spans(
            theme,
            &[("/", " Search  "), ("↑/↓", " Move  "), ("PgUp/PgDn", " Page  "), ("C", " Copy  ")],
        );
        if app.logs.search_active || app.logs.has_search_query() {
            spans.extend(th::build_hint_spans(theme, &[("Esc", " Clear search  ")]));
        }
        spans
    }
}
