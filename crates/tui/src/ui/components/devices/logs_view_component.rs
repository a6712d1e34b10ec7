use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use simctl_types::{Effect, Route};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::devices::DEVICE_LOGS_FAILED_MESSAGE;
use crate::ui::theme::theme_helpers as th;

/// Tail of one device's simulator log.
#[derive(Debug, Default)]
pub struct DeviceLogsComponent;

impl DeviceLogsComponent {
    fn reload(app: &mut App) -> Vec<Effect> {
        if app.device_logs.dev_eui.is_empty() {
            return Vec::new();
        }
        app.device_logs.loading = true;
        vec![Effect::LoadDeviceLogs(app.device_logs.dev_eui.clone())]
    }
}

impl Component for DeviceLogsComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        Self::reload(app)
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc => return vec![Effect::SwitchTo(Route::Devices)],
            KeyCode::Char('r') => return Self::reload(app),
            _ => {}
        }
        let state = &mut app.device_logs;
        let list_state = &mut state.list_state;
        match key.code {
            KeyCode::Char('c') => {
                if let Some(line) = list_state.selected().and_then(|index| state.lines.get(index)) {
                    return vec![Effect::CopyToClipboardRequested(line.clone())];
                }
            }
            KeyCode::Up => list_state.select_previous(),
            KeyCode::Down => list_state.select_next(),
            KeyCode::PageUp => list_state.scroll_up_by(10),
            KeyCode::PageDown => list_state.scroll_down_by(10),
            KeyCode::Home => list_state.select_first(),
            KeyCode::End => list_state.select(None),
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        match mouse.kind {
            MouseEventKind::ScrollUp => app.device_logs.list_state.scroll_up_by(3),
            MouseEventKind::ScrollDown => app.device_logs.list_state.scroll_down_by(3),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let state = &mut app.device_logs;
        let title = if state.loading {
            format!("Logs: {} ({}) loading…", state.name, state.dev_eui)
        } else {
            format!("Logs: {} ({})", state.name, state.dev_eui)
        };
        let block = th::block(theme, Some(&title), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        if state.failed {
            let line = Line::from(Span::styled(DEVICE_LOGS_FAILED_MESSAGE, theme.status_error()));
            frame.render_widget(Paragraph::new(line), inner);
            return;
        }

        let items: Vec<ListItem> = state
            .lines
            .iter()
            .map(|line| ListItem::new(Line::from(Span::styled(line.as_str(), theme.text_primary_style()))))
            .collect();
        let list = List::new(items).highlight_style(th::table_selected_style(theme));

        let visible = usize::from(inner.height);
        if state.list_state.selected().is_none() {
            *state.list_state.offset_mut() = state.lines.len().saturating_sub(visible);
        }
        frame.render_stateful_widget(list, inner, &mut state.list_state);

        if visible > 0 && state.lines.len() > visible {
            let max_offset = state.lines.len() - visible;
            let mut scrollbar_state = ScrollbarState::new(max_offset)
                .position(state.list_state.offset().min(max_offset))
                .viewport_content_length(visible);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .thumb_style(Style::default().fg(theme.roles().accent_secondary))
                .track_style(Style::default().fg(theme.roles().divider));
            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[("↑/↓", " Select  "), ("End", " Follow tail  "), ("C", " Copy line  "), ("R", " Refresh  "), ("Esc", " Back  ")],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn failed_fetch_shows_the_friendly_message() {
        let mut app = test_app();
        app.device_logs.open("AABBCCDDEEFF0011", "node-1");
        app.device_logs.apply("AABBCCDDEEFF0011", Err("connection reset by peer".into()));

        let mut terminal = Terminal::new(TestBackend::new(80, 10)).unwrap();
        terminal
            .draw(|frame| DeviceLogsComponent.render(frame, frame.area(), &mut app))
            .unwrap();
        let text: String = terminal.backend().buffer().content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains(DEVICE_LOGS_FAILED_MESSAGE));
        assert!(!text.contains("connection reset"));
    }
}
