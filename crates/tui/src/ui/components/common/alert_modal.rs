use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::prelude::Span;
use ratatui::widgets::{Paragraph, Wrap};
use simctl_types::Effect;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers::{block_with_severity, build_hint_spans, render_button};

/// Success or failure message. Any of Enter, Esc or Space dismisses it.
#[derive(Debug, Clone)]
pub struct AlertModal {
    message: String,
    is_error: bool,
}

impl AlertModal {
    pub fn new(message: impl Into<String>, is_error: bool) -> Self {
        Self {
            message: message.into(),
            is_error,
        }
    }
}

impl Component for AlertModal {
    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => vec![Effect::CloseModal],
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let title = if self.is_error { "Error" } else { "Success" };
        let block = block_with_severity(theme, self.is_error, Some(title));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [message_rect, button_rect] = Layout::vertical([Constraint::Min(1), Constraint::Length(3)]).areas(inner);
        let style = if self.is_error { theme.status_error() } else { theme.text_primary_style() };
        frame.render_widget(Paragraph::new(self.message.as_str()).style(style).wrap(Wrap { trim: true }), message_rect);

        let [button] = Layout::horizontal([Constraint::Length(10)]).flex(ratatui::layout::Flex::Center).areas(button_rect);
        render_button(frame, button, "OK", theme, true, false);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        build_hint_spans(&*app.ctx.theme, &[("Enter/Esc", " Dismiss  ")])
    }
}
