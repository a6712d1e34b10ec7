use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use simctl_types::Effect;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;
use crate::ui::utils::centered_fixed;

/// Operator sign-in. The console keeps no password; the user name scopes
/// the backend's per-operator resources.
#[derive(Debug, Default)]
pub struct LoginComponent;

impl Component for LoginComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let input = &mut app.login.user;
        match key.code {
            KeyCode::Enter => return app.login.submit().map(Effect::Login).into_iter().collect(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert_char(c),
            KeyCode::Backspace => input.backspace(),
            KeyCode::Delete => input.delete(),
            KeyCode::Left => input.move_left(),
            KeyCode::Right => input.move_right(),
            KeyCode::Home => input.move_home(),
            KeyCode::End => input.move_end(),
            KeyCode::Esc => app.login.clear(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let area = centered_fixed(50, 9, rect);
        let block = th::block(theme, Some("Sign in"), true);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [intro, _, field, error] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1), Constraint::Min(1)]).areas(inner);
        frame.render_widget(Paragraph::new(Span::styled("Device simulator console", theme.text_secondary_style())), intro);

        let label = "User: ";
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(label, theme.text_secondary_style()),
                Span::styled(app.login.user.input(), th::input_style(theme, true, true)),
            ])),
            field,
        );
        frame.set_cursor_position(Position::new(field.x + label.len() as u16 + app.login.user.cursor_columns(), field.y));

        if let Some(message) = &app.login.error {
            frame.render_widget(Paragraph::new(Span::styled(message.as_str(), theme.status_error())), error);
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[("Enter", " Sign in  "), ("Esc", " Clear  "), ("Ctrl+C", " Quit  ")])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn enter_logs_in_with_the_trimmed_name() {
        let mut app = test_app();
        let mut login = LoginComponent;
        assert!(login.handle_key_events(&mut app, key(KeyCode::Enter)).is_empty());
        assert!(app.login.error.is_some());

        for c in " ops ".chars() {
            login.handle_key_events(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(login.handle_key_events(&mut app, key(KeyCode::Enter)), vec![Effect::Login("ops".into())]);
        assert!(app.login.error.is_none());
    }
}
