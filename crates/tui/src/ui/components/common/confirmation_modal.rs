use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::prelude::Span;
use ratatui::widgets::{Paragraph, Wrap};
use simctl_types::{ConfirmAction, Effect};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers::{block_with_severity, build_hint_spans, render_button};

const BUTTON_LABELS: [&str; 2] = ["Cancel", "Confirm"];
const CONFIRM_BUTTON: usize = 1;

/// Yes/no dialog guarding a destructive action. Accepting emits the action's
/// effect; either answer closes the dialog.
#[derive(Debug, Clone)]
pub struct ConfirmationModal {
    message: String,
    action: ConfirmAction,
    focused_button: usize,
    button_areas: Vec<Rect>,
}

impl ConfirmationModal {
    pub fn new(message: impl Into<String>, action: ConfirmAction) -> Self {
        Self {
            message: message.into(),
            action,
            focused_button: 0,
            button_areas: Vec::new(),
        }
    }

    fn accept(&self) -> Vec<Effect> {
        let effect = match &self.action {
            ConfirmAction::DeleteDevices(dev_euis) => Effect::DeleteDevices(dev_euis.clone()),
            ConfirmAction::DeleteGateways(ids) => Effect::DeleteGateways(ids.clone()),
        };
        vec![Effect::CloseModal, effect]
    }

    fn press(&self, index: usize) -> Vec<Effect> {
        if index == CONFIRM_BUTTON { self.accept() } else { vec![Effect::CloseModal] }
    }
}

impl Component for ConfirmationModal {
    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
                self.focused_button = (self.focused_button + 1) % BUTTON_LABELS.len();
                Vec::new()
            }
            KeyCode::Char('y') | KeyCode::Char('Y') => self.accept(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => vec![Effect::CloseModal],
            KeyCode::Enter => self.press(self.focused_button),
            _ => Vec::new(),
        }
    }

    fn handle_mouse_events(&mut self, _app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let MouseEvent { kind, column, row, .. } = mouse;
        if kind == MouseEventKind::Down(MouseButton::Left) {
            let position = Position::new(column, row);
            if let Some(index) = self.button_areas.iter().position(|area| area.contains(position)) {
                return self.press(index);
            }
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let block = block_with_severity(theme, true, Some("Confirm"));
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [message_rect, _, button_rect] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1), Constraint::Length(3)]).areas(inner);

        frame.render_widget(Paragraph::new(self.message.as_str()).wrap(Wrap { trim: false }), message_rect);

        let width: u16 = 12;
        let spacer: u16 = 2;
        let mut button_areas = Vec::with_capacity(BUTTON_LABELS.len());
        for (index, label) in BUTTON_LABELS.iter().enumerate() {
            let offset = index as u16 * (width + spacer);
            let area = Rect::new(button_rect.x + offset, button_rect.y, width, button_rect.height).intersection(button_rect);
            render_button(frame, area, label, theme, self.focused_button == index, false);
            button_areas.push(area);
        }
        self.button_areas = button_areas;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        build_hint_spans(
            &*app.ctx.theme,
            &[("Y", " Confirm  "), ("N/Esc", " Cancel  "), ("Tab", " Switch button  "), ("Enter", " Press  ")],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use crossterm::event::KeyModifiers;

    #[test]
    fn accepting_emits_the_delete() {
        let mut app = test_app();
        let mut modal = ConfirmationModal::new("Delete?", ConfirmAction::DeleteGateways(vec!["g1".into()]));
        let effects = modal.handle_key_events(&mut app, KeyEvent::new(KeyCode::Char('y'), KeyModifiers::NONE));
        assert_eq!(effects, vec![Effect::CloseModal, Effect::DeleteGateways(vec!["g1".into()])]);
    }

    #[test]
    fn enter_on_cancel_only_closes() {
        let mut app = test_app();
        let mut modal = ConfirmationModal::new("Delete?", ConfirmAction::DeleteDevices(vec!["d1".into()]));
        let effects = modal.handle_key_events(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));
        assert_eq!(effects, vec![Effect::CloseModal]);
    }
}
