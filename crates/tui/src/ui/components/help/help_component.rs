//! Help modal listing the keys of the current screen.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Paragraph, Wrap},
};
use simctl_types::Effect;

use super::content::build_help_text;
use crate::{
    app::App,
    ui::{components::component::Component, theme::theme_helpers as th},
};

#[derive(Debug, Default)]
pub struct HelpComponent;

impl Component for HelpComponent {
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let title = format!("Help: {}  [Esc] Close", app.route.title());
        let block = th::block(&*app.ctx.theme, Some(&title), true);

        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let paragraph = Paragraph::new(build_help_text(&*app.ctx.theme, app.route))
            .style(app.ctx.theme.text_primary_style())
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);
    }

    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::F(1) | KeyCode::Char('?') => vec![Effect::CloseModal],
            _ => vec![],
        }
    }
}
