use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use simctl_types::{Effect, Modal, Route};

use super::state::GatewayFormFocus;
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::common::FormCtx;
use crate::ui::theme::theme_helpers as th;

/// Create/edit screen for one gateway.
#[derive(Debug, Default)]
pub struct GatewayFormComponent;

impl GatewayFormComponent {
    fn save(&self, app: &mut App) -> Vec<Effect> {
        let state = &mut app.gateway_form;
        if state.saving {
            return Vec::new();
        }
        match state.form.to_payload() {
            Ok(payload) => {
                state.saving = true;
                vec![Effect::SaveGateway {
                    id: state.form.id.clone(),
                    payload,
                }]
            }
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn handle_search_keys(&self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let search = &mut app.gateway_form.search;
        match key.code {
            KeyCode::Esc => app.gateway_form.focus = GatewayFormFocus::Fields,
            KeyCode::Enter => {
                let query = search.input().trim().to_string();
                if !query.is_empty() {
                    return vec![Effect::SearchAddress(query)];
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => search.insert_char(c),
            KeyCode::Backspace => search.backspace(),
            KeyCode::Delete => search.delete(),
            KeyCode::Left => search.move_left(),
            KeyCode::Right => search.move_right(),
            _ => {}
        }
        Vec::new()
    }
}

impl Component for GatewayFormComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if control => return self.save(app),
            KeyCode::Char('f') if control => {
                app.gateway_form.focus = GatewayFormFocus::Search;
                return Vec::new();
            }
            KeyCode::Char('r') if control => {
                let location = &app.gateway_form.form.location;
                return vec![Effect::ReverseGeocode {
                    latitude: location.latitude,
                    longitude: location.longitude,
                }];
            }
            _ => {}
        }

        if app.gateway_form.focus == GatewayFormFocus::Search {
            return self.handle_search_keys(app, key);
        }
        if key.code == KeyCode::Esc {
            return vec![Effect::SwitchTo(Route::Gateways)];
        }

        let fields = app.gateway_form.field_list();
        let state = &mut app.gateway_form;
        let before = state.form.kind;
        state.fields.handle_key(&fields, &mut state.form, &FormCtx::default(), key);
        if state.form.kind != before {
            // Kind switch swaps the field set; reload the editor.
            state.fields.invalidate();
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let state = &mut app.gateway_form;
        let title = match (state.form.is_edit(), state.saving) {
            (_, true) => "Gateway (saving…)",
            (true, false) => "Edit gateway",
            (false, false) => "New gateway",
        };
        let block = th::block(theme, Some(title), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [search_area, fields_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(inner);
        let search_focused = state.focus == GatewayFormFocus::Search;
        let search_block = th::block(theme, Some("Address search (Ctrl+F)"), search_focused);
        let search_inner = search_block.inner(search_area);
        let query = if state.search.is_empty() && !search_focused {
            Line::from(Span::styled("Type an address and press Enter", theme.text_muted_style()))
        } else {
            Line::from(Span::styled(state.search.input(), theme.text_primary_style()))
        };
        frame.render_widget(Paragraph::new(query).block(search_block), search_area);
        if search_focused {
            frame.set_cursor_position(Position::new(search_inner.x + state.search.cursor_columns(), search_inner.y));
        }

        let fields = state.field_list();
        state
            .fields
            .render(frame, fields_area, theme, &fields, &state.form, !search_focused);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let theme = &*app.ctx.theme;
        if app.gateway_form.focus == GatewayFormFocus::Search {
            return th::build_hint_spans(theme, &[("Enter", " Search  "), ("Esc", " Back to fields  ")]);
        }
        th::build_hint_spans(
            theme,
            &[
                ("↑/↓", " Field  "),
                ("←/→", " Change  "),
                ("Ctrl+G", " Generate MAC  "),
                ("Ctrl+R", " Locate address  "),
                ("Ctrl+S", " Save  "),
                ("Esc", " Back  "),
            ],
        )
    }
}
