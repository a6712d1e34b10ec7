use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use simctl_types::{Effect, Modal, Route};

use super::state::bulk_fields;
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::common::FormCtx;
use crate::ui::theme::theme_helpers as th;

/// Creates many devices against one gateway in a single request.
#[derive(Debug, Default)]
pub struct BulkDevicesComponent;

impl Component for BulkDevicesComponent {
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        vec![Effect::LoadWizardGateways]
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if key.code == KeyCode::Esc {
            return vec![Effect::SwitchTo(Route::Devices)];
        }
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            if app.bulk.submitting {
                return Vec::new();
            }
            return match app.bulk.form.to_request() {
                Ok(request) => {
                    app.bulk.submitting = true;
                    vec![Effect::CreateBulkDevices(request)]
                }
                Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
            };
        }

        let fields = bulk_fields();
        let state = &mut app.bulk;
        let ctx = FormCtx { gateways: &state.gateways };
        state.fields.handle_key(&fields, &mut state.form, &ctx, key);
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let state = &mut app.bulk;
        let title = if state.submitting { "Bulk create (submitting…)" } else { "Bulk create" };
        let block = th::block(theme, Some(title), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [intro_area, fields_area] = Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(inner);
        let intro = if state.gateways.is_empty() {
            Line::from(Span::styled("Loading gateways…", theme.text_muted_style()))
        } else {
            Line::from(Span::styled(
                "All devices are attached to the selected gateway and region.",
                theme.text_muted_style(),
            ))
        };
        frame.render_widget(Paragraph::new(intro), intro_area);

        let fields = bulk_fields();
        state.fields.render(frame, fields_area, theme, &fields, &state.form, true);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[("↑/↓", " Field  "), ("←/→", " Change  "), ("Ctrl+S", " Create  "), ("Esc", " Back  ")],
        )
    }
}
