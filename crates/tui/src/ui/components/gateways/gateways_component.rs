//! Gateway list with marking, delete confirmation and simulator control.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Row, Table},
};
use simctl_engine::selection::{self, Subject};
use simctl_types::{ConfirmAction, Effect, Modal, Route, SimulatorAction, SimulatorStatus, UplinkStatus};
use tracing::info;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;
use crate::ui::utils::table_row_at;

#[derive(Debug, Default)]
pub struct GatewaysComponent {
    table_area: Rect,
}

impl GatewaysComponent {
    fn simulator_action(&self, app: &mut App, action: SimulatorAction) -> Vec<Effect> {
        let Some(row) = app.gateways.cursor_row() else {
            return Vec::new();
        };
        let Some(id) = row.id().map(str::to_string) else {
            return Vec::new();
        };
        if !app.gateways.row_state(&id).allows(action) {
            info!(gateway = %row.name, %action, "simulator action not applicable");
            return Vec::new();
        }
        vec![Effect::GatewaySimulator { gateway_id: id, action }]
    }

    fn edit(&self, app: &mut App) -> Vec<Effect> {
        let targets = app.gateways.targets();
        match selection::edit_target(Subject::Gateway, &targets) {
            Ok(id) => vec![Effect::LoadGateway(id.to_string())],
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn delete(&self, app: &mut App) -> Vec<Effect> {
        let targets = app.gateways.targets();
        match selection::delete_targets(Subject::Gateway, &targets) {
            Ok(ids) => vec![Effect::ShowModal(Modal::Confirm {
                message: selection::delete_confirmation(Subject::Gateway, ids.len()),
                action: ConfirmAction::DeleteGateways(ids),
            })],
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }
}

impl Component for GatewaysComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.gateways.loading = true;
        vec![Effect::LoadGateways]
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => app.gateways.table_state.select_previous(),
            KeyCode::Down => app.gateways.table_state.select_next(),
            KeyCode::Char(' ') => app.gateways.toggle_mark(),
            KeyCode::Char('a') => app.gateways.toggle_all(),
            KeyCode::Char('r') => {
                app.gateways.loading = true;
                return vec![Effect::LoadGateways];
            }
            KeyCode::Char('n') => {
                app.gateway_form.open_new();
                return vec![Effect::SwitchTo(Route::GatewayForm)];
            }
            KeyCode::Char('e') | KeyCode::Enter => return self.edit(app),
            KeyCode::Char('d') | KeyCode::Delete => return self.delete(app),
            KeyCode::Char('j') => return self.simulator_action(app, SimulatorAction::Join),
            KeyCode::Char('u') => return self.simulator_action(app, SimulatorAction::Unjoin),
            KeyCode::Char('s') => return self.simulator_action(app, SimulatorAction::StartUplink),
            KeyCode::Char('x') => return self.simulator_action(app, SimulatorAction::StopUplink),
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let offset = app.gateways.table_state.offset();
                if let Some(index) = table_row_at(self.table_area, mouse.row, 1, offset, app.gateways.rows.len()) {
                    app.gateways.table_state.select(Some(index));
                    // The check column toggles the mark.
                    if mouse.column < self.table_area.x + 4 {
                        app.gateways.toggle_mark();
                    }
                }
            }
            MouseEventKind::ScrollUp => app.gateways.table_state.select_previous(),
            MouseEventKind::ScrollDown => app.gateways.table_state.select_next(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let state = &app.gateways;
        let title = if state.loading {
            format!("Gateways ({}) loading…", state.rows.len())
        } else {
            format!("Gateways ({})", state.rows.len())
        };
        let block = th::block(theme, Some(&title), true);

        let header = Row::new(["", "Name", "MAC address", "Type", "Simulator", "Uplink", "Devices", "Location"])
            .style(th::table_header_row_style(theme));
        let rows = state.rows.iter().enumerate().map(|(index, gateway)| {
            let id = gateway.id().unwrap_or_default();
            let row_state = state.row_state(id);
            let simulator_style = match row_state.simulator {
                SimulatorStatus::Playing => theme.status_success(),
                SimulatorStatus::Paused => theme.text_muted_style(),
            };
            let uplink_style = match row_state.uplink {
                UplinkStatus::Running => theme.status_success(),
                UplinkStatus::Stopped => theme.text_muted_style(),
            };
            let location = if gateway.has_position() {
                format!("{:.4}, {:.4}", gateway.location.lat(), gateway.location.lon())
            } else {
                "-".to_string()
            };
            Row::new(vec![
                Cell::from(if state.marked.contains(id) { "[x]" } else { "[ ]" }),
                Cell::from(gateway.name.as_str()),
                Cell::from(gateway.mac_address.as_str()),
                Cell::from(gateway.kind().to_string()),
                Cell::from(Span::styled(row_state.simulator.as_str(), simulator_style)),
                Cell::from(Span::styled(row_state.uplink.as_str(), uplink_style)),
                Cell::from(gateway.device_count.unwrap_or_default().to_string()),
                Cell::from(location),
            ])
            .style(th::table_row_style(theme, index))
        });

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Fill(2),
                Constraint::Length(18),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(8),
                Constraint::Fill(2),
            ],
        )
        .header(header)
        .row_highlight_style(th::table_selected_style(theme))
        .block(block);

        let inner = th::block(theme, None, true).inner(rect);
        self.table_area = inner;
        if state.rows.is_empty() && !state.loading {
            let empty = Line::from(Span::styled("No gateways. Press N to add one.", theme.text_muted_style()));
            frame.render_widget(table, rect);
            frame.render_widget(empty, Rect { y: inner.y + 1, height: 1, ..inner });
            return;
        }
        let mut table_state = state.table_state.clone();
        frame.render_stateful_widget(table, rect, &mut table_state);
        app.gateways.table_state = table_state;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                ("Space", " Mark  "),
                ("A", " Mark all  "),
                ("N", " New  "),
                ("E", " Edit  "),
                ("D", " Delete  "),
                ("J/U", " Start/stop simulator  "),
                ("S/X", " Start/stop uplink  "),
                ("R", " Refresh  "),
            ],
        )
    }
}
