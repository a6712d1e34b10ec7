//! Device list: marking, simulator control, delete, and the entry points to
//! the wizard, bulk creation and the log viewer.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Cell, Row, Table},
};
use simctl_engine::selection::{self, Subject};
use simctl_types::{ConfirmAction, DeviceKind, Effect, Modal, Route, SimulatorAction, SimulatorStatus, UplinkStatus};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;
use crate::ui::utils::table_row_at;

#[derive(Debug, Default)]
pub struct DevicesComponent {
    table_area: Rect,
}

impl DevicesComponent {
    fn simulator_action(&self, app: &mut App, action: SimulatorAction) -> Vec<Effect> {
        match selection::check_device_action(action, &app.devices.selected_rows()) {
            Ok(dev_euis) => vec![Effect::DeviceSimulator { dev_euis, action }],
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn edit(&self, app: &mut App) -> Vec<Effect> {
        let targets = app.devices.targets();
        match selection::edit_target(Subject::Device, &targets) {
            Ok(dev_eui) => vec![Effect::EditDevice(dev_eui.to_string())],
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn delete(&self, app: &mut App) -> Vec<Effect> {
        let targets = app.devices.targets();
        match selection::delete_targets(Subject::Device, &targets) {
            Ok(dev_euis) => vec![Effect::ShowModal(Modal::Confirm {
                message: selection::delete_confirmation(Subject::Device, dev_euis.len()),
                action: ConfirmAction::DeleteDevices(dev_euis),
            })],
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn open_logs(&self, app: &mut App) -> Vec<Effect> {
        let Some((dev_eui, name)) = app.devices.cursor_row().map(|row| (row.dev_eui.clone(), row.name.clone())) else {
            return Vec::new();
        };
        app.device_logs.open(&dev_eui, &name);
        vec![Effect::SwitchTo(Route::DeviceLogs)]
    }
}

impl Component for DevicesComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.devices.loading = true;
        vec![Effect::LoadDevices]
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Up => app.devices.table_state.select_previous(),
            KeyCode::Down => app.devices.table_state.select_next(),
            KeyCode::Char(' ') => app.devices.toggle_mark(),
            KeyCode::Char('a') => app.devices.toggle_all(),
            KeyCode::Char('r') => {
                app.devices.loading = true;
                return vec![Effect::LoadDevices];
            }
            KeyCode::Char('n') => {
                app.open_wizard(DeviceKind::Lorawan);
                return vec![Effect::SwitchTo(Route::DeviceWizard)];
            }
            KeyCode::Char('N') => {
                app.open_wizard(DeviceKind::Scte283);
                return vec![Effect::SwitchTo(Route::DeviceWizard)];
            }
            KeyCode::Char('b') => {
                let region = app.ctx.session.default_region();
                app.bulk.open(region);
                return vec![Effect::SwitchTo(Route::BulkDevices)];
            }
            KeyCode::Char('l') => return self.open_logs(app),
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
                let offset = app.devices.table_state.offset();
                if let Some(index) = table_row_at(self.table_area, mouse.row, 1, offset, app.devices.rows.len()) {
                    app.devices.table_state.select(Some(index));
                    if mouse.column < self.table_area.x + 4 {
                        app.devices.toggle_mark();
                    }
                }
            }
            MouseEventKind::ScrollUp => app.devices.table_state.select_previous(),
            MouseEventKind::ScrollDown => app.devices.table_state.select_next(),
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let state = &app.devices;
        let title = match (state.loading, state.marked.len()) {
            (true, _) => format!("Devices ({}) loading…", state.rows.len()),
            (false, 0) => format!("Devices ({})", state.rows.len()),
            (false, marked) => format!("Devices ({}, {marked} marked)", state.rows.len()),
        };
        let block = th::block(theme, Some(&title), true);
        let inner = th::block(theme, None, true).inner(rect);
        self.table_area = inner;

        let header = Row::new(["", "Name", "DevEUI", "Gateway", "Simulator", "Uplink"]).style(th::table_header_row_style(theme));
        let rows = state.rows.iter().enumerate().map(|(index, device)| {
            let simulator_style = match device.simulator_status() {
                SimulatorStatus::Playing => theme.status_success(),
                SimulatorStatus::Paused => theme.text_muted_style(),
            };
            let uplink_style = match device.uplink_status() {
                UplinkStatus::Running => theme.status_success(),
                UplinkStatus::Stopped => theme.text_muted_style(),
            };
            Row::new(vec![
                Cell::from(if state.marked.contains(&device.dev_eui) { "[x]" } else { "[ ]" }),
                Cell::from(device.name.as_str()),
                Cell::from(device.dev_eui.as_str()),
                Cell::from(device.gateway.as_str()),
                Cell::from(Span::styled(device.simulator_status().as_str(), simulator_style)),
                Cell::from(Span::styled(device.uplink_status().as_str(), uplink_style)),
            ])
            .style(th::table_row_style(theme, index))
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Fill(2),
                Constraint::Length(18),
                Constraint::Fill(1),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(header)
        .row_highlight_style(th::table_selected_style(theme))
        .block(block);

        if state.rows.is_empty() && !state.loading {
            frame.render_widget(table, rect);
            let empty = Line::from(Span::styled(
                "No devices. Press N for a LoRaWAN device, Shift+N for an amplifier, B for bulk.",
                theme.text_muted_style(),
            ));
            frame.render_widget(empty, Rect { y: inner.y + 1, height: 1, ..inner });
            return;
        }
        let mut table_state = state.table_state.clone();
        frame.render_stateful_widget(table, rect, &mut table_state);
        app.devices.table_state = table_state;
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(
            &*app.ctx.theme,
            &[
                ("Space", " Mark  "),
                ("N/Shift+N", " New LoRaWAN/amplifier  "),
                ("B", " Bulk  "),
                ("E", " Edit  "),
                ("D", " Delete  "),
                ("L", " Logs  "),
                ("J/U", " Join/unjoin  "),
                ("S/X", " Start/stop uplink  "),
                ("R", " Refresh  "),
            ],
        )
    }
}
