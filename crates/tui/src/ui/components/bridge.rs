//! Read-only view of the network server bridge the gateways forward to.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    text::Span,
    widgets::{Cell, Row, Table},
};
use simctl_types::{Effect, GatewayBridgeConfig};

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct BridgeState {
    pub config: Option<GatewayBridgeConfig>,
    pub error: Option<String>,
    pub loading: bool,
}

impl BridgeState {
    pub fn apply(&mut self, result: Result<GatewayBridgeConfig, String>) {
        self.loading = false;
        match result {
            Ok(config) => {
                self.config = Some(config);
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
    }

    /// `address:port`, as gateways are configured with it.
    pub fn endpoint(&self) -> Option<String> {
        let config = self.config.as_ref()?;
        if config.address.is_empty() {
            return None;
        }
        Some(if config.port.is_empty() {
            config.address.clone()
        } else {
            format!("{}:{}", config.address, config.port)
        })
    }
}

#[derive(Debug, Default)]
pub struct GatewayBridgeComponent;

impl Component for GatewayBridgeComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.bridge.loading = true;
        vec![Effect::LoadBridge]
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('r') => {
                app.bridge.loading = true;
                vec![Effect::LoadBridge]
            }
            KeyCode::Char('c') => app.bridge.endpoint().map(Effect::CopyToClipboardRequested).into_iter().collect(),
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let state = &app.bridge;
        let title = if state.loading { "Gateway bridge (loading…)" } else { "Gateway bridge" };
        let block = th::block(theme, Some(title), true);

        let value_style = theme.text_primary_style();
        let (address, port) = state
            .config
            .as_ref()
            .map(|config| (config.address.as_str(), config.port.as_str()))
            .unwrap_or(("-", "-"));
        let mut rows = vec![
            Row::new(vec![
                Cell::from(Span::styled("Address", theme.text_secondary_style())),
                Cell::from(Span::styled(address, value_style)),
            ]),
            Row::new(vec![
                Cell::from(Span::styled("Port", theme.text_secondary_style())),
                Cell::from(Span::styled(port, value_style)),
            ]),
        ];
        if let Some(error) = &state.error {
            rows.push(Row::new(vec![
                Cell::from(Span::styled("Error", theme.status_error())),
                Cell::from(Span::styled(error.as_str(), theme.status_error())),
            ]));
        }
        let table = Table::new(rows, [Constraint::Length(12), Constraint::Fill(1)]).block(block);
        frame.render_widget(table, rect);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[("C", " Copy address  "), ("R", " Refresh  ")])
    }
}
