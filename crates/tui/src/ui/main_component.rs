use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use ratatui::widgets::Clear;
use ratatui::{
    prelude::*,
    style::Style,
    widgets::{Block, Paragraph},
};
use simctl_types::{Effect, Modal, Msg, Route};

use super::components::common::{AlertModal, ConfirmationModal};
use super::components::{
    BulkDevicesComponent, Component, DashboardComponent, DeviceLogsComponent, DeviceWizardComponent, DevicesComponent,
    GatewayBridgeComponent, GatewayFormComponent, GatewaysComponent, HelpComponent, LoginComponent, LogsComponent,
    VerticalNavBarComponent,
};
use super::theme::theme_helpers as th;
use super::utils::{centered_fixed, centered_rect};
use crate::app::{App, FocusArea};

pub struct ModalLayout(Box<dyn Fn(Rect) -> Rect>);

impl std::fmt::Debug for ModalLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModalLayout")
    }
}

type ModalView = (Box<dyn Component>, ModalLayout);

/// Terminals at least this wide show the logs beside the screen instead of below it.
const SIDE_LOGS_MIN_WIDTH: u16 = 141;

#[derive(Default)]
pub struct MainView {
    /// Current main view component
    pub content_view: Option<Box<dyn Component>>,
    /// Main view for the nav bar
    pub nav_bar_view: VerticalNavBarComponent,
    /// Currently open modal component
    pub modal_view: Option<ModalView>,
    /// Currently open logs view component
    pub logs_view: LogsComponent,
}

impl MainView {
    pub fn new() -> Self {
        Self {
            content_view: None,
            nav_bar_view: VerticalNavBarComponent::new(),
            modal_view: None,
            logs_view: LogsComponent::default(),
        }
    }

    /// Swap the main view for `route`. Not meant to be called directly; use
    /// `Effect::SwitchTo` so the enter/exit hooks run.
    ///
    /// Screens other than Login fall back to Login while no session exists.
    pub fn set_current_route(&mut self, app: &mut App, route: Route) {
        let route = app.resolve_route(route);
        let view: Box<dyn Component> = match route {
            Route::Login => Box::new(LoginComponent),
            Route::Dashboard => Box::new(DashboardComponent),
            Route::Gateways => Box::new(GatewaysComponent::default()),
            Route::GatewayForm => Box::new(GatewayFormComponent::default()),
            Route::Devices => Box::new(DevicesComponent::default()),
            Route::DeviceWizard => Box::new(DeviceWizardComponent::default()),
            Route::BulkDevices => Box::new(BulkDevicesComponent::default()),
            Route::DeviceLogs => Box::new(DeviceLogsComponent::default()),
            Route::GatewayBridge => Box::new(GatewayBridgeComponent),
        };

        app.route = route;
        app.nav_bar.set_route(route);
        app.focus = FocusArea::Content;
        self.content_view = Some(view);
    }

    /// Update the open modal (use None to clear).
    pub fn set_open_modal_kind(&mut self, app: &mut App, modal: Option<Modal>) {
        self.modal_view = modal.map(|modal| -> ModalView {
            match modal {
                Modal::Alert { message, is_error } => (
                    Box::new(AlertModal::new(message, is_error)),
                    ModalLayout(Box::new(|rect| centered_fixed(60, 10, rect))),
                ),
                Modal::Confirm { message, action } => (
                    Box::new(ConfirmationModal::new(message, action)),
                    ModalLayout(Box::new(|rect| centered_fixed(60, 11, rect))),
                ),
                Modal::Help => (
                    Box::new(HelpComponent),
                    ModalLayout(Box::new(|rect| centered_rect(70, 70, rect))),
                ),
            }
        });
        if self.modal_view.is_none() && app.focus == FocusArea::Logs && !app.logs.visible {
            app.focus = FocusArea::Content;
        }
    }

    fn shows_nav_bar(app: &App) -> bool {
        app.route != Route::Login
    }

    /// Move focus NavBar -> Content -> Logs, skipping hidden panes.
    fn cycle_focus(app: &mut App) {
        let order = [FocusArea::NavBar, FocusArea::Content, FocusArea::Logs];
        let current = order.iter().position(|area| *area == app.focus).unwrap_or(1);
        for step in 1..=order.len() {
            let candidate = order[(current + step) % order.len()];
            let available = match candidate {
                FocusArea::NavBar => Self::shows_nav_bar(app),
                FocusArea::Content => true,
                FocusArea::Logs => app.logs.visible,
            };
            if available {
                app.focus = candidate;
                return;
            }
        }
    }

    fn get_preferred_layout(&self, app: &App, area: Rect) -> Vec<Rect> {
        let nav_width = if Self::shows_nav_bar(app) { 9 } else { 0 };
        let outer_areas = Layout::horizontal([
            Constraint::Length(nav_width), // Nav bar width
            Constraint::Min(1),            // Wrapper
        ])
        .split(area);
        // Split the wrapper area into 2 areas for the main view
        // and hints stacked vertically.
        let content_areas = Layout::vertical([
            Constraint::Percentage(100), // Main view
            Constraint::Min(1),          // Hints area
        ])
        .split(outer_areas[1]);

        let main_view_areas = if content_areas[0].width >= SIDE_LOGS_MIN_WIDTH {
            let constraints = if app.logs.visible {
                [Constraint::Percentage(75), Constraint::Fill(1)]
            } else {
                [Constraint::Percentage(100), Constraint::Length(0)]
            };
            Layout::horizontal(constraints).split(content_areas[0])
        } else {
            // Smaller screens stack the logs below the screen.
            let constraints = if app.logs.visible {
                [Constraint::Percentage(80), Constraint::Fill(1)]
            } else {
                [Constraint::Percentage(100), Constraint::Length(0)]
            };
            Layout::vertical(constraints).split(content_areas[0])
        };

        vec![
            outer_areas[0],     // navigation
            content_areas[1],   // Hints bar
            main_view_areas[0], // Main view
            main_view_areas[1], // Logs (if open)
        ]
    }

    /// Text inputs own printable keys on these screens, so `?` is typed rather
    /// than opening help.
    fn captures_text(app: &App) -> bool {
        (app.focus == FocusArea::Content
            && matches!(app.route, Route::Login | Route::GatewayForm | Route::DeviceWizard | Route::BulkDevices))
            || (app.focus == FocusArea::Logs && app.logs.search_active)
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        let mut effects = app.update(&msg);

        // The screen keeps receiving messages while a modal is open so that
        // resizes still reach it.
        if let Some((modal, _)) = self.modal_view.as_mut() {
            effects.extend(modal.handle_message(app, msg.clone()));
        }
        if let Some(content) = self.content_view.as_mut() {
            effects.extend(content.handle_message(app, msg));
        }

        effects
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if let Some(target) = self.modal_view.as_mut() {
            return target.0.handle_key_events(app, key);
        }

        if key.code == KeyCode::Char('l') && key.modifiers.contains(KeyModifiers::CONTROL) {
            app.logs.visible = !app.logs.visible;
            if !app.logs.visible && app.focus == FocusArea::Logs {
                app.focus = FocusArea::Content;
            }
            return Vec::new();
        }

        if key.code == KeyCode::F(6) {
            Self::cycle_focus(app);
            return Vec::new();
        }

        if key.code == KeyCode::F(1) || (key.code == KeyCode::Char('?') && !Self::captures_text(app)) {
            return vec![Effect::ShowModal(Modal::Help)];
        }

        match app.focus {
            FocusArea::NavBar if Self::shows_nav_bar(app) => self.nav_bar_view.handle_key_events(app, key),
            FocusArea::Logs if app.logs.visible => self.logs_view.handle_key_events(app, key),
            _ => self
                .content_view
                .as_mut()
                .map(|content| content.handle_key_events(app, key))
                .unwrap_or_default(),
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if let Some(target) = self.modal_view.as_mut() {
            return target.0.handle_mouse_events(app, mouse);
        }

        let mut effects = Vec::new();
        if Self::shows_nav_bar(app) {
            effects.extend(self.nav_bar_view.handle_mouse_events(app, mouse));
        }
        effects.extend(
            self.content_view
                .as_mut()
                .map(|content| content.handle_mouse_events(app, mouse))
                .unwrap_or_default(),
        );
        if app.logs.visible {
            effects.extend(self.logs_view.handle_mouse_events(app, mouse));
        }
        effects
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &mut App) {
        // Fill the entire background with the theme's background color for consistency
        let bg_fill = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(bg_fill, area);

        let layout = self.get_preferred_layout(app, area);
        if Self::shows_nav_bar(app) {
            self.nav_bar_view.render(frame, layout[0], app);
        }
        if let Some(current) = self.content_view.as_mut() {
            current.render(frame, layout[2], app);
        }
        if app.logs.visible {
            self.logs_view.render(frame, layout[3], app);
        }

        let hint_spans: Vec<Span> = self.get_hint_spans(app);
        let hints_widget = Paragraph::new(Line::from(hint_spans)).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints_widget, layout[1]);

        if let Some((modal, position)) = self.modal_view.as_mut() {
            render_overlay(frame, app);
            let modal_area = position.0(area);
            frame.render_widget(Clear, modal_area);

            let modal_hints = modal.get_hint_spans(app);
            if modal_hints.is_empty() {
                modal.render(frame, modal_area, app);
            } else {
                let splits = Layout::vertical([
                    Constraint::Percentage(100), // Modal body
                    Constraint::Length(1),       // Modal hints bar
                ])
                .split(modal_area);
                let hints_widget = Paragraph::new(Line::from(modal_hints))
                    .style(app.ctx.theme.text_muted_style())
                    .bg(app.ctx.theme.roles().background);
                frame.render_widget(hints_widget, splits[1]);
                modal.render(frame, splits[0], app);
            }
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let mut hint_spans: Vec<Span> = Vec::new();
        if app.executing {
            hint_spans.push(Span::styled(format!("{} ", app.throbber()), app.ctx.theme.accent_emphasis_style()));
        }
        hint_spans.push(Span::styled("Hints: ", app.ctx.theme.text_muted_style()));

        match app.focus {
            FocusArea::NavBar if Self::shows_nav_bar(app) => hint_spans.extend(self.nav_bar_view.get_hint_spans(app)),
            FocusArea::Logs if app.logs.visible => hint_spans.extend(self.logs_view.get_hint_spans(app)),
            _ => {
                if let Some(content) = self.content_view.as_ref() {
                    hint_spans.extend(content.get_hint_spans(app));
                }
            }
        }

        hint_spans.extend(th::build_hint_spans(
            &*app.ctx.theme,
            &[("F1", " Help  "), ("F6", " Focus  "), ("Ctrl+L", " Toggle logs ")],
        ));
        hint_spans
    }
}

/// Dims everything behind an open modal.
fn render_overlay(frame: &mut Frame, app: &mut App) {
    frame.render_widget(Block::default().style(app.ctx.theme.modal_background_style()).dim(), frame.area());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{Terminal, backend::TestBackend};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn renders_every_screen_without_panicking() {
        let mut app = test_app();
        let mut main_view = MainView::new();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::Gateways,
            Route::GatewayForm,
            Route::Devices,
            Route::BulkDevices,
            Route::DeviceLogs,
            Route::GatewayBridge,
        ] {
            main_view.set_current_route(&mut app, route);
            terminal.draw(|frame| main_view.render(frame, frame.area(), &mut app)).unwrap();
        }

        app.open_wizard(simctl_types::DeviceKind::Scte283);
        main_view.set_current_route(&mut app, Route::DeviceWizard);
        terminal.draw(|frame| main_view.render(frame, frame.area(), &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("Hints: "));
    }

    #[test]
    fn help_opens_from_list_screens_only() {
        let mut app = test_app();
        let mut main_view = MainView::new();
        main_view.set_current_route(&mut app, Route::Devices);
        assert_eq!(
            main_view.handle_key_events(&mut app, key(KeyCode::Char('?'))),
            vec![Effect::ShowModal(Modal::Help)]
        );

        main_view.set_current_route(&mut app, Route::GatewayForm);
        assert!(main_view.handle_key_events(&mut app, key(KeyCode::Char('?'))).is_empty());
        assert_eq!(
            main_view.handle_key_events(&mut app, key(KeyCode::F(1))),
            vec![Effect::ShowModal(Modal::Help)]
        );
    }

    #[test]
    fn open_modal_takes_the_keys() {
        let mut app = test_app();
        let mut main_view = MainView::new();
        main_view.set_current_route(&mut app, Route::Devices);
        main_view.set_open_modal_kind(&mut app, Some(Modal::error("Failed")));
        assert_eq!(main_view.handle_key_events(&mut app, key(KeyCode::Esc)), vec![Effect::CloseModal]);

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| main_view.render(frame, frame.area(), &mut app)).unwrap();
        assert!(screen_text(&terminal).contains("Failed"));
    }

    #[test]
    fn focus_cycle_skips_hidden_logs() {
        let mut app = test_app();
        let mut main_view = MainView::new();
        main_view.set_current_route(&mut app, Route::Dashboard);
        main_view.handle_key_events(&mut app, KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(!app.logs.visible);

        main_view.handle_key_events(&mut app, key(KeyCode::F(6)));
        assert_eq!(app.focus, FocusArea::NavBar);
        main_view.handle_key_events(&mut app, key(KeyCode::F(6)));
        assert_eq!(app.focus, FocusArea::Content);
    }
}
