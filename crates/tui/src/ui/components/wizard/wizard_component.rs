//! Device wizard screen.
//!
//! Sections run down a tab row (F2/F3/F4), sub-tabs along a second row
//! (Ctrl+←/→). PgDn walks forward through the General gate, PgUp walks back.
//! The Location tab adds a world map (F5 to steer it, or click to place the
//! device) and an address search box (Ctrl+F).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    text::{Line, Span},
    widgets::Paragraph,
};
use simctl_engine::wizard::{Section, SubTab};
use simctl_engine::{Advance, SubmitError};
use simctl_types::{Effect, Modal, Msg, Route, SubmitIntent};
use tracing::info;

use super::map::{coordinates_at, render_map};
use super::state::{WizardFocus, WizardScreen};
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::common::FormCtx;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct DeviceWizardComponent {
    map_area: Rect,
}

impl DeviceWizardComponent {
    fn submit(screen: &mut WizardScreen, intent: SubmitIntent) -> Vec<Effect> {
        match screen.submit(intent) {
            Ok(submission) => vec![Effect::SubmitDevice {
                ticket: screen.machine.ticket(),
                submission,
            }],
            Err(SubmitError::InFlight) => {
                info!("save ignored while a submission is in flight");
                Vec::new()
            }
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn reverse_geocode(screen: &WizardScreen) -> Effect {
        let (latitude, longitude) = screen.draft.coordinates();
        Effect::ReverseGeocode { latitude, longitude }
    }

    fn handle_map_keys(screen: &mut WizardScreen, key: KeyEvent) -> Vec<Effect> {
        let (latitude, longitude) = screen.draft.coordinates();
        let Some(view) = screen.wizard.map_mut().view_mut() else {
            screen.focus = WizardFocus::Fields;
            return Vec::new();
        };
        let step = view.pan_step();
        match key.code {
            KeyCode::Char('+') | KeyCode::Char('=') => view.zoom_in(),
            KeyCode::Char('-') => view.zoom_out(),
            KeyCode::Up => screen.set_coordinates(latitude + step, longitude),
            KeyCode::Down => screen.set_coordinates(latitude - step, longitude),
            KeyCode::Left => screen.set_coordinates(latitude, longitude - step),
            KeyCode::Right => screen.set_coordinates(latitude, longitude + step),
            KeyCode::Enter => return vec![Self::reverse_geocode(screen)],
            KeyCode::Esc | KeyCode::F(5) => screen.focus = WizardFocus::Fields,
            _ => {}
        }
        Vec::new()
    }

    fn handle_search_keys(screen: &mut WizardScreen, key: KeyEvent) -> Vec<Effect> {
        let search = &mut screen.search;
        match key.code {
            KeyCode::Esc => screen.focus = WizardFocus::Fields,
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

    /// Keys that work in every part of the wizard.
    fn handle_wizard_keys(screen: &mut WizardScreen, key: KeyEvent) -> Option<Vec<Effect>> {
        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        let effects = match key.code {
            KeyCode::Char('s') if control => Self::submit(screen, SubmitIntent::Close),
            KeyCode::Char('n') if control => Self::submit(screen, SubmitIntent::New),
            KeyCode::Char('r') if control => {
                screen.form.reveal_secrets = !screen.form.reveal_secrets;
                Vec::new()
            }
            KeyCode::PageDown => match screen.advance() {
                Ok(Advance::Moved { .. } | Advance::Terminal) => Vec::new(),
                Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
            },
            KeyCode::PageUp => {
                screen.retreat();
                Vec::new()
            }
            KeyCode::F(2) => Self::section(screen, Section::General),
            KeyCode::F(3) => Self::section(screen, Section::Lorawan),
            KeyCode::F(4) => Self::section(screen, Section::Scte283),
            KeyCode::Right if control => {
                screen.cycle_sub_tab(true);
                Vec::new()
            }
            KeyCode::Left if control => {
                screen.cycle_sub_tab(false);
                Vec::new()
            }
            KeyCode::F(5) if screen.sub_tab() == SubTab::Location => {
                screen.wizard.map_mut().ensure_constructed();
                screen.focus = match screen.focus {
                    WizardFocus::Map => WizardFocus::Fields,
                    _ => WizardFocus::Map,
                };
                Vec::new()
            }
            KeyCode::Char('f') if control && screen.sub_tab() == SubTab::Location => {
                screen.focus = WizardFocus::Search;
                Vec::new()
            }
            _ => return None,
        };
        Some(effects)
    }

    fn section(screen: &mut WizardScreen, section: Section) -> Vec<Effect> {
        match screen.activate_section(section) {
            Ok(()) => Vec::new(),
            Err(error) => vec![Effect::ShowModal(Modal::error(error.to_string()))],
        }
    }

    fn render_tabs(frame: &mut Frame, area: Rect, app: &App, screen: &WizardScreen) {
        let theme = &*app.ctx.theme;
        let [sections_area, sub_tabs_area] = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(area);
        let sections = screen.wizard.sections();
        let section_titles = sections
            .iter()
            .zip(["F2", "F3", "F4"])
            .map(|(section, key)| Span::raw(format!("{key} {}", section.title())))
            .collect();
        let active_section = sections
            .iter()
            .position(|section| *section == screen.wizard.active_section())
            .unwrap_or_default();
        frame.render_widget(th::tabs(theme, section_titles, active_section), sections_area);

        let sequence = screen.wizard.active_section().sequence();
        let sub_titles = sequence.iter().map(|tab| Span::raw(tab.title())).collect();
        let active_tab = sequence.iter().position(|tab| *tab == screen.sub_tab()).unwrap_or_default();
        frame.render_widget(th::tabs(theme, sub_titles, active_tab), sub_tabs_area);
    }
}

impl Component for DeviceWizardComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        if app.wizard.is_none() {
            return vec![Effect::SwitchTo(Route::Devices)];
        }
        vec![Effect::LoadWizardGateways]
    }

    fn on_route_exit(&mut self, app: &mut App) -> Vec<Effect> {
        app.wizard = None;
        Vec::new()
    }

    fn handle_message(&mut self, app: &mut App, msg: Msg) -> Vec<Effect> {
        if let (Msg::Resize(..), Some(screen)) = (msg, app.wizard.as_mut()) {
            screen.wizard.map_mut().invalidate();
        }
        Vec::new()
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(screen) = app.wizard.as_mut() else {
            return Vec::new();
        };
        if let Some(effects) = Self::handle_wizard_keys(screen, key) {
            return effects;
        }
        match screen.focus {
            WizardFocus::Map => return Self::handle_map_keys(screen, key),
            WizardFocus::Search => return Self::handle_search_keys(screen, key),
            WizardFocus::Fields => {}
        }

        let control = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return vec![Effect::SwitchTo(Route::Devices)],
            KeyCode::Char('a') if control && screen.sub_tab() == SubTab::System => {
                screen.add_sensor();
                return Vec::new();
            }
            KeyCode::Char('d') if control && screen.sub_tab() == SubTab::System => {
                screen.remove_focused_sensor();
                return Vec::new();
            }
            _ => {}
        }

        let fields = screen.fields();
        let ctx = FormCtx { gateways: &screen.gateways };
        screen.form.handle_key(&fields, &mut screen.draft, &ctx, key);
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let Some(screen) = app.wizard.as_mut() else {
            return Vec::new();
        };
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) || screen.sub_tab() != SubTab::Location {
            return Vec::new();
        }
        let (latitude, longitude) = screen.draft.coordinates();
        let Some(view) = screen.wizard.map().view() else {
            return Vec::new();
        };
        let Some((latitude, longitude)) = coordinates_at(self.map_area, view, latitude, longitude, mouse.column, mouse.row) else {
            return Vec::new();
        };
        screen.set_coordinates(latitude, longitude);
        screen.focus = WizardFocus::Map;
        vec![Self::reverse_geocode(screen)]
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let Some(mut screen) = app.wizard.take() else {
            return;
        };
        let theme = &*app.ctx.theme;
        let kind = screen.draft.kind.label();
        let title = match (screen.is_edit(), screen.machine.is_in_flight()) {
            (_, true) => format!("{kind} device (saving…)"),
            (true, false) => format!("Edit {kind} device"),
            (false, false) => format!("New {kind} device"),
        };
        let block = th::block(theme, Some(&title), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [tabs_area, body_area, status_area] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(1), Constraint::Length(1)]).areas(inner);
        Self::render_tabs(frame, tabs_area, app, &screen);

        let fields = screen.fields();
        let fields_focused = screen.focus == WizardFocus::Fields;
        if screen.sub_tab() == SubTab::Location {
            let [left, map_area] = Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(body_area);
            let [search_area, fields_area] = Layout::vertical([Constraint::Length(3), Constraint::Min(1)]).areas(left);
            let search_focused = screen.focus == WizardFocus::Search;
            let search_block = th::block(theme, Some("Address search (Ctrl+F)"), search_focused);
            let search_inner = search_block.inner(search_area);
            let query = Line::from(Span::styled(screen.search.input(), theme.text_primary_style()));
            frame.render_widget(Paragraph::new(query).block(search_block), search_area);
            if search_focused {
                frame.set_cursor_position(Position::new(search_inner.x + screen.search.cursor_columns(), search_inner.y));
            }
            screen.form.render(frame, fields_area, theme, &fields, &screen.draft, fields_focused);

            let (latitude, longitude) = screen.draft.coordinates();
            let map_focused = screen.focus == WizardFocus::Map;
            let view = screen.wizard.map_mut().ensure_constructed();
            self.map_area = render_map(frame, map_area, theme, view, latitude, longitude, map_focused);
        } else {
            self.map_area = Rect::default();
            screen.form.render(frame, body_area, theme, &fields, &screen.draft, fields_focused);
        }

        let status = if screen.gateways.is_empty() {
            Span::styled("Loading gateways…", theme.text_muted_style())
        } else if screen.wizard.is_terminal() {
            Span::styled("Last tab. Ctrl+S saves the device.", theme.text_muted_style())
        } else {
            Span::styled("PgDn for the next tab.", theme.text_muted_style())
        };
        frame.render_widget(Paragraph::new(Line::from(status)), status_area);
        app.wizard = Some(screen);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        let theme = &*app.ctx.theme;
        let Some(screen) = app.wizard.as_ref() else {
            return Vec::new();
        };
        match screen.focus {
            WizardFocus::Map => th::build_hint_spans(
                theme,
                &[("←↑↓→", " Move marker  "), ("+/-", " Zoom  "), ("Enter", " Look up address  "), ("Esc", " Back  ")],
            ),
            WizardFocus::Search => th::build_hint_spans(theme, &[("Enter", " Search  "), ("Esc", " Back  ")]),
            WizardFocus::Fields => {
                let mut spans = th::build_hint_spans(
                    theme,
                    &[
                        ("PgDn/PgUp", " Next/prev tab  "),
                        ("F2-F4", " Section  "),
                        ("Ctrl+←/→", " Sub-tab  "),
                        ("Ctrl+S", " Save  "),
                        ("Ctrl+N", " Save & new  "),
                        ("Ctrl+R", " Show secrets  "),
                    ],
                );
                match screen.sub_tab() {
                    SubTab::Location => spans.extend(th::build_hint_spans(theme, &[("F5", " Map  "), ("Ctrl+F", " Search  ")])),
                    SubTab::System => spans.extend(th::build_hint_spans(theme, &[("Ctrl+A/D", " Add/remove sensor  ")])),
                    _ => {}
                }
                spans
            }
        }
    }
}
