//! Dashboard: headline counts plus a connected/disconnected bar chart per
//! gateway.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph},
};
use simctl_types::Effect;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers as th;

#[derive(Debug, Default)]
pub struct DashboardComponent;

impl DashboardComponent {
    fn render_totals(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = &*app.ctx.theme;
        let totals = app.dashboard.totals();
        let cells = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(area);
        for ((label, value), cell) in totals.iter().zip(cells.iter()) {
            let block = th::block(theme, Some(label), false);
            let value = if app.dashboard.loading && app.dashboard.view.is_none() {
                "…".to_string()
            } else {
                value.to_string()
            };
            frame.render_widget(Paragraph::new(Span::styled(value, theme.accent_emphasis_style())).centered().block(block), *cell);
        }
    }

    fn render_chart(&self, frame: &mut Frame, area: Rect, app: &App) {
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Devices per gateway"), false);
        let per_gateway = app.dashboard.view.as_ref().map(|view| view.per_gateway.as_slice()).unwrap_or_default();
        if per_gateway.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(Paragraph::new(Span::styled("No gateways yet.", theme.text_muted_style())), inner);
            return;
        }

        let connected_style = Style::default().fg(theme.roles().success);
        let disconnected_style = Style::default().fg(theme.roles().error);
        let mut chart = BarChart::default().block(block).bar_width(5).bar_gap(1).group_gap(3);
        for counts in per_gateway {
            let group = BarGroup::default().label(Line::from(counts.name.as_str())).bars(&[
                Bar::default().value(u64::from(counts.connected)).style(connected_style),
                Bar::default().value(u64::from(counts.disconnected)).style(disconnected_style),
            ]);
            chart = chart.data(group);
        }
        frame.render_widget(chart, area);
    }
}

impl Component for DashboardComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        app.dashboard.loading = true;
        vec![Effect::LoadDashboard]
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Char('r') => {
                app.dashboard.loading = true;
                vec![Effect::LoadDashboard]
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        let theme = &*app.ctx.theme;
        let block = th::block(theme, Some("Dashboard"), true);
        let inner = block.inner(rect);
        frame.render_widget(block, rect);

        let [totals, legend, chart] = Layout::vertical([Constraint::Length(3), Constraint::Length(1), Constraint::Min(5)]).areas(inner);
        self.render_totals(frame, totals, app);
        let mut legend_spans = vec![
            Span::styled("■ connected  ", Style::default().fg(theme.roles().success)),
            Span::styled("■ disconnected", Style::default().fg(theme.roles().error)),
        ];
        if let Some(error) = app.dashboard.view.as_ref().and_then(|view| view.error.as_deref()) {
            legend_spans.push(Span::styled(format!("   {error}"), theme.status_error()));
        }
        frame.render_widget(Paragraph::new(Line::from(legend_spans)), legend);
        self.render_chart(frame, chart, app);
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'_>> {
        th::build_hint_spans(&*app.ctx.theme, &[("R", " Refresh  ")])
    }
}
