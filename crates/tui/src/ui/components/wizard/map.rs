//! World map for the wizard's Location tab.

use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Map, MapResolution},
};
use simctl_engine::MapView;
use tracing::debug;

use crate::ui::theme::{Theme, theme_helpers as th};

/// Draw the map centred on the device with a marker on its position and
/// return the inner area used for hit testing.
pub fn render_map(frame: &mut Frame, area: Rect, theme: &dyn Theme, view: &mut MapView, latitude: f64, longitude: f64, focused: bool) -> Rect {
    if view.take_layout() {
        debug!(width = area.width, height = area.height, zoom = view.zoom, "laying out location map");
    }
    let title = format!("Map (zoom {:.0})", view.zoom);
    let block = th::block(theme, Some(&title), focused);
    let inner = block.inner(area);
    let (x_bounds, y_bounds) = view.viewport(latitude, longitude);
    let land = theme.roles().map_land;
    let marker_style = Style::default().fg(theme.roles().map_marker);
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: land,
                resolution: MapResolution::High,
            });
            ctx.layer();
            ctx.print(longitude, latitude, Span::styled("◉", marker_style));
        });
    frame.render_widget(canvas, area);
    frame.render_widget(
        Span::styled(format!(" {latitude:.6}, {longitude:.6} "), Style::default().fg(theme.roles().text_secondary)),
        Rect {
            y: area.bottom().saturating_sub(1),
            x: area.x + 2,
            width: area.width.saturating_sub(4),
            height: 1,
        },
    );
    inner
}

/// Coordinates under a terminal cell of the map drawn in `inner`, or `None`
/// when the cell is outside it.
pub fn coordinates_at(inner: Rect, view: &MapView, latitude: f64, longitude: f64, column: u16, row: u16) -> Option<(f64, f64)> {
    if inner.width == 0 || inner.height == 0 || !inner.contains(Position::new(column, row)) {
        return None;
    }
    let ([lon_min, lon_max], [lat_min, lat_max]) = view.viewport(latitude, longitude);
    let x = (f64::from(column - inner.x) + 0.5) / f64::from(inner.width);
    let y = (f64::from(row - inner.y) + 0.5) / f64::from(inner.height);
    Some((lat_max - y * (lat_max - lat_min), lon_min + x * (lon_max - lon_min)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_engine::wizard::MapSlot;

    #[test]
    fn centre_cell_maps_back_to_the_centre() {
        let mut slot = MapSlot::default();
        let view = slot.ensure_constructed();
        let inner = Rect::new(10, 5, 41, 21);
        let (lat, lon) = coordinates_at(inner, view, 10.0, 20.0, 30, 15).unwrap();
        assert!((lat - 10.0).abs() < 1e-9);
        assert!((lon - 20.0).abs() < 1e-9);
        assert!(coordinates_at(inner, view, 10.0, 20.0, 0, 0).is_none());
    }

    #[test]
    fn north_is_up() {
        let mut slot = MapSlot::default();
        let view = slot.ensure_constructed();
        let inner = Rect::new(0, 0, 40, 20);
        let (top, _) = coordinates_at(inner, view, 0.0, 0.0, 20, 0).unwrap();
        let (bottom, _) = coordinates_at(inner, view, 0.0, 0.0, 20, 19).unwrap();
        assert!(top > bottom);
    }

    #[test]
    fn marker_uses_the_map_marker_role() {
        use crate::ui::theme::NordTheme;
        use ratatui::{Terminal, backend::TestBackend};

        let theme = NordTheme::new();
        let mut slot = MapSlot::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 24)).unwrap();
        terminal
            .draw(|frame| {
                render_map(frame, frame.area(), &theme, slot.ensure_constructed(), 10.0, 20.0, false);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let marker = buffer.content().iter().find(|cell| cell.symbol() == "◉").unwrap();
        assert_eq!(marker.fg, theme.roles().map_marker);
    }
}
