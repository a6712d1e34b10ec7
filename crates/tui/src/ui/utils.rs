//! Layout helpers shared by the console's components.

use ratatui::prelude::*;

/// Creates a centered rectangular area within a given rectangle.
///
/// The width and height are percentages (0-100) of the parent rectangle.
/// Used for modal dialogs.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let area = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1]);
    area[1]
}

/// Centered rectangle of a fixed size, shrunk to fit the parent.
pub fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

/// Index of the area under `(x, y)`, if the point is inside `container` at all.
pub fn find_target_index_by_mouse_position(container: &Rect, areas: &[Rect], x: u16, y: u16) -> Option<usize> {
    let position = Position::new(x, y);
    if !container.contains(position) {
        return None;
    }
    areas.iter().position(|area| area.contains(position))
}

/// Table row under the mouse, accounting for a header row and the scroll offset.
pub fn table_row_at(table_area: Rect, y: u16, header_rows: u16, offset: usize, len: usize) -> Option<usize> {
    let first_row = table_area.y + header_rows;
    if y < first_row || y >= table_area.bottom() {
        return None;
    }
    let index = offset + usize::from(y - first_row);
    (index < len).then_some(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_inside_parent() {
        let parent = Rect::new(0, 0, 100, 50);
        let centered = centered_rect(80, 70, parent);
        assert!(parent.contains(Position::new(centered.x, centered.y)));
        assert_eq!(centered.width, 80);
    }

    #[test]
    fn fixed_rect_shrinks_to_fit() {
        let parent = Rect::new(0, 0, 20, 10);
        assert_eq!(centered_fixed(40, 4, parent), Rect::new(0, 3, 20, 4));
    }

    #[test]
    fn hit_testing_respects_container_and_offsets() {
        let container = Rect::new(0, 0, 10, 10);
        let areas = [Rect::new(0, 0, 10, 3), Rect::new(0, 3, 10, 3)];
        assert_eq!(find_target_index_by_mouse_position(&container, &areas, 2, 4), Some(1));
        assert_eq!(find_target_index_by_mouse_position(&container, &areas, 12, 4), None);

        let table = Rect::new(0, 5, 20, 10);
        assert_eq!(table_row_at(table, 5, 1, 0, 3), None);
        assert_eq!(table_row_at(table, 7, 1, 2, 10), Some(3));
        assert_eq!(table_row_at(table, 9, 1, 0, 2), None);
    }
}
