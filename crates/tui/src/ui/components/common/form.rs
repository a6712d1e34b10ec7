//! Declarative field lists for the console's forms.
//!
//! A form is a `Vec<FormField<T>>` built against some target type (the
//! device draft, the gateway form, the bulk form). Each field knows how to
//! read its value from the target and write it back, so a single
//! [`FormState`] can drive focus, editing and rendering for all of them.
//! Text fields write back on every keystroke; numeric fields only when the
//! text parses.

use std::{fmt::Display, str::FromStr};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Row, Table, TableState},
};
use simctl_types::GatewayRecord;

use super::text_input::TextInputState;
use crate::ui::theme::{Theme, theme_helpers as th};

const MASK_CHAR: char = '•';
const LABEL_WIDTH: u16 = 28;

/// Data that choice fields cycle through.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCtx<'a> {
    pub gateways: &'a [GatewayRecord],
}

pub enum FieldKind<T> {
    Text {
        read: Box<dyn Fn(&T) -> String>,
        write: Box<dyn Fn(&mut T, &str)>,
    },
    Toggle {
        read: Box<dyn Fn(&T) -> bool>,
        write: Box<dyn Fn(&mut T, bool)>,
    },
    Choice {
        read: Box<dyn Fn(&T) -> String>,
        cycle: Box<dyn Fn(&mut T, &FormCtx<'_>, bool)>,
    },
}

pub struct FormField<T> {
    pub label: String,
    pub kind: FieldKind<T>,
    pub required: bool,
    pub masked: bool,
    pub generator: Option<fn() -> String>,
    pub validator: Option<fn(&str) -> bool>,
    /// Index of the repeated group (sensor row) this field belongs to.
    pub group: Option<usize>,
}

impl<T> FormField<T> {
    fn new(label: impl Into<String>, kind: FieldKind<T>) -> Self {
        Self {
            label: label.into(),
            kind,
            required: false,
            masked: false,
            generator: None,
            validator: None,
            group: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Hide the value unless secrets are revealed.
    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Allow Ctrl+G to fill the field.
    pub fn generated(mut self, generator: fn() -> String) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn validated(mut self, validator: fn(&str) -> bool) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn in_group(mut self, group: usize) -> Self {
        self.group = Some(group);
        self
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, FieldKind::Text { .. })
    }

    fn display_label(&self) -> String {
        let mut label = self.label.clone();
        if self.required {
            label.push_str(" *");
        }
        label
    }
}

pub fn text<T: 'static>(
    label: impl Into<String>,
    read: impl Fn(&T) -> &String + 'static,
    write: impl Fn(&mut T) -> &mut String + 'static,
) -> FormField<T> {
    FormField::new(
        label,
        FieldKind::Text {
            read: Box::new(move |target: &T| read(target).clone()),
            write: Box::new(move |target: &mut T, value: &str| *write(target) = value.to_string()),
        },
    )
}

/// Text stored as `Option<String>`; an empty field clears it.
pub fn optional_text<T: 'static>(
    label: impl Into<String>,
    read: impl Fn(&T) -> &Option<String> + 'static,
    write: impl Fn(&mut T) -> &mut Option<String> + 'static,
) -> FormField<T> {
    FormField::new(
        label,
        FieldKind::Text {
            read: Box::new(move |target: &T| read(target).clone().unwrap_or_default()),
            write: Box::new(move |target: &mut T, value: &str| {
                *write(target) = Some(value.to_string()).filter(|value| !value.is_empty());
            }),
        },
    )
}

/// Number that is always present; text that does not parse leaves it unchanged.
pub fn number<T: 'static, V: FromStr + Display + 'static>(
    label: impl Into<String>,
    read: impl Fn(&T) -> &V + 'static,
    write: impl Fn(&mut T) -> &mut V + 'static,
) -> FormField<T> {
    FormField::new(
        label,
        FieldKind::Text {
            read: Box::new(move |target: &T| read(target).to_string()),
            write: Box::new(move |target: &mut T, value: &str| {
                if let Ok(parsed) = value.trim().parse::<V>() {
                    *write(target) = parsed;
                }
            }),
        },
    )
    .validated(|value: &str| value.trim().parse::<V>().is_ok())
}

/// Optional number; an empty field clears it.
pub fn optional_number<T: 'static, V: FromStr + Display + 'static>(
    label: impl Into<String>,
    read: impl Fn(&T) -> &Option<V> + 'static,
    write: impl Fn(&mut T) -> &mut Option<V> + 'static,
) -> FormField<T> {
    FormField::new(
        label,
        FieldKind::Text {
            read: Box::new(move |target: &T| read(target).as_ref().map(ToString::to_string).unwrap_or_default()),
            write: Box::new(move |target: &mut T, value: &str| {
                let value = value.trim();
                if value.is_empty() {
                    *write(target) = None;
                } else if let Ok(parsed) = value.parse::<V>() {
                    *write(target) = Some(parsed);
                }
            }),
        },
    )
    .validated(|value: &str| value.trim().is_empty() || value.trim().parse::<V>().is_ok())
}

pub fn toggle<T: 'static>(
    label: impl Into<String>,
    read: impl Fn(&T) -> &bool + 'static,
    write: impl Fn(&mut T) -> &mut bool + 'static,
) -> FormField<T> {
    FormField::new(
        label,
        FieldKind::Toggle {
            read: Box::new(move |target: &T| *read(target)),
            write: Box::new(move |target: &mut T, value: bool| *write(target) = value),
        },
    )
}

/// Field cycled with Left/Right (or Space/Enter) through a set of values.
pub fn choice<T: 'static>(
    label: impl Into<String>,
    read: impl Fn(&T) -> String + 'static,
    cycle: impl Fn(&mut T, &FormCtx<'_>, bool) + 'static,
) -> FormField<T> {
    FormField::new(
        label,
        FieldKind::Choice {
            read: Box::new(read),
            cycle: Box::new(cycle),
        },
    )
}

/// Next (or previous) entry after `current` in `options`, wrapping around.
/// `None` starts from the first (or last) entry.
pub fn cycle_index(current: Option<usize>, len: usize, forward: bool) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match (current, forward) {
        (None, true) => 0,
        (None, false) => len - 1,
        (Some(index), true) => (index + 1) % len,
        (Some(index), false) => (index + len - 1) % len,
    })
}

/// What a key press did to the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKey {
    /// Focus moved; nothing was written.
    Moved,
    /// The target was written.
    Changed,
    Ignored,
}

/// Focus, edit buffer and scroll position of one rendered form.
#[derive(Debug, Default)]
pub struct FormState {
    focused: usize,
    pub editor: TextInputState,
    pub reveal_secrets: bool,
    loaded: Option<usize>,
    table_state: TableState,
}

impl FormState {
    #[cfg(test)]
    pub(crate) fn focused(&self) -> usize {
        self.focused
    }

    /// Focus a field by index; the edit buffer reloads on the next sync.
    pub fn focus(&mut self, index: usize) {
        self.focused = index;
        self.loaded = None;
    }

    /// Forget the edit buffer, e.g. after the target changed underneath.
    pub fn invalidate(&mut self) {
        self.loaded = None;
    }

    pub fn reset(&mut self) {
        self.focus(0);
        self.table_state = TableState::default();
    }

    /// Clamp focus to the field list and load the focused text into the editor.
    pub fn sync<T>(&mut self, fields: &[FormField<T>], target: &T) {
        if fields.is_empty() {
            self.focused = 0;
            self.loaded = None;
            return;
        }
        if self.focused >= fields.len() {
            self.focus(fields.len() - 1);
        }
        if self.loaded == Some(self.focused) {
            return;
        }
        if let FieldKind::Text { read, .. } = &fields[self.focused].kind {
            self.editor.set_input(read(target));
        } else {
            self.editor.clear();
        }
        self.loaded = Some(self.focused);
    }

    /// Group tag of the focused field, if it is part of a repeated group.
    pub fn focused_group<T>(&self, fields: &[FormField<T>]) -> Option<usize> {
        fields.get(self.focused).and_then(|field| field.group)
    }

    pub fn handle_key<T>(&mut self, fields: &[FormField<T>], target: &mut T, ctx: &FormCtx<'_>, key: KeyEvent) -> FormKey {
        self.sync(fields, target);
        let Some(field) = fields.get(self.focused) else {
            return FormKey::Ignored;
        };

        match key.code {
            KeyCode::Down | KeyCode::Tab => return self.step(fields.len(), true),
            KeyCode::Up | KeyCode::BackTab => return self.step(fields.len(), false),
            _ => {}
        }

        if key.code == KeyCode::Char('g') && key.modifiers.contains(KeyModifiers::CONTROL) {
            let (Some(generate), FieldKind::Text { write, .. }) = (field.generator, &field.kind) else {
                return FormKey::Ignored;
            };
            let value = generate();
            write(target, &value);
            self.editor.set_input(value);
            return FormKey::Changed;
        }

        match &field.kind {
            FieldKind::Text { write, .. } => {
                let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
                match key.code {
                    KeyCode::Char(c) if plain => self.editor.insert_char(c),
                    KeyCode::Backspace => self.editor.backspace(),
                    KeyCode::Delete => self.editor.delete(),
                    KeyCode::Left if plain => {
                        self.editor.move_left();
                        return FormKey::Moved;
                    }
                    KeyCode::Right if plain => {
                        self.editor.move_right();
                        return FormKey::Moved;
                    }
                    KeyCode::Home => {
                        self.editor.move_home();
                        return FormKey::Moved;
                    }
                    KeyCode::End => {
                        self.editor.move_end();
                        return FormKey::Moved;
                    }
                    _ => return FormKey::Ignored,
                }
                write(target, self.editor.input());
                FormKey::Changed
            }
            FieldKind::Toggle { read, write } => match key.code {
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let current = read(target);
                    write(target, !current);
                    FormKey::Changed
                }
                _ => FormKey::Ignored,
            },
            FieldKind::Choice { cycle, .. } => {
                let plain = !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
                match key.code {
                    KeyCode::Right | KeyCode::Char(' ') | KeyCode::Enter if plain => {
                        cycle(target, ctx, true);
                        FormKey::Changed
                    }
                    KeyCode::Left if plain => {
                        cycle(target, ctx, false);
                        FormKey::Changed
                    }
                    _ => FormKey::Ignored,
                }
            }
        }
    }

    fn step(&mut self, len: usize, forward: bool) -> FormKey {
        if len == 0 {
            return FormKey::Ignored;
        }
        let next = if forward {
            (self.focused + 1).min(len - 1)
        } else {
            self.focused.saturating_sub(1)
        };
        if next != self.focused {
            self.focus(next);
        }
        FormKey::Moved
    }

    /// Render the fields as a label/value table and place the cursor on the
    /// focused text field when `focused` is set.
    pub fn render<T>(&mut self, frame: &mut Frame, area: Rect, theme: &dyn Theme, fields: &[FormField<T>], target: &T, focused: bool) {
        self.sync(fields, target);
        let rows = fields.iter().enumerate().map(|(index, field)| {
            let is_focused = focused && index == self.focused;
            let value = self.display_value(field, target, is_focused);
            let valid = match (&field.kind, field.validator) {
                (FieldKind::Text { read, .. }, Some(validator)) => {
                    let current = if is_focused { self.editor.input().to_string() } else { read(target) };
                    current.is_empty() || validator(&current)
                }
                _ => true,
            };
            let mut label = Line::from(Span::styled(field.display_label(), theme.text_secondary_style()));
            if field.generator.is_some() && is_focused {
                label.push_span(Span::styled(" ^G", theme.text_muted_style()));
            }
            Row::new(vec![
                Cell::from(label),
                Cell::from(Span::styled(value, th::input_style(theme, valid, is_focused))),
            ])
            .style(th::table_row_style(theme, index))
        });

        let table = Table::new(rows, [Constraint::Length(LABEL_WIDTH), Constraint::Fill(1)])
            .row_highlight_style(if focused { th::table_selected_style(theme) } else { Style::default() });
        self.table_state.select(Some(self.focused));
        frame.render_stateful_widget(table, area, &mut self.table_state);

        let Some(field) = fields.get(self.focused) else {
            return;
        };
        if focused && field.is_text() && self.focused >= self.table_state.offset() {
            let row = (self.focused - self.table_state.offset()) as u16;
            let columns = if field.masked && !self.reveal_secrets {
                self.editor.input()[..self.editor.cursor()].chars().count() as u16
            } else {
                self.editor.cursor_columns()
            };
            if row < area.height {
                let x = (area.x + LABEL_WIDTH + 1 + columns).min(area.right().saturating_sub(1));
                frame.set_cursor_position(Position::new(x, area.y + row));
            }
        }
    }

    fn display_value<T>(&self, field: &FormField<T>, target: &T, is_focused: bool) -> String {
        match &field.kind {
            FieldKind::Text { read, .. } => {
                let value = if is_focused { self.editor.input().to_string() } else { read(target) };
                if field.masked && !self.reveal_secrets {
                    MASK_CHAR.to_string().repeat(value.chars().count())
                } else {
                    value
                }
            }
            FieldKind::Toggle { read, .. } => if read(target) { "[x]" } else { "[ ]" }.to_string(),
            FieldKind::Choice { read, .. } => format!("‹ {} ›", read(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Target {
        name: String,
        count: u32,
        altitude: Option<f64>,
        enabled: bool,
        gateway: Option<String>,
    }

    fn fields() -> Vec<FormField<Target>> {
        vec![
            text("Name", |t: &Target| &t.name, |t: &mut Target| &mut t.name)
                .required()
                .generated(|| "generated".to_string()),
            number("Count", |t: &Target| &t.count, |t: &mut Target| &mut t.count),
            optional_number("Altitude", |t: &Target| &t.altitude, |t: &mut Target| &mut t.altitude),
            toggle("Enabled", |t: &Target| &t.enabled, |t: &mut Target| &mut t.enabled),
            choice(
                "Gateway",
                |t: &Target| t.gateway.clone().unwrap_or_default(),
                |t: &mut Target, ctx: &FormCtx<'_>, forward: bool| {
                    let current = ctx.gateways.iter().position(|g| Some(&g.name) == t.gateway.as_ref());
                    if let Some(index) = cycle_index(current, ctx.gateways.len(), forward) {
                        t.gateway = Some(ctx.gateways[index].name.clone());
                    }
                },
            ),
        ]
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_writes_through_and_numbers_only_when_they_parse() {
        let fields = fields();
        let mut target = Target::default();
        let mut state = FormState::default();
        let ctx = FormCtx::default();

        for c in "gw".chars() {
            assert_eq!(state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Char(c))), FormKey::Changed);
        }
        assert_eq!(target.name, "gw");

        assert_eq!(state.handle_key(&fields, &mut target, &ctx, ctrl('g')), FormKey::Changed);
        assert_eq!(target.name, "generated");

        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Down));
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Backspace));
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Char('7')));
        assert_eq!(target.count, 7);
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Char('x')));
        assert_eq!(target.count, 7);

        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Down));
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Char('1')));
        assert_eq!(target.altitude, Some(1.0));
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Backspace));
        assert_eq!(target.altitude, None);
    }

    #[test]
    fn toggles_and_choices_cycle() {
        let fields = fields();
        let mut target = Target::default();
        let mut state = FormState::default();
        let gateways = vec![
            GatewayRecord {
                name: "gw1".into(),
                ..Default::default()
            },
            GatewayRecord {
                name: "gw2".into(),
                ..Default::default()
            },
        ];
        let ctx = FormCtx { gateways: &gateways };

        state.focus(3);
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Char(' ')));
        assert!(target.enabled);

        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Down));
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Right));
        assert_eq!(target.gateway.as_deref(), Some("gw1"));
        state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Left));
        assert_eq!(target.gateway.as_deref(), Some("gw2"));

        // Down at the last field stays put.
        assert_eq!(state.handle_key(&fields, &mut target, &ctx, key(KeyCode::Down)), FormKey::Moved);
        assert_eq!(state.focused(), 4);
    }

    #[test]
    fn cycle_index_wraps_both_ways() {
        assert_eq!(cycle_index(None, 3, true), Some(0));
        assert_eq!(cycle_index(None, 3, false), Some(2));
        assert_eq!(cycle_index(Some(2), 3, true), Some(0));
        assert_eq!(cycle_index(Some(0), 3, false), Some(2));
        assert_eq!(cycle_index(None, 0, true), None);
    }
}
