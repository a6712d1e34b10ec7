//! Component system for the simctl console.
//!
//! Components are self-contained UI elements. Screen state lives on
//! [`App`](crate::app::App) so that results of background calls can be
//! applied in one place; a component reads and mutates that state, renders
//! it, and reports side effects back to the runtime as [`Effect`]s.

use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{Frame, layout::Rect, text::Span};
use simctl_types::{Effect, Msg};

use crate::app::App;

/// A trait representing a UI component with its own behavior.
///
/// # Component Lifecycle
///
/// 1. `on_route_enter` runs when the component becomes the main view (or a modal opens)
/// 2. Input arrives through `handle_key_events` / `handle_mouse_events`
/// 3. Application messages arrive through `handle_message`
/// 4. `render` draws the component into the provided area
/// 5. `on_route_exit` runs before the component is dropped
pub(crate) trait Component {
    /// Handle an application-level message (ticks, resizes, finished calls).
    fn handle_message(&mut self, _app: &mut App, _msg: Msg) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle key events when this component has focus.
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into `rect`.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the hints bar while this component has focus.
    fn get_hint_spans(&self, _app: &App) -> Vec<Span<'_>> {
        Vec::new()
    }

    /// Called when the component becomes visible; typically requests data.
    fn on_route_enter(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }

    fn on_route_exit(&mut self, _app: &mut App) -> Vec<Effect> {
        Vec::new()
    }
}
