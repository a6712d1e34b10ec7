//! Vertical navigation bar component.
//!
//! A column of icon buttons, one per top-level screen, with logout pinned to
//! the bottom. Up/Down move the cursor, Enter activates the item under it,
//! and a left click activates the item directly.

mod nav_bar_component;
mod state;

pub use nav_bar_component::VerticalNavBarComponent;
pub use state::NavBarState;
