pub mod logs_component;
pub mod state;

pub use logs_component::LogsComponent;
pub use state::{LogLevel, LogsState};
