//! Device list, bulk creation and the per-device log viewer.

mod bulk_component;
mod devices_component;
mod logs_view_component;
mod state;

pub use bulk_component::BulkDevicesComponent;
pub use devices_component::DevicesComponent;
pub use logs_view_component::DeviceLogsComponent;
pub use state::{BulkState, DEVICE_LOAD_FAILED_MESSAGE, DEVICE_LOGS_FAILED_MESSAGE, DeviceLogsState, DevicesState};
