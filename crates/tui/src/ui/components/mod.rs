//! UI components: one per screen plus the shared navigation, logs, help and
//! modal building blocks.

pub mod bridge;
pub mod common;
pub mod component;
pub mod dashboard;
pub mod devices;
pub mod gateways;
pub mod help;
pub mod login;
pub mod logs;
pub mod nav_bar;
pub mod wizard;

pub use bridge::GatewayBridgeComponent;
pub(crate) use component::Component;
pub use dashboard::DashboardComponent;
pub use devices::{BulkDevicesComponent, DeviceLogsComponent, DevicesComponent};
pub use gateways::{GatewayFormComponent, GatewaysComponent};
pub use help::HelpComponent;
pub use login::LoginComponent;
pub use logs::LogsComponent;
pub use nav_bar::VerticalNavBarComponent;
pub use wizard::DeviceWizardComponent;
