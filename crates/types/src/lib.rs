//! Shared types for the simctl console.
//!
//! Domain records and wire shapes live in the submodules; the UI message,
//! effect and routing enums used by the terminal console live here so the
//! engine, API client and TUI can all speak them without depending on each
//! other.

pub mod dashboard;
pub mod device;
pub mod gateway;
pub mod lenient;
pub mod scte283;

use serde::{Deserialize, Serialize};

pub use dashboard::{DashboardSummary, DashboardView, DeviceLogs, GatewayBridgeConfig};
pub use device::{
    BulkDeviceRequest, BulkDeviceResponse, DeviceKind, DevicePayload, DeviceSummary, GatewayRef, Location, LorawanPayload, Region,
    SimulatorAction, SimulatorStatus, UplinkStatus,
};
pub use gateway::{GatewayKind, GatewayPayload, GatewayRecord};
pub use scte283::{Scte279AmplifierPayload, Scte283Settings};

/// The backend wraps most list and detail responses in `{"response": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub response: T,
}

/// Result of an asynchronous command execution.
///
/// Each variant carries the typed result of one backend call. Failures carry
/// the error's display text; the UI decides which message the operator sees.
#[derive(Debug, Clone)]
pub enum ExecOutcome {
    /// Plain log line with no state change.
    Log(String),
    /// Session change: `Some(user)` after login, `None` after logout.
    Session(Result<Option<String>, String>),
    Dashboard(DashboardView),
    Gateways(Result<Vec<GatewayRecord>, String>),
    GatewayLoaded(Result<GatewayRecord, String>),
    GatewaySaved(Result<String, String>),
    GatewaysDeleted(Result<usize, String>),
    GatewaySimulator {
        gateway_id: String,
        action: SimulatorAction,
        result: Result<(), String>,
    },
    Devices(Result<Vec<DeviceSummary>, String>),
    DeviceSimulator {
        dev_euis: Vec<String>,
        action: SimulatorAction,
        result: Result<(), String>,
    },
    DevicesDeleted(Result<usize, String>),
    /// A stored device plus the gateway list used to resolve its gateway.
    DeviceLoaded(Result<(LorawanPayload, Vec<GatewayRecord>), String>),
    WizardGateways(Result<Vec<GatewayRecord>, String>),
    /// Backend answer to the submission issued under `ticket`.
    DeviceSubmitted {
        ticket: u64,
        result: Result<(), String>,
    },
    BulkCreated(Result<BulkDeviceResponse, String>),
    DeviceLogs {
        dev_eui: String,
        result: Result<Vec<String>, String>,
    },
    Bridge(Result<GatewayBridgeConfig, String>),
    /// Resolved address for the coordinates currently shown (fallback text on failure).
    Address(String),
    /// First match of an address search, if any.
    AddressSearch(Result<Option<(f64, f64)>, String>),
}

/// Messages that can be sent to update the application state.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (throbber)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Background execution completed with outcome
    ExecCompleted(Box<ExecOutcome>),
}

/// Which device-wizard submit button was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitIntent {
    /// Save and return to the device list.
    Close,
    /// Save, reset the draft and stay in the wizard.
    New,
}

/// Body of a device submission, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceSubmission {
    Create(DevicePayload),
    Update { dev_eui: String, record: LorawanPayload },
}

/// Side effects requested by components and executed by the runtime.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::enum_variant_names)]
pub enum Effect {
    /// Store the session user and continue to the dashboard.
    Login(String),
    Logout,
    CopyToClipboardRequested(String),
    LoadDashboard,
    LoadGateways,
    LoadGateway(String),
    SaveGateway {
        id: Option<String>,
        payload: GatewayPayload,
    },
    DeleteGateways(Vec<String>),
    GatewaySimulator {
        gateway_id: String,
        action: SimulatorAction,
    },
    LoadDevices,
    DeviceSimulator {
        dev_euis: Vec<String>,
        action: SimulatorAction,
    },
    DeleteDevices(Vec<String>),
    /// Open the wizard in edit mode for a stored device.
    EditDevice(String),
    LoadWizardGateways,
    SubmitDevice {
        ticket: u64,
        submission: DeviceSubmission,
    },
    CreateBulkDevices(BulkDeviceRequest),
    LoadDeviceLogs(String),
    LoadBridge,
    ReverseGeocode {
        latitude: f64,
        longitude: f64,
    },
    SearchAddress(String),
    // Change the main view
    SwitchTo(Route),
    // Display a modal view
    ShowModal(Modal),
    // Hide any open modals
    CloseModal,
}

/// Top-level screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Dashboard,
    Gateways,
    GatewayForm,
    Devices,
    DeviceWizard,
    BulkDevices,
    DeviceLogs,
    GatewayBridge,
}

impl Route {
    /// Screens reachable from the navigation bar, in display order.
    pub const NAVIGABLE: [Route; 4] = [Route::Dashboard, Route::Gateways, Route::Devices, Route::GatewayBridge];

    pub fn title(&self) -> &'static str {
        match self {
            Route::Login => "Login",
            Route::Dashboard => "Dashboard",
            Route::Gateways => "Gateways",
            Route::GatewayForm => "Gateway",
            Route::Devices => "Devices",
            Route::DeviceWizard => "Device",
            Route::BulkDevices => "Bulk devices",
            Route::DeviceLogs => "Device logs",
            Route::GatewayBridge => "Gateway bridge",
        }
    }

    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// What a confirmation modal does when accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteDevices(Vec<String>),
    DeleteGateways(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    Alert { message: String, is_error: bool },
    Confirm { message: String, action: ConfirmAction },
    Help,
}

impl Modal {
    pub fn error(message: impl Into<String>) -> Self {
        Modal::Alert {
            message: message.into(),
            is_error: true,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Modal::Alert {
            message: message.into(),
            is_error: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_device_lists() {
        let json = r#"{"response": [{"name": "d1", "devEUI": "01", "gateway": "gw"}]}"#;
        let envelope: ApiEnvelope<Vec<DeviceSummary>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.response.len(), 1);
        assert_eq!(envelope.response[0].dev_eui, "01");
    }

    #[test]
    fn only_login_is_reachable_without_a_session() {
        assert!(!Route::Login.requires_session());
        assert!(Route::NAVIGABLE.iter().all(Route::requires_session));
    }
}
