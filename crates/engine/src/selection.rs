//! Multi-select rules for the device and gateway lists.
//!
//! Simulator actions on devices are sent as one request for the whole
//! selection, guarded by the current status of every selected row. Edit
//! needs exactly one row, delete at least one.

use simctl_types::{DeviceSummary, GatewayRecord, SimulatorAction, SimulatorStatus, UplinkStatus};
use thiserror::Error;

pub const DEVICES_FETCH_FAILED_MESSAGE: &str = "Failed to load devices. Please try again.";
pub const DEVICE_DELETE_FAILED_MESSAGE: &str = "Failed to delete device. Check the log for details.";
pub const GATEWAYS_FETCH_FAILED_MESSAGE: &str = "Failed to fetch gateways. Please try again.";
pub const GATEWAYS_DELETED_MESSAGE: &str = "Gateway(s) deleted successfully!";
pub const GATEWAY_DELETE_FAILED_MESSAGE: &str = "Failed to delete gateway(s). Please try again.";

/// Which list a selection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Device,
    Gateway,
}

fn subject_noun(subject: &Subject) -> &'static str {
    match subject {
        Subject::Device => "device",
        Subject::Gateway => "gateway",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("{}", rejection_message(.0))]
    ActionRejected(SimulatorAction),
    #[error("Please select exactly one {} to edit.", subject_noun(.0))]
    EditNeedsOne(Subject),
    #[error("Please select at least one {} to delete.", subject_noun(.0))]
    DeleteNeedsAny(Subject),
}

fn rejection_message(action: &SimulatorAction) -> &'static str {
    match action {
        SimulatorAction::Join => "Please select devices that are not already joined.",
        SimulatorAction::Unjoin => "Please select devices that are already joined.",
        SimulatorAction::StartUplink => "Please select joined devices with stopped uplinks.",
        SimulatorAction::StopUplink => "Please select joined devices with running uplinks.",
    }
}

/// Simulator and uplink state of one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowState {
    pub simulator: SimulatorStatus,
    pub uplink: UplinkStatus,
}

impl RowState {
    pub fn of(device: &DeviceSummary) -> Self {
        Self {
            simulator: device.simulator_status(),
            uplink: device.uplink_status(),
        }
    }

    /// Gateways do not report their uplink, so it starts out stopped.
    pub fn of_gateway(gateway: &GatewayRecord) -> Self {
        Self {
            simulator: gateway.simulator_status(),
            uplink: UplinkStatus::Stopped,
        }
    }

    /// Whether `action` may be sent for a row in this state.
    pub fn allows(&self, action: SimulatorAction) -> bool {
        let playing = self.simulator == SimulatorStatus::Playing;
        match action {
            SimulatorAction::Join => !playing,
            SimulatorAction::Unjoin => playing,
            SimulatorAction::StartUplink => playing && self.uplink == UplinkStatus::Stopped,
            SimulatorAction::StopUplink => playing && self.uplink == UplinkStatus::Running,
        }
    }

    /// State after the backend accepted `action`. Stopping the simulator
    /// also stops the uplink.
    pub fn after(self, action: SimulatorAction) -> Self {
        match action {
            SimulatorAction::Join => Self {
                simulator: SimulatorStatus::Playing,
                ..self
            },
            SimulatorAction::Unjoin => Self {
                simulator: SimulatorStatus::Paused,
                uplink: UplinkStatus::Stopped,
            },
            SimulatorAction::StartUplink => Self {
                uplink: UplinkStatus::Running,
                ..self
            },
            SimulatorAction::StopUplink => Self {
                uplink: UplinkStatus::Stopped,
                ..self
            },
        }
    }
}

/// DevEUIs to send for `action`, or the reason the selection does not qualify.
pub fn check_device_action(action: SimulatorAction, selected: &[&DeviceSummary]) -> Result<Vec<String>, SelectionError> {
    if selected.is_empty() || !selected.iter().all(|device| RowState::of(device).allows(action)) {
        return Err(SelectionError::ActionRejected(action));
    }
    Ok(selected.iter().map(|device| device.dev_eui.clone()).collect())
}

/// Mirrors an accepted action onto the affected rows.
pub fn apply_device_action(action: SimulatorAction, rows: &mut [DeviceSummary], dev_euis: &[String]) {
    for row in rows.iter_mut().filter(|row| dev_euis.contains(&row.dev_eui)) {
        let next = RowState::of(row).after(action);
        row.set_simulator_status(next.simulator);
        row.set_uplink_status(next.uplink);
    }
}

pub fn device_action_failure(action: SimulatorAction) -> &'static str {
    match action {
        SimulatorAction::Join => "Failed to start simulator.",
        SimulatorAction::Unjoin => "Failed to stop simulator.",
        SimulatorAction::StartUplink => "Failed to start devices uplink.",
        SimulatorAction::StopUplink => "Failed to stop devices uplink.",
    }
}

pub fn gateway_action_failure(action: SimulatorAction, gateway_id: &str) -> String {
    match action {
        SimulatorAction::Join => format!("Failed to start gateway for {gateway_id}."),
        SimulatorAction::Unjoin => format!("Failed to stop gateway for {gateway_id}."),
        SimulatorAction::StartUplink => format!("Failed to start uplink for {gateway_id}."),
        SimulatorAction::StopUplink => format!("Failed to stop uplink for {gateway_id}."),
    }
}

/// The single selected key, for opening an edit form.
pub fn edit_target<'a>(subject: Subject, selected: &[&'a str]) -> Result<&'a str, SelectionError> {
    match selected {
        [only] => Ok(*only),
        _ => Err(SelectionError::EditNeedsOne(subject)),
    }
}

/// Keys to delete once the operator confirms.
pub fn delete_targets(subject: Subject, selected: &[&str]) -> Result<Vec<String>, SelectionError> {
    if selected.is_empty() {
        return Err(SelectionError::DeleteNeedsAny(subject));
    }
    Ok(selected.iter().map(|key| key.to_string()).collect())
}

pub fn delete_confirmation(subject: Subject, count: usize) -> String {
    match subject {
        Subject::Device if count == 1 => "Are you sure you want to delete this device?".to_string(),
        Subject::Device => "Are you sure you want to delete these devices?".to_string(),
        Subject::Gateway => format!("Are you sure you want to delete {count} selected gateway(s)?"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(eui: &str, status: Option<&str>, uplink: Option<&str>) -> DeviceSummary {
        DeviceSummary {
            dev_eui: eui.into(),
            current_status: status.map(str::to_string),
            uplink_status: uplink.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn join_requires_every_row_paused() {
        let paused = device("01", None, None);
        let playing = device("02", Some("playing"), None);
        assert_eq!(check_device_action(SimulatorAction::Join, &[&paused]).unwrap(), vec!["01"]);
        let error = check_device_action(SimulatorAction::Join, &[&paused, &playing]).unwrap_err();
        assert_eq!(error.to_string(), "Please select devices that are not already joined.");
        assert!(check_device_action(SimulatorAction::Join, &[]).is_err());
    }

    #[test]
    fn uplink_guards_need_joined_rows() {
        let stopped = device("01", Some("playing"), Some("stopped"));
        let running = device("02", Some("playing"), Some("running"));
        let paused = device("03", Some("paused"), Some("stopped"));
        assert!(check_device_action(SimulatorAction::StartUplink, &[&stopped]).is_ok());
        assert!(check_device_action(SimulatorAction::StartUplink, &[&stopped, &running]).is_err());
        assert!(check_device_action(SimulatorAction::StartUplink, &[&paused]).is_err());
        assert!(check_device_action(SimulatorAction::StopUplink, &[&running]).is_ok());
        assert!(check_device_action(SimulatorAction::Unjoin, &[&stopped, &running]).is_ok());
    }

    #[test]
    fn unjoin_also_stops_uplinks() {
        let mut rows = vec![device("01", Some("playing"), Some("running")), device("02", Some("playing"), Some("running"))];
        apply_device_action(SimulatorAction::Unjoin, &mut rows, &["01".to_string()]);
        assert_eq!(RowState::of(&rows[0]), RowState::default());
        assert_eq!(rows[1].uplink_status(), UplinkStatus::Running);

        apply_device_action(SimulatorAction::Join, &mut rows, &["01".to_string()]);
        assert_eq!(rows[0].simulator_status(), SimulatorStatus::Playing);
        assert_eq!(rows[0].uplink_status(), UplinkStatus::Stopped);
    }

    #[test]
    fn edit_and_delete_selection_rules() {
        assert_eq!(edit_target(Subject::Device, &["01"]), Ok("01"));
        assert_eq!(
            edit_target(Subject::Gateway, &["a", "b"]).unwrap_err().to_string(),
            "Please select exactly one gateway to edit."
        );
        assert_eq!(
            delete_targets(Subject::Device, &[]).unwrap_err().to_string(),
            "Please select at least one device to delete."
        );
        assert_eq!(delete_confirmation(Subject::Device, 1), "Are you sure you want to delete this device?");
        assert_eq!(delete_confirmation(Subject::Device, 3), "Are you sure you want to delete these devices?");
        assert_eq!(
            delete_confirmation(Subject::Gateway, 2),
            "Are you sure you want to delete 2 selected gateway(s)?"
        );
        assert_eq!(gateway_action_failure(SimulatorAction::StopUplink, "g1"), "Failed to stop uplink for g1.");
    }
}
