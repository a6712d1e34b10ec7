//! SCTE-283 amplifier model.
//!
//! Group structs serialize with the backend's snake_case keys, so the same
//! values travel from the draft into the `Scte279Amplifier` request tree
//! unchanged. Enumerated values (amplifier type, operational status, admin
//! state, ...) are carried as the numeric codes the backend expects, encoded
//! as strings; most default to `"1"`.

use serde::{Deserialize, Serialize};

fn code_one() -> String {
    "1".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemCapabilities {
    pub amplifier_type: String,
    pub supports_power_supply_redundancy: bool,
    pub power_supply_redundancy_mode: String,
    pub supports_power_saving_mode: bool,
    pub supports_rf_config_file: bool,
    pub supports_debug_file: bool,
    pub supports_rf_spectrum_capture: bool,
}

impl Default for SystemCapabilities {
    fn default() -> Self {
        Self {
            amplifier_type: code_one(),
            supports_power_supply_redundancy: false,
            power_supply_redundancy_mode: code_one(),
            supports_power_saving_mode: false,
            supports_rf_config_file: false,
            supports_debug_file: false,
            supports_rf_spectrum_capture: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemStatus {
    pub unique_id: String,
    pub current_date_time: String,
    pub up_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Identification {
    pub model_number: String,
    pub serial_number: String,
    pub device_alias: String,
    pub device_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Vendor {
    pub name: String,
    pub oui: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionSummary {
    pub current_sw_version: String,
    pub boot_rom_version: String,
    pub hw_version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Enclosure {
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSupply {
    pub id: Option<u32>,
    pub description: String,
    pub oper_status: String,
    pub input_voltage: Option<f64>,
    pub input_current: Option<f64>,
}

impl Default for PowerSupply {
    fn default() -> Self {
        Self {
            id: None,
            description: String::new(),
            oper_status: code_one(),
            input_voltage: None,
            input_current: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRail {
    pub id: Option<u32>,
    pub description: String,
    pub oper_status: String,
    pub voltage: Option<f64>,
    pub current: Option<f64>,
}

impl Default for OutputRail {
    fn default() -> Self {
        Self {
            id: None,
            description: String::new(),
            oper_status: code_one(),
            voltage: None,
            current: None,
        }
    }
}

/// One amplifier sensor.
///
/// Sensors are the only SCTE-283 entries the backend expects in PascalCase
/// (`Id`, `SensorType`, `UnitsDisplay`, ...). Draft files may use either
/// spelling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all(serialize = "PascalCase"))]
pub struct Sensor {
    #[serde(alias = "Id")]
    pub id: Option<u32>,
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "SensorType")]
    pub sensor_type: String,
    #[serde(alias = "Scale")]
    pub scale: String,
    #[serde(alias = "Precision")]
    pub precision: Option<u32>,
    #[serde(alias = "Value")]
    pub value: Option<f64>,
    #[serde(alias = "OperStatus")]
    pub oper_status: String,
    #[serde(alias = "UnitsDisplay")]
    pub units_display: Option<String>,
    #[serde(alias = "ValueTimeStamp")]
    pub value_time_stamp: Option<String>,
    #[serde(alias = "ValueUpdateRate")]
    pub value_update_rate: Option<u32>,
}

impl Default for Sensor {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            sensor_type: code_one(),
            scale: code_one(),
            precision: None,
            value: None,
            oper_status: code_one(),
            units_display: None,
            value_time_stamp: None,
            value_update_rate: None,
        }
    }
}

impl Sensor {
    /// True when the sensor can be told apart from a blank row.
    pub fn has_identifying_data(&self) -> bool {
        let filled = |value: &Option<String>| value.as_deref().is_some_and(|text| !text.trim().is_empty());
        self.id.is_some() || filled(&self.name) || filled(&self.units_display)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemCfg {
    pub hostname: String,
    pub asset_id: String,
    pub description: String,
    pub cascade_position: Option<u32>,
}

/// Installation site as recorded by the amplifier (free text coordinates).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLocation {
    pub description: String,
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetCapabilities {
    pub reset_types_supported: String,
    pub reset_history_size: Option<u32>,
}

impl Default for ResetCapabilities {
    fn default() -> Self {
        Self {
            reset_types_supported: code_one(),
            reset_history_size: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetHistoryStatus {
    pub index: Option<u32>,
    pub reset_timestamp: String,
    #[serde(rename = "type")]
    pub reset_type: String,
    pub reason: String,
    pub event_id_ref: Option<u32>,
    pub recovery_time: Option<u32>,
}

impl Default for ResetHistoryStatus {
    fn default() -> Self {
        Self {
            index: None,
            reset_timestamp: String::new(),
            reset_type: code_one(),
            reason: String::new(),
            event_id_ref: None,
            recovery_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventCapabilities {
    pub local_event_log_max_size: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EventStatus {
    pub throttle_threshold_exceeded: bool,
}

/// The amplifier's most recent event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub index: Option<u32>,
    pub first_time: String,
    pub last_time: String,
    pub level: String,
    pub id: String,
    pub text: String,
}

impl Default for Event {
    fn default() -> Self {
        Self {
            index: None,
            first_time: String::new(),
            last_time: String::new(),
            level: code_one(),
            id: String::new(),
            text: String::new(),
        }
    }
}

impl Event {
    /// `level` always carries a code, so it does not count as content.
    pub fn is_empty(&self) -> bool {
        self.index.is_none()
            && [&self.first_time, &self.last_time, &self.id, &self.text]
                .iter()
                .all(|value| value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Syslog {
    pub level: String,
    pub timestamp: String,
    pub hostname: String,
    pub ne_type: String,
    pub vendor: String,
    pub event_id: String,
    pub text: String,
    pub vendor_specific_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventSyslogStatus {
    pub index: Option<u32>,
    pub server_address: String,
    pub address_origin: String,
}

impl Default for EventSyslogStatus {
    fn default() -> Self {
        Self {
            index: None,
            server_address: String::new(),
            address_origin: code_one(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventThrottleCfg {
    pub admin_state: String,
    pub threshold: Option<u32>,
    pub interval: Option<u32>,
}

impl Default for EventThrottleCfg {
    fn default() -> Self {
        Self {
            admin_state: code_one(),
            threshold: None,
            interval: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventReportingCfg {
    pub priority: String,
    pub reporting: bool,
}

impl Default for EventReportingCfg {
    fn default() -> Self {
        Self {
            priority: code_one(),
            reporting: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyslogServerCfg {
    pub index: Option<u32>,
    pub server_address: String,
    pub admin_state: String,
}

impl Default for SyslogServerCfg {
    fn default() -> Self {
        Self {
            index: None,
            server_address: String::new(),
            admin_state: code_one(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCapabilities {
    pub num_debug_files_supported: Option<u32>,
    pub num_rf_cfg_files_supported: Option<u32>,
    pub num_rf_spectrum_capture_files_supported: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStatus {
    pub filename: String,
    pub file_type: String,
    pub file_status: String,
    pub date_created: String,
}

impl Default for FileStatus {
    fn default() -> Self {
        Self {
            filename: String::new(),
            file_type: code_one(),
            file_status: code_one(),
            date_created: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataTransferCfg {
    pub remote_server_index: Option<u32>,
    pub remote_server_host: String,
    pub remote_server_port: Option<u16>,
    /// The backend schema spells this key `remot_server_base_uri`.
    #[serde(rename = "remot_server_base_uri", alias = "remote_server_base_uri")]
    pub remote_server_base_uri: String,
    pub protocol: String,
    pub local_store: bool,
}

impl Default for DataTransferCfg {
    fn default() -> Self {
        Self {
            remote_server_index: None,
            remote_server_host: String::new(),
            remote_server_port: None,
            remote_server_base_uri: String::new(),
            protocol: code_one(),
            local_store: false,
        }
    }
}

/// Every SCTE-283 group edited by the wizard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Scte283Settings {
    pub system_capabilities: SystemCapabilities,
    pub system_status: SystemStatus,
    pub identification: Identification,
    pub vendor: Vendor,
    pub version_summary: VersionSummary,
    pub enclosure: Enclosure,
    pub power_supply: PowerSupply,
    pub output_rail: OutputRail,
    pub sensors: Vec<Sensor>,
    pub system_cfg: SystemCfg,
    pub site_location: SiteLocation,
    pub reset_capabilities: ResetCapabilities,
    pub reset_history_status: ResetHistoryStatus,
    pub event_capabilities: EventCapabilities,
    pub event_status: EventStatus,
    pub event: Event,
    pub syslog: Syslog,
    pub event_syslog_status: EventSyslogStatus,
    pub event_throttle_cfg: EventThrottleCfg,
    pub event_reporting_cfg: EventReportingCfg,
    pub syslog_server_cfg: SyslogServerCfg,
    pub file_capabilities: FileCapabilities,
    pub file_status: FileStatus,
    pub data_transfer_cfg: DataTransferCfg,
}

impl Scte283Settings {
    /// Settings for a fresh SCTE-283 draft: defaults plus one blank sensor row.
    pub fn with_blank_sensor() -> Self {
        Self {
            sensors: vec![Sensor::default()],
            ..Default::default()
        }
    }

    pub fn any_sensor_identified(&self) -> bool {
        self.sensors.iter().any(Sensor::has_identifying_data)
    }
}

/// A group the backend expects to exist but that carries no fields yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmptyGroup {}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemCapabilitiesGroup {
    pub system_capabilities: SystemCapabilities,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStatusGroup {
    #[serde(rename = "SystemStatus")]
    pub system_status: SystemStatus,
    #[serde(rename = "Identification")]
    pub identification: Identification,
    #[serde(rename = "Vendor")]
    pub vendor: Vendor,
    #[serde(rename = "VersionSummary")]
    pub version_summary: VersionSummary,
    #[serde(rename = "Enclosure")]
    pub enclosure: Enclosure,
    #[serde(rename = "Sensor")]
    pub sensors: Vec<Sensor>,
    #[serde(rename = "PowerSupply")]
    pub power_supply: PowerSupply,
    #[serde(rename = "OutputRail")]
    pub output_rail: OutputRail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemCfgGroup {
    #[serde(rename = "systemCfg")]
    pub system_cfg: SystemCfg,
    #[serde(rename = "locationscte")]
    pub location: SiteLocation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetStatusGroup {
    #[serde(rename = "resetCapabilities")]
    pub reset_capabilities: ResetCapabilities,
    #[serde(rename = "resetHistoryStatus")]
    pub reset_history_status: ResetHistoryStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStatusEntries {
    pub event_capabilities: EventCapabilities,
    pub event_status: EventStatus,
    pub event: Event,
    pub syslog: Syslog,
    pub event_syslog_status: EventSyslogStatus,
}

/// The backend nests the event status entries one level deeper under a key
/// of the same name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventStatusGroup {
    pub event_status_grp: EventStatusEntries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCfgGroup {
    pub event_throttle_cfg: EventThrottleCfg,
    pub event_reporting_cfg: EventReportingCfg,
    pub syslog_server_cfg: SyslogServerCfg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileManagementGroup {
    pub file_capabilities: FileCapabilities,
    pub file_status: FileStatus,
    pub data_transfer_cfg: DataTransferCfg,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemGroup {
    #[serde(rename = "SystemCapabilitiesGrp")]
    pub capabilities: SystemCapabilitiesGroup,
    pub system_status_grp: SystemStatusGroup,
    pub system_cfg_grp: SystemCfgGroup,
    pub reset_status_grp: ResetStatusGroup,
    pub event_status_grp: EventStatusGroup,
    pub event_cfg_grp: EventCfgGroup,
    pub file_management: FileManagementGroup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RfGroup {
    pub rf_capabilities_grp: EmptyGroup,
    pub rf_status_grp: EmptyGroup,
    pub rf_cfg_group: EmptyGroup,
}

/// The `Scte279Amplifier` sub-tree of a device creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scte279AmplifierPayload {
    pub system_grp: SystemGroup,
    pub rf_grp: RfGroup,
    pub networking_grp: EmptyGroup,
    pub pnm_grp: EmptyGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensors_serialize_in_pascal_case_and_accept_snake_case_drafts() {
        let sensor: Sensor = serde_yaml::from_str("id: 3\nunits_display: dBmV\n").unwrap();
        assert!(sensor.has_identifying_data());
        let value = serde_json::to_value(&sensor).unwrap();
        assert_eq!(value["Id"], 3);
        assert_eq!(value["UnitsDisplay"], "dBmV");
        assert_eq!(value["SensorType"], "1");
        assert!(value.get("units_display").is_none());
    }

    #[test]
    fn blank_sensor_has_no_identifying_data() {
        let sensor = Sensor {
            name: Some("   ".into()),
            ..Default::default()
        };
        assert!(!sensor.has_identifying_data());
        assert!(!Scte283Settings::with_blank_sensor().any_sensor_identified());
    }

    #[test]
    fn event_level_alone_does_not_make_a_record() {
        let mut event = Event::default();
        assert!(event.is_empty());
        event.text = "power supply failure".into();
        assert!(!event.is_empty());
    }

    #[test]
    fn data_transfer_base_uri_keeps_backend_spelling() {
        let value = serde_json::to_value(DataTransferCfg::default()).unwrap();
        assert!(value.get("remot_server_base_uri").is_some());
        assert!(value.get("remote_server_base_uri").is_none());
        assert_eq!(value["protocol"], "1");
    }

    #[test]
    fn empty_groups_serialize_as_objects() {
        let value = serde_json::to_value(RfGroup::default()).unwrap();
        assert_eq!(value, serde_json::json!({"rf_capabilities_grp": {}, "rf_status_grp": {}, "rf_cfg_group": {}}));
    }
}
