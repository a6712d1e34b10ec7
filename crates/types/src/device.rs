//! Device model: the grouped settings edited by the device wizard and the
//! LoRaWAN record exchanged with the backend.
//!
//! The settings groups use snake_case field names so drafts can be authored
//! as JSON/YAML files. The wire record ([`LorawanPayload`]) mirrors the
//! backend's camelCase keys exactly, including its irregular spellings
//! (`devEUI`, `gwEUI`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;
use crate::scte283::Scte279AmplifierPayload;

/// Device profile selected when the wizard is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    /// Plain LoRaWAN end node.
    #[default]
    Lorawan,
    /// SCTE-283 amplifier; carries the LoRaWAN settings plus the amplifier model.
    Scte283,
}

impl DeviceKind {
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Lorawan => "LoRaWAN",
            DeviceKind::Scte283 => "SCTE283",
        }
    }

    pub fn is_scte283(&self) -> bool {
        matches!(self, DeviceKind::Scte283)
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DeviceKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lorawan" => Ok(DeviceKind::Lorawan),
            "scte283" | "scte-283" => Ok(DeviceKind::Scte283),
            _ => Err(ParseEnumError::new("device kind", s, "lorawan, scte283")),
        }
    }
}

/// LoRaWAN regional parameter set offered by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "US915")]
    Us915,
    #[serde(rename = "EU868")]
    Eu868,
    #[serde(rename = "AS923")]
    As923,
    #[serde(rename = "AU915")]
    Au915,
}

impl Region {
    pub const ALL: [Region; 4] = [Region::Us915, Region::Eu868, Region::As923, Region::Au915];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Us915 => "US915",
            Region::Eu868 => "EU868",
            Region::As923 => "AS923",
            Region::Au915 => "AU915",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .into_iter()
            .find(|region| region.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseEnumError::new("region", s, "US915, EU868, AS923, AU915"))
    }
}

/// Error returned when a textual enum value is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    what: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseEnumError {
    fn new(what: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            what,
            value: value.to_string(),
            expected,
        }
    }
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} '{}'; expected one of {}", self.what, self.value, self.expected)
    }
}

impl std::error::Error for ParseEnumError {}

/// Reference to the gateway a device is attached to.
///
/// The backend identifies the gateway of a device by name and stores the
/// gateway MAC as the device's `gwEUI`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GatewayRef {
    pub name: String,
    #[serde(default)]
    pub mac_address: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub active: bool,
    pub name: String,
    pub dev_eui: String,
    pub region: Option<Region>,
    pub gateway: Option<GatewayRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationSettings {
    pub otaa_supported: bool,
    pub app_key: String,
    pub dev_addr: String,
    pub nwk_s_key: String,
    pub app_s_key: String,
}

/// Receive-window and class capability settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassSettings {
    pub rx1_delay: String,
    pub rx1_duration: String,
    pub rx1_data_rate_offset: String,
    pub rx2_delay: String,
    pub rx2_duration: String,
    pub channel_frequency: String,
    pub data_rate: String,
    pub ack_timeout: String,
    pub class_b_supported: bool,
    pub class_c_supported: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSettings {
    pub uplink_data_rate: String,
    pub f_port: String,
    pub retransmission: String,
    pub f_cnt: u32,
    pub f_cnt_down_disable: bool,
    pub f_cnt_down: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureSettings {
    pub adr_enabled: bool,
    pub range_antenna: String,
}

/// What the simulator does with an uplink payload that exceeds the
/// region's maximum size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PayloadExceedsAction {
    #[default]
    Fragments,
    Truncates,
}

impl PayloadExceedsAction {
    pub fn toggle(&self) -> Self {
        match self {
            PayloadExceedsAction::Fragments => PayloadExceedsAction::Truncates,
            PayloadExceedsAction::Truncates => PayloadExceedsAction::Fragments,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadExceedsAction::Fragments => "fragments",
            PayloadExceedsAction::Truncates => "truncates",
        }
    }
}

impl<'de> Deserialize<'de> for PayloadExceedsAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::string(deserializer)?;
        Ok(match raw.as_str() {
            "truncates" => PayloadExceedsAction::Truncates,
            _ => PayloadExceedsAction::Fragments,
        })
    }
}

/// LoRaWAN uplink message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum MessageType {
    #[default]
    ConfirmedDataUp,
    UnConfirmedDataUp,
}

impl MessageType {
    pub fn toggle(&self) -> Self {
        match self {
            MessageType::ConfirmedDataUp => MessageType::UnConfirmedDataUp,
            MessageType::UnConfirmedDataUp => MessageType::ConfirmedDataUp,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::ConfirmedDataUp => "ConfirmedDataUp",
            MessageType::UnConfirmedDataUp => "UnConfirmedDataUp",
        }
    }
}

impl<'de> Deserialize<'de> for MessageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::string(deserializer)?;
        Ok(match raw.as_str() {
            "UnConfirmedDataUp" => MessageType::UnConfirmedDataUp,
            _ => MessageType::ConfirmedDataUp,
        })
    }
}

/// Payload categories carried in simulated uplinks.
///
/// `system` and `fault` require supporting data elsewhere in the draft; the
/// payload assembler enforces that before a submission leaves the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadFlags {
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub system: bool,
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub fault: bool,
    #[serde(deserialize_with = "lenient::bool_or_false")]
    pub pnm: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayloadSettings {
    pub uplink_interval: String,
    pub exceeds_action: PayloadExceedsAction,
    pub m_type: MessageType,
    pub content: String,
    pub base64_encoded: bool,
    pub flags: PayloadFlags,
}

/// Geographic position. `altitude` is omitted from the wire when unset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    #[serde(serialize_with = "serialize_coordinate")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_f64")]
    #[serde(serialize_with = "serialize_coordinate")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_f64", skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}

fn serialize_coordinate<S>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(value.unwrap_or_default())
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            altitude: None,
        }
    }

    pub fn lat(&self) -> f64 {
        self.latitude.unwrap_or_default()
    }

    pub fn lon(&self) -> f64 {
        self.longitude.unwrap_or_default()
    }
}

/// Placeholder address shown until a reverse geocode resolves.
pub const DEFAULT_LOCATION_ADDRESS: &str = "Device Location";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationSettings {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub address: String,
}

impl Default for LocationSettings {
    fn default() -> Self {
        Self {
            latitude: 1.0,
            longitude: 1.0,
            altitude: None,
            address: DEFAULT_LOCATION_ADDRESS.to_string(),
        }
    }
}

impl LocationSettings {
    pub fn to_location(&self) -> Location {
        Location {
            latitude: Some(self.latitude),
            longitude: Some(self.longitude),
            altitude: self.altitude,
        }
    }
}

/// All LoRaWAN-specific settings, one group per wizard sub-tab.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LorawanSettings {
    pub activation: ActivationSettings,
    pub class: ClassSettings,
    pub frame: FrameSettings,
    pub features: FeatureSettings,
    pub location: LocationSettings,
    pub payload: PayloadSettings,
}

/// Flat LoRaWAN device record as stored by the backend.
///
/// This is both the `lorawan` sub-tree of a create request, the body of an
/// update request, and the shape returned when a single device is fetched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LorawanPayload {
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub is_device_active: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "devEUI", default, deserialize_with = "lenient::string")]
    pub dev_eui: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(rename = "gwEUI", default, skip_serializing_if = "Option::is_none")]
    pub gw_eui: Option<String>,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub otaa_supported: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub app_key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dev_addr: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub nwk_s_key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub app_s_key: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rx1_delay: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rx1_duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rx1_data_rate_offset: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rx2_delay: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub rx2_duration: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub channel_frequency: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub data_rate: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ack_timeout: String,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub class_b_supported: bool,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub class_c_supported: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uplink_data_rate: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub f_port: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub retransmission: String,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub f_cnt: u32,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub f_cnt_down_disable: bool,
    #[serde(default, deserialize_with = "lenient::optional_u32", skip_serializing_if = "Option::is_none")]
    pub f_cnt_down: Option<u32>,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub adr_enabled: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub range_antenna: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub uplink_interval: String,
    #[serde(default)]
    pub payload_exceeds_action: PayloadExceedsAction,
    #[serde(default)]
    pub m_type: MessageType,
    #[serde(default, deserialize_with = "lenient::string")]
    pub payload_content: String,
    #[serde(default)]
    pub payload: PayloadFlags,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub base64_encoded: bool,
    #[serde(default)]
    pub location: Location,
}

/// Request body for device creation.
///
/// `Scte279Amplifier` sits next to `lorawan` and is present only for SCTE-283
/// devices.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevicePayload {
    pub lorawan: LorawanPayload,
    #[serde(rename = "Scte279Amplifier", skip_serializing_if = "Option::is_none")]
    pub scte279_amplifier: Option<Scte279AmplifierPayload>,
}

/// Simulator state reported for a device or gateway row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimulatorStatus {
    Playing,
    #[default]
    Paused,
}

impl SimulatorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulatorStatus::Playing => "playing",
            SimulatorStatus::Paused => "paused",
        }
    }
}

/// Uplink generator state reported for a device or gateway row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UplinkStatus {
    Running,
    #[default]
    Stopped,
}

impl UplinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UplinkStatus::Running => "running",
            UplinkStatus::Stopped => "stopped",
        }
    }
}

/// Simulator control requests shared by devices and gateways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulatorAction {
    /// Start the simulator (LoRaWAN join).
    Join,
    /// Stop the simulator (unjoin).
    Unjoin,
    StartUplink,
    StopUplink,
}

impl SimulatorAction {
    pub fn label(&self) -> &'static str {
        match self {
            SimulatorAction::Join => "start simulator",
            SimulatorAction::Unjoin => "stop simulator",
            SimulatorAction::StartUplink => "start uplink",
            SimulatorAction::StopUplink => "stop uplink",
        }
    }
}

impl fmt::Display for SimulatorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the device list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeviceSummary {
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "devEUI", default, deserialize_with = "lenient::string")]
    pub dev_eui: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub gateway: String,
    #[serde(rename = "currentStatus", default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,
    #[serde(rename = "uplinkStatus", default, skip_serializing_if = "Option::is_none")]
    pub uplink_status: Option<String>,
}

impl DeviceSummary {
    /// Missing or unknown statuses read as paused.
    pub fn simulator_status(&self) -> SimulatorStatus {
        match self.current_status.as_deref() {
            Some("playing") => SimulatorStatus::Playing,
            _ => SimulatorStatus::Paused,
        }
    }

    /// Missing or unknown statuses read as stopped.
    pub fn uplink_status(&self) -> UplinkStatus {
        match self.uplink_status.as_deref() {
            Some("running") => UplinkStatus::Running,
            _ => UplinkStatus::Stopped,
        }
    }

    pub fn set_simulator_status(&mut self, status: SimulatorStatus) {
        self.current_status = Some(status.as_str().to_string());
    }

    pub fn set_uplink_status(&mut self, status: UplinkStatus) {
        self.uplink_status = Some(status.as_str().to_string());
    }
}

/// Body of a bulk device creation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkDeviceRequest {
    #[serde(rename = "numberOfDevices")]
    pub number_of_devices: u32,
    pub name: String,
    pub gateway: String,
    pub region: Region,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct BulkDeviceResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    pub inserted_count: Option<u32>,
}

impl BulkDeviceResponse {
    pub fn summary(&self) -> String {
        match &self.message {
            Some(message) if !message.is_empty() => message.clone(),
            _ => format!("Successfully created {} devices.", self.inserted_count.unwrap_or_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lorawan_payload_uses_backend_key_spelling() {
        let payload = LorawanPayload {
            dev_eui: "AABBCCDDEEFF0011".into(),
            gateway: Some("gw1".into()),
            gw_eui: Some("0011223344556677".into()),
            nwk_s_key: "00".into(),
            f_cnt_down: None,
            ..Default::default()
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["devEUI"], "AABBCCDDEEFF0011");
        assert_eq!(value["gwEUI"], "0011223344556677");
        assert_eq!(value["nwkSKey"], "00");
        assert_eq!(value["isDeviceActive"], false);
        assert_eq!(value["mType"], "ConfirmedDataUp");
        assert_eq!(value["payloadExceedsAction"], "fragments");
        assert!(value.get("fCntDown").is_none());
        assert!(value["location"].get("altitude").is_none());
    }

    #[test]
    fn stored_record_with_mixed_types_deserializes() {
        let raw = r#"{
            "isDeviceActive": true,
            "name": "meter-7",
            "devEUI": "0102030405060708",
            "gateway": "gw-north",
            "fCnt": "42",
            "rx1Delay": 1,
            "mType": "",
            "location": {"latitude": "45.5", "longitude": -73.6}
        }"#;
        let record: LorawanPayload = serde_json::from_str(raw).unwrap();
        assert!(record.is_device_active);
        assert_eq!(record.f_cnt, 42);
        assert_eq!(record.rx1_delay, "1");
        assert_eq!(record.m_type, MessageType::ConfirmedDataUp);
        assert_eq!(record.location.latitude, Some(45.5));
        assert_eq!(record.location.altitude, None);
    }

    #[test]
    fn device_rows_default_to_paused_and_stopped() {
        let row: DeviceSummary = serde_json::from_str(r#"{"name": "a", "devEUI": "01", "currentStatus": null}"#).unwrap();
        assert_eq!(row.simulator_status(), SimulatorStatus::Paused);
        assert_eq!(row.uplink_status(), UplinkStatus::Stopped);
    }

    #[test]
    fn region_and_kind_parse_case_insensitively() {
        assert_eq!("eu868".parse::<Region>().unwrap(), Region::Eu868);
        assert_eq!("SCTE283".parse::<DeviceKind>().unwrap(), DeviceKind::Scte283);
        assert!("XX000".parse::<Region>().is_err());
    }

    #[test]
    fn bulk_summary_prefers_backend_message() {
        let with_message = BulkDeviceResponse {
            message: Some("Created 5 devices".into()),
            inserted_count: Some(5),
        };
        assert_eq!(with_message.summary(), "Created 5 devices");
        let counted = BulkDeviceResponse {
            message: None,
            inserted_count: Some(3),
        };
        assert_eq!(counted.summary(), "Successfully created 3 devices.");
    }
}
