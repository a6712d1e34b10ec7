//! Gateway records and the gateway create/update request body.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::{Location, SimulatorStatus};
use crate::lenient;

/// Default keep-alive interval, in seconds, for a new virtual gateway.
pub const DEFAULT_KEEP_ALIVE: u32 = 30;
/// Default UDP port for a new virtual gateway.
pub const DEFAULT_VIRTUAL_PORT: u16 = 1701;

/// Whether the backend simulates the gateway or forwards to real hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GatewayKind {
    #[default]
    Virtual,
    Real,
}

impl GatewayKind {
    /// The backend stores the kind as a boolean `typeGateway` (true = virtual).
    pub fn from_type_flag(type_gateway: bool) -> Self {
        if type_gateway { GatewayKind::Virtual } else { GatewayKind::Real }
    }

    pub fn type_flag(&self) -> bool {
        matches!(self, GatewayKind::Virtual)
    }

    pub fn toggle(&self) -> Self {
        match self {
            GatewayKind::Virtual => GatewayKind::Real,
            GatewayKind::Real => GatewayKind::Virtual,
        }
    }
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayKind::Virtual => f.write_str("Virtual"),
            GatewayKind::Real => f.write_str("Real"),
        }
    }
}

/// Identifier of a stored record. The backend serializes its object ids as
/// `{"$oid": "..."}`, older records carry a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Object {
        #[serde(rename = "$oid")]
        oid: String,
    },
    Plain(String),
}

impl RecordId {
    pub fn as_str(&self) -> &str {
        match self {
            RecordId::Object { oid } => oid,
            RecordId::Plain(id) => id,
        }
    }
}

/// One gateway as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRecord {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub mac_address: String,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub type_gateway: bool,
    #[serde(default, deserialize_with = "lenient::bool_or_false")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient::optional_u32")]
    pub keep_alive: Option<u32>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub port: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub ip: String,
    #[serde(default)]
    pub location: Location,
    #[serde(rename = "connected_devices", default, deserialize_with = "lenient::optional_u32")]
    pub connected_devices: Option<u32>,
    #[serde(rename = "disconnected_devices", default, deserialize_with = "lenient::optional_u32")]
    pub disconnected_devices: Option<u32>,
    #[serde(rename = "no_of_devices", default, deserialize_with = "lenient::optional_u32")]
    pub device_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,
}

impl GatewayRecord {
    pub fn id(&self) -> Option<&str> {
        self.id.as_ref().map(RecordId::as_str)
    }

    pub fn kind(&self) -> GatewayKind {
        GatewayKind::from_type_flag(self.type_gateway)
    }

    /// Missing or unknown statuses read as paused.
    pub fn simulator_status(&self) -> SimulatorStatus {
        match self.current_status.as_deref() {
            Some("playing") => SimulatorStatus::Playing,
            _ => SimulatorStatus::Paused,
        }
    }

    /// True when the record carries a usable position for map markers.
    pub fn has_position(&self) -> bool {
        self.location.lat() != 0.0 && self.location.lon() != 0.0
    }
}

/// Port value sent to the backend: virtual gateways send a number, real
/// gateways send whatever the operator typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GatewayPort {
    Number(u16),
    Text(String),
}

/// Body of a gateway create or update request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayPayload {
    pub active: bool,
    pub name: String,
    pub mac_address: String,
    pub keep_alive: u32,
    pub port: GatewayPort,
    pub type_gateway: bool,
    pub ip: String,
    pub location: Location,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_record_reads_object_ids_and_string_ports() {
        let raw = r#"{
            "_id": {"$oid": "66b0c0ffee"},
            "name": "gw-north",
            "macAddress": "00AA11BB22CC33DD",
            "typeGateway": false,
            "port": 1700,
            "ip": "10.0.0.5",
            "location": {"latitude": 45.1, "longitude": 7.6},
            "connected_devices": 4,
            "disconnected_devices": "1"
        }"#;
        let record: GatewayRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.id(), Some("66b0c0ffee"));
        assert_eq!(record.kind(), GatewayKind::Real);
        assert_eq!(record.port, "1700");
        assert_eq!(record.connected_devices, Some(4));
        assert_eq!(record.disconnected_devices, Some(1));
        assert!(record.has_position());
    }

    #[test]
    fn payload_keeps_port_shape() {
        let payload = GatewayPayload {
            active: true,
            name: "gw".into(),
            mac_address: "0011223344556677".into(),
            keep_alive: DEFAULT_KEEP_ALIVE,
            port: GatewayPort::Number(DEFAULT_VIRTUAL_PORT),
            type_gateway: true,
            ip: String::new(),
            location: Location::new(1.5, 2.5),
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["port"], 1701);
        assert_eq!(value["macAddress"], "0011223344556677");
        assert_eq!(value["keepAlive"], 30);
        assert_eq!(value["typeGateway"], true);
        assert_eq!(value["ip"], "");
    }
}
