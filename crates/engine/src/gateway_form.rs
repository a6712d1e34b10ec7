//! Create/edit form for gateways.
//!
//! Virtual and real gateways keep separate field sets so switching the kind
//! back and forth does not lose what was typed. Only the selected kind is
//! sent.

use simctl_types::gateway::{DEFAULT_KEEP_ALIVE, DEFAULT_VIRTUAL_PORT, GatewayPort};
use simctl_types::device::DEFAULT_LOCATION_ADDRESS;
use simctl_types::{GatewayKind, GatewayPayload, GatewayRecord, Location};

use crate::keys;
use crate::validation::{FormError, is_ipv4, parse_optional};

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualGatewayFields {
    pub active: bool,
    pub name: String,
    pub mac_address: String,
    pub keep_alive: String,
    pub port: String,
}

impl Default for VirtualGatewayFields {
    fn default() -> Self {
        Self {
            active: true,
            name: String::new(),
            mac_address: String::new(),
            keep_alive: DEFAULT_KEEP_ALIVE.to_string(),
            port: DEFAULT_VIRTUAL_PORT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RealGatewayFields {
    pub active: bool,
    pub name: String,
    pub mac_address: String,
    pub ip: String,
    pub port: String,
}

impl Default for RealGatewayFields {
    fn default() -> Self {
        Self {
            active: true,
            name: String::new(),
            mac_address: String::new(),
            ip: String::new(),
            port: String::new(),
        }
    }
}

/// Position shared by both kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: String,
    pub address: String,
}

impl Default for GatewayLocation {
    fn default() -> Self {
        Self {
            latitude: 0.0,
            longitude: 0.0,
            altitude: String::new(),
            address: DEFAULT_LOCATION_ADDRESS.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GatewayForm {
    /// Stored id in edit mode; `None` creates a new gateway.
    pub id: Option<String>,
    pub kind: GatewayKind,
    pub virtual_fields: VirtualGatewayFields,
    pub real_fields: RealGatewayFields,
    pub location: GatewayLocation,
}

impl GatewayForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefills the form from a stored gateway. Only the field set matching
    /// the stored kind is filled; the other keeps its defaults.
    pub fn from_record(record: &GatewayRecord) -> Self {
        let mut form = Self {
            id: record.id().map(str::to_string),
            kind: record.kind(),
            ..Self::default()
        };
        match form.kind {
            GatewayKind::Virtual => {
                form.virtual_fields = VirtualGatewayFields {
                    active: record.active,
                    name: record.name.clone(),
                    mac_address: record.mac_address.clone(),
                    keep_alive: record.keep_alive.unwrap_or(DEFAULT_KEEP_ALIVE).to_string(),
                    port: if record.port.trim().is_empty() {
                        DEFAULT_VIRTUAL_PORT.to_string()
                    } else {
                        record.port.clone()
                    },
                };
            }
            GatewayKind::Real => {
                form.real_fields = RealGatewayFields {
                    active: record.active,
                    name: record.name.clone(),
                    mac_address: record.mac_address.clone(),
                    ip: record.ip.clone(),
                    port: record.port.clone(),
                };
            }
        }
        form.location.latitude = record.location.lat();
        form.location.longitude = record.location.lon();
        form.location.altitude = record.location.altitude.map(|alt| alt.to_string()).unwrap_or_default();
        form
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub fn toggle_kind(&mut self) {
        self.kind = self.kind.toggle();
    }

    /// Fills the MAC of the selected kind with 16 random hex digits.
    pub fn generate_mac(&mut self) {
        let mac = keys::gateway_mac();
        match self.kind {
            GatewayKind::Virtual => self.virtual_fields.mac_address = mac,
            GatewayKind::Real => self.real_fields.mac_address = mac,
        }
    }

    pub fn name(&self) -> &str {
        match self.kind {
            GatewayKind::Virtual => &self.virtual_fields.name,
            GatewayKind::Real => &self.real_fields.name,
        }
    }

    pub fn mac_address(&self) -> &str {
        match self.kind {
            GatewayKind::Virtual => &self.virtual_fields.mac_address,
            GatewayKind::Real => &self.real_fields.mac_address,
        }
    }

    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.location.latitude = latitude.clamp(-90.0, 90.0);
        self.location.longitude = longitude.clamp(-180.0, 180.0);
        self.location.address = DEFAULT_LOCATION_ADDRESS.to_string();
    }

    /// Builds the request body for the selected kind.
    ///
    /// Real gateways always send `keepAlive: 0` and their port as typed;
    /// virtual gateways send `ip: ""` and a numeric port.
    pub fn to_payload(&self) -> Result<GatewayPayload, FormError> {
        let name = self.name().trim();
        if name.is_empty() {
            return Err(FormError::MissingGatewayName);
        }
        let mac_address = self.mac_address().trim();
        if mac_address.is_empty() {
            return Err(FormError::MissingMacAddress);
        }
        let altitude = parse_optional::<f64>(&self.location.altitude)
            .map_err(|_| FormError::InvalidAltitude(self.location.altitude.trim().to_string()))?;
        let location = Location {
            altitude,
            ..Location::new(self.location.latitude, self.location.longitude)
        };

        let payload = match self.kind {
            GatewayKind::Virtual => {
                let fields = &self.virtual_fields;
                let keep_alive = parse_optional::<u32>(&fields.keep_alive)
                    .map_err(|_| FormError::InvalidKeepAlive(fields.keep_alive.trim().to_string()))?
                    .unwrap_or(DEFAULT_KEEP_ALIVE);
                let port = parse_optional::<u16>(&fields.port)
                    .ok()
                    .flatten()
                    .filter(|port| *port != 0)
                    .ok_or_else(|| FormError::InvalidPort(fields.port.trim().to_string()))?;
                GatewayPayload {
                    active: fields.active,
                    name: name.to_string(),
                    mac_address: mac_address.to_string(),
                    keep_alive,
                    port: GatewayPort::Number(port),
                    type_gateway: true,
                    ip: String::new(),
                    location,
                }
            }
            GatewayKind::Real => {
                let fields = &self.real_fields;
                let ip = fields.ip.trim();
                if !ip.is_empty() && !is_ipv4(ip) {
                    return Err(FormError::InvalidIpv4(ip.to_string()));
                }
                GatewayPayload {
                    active: fields.active,
                    name: name.to_string(),
                    mac_address: mac_address.to_string(),
                    keep_alive: 0,
                    port: GatewayPort::Text(fields.port.trim().to_string()),
                    type_gateway: false,
                    ip: ip.to_string(),
                    location,
                }
            }
        };
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::gateway::RecordId;

    #[test]
    fn virtual_payload_uses_defaults_and_blank_ip() {
        let mut form = GatewayForm::new();
        assert_eq!(form.to_payload(), Err(FormError::MissingGatewayName));
        form.virtual_fields.name = " gw-1 ".into();
        assert_eq!(form.to_payload(), Err(FormError::MissingMacAddress));
        form.generate_mac();

        let payload = form.to_payload().unwrap();
        assert_eq!(payload.name, "gw-1");
        assert_eq!(payload.mac_address.len(), 16);
        assert_eq!(payload.keep_alive, 30);
        assert_eq!(payload.port, GatewayPort::Number(1701));
        assert!(payload.type_gateway);
        assert_eq!(payload.ip, "");
        assert_eq!(payload.location, Location::new(0.0, 0.0));
    }

    #[test]
    fn real_payload_sends_zero_keep_alive_and_text_port() {
        let mut form = GatewayForm::new();
        form.toggle_kind();
        form.real_fields.name = "rooftop".into();
        form.real_fields.mac_address = "AA00BB11CC22DD33".into();
        form.real_fields.ip = "10.0.0.300".into();
        assert_eq!(form.to_payload(), Err(FormError::InvalidIpv4("10.0.0.300".into())));

        form.real_fields.ip = "10.0.0.30".into();
        form.real_fields.port = "1700".into();
        form.location.altitude = "12.5".into();
        let payload = form.to_payload().unwrap();
        assert_eq!(payload.keep_alive, 0);
        assert_eq!(payload.port, GatewayPort::Text("1700".into()));
        assert!(!payload.type_gateway);
        assert_eq!(payload.location.altitude, Some(12.5));
    }

    #[test]
    fn invalid_virtual_numbers_are_rejected() {
        let mut form = GatewayForm::new();
        form.virtual_fields.name = "gw".into();
        form.virtual_fields.mac_address = "00".into();
        form.virtual_fields.port = "0".into();
        assert_eq!(form.to_payload(), Err(FormError::InvalidPort("0".into())));
        form.virtual_fields.port = "1701".into();
        form.virtual_fields.keep_alive = "soon".into();
        assert_eq!(form.to_payload(), Err(FormError::InvalidKeepAlive("soon".into())));
    }

    #[test]
    fn from_record_fills_only_the_stored_kind() {
        let record = GatewayRecord {
            id: Some(RecordId::Plain("g1".into())),
            name: "north".into(),
            mac_address: "0011".into(),
            type_gateway: false,
            active: false,
            ip: "192.168.1.2".into(),
            port: "1700".into(),
            location: Location::new(45.0, 7.0),
            ..Default::default()
        };
        let mut form = GatewayForm::from_record(&record);
        assert!(form.is_edit());
        assert_eq!(form.kind, GatewayKind::Real);
        assert_eq!(form.real_fields.ip, "192.168.1.2");
        assert_eq!(form.virtual_fields, VirtualGatewayFields::default());

        form.toggle_kind();
        assert_eq!(form.name(), "");
        form.toggle_kind();
        assert_eq!(form.name(), "north");
        assert!(!form.to_payload().unwrap().active);
    }
}
