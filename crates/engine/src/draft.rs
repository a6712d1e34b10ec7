//! The device draft edited by the wizard.
//!
//! A [`DeviceDraft`] is grouped the same way the wizard is: General,
//! LoRaWAN and SCTE-283 settings, plus the device kind flag that decides
//! whether the SCTE-283 section exists at all. It is created fresh (or
//! hydrated from a stored record in edit mode), mutated field by field, and
//! consumed by the payload assembler when the operator submits.

use serde::{Deserialize, Serialize};
use simctl_types::device::{GatewayRef, GeneralSettings, LorawanSettings, LocationSettings};
use simctl_types::scte283::{Scte283Settings, Sensor};
use simctl_types::{DeviceKind, GatewayRecord, LorawanPayload, Region};
use tracing::debug;

use crate::validation::{RequiredField, missing_required};

/// Latitude used when a stored device carries no usable position.
pub const EDIT_DEFAULT_LATITUDE: f64 = 6.195;
/// Longitude used when a stored device carries no usable position.
pub const EDIT_DEFAULT_LONGITUDE: f64 = 1.0;

/// Map clicks and searches keep six decimals (about 10 cm).
const COORDINATE_SCALE: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceDraft {
    pub kind: DeviceKind,
    pub general: GeneralSettings,
    pub lorawan: LorawanSettings,
    pub scte283: Scte283Settings,
}

impl DeviceDraft {
    /// Fresh draft with defaults. SCTE-283 drafts start with one blank sensor row.
    pub fn new(kind: DeviceKind) -> Self {
        let scte283 = if kind.is_scte283() {
            Scte283Settings::with_blank_sensor()
        } else {
            Scte283Settings::default()
        };
        Self {
            kind,
            general: GeneralSettings {
                active: true,
                ..Default::default()
            },
            lorawan: LorawanSettings::default(),
            scte283,
        }
    }

    /// Fresh draft with a preselected region.
    pub fn with_region(kind: DeviceKind, region: Option<Region>) -> Self {
        let mut draft = Self::new(kind);
        draft.general.region = region;
        draft
    }

    /// Rebuild a draft from a stored record for edit mode.
    ///
    /// Missing values fall back to the new-draft defaults. A zero or missing
    /// latitude/longitude becomes [`EDIT_DEFAULT_LATITUDE`] /
    /// [`EDIT_DEFAULT_LONGITUDE`]. The gateway is resolved by name against
    /// `gateways`; when it is not in the list, the stored name and `gwEUI`
    /// are kept so an edit does not silently detach the device.
    pub fn hydrate(record: &LorawanPayload, gateways: &[GatewayRecord]) -> Self {
        let mut draft = Self::new(DeviceKind::Lorawan);

        let stored_gateway = record.gateway.as_deref().map(str::trim).filter(|name| !name.is_empty());
        let gateway = stored_gateway.map(|name| {
            gateways
                .iter()
                .find(|candidate| candidate.name == name)
                .map(gateway_ref)
                .unwrap_or_else(|| GatewayRef {
                    name: name.to_string(),
                    mac_address: record.gw_eui.clone().unwrap_or_default(),
                })
        });

        draft.general = GeneralSettings {
            active: record.is_device_active,
            name: record.name.clone(),
            dev_eui: record.dev_eui.clone(),
            region: record.region.parse().ok(),
            gateway,
        };

        let lorawan = &mut draft.lorawan;
        lorawan.activation.otaa_supported = record.otaa_supported;
        lorawan.activation.app_key = record.app_key.clone();
        lorawan.activation.dev_addr = record.dev_addr.clone();
        lorawan.activation.nwk_s_key = record.nwk_s_key.clone();
        lorawan.activation.app_s_key = record.app_s_key.clone();

        lorawan.class.rx1_delay = record.rx1_delay.clone();
        lorawan.class.rx1_duration = record.rx1_duration.clone();
        lorawan.class.rx1_data_rate_offset = record.rx1_data_rate_offset.clone();
        lorawan.class.rx2_delay = record.rx2_delay.clone();
        lorawan.class.rx2_duration = record.rx2_duration.clone();
        lorawan.class.channel_frequency = record.channel_frequency.clone();
        lorawan.class.data_rate = record.data_rate.clone();
        lorawan.class.ack_timeout = record.ack_timeout.clone();
        lorawan.class.class_b_supported = record.class_b_supported;
        lorawan.class.class_c_supported = record.class_c_supported;

        lorawan.frame.uplink_data_rate = record.uplink_data_rate.clone();
        lorawan.frame.f_port = record.f_port.clone();
        lorawan.frame.retransmission = record.retransmission.clone();
        lorawan.frame.f_cnt = record.f_cnt;
        lorawan.frame.f_cnt_down_disable = record.f_cnt_down_disable;
        lorawan.frame.f_cnt_down = record.f_cnt_down;

        lorawan.features.adr_enabled = record.adr_enabled;
        lorawan.features.range_antenna = record.range_antenna.clone();

        lorawan.payload.uplink_interval = record.uplink_interval.clone();
        lorawan.payload.exceeds_action = record.payload_exceeds_action;
        lorawan.payload.m_type = record.m_type;
        lorawan.payload.content = record.payload_content.clone();
        lorawan.payload.base64_encoded = record.base64_encoded;
        lorawan.payload.flags = record.payload;

        lorawan.location = LocationSettings {
            latitude: nonzero(record.location.latitude).unwrap_or(EDIT_DEFAULT_LATITUDE),
            longitude: nonzero(record.location.longitude).unwrap_or(EDIT_DEFAULT_LONGITUDE),
            altitude: nonzero(record.location.altitude),
            ..LocationSettings::default()
        };

        debug!(dev_eui = %record.dev_eui, "hydrated device draft");
        draft
    }

    /// Back to a blank draft of the same kind, keeping nothing.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }

    pub fn missing_required(&self) -> Vec<RequiredField> {
        missing_required(&self.general)
    }

    pub fn select_gateway(&mut self, gateway: &GatewayRecord) {
        self.general.gateway = Some(gateway_ref(gateway));
    }

    pub fn add_sensor(&mut self) {
        self.scte283.sensors.push(Sensor::default());
    }

    /// Removes the sensor row at `index`; out-of-range indices are ignored.
    pub fn remove_sensor(&mut self, index: usize) -> bool {
        if index < self.scte283.sensors.len() {
            self.scte283.sensors.remove(index);
            true
        } else {
            false
        }
    }

    /// Move the device marker. Coordinates are rounded to six decimals and the
    /// address resets to its placeholder until the next reverse geocode.
    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        let location = &mut self.lorawan.location;
        location.latitude = round_coordinate(latitude.clamp(-90.0, 90.0));
        location.longitude = round_coordinate(longitude.clamp(-180.0, 180.0));
        location.address = LocationSettings::default().address;
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.lorawan.location.address = address.into();
    }

    pub fn coordinates(&self) -> (f64, f64) {
        (self.lorawan.location.latitude, self.lorawan.location.longitude)
    }
}

fn gateway_ref(gateway: &GatewayRecord) -> GatewayRef {
    GatewayRef {
        name: gateway.name.clone(),
        mac_address: gateway.mac_address.clone(),
    }
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && v.is_finite())
}

fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round() / COORDINATE_SCALE
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::device::MessageType;
    use simctl_types::Location;

    fn gateway(name: &str, mac: &str) -> GatewayRecord {
        GatewayRecord {
            name: name.into(),
            mac_address: mac.into(),
            ..Default::default()
        }
    }

    #[test]
    fn new_drafts_differ_only_in_scte_sensors() {
        let lorawan = DeviceDraft::new(DeviceKind::Lorawan);
        let scte = DeviceDraft::new(DeviceKind::Scte283);
        assert!(lorawan.scte283.sensors.is_empty());
        assert_eq!(scte.scte283.sensors.len(), 1);
        assert!(!scte.scte283.any_sensor_identified());
        assert!(lorawan.general.active);
        assert_eq!(lorawan.lorawan.location.latitude, 1.0);
    }

    #[test]
    fn hydrate_resolves_gateway_and_defaults_location() {
        let record = LorawanPayload {
            name: "dev1".into(),
            dev_eui: "AABBCCDDEEFF0011".into(),
            region: "EU868".into(),
            gateway: Some("gw1".into()),
            m_type: MessageType::UnConfirmedDataUp,
            location: Location {
                latitude: Some(0.0),
                longitude: None,
                altitude: Some(12.5),
            },
            ..Default::default()
        };
        let draft = DeviceDraft::hydrate(&record, &[gateway("gw0", "00"), gateway("gw1", "0011223344556677")]);

        assert_eq!(draft.general.region, Some(Region::Eu868));
        assert_eq!(draft.general.gateway.as_ref().unwrap().mac_address, "0011223344556677");
        assert_eq!(draft.coordinates(), (EDIT_DEFAULT_LATITUDE, EDIT_DEFAULT_LONGITUDE));
        assert_eq!(draft.lorawan.location.altitude, Some(12.5));
        assert_eq!(draft.lorawan.payload.m_type, MessageType::UnConfirmedDataUp);
        assert!(draft.missing_required().is_empty());
    }

    #[test]
    fn hydrate_keeps_unknown_gateway_and_blank_region() {
        let record = LorawanPayload {
            gateway: Some("retired".into()),
            gw_eui: Some("FFEE".into()),
            region: "nowhere".into(),
            ..Default::default()
        };
        let draft = DeviceDraft::hydrate(&record, &[]);
        let gateway = draft.general.gateway.unwrap();
        assert_eq!((gateway.name.as_str(), gateway.mac_address.as_str()), ("retired", "FFEE"));
        assert_eq!(draft.general.region, None);
    }

    #[test]
    fn reset_and_sensor_editing() {
        let mut draft = DeviceDraft::new(DeviceKind::Scte283);
        draft.general.name = "amp".into();
        draft.add_sensor();
        assert!(draft.remove_sensor(0));
        assert!(!draft.remove_sensor(5));
        assert_eq!(draft.scte283.sensors.len(), 1);

        draft.reset();
        assert_eq!(draft, DeviceDraft::new(DeviceKind::Scte283));
    }

    #[test]
    fn coordinates_are_rounded_and_clear_the_address() {
        let mut draft = DeviceDraft::new(DeviceKind::Lorawan);
        draft.set_address("Lome, Togo");
        draft.set_coordinates(6.13751234, 1.21231299);
        assert_eq!(draft.coordinates(), (6.137512, 1.212313));
        assert_eq!(draft.lorawan.location.address, "Device Location");
    }
}
