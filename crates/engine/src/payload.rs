//! Turns a [`DeviceDraft`] into the request body the backend expects.
//!
//! The flat `lorawan` record is always present. The `Scte279Amplifier`
//! sub-tree is added, as a sibling key, only for SCTE-283 devices. Before
//! anything is emitted, the payload flags are checked against the data they
//! depend on; a violation names the wizard position where it can be fixed.

use simctl_types::scte283::{
    EmptyGroup, EventCfgGroup, EventStatusEntries, EventStatusGroup, FileManagementGroup, ResetStatusGroup, RfGroup,
    Scte283Settings, SystemCapabilitiesGroup, SystemCfgGroup, SystemGroup, SystemStatusGroup,
};
use simctl_types::{DeviceKind, DevicePayload, LorawanPayload, Scte279AmplifierPayload};
use thiserror::Error;

use crate::draft::DeviceDraft;
use crate::wizard::{Section, SubTab};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConsistencyError {
    #[error("{}", fault_message(.0))]
    FaultWithoutEvent(DeviceKind),
    #[error("{}", system_message(.0))]
    SystemWithoutSensor(DeviceKind),
}

fn fault_message(kind: &DeviceKind) -> &'static str {
    if kind.is_scte283() {
        "The fault payload needs an event. Fill in the SCTE-283 event on the System tab."
    } else {
        "The fault payload is only available for SCTE-283 devices. Clear it on the Payload tab."
    }
}

fn system_message(kind: &DeviceKind) -> &'static str {
    if kind.is_scte283() {
        "The system payload needs a sensor. Give a sensor an id, name or units on the System tab."
    } else {
        "The system payload is only available for SCTE-283 devices. Clear it on the Payload tab."
    }
}

impl ConsistencyError {
    /// Wizard position where the operator can resolve the violation.
    pub fn redirect(&self) -> (Section, SubTab) {
        let kind = match self {
            ConsistencyError::FaultWithoutEvent(kind) | ConsistencyError::SystemWithoutSensor(kind) => *kind,
        };
        if kind.is_scte283() {
            (Section::Scte283, SubTab::System)
        } else {
            (Section::Lorawan, SubTab::Payload)
        }
    }
}

/// Verifies that every set payload flag has the data it reports on.
///
/// LoRaWAN-only devices have no SCTE-283 groups, so `fault` and `system`
/// can never be satisfied for them. `pnm` has no dependency.
pub fn check_consistency(draft: &DeviceDraft) -> Result<(), ConsistencyError> {
    let flags = draft.lorawan.payload.flags;
    let scte = draft.kind.is_scte283();
    if flags.fault && !(scte && !draft.scte283.event.is_empty()) {
        return Err(ConsistencyError::FaultWithoutEvent(draft.kind));
    }
    if flags.system && !(scte && draft.scte283.any_sensor_identified()) {
        return Err(ConsistencyError::SystemWithoutSensor(draft.kind));
    }
    Ok(())
}

/// Builds the create-device body.
///
/// Key presence depends only on the draft kind: the result carries an
/// `Scte279Amplifier` entry if and only if the draft is an SCTE-283 device.
pub fn assemble(draft: &DeviceDraft) -> Result<DevicePayload, ConsistencyError> {
    check_consistency(draft)?;
    Ok(DevicePayload {
        lorawan: lorawan_record(draft),
        scte279_amplifier: draft.kind.is_scte283().then(|| scte279_amplifier(&draft.scte283)),
    })
}

/// The flat LoRaWAN record; also the body of an update request.
pub fn lorawan_record(draft: &DeviceDraft) -> LorawanPayload {
    let general = &draft.general;
    let lorawan = &draft.lorawan;
    let gateway = general.gateway.as_ref();
    LorawanPayload {
        is_device_active: general.active,
        name: general.name.trim().to_string(),
        dev_eui: general.dev_eui.trim().to_string(),
        region: general.region.map(|region| region.as_str().to_string()).unwrap_or_default(),
        gateway: gateway.map(|gateway| gateway.name.clone()),
        gw_eui: gateway.map(|gateway| gateway.mac_address.clone()),
        otaa_supported: lorawan.activation.otaa_supported,
        app_key: lorawan.activation.app_key.clone(),
        dev_addr: lorawan.activation.dev_addr.clone(),
        nwk_s_key: lorawan.activation.nwk_s_key.clone(),
        app_s_key: lorawan.activation.app_s_key.clone(),
        rx1_delay: lorawan.class.rx1_delay.clone(),
        rx1_duration: lorawan.class.rx1_duration.clone(),
        rx1_data_rate_offset: lorawan.class.rx1_data_rate_offset.clone(),
        rx2_delay: lorawan.class.rx2_delay.clone(),
        rx2_duration: lorawan.class.rx2_duration.clone(),
        channel_frequency: lorawan.class.channel_frequency.clone(),
        data_rate: lorawan.class.data_rate.clone(),
        ack_timeout: lorawan.class.ack_timeout.clone(),
        class_b_supported: lorawan.class.class_b_supported,
        class_c_supported: lorawan.class.class_c_supported,
        uplink_data_rate: lorawan.frame.uplink_data_rate.clone(),
        f_port: lorawan.frame.f_port.clone(),
        retransmission: lorawan.frame.retransmission.clone(),
        f_cnt: lorawan.frame.f_cnt,
        f_cnt_down_disable: lorawan.frame.f_cnt_down_disable,
        f_cnt_down: lorawan.frame.f_cnt_down,
        adr_enabled: lorawan.features.adr_enabled,
        range_antenna: lorawan.features.range_antenna.clone(),
        uplink_interval: lorawan.payload.uplink_interval.clone(),
        payload_exceeds_action: lorawan.payload.exceeds_action,
        m_type: lorawan.payload.m_type,
        payload_content: lorawan.payload.content.clone(),
        payload: lorawan.payload.flags,
        base64_encoded: lorawan.payload.base64_encoded,
        location: lorawan.location.to_location(),
    }
}

/// The `Scte279Amplifier` sub-tree. RF, networking and PNM groups are sent
/// empty until the backend defines their contents.
pub fn scte279_amplifier(settings: &Scte283Settings) -> Scte279AmplifierPayload {
    let s = settings.clone();
    Scte279AmplifierPayload {
        system_grp: SystemGroup {
            capabilities: SystemCapabilitiesGroup {
                system_capabilities: s.system_capabilities,
            },
            system_status_grp: SystemStatusGroup {
                system_status: s.system_status,
                identification: s.identification,
                vendor: s.vendor,
                version_summary: s.version_summary,
                enclosure: s.enclosure,
                sensors: s.sensors,
                power_supply: s.power_supply,
                output_rail: s.output_rail,
            },
            system_cfg_grp: SystemCfgGroup {
                system_cfg: s.system_cfg,
                location: s.site_location,
            },
            reset_status_grp: ResetStatusGroup {
                reset_capabilities: s.reset_capabilities,
                reset_history_status: s.reset_history_status,
            },
            event_status_grp: EventStatusGroup {
                event_status_grp: EventStatusEntries {
                    event_capabilities: s.event_capabilities,
                    event_status: s.event_status,
                    event: s.event,
                    syslog: s.syslog,
                    event_syslog_status: s.event_syslog_status,
                },
            },
            event_cfg_grp: EventCfgGroup {
                event_throttle_cfg: s.event_throttle_cfg,
                event_reporting_cfg: s.event_reporting_cfg,
                syslog_server_cfg: s.syslog_server_cfg,
            },
            file_management: FileManagementGroup {
                file_capabilities: s.file_capabilities,
                file_status: s.file_status,
                data_transfer_cfg: s.data_transfer_cfg,
            },
        },
        rf_grp: RfGroup::default(),
        networking_grp: EmptyGroup::default(),
        pnm_grp: EmptyGroup::default(),
    }
}
