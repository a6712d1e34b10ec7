//! Field lists of the device wizard, one per sub-tab.

use simctl_engine::keys;
use simctl_engine::validation::is_hex_of_len;
use simctl_engine::wizard::SubTab;
use simctl_engine::DeviceDraft;
use simctl_types::Region;

use crate::ui::components::common::form::{self, FormField};

type Fields = Vec<FormField<DeviceDraft>>;

fn is_dev_eui(value: &str) -> bool {
    is_hex_of_len(value.trim(), keys::DEV_EUI_LEN)
}

fn is_session_key(value: &str) -> bool {
    is_hex_of_len(value.trim(), keys::SESSION_KEY_LEN)
}

fn is_dev_addr(value: &str) -> bool {
    is_hex_of_len(value.trim(), keys::DEV_ADDR_LEN)
}

/// Fields shown on `tab`. Sensor fields depend on how many sensors the draft
/// holds, so the list is rebuilt from the draft on every use.
pub fn fields_for(tab: SubTab, draft: &DeviceDraft) -> Fields {
    match tab {
        SubTab::Device => device_fields(),
        SubTab::Activation => activation_fields(),
        SubTab::Class => class_fields(),
        SubTab::FrameSettings => frame_fields(),
        SubTab::Features => feature_fields(),
        SubTab::Location => location_fields(),
        SubTab::Payload => payload_fields(),
        SubTab::System => system_fields(draft.scte283.sensors.len()),
        SubTab::Rf => rf_fields(),
        SubTab::Networking => networking_fields(),
        SubTab::Pnm => pnm_fields(),
    }
}

fn device_fields() -> Fields {
    vec![
        form::toggle("Active", |d: &DeviceDraft| &d.general.active, |d: &mut DeviceDraft| &mut d.general.active),
        form::text("Name", |d: &DeviceDraft| &d.general.name, |d: &mut DeviceDraft| &mut d.general.name).required(),
        form::text("DevEUI", |d: &DeviceDraft| &d.general.dev_eui, |d: &mut DeviceDraft| &mut d.general.dev_eui)
            .required()
            .generated(keys::dev_eui)
            .validated(is_dev_eui),
        form::choice(
            "Region",
            |d: &DeviceDraft| d.general.region.map(|region| region.as_str().to_string()).unwrap_or_else(|| "-".to_string()),
            |d: &mut DeviceDraft, _, forward| {
                let current = d.general.region.and_then(|region| Region::ALL.iter().position(|r| *r == region));
                d.general.region = form::cycle_index(current, Region::ALL.len(), forward).map(|index| Region::ALL[index]);
            },
        )
        .required(),
        form::choice(
            "Gateway",
            |d: &DeviceDraft| {
                d.general
                    .gateway
                    .as_ref()
                    .map(|gateway| gateway.name.clone())
                    .unwrap_or_else(|| "-".to_string())
            },
            |d: &mut DeviceDraft, ctx, forward| {
                let current = d
                    .general
                    .gateway
                    .as_ref()
                    .and_then(|selected| ctx.gateways.iter().position(|gateway| gateway.name == selected.name));
                if let Some(next) = form::cycle_index(current, ctx.gateways.len(), forward) {
                    d.select_gateway(&ctx.gateways[next]);
                }
            },
        )
        .required(),
    ]
}

fn activation_fields() -> Fields {
    vec![
        form::toggle(
            "OTAA supported",
            |d: &DeviceDraft| &d.lorawan.activation.otaa_supported,
            |d: &mut DeviceDraft| &mut d.lorawan.activation.otaa_supported,
        ),
        form::text(
            "AppKey",
            |d: &DeviceDraft| &d.lorawan.activation.app_key,
            |d: &mut DeviceDraft| &mut d.lorawan.activation.app_key,
        )
        .masked()
        .generated(keys::session_key)
        .validated(is_session_key),
        form::text(
            "DevAddr",
            |d: &DeviceDraft| &d.lorawan.activation.dev_addr,
            |d: &mut DeviceDraft| &mut d.lorawan.activation.dev_addr,
        )
        .generated(keys::dev_addr)
        .validated(is_dev_addr),
        form::text(
            "NwkSKey",
            |d: &DeviceDraft| &d.lorawan.activation.nwk_s_key,
            |d: &mut DeviceDraft| &mut d.lorawan.activation.nwk_s_key,
        )
        .masked()
        .generated(keys::session_key)
        .validated(is_session_key),
        form::text(
            "AppSKey",
            |d: &DeviceDraft| &d.lorawan.activation.app_s_key,
            |d: &mut DeviceDraft| &mut d.lorawan.activation.app_s_key,
        )
        .masked()
        .generated(keys::session_key)
        .validated(is_session_key),
    ]
}

fn class_fields() -> Fields {
    vec![
        form::text("RX1 delay", |d: &DeviceDraft| &d.lorawan.class.rx1_delay, |d: &mut DeviceDraft| &mut d.lorawan.class.rx1_delay),
        form::text(
            "RX1 duration",
            |d: &DeviceDraft| &d.lorawan.class.rx1_duration,
            |d: &mut DeviceDraft| &mut d.lorawan.class.rx1_duration,
        ),
        form::text(
            "RX1 data rate offset",
            |d: &DeviceDraft| &d.lorawan.class.rx1_data_rate_offset,
            |d: &mut DeviceDraft| &mut d.lorawan.class.rx1_data_rate_offset,
        ),
        form::text("RX2 delay", |d: &DeviceDraft| &d.lorawan.class.rx2_delay, |d: &mut DeviceDraft| &mut d.lorawan.class.rx2_delay),
        form::text(
            "RX2 duration",
            |d: &DeviceDraft| &d.lorawan.class.rx2_duration,
            |d: &mut DeviceDraft| &mut d.lorawan.class.rx2_duration,
        ),
        form::text(
            "Channel frequency",
            |d: &DeviceDraft| &d.lorawan.class.channel_frequency,
            |d: &mut DeviceDraft| &mut d.lorawan.class.channel_frequency,
        ),
        form::text("Data rate", |d: &DeviceDraft| &d.lorawan.class.data_rate, |d: &mut DeviceDraft| &mut d.lorawan.class.data_rate),
        form::text(
            "ACK timeout",
            |d: &DeviceDraft| &d.lorawan.class.ack_timeout,
            |d: &mut DeviceDraft| &mut d.lorawan.class.ack_timeout,
        ),
        form::toggle(
            "Class B supported",
            |d: &DeviceDraft| &d.lorawan.class.class_b_supported,
            |d: &mut DeviceDraft| &mut d.lorawan.class.class_b_supported,
        ),
        form::toggle(
            "Class C supported",
            |d: &DeviceDraft| &d.lorawan.class.class_c_supported,
            |d: &mut DeviceDraft| &mut d.lorawan.class.class_c_supported,
        ),
    ]
}

fn frame_fields() -> Fields {
    vec![
        form::text(
            "Uplink data rate",
            |d: &DeviceDraft| &d.lorawan.frame.uplink_data_rate,
            |d: &mut DeviceDraft| &mut d.lorawan.frame.uplink_data_rate,
        ),
        form::text("FPort", |d: &DeviceDraft| &d.lorawan.frame.f_port, |d: &mut DeviceDraft| &mut d.lorawan.frame.f_port),
        form::text(
            "Retransmission",
            |d: &DeviceDraft| &d.lorawan.frame.retransmission,
            |d: &mut DeviceDraft| &mut d.lorawan.frame.retransmission,
        ),
        form::number("FCnt", |d: &DeviceDraft| &d.lorawan.frame.f_cnt, |d: &mut DeviceDraft| &mut d.lorawan.frame.f_cnt),
        form::toggle(
            "Disable FCnt down",
            |d: &DeviceDraft| &d.lorawan.frame.f_cnt_down_disable,
            |d: &mut DeviceDraft| &mut d.lorawan.frame.f_cnt_down_disable,
        ),
        form::optional_number(
            "FCnt down",
            |d: &DeviceDraft| &d.lorawan.frame.f_cnt_down,
            |d: &mut DeviceDraft| &mut d.lorawan.frame.f_cnt_down,
        ),
    ]
}

fn feature_fields() -> Fields {
    vec![
        form::toggle(
            "ADR enabled",
            |d: &DeviceDraft| &d.lorawan.features.adr_enabled,
            |d: &mut DeviceDraft| &mut d.lorawan.features.adr_enabled,
        ),
        form::text(
            "Range antenna",
            |d: &DeviceDraft| &d.lorawan.features.range_antenna,
            |d: &mut DeviceDraft| &mut d.lorawan.features.range_antenna,
        ),
    ]
}

fn location_fields() -> Fields {
    vec![
        form::number(
            "Latitude",
            |d: &DeviceDraft| &d.lorawan.location.latitude,
            |d: &mut DeviceDraft| &mut d.lorawan.location.latitude,
        ),
        form::number(
            "Longitude",
            |d: &DeviceDraft| &d.lorawan.location.longitude,
            |d: &mut DeviceDraft| &mut d.lorawan.location.longitude,
        ),
        form::optional_number(
            "Altitude",
            |d: &DeviceDraft| &d.lorawan.location.altitude,
            |d: &mut DeviceDraft| &mut d.lorawan.location.altitude,
        ),
        form::text(
            "Address",
            |d: &DeviceDraft| &d.lorawan.location.address,
            |d: &mut DeviceDraft| &mut d.lorawan.location.address,
        ),
    ]
}

fn payload_fields() -> Fields {
    vec![
        form::text(
            "Uplink interval (s)",
            |d: &DeviceDraft| &d.lorawan.payload.uplink_interval,
            |d: &mut DeviceDraft| &mut d.lorawan.payload.uplink_interval,
        ),
        form::choice(
            "When payload exceeds",
            |d: &DeviceDraft| d.lorawan.payload.exceeds_action.as_str().to_string(),
            |d: &mut DeviceDraft, _, _| d.lorawan.payload.exceeds_action = d.lorawan.payload.exceeds_action.toggle(),
        ),
        form::choice(
            "Message type",
            |d: &DeviceDraft| d.lorawan.payload.m_type.as_str().to_string(),
            |d: &mut DeviceDraft, _, _| d.lorawan.payload.m_type = d.lorawan.payload.m_type.toggle(),
        ),
        form::text(
            "Payload content",
            |d: &DeviceDraft| &d.lorawan.payload.content,
            |d: &mut DeviceDraft| &mut d.lorawan.payload.content,
        ),
        form::toggle(
            "Base64 encoded",
            |d: &DeviceDraft| &d.lorawan.payload.base64_encoded,
            |d: &mut DeviceDraft| &mut d.lorawan.payload.base64_encoded,
        ),
        form::toggle(
            "Send system data",
            |d: &DeviceDraft| &d.lorawan.payload.flags.system,
            |d: &mut DeviceDraft| &mut d.lorawan.payload.flags.system,
        ),
        form::toggle(
            "Send fault events",
            |d: &DeviceDraft| &d.lorawan.payload.flags.fault,
            |d: &mut DeviceDraft| &mut d.lorawan.payload.flags.fault,
        ),
        form::toggle(
            "Send PNM data",
            |d: &DeviceDraft| &d.lorawan.payload.flags.pnm,
            |d: &mut DeviceDraft| &mut d.lorawan.payload.flags.pnm,
        ),
    ]
}

fn system_fields(sensor_count: usize) -> Fields {
    let mut fields = vec![
        form::text(
            "Amplifier type",
            |d: &DeviceDraft| &d.scte283.system_capabilities.amplifier_type,
            |d: &mut DeviceDraft| &mut d.scte283.system_capabilities.amplifier_type,
        ),
        form::toggle(
            "Power supply redundancy",
            |d: &DeviceDraft| &d.scte283.system_capabilities.supports_power_supply_redundancy,
            |d: &mut DeviceDraft| &mut d.scte283.system_capabilities.supports_power_supply_redundancy,
        ),
        form::text(
            "Redundancy mode",
            |d: &DeviceDraft| &d.scte283.system_capabilities.power_supply_redundancy_mode,
            |d: &mut DeviceDraft| &mut d.scte283.system_capabilities.power_supply_redundancy_mode,
        ),
        form::toggle(
            "Power saving mode",
            |d: &DeviceDraft| &d.scte283.system_capabilities.supports_power_saving_mode,
            |d: &mut DeviceDraft| &mut d.scte283.system_capabilities.supports_power_saving_mode,
        ),
        form::text(
            "Unique id",
            |d: &DeviceDraft| &d.scte283.system_status.unique_id,
            |d: &mut DeviceDraft| &mut d.scte283.system_status.unique_id,
        ),
        form::text(
            "Model number",
            |d: &DeviceDraft| &d.scte283.identification.model_number,
            |d: &mut DeviceDraft| &mut d.scte283.identification.model_number,
        ),
        form::text(
            "Serial number",
            |d: &DeviceDraft| &d.scte283.identification.serial_number,
            |d: &mut DeviceDraft| &mut d.scte283.identification.serial_number,
        ),
        form::text(
            "Device alias",
            |d: &DeviceDraft| &d.scte283.identification.device_alias,
            |d: &mut DeviceDraft| &mut d.scte283.identification.device_alias,
        ),
        form::text(
            "Device description",
            |d: &DeviceDraft| &d.scte283.identification.device_description,
            |d: &mut DeviceDraft| &mut d.scte283.identification.device_description,
        ),
        form::text("Vendor", |d: &DeviceDraft| &d.scte283.vendor.name, |d: &mut DeviceDraft| &mut d.scte283.vendor.name),
        form::text("Vendor OUI", |d: &DeviceDraft| &d.scte283.vendor.oui, |d: &mut DeviceDraft| &mut d.scte283.vendor.oui),
        form::text(
            "Software version",
            |d: &DeviceDraft| &d.scte283.version_summary.current_sw_version,
            |d: &mut DeviceDraft| &mut d.scte283.version_summary.current_sw_version,
        ),
        form::text(
            "Boot ROM version",
            |d: &DeviceDraft| &d.scte283.version_summary.boot_rom_version,
            |d: &mut DeviceDraft| &mut d.scte283.version_summary.boot_rom_version,
        ),
        form::text(
            "Hardware version",
            |d: &DeviceDraft| &d.scte283.version_summary.hw_version,
            |d: &mut DeviceDraft| &mut d.scte283.version_summary.hw_version,
        ),
        form::toggle(
            "Enclosure open",
            |d: &DeviceDraft| &d.scte283.enclosure.is_open,
            |d: &mut DeviceDraft| &mut d.scte283.enclosure.is_open,
        ),
        form::text(
            "Hostname",
            |d: &DeviceDraft| &d.scte283.system_cfg.hostname,
            |d: &mut DeviceDraft| &mut d.scte283.system_cfg.hostname,
        ),
        form::text(
            "Asset id",
            |d: &DeviceDraft| &d.scte283.system_cfg.asset_id,
            |d: &mut DeviceDraft| &mut d.scte283.system_cfg.asset_id,
        ),
        form::optional_number(
            "Cascade position",
            |d: &DeviceDraft| &d.scte283.system_cfg.cascade_position,
            |d: &mut DeviceDraft| &mut d.scte283.system_cfg.cascade_position,
        ),
        form::text(
            "Site description",
            |d: &DeviceDraft| &d.scte283.site_location.description,
            |d: &mut DeviceDraft| &mut d.scte283.site_location.description,
        ),
        form::text(
            "Site latitude",
            |d: &DeviceDraft| &d.scte283.site_location.latitude,
            |d: &mut DeviceDraft| &mut d.scte283.site_location.latitude,
        ),
        form::text(
            "Site longitude",
            |d: &DeviceDraft| &d.scte283.site_location.longitude,
            |d: &mut DeviceDraft| &mut d.scte283.site_location.longitude,
        ),
        form::optional_number(
            "Event index",
            |d: &DeviceDraft| &d.scte283.event.index,
            |d: &mut DeviceDraft| &mut d.scte283.event.index,
        ),
        form::text("Event id", |d: &DeviceDraft| &d.scte283.event.id, |d: &mut DeviceDraft| &mut d.scte283.event.id),
        form::text("Event level", |d: &DeviceDraft| &d.scte283.event.level, |d: &mut DeviceDraft| &mut d.scte283.event.level),
        form::text("Event text", |d: &DeviceDraft| &d.scte283.event.text, |d: &mut DeviceDraft| &mut d.scte283.event.text),
        form::text(
            "Event first seen",
            |d: &DeviceDraft| &d.scte283.event.first_time,
            |d: &mut DeviceDraft| &mut d.scte283.event.first_time,
        ),
        form::text(
            "Event last seen",
            |d: &DeviceDraft| &d.scte283.event.last_time,
            |d: &mut DeviceDraft| &mut d.scte283.event.last_time,
        ),
    ];
    for index in 0..sensor_count {
        fields.extend(sensor_fields(index));
    }
    fields
}

fn rf_fields() -> Fields {
    vec![
        form::optional_number(
            "Power supply id",
            |d: &DeviceDraft| &d.scte283.power_supply.id,
            |d: &mut DeviceDraft| &mut d.scte283.power_supply.id,
        ),
        form::text(
            "Power supply description",
            |d: &DeviceDraft| &d.scte283.power_supply.description,
            |d: &mut DeviceDraft| &mut d.scte283.power_supply.description,
        ),
        form::text(
            "Power supply status",
            |d: &DeviceDraft| &d.scte283.power_supply.oper_status,
            |d: &mut DeviceDraft| &mut d.scte283.power_supply.oper_status,
        ),
        form::optional_number(
            "Input voltage (V)",
            |d: &DeviceDraft| &d.scte283.power_supply.input_voltage,
            |d: &mut DeviceDraft| &mut d.scte283.power_supply.input_voltage,
        ),
        form::optional_number(
            "Input current (A)",
            |d: &DeviceDraft| &d.scte283.power_supply.input_current,
            |d: &mut DeviceDraft| &mut d.scte283.power_supply.input_current,
        ),
        form::optional_number(
            "Output rail id",
            |d: &DeviceDraft| &d.scte283.output_rail.id,
            |d: &mut DeviceDraft| &mut d.scte283.output_rail.id,
        ),
        form::text(
            "Output rail description",
            |d: &DeviceDraft| &d.scte283.output_rail.description,
            |d: &mut DeviceDraft| &mut d.scte283.output_rail.description,
        ),
        form::text(
            "Output rail status",
            |d: &DeviceDraft| &d.scte283.output_rail.oper_status,
            |d: &mut DeviceDraft| &mut d.scte283.output_rail.oper_status,
        ),
        form::optional_number(
            "Output voltage (V)",
            |d: &DeviceDraft| &d.scte283.output_rail.voltage,
            |d: &mut DeviceDraft| &mut d.scte283.output_rail.voltage,
        ),
        form::optional_number(
            "Output current (A)",
            |d: &DeviceDraft| &d.scte283.output_rail.current,
            |d: &mut DeviceDraft| &mut d.scte283.output_rail.current,
        ),
    ]
}

fn sensor_fields(index: usize) -> Fields {
    let n = index + 1;
    vec![
        form::optional_number(
            format!("Sensor {n} id"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].id,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].id,
        ),
        form::optional_text(
            format!("Sensor {n} name"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].name,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].name,
        ),
        form::text(
            format!("Sensor {n} type"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].sensor_type,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].sensor_type,
        ),
        form::text(
            format!("Sensor {n} scale"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].scale,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].scale,
        ),
        form::optional_number(
            format!("Sensor {n} precision"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].precision,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].precision,
        ),
        form::optional_number(
            format!("Sensor {n} value"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].value,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].value,
        ),
        form::text(
            format!("Sensor {n} status"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].oper_status,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].oper_status,
        ),
        form::optional_text(
            format!("Sensor {n} units"),
            move |d: &DeviceDraft| &d.scte283.sensors[index].units_display,
            move |d: &mut DeviceDraft| &mut d.scte283.sensors[index].units_display,
        ),
    ]
    .into_iter()
    .map(|field| field.in_group(index))
    .collect()
}

fn networking_fields() -> Fields {
    vec![
        form::optional_number(
            "Syslog server index",
            |d: &DeviceDraft| &d.scte283.syslog_server_cfg.index,
            |d: &mut DeviceDraft| &mut d.scte283.syslog_server_cfg.index,
        ),
        form::text(
            "Syslog server address",
            |d: &DeviceDraft| &d.scte283.syslog_server_cfg.server_address,
            |d: &mut DeviceDraft| &mut d.scte283.syslog_server_cfg.server_address,
        ),
        form::text(
            "Syslog admin state",
            |d: &DeviceDraft| &d.scte283.syslog_server_cfg.admin_state,
            |d: &mut DeviceDraft| &mut d.scte283.syslog_server_cfg.admin_state,
        ),
        form::text(
            "Syslog level",
            |d: &DeviceDraft| &d.scte283.syslog.level,
            |d: &mut DeviceDraft| &mut d.scte283.syslog.level,
        ),
        form::text(
            "Syslog hostname",
            |d: &DeviceDraft| &d.scte283.syslog.hostname,
            |d: &mut DeviceDraft| &mut d.scte283.syslog.hostname,
        ),
        form::text(
            "Throttle admin state",
            |d: &DeviceDraft| &d.scte283.event_throttle_cfg.admin_state,
            |d: &mut DeviceDraft| &mut d.scte283.event_throttle_cfg.admin_state,
        ),
        form::optional_number(
            "Throttle threshold",
            |d: &DeviceDraft| &d.scte283.event_throttle_cfg.threshold,
            |d: &mut DeviceDraft| &mut d.scte283.event_throttle_cfg.threshold,
        ),
        form::optional_number(
            "Throttle interval",
            |d: &DeviceDraft| &d.scte283.event_throttle_cfg.interval,
            |d: &mut DeviceDraft| &mut d.scte283.event_throttle_cfg.interval,
        ),
        form::text(
            "Reporting priority",
            |d: &DeviceDraft| &d.scte283.event_reporting_cfg.priority,
            |d: &mut DeviceDraft| &mut d.scte283.event_reporting_cfg.priority,
        ),
        form::toggle(
            "Event reporting",
            |d: &DeviceDraft| &d.scte283.event_reporting_cfg.reporting,
            |d: &mut DeviceDraft| &mut d.scte283.event_reporting_cfg.reporting,
        ),
        form::text(
            "Transfer host",
            |d: &DeviceDraft| &d.scte283.data_transfer_cfg.remote_server_host,
            |d: &mut DeviceDraft| &mut d.scte283.data_transfer_cfg.remote_server_host,
        ),
        form::optional_number(
            "Transfer port",
            |d: &DeviceDraft| &d.scte283.data_transfer_cfg.remote_server_port,
            |d: &mut DeviceDraft| &mut d.scte283.data_transfer_cfg.remote_server_port,
        ),
        form::text(
            "Transfer base URI",
            |d: &DeviceDraft| &d.scte283.data_transfer_cfg.remote_server_base_uri,
            |d: &mut DeviceDraft| &mut d.scte283.data_transfer_cfg.remote_server_base_uri,
        ),
        form::text(
            "Transfer protocol",
            |d: &DeviceDraft| &d.scte283.data_transfer_cfg.protocol,
            |d: &mut DeviceDraft| &mut d.scte283.data_transfer_cfg.protocol,
        ),
        form::toggle(
            "Store locally",
            |d: &DeviceDraft| &d.scte283.data_transfer_cfg.local_store,
            |d: &mut DeviceDraft| &mut d.scte283.data_transfer_cfg.local_store,
        ),
    ]
}

fn pnm_fields() -> Fields {
    vec![
        form::toggle(
            "RF spectrum capture",
            |d: &DeviceDraft| &d.scte283.system_capabilities.supports_rf_spectrum_capture,
            |d: &mut DeviceDraft| &mut d.scte283.system_capabilities.supports_rf_spectrum_capture,
        ),
        form::optional_number(
            "Spectrum capture files",
            |d: &DeviceDraft| &d.scte283.file_capabilities.num_rf_spectrum_capture_files_supported,
            |d: &mut DeviceDraft| &mut d.scte283.file_capabilities.num_rf_spectrum_capture_files_supported,
        ),
        form::optional_number(
            "Debug files",
            |d: &DeviceDraft| &d.scte283.file_capabilities.num_debug_files_supported,
            |d: &mut DeviceDraft| &mut d.scte283.file_capabilities.num_debug_files_supported,
        ),
        form::text(
            "File name",
            |d: &DeviceDraft| &d.scte283.file_status.filename,
            |d: &mut DeviceDraft| &mut d.scte283.file_status.filename,
        ),
        form::text(
            "File type",
            |d: &DeviceDraft| &d.scte283.file_status.file_type,
            |d: &mut DeviceDraft| &mut d.scte283.file_status.file_type,
        ),
        form::text(
            "File status",
            |d: &DeviceDraft| &d.scte283.file_status.file_status,
            |d: &mut DeviceDraft| &mut d.scte283.file_status.file_status,
        ),
        form::text(
            "Reset types supported",
            |d: &DeviceDraft| &d.scte283.reset_capabilities.reset_types_supported,
            |d: &mut DeviceDraft| &mut d.scte283.reset_capabilities.reset_types_supported,
        ),
        form::text(
            "Last reset reason",
            |d: &DeviceDraft| &d.scte283.reset_history_status.reason,
            |d: &mut DeviceDraft| &mut d.scte283.reset_history_status.reason,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::DeviceKind;

    #[test]
    fn sensor_fields_follow_the_draft() {
        let mut draft = DeviceDraft::new(DeviceKind::Scte283);
        let base = fields_for(SubTab::System, &draft).len();
        draft.add_sensor();
        let fields = fields_for(SubTab::System, &draft);
        assert_eq!(fields.len(), base + 8);
        assert_eq!(fields.last().and_then(|field| field.group), Some(1));
        assert!(fields.iter().any(|field| field.label == "Sensor 2 units"));
    }

    #[test]
    fn general_tab_marks_required_fields() {
        let draft = DeviceDraft::new(DeviceKind::Lorawan);
        let required: Vec<_> = fields_for(SubTab::Device, &draft)
            .into_iter()
            .filter(|field| field.required)
            .map(|field| field.label)
            .collect();
        assert_eq!(required, ["Name", "DevEUI", "Region", "Gateway"]);
    }

    #[test]
    fn secret_keys_are_masked_and_generated() {
        let draft = DeviceDraft::new(DeviceKind::Lorawan);
        let fields = fields_for(SubTab::Activation, &draft);
        let app_key = fields.iter().find(|field| field.label == "AppKey").map(|field| (field.masked, field.generator.is_some()));
        assert_eq!(app_key, Some((true, true)));
    }

    #[test]
    fn consistency_redirects_land_on_the_fields_they_name() {
        use simctl_engine::ConsistencyError;

        let draft = DeviceDraft::new(DeviceKind::Scte283);
        let cases = [
            (ConsistencyError::SystemWithoutSensor(DeviceKind::Scte283), "Sensor 1 units"),
            (ConsistencyError::FaultWithoutEvent(DeviceKind::Scte283), "Event id"),
            (ConsistencyError::SystemWithoutSensor(DeviceKind::Lorawan), "Send system data"),
            (ConsistencyError::FaultWithoutEvent(DeviceKind::Lorawan), "Send fault events"),
        ];
        for (violation, label) in cases {
            let (_, sub_tab) = violation.redirect();
            assert!(violation.to_string().contains(&format!("on the {} tab", sub_tab.title())), "{violation}");
            let fields = fields_for(sub_tab, &draft);
            assert!(fields.iter().any(|field| field.label == label), "{label} missing from {sub_tab:?}");
        }
    }
}
