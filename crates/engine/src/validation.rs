//! Field-level checks shared by the device wizard, the gateway form and the
//! bulk form.

use std::fmt;
use std::net::Ipv4Addr;

use simctl_types::device::GeneralSettings;
use thiserror::Error;

/// Shown whenever forward navigation is attempted with an incomplete General tab.
pub const GENERAL_INCOMPLETE_MESSAGE: &str =
    "Please fill in Name, DevEUI, Gateway, and Region in the General tab before proceeding.";

/// General-tab fields every device needs before the wizard moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Name,
    DevEui,
    Gateway,
    Region,
}

impl RequiredField {
    pub const ALL: [RequiredField; 4] = [
        RequiredField::Name,
        RequiredField::DevEui,
        RequiredField::Gateway,
        RequiredField::Region,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RequiredField::Name => "Name",
            RequiredField::DevEui => "DevEUI",
            RequiredField::Gateway => "Gateway",
            RequiredField::Region => "Region",
        }
    }

    fn is_filled(&self, general: &GeneralSettings) -> bool {
        match self {
            RequiredField::Name => !general.name.trim().is_empty(),
            RequiredField::DevEui => !general.dev_eui.trim().is_empty(),
            RequiredField::Gateway => general.gateway.as_ref().is_some_and(|gateway| !gateway.name.trim().is_empty()),
            RequiredField::Region => general.region.is_some(),
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Required General fields that are still empty, in display order.
pub fn missing_required(general: &GeneralSettings) -> Vec<RequiredField> {
    RequiredField::ALL
        .into_iter()
        .filter(|field| !field.is_filled(general))
        .collect()
}

/// Rejections raised by the gateway and bulk-creation forms, in the words
/// shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter the gateway name.")]
    MissingGatewayName,
    #[error("Please enter or generate a MAC address.")]
    MissingMacAddress,
    #[error("Keep alive must be a whole number of seconds, got `{0}`.")]
    InvalidKeepAlive(String),
    #[error("Port must be a number between 1 and 65535, got `{0}`.")]
    InvalidPort(String),
    #[error("`{0}` is not a valid IPv4 address.")]
    InvalidIpv4(String),
    #[error("Altitude must be a number, got `{0}`.")]
    InvalidAltitude(String),
    #[error("Please enter a valid number of devices (greater than 0).")]
    InvalidDeviceCount,
    #[error("Please enter the name.")]
    MissingBulkName,
    #[error("Please select a gateway.")]
    MissingGateway,
    #[error("Please select a region.")]
    MissingRegion,
}

/// True when `value` is exactly `len` hexadecimal digits.
pub fn is_hex_of_len(value: &str, len: usize) -> bool {
    value.len() == len && value.chars().all(|c| c.is_ascii_hexdigit())
}

pub fn is_ipv4(value: &str) -> bool {
    value.trim().parse::<Ipv4Addr>().is_ok()
}

/// Parses an optional numeric form field; blank means unset.
pub fn parse_optional<T: std::str::FromStr>(value: &str) -> Result<Option<T>, T::Err> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed.parse::<T>().map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::device::GatewayRef;
    use simctl_types::Region;

    #[test]
    fn lists_missing_fields_in_order() {
        let mut general = GeneralSettings {
            name: "  ".into(),
            ..Default::default()
        };
        assert_eq!(missing_required(&general), RequiredField::ALL.to_vec());

        general.name = "dev1".into();
        general.region = Some(Region::Us915);
        general.gateway = Some(GatewayRef {
            name: "gw1".into(),
            mac_address: String::new(),
        });
        assert_eq!(missing_required(&general), vec![RequiredField::DevEui]);
    }

    #[test]
    fn hex_and_ip_checks() {
        assert!(is_hex_of_len("AABBCCDDEEFF0011", 16));
        assert!(!is_hex_of_len("AABBCCDDEEFF001G", 16));
        assert!(!is_hex_of_len("AABB", 16));
        assert!(is_ipv4(" 10.0.0.5 "));
        assert!(!is_ipv4("10.0.0"));
    }

    #[test]
    fn optional_numbers() {
        assert_eq!(parse_optional::<u32>(""), Ok(None));
        assert_eq!(parse_optional::<u32>(" 42 "), Ok(Some(42)));
        assert!(parse_optional::<u32>("4x").is_err());
    }
}
