//! Utilities shared by the simctl crates.

pub mod geocode;
pub mod http;
pub mod session;

use std::path::PathBuf;

use dirs_next::home_dir;
use once_cell::sync::Lazy;
use regex::Regex;

pub use geocode::{GeocodeError, GeocodingClient};
pub use session::{SessionError, SessionStore};

/// Directory name used under the platform config dir.
pub const APP_DIR_NAME: &str = "simctl";

static REDACTIONS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)(authorization:\s*(?:bearer\s+|basic\s+)?)([\w\-\.=:/+]+)", "${1}<redacted>"),
        (
            r#"(?i)("?(?:appKey|nwkSKey|appSKey|app_key|nwk_s_key|app_s_key)"?\s*:\s*)"[^"]*""#,
            r#"${1}"<redacted>""#,
        ),
        (r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD))=([^\s]+)", "${1}=<redacted>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("redaction pattern compiles"), replacement))
    .collect()
});

/// Redacts values that look like secrets in a string.
///
/// Covers authorization headers, LoRaWAN session/application keys in JSON or
/// debug output, and `*_KEY=`/`*_TOKEN=` style assignments.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for (pattern, replacement) in REDACTIONS.iter() {
        redacted = pattern.replace_all(&redacted, *replacement).into_owned();
    }
    redacted
}

pub fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

/// `<config dir>/simctl/<file_name>`, falling back to the working directory.
pub fn default_config_file(file_name: &str) -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(file_name)
}

/// Reads an environment variable holding a path, ignoring blank values.
pub fn path_from_env(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| expand_tilde(&value))
}

/// Truthy environment flag (`1`, `true`, `yes`).
pub fn env_flag(var: &str) -> bool {
    std::env::var(var)
        .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_headers_and_lorawan_keys() {
        let line = r#"authorization: Bearer abc.def {"appKey": "00112233445566778899AABBCCDDEEFF", "devEUI": "0102030405060708"}"#;
        let redacted = redact_sensitive(line);
        assert!(!redacted.contains("abc.def"));
        assert!(!redacted.contains("00112233445566778899AABBCCDDEEFF"));
        assert!(redacted.contains(r#""appKey": "<redacted>""#));
        assert!(redacted.contains("0102030405060708"));
    }

    #[test]
    fn redacts_debug_output_and_env_assignments() {
        let redacted = redact_sensitive(r#"ActivationSettings { app_s_key: "FFEE", dev_addr: "01" } API_TOKEN=xyz"#);
        assert!(redacted.contains(r#"app_s_key: "<redacted>""#));
        assert!(redacted.contains(r#"dev_addr: "01""#));
        assert!(redacted.contains("API_TOKEN=<redacted>"));
    }

    #[test]
    fn env_flag_accepts_common_truthy_values() {
        temp_env::with_var("SIMCTL_TEST_FLAG", Some("Yes"), || assert!(env_flag("SIMCTL_TEST_FLAG")));
        temp_env::with_var("SIMCTL_TEST_FLAG", Some("0"), || assert!(!env_flag("SIMCTL_TEST_FLAG")));
        temp_env::with_var_unset("SIMCTL_TEST_FLAG", || assert!(!env_flag("SIMCTL_TEST_FLAG")));
    }
}
