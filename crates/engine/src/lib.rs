//! # simctl engine
//!
//! Front-end logic of the simctl console that does not depend on a terminal:
//! the device wizard state machine, the device draft and its payload
//! assembly, the submission lifecycle, and the gateway, bulk and selection
//! rules used by the list screens. Both the TUI and the CLI drive these
//! types; the only I/O performed here goes through [`simctl_api`].
//!
//! ## Usage
//!
//! ```rust
//! use simctl_engine::{DeviceDraft, WizardState, assemble};
//! use simctl_types::DeviceKind;
//!
//! let draft = DeviceDraft::new(DeviceKind::Scte283);
//! let wizard = WizardState::new(DeviceKind::Scte283);
//! assert_eq!(wizard.sections().len(), 3);
//! let body = assemble(&draft)?;
//! assert!(body.scte279_amplifier.is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - **`wizard`**: section/sub-tab navigation, the required-field gate and the lazy map slot
//! - **`draft`**: the grouped device settings, hydration from stored records
//! - **`payload`**: consistency checks and the create/update request bodies
//! - **`submission`**: the submit state machine and the backend seam
//! - **`gateway_form`**, **`bulk`**, **`selection`**: list-screen forms and guards

use std::{fs, path::Path};

use anyhow::{Context, Result};

pub mod bulk;
pub mod draft;
pub mod gateway_form;
pub mod keys;
pub mod payload;
pub mod selection;
pub mod submission;
pub mod validation;
pub mod wizard;

pub use bulk::BulkForm;
pub use draft::DeviceDraft;
pub use gateway_form::GatewayForm;
pub use payload::{ConsistencyError, assemble, check_consistency, lorawan_record};
pub use selection::{SelectionError, Subject};
pub use submission::{DeviceBackend, SubmissionMachine, SubmissionPhase, SubmitError, SubmitMode, dispatch, submit};
pub use validation::{FormError, RequiredField};
pub use wizard::{Advance, MapView, Section, SubTab, WizardError, WizardState};

/// Loads a device draft from a YAML or JSON file.
///
/// Every group is optional; omitted fields take their new-draft defaults
/// (except `general.active`, which reads as `false` when absent). SCTE-283
/// drafts without sensors get the usual blank sensor row.
pub fn load_draft_file(file_path: impl AsRef<Path>) -> Result<DeviceDraft> {
    let file_path = file_path.as_ref();
    let file_content = fs::read(file_path).with_context(|| format!("Failed to read draft file: {}", file_path.display()))?;
    let content_string = String::from_utf8_lossy(&file_content);

    // YAML is a superset of JSON, so one parser covers both formats.
    let mut draft: DeviceDraft = serde_yaml::from_str(&content_string)
        .with_context(|| format!("Unsupported draft document format in {}", file_path.display()))?;
    if draft.kind.is_scte283() && draft.scte283.sensors.is_empty() {
        draft.add_sensor();
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::{DeviceKind, Region};

    #[test]
    fn loads_yaml_drafts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let draft_path = temp_dir.path().join("amp.yaml");
        fs::write(
            &draft_path,
            r#"
kind: scte283
general:
  active: true
  name: amp-01
  dev_eui: AABBCCDDEEFF0011
  region: EU868
  gateway:
    name: gw1
lorawan:
  payload:
    uplink_interval: "60"
"#,
        )
        .unwrap();

        let draft = load_draft_file(&draft_path).unwrap();
        assert_eq!(draft.kind, DeviceKind::Scte283);
        assert_eq!(draft.general.region, Some(Region::Eu868));
        assert_eq!(draft.scte283.sensors.len(), 1);
        assert_eq!(draft.lorawan.payload.uplink_interval, "60");
        assert!(draft.missing_required().is_empty());
    }

    #[test]
    fn loads_json_drafts_and_reports_bad_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let json_path = temp_dir.path().join("node.json");
        fs::write(&json_path, r#"{"general": {"name": "node", "region": "US915"}}"#).unwrap();
        let draft = load_draft_file(&json_path).unwrap();
        assert_eq!(draft.kind, DeviceKind::Lorawan);
        assert_eq!(draft.general.name, "node");

        let bad_path = temp_dir.path().join("bad.yaml");
        fs::write(&bad_path, "general: [1, 2").unwrap();
        let error = load_draft_file(&bad_path).unwrap_err();
        assert!(error.to_string().contains("Unsupported draft document format"));
        assert!(load_draft_file(temp_dir.path().join("missing.yaml")).is_err());
    }
}
