//! Submission state machine for the device wizard.
//!
//! ```text
//! Idle -> Validating -> Blocked -> Idle
//!                    \-> Submitting -> Succeeded
//!                                   \-> Failed -> Idle
//! ```
//!
//! `begin` runs the synchronous half (validation and payload assembly) and
//! hands back the request to dispatch; `complete` records the backend's
//! answer. Only one submission may be in flight at a time, and an answer is
//! accepted only while its submission is still the one in flight. The async
//! [`submit`] helper drives both halves against a [`DeviceBackend`] for
//! callers that do not have their own task runtime plumbing.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use simctl_api::{ApiError, SimctlClient};
use simctl_types::{DevicePayload, DeviceSubmission, LorawanPayload};
use thiserror::Error;
use tracing::{info, warn};

use crate::draft::DeviceDraft;
use crate::payload::{ConsistencyError, assemble, check_consistency, lorawan_record};
use crate::wizard::{Section, WizardError, WizardState};

pub const DEVICE_CREATED_MESSAGE: &str = "Device added successfully!";
pub const DEVICE_UPDATED_MESSAGE: &str = "Device updated successfully!";
pub const DEVICE_SAVE_FAILED_MESSAGE: &str = "Failed to save device. Check the log for details.";

/// Whether the wizard creates a device or updates a stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Edit { dev_eui: String },
}

impl SubmitMode {
    pub fn success_message(&self) -> &'static str {
        match self {
            SubmitMode::Create => DEVICE_CREATED_MESSAGE,
            SubmitMode::Edit { .. } => DEVICE_UPDATED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a submission is already in progress")]
    InFlight,
    /// An answer arrived for a submission that is no longer in flight.
    #[error("no submission is in flight")]
    NotInFlight,
    #[error(transparent)]
    Incomplete(#[from] WizardError),
    #[error(transparent)]
    Blocked(#[from] ConsistencyError),
    /// The backend call failed; the payload carries the logged detail.
    #[error("{}", DEVICE_SAVE_FAILED_MESSAGE)]
    Failed(String),
}

/// One wizard's submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMachine {
    mode: SubmitMode,
    phase: SubmissionPhase,
    ticket: u64,
}

/// Tickets are unique across every machine in the process; 0 is never issued.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

impl SubmissionMachine {
    pub fn new(mode: SubmitMode) -> Self {
        Self {
            mode,
            phase: SubmissionPhase::Idle,
            ticket: 0,
        }
    }

    pub fn mode(&self) -> &SubmitMode {
        &self.mode
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase == SubmissionPhase::Submitting
    }

    /// Ticket of the latest dispatched submission (0 before the first).
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    /// True when an answer tagged `ticket` belongs to the submission in flight.
    pub fn awaits(&self, ticket: u64) -> bool {
        self.is_in_flight() && self.ticket == ticket
    }

    /// Validate the draft and build the request to dispatch.
    ///
    /// Incomplete General fields send the wizard back to General; a payload
    /// flag without its supporting data sends it to the offending tab. Either
    /// way the machine returns to `Idle`.
    pub fn begin(&mut self, draft: &DeviceDraft, wizard: &mut WizardState) -> Result<DeviceSubmission, SubmitError> {
        if self.is_in_flight() {
            warn!("submission rejected: another one is in flight");
            return Err(SubmitError::InFlight);
        }
        self.phase = SubmissionPhase::Validating;

        let missing = draft.missing_required();
        if !missing.is_empty() {
            self.phase = SubmissionPhase::Idle;
            wizard.redirect(Section::General, Section::General.first());
            return Err(WizardError::MissingRequired(missing).into());
        }

        let submission = match &self.mode {
            SubmitMode::Create => assemble(draft).map(DeviceSubmission::Create),
            SubmitMode::Edit { dev_eui } => check_consistency(draft).map(|()| DeviceSubmission::Update {
                dev_eui: dev_eui.clone(),
                record: lorawan_record(draft),
            }),
        };
        match submission {
            Ok(submission) => {
                self.phase = SubmissionPhase::Submitting;
                self.ticket = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
                info!(mode = ?self.mode, ticket = self.ticket, "device submission dispatched");
                Ok(submission)
            }
            Err(violation) => {
                self.phase = SubmissionPhase::Idle;
                let (section, sub_tab) = violation.redirect();
                wizard.redirect(section, sub_tab);
                info!(%violation, "device submission blocked");
                Err(violation.into())
            }
        }
    }

    /// Record the backend's answer for the in-flight submission. Outside
    /// `Submitting` the answer is dropped and the phase is left alone.
    pub fn complete(&mut self, result: Result<(), String>) -> Result<(), SubmitError> {
        if !self.is_in_flight() {
            warn!(phase = ?self.phase, "submission result ignored: nothing in flight");
            return Err(SubmitError::NotInFlight);
        }
        match result {
            Ok(()) => {
                self.phase = SubmissionPhase::Succeeded;
                info!("device submission succeeded");
                Ok(())
            }
            Err(detail) => {
                self.phase = SubmissionPhase::Idle;
                warn!(%detail, "device submission failed");
                Err(SubmitError::Failed(detail))
            }
        }
    }

    /// Leave `Succeeded` so the same wizard can submit again (save and new).
    pub fn acknowledge(&mut self) {
        if self.phase == SubmissionPhase::Succeeded {
            self.phase = SubmissionPhase::Idle;
        }
    }
}

/// The two backend calls a submission can make.
#[async_trait]
pub trait DeviceBackend: Send + Sync {
    async fn create_device(&self, payload: &DevicePayload) -> Result<(), String>;
    async fn update_device(&self, dev_eui: &str, record: &LorawanPayload) -> Result<(), String>;
}

#[async_trait]
impl DeviceBackend for SimctlClient {
    async fn create_device(&self, payload: &DevicePayload) -> Result<(), String> {
        SimctlClient::create_device(self, payload)
            .await
            .map(drop)
            .map_err(|error: ApiError| error.to_string())
    }

    async fn update_device(&self, dev_eui: &str, record: &LorawanPayload) -> Result<(), String> {
        SimctlClient::update_device(self, dev_eui, record)
            .await
            .map(drop)
            .map_err(|error: ApiError| error.to_string())
    }
}

/// Send a prepared submission through `backend`.
pub async fn dispatch(backend: &dyn DeviceBackend, submission: &DeviceSubmission) -> Result<(), String> {
    match submission {
        DeviceSubmission::Create(payload) => backend.create_device(payload).await,
        DeviceSubmission::Update { dev_eui, record } => backend.update_device(dev_eui, record).await,
    }
}

/// Validate, dispatch and complete in one go.
pub async fn submit(
    machine: &mut SubmissionMachine,
    draft: &DeviceDraft,
    wizard: &mut WizardState,
    backend: &dyn DeviceBackend,
) -> Result<(), SubmitError> {
    let submission = machine.begin(draft, wizard)?;
    let result = dispatch(backend, &submission).await;
    machine.complete(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wizard::SubTab;
    use axum::routing::{post, put};
    use axum::{Json, Router};
    use axum::http::StatusCode;
    use serde_json::Value;
    use simctl_types::device::GatewayRef;
    use simctl_types::{DeviceKind, Region};
    use std::sync::{Arc, Mutex};

    fn complete_draft(kind: DeviceKind) -> DeviceDraft {
        let mut draft = DeviceDraft::new(kind);
        draft.general.name = "dev1".into();
        draft.general.dev_eui = "AABBCCDDEEFF0011".into();
        draft.general.gateway = Some(GatewayRef {
            name: "gw1".into(),
            mac_address: String::new(),
        });
        draft.general.region = Some(Region::Us915);
        draft
    }

    #[test]
    fn system_flag_without_sensor_blocks_and_redirects() {
        let mut draft = complete_draft(DeviceKind::Scte283);
        draft.lorawan.payload.flags.system = true;
        let mut wizard = WizardState::new(DeviceKind::Scte283);
        wizard.activate_section(Section::Lorawan).unwrap();
        let mut machine = SubmissionMachine::new(SubmitMode::Create);

        let error = machine.begin(&draft, &mut wizard).unwrap_err();
        assert!(matches!(error, SubmitError::Blocked(ConsistencyError::SystemWithoutSensor(_))));
        assert_eq!(wizard.position(), (Section::Scte283, SubTab::System));
        assert_eq!(machine.phase(), SubmissionPhase::Idle);
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn incomplete_general_returns_to_general() {
        let mut draft = complete_draft(DeviceKind::Lorawan);
        draft.general.region = None;
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        wizard.activate_section(Section::Lorawan).unwrap();
        let mut machine = SubmissionMachine::new(SubmitMode::Create);

        assert!(matches!(machine.begin(&draft, &mut wizard), Err(SubmitError::Incomplete(_))));
        assert_eq!(wizard.active_section(), Section::General);
    }

    #[test]
    fn second_submission_while_in_flight_is_rejected() {
        let draft = complete_draft(DeviceKind::Lorawan);
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        let mut machine = SubmissionMachine::new(SubmitMode::Create);

        assert!(matches!(machine.begin(&draft, &mut wizard), Ok(DeviceSubmission::Create(_))));
        assert!(machine.is_in_flight());
        assert_eq!(machine.begin(&draft, &mut wizard), Err(SubmitError::InFlight));

        assert_eq!(
            machine.complete(Err("HTTP 500".into())),
            Err(SubmitError::Failed("HTTP 500".into()))
        );
        assert_eq!(machine.phase(), SubmissionPhase::Idle);
        assert!(machine.begin(&draft, &mut wizard).is_ok());
        assert!(machine.complete(Ok(())).is_ok());
        assert_eq!(machine.phase(), SubmissionPhase::Succeeded);
        machine.acknowledge();
        assert_eq!(machine.phase(), SubmissionPhase::Idle);
    }

    #[test]
    fn answers_outside_submitting_are_ignored() {
        let draft = complete_draft(DeviceKind::Lorawan);
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        let mut machine = SubmissionMachine::new(SubmitMode::Create);

        assert_eq!(machine.complete(Ok(())), Err(SubmitError::NotInFlight));
        assert_eq!(machine.phase(), SubmissionPhase::Idle);

        machine.begin(&draft, &mut wizard).unwrap();
        let first = machine.ticket();
        assert!(machine.awaits(first));
        machine.complete(Err("timeout".into())).unwrap_err();
        assert!(!machine.awaits(first));

        machine.begin(&draft, &mut wizard).unwrap();
        assert_ne!(machine.ticket(), first);
        assert!(!machine.awaits(first));
        machine.complete(Ok(())).unwrap();
        assert_eq!(machine.complete(Ok(())), Err(SubmitError::NotInFlight));
        assert_eq!(machine.phase(), SubmissionPhase::Succeeded);
    }

    #[test]
    fn edit_mode_builds_an_update() {
        let draft = complete_draft(DeviceKind::Lorawan);
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        let mut machine = SubmissionMachine::new(SubmitMode::Edit {
            dev_eui: "AABBCCDDEEFF0011".into(),
        });
        match machine.begin(&draft, &mut wizard).unwrap() {
            DeviceSubmission::Update { dev_eui, record } => {
                assert_eq!(dev_eui, "AABBCCDDEEFF0011");
                assert_eq!(record.gateway.as_deref(), Some("gw1"));
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert_eq!(machine.mode().success_message(), DEVICE_UPDATED_MESSAGE);
    }

    #[tokio::test]
    async fn submit_posts_the_assembled_body() {
        let received: Arc<Mutex<Option<Value>>> = Arc::default();
        let sink = received.clone();
        let router = Router::new()
            .route(
                "/api/devices/{user}",
                post(move |Json(body): Json<Value>| {
                    let sink = sink.clone();
                    async move {
                        *sink.lock().unwrap() = Some(body);
                        Json(serde_json::json!({"message": "created"}))
                    }
                }),
            )
            .route("/api/devices/{user}/{dev_eui}", put(|| async { StatusCode::INTERNAL_SERVER_ERROR }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let client = SimctlClient::with_base(&format!("http://{address}/api"), false)
            .unwrap()
            .for_user("operator");

        let draft = complete_draft(DeviceKind::Scte283);
        let mut wizard = WizardState::new(DeviceKind::Scte283);
        let mut machine = SubmissionMachine::new(SubmitMode::Create);
        submit(&mut machine, &draft, &mut wizard, &client).await.unwrap();
        let body = received.lock().unwrap().take().unwrap();
        assert!(body.get("Scte279Amplifier").is_some());
        assert_eq!(body["lorawan"]["devEUI"], "AABBCCDDEEFF0011");

        let mut machine = SubmissionMachine::new(SubmitMode::Edit { dev_eui: "X".into() });
        let error = submit(&mut machine, &draft, &mut wizard, &client).await.unwrap_err();
        assert!(matches!(error, SubmitError::Failed(_)));
        assert_eq!(error.to_string(), DEVICE_SAVE_FAILED_MESSAGE);
    }
}
