//! Application state for the simctl console.
//!
//! [`App`] owns the state of every screen plus the shared context (theme,
//! backend client, session). Components mutate it in response to input;
//! [`App::update`] applies the outcomes of background calls and returns the
//! follow-up effects (navigation, modals, reloads).

use std::sync::Arc;

use simctl_api::SimctlClient;
use simctl_engine::GatewayForm;
use simctl_engine::selection::{
    DEVICE_DELETE_FAILED_MESSAGE, DEVICES_FETCH_FAILED_MESSAGE, GATEWAY_DELETE_FAILED_MESSAGE, GATEWAYS_DELETED_MESSAGE,
    GATEWAYS_FETCH_FAILED_MESSAGE, device_action_failure, gateway_action_failure,
};
use simctl_types::{DeviceKind, Effect, ExecOutcome, Modal, Msg, Route, SubmitIntent};
use simctl_util::{GeocodingClient, SessionError, SessionStore};
use tracing::{debug, info, warn};

use crate::ui::components::bridge::BridgeState;
use crate::ui::components::dashboard::DashboardState;
use crate::ui::components::devices::{
    BulkState, DEVICE_LOAD_FAILED_MESSAGE, DEVICE_LOGS_FAILED_MESSAGE, DeviceLogsState, DevicesState,
};
use crate::ui::components::gateways::{
    GATEWAY_LOAD_FAILED_MESSAGE, GATEWAY_SAVE_FAILED_MESSAGE, GatewayFormFocus, GatewayFormState, GatewaysState,
};
use crate::ui::components::login::LoginState;
use crate::ui::components::logs::{LogLevel, LogsState};
use crate::ui::components::nav_bar::NavBarState;
use crate::ui::components::wizard::WizardScreen;
use crate::ui::theme::{self, Theme};

pub const ADDRESS_NOT_FOUND_MESSAGE: &str = "No location matches that address.";
pub const ADDRESS_SEARCH_FAILED_MESSAGE: &str = "Address search failed. Please try again.";

/// Frames of the busy indicator shown while calls are in flight.
pub const THROBBER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Cross-cutting shared context owned by the App.
///
/// Holds the runtime-wide objects every screen may need so that components
/// only receive `&mut App`.
pub struct SharedCtx {
    pub theme: Box<dyn Theme>,
    /// Backend client without a bound user; see [`SharedCtx::user_client`].
    pub client: SimctlClient,
    pub session: Arc<SessionStore>,
    pub geocoder: GeocodingClient,
}

impl SharedCtx {
    pub fn new(client: SimctlClient, session: Arc<SessionStore>, geocoder: GeocodingClient) -> Self {
        Self {
            theme: theme::load(),
            client,
            session,
            geocoder,
        }
    }

    /// Client bound to the logged-in operator.
    pub fn user_client(&self) -> Result<SimctlClient, SessionError> {
        Ok(self.client.clone().for_user(self.session.require_user()?))
    }
}

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusArea {
    NavBar,
    #[default]
    Content,
    Logs,
}

pub struct App {
    pub ctx: SharedCtx,
    /// Current primary route
    pub route: Route,
    pub focus: FocusArea,
    pub nav_bar: NavBarState,
    pub logs: LogsState,
    pub login: LoginState,
    pub dashboard: DashboardState,
    pub gateways: GatewaysState,
    pub gateway_form: GatewayFormState,
    pub devices: DevicesState,
    /// Open device wizard; `None` outside the wizard screen.
    pub wizard: Option<WizardScreen>,
    pub bulk: BulkState,
    pub device_logs: DeviceLogsState,
    pub bridge: BridgeState,
    /// Whether background calls are in flight
    pub executing: bool,
    /// Current frame of the busy indicator
    pub throbber_idx: usize,
}

impl App {
    /// Start on the dashboard when a session exists, otherwise on login.
    pub fn new(ctx: SharedCtx) -> Self {
        let route = if ctx.session.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        };
        Self {
            ctx,
            route,
            focus: FocusArea::Content,
            nav_bar: NavBarState::defaults_for_views(),
            logs: LogsState::default(),
            login: LoginState::default(),
            dashboard: DashboardState::default(),
            gateways: GatewaysState::default(),
            gateway_form: GatewayFormState::default(),
            devices: DevicesState::default(),
            wizard: None,
            bulk: BulkState::default(),
            device_logs: DeviceLogsState::default(),
            bridge: BridgeState::default(),
            executing: false,
            throbber_idx: 0,
        }
    }

    /// Append a line to the log pane and mirror it to the tracing log.
    pub fn log(&mut self, level: LogLevel, message: impl AsRef<str>) {
        let message = message.as_ref();
        match level {
            LogLevel::Info => info!("{message}"),
            LogLevel::Warn | LogLevel::Error => warn!("{message}"),
        }
        self.logs.push(level, message);
    }

    /// Open a blank wizard for a new device of `kind`.
    pub fn open_wizard(&mut self, kind: DeviceKind) {
        self.wizard = Some(WizardScreen::create(kind, self.ctx.session.default_region()));
    }

    /// The route actually shown for `route`: everything but Login needs a session.
    pub fn resolve_route(&self, route: Route) -> Route {
        if route.requires_session() && !self.ctx.session.is_authenticated() {
            Route::Login
        } else {
            route
        }
    }

    pub fn throbber(&self) -> &'static str {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }

    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                if self.executing {
                    self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                }
                Vec::new()
            }
            Msg::Resize(..) => Vec::new(),
            Msg::ExecCompleted(outcome) => self.apply_outcome(outcome),
        }
    }

    fn apply_outcome(&mut self, outcome: &ExecOutcome) -> Vec<Effect> {
        match outcome {
            ExecOutcome::Log(line) => {
                self.log(LogLevel::Info, line);
                Vec::new()
            }
            ExecOutcome::Session(result) => self.apply_session(result),
            ExecOutcome::Dashboard(view) => {
                if let Some(error) = &view.error {
                    self.log(LogLevel::Warn, error);
                }
                self.dashboard.view = Some(view.clone());
                self.dashboard.loading = false;
                Vec::new()
            }
            ExecOutcome::Gateways(result) => match result {
                Ok(rows) => {
                    self.gateways.set_rows(rows.clone());
                    Vec::new()
                }
                Err(error) => {
                    self.gateways.loading = false;
                    self.fail(GATEWAYS_FETCH_FAILED_MESSAGE, error)
                }
            },
            ExecOutcome::GatewayLoaded(result) => match result {
                Ok(record) => {
                    self.gateway_form.load(GatewayForm::from_record(record));
                    vec![Effect::SwitchTo(Route::GatewayForm)]
                }
                Err(error) => self.fail(GATEWAY_LOAD_FAILED_MESSAGE, error),
            },
            ExecOutcome::GatewaySaved(result) => {
                self.gateway_form.saving = false;
                match result {
                    Ok(name) => {
                        self.log(LogLevel::Info, format!("Gateway {name} saved"));
                        vec![Effect::SwitchTo(Route::Gateways)]
                    }
                    Err(error) => self.fail(GATEWAY_SAVE_FAILED_MESSAGE, error),
                }
            }
            ExecOutcome::GatewaysDeleted(result) => {
                let mut effects = match result {
                    Ok(count) => {
                        self.log(LogLevel::Info, format!("Deleted {count} gateway(s)"));
                        vec![Effect::ShowModal(Modal::info(GATEWAYS_DELETED_MESSAGE))]
                    }
                    Err(error) => self.fail(GATEWAY_DELETE_FAILED_MESSAGE, error),
                };
                // Some deletions may have gone through before a failure.
                effects.push(Effect::LoadGateways);
                effects
            }
            ExecOutcome::GatewaySimulator {
                gateway_id,
                action,
                result,
            } => {
                let name = self.gateways.name_of(gateway_id).unwrap_or(gateway_id.as_str()).to_string();
                match result {
                    Ok(()) => {
                        self.gateways.apply_action(gateway_id, *action);
                        self.log(LogLevel::Info, format!("{action} accepted for gateway {name}"));
                        Vec::new()
                    }
                    Err(error) => self.fail(&gateway_action_failure(*action, &name), error),
                }
            }
            ExecOutcome::Devices(result) => match result {
                Ok(rows) => {
                    self.devices.set_rows(rows.clone());
                    Vec::new()
                }
                Err(error) => {
                    self.devices.loading = false;
                    self.fail(DEVICES_FETCH_FAILED_MESSAGE, error)
                }
            },
            ExecOutcome::DeviceSimulator { dev_euis, action, result } => match result {
                Ok(()) => {
                    self.devices.apply_action(*action, dev_euis);
                    self.log(LogLevel::Info, format!("{action} accepted for {} device(s)", dev_euis.len()));
                    Vec::new()
                }
                Err(error) => self.fail(device_action_failure(*action), error),
            },
            ExecOutcome::DevicesDeleted(result) => {
                let mut effects = match result {
                    Ok(count) => {
                        self.log(LogLevel::Info, format!("Deleted {count} device(s)"));
                        Vec::new()
                    }
                    Err(error) => self.fail(DEVICE_DELETE_FAILED_MESSAGE, error),
                };
                effects.push(Effect::LoadDevices);
                effects
            }
            ExecOutcome::DeviceLoaded(result) => match result {
                Ok((record, gateways)) => {
                    self.wizard = Some(WizardScreen::edit(record, gateways.clone()));
                    vec![Effect::SwitchTo(Route::DeviceWizard)]
                }
                Err(error) => self.fail(DEVICE_LOAD_FAILED_MESSAGE, error),
            },
            ExecOutcome::WizardGateways(result) => match result {
                Ok(gateways) => {
                    match (self.route, self.wizard.as_mut()) {
                        (Route::DeviceWizard, Some(wizard)) => wizard.set_gateways(gateways.clone()),
                        (Route::BulkDevices, _) => self.bulk.gateways = gateways.clone(),
                        _ => debug!("gateway list arrived after leaving the form"),
                    }
                    Vec::new()
                }
                Err(error) => self.fail(GATEWAYS_FETCH_FAILED_MESSAGE, error),
            },
            ExecOutcome::DeviceSubmitted { ticket, result } => self.apply_submission(*ticket, result),
            ExecOutcome::BulkCreated(result) => {
                self.bulk.submitting = false;
                match result {
                    Ok(response) => {
                        let summary = response.summary();
                        self.log(LogLevel::Info, &summary);
                        vec![Effect::ShowModal(Modal::info(summary)), Effect::SwitchTo(Route::Devices)]
                    }
                    Err(message) => {
                        self.log(LogLevel::Error, message);
                        vec![Effect::ShowModal(Modal::error(message.clone()))]
                    }
                }
            }
            ExecOutcome::DeviceLogs { dev_eui, result } => {
                if let Err(error) = result {
                    self.log(LogLevel::Error, format!("{DEVICE_LOGS_FAILED_MESSAGE} ({dev_eui}: {error})"));
                }
                if !self.device_logs.apply(dev_eui, result.clone()) {
                    debug!(%dev_eui, "dropping logs of a device no longer shown");
                }
                Vec::new()
            }
            ExecOutcome::Bridge(result) => {
                if let Err(error) = result {
                    self.log(LogLevel::Error, format!("Loading the gateway bridge failed: {error}"));
                }
                self.bridge.apply(result.clone());
                Vec::new()
            }
            ExecOutcome::Address(address) => {
                match (self.route, self.wizard.as_mut()) {
                    (Route::DeviceWizard, Some(wizard)) => wizard.set_address(address.clone()),
                    (Route::GatewayForm, _) => {
                        self.gateway_form.form.location.address = address.clone();
                        self.gateway_form.fields.invalidate();
                    }
                    _ => debug!("address arrived after leaving the form"),
                }
                Vec::new()
            }
            ExecOutcome::AddressSearch(result) => match result {
                Ok(Some((latitude, longitude))) => {
                    let (latitude, longitude) = (*latitude, *longitude);
                    match (self.route, self.wizard.as_mut()) {
                        (Route::DeviceWizard, Some(wizard)) => wizard.show_search_hit(latitude, longitude),
                        (Route::GatewayForm, _) => {
                            self.gateway_form.form.set_coordinates(latitude, longitude);
                            self.gateway_form.fields.invalidate();
                            self.gateway_form.focus = GatewayFormFocus::Fields;
                        }
                        _ => return Vec::new(),
                    }
                    vec![Effect::ReverseGeocode { latitude, longitude }]
                }
                Ok(None) => vec![Effect::ShowModal(Modal::info(ADDRESS_NOT_FOUND_MESSAGE))],
                Err(error) => self.fail(ADDRESS_SEARCH_FAILED_MESSAGE, error),
            },
        }
    }

    fn apply_session(&mut self, result: &Result<Option<String>, String>) -> Vec<Effect> {
        match result {
            Ok(Some(user)) => {
                self.log(LogLevel::Info, format!("Logged in as {user}"));
                self.login.clear();
                vec![Effect::SwitchTo(Route::Dashboard)]
            }
            Ok(None) => {
                self.log(LogLevel::Info, "Logged out");
                self.dashboard = DashboardState::default();
                self.gateways = GatewaysState::default();
                self.devices = DevicesState::default();
                self.wizard = None;
                vec![Effect::SwitchTo(Route::Login)]
            }
            Err(error) => {
                self.log(LogLevel::Error, error);
                self.login.error = Some(error.clone());
                Vec::new()
            }
        }
    }

    /// Hand a submission result to the wizard that issued it. A result for a
    /// wizard that was closed (or has moved on) is only logged.
    fn apply_submission(&mut self, ticket: u64, result: &Result<(), String>) -> Vec<Effect> {
        let awaited = self.wizard.as_ref().is_some_and(|wizard| wizard.machine.awaits(ticket));
        let Some(wizard) = self.wizard.as_mut().filter(|_| awaited) else {
            match result {
                Ok(()) => self.log(LogLevel::Info, "Device saved"),
                Err(error) => self.log(LogLevel::Error, format!("Saving the device failed: {error}")),
            }
            return Vec::new();
        };
        match wizard.finish(ticket, result.clone()) {
            Ok((intent, message)) => {
                self.log(LogLevel::Info, message);
                let mut effects = vec![Effect::ShowModal(Modal::info(message))];
                if intent == SubmitIntent::Close {
                    effects.push(Effect::SwitchTo(Route::Devices));
                }
                effects
            }
            Err(error) => {
                if let Err(detail) = result {
                    self.log(LogLevel::Error, format!("Saving the device failed: {detail}"));
                }
                vec![Effect::ShowModal(Modal::error(error.to_string()))]
            }
        }
    }

    /// Log the detail and show the operator the generic message.
    fn fail(&mut self, message: &str, detail: &str) -> Vec<Effect> {
        self.log(LogLevel::Error, format!("{message} ({detail})"));
        vec![Effect::ShowModal(Modal::error(message))]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use simctl_api::DEFAULT_API_BASE;
    use simctl_engine::submission::{DEVICE_CREATED_MESSAGE, DEVICE_SAVE_FAILED_MESSAGE};
    use simctl_types::gateway::RecordId;
    use simctl_types::{
        BulkDeviceResponse, DeviceSubmission, DeviceSummary, GatewayRecord, GatewayRef, Region, SimulatorAction,
    };

    pub(crate) fn test_app() -> App {
        let client = SimctlClient::with_base(DEFAULT_API_BASE, false).unwrap();
        let geocoder = GeocodingClient::with_base("http://127.0.0.1:9").unwrap();
        let session = Arc::new(SessionStore::ephemeral());
        session.login("tester").unwrap();
        App::new(SharedCtx::new(client, session, geocoder))
    }

    fn completed(outcome: ExecOutcome) -> Msg {
        Msg::ExecCompleted(Box::new(outcome))
    }

    fn gateway(id: &str, name: &str) -> GatewayRecord {
        GatewayRecord {
            id: Some(RecordId::Plain(id.into())),
            name: name.into(),
            ..Default::default()
        }
    }

    fn ready_wizard(app: &mut App) {
        app.open_wizard(DeviceKind::Lorawan);
        app.route = Route::DeviceWizard;
        let wizard = app.wizard.as_mut().unwrap();
        wizard.draft.general.name = "dev1".into();
        wizard.draft.general.dev_eui = "AABBCCDDEEFF0011".into();
        wizard.draft.general.region = Some(Region::Us915);
        wizard.draft.general.gateway = Some(GatewayRef {
            name: "gw1".into(),
            mac_address: "0011223344556677".into(),
        });
    }

    #[test]
    fn routes_need_a_session() {
        let app = test_app();
        assert_eq!(app.route, Route::Dashboard);
        assert_eq!(app.resolve_route(Route::Devices), Route::Devices);

        app.ctx.session.logout().unwrap();
        if app.ctx.session.is_authenticated() {
            // SIMCTL_USER is set in this environment.
            return;
        }
        assert_eq!(app.resolve_route(Route::Devices), Route::Login);
        assert_eq!(app.resolve_route(Route::Login), Route::Login);
    }

    #[test]
    fn login_outcome_clears_the_form_and_opens_the_dashboard() {
        let mut app = test_app();
        app.login.error = Some("stale".into());
        let effects = app.update(&completed(ExecOutcome::Session(Ok(Some("ops".into())))));
        assert_eq!(effects, vec![Effect::SwitchTo(Route::Dashboard)]);
        assert!(app.login.error.is_none());

        let effects = app.update(&completed(ExecOutcome::Session(Ok(None))));
        assert_eq!(effects, vec![Effect::SwitchTo(Route::Login)]);
    }

    #[test]
    fn list_failures_show_the_generic_message() {
        let mut app = test_app();
        app.devices.loading = true;
        let effects = app.update(&completed(ExecOutcome::Devices(Err("HTTP 500".into()))));
        assert_eq!(effects, vec![Effect::ShowModal(Modal::error(DEVICES_FETCH_FAILED_MESSAGE))]);
        assert!(!app.devices.loading);
        assert!(app.logs.entries.iter().any(|entry| entry.message.contains("HTTP 500")));
    }

    #[test]
    fn accepted_device_action_updates_the_rows() {
        let mut app = test_app();
        app.devices.set_rows(vec![DeviceSummary {
            dev_eui: "01".into(),
            ..Default::default()
        }]);
        app.update(&completed(ExecOutcome::DeviceSimulator {
            dev_euis: vec!["01".into()],
            action: SimulatorAction::Join,
            result: Ok(()),
        }));
        assert_eq!(app.devices.rows[0].simulator_status().as_str(), "playing");
    }

    #[test]
    fn gateway_deletion_always_reloads() {
        let mut app = test_app();
        let effects = app.update(&completed(ExecOutcome::GatewaysDeleted(Err("boom".into()))));
        assert_eq!(
            effects,
            vec![Effect::ShowModal(Modal::error(GATEWAY_DELETE_FAILED_MESSAGE)), Effect::LoadGateways]
        );
    }

    #[test]
    fn wizard_gateways_go_to_the_open_screen() {
        let mut app = test_app();
        app.route = Route::BulkDevices;
        app.update(&completed(ExecOutcome::WizardGateways(Ok(vec![gateway("g1", "gw1")]))));
        assert_eq!(app.bulk.gateways.len(), 1);

        ready_wizard(&mut app);
        app.update(&completed(ExecOutcome::WizardGateways(Ok(vec![gateway("g1", "gw1"), gateway("g2", "gw2")]))));
        assert_eq!(app.wizard.as_ref().unwrap().gateways.len(), 2);
    }

    #[test]
    fn saved_device_closes_the_wizard() {
        let mut app = test_app();
        ready_wizard(&mut app);
        let submission = app.wizard.as_mut().unwrap().submit(SubmitIntent::Close).unwrap();
        assert!(matches!(submission, DeviceSubmission::Create(_)));
        let ticket = app.wizard.as_ref().unwrap().machine.ticket();

        let effects = app.update(&completed(ExecOutcome::DeviceSubmitted { ticket, result: Ok(()) }));
        assert_eq!(
            effects,
            vec![Effect::ShowModal(Modal::info(DEVICE_CREATED_MESSAGE)), Effect::SwitchTo(Route::Devices)]
        );
    }

    #[test]
    fn failed_save_keeps_the_draft() {
        let mut app = test_app();
        ready_wizard(&mut app);
        app.wizard.as_mut().unwrap().submit(SubmitIntent::New).unwrap();
        let ticket = app.wizard.as_ref().unwrap().machine.ticket();

        let effects = app.update(&completed(ExecOutcome::DeviceSubmitted {
            ticket,
            result: Err("HTTP 500".into()),
        }));
        assert_eq!(effects, vec![Effect::ShowModal(Modal::error(DEVICE_SAVE_FAILED_MESSAGE))]);
        let wizard = app.wizard.as_ref().unwrap();
        assert_eq!(wizard.draft.general.name, "dev1");
        assert!(!wizard.machine.is_in_flight());
    }

    #[test]
    fn log_fetch_failure_keeps_the_detail_in_the_log_panel() {
        let mut app = test_app();
        app.device_logs.open("AABBCCDDEEFF0011", "node-1");
        let effects = app.update(&completed(ExecOutcome::DeviceLogs {
            dev_eui: "AABBCCDDEEFF0011".into(),
            result: Err("HTTP 502".into()),
        }));
        assert!(effects.is_empty());
        assert!(app.device_logs.failed);
        let entry = app.logs.entries.last().unwrap();
        assert!(entry.message.starts_with(DEVICE_LOGS_FAILED_MESSAGE));
        assert!(entry.message.contains("HTTP 502"));
    }

    #[test]
    fn late_result_leaves_a_new_wizard_alone() {
        let mut app = test_app();
        ready_wizard(&mut app);
        app.wizard.as_mut().unwrap().submit(SubmitIntent::Close).unwrap();
        let ticket = app.wizard.as_ref().unwrap().machine.ticket();

        app.wizard = None;
        app.open_wizard(DeviceKind::Lorawan);
        app.wizard.as_mut().unwrap().draft.general.name = "half-typed".into();

        for result in [Err("HTTP 500".to_string()), Ok(())] {
            let effects = app.update(&completed(ExecOutcome::DeviceSubmitted { ticket, result }));
            assert!(effects.is_empty());
        }
        let wizard = app.wizard.as_ref().unwrap();
        assert_eq!(wizard.draft.general.name, "half-typed");
        assert_eq!(wizard.machine.phase(), simctl_engine::SubmissionPhase::Idle);
    }

    #[test]
    fn bulk_success_reports_the_backend_summary() {
        let mut app = test_app();
        app.bulk.submitting = true;
        let effects = app.update(&completed(ExecOutcome::BulkCreated(Ok(BulkDeviceResponse {
            message: None,
            inserted_count: Some(4),
        }))));
        assert_eq!(
            effects,
            vec![
                Effect::ShowModal(Modal::info("Successfully created 4 devices.")),
                Effect::SwitchTo(Route::Devices)
            ]
        );
        assert!(!app.bulk.submitting);
    }

    #[test]
    fn search_hit_moves_the_gateway_and_looks_up_its_address() {
        let mut app = test_app();
        app.route = Route::GatewayForm;
        app.gateway_form.focus = GatewayFormFocus::Search;
        let effects = app.update(&completed(ExecOutcome::AddressSearch(Ok(Some((48.85, 2.35))))));
        assert_eq!(
            effects,
            vec![Effect::ReverseGeocode {
                latitude: 48.85,
                longitude: 2.35
            }]
        );
        assert_eq!(app.gateway_form.form.location.latitude, 48.85);
        assert_eq!(app.gateway_form.focus, GatewayFormFocus::Fields);

        app.update(&completed(ExecOutcome::Address("Paris".into())));
        assert_eq!(app.gateway_form.form.location.address, "Paris");
    }
}
