//! # Command Execution Layer
//!
//! This module turns the [`Effect`]s requested by components into work. It
//! is the boundary where the state kept on [`App`] meets side effects:
//!
//! - session changes and clipboard writes run inline and come back as
//!   immediate [`ExecOutcome`]s;
//! - backend and geocoding calls run on spawned tokio tasks whose handles
//!   the runtime polls until they yield their outcome.
//!
//! Navigation effects (`SwitchTo`, `ShowModal`, `CloseModal`) never reach
//! this module; the runtime applies them directly.

use simctl_api::{ApiError, SimctlClient};
use simctl_engine::{bulk, submission};
use simctl_types::{DeviceLogs, Effect, ExecOutcome};
use simctl_util::GeocodingClient;
use tokio::task::{JoinHandle, spawn};
use tracing::{debug, warn};

use crate::app::App;

/// Outcomes available now plus handles to the ones still running.
#[derive(Debug, Default)]
pub struct CommandBatch {
    pub immediate: Vec<ExecOutcome>,
    pub pending: Vec<JoinHandle<ExecOutcome>>,
}

/// Side-effectful commands executed outside of pure state updates.
#[derive(Debug)]
enum Cmd {
    Login(String),
    Logout,
    ClipboardSet(String),
    /// A call that needs the network; runs on its own task.
    Remote(Effect),
}

fn from_effects(effects: Vec<Effect>) -> Vec<Cmd> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Login(user) => Some(Cmd::Login(user)),
            Effect::Logout => Some(Cmd::Logout),
            Effect::CopyToClipboardRequested(text) => Some(Cmd::ClipboardSet(text)),
            Effect::SwitchTo(_) | Effect::ShowModal(_) | Effect::CloseModal => None,
            remote => Some(Cmd::Remote(remote)),
        })
        .collect()
}

/// Execute `effects` and collect what they produced.
pub fn run_from_effects(app: &mut App, effects: Vec<Effect>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for command in from_effects(effects) {
        match command {
            Cmd::Login(user) => batch.immediate.push(execute_login(app, &user)),
            Cmd::Logout => batch.immediate.push(execute_logout(app)),
            Cmd::ClipboardSet(text) => batch.immediate.push(execute_clipboard_set(text)),
            Cmd::Remote(effect) => {
                let geocoder = app.ctx.geocoder.clone();
                match app.ctx.user_client() {
                    Ok(client) => {
                        debug!(?effect, "spawning backend call");
                        batch.pending.push(spawn(execute_remote(client, geocoder, effect)));
                    }
                    Err(error) => batch.immediate.push(ExecOutcome::Log(format!("Skipped request: {error}"))),
                }
            }
        }
    }
    batch
}

fn execute_login(app: &App, user: &str) -> ExecOutcome {
    let result = app
        .ctx
        .session
        .login(user)
        .map(|()| Some(user.trim().to_string()))
        .map_err(|error| error.to_string());
    ExecOutcome::Session(result)
}

fn execute_logout(app: &App) -> ExecOutcome {
    ExecOutcome::Session(app.ctx.session.logout().map(|()| None).map_err(|error| error.to_string()))
}

fn execute_clipboard_set(text: String) -> ExecOutcome {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => ExecOutcome::Log("Copied to clipboard".into()),
        Err(error) => ExecOutcome::Log(format!("Clipboard error: {error}")),
    }
}

fn describe(error: ApiError) -> String {
    warn!(%error, "backend call failed");
    error.to_string()
}

async fn execute_remote(client: SimctlClient, geocoder: GeocodingClient, effect: Effect) -> ExecOutcome {
    match effect {
        Effect::LoadDashboard => ExecOutcome::Dashboard(client.dashboard().await),
        Effect::LoadGateways => ExecOutcome::Gateways(client.list_gateways().await.map_err(describe)),
        Effect::LoadGateway(id) => ExecOutcome::GatewayLoaded(client.get_gateway(&id).await.map_err(describe)),
        Effect::SaveGateway { id, payload } => {
            let result = match id.as_deref() {
                Some(id) => client.update_gateway(id, &payload).await,
                None => client.create_gateway(&payload).await,
            };
            ExecOutcome::GatewaySaved(result.map(|_| payload.name).map_err(describe))
        }
        Effect::DeleteGateways(ids) => {
            let mut deleted = 0;
            for id in &ids {
                if let Err(error) = client.delete_gateway(id).await {
                    return ExecOutcome::GatewaysDeleted(Err(describe(error)));
                }
                deleted += 1;
            }
            ExecOutcome::GatewaysDeleted(Ok(deleted))
        }
        Effect::GatewaySimulator { gateway_id, action } => {
            let result = client.gateway_simulator(action, &gateway_id).await.map_err(describe);
            ExecOutcome::GatewaySimulator {
                gateway_id,
                action,
                result,
            }
        }
        Effect::LoadDevices => ExecOutcome::Devices(client.list_devices().await.map_err(describe)),
        Effect::DeviceSimulator { dev_euis, action } => {
            let result = client.device_simulator(action, &dev_euis).await.map_err(describe);
            ExecOutcome::DeviceSimulator { dev_euis, action, result }
        }
        Effect::DeleteDevices(dev_euis) => {
            let mut deleted = 0;
            for dev_eui in &dev_euis {
                if let Err(error) = client.delete_device(dev_eui).await {
                    return ExecOutcome::DevicesDeleted(Err(describe(error)));
                }
                deleted += 1;
            }
            ExecOutcome::DevicesDeleted(Ok(deleted))
        }
        Effect::EditDevice(dev_eui) => {
            let result = futures_util::try_join!(client.get_device(&dev_eui), client.list_gateways()).map_err(describe);
            ExecOutcome::DeviceLoaded(result)
        }
        Effect::LoadWizardGateways => ExecOutcome::WizardGateways(client.list_gateways().await.map_err(describe)),
        Effect::SubmitDevice { ticket, submission: device } => ExecOutcome::DeviceSubmitted {
            ticket,
            result: submission::dispatch(&client, &device).await,
        },
        Effect::CreateBulkDevices(request) => {
            let result = client.create_bulk_devices(&request).await.map_err(|error| {
                warn!(%error, "bulk creation failed");
                bulk::failure_message(&error)
            });
            ExecOutcome::BulkCreated(result)
        }
        Effect::LoadDeviceLogs(dev_eui) => {
            let result = client.device_logs(&dev_eui).await.map(DeviceLogs::tail).map_err(describe);
            ExecOutcome::DeviceLogs { dev_eui, result }
        }
        Effect::LoadBridge => ExecOutcome::Bridge(client.gateway_bridge_config().await.map_err(describe)),
        Effect::ReverseGeocode { latitude, longitude } => ExecOutcome::Address(geocoder.describe(latitude, longitude).await),
        Effect::SearchAddress(query) => {
            ExecOutcome::AddressSearch(geocoder.search(query.trim()).await.map_err(|error| error.to_string()))
        }
        other => ExecOutcome::Log(format!("No handler for {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use axum::{Json, Router, routing::get};
    use serde_json::json;
    use simctl_types::{Modal, Route};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{address}/api")
    }

    #[test]
    fn navigation_effects_are_left_to_the_runtime() {
        let commands = from_effects(vec![
            Effect::SwitchTo(Route::Devices),
            Effect::ShowModal(Modal::Help),
            Effect::CloseModal,
            Effect::Logout,
        ]);
        assert!(matches!(commands.as_slice(), [Cmd::Logout]));
    }

    #[tokio::test]
    async fn login_runs_inline() {
        let mut app = test_app();
        let batch = run_from_effects(&mut app, vec![Effect::Login(" ops ".into())]);
        assert!(batch.pending.is_empty());
        assert!(matches!(batch.immediate.as_slice(), [ExecOutcome::Session(Ok(Some(user)))] if user == "ops"));
    }

    #[tokio::test]
    async fn bridge_is_fetched_on_a_task() {
        let router = Router::new().route(
            "/api/gateway_bridge/config",
            get(|| async { Json(json!({ "address": "10.0.0.5", "port": 1700 })) }),
        );
        let base = serve(router).await;

        let mut app = test_app();
        app.ctx.client = SimctlClient::with_base(&base, false).unwrap();
        let mut batch = run_from_effects(&mut app, vec![Effect::LoadBridge]);
        assert!(batch.immediate.is_empty());

        let outcome = batch.pending.pop().unwrap().await.unwrap();
        match outcome {
            ExecOutcome::Bridge(Ok(config)) => {
                assert_eq!(config.address, "10.0.0.5");
                assert_eq!(config.port, "1700");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn device_list_failure_carries_the_status_message() {
        let router = Router::new().route(
            "/api/devices/{user}",
            get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = serve(router).await;

        let mut app = test_app();
        app.ctx.client = SimctlClient::with_base(&base, false).unwrap();
        let mut batch = run_from_effects(&mut app, vec![Effect::LoadDevices]);
        let outcome = batch.pending.pop().unwrap().await.unwrap();
        assert!(matches!(outcome, ExecOutcome::Devices(Err(_))));
    }
}
