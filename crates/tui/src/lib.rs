//! # simctl terminal console
//!
//! Interactive ratatui console for the device simulator backend: dashboard,
//! gateway and device lists, the multi-step device wizard, bulk creation,
//! device logs and the gateway bridge view.
//!
//! ## Architecture
//!
//! Every screen is a component (see `ui::components`) that renders state
//! kept on the central `App` and answers input with `Effect`s. The runtime
//! executes effects through `cmd`, which runs backend calls on tokio tasks
//! and feeds their `ExecOutcome`s back through `App::update`.

mod app;
mod cmd;
mod ui;

use std::sync::Arc;

use anyhow::Result;
use simctl_api::SimctlClient;
use simctl_util::{GeocodingClient, SessionStore};

/// Runs the console until the operator quits (Ctrl+C).
///
/// `client` is the unbound backend client; it is bound to the session user
/// for each call, so logging in and out inside the console takes effect
/// immediately.
///
/// # Errors
///
/// Returns an error when the terminal cannot be put into (or restored from)
/// raw mode or the alternate screen.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let client = simctl_api::SimctlClient::new_from_env()?;
///     let session = Arc::new(simctl_util::SessionStore::new()?);
///     let geocoder = simctl_util::GeocodingClient::new_from_env()?;
///     simctl_tui::run(client, session, geocoder).await
/// }
/// ```
pub async fn run(client: SimctlClient, session: Arc<SessionStore>, geocoder: GeocodingClient) -> Result<()> {
    ui::runtime::run_app(app::SharedCtx::new(client, session, geocoder)).await
}
