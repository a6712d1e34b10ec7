//! Device-management backend client.
//!
//! This crate provides a lightweight client for the simulator backend's REST
//! API. It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating `SIMCTL_API_BASE` for safety
//! - Building requests with a consistent User-Agent and Accept headers
//! - Typed endpoint methods that unwrap the backend's `{"response": ...}`
//!   envelopes and turn failures into [`ApiError`]
//!
//! The primary entry point is [`SimctlClient`]. Create an instance via
//! [`SimctlClient::new_from_env`], bind it to the logged-in operator with
//! [`SimctlClient::for_user`], then call the endpoint methods.
//!
//! # Example
//!
//! ```ignore
//! use simctl_api::SimctlClient;
//!
//! async fn count_devices() -> Result<usize, simctl_api::ApiError> {
//!     let client = SimctlClient::new_from_env()?.for_user("operator");
//!     Ok(client.list_devices().await?.len())
//! }
//! ```

use std::env;
use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::{Client, Method, RequestBuilder, Url, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use simctl_types::{
    ApiEnvelope, BulkDeviceRequest, BulkDeviceResponse, DashboardSummary, DashboardView, DevicePayload, DeviceSummary,
    GatewayBridgeConfig, GatewayPayload, GatewayRecord, LorawanPayload, SimulatorAction,
};
use simctl_types::dashboard::DeviceLogs;
use simctl_util::http::{backend_error_detail, parse_response_json_strict, status_error_message};
use simctl_util::{env_flag, redact_sensitive};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable holding the backend base URL (including `/api`).
pub const API_BASE_ENV: &str = "SIMCTL_API_BASE";
/// Set to a truthy value to allow plain-http non-local backends.
pub const ALLOW_INSECURE_ENV: &str = "SIMCTL_ALLOW_INSECURE";
pub const DEFAULT_API_BASE: &str = "http://localhost:8000/api";

/// Hostnames allowed for local development regardless of scheme.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Characters escaped inside a single path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid SIMCTL_API_BASE URL '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: String },
    #[error("no user bound to the client; run `simctl login <user>` first")]
    MissingUser,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        /// Backend-supplied error text, when the body carried one.
        detail: Option<String>,
    },
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status of a backend rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The backend's own explanation of a rejection, if it sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the backend.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL. Resource paths that are scoped to an operator use the
/// bound user name as a path segment.
pub struct SimctlClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
    user: Option<String>,
}

impl SimctlClient {
    /// Construct a [`SimctlClient`] from `SIMCTL_API_BASE`, falling back to
    /// the local development backend.
    ///
    /// Non-localhost hosts must use HTTPS unless `SIMCTL_ALLOW_INSECURE` is set.
    pub fn new_from_env() -> Result<Self, ApiError> {
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.into());
        Self::with_base(&base_url, env_flag(ALLOW_INSECURE_ENV))
    }

    pub fn with_base(base_url: &str, allow_insecure: bool) -> Result<Self, ApiError> {
        validate_base_url(base_url, allow_insecure)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("simctl/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
            user: None,
        })
    }

    /// Bind the client to an operator; user-scoped endpoints need this.
    pub fn for_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    ///
    /// The resulting request includes the configured User-Agent and base
    /// headers, and is resolved relative to `self.base_url`.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }

    // --- dashboard -------------------------------------------------------

    pub async fn dashboard_summary(&self) -> Result<DashboardSummary, ApiError> {
        self.get_json("/dashboard/total_count").await
    }

    /// Summary and gateway list fetched concurrently; each side degrades on
    /// its own failure.
    pub async fn dashboard(&self) -> DashboardView {
        let (summary, gateways) = futures_util::join!(self.dashboard_summary(), self.list_gateways());
        if let Err(error) = &summary {
            warn!(%error, "dashboard summary request failed");
        }
        if let Err(error) = &gateways {
            warn!(%error, "dashboard gateway request failed");
        }
        DashboardView::assemble(summary, gateways)
    }

    // --- devices ---------------------------------------------------------

    pub async fn list_devices(&self) -> Result<Vec<DeviceSummary>, ApiError> {
        let path = self.user_path("devices", &[])?;
        Ok(self.get_json::<ApiEnvelope<Vec<DeviceSummary>>>(&path).await?.response)
    }

    pub async fn get_device(&self, dev_eui: &str) -> Result<LorawanPayload, ApiError> {
        let path = self.user_path("devices", &[dev_eui])?;
        Ok(self.get_json::<ApiEnvelope<LorawanPayload>>(&path).await?.response)
    }

    pub async fn create_device(&self, payload: &DevicePayload) -> Result<Value, ApiError> {
        let path = self.user_path("devices", &[])?;
        self.send_json(Method::POST, &path, payload).await
    }

    pub async fn update_device(&self, dev_eui: &str, record: &LorawanPayload) -> Result<Value, ApiError> {
        let path = self.user_path("devices", &[dev_eui])?;
        self.send_json(Method::PUT, &path, record).await
    }

    pub async fn delete_device(&self, dev_eui: &str) -> Result<(), ApiError> {
        let path = self.user_path("devices", &[dev_eui])?;
        self.execute(self.request(Method::DELETE, &path)).await.map(drop)
    }

    pub async fn create_bulk_devices(&self, request: &BulkDeviceRequest) -> Result<BulkDeviceResponse, ApiError> {
        let path = self.user_path("devices", &["bulk"])?;
        self.send_json(Method::POST, &path, request).await
    }

    /// Log lines of one device, oldest first.
    pub async fn device_logs(&self, dev_eui: &str) -> Result<DeviceLogs, ApiError> {
        let path = format!("/devices/{}/logs", encode_segment(dev_eui));
        self.get_json(&path).await
    }

    /// Join, unjoin or toggle uplinks for a set of devices in one call.
    pub async fn device_simulator(&self, action: SimulatorAction, dev_euis: &[String]) -> Result<(), ApiError> {
        let path = match action {
            SimulatorAction::Join => "/v1/lns/devices/join",
            SimulatorAction::Unjoin => "/v1/lns/unjoin",
            SimulatorAction::StartUplink => "/v1/lns/startuplink",
            SimulatorAction::StopUplink => "/v1/lns/stopuplink",
        };
        self.send_json::<_, Value>(Method::POST, path, &json!({ "deviceList": dev_euis }))
            .await
            .map(drop)
    }

    // --- gateways --------------------------------------------------------

    pub async fn list_gateways(&self) -> Result<Vec<GatewayRecord>, ApiError> {
        let path = self.user_path("gateways", &[])?;
        Ok(self.get_json::<ApiEnvelope<Vec<GatewayRecord>>>(&path).await?.response)
    }

    pub async fn get_gateway(&self, id: &str) -> Result<GatewayRecord, ApiError> {
        let path = self.user_path("gateways", &[id])?;
        Ok(self.get_json::<ApiEnvelope<GatewayRecord>>(&path).await?.response)
    }

    pub async fn create_gateway(&self, payload: &GatewayPayload) -> Result<Value, ApiError> {
        let path = self.user_path("gateways", &[])?;
        self.send_json(Method::POST, &path, payload).await
    }

    pub async fn update_gateway(&self, id: &str, payload: &GatewayPayload) -> Result<Value, ApiError> {
        let path = self.user_path("gateways", &[id])?;
        self.send_json(Method::PUT, &path, payload).await
    }

    pub async fn delete_gateway(&self, id: &str) -> Result<(), ApiError> {
        let path = self.user_path("gateways", &[id])?;
        self.execute(self.request(Method::DELETE, &path)).await.map(drop)
    }

    pub async fn gateway_simulator(&self, action: SimulatorAction, gateway_id: &str) -> Result<(), ApiError> {
        let (path, body) = match action {
            SimulatorAction::Join => ("/v1/lns/gw/devices/join", json!({ "gwlist": [gateway_id] })),
            SimulatorAction::Unjoin => ("/v1/lns/gw/devices/unjoin", json!({ "gwlist": [gateway_id] })),
            SimulatorAction::StartUplink => ("/v1/lns/gw/startuplink", json!({ "gatewayId": gateway_id })),
            SimulatorAction::StopUplink => ("/v1/lns/gw/stopuplink", json!({ "gatewayId": gateway_id })),
        };
        self.send_json::<_, Value>(Method::POST, path, &body).await.map(drop)
    }

    pub async fn gateway_bridge_config(&self) -> Result<GatewayBridgeConfig, ApiError> {
        self.get_json("/gateway_bridge/config").await
    }

    // --- plumbing --------------------------------------------------------

    fn user_path(&self, collection: &str, rest: &[&str]) -> Result<String, ApiError> {
        let user = self.user.as_deref().ok_or(ApiError::MissingUser)?;
        let mut path = format!("/{collection}/{}", encode_segment(user));
        for segment in rest {
            path.push('/');
            path.push_str(&encode_segment(segment));
        }
        Ok(path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.execute(self.request(Method::GET, path)).await?;
        parse_response_json_strict(&body).map_err(ApiError::Decode)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let text = self.execute(self.request(method, path).json(body)).await?;
        if text.trim().is_empty() {
            // Some mutations answer 200 with no body.
            return serde_json::from_value(Value::Null).map_err(|error| ApiError::Decode(error.to_string()));
        }
        parse_response_json_strict(&text).map_err(ApiError::Decode)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(text);
        }

        let detail = backend_error_detail(&text);
        warn!(
            status = status.as_u16(),
            body = %redact_sensitive(&text),
            "backend rejected request"
        );
        let message = status_error_message(status.as_u16())
            .or_else(|| detail.clone())
            .unwrap_or_else(|| format!("HTTP {status}"));
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
            detail,
        })
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS unless `allow_insecure` is set
fn validate_base_url(base: &str, allow_insecure: bool) -> Result<(), ApiError> {
    let invalid = |reason: String| ApiError::InvalidBaseUrl {
        base: base.to_string(),
        reason,
    };
    let parsed_base_url = Url::parse(base).map_err(|e| invalid(e.to_string()))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| invalid("must include a host".into()))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" && !allow_insecure {
        return Err(invalid(format!(
            "must use https for non-localhost hosts; got '{}://' (set {ALLOW_INSECURE_ENV}=1 to override)",
            parsed_base_url.scheme()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use simctl_types::Region;

    async fn serve(router: Router) -> SimctlClient {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        SimctlClient::with_base(&format!("http://{address}/api"), false)
            .unwrap()
            .for_user("ops team")
    }

    #[test]
    fn base_url_rules() {
        assert!(validate_base_url("http://localhost:8000/api", false).is_ok());
        assert!(validate_base_url("http://127.0.0.1:9/api", false).is_ok());
        assert!(validate_base_url("https://sim.example.net/api", false).is_ok());
        assert!(validate_base_url("http://sim.example.net/api", false).is_err());
        assert!(validate_base_url("http://sim.example.net/api", true).is_ok());
        assert!(validate_base_url("not a url", true).is_err());
    }

    #[test]
    fn env_base_is_validated() {
        temp_env::with_vars(
            [(API_BASE_ENV, Some("http://sim.example.net/api")), (ALLOW_INSECURE_ENV, None)],
            || assert!(matches!(SimctlClient::new_from_env(), Err(ApiError::InvalidBaseUrl { .. }))),
        );
        temp_env::with_vars([(API_BASE_ENV, None::<&str>), (ALLOW_INSECURE_ENV, None)], || {
            assert_eq!(SimctlClient::new_from_env().unwrap().base_url, DEFAULT_API_BASE);
        });
    }

    #[tokio::test]
    async fn user_scoped_paths_are_encoded_and_unwrapped() {
        let router = Router::new()
            .route(
                "/api/devices/{user}",
                get(|Path(user): Path<String>| async move {
                    Json(json!({"response": [{"name": user, "devEUI": "0102030405060708", "gateway": "gw1"}]}))
                }),
            )
            .route(
                "/api/devices/{user}/{dev_eui}",
                get(|Path((_, dev_eui)): Path<(String, String)>| async move {
                    Json(json!({"response": {"name": "dev1", "devEUI": dev_eui, "fCnt": "7"}}))
                }),
            );
        let client = serve(router).await;

        let devices = client.list_devices().await.unwrap();
        assert_eq!(devices[0].name, "ops team");

        let record = client.get_device("AABB").await.unwrap();
        assert_eq!(record.dev_eui, "AABB");
        assert_eq!(record.f_cnt, 7);
    }

    #[tokio::test]
    async fn missing_user_is_reported_before_any_request() {
        let client = SimctlClient::with_base("http://localhost:1/api", false).unwrap();
        assert!(matches!(client.list_gateways().await, Err(ApiError::MissingUser)));
    }

    #[tokio::test]
    async fn rejection_carries_hint_and_detail() {
        let router = Router::new()
            .route(
                "/api/devices/{user}/bulk",
                post(|| async { (StatusCode::BAD_REQUEST, Json(json!({"error": "bad", "details": "gateway gw9 unknown"}))) }),
            )
            .route("/api/devices/{user}/{dev_eui}", put(|| async { StatusCode::NOT_FOUND }));
        let client = serve(router).await;

        let request = BulkDeviceRequest {
            number_of_devices: 3,
            name: "bulk".into(),
            gateway: "gw9".into(),
            region: Region::Eu868,
        };
        let error = client.create_bulk_devices(&request).await.unwrap_err();
        assert_eq!(error.status(), Some(400));
        assert_eq!(error.detail(), Some("gateway gw9 unknown"));

        let error = client.update_device("X", &LorawanPayload::default()).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
        assert!(error.to_string().contains("SIMCTL_API_BASE"));
    }

    #[tokio::test]
    async fn simulator_calls_use_the_backend_body_shapes() {
        let echo = |Json(body): Json<Value>| async move { Json(body) };
        let router = Router::new()
            .route("/api/v1/lns/devices/join", post(echo))
            .route("/api/v1/lns/gw/devices/unjoin", post(echo))
            .route("/api/v1/lns/gw/startuplink", post(echo))
            .route(
                "/api/v1/lns/stopuplink",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body, json!({"deviceList": ["A", "B"]}));
                    StatusCode::OK
                }),
            );
        let client = serve(router).await;

        client
            .device_simulator(SimulatorAction::Join, &["A".to_string()])
            .await
            .unwrap();
        client
            .device_simulator(SimulatorAction::StopUplink, &["A".to_string(), "B".to_string()])
            .await
            .unwrap();
        client.gateway_simulator(SimulatorAction::Unjoin, "gw-1").await.unwrap();
        client.gateway_simulator(SimulatorAction::StartUplink, "gw-1").await.unwrap();
        assert!(client.gateway_simulator(SimulatorAction::StopUplink, "gw-1").await.is_err());
    }

    #[tokio::test]
    async fn dashboard_degrades_per_request() {
        let router = Router::new().route(
            "/api/dashboard/total_count",
            get(|| async { Json(json!({"total_devices": 5, "active_devices": 2})) }),
        );
        let client = serve(router).await;

        let view = client.dashboard().await;
        assert_eq!(view.summary.disconnected_devices(), 3);
        assert_eq!(view.total_gateways, 0);
        assert_eq!(view.error.as_deref(), Some(simctl_types::dashboard::GATEWAY_DATA_ERROR));
    }

    #[tokio::test]
    async fn logs_and_bridge_are_not_user_scoped() {
        let router = Router::new()
            .route(
                "/api/devices/{dev_eui}/logs",
                get(|| async { Json(json!({"logs": ["joined", "uplink sent"]})) }),
            )
            .route(
                "/api/gateway_bridge/config",
                get(|| async { Json(json!({"address": "10.0.0.5", "port": 1700})) }),
            );
        let client = serve(router).await;

        assert_eq!(client.device_logs("AA").await.unwrap().tail(), vec!["joined", "uplink sent"]);
        let bridge = client.gateway_bridge_config().await.unwrap();
        assert_eq!(bridge.port, "1700");
    }
}
