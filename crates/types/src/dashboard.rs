//! Read-only records shown on the dashboard, log and bridge screens.

use serde::{Deserialize, Serialize};

use crate::gateway::GatewayRecord;
use crate::lenient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub total_devices: u32,
    #[serde(default, deserialize_with = "lenient::u32_or_zero")]
    pub active_devices: u32,
}

impl DashboardSummary {
    pub fn disconnected_devices(&self) -> u32 {
        self.total_devices.saturating_sub(self.active_devices)
    }
}

/// Connected/disconnected device counts for one gateway, as charted on the
/// dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayDeviceCounts {
    pub name: String,
    pub connected: u32,
    pub disconnected: u32,
}

impl From<&GatewayRecord> for GatewayDeviceCounts {
    fn from(record: &GatewayRecord) -> Self {
        Self {
            name: record.name.clone(),
            connected: record.connected_devices.unwrap_or_default(),
            disconnected: record.disconnected_devices.unwrap_or_default(),
        }
    }
}

/// Everything the dashboard displays, assembled from two independent
/// requests. A failed request degrades to zeros or an empty list and leaves
/// an error message for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DashboardView {
    pub summary: DashboardSummary,
    pub total_gateways: usize,
    pub per_gateway: Vec<GatewayDeviceCounts>,
    pub error: Option<String>,
}

pub const DEVICE_DATA_ERROR: &str = "Failed to load device data.";
pub const GATEWAY_DATA_ERROR: &str = "Failed to load gateway data.";

impl DashboardView {
    /// Combine the two results. The device error wins when both fail.
    pub fn assemble<E>(summary: Result<DashboardSummary, E>, gateways: Result<Vec<GatewayRecord>, E>) -> Self {
        let mut error = None;
        let summary = summary.unwrap_or_else(|_| {
            error = Some(DEVICE_DATA_ERROR.to_string());
            DashboardSummary::default()
        });
        let gateways = gateways.unwrap_or_else(|_| {
            if error.is_none() {
                error = Some(GATEWAY_DATA_ERROR.to_string());
            }
            Vec::new()
        });
        Self {
            summary,
            total_gateways: gateways.len(),
            per_gateway: gateways.iter().map(GatewayDeviceCounts::from).collect(),
            error,
        }
    }
}

/// Device log lines, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DeviceLogs {
    #[serde(default)]
    pub logs: Option<Vec<String>>,
}

/// Number of trailing log lines kept for display.
pub const LOG_TAIL_LINES: usize = 600;
pub const NO_LOGS_MESSAGE: &str = "No logs found for this device.";

impl DeviceLogs {
    /// The last [`LOG_TAIL_LINES`] lines, or a single placeholder line when
    /// the backend has none (missing or empty).
    pub fn tail(self) -> Vec<String> {
        match self.logs {
            Some(mut lines) if !lines.is_empty() => {
                let skip = lines.len().saturating_sub(LOG_TAIL_LINES);
                lines.drain(..skip);
                lines
            }
            _ => vec![NO_LOGS_MESSAGE.to_string()],
        }
    }
}

/// Network server bridge the gateways forward to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GatewayBridgeConfig {
    #[serde(default, deserialize_with = "lenient::string")]
    pub address: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub port: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_degrades_each_source_independently() {
        let gateways = vec![GatewayRecord {
            name: "gw1".into(),
            connected_devices: Some(3),
            ..Default::default()
        }];
        let view = DashboardView::assemble::<()>(Err(()), Ok(gateways));
        assert_eq!(view.summary, DashboardSummary::default());
        assert_eq!(view.total_gateways, 1);
        assert_eq!(view.per_gateway[0].connected, 3);
        assert_eq!(view.error.as_deref(), Some(DEVICE_DATA_ERROR));

        let summary = DashboardSummary {
            total_devices: 10,
            active_devices: 4,
        };
        let view = DashboardView::assemble::<()>(Ok(summary), Err(()));
        assert_eq!(view.summary.disconnected_devices(), 6);
        assert!(view.per_gateway.is_empty());
        assert_eq!(view.error.as_deref(), Some(GATEWAY_DATA_ERROR));
    }

    #[test]
    fn log_tail_keeps_the_most_recent_lines() {
        let logs = DeviceLogs {
            logs: Some((0..650).map(|n| format!("line {n}")).collect()),
        };
        let tail = logs.tail();
        assert_eq!(tail.len(), LOG_TAIL_LINES);
        assert_eq!(tail.first().map(String::as_str), Some("line 50"));
        assert_eq!(DeviceLogs::default().tail(), vec![NO_LOGS_MESSAGE.to_string()]);
    }
}
