use simctl_types::DashboardView;

#[derive(Debug, Default)]
pub struct DashboardState {
    pub view: Option<DashboardView>,
    pub loading: bool,
}

impl DashboardState {
    /// The four headline figures: total, connected, disconnected devices and gateways.
    pub fn totals(&self) -> [(&'static str, u64); 4] {
        let view = self.view.clone().unwrap_or_default();
        [
            ("Devices", u64::from(view.summary.total_devices)),
            ("Connected", u64::from(view.summary.active_devices)),
            ("Disconnected", u64::from(view.summary.disconnected_devices())),
            ("Gateways", view.total_gateways as u64),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::DashboardSummary;

    #[test]
    fn disconnected_is_total_minus_active() {
        let state = DashboardState {
            view: Some(DashboardView {
                summary: DashboardSummary {
                    total_devices: 10,
                    active_devices: 7,
                },
                total_gateways: 2,
                ..Default::default()
            }),
            loading: false,
        };
        assert_eq!(state.totals(), [("Devices", 10), ("Connected", 7), ("Disconnected", 3), ("Gateways", 2)]);
        assert_eq!(DashboardState::default().totals()[0], ("Devices", 0));
    }
}
