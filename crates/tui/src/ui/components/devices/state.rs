use std::collections::BTreeSet;

use ratatui::widgets::{ListState, TableState};
use simctl_engine::BulkForm;
use simctl_engine::selection;
use simctl_types::{DeviceSummary, GatewayRecord, Region, SimulatorAction};

use crate::ui::components::common::form::{self, FormField};
use crate::ui::components::common::FormState;

pub const DEVICE_LOAD_FAILED_MESSAGE: &str = "Failed to load device. Please try again.";
pub const DEVICE_LOGS_FAILED_MESSAGE: &str = "Failed to load device logs.";

#[derive(Debug, Default)]
pub struct DevicesState {
    pub rows: Vec<DeviceSummary>,
    /// DevEUIs of marked rows.
    pub marked: BTreeSet<String>,
    pub table_state: TableState,
    pub loading: bool,
}

impl DevicesState {
    pub fn set_rows(&mut self, rows: Vec<DeviceSummary>) {
        self.marked.retain(|dev_eui| rows.iter().any(|row| &row.dev_eui == dev_eui));
        self.rows = rows;
        self.loading = false;
        let selected = self.table_state.selected().unwrap_or_default();
        self.table_state
            .select((!self.rows.is_empty()).then(|| selected.min(self.rows.len() - 1)));
    }

    pub fn cursor_row(&self) -> Option<&DeviceSummary> {
        self.rows.get(self.table_state.selected()?)
    }

    pub fn toggle_mark(&mut self) {
        let Some(dev_eui) = self.cursor_row().map(|row| row.dev_eui.clone()) else {
            return;
        };
        if !self.marked.remove(&dev_eui) {
            self.marked.insert(dev_eui);
        }
    }

    pub fn toggle_all(&mut self) {
        let all: BTreeSet<String> = self.rows.iter().map(|row| row.dev_eui.clone()).collect();
        if !all.is_empty() && self.marked == all {
            self.marked.clear();
        } else {
            self.marked = all;
        }
    }

    /// Marked rows, or the cursor row when nothing is marked.
    pub fn selected_rows(&self) -> Vec<&DeviceSummary> {
        if self.marked.is_empty() {
            return self.cursor_row().into_iter().collect();
        }
        self.rows.iter().filter(|row| self.marked.contains(&row.dev_eui)).collect()
    }

    pub fn targets(&self) -> Vec<&str> {
        self.selected_rows().into_iter().map(|row| row.dev_eui.as_str()).collect()
    }

    pub fn apply_action(&mut self, action: SimulatorAction, dev_euis: &[String]) {
        selection::apply_device_action(action, &mut self.rows, dev_euis);
    }
}

/// Bulk-creation screen: the form plus the gateways it can pick from.
#[derive(Debug, Default)]
pub struct BulkState {
    pub form: BulkForm,
    pub fields: FormState,
    pub gateways: Vec<GatewayRecord>,
    pub submitting: bool,
}

impl BulkState {
    pub fn open(&mut self, region: Option<Region>) {
        *self = Self {
            form: BulkForm {
                region,
                ..Default::default()
            },
            ..Default::default()
        };
    }
}

pub fn bulk_fields() -> Vec<FormField<BulkForm>> {
    vec![
        form::text("Number of devices", |f: &BulkForm| &f.count, |f: &mut BulkForm| &mut f.count)
            .required()
            .validated(|value: &str| value.trim().parse::<u32>().is_ok_and(|count| count > 0)),
        form::text("Name prefix", |f: &BulkForm| &f.name, |f: &mut BulkForm| &mut f.name).required(),
        form::choice(
            "Gateway",
            |f: &BulkForm| f.gateway.clone().unwrap_or_else(|| "-".to_string()),
            |f: &mut BulkForm, ctx, forward| {
                let current = f
                    .gateway
                    .as_deref()
                    .and_then(|name| ctx.gateways.iter().position(|gateway| gateway.name == name));
                if let Some(next) = form::cycle_index(current, ctx.gateways.len(), forward) {
                    f.select_gateway(&ctx.gateways[next]);
                }
            },
        )
        .required(),
        form::choice(
            "Region",
            |f: &BulkForm| f.region.map(|region| region.as_str().to_string()).unwrap_or_else(|| "-".to_string()),
            |f: &mut BulkForm, _, forward| {
                let current = f.region.and_then(|region| Region::ALL.iter().position(|r| *r == region));
                f.region = form::cycle_index(current, Region::ALL.len(), forward).map(|index| Region::ALL[index]);
            },
        )
        .required(),
    ]
}

/// Log viewer for one device.
#[derive(Debug, Default)]
pub struct DeviceLogsState {
    pub dev_eui: String,
    pub name: String,
    pub lines: Vec<String>,
    pub list_state: ListState,
    pub loading: bool,
    /// The last fetch failed; the detail goes to the log panel.
    pub failed: bool,
}

impl DeviceLogsState {
    pub fn open(&mut self, dev_eui: &str, name: &str) {
        *self = Self {
            dev_eui: dev_eui.to_string(),
            name: name.to_string(),
            ..Default::default()
        };
    }

    /// Apply a fetch result unless it belongs to a device no longer shown.
    pub fn apply(&mut self, dev_eui: &str, result: Result<Vec<String>, String>) -> bool {
        if dev_eui != self.dev_eui {
            return false;
        }
        self.loading = false;
        match result {
            Ok(lines) => {
                self.lines = lines;
                self.failed = false;
                self.list_state.select(None);
            }
            Err(_) => self.failed = true,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::components::common::FormCtx;

    fn device(dev_eui: &str, status: Option<&str>) -> DeviceSummary {
        DeviceSummary {
            name: format!("dev-{dev_eui}"),
            dev_eui: dev_eui.to_string(),
            current_status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn selection_falls_back_to_cursor_row() {
        let mut state = DevicesState::default();
        state.set_rows(vec![device("01", None), device("02", None)]);
        assert_eq!(state.targets(), vec!["01"]);
        state.table_state.select(Some(1));
        state.toggle_mark();
        state.table_state.select(Some(0));
        assert_eq!(state.targets(), vec!["02"]);
        state.toggle_all();
        assert_eq!(state.targets(), vec!["01", "02"]);
    }

    #[test]
    fn accepted_actions_update_rows() {
        let mut state = DevicesState::default();
        state.set_rows(vec![device("01", None), device("02", Some("playing"))]);
        state.apply_action(SimulatorAction::Join, &["01".to_string()]);
        assert!(state.rows.iter().all(|row| row.current_status.as_deref() == Some("playing")));
    }

    #[test]
    fn bulk_choices_cycle_through_gateways_and_regions() {
        let mut state = BulkState::default();
        state.open(None);
        state.gateways = vec![
            GatewayRecord {
                name: "gw1".into(),
                ..Default::default()
            },
            GatewayRecord {
                name: "gw2".into(),
                ..Default::default()
            },
        ];
        let fields = bulk_fields();
        let ctx = FormCtx { gateways: &state.gateways };
        let form::FieldKind::Choice { cycle, .. } = &fields[2].kind else {
            panic!("gateway field is a choice");
        };
        cycle(&mut state.form, &ctx, true);
        assert_eq!(state.form.gateway.as_deref(), Some("gw1"));
        cycle(&mut state.form, &ctx, false);
        assert_eq!(state.form.gateway.as_deref(), Some("gw2"));

        let form::FieldKind::Choice { cycle, .. } = &fields[3].kind else {
            panic!("region field is a choice");
        };
        cycle(&mut state.form, &ctx, true);
        assert_eq!(state.form.region, Some(Region::ALL[0]));
    }

    #[test]
    fn stale_log_results_are_ignored() {
        let mut state = DeviceLogsState::default();
        state.open("AA", "node");
        assert!(!state.apply("BB", Ok(vec!["x".into()])));
        assert!(state.apply("AA", Ok(vec!["line".into()])));
        assert_eq!(state.lines, vec!["line"]);

        assert!(state.apply("AA", Err("HTTP 502".into())));
        assert!(state.failed);
        assert_eq!(state.lines, vec!["line"]);
        assert!(state.apply("AA", Ok(Vec::new())));
        assert!(!state.failed);
    }
}
