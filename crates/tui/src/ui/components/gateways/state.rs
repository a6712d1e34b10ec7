use std::collections::{BTreeSet, HashMap};

use ratatui::widgets::TableState;
use simctl_engine::GatewayForm;
use simctl_engine::keys;
use simctl_engine::selection::RowState;
use simctl_engine::validation::{is_hex_of_len, is_ipv4};
use simctl_types::{GatewayKind, GatewayRecord, SimulatorAction};

use crate::ui::components::common::form::{self, FormField};
use crate::ui::components::common::{FormState, TextInputState};

pub const GATEWAY_LOAD_FAILED_MESSAGE: &str = "Failed to load gateway. Please try again.";
pub const GATEWAY_SAVE_FAILED_MESSAGE: &str = "Failed to save gateway. Please try again.";

/// Gateway list: rows as last fetched, marked rows, and per-row simulator
/// state kept locally between fetches.
#[derive(Debug, Default)]
pub struct GatewaysState {
    pub rows: Vec<GatewayRecord>,
    pub marked: BTreeSet<String>,
    pub row_states: HashMap<String, RowState>,
    pub table_state: TableState,
    pub loading: bool,
}

impl GatewaysState {
    /// Replace the rows, dropping marks and states of gateways that vanished.
    pub fn set_rows(&mut self, rows: Vec<GatewayRecord>) {
        self.row_states = rows
            .iter()
            .filter_map(|row| row.id().map(|id| (id.to_string(), RowState::of_gateway(row))))
            .collect();
        self.marked.retain(|id| self.row_states.contains_key(id));
        self.rows = rows;
        self.loading = false;
        let selected = self.table_state.selected().unwrap_or_default();
        self.table_state
            .select((!self.rows.is_empty()).then(|| selected.min(self.rows.len() - 1)));
    }

    pub fn cursor_row(&self) -> Option<&GatewayRecord> {
        self.rows.get(self.table_state.selected()?)
    }

    /// Mark or unmark the row under the cursor.
    pub fn toggle_mark(&mut self) {
        let Some(id) = self.cursor_row().and_then(GatewayRecord::id).map(str::to_string) else {
            return;
        };
        if !self.marked.remove(&id) {
            self.marked.insert(id);
        }
    }

    /// Mark every row, or clear the marks when all are already marked.
    pub fn toggle_all(&mut self) {
        let ids: BTreeSet<String> = self.rows.iter().filter_map(GatewayRecord::id).map(str::to_string).collect();
        if !ids.is_empty() && self.marked == ids {
            self.marked.clear();
        } else {
            self.marked = ids;
        }
    }

    /// Marked ids, or the cursor row when nothing is marked.
    pub fn targets(&self) -> Vec<&str> {
        if self.marked.is_empty() {
            self.cursor_row().and_then(GatewayRecord::id).into_iter().collect()
        } else {
            self.marked.iter().map(String::as_str).collect()
        }
    }

    pub fn row_state(&self, id: &str) -> RowState {
        self.row_states.get(id).copied().unwrap_or_default()
    }

    /// Mirror an accepted simulator action onto the row.
    pub fn apply_action(&mut self, id: &str, action: SimulatorAction) {
        let next = self.row_state(id).after(action);
        self.row_states.insert(id.to_string(), next);
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.rows.iter().find(|row| row.id() == Some(id)).map(|row| row.name.as_str())
    }
}

/// Which part of the gateway form receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayFormFocus {
    #[default]
    Fields,
    Search,
}

#[derive(Debug, Default)]
pub struct GatewayFormState {
    pub form: GatewayForm,
    pub fields: FormState,
    pub search: TextInputState,
    pub focus: GatewayFormFocus,
    pub saving: bool,
}

impl GatewayFormState {
    /// Blank form for a new gateway.
    pub fn open_new(&mut self) {
        self.load(GatewayForm::new());
    }

    pub fn load(&mut self, form: GatewayForm) {
        *self = Self {
            form,
            ..Default::default()
        };
    }

    pub fn field_list(&self) -> Vec<FormField<GatewayForm>> {
        gateway_fields(self.form.kind)
    }
}

fn is_mac(value: &str) -> bool {
    is_hex_of_len(value.trim(), keys::GATEWAY_MAC_LEN)
}

fn is_optional_ipv4(value: &str) -> bool {
    value.trim().is_empty() || is_ipv4(value)
}

/// Fields shown for a gateway of `kind`; the type selector comes first so
/// switching kind keeps the cursor in place.
pub fn gateway_fields(kind: GatewayKind) -> Vec<FormField<GatewayForm>> {
    let mut fields = vec![form::choice(
        "Type",
        |form: &GatewayForm| form.kind.to_string(),
        |form: &mut GatewayForm, _, _| form.toggle_kind(),
    )];

    match kind {
        GatewayKind::Virtual => fields.extend([
            form::toggle("Active", |f: &GatewayForm| &f.virtual_fields.active, |f: &mut GatewayForm| &mut f.virtual_fields.active),
            form::text("Name", |f: &GatewayForm| &f.virtual_fields.name, |f: &mut GatewayForm| &mut f.virtual_fields.name).required(),
            form::text(
                "MAC address",
                |f: &GatewayForm| &f.virtual_fields.mac_address,
                |f: &mut GatewayForm| &mut f.virtual_fields.mac_address,
            )
            .required()
            .generated(keys::gateway_mac)
            .validated(is_mac),
            form::text(
                "Keep alive (s)",
                |f: &GatewayForm| &f.virtual_fields.keep_alive,
                |f: &mut GatewayForm| &mut f.virtual_fields.keep_alive,
            )
            .validated(|value: &str| value.trim().parse::<u32>().is_ok()),
            form::text("Port", |f: &GatewayForm| &f.virtual_fields.port, |f: &mut GatewayForm| &mut f.virtual_fields.port)
                .validated(|value: &str| value.trim().parse::<u16>().is_ok_and(|port| port > 0)),
        ]),
        GatewayKind::Real => fields.extend([
            form::toggle("Active", |f: &GatewayForm| &f.real_fields.active, |f: &mut GatewayForm| &mut f.real_fields.active),
            form::text("Name", |f: &GatewayForm| &f.real_fields.name, |f: &mut GatewayForm| &mut f.real_fields.name).required(),
            form::text(
                "MAC address",
                |f: &GatewayForm| &f.real_fields.mac_address,
                |f: &mut GatewayForm| &mut f.real_fields.mac_address,
            )
            .required()
            .generated(keys::gateway_mac)
            .validated(is_mac),
            form::text("IP address", |f: &GatewayForm| &f.real_fields.ip, |f: &mut GatewayForm| &mut f.real_fields.ip)
                .validated(is_optional_ipv4),
            form::text("Port", |f: &GatewayForm| &f.real_fields.port, |f: &mut GatewayForm| &mut f.real_fields.port),
        ]),
    }

    fields.extend([
        form::number("Latitude", |f: &GatewayForm| &f.location.latitude, |f: &mut GatewayForm| &mut f.location.latitude),
        form::number("Longitude", |f: &GatewayForm| &f.location.longitude, |f: &mut GatewayForm| &mut f.location.longitude),
        form::text("Altitude", |f: &GatewayForm| &f.location.altitude, |f: &mut GatewayForm| &mut f.location.altitude)
            .validated(|value: &str| value.trim().is_empty() || value.trim().parse::<f64>().is_ok()),
        form::text("Address", |f: &GatewayForm| &f.location.address, |f: &mut GatewayForm| &mut f.location.address),
    ]);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::gateway::RecordId;

    fn gateway(id: &str, status: Option<&str>) -> GatewayRecord {
        GatewayRecord {
            id: Some(RecordId::Plain(id.into())),
            name: format!("gw-{id}"),
            current_status: status.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn refresh_prunes_marks_and_keeps_cursor_in_range() {
        let mut state = GatewaysState::default();
        state.set_rows(vec![gateway("a", None), gateway("b", Some("playing")), gateway("c", None)]);
        state.table_state.select(Some(2));
        state.toggle_mark();
        assert_eq!(state.targets(), vec!["c"]);

        state.set_rows(vec![gateway("a", None)]);
        assert!(state.marked.is_empty());
        assert_eq!(state.table_state.selected(), Some(0));
        assert_eq!(state.targets(), vec!["a"]);
    }

    #[test]
    fn simulator_actions_follow_the_row_state() {
        let mut state = GatewaysState::default();
        state.set_rows(vec![gateway("a", Some("playing"))]);
        assert!(!state.row_state("a").allows(SimulatorAction::Join));
        state.apply_action("a", SimulatorAction::StartUplink);
        assert!(state.row_state("a").allows(SimulatorAction::StopUplink));
        state.apply_action("a", SimulatorAction::Unjoin);
        assert!(state.row_state("a").allows(SimulatorAction::Join));
    }

    #[test]
    fn toggle_all_marks_then_clears() {
        let mut state = GatewaysState::default();
        state.set_rows(vec![gateway("a", None), gateway("b", None)]);
        state.toggle_all();
        assert_eq!(state.targets(), vec!["a", "b"]);
        state.toggle_all();
        assert!(state.marked.is_empty());
    }

    #[test]
    fn field_list_depends_on_kind() {
        let labels = |kind| gateway_fields(kind).into_iter().map(|field| field.label).collect::<Vec<_>>();
        assert!(labels(GatewayKind::Virtual).contains(&"Keep alive (s)".to_string()));
        assert!(labels(GatewayKind::Real).contains(&"IP address".to_string()));
        assert!(!labels(GatewayKind::Real).contains(&"Keep alive (s)".to_string()));
    }
}
