use simctl_engine::wizard::{SEARCH_MAP_ZOOM, Section, SubTab};
use simctl_engine::{Advance, DeviceDraft, SubmissionMachine, SubmitError, SubmitMode, WizardError, WizardState};
use simctl_types::{DeviceKind, DeviceSubmission, GatewayRecord, LorawanPayload, Region, SubmitIntent};
use tracing::{debug, info};

use super::fields::fields_for;
use crate::ui::components::common::form::FormField;
use crate::ui::components::common::{FormState, TextInputState};

/// Which part of the wizard receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardFocus {
    #[default]
    Fields,
    /// Arrow keys pan the location map.
    Map,
    /// Address search box on the Location tab.
    Search,
}

/// Everything one device wizard owns. Dropped when the operator leaves the
/// wizard, which also releases the map.
#[derive(Debug)]
pub struct WizardScreen {
    pub wizard: WizardState,
    pub draft: DeviceDraft,
    pub machine: SubmissionMachine,
    pub form: FormState,
    pub gateways: Vec<GatewayRecord>,
    pub search: TextInputState,
    pub focus: WizardFocus,
    pending_intent: Option<SubmitIntent>,
}

impl WizardScreen {
    pub fn create(kind: DeviceKind, region: Option<Region>) -> Self {
        Self {
            wizard: WizardState::new(kind),
            draft: DeviceDraft::with_region(kind, region),
            machine: SubmissionMachine::new(SubmitMode::Create),
            form: FormState::default(),
            gateways: Vec::new(),
            search: TextInputState::default(),
            focus: WizardFocus::Fields,
            pending_intent: None,
        }
    }

    /// Wizard prefilled from a stored device; submits update it in place.
    pub fn edit(record: &LorawanPayload, gateways: Vec<GatewayRecord>) -> Self {
        let draft = DeviceDraft::hydrate(record, &gateways);
        Self {
            wizard: WizardState::new(draft.kind),
            machine: SubmissionMachine::new(SubmitMode::Edit {
                dev_eui: record.dev_eui.clone(),
            }),
            draft,
            gateways,
            ..Self::create(DeviceKind::Lorawan, None)
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.machine.mode(), SubmitMode::Edit { .. })
    }

    pub fn sub_tab(&self) -> SubTab {
        self.wizard.active_sub_tab()
    }

    pub fn fields(&self) -> Vec<FormField<DeviceDraft>> {
        fields_for(self.sub_tab(), &self.draft)
    }

    /// Run `navigate` and reset the form when the position changed.
    fn moved<R>(&mut self, navigate: impl FnOnce(&mut WizardState, &DeviceDraft) -> R) -> R {
        let before = self.wizard.position();
        let result = navigate(&mut self.wizard, &self.draft);
        if self.wizard.position() != before {
            self.form.reset();
            self.focus = WizardFocus::Fields;
        }
        result
    }

    pub fn advance(&mut self) -> Result<Advance, WizardError> {
        self.moved(|wizard, draft| wizard.advance(draft))
    }

    pub fn retreat(&mut self) -> bool {
        self.moved(|wizard, _| wizard.retreat())
    }

    pub fn activate_section(&mut self, section: Section) -> Result<(), WizardError> {
        self.moved(|wizard, _| wizard.activate_section(section))
    }

    /// Step to the neighbouring sub-tab of the active section.
    pub fn cycle_sub_tab(&mut self, forward: bool) {
        let sequence = self.wizard.active_section().sequence();
        let index = sequence.iter().position(|tab| *tab == self.sub_tab()).unwrap_or_default();
        let next = if forward {
            (index + 1) % sequence.len()
        } else {
            (index + sequence.len() - 1) % sequence.len()
        };
        if let Err(error) = self.moved(|wizard, _| wizard.select_sub_tab(sequence[next])) {
            debug!(%error, "sub-tab change rejected");
        }
    }

    pub fn set_gateways(&mut self, gateways: Vec<GatewayRecord>) {
        self.gateways = gateways;
    }

    pub fn add_sensor(&mut self) {
        self.draft.add_sensor();
    }

    /// Remove the sensor row the cursor is on.
    pub fn remove_focused_sensor(&mut self) -> bool {
        let Some(index) = self.form.focused_group(&self.fields()) else {
            return false;
        };
        let removed = self.draft.remove_sensor(index);
        self.form.invalidate();
        removed
    }

    pub fn set_coordinates(&mut self, latitude: f64, longitude: f64) {
        self.draft.set_coordinates(latitude, longitude);
        self.form.invalidate();
    }

    pub fn set_address(&mut self, address: String) {
        self.draft.set_address(address);
        self.form.invalidate();
    }

    /// Jump to an address search hit and zoom in on it.
    pub fn show_search_hit(&mut self, latitude: f64, longitude: f64) {
        self.set_coordinates(latitude, longitude);
        self.wizard.map_mut().ensure_constructed().set_zoom(SEARCH_MAP_ZOOM);
    }

    /// Validate and build the request; remembers which button was pressed.
    pub fn submit(&mut self, intent: SubmitIntent) -> Result<DeviceSubmission, SubmitError> {
        let before = self.wizard.position();
        let result = self.machine.begin(&self.draft, &mut self.wizard);
        if self.wizard.position() != before {
            self.form.reset();
            self.focus = WizardFocus::Fields;
        }
        if result.is_ok() {
            self.pending_intent = Some(intent);
        }
        result
    }

    /// Record the backend's answer to the submission issued under `ticket`.
    /// On success returns the button that was pressed and the message to
    /// show; save-and-new starts a blank draft. Answers meant for another
    /// submission leave the screen untouched.
    pub fn finish(&mut self, ticket: u64, result: Result<(), String>) -> Result<(SubmitIntent, &'static str), SubmitError> {
        if !self.machine.awaits(ticket) {
            return Err(SubmitError::NotInFlight);
        }
        let intent = self.pending_intent.take().unwrap_or(SubmitIntent::Close);
        self.machine.complete(result)?;
        let message = self.machine.mode().success_message();
        if intent == SubmitIntent::New {
            self.draft.reset();
            if self.is_edit() {
                self.machine = SubmissionMachine::new(SubmitMode::Create);
            } else {
                self.machine.acknowledge();
            }
            self.wizard.restart();
            self.form.reset();
            self.focus = WizardFocus::Fields;
            info!("wizard reset for the next device");
        }
        Ok((intent, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::GatewayRef;

    fn complete_general(screen: &mut WizardScreen) {
        screen.draft.general.name = "dev1".into();
        screen.draft.general.dev_eui = "AABBCCDDEEFF0011".into();
        screen.draft.general.region = Some(Region::Us915);
        screen.draft.general.gateway = Some(GatewayRef {
            name: "gw1".into(),
            mac_address: "0011223344556677".into(),
        });
    }

    #[test]
    fn advance_is_gated_on_general_fields() {
        let mut screen = WizardScreen::create(DeviceKind::Lorawan, None);
        assert!(matches!(screen.advance(), Err(WizardError::MissingRequired(_))));
        assert_eq!(screen.sub_tab(), SubTab::Device);

        complete_general(&mut screen);
        screen.form.focus(3);
        assert!(screen.advance().is_ok());
        assert_eq!(screen.sub_tab(), SubTab::Activation);
        assert_eq!(screen.form.focused(), 0);
    }

    #[test]
    fn save_and_new_resets_the_draft() {
        let mut screen = WizardScreen::create(DeviceKind::Lorawan, Some(Region::Eu868));
        complete_general(&mut screen);
        screen.advance().unwrap();
        assert!(matches!(screen.submit(SubmitIntent::New), Ok(DeviceSubmission::Create(_))));
        assert!(matches!(screen.submit(SubmitIntent::New), Err(SubmitError::InFlight)));

        let (intent, message) = screen.finish(screen.machine.ticket(), Ok(())).unwrap();
        assert_eq!(intent, SubmitIntent::New);
        assert_eq!(message, simctl_engine::submission::DEVICE_CREATED_MESSAGE);
        assert_eq!(screen.sub_tab(), SubTab::Device);
        assert!(screen.draft.general.name.is_empty());
        assert!(!screen.machine.is_in_flight());
    }

    #[test]
    fn failed_submission_keeps_the_draft() {
        let mut screen = WizardScreen::create(DeviceKind::Lorawan, None);
        complete_general(&mut screen);
        screen.submit(SubmitIntent::Close).unwrap();
        let ticket = screen.machine.ticket();
        assert!(matches!(screen.finish(ticket, Err("500".into())), Err(SubmitError::Failed(_))));
        assert_eq!(screen.draft.general.name, "dev1");
        assert!(screen.submit(SubmitIntent::Close).is_ok());
    }

    #[test]
    fn answers_for_another_submission_are_ignored() {
        let mut earlier = WizardScreen::create(DeviceKind::Lorawan, None);
        complete_general(&mut earlier);
        earlier.submit(SubmitIntent::Close).unwrap();
        let stale = earlier.machine.ticket();

        let mut screen = WizardScreen::create(DeviceKind::Lorawan, None);
        screen.draft.general.name = "half-typed".into();
        assert!(matches!(screen.finish(stale, Ok(())), Err(SubmitError::NotInFlight)));
        assert_eq!(screen.machine.phase(), simctl_engine::SubmissionPhase::Idle);

        complete_general(&mut screen);
        screen.submit(SubmitIntent::Close).unwrap();
        assert!(matches!(screen.finish(stale, Err("500".into())), Err(SubmitError::NotInFlight)));
        assert!(screen.machine.is_in_flight());
        assert!(screen.finish(screen.machine.ticket(), Ok(())).is_ok());
    }

    #[test]
    fn blocked_submission_lands_where_the_problem_can_be_fixed() {
        let mut screen = WizardScreen::create(DeviceKind::Scte283, None);
        complete_general(&mut screen);
        screen.draft.lorawan.payload.flags.system = true;
        let error = screen.submit(SubmitIntent::Close).unwrap_err();
        assert!(error.to_string().contains("System tab"));
        assert_eq!(screen.sub_tab(), SubTab::System);
        assert!(screen.fields().iter().any(|field| field.label == "Sensor 1 name"));

        screen.draft.lorawan.payload.flags.system = false;
        screen.draft.lorawan.payload.flags.fault = true;
        screen.submit(SubmitIntent::Close).unwrap_err();
        assert_eq!(screen.sub_tab(), SubTab::System);
        assert!(screen.fields().iter().any(|field| field.label == "Event text"));
    }

    #[test]
    fn removing_a_sensor_uses_the_focused_row() {
        let mut screen = WizardScreen::create(DeviceKind::Scte283, None);
        complete_general(&mut screen);
        screen.activate_section(Section::Scte283).unwrap();
        assert_eq!(screen.sub_tab(), SubTab::System);
        screen.add_sensor();
        let last = screen.fields().len() - 1;
        screen.form.focus(last);
        assert!(screen.remove_focused_sensor());
        assert_eq!(screen.draft.scte283.sensors.len(), 1);
        screen.form.focus(0);
        assert!(!screen.remove_focused_sensor());
    }

    #[test]
    fn sub_tab_cycling_wraps_within_the_section() {
        let mut screen = WizardScreen::create(DeviceKind::Scte283, None);
        complete_general(&mut screen);
        screen.activate_section(Section::Scte283).unwrap();
        screen.form.focus(2);

        screen.cycle_sub_tab(false);
        assert_eq!(screen.sub_tab(), SubTab::Pnm);
        assert_eq!(screen.form.focused(), 0);
        screen.cycle_sub_tab(true);
        assert_eq!(screen.sub_tab(), SubTab::System);
        screen.cycle_sub_tab(true);
        assert_eq!(screen.sub_tab(), SubTab::Rf);
    }

    #[test]
    fn search_hits_zoom_the_map() {
        let mut screen = WizardScreen::create(DeviceKind::Lorawan, None);
        screen.show_search_hit(48.8566, 2.3522);
        assert_eq!(screen.draft.coordinates(), (48.8566, 2.3522));
        assert_eq!(screen.wizard.map().view().map(|view| view.zoom), Some(SEARCH_MAP_ZOOM));
    }
}
