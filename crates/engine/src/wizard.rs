//! Device wizard navigation.
//!
//! The wizard is a two-level tab sequencer: a vertical list of sections
//! (General, LoRaWAN and, for amplifiers, SCTE-283) and, inside each
//! section, an ordered list of sub-tabs. [`WizardState::advance`] walks the
//! flattened sequence forward behind the General-tab gate;
//! [`WizardState::retreat`] walks it back without validation. The walk ends
//! at a terminal position: the last LoRaWAN sub-tab for a LoRaWAN device, the
//! last SCTE-283 sub-tab for an amplifier.
//!
//! The Location sub-tab hosts a map. Its widget is built lazily the first time
//! the tab is shown, re-laid-out on every later visit, and released together
//! with the wizard.

use std::fmt;

use simctl_types::DeviceKind;
use thiserror::Error;
use tracing::{debug, info};

use crate::draft::DeviceDraft;
use crate::validation::{GENERAL_INCOMPLETE_MESSAGE, RequiredField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    General,
    Lorawan,
    Scte283,
}

impl Section {
    pub fn title(&self) -> &'static str {
        match self {
            Section::General => "General",
            Section::Lorawan => "LoRaWAN",
            Section::Scte283 => "SCTE-283",
        }
    }

    /// Ordered sub-tabs of this section; never empty.
    pub fn sequence(&self) -> &'static [SubTab] {
        match self {
            Section::General => &[SubTab::Device],
            Section::Lorawan => &[
                SubTab::Activation,
                SubTab::Class,
                SubTab::FrameSettings,
                SubTab::Features,
                SubTab::Location,
                SubTab::Payload,
            ],
            Section::Scte283 => &[SubTab::System, SubTab::Rf, SubTab::Networking, SubTab::Pnm],
        }
    }

    pub fn first(&self) -> SubTab {
        self.sequence()[0]
    }

    pub fn last(&self) -> SubTab {
        self.sequence()[self.sequence().len() - 1]
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubTab {
    Device,
    Activation,
    Class,
    FrameSettings,
    Features,
    Location,
    Payload,
    System,
    Rf,
    Networking,
    Pnm,
}

impl SubTab {
    pub fn title(&self) -> &'static str {
        match self {
            SubTab::Device => "Device",
            SubTab::Activation => "Activation",
            SubTab::Class => "Class",
            SubTab::FrameSettings => "Frame settings",
            SubTab::Features => "Features",
            SubTab::Location => "Location",
            SubTab::Payload => "Payload",
            SubTab::System => "System",
            SubTab::Rf => "RF",
            SubTab::Networking => "Networking",
            SubTab::Pnm => "PNM",
        }
    }
}

impl fmt::Display for SubTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// Forward navigation attempted with empty General fields.
    #[error("{}", GENERAL_INCOMPLETE_MESSAGE)]
    MissingRequired(Vec<RequiredField>),
    #[error("the {0} section is only available for SCTE-283 devices")]
    SectionUnavailable(Section),
    #[error("{tab} is not part of the {section} section")]
    NotInSection { section: Section, tab: SubTab },
}

/// Outcome of a successful forward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved { section: Section, sub_tab: SubTab },
    /// Already at the end of the device's sequence; nothing changed.
    Terminal,
}

/// Default zoom of a freshly built map.
pub const DEFAULT_MAP_ZOOM: f64 = 6.0;
/// Zoom used after an address search jumps to a result.
pub const SEARCH_MAP_ZOOM: f64 = 13.0;
const MIN_MAP_ZOOM: f64 = 1.0;
const MAX_MAP_ZOOM: f64 = 18.0;

/// Map widget backing the Location sub-tab.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub zoom: f64,
    needs_layout: bool,
}

impl MapView {
    fn new() -> Self {
        Self {
            zoom: DEFAULT_MAP_ZOOM,
            needs_layout: true,
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1.0).min(MAX_MAP_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 1.0).max(MIN_MAP_ZOOM);
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_MAP_ZOOM, MAX_MAP_ZOOM);
    }

    /// Returns and clears the pending re-layout request.
    pub fn take_layout(&mut self) -> bool {
        std::mem::take(&mut self.needs_layout)
    }

    /// Longitude and latitude bounds of the viewport centred on a point.
    pub fn viewport(&self, latitude: f64, longitude: f64) -> ([f64; 2], [f64; 2]) {
        let lon_span = 360.0 / 2f64.powf(self.zoom - 1.0);
        let lat_span = lon_span / 2.0;
        (
            [longitude - lon_span / 2.0, longitude + lon_span / 2.0],
            [latitude - lat_span / 2.0, latitude + lat_span / 2.0],
        )
    }

    /// Degrees moved by one pan step at the current zoom.
    pub fn pan_step(&self) -> f64 {
        360.0 / 2f64.powf(self.zoom + 3.0)
    }
}

/// Lazily constructed map slot owned by one wizard.
#[derive(Debug, Default)]
pub struct MapSlot {
    view: Option<MapView>,
    constructions: usize,
}

impl MapSlot {
    /// Builds the map on first use; later calls return the same widget.
    pub fn ensure_constructed(&mut self) -> &mut MapView {
        if self.view.is_none() {
            self.constructions += 1;
            debug!(constructions = self.constructions, "constructing location map");
        }
        self.view.get_or_insert_with(MapView::new)
    }

    /// Request a re-layout; the widget may have been hidden while the terminal resized.
    pub fn invalidate(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.needs_layout = true;
        }
    }

    pub fn view(&self) -> Option<&MapView> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut MapView> {
        self.view.as_mut()
    }

    pub fn is_constructed(&self) -> bool {
        self.view.is_some()
    }

    /// How many times the widget was built over the slot's lifetime.
    pub fn construction_count(&self) -> usize {
        self.constructions
    }
}

impl Drop for MapSlot {
    fn drop(&mut self) {
        if self.view.take().is_some() {
            debug!("released location map");
        }
    }
}

/// Navigation state of one wizard screen.
#[derive(Debug)]
pub struct WizardState {
    kind: DeviceKind,
    active_section: Section,
    active_sub_tab: SubTab,
    map: MapSlot,
}

impl WizardState {
    pub fn new(kind: DeviceKind) -> Self {
        Self {
            kind,
            active_section: Section::General,
            active_sub_tab: Section::General.first(),
            map: MapSlot::default(),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        self.kind
    }

    pub fn active_section(&self) -> Section {
        self.active_section
    }

    pub fn active_sub_tab(&self) -> SubTab {
        self.active_sub_tab
    }

    pub fn position(&self) -> (Section, SubTab) {
        (self.active_section, self.active_sub_tab)
    }

    /// Sections shown for this device kind, in order.
    pub fn sections(&self) -> &'static [Section] {
        if self.kind.is_scte283() {
            &[Section::General, Section::Lorawan, Section::Scte283]
        } else {
            &[Section::General, Section::Lorawan]
        }
    }

    pub fn map(&self) -> &MapSlot {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut MapSlot {
        &mut self.map
    }

    /// True when `advance` can no longer move.
    pub fn is_terminal(&self) -> bool {
        self.active_section == self.final_section() && self.active_sub_tab == self.final_section().last()
    }

    /// Jump to a section and its first sub-tab.
    pub fn activate_section(&mut self, section: Section) -> Result<(), WizardError> {
        if !self.sections().contains(&section) {
            return Err(WizardError::SectionUnavailable(section));
        }
        self.focus(section, section.first());
        Ok(())
    }

    /// Jump to a sub-tab of the active section.
    pub fn select_sub_tab(&mut self, tab: SubTab) -> Result<(), WizardError> {
        if !self.active_section.sequence().contains(&tab) {
            return Err(WizardError::NotInSection {
                section: self.active_section,
                tab,
            });
        }
        self.focus(self.active_section, tab);
        Ok(())
    }

    /// Step forward once, gated on the required General fields.
    ///
    /// The gate applies from every position. On failure the wizard returns to
    /// the General section so the operator sees the empty fields.
    pub fn advance(&mut self, draft: &DeviceDraft) -> Result<Advance, WizardError> {
        let missing = draft.missing_required();
        if !missing.is_empty() {
            info!(?missing, "wizard advance blocked");
            self.focus(Section::General, Section::General.first());
            return Err(WizardError::MissingRequired(missing));
        }

        let Some((section, sub_tab)) = self.next_position() else {
            return Ok(Advance::Terminal);
        };
        self.focus(section, sub_tab);
        info!(section = %section, sub_tab = %sub_tab, "wizard advanced");
        Ok(Advance::Moved { section, sub_tab })
    }

    /// Step back once. Returns `false` at the very first tab.
    pub fn retreat(&mut self) -> bool {
        let sequence = self.active_section.sequence();
        let index = self.sub_tab_index();
        if index > 0 {
            self.focus(self.active_section, sequence[index - 1]);
            return true;
        }
        let sections = self.sections();
        let Some(section_index) = sections.iter().position(|s| *s == self.active_section) else {
            return false;
        };
        if section_index == 0 {
            return false;
        }
        let previous = sections[section_index - 1];
        self.focus(previous, previous.last());
        true
    }

    /// Move to an explicit position, used to point the operator at a
    /// blocking field. Positions outside this kind's sections are ignored.
    pub fn redirect(&mut self, section: Section, sub_tab: SubTab) {
        if self.sections().contains(&section) && section.sequence().contains(&sub_tab) {
            self.focus(section, sub_tab);
        }
    }

    /// Back to the first tab, keeping the map slot.
    pub fn restart(&mut self) {
        self.focus(Section::General, Section::General.first());
    }

    fn final_section(&self) -> Section {
        self.sections()[self.sections().len() - 1]
    }

    fn sub_tab_index(&self) -> usize {
        self.active_section
            .sequence()
            .iter()
            .position(|tab| *tab == self.active_sub_tab)
            .unwrap_or_default()
    }

    fn next_position(&self) -> Option<(Section, SubTab)> {
        let sequence = self.active_section.sequence();
        let index = self.sub_tab_index();
        if index + 1 < sequence.len() {
            return Some((self.active_section, sequence[index + 1]));
        }
        let sections = self.sections();
        let section_index = sections.iter().position(|s| *s == self.active_section)?;
        sections
            .get(section_index + 1)
            .map(|section| (*section, section.first()))
    }

    fn focus(&mut self, section: Section, sub_tab: SubTab) {
        self.active_section = section;
        self.active_sub_tab = sub_tab;
        if sub_tab == SubTab::Location {
            self.map.ensure_constructed();
            self.map.invalidate();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simctl_types::device::GatewayRef;
    use simctl_types::Region;

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

    fn assert_member(wizard: &WizardState) {
        assert!(wizard.active_section().sequence().contains(&wizard.active_sub_tab()));
    }

    #[test]
    fn advance_from_general_lands_on_activation() {
        let draft = complete_draft(DeviceKind::Lorawan);
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        assert_eq!(
            wizard.advance(&draft),
            Ok(Advance::Moved {
                section: Section::Lorawan,
                sub_tab: SubTab::Activation
            })
        );
    }

    #[test]
    fn any_missing_required_field_keeps_general() {
        let complete = complete_draft(DeviceKind::Lorawan);
        let blankers: [fn(&mut DeviceDraft); 4] = [
            |d| d.general.name.clear(),
            |d| d.general.dev_eui.clear(),
            |d| d.general.gateway = None,
            |d| d.general.region = None,
        ];
        for blank in blankers {
            let mut draft = complete.clone();
            blank(&mut draft);
            let mut wizard = WizardState::new(DeviceKind::Lorawan);
            let error = wizard.advance(&draft).unwrap_err();
            assert!(matches!(&error, WizardError::MissingRequired(fields) if fields.len() == 1));
            assert_eq!(error.to_string(), GENERAL_INCOMPLETE_MESSAGE);
            assert_eq!(wizard.position(), (Section::General, SubTab::Device));
        }
    }

    #[test]
    fn gate_applies_from_later_tabs_and_returns_to_general() {
        let mut draft = complete_draft(DeviceKind::Lorawan);
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        wizard.activate_section(Section::Lorawan).unwrap();
        wizard.select_sub_tab(SubTab::Features).unwrap();
        draft.general.name.clear();
        assert!(wizard.advance(&draft).is_err());
        assert_eq!(wizard.active_section(), Section::General);
    }

    #[test]
    fn lorawan_device_reaches_terminal_after_five_steps() {
        let draft = complete_draft(DeviceKind::Lorawan);
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        wizard.activate_section(Section::Lorawan).unwrap();
        for _ in 0..5 {
            assert!(matches!(wizard.advance(&draft), Ok(Advance::Moved { .. })));
            assert_member(&wizard);
        }
        assert_eq!(wizard.position(), (Section::Lorawan, SubTab::Payload));
        assert!(wizard.is_terminal());
        for _ in 0..3 {
            assert_eq!(wizard.advance(&draft), Ok(Advance::Terminal));
            assert_eq!(wizard.position(), (Section::Lorawan, SubTab::Payload));
        }
    }

    #[test]
    fn scte_device_continues_into_scte_section() {
        let draft = complete_draft(DeviceKind::Scte283);
        let mut wizard = WizardState::new(DeviceKind::Scte283);
        wizard.activate_section(Section::Lorawan).unwrap();
        wizard.select_sub_tab(SubTab::Payload).unwrap();
        assert_eq!(
            wizard.advance(&draft),
            Ok(Advance::Moved {
                section: Section::Scte283,
                sub_tab: SubTab::System
            })
        );
        for _ in 0..3 {
            wizard.advance(&draft).unwrap();
        }
        assert_eq!(wizard.position(), (Section::Scte283, SubTab::Pnm));
        assert_eq!(wizard.advance(&draft), Ok(Advance::Terminal));
    }

    #[test]
    fn scte_section_is_hidden_for_lorawan_devices() {
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        assert_eq!(
            wizard.activate_section(Section::Scte283),
            Err(WizardError::SectionUnavailable(Section::Scte283))
        );
        assert!(wizard.select_sub_tab(SubTab::Payload).is_err());
        assert_eq!(wizard.position(), (Section::General, SubTab::Device));
    }

    #[test]
    fn retreat_walks_back_across_sections() {
        let mut wizard = WizardState::new(DeviceKind::Scte283);
        wizard.activate_section(Section::Scte283).unwrap();
        assert!(wizard.retreat());
        assert_eq!(wizard.position(), (Section::Lorawan, SubTab::Payload));
        wizard.activate_section(Section::Lorawan).unwrap();
        assert!(wizard.retreat());
        assert_eq!(wizard.position(), (Section::General, SubTab::Device));
        assert!(!wizard.retreat());
    }

    #[test]
    fn map_is_built_once_and_invalidated_on_every_visit() {
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        assert!(!wizard.map().is_constructed());
        wizard.activate_section(Section::Lorawan).unwrap();
        assert!(!wizard.map().is_constructed());

        wizard.select_sub_tab(SubTab::Location).unwrap();
        assert!(wizard.map_mut().view_mut().unwrap().take_layout());
        assert!(!wizard.map_mut().view_mut().unwrap().take_layout());

        wizard.select_sub_tab(SubTab::Payload).unwrap();
        wizard.select_sub_tab(SubTab::Location).unwrap();
        assert!(wizard.map_mut().view_mut().unwrap().take_layout());
        assert_eq!(wizard.map().construction_count(), 1);
    }

    #[test]
    fn redirect_ignores_positions_outside_the_kind() {
        let mut wizard = WizardState::new(DeviceKind::Lorawan);
        wizard.redirect(Section::Scte283, SubTab::System);
        assert_eq!(wizard.position(), (Section::General, SubTab::Device));
        wizard.redirect(Section::Lorawan, SubTab::Payload);
        assert_eq!(wizard.position(), (Section::Lorawan, SubTab::Payload));
    }

    #[test]
    fn viewport_narrows_with_zoom() {
        let mut slot = MapSlot::default();
        let view = slot.ensure_constructed();
        let (lon, _) = view.viewport(0.0, 0.0);
        view.zoom_in();
        let (narrower, _) = view.viewport(0.0, 0.0);
        assert!(narrower[1] - narrower[0] < lon[1] - lon[0]);
        view.set_zoom(99.0);
        assert_eq!(view.zoom, 18.0);
    }
}
