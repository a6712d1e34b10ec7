//! Device create/edit wizard.

mod fields;
mod map;
mod state;
mod wizard_component;

pub use state::WizardScreen;
pub use wizard_component::DeviceWizardComponent;
