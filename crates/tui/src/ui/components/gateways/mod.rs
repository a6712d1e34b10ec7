//! Gateway list and the gateway create/edit form.

mod form_component;
mod gateways_component;
mod state;

pub use form_component::GatewayFormComponent;
pub use gateways_component::GatewaysComponent;
pub use state::{GATEWAY_LOAD_FAILED_MESSAGE, GATEWAY_SAVE_FAILED_MESSAGE, GatewayFormFocus, GatewayFormState, GatewaysState};
