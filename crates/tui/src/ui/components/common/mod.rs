mod alert_modal;
mod confirmation_modal;

pub mod form;
pub mod text_input;

pub use alert_modal::AlertModal;
pub use confirmation_modal::ConfirmationModal;
pub use form::{FormCtx, FormState};
pub use text_input::TextInputState;
