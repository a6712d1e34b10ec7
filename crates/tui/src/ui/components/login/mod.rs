mod login_component;
mod state;

pub use login_component::LoginComponent;
pub use state::LoginState;
