use crate::ui::components::common::TextInputState;

/// Shown when Enter is pressed with a blank user name.
pub const USER_REQUIRED_MESSAGE: &str = "Please enter a user name.";

#[derive(Debug, Default)]
pub struct LoginState {
    pub user: TextInputState,
    pub error: Option<String>,
}

impl LoginState {
    /// Trimmed user name to log in with, or sets the inline error.
    pub fn submit(&mut self) -> Option<String> {
        let user = self.user.input().trim().to_string();
        if user.is_empty() {
            self.error = Some(USER_REQUIRED_MESSAGE.to_string());
            return None;
        }
        self.error = None;
        Some(user)
    }

    pub fn clear(&mut self) {
        self.user.clear();
        self.error = None;
    }
}
