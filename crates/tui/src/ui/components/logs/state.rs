use chrono::Local;
use ratatui::widgets::ListState;
use simctl_util::redact_sensitive;

use crate::ui::components::common::TextInputState;

/// Oldest entries are dropped past this many.
pub const MAX_LOG_ENTRIES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One line in the console's log pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.timestamp, self.message)
    }
}

#[derive(Debug)]
pub struct LogsState {
    pub entries: Vec<LogEntry>,
    pub list_state: ListState,
    /// Whether the pane is shown (Ctrl+L).
    pub visible: bool,
    pub search: TextInputState,
    pub search_active: bool,
}

impl Default for LogsState {
    fn default() -> Self {
        let mut state = Self {
            entries: Vec::new(),
            list_state: ListState::default(),
            visible: true,
            search: TextInputState::new(),
            search_active: false,
        };
        state.push(LogLevel::Info, "Welcome to simctl");
        state
    }
}

impl LogsState {
    /// Append a line. Secrets are redacted before they are stored.
    pub fn push(&mut self, level: LogLevel, message: impl AsRef<str>) {
        self.entries.push(LogEntry {
            timestamp: Local::now().format("%H:%M:%S").to_string(),
            level,
            message: redact_sensitive(message.as_ref()),
        });
        if self.entries.len() > MAX_LOG_ENTRIES {
            let overflow = self.entries.len() - MAX_LOG_ENTRIES;
            self.entries.drain(..overflow);
        }
    }

    /// Indices of the entries matching the search query.
    pub fn filtered_indices(&self) -> Vec<usize> {
        let query = self.search.input().trim().to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| query.is_empty() || entry.message.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn selected_entry(&self) -> Option<&LogEntry> {
        let selected = self.list_state.selected()?;
        let index = *self.filtered_indices().get(selected)?;
        self.entries.get(index)
    }

    pub fn has_search_query(&self) -> bool {
        !self.search.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_are_capped_and_redacted() {
        let mut state = LogsState::default();
        for index in 0..MAX_LOG_ENTRIES + 10 {
            state.push(LogLevel::Info, format!("line {index}"));
        }
        assert_eq!(state.entries.len(), MAX_LOG_ENTRIES);
        assert_eq!(state.entries[0].message, "line 10");

        state.push(LogLevel::Warn, "Authorization: Bearer abc123");
        assert!(!state.entries.last().is_some_and(|entry| entry.message.contains("abc123")));
    }

    #[test]
    fn search_filters_case_insensitively() {
        let mut state = LogsState::default();
        state.push(LogLevel::Info, "Gateway gw-01 started");
        state.push(LogLevel::Error, "device join failed");
        state.search.set_input("GW-01");
        let filtered = state.filtered_indices();
        assert_eq!(filtered.len(), 1);
        assert_eq!(state.entries[filtered[0]].message, "Gateway gw-01 started");
    }
}
