use std::fmt;

use super::operation::TempId;

/// Notification severity, matching the alert styles of the web client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An item the user added that the server has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub temp_id: TempId,
    pub item_name: String,
    pub category: String,
}

/// Connection indicator state: online dot plus queued-change badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub online: bool,
    pub pending: usize,
}

/// Rendering side of the sync manager.
///
/// The manager never touches a UI directly; it calls these hooks and the
/// embedding client decides what they look like.
pub trait ViewAdapter {
    /// Show a locally added item, marked as not yet synced.
    fn render_pending_item(&mut self, item: &PendingItem);

    /// Remove a locally added item (cancelled, or confirmed by the server).
    fn remove_pending_item(&mut self, temp_id: &TempId);

    /// Transient user-facing message.
    fn notify(&mut self, severity: Severity, message: &str);

    /// Discard displayed list state and reload it from the server.
    fn refresh_view(&mut self);

    fn update_status(&mut self, _status: SyncStatus) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_names() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Warning.to_string(), "warning");
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Success.to_string(), "success");
    }
}
