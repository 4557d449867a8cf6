use std::io::{self, Write};

use crate::sync::{PendingItem, Severity, SyncStatus, TempId, ViewAdapter};
use crate::util::strip_control_chars;

/// [`ViewAdapter`] that writes to a terminal (or any writer).
///
/// A refresh cannot reload anything by itself, so it is recorded and the
/// caller picks it up with [`take_refresh_request`](Self::take_refresh_request)
/// once the manager call returns.
pub struct ConsoleView<W: Write> {
    out: W,
    refresh_requested: bool,
    status: Option<SyncStatus>,
}

impl ConsoleView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            refresh_requested: false,
            status: None,
        }
    }

    /// Whether a refresh was requested since the last call. Clears the flag.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Print the last status published by the manager, if any.
    pub fn write_status_line(&mut self) {
        if let Some(status) = self.status {
            let state = if status.online { "online" } else { "offline" };
            self.line(format_args!("Status: {state}, {} pending", status.pending));
        }
    }

    pub fn writer_mut(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = self.out.write_fmt(args).and_then(|_| self.out.write_all(b"\n")) {
            tracing::warn!(error = %e, "Failed to write to console");
        }
    }
}

impl<W: Write> ViewAdapter for ConsoleView<W> {
    fn render_pending_item(&mut self, item: &PendingItem) {
        let name = strip_control_chars(&item.item_name).into_owned();
        self.line(format_args!(
            "+ {} [{}] (pending, {})",
            name, item.category, item.temp_id
        ));
    }

    fn remove_pending_item(&mut self, temp_id: &TempId) {
        tracing::debug!(temp_id = %temp_id, "Pending item resolved");
    }

    fn notify(&mut self, severity: Severity, message: &str) {
        self.line(format_args!("[{severity}] {message}"));
    }

    fn refresh_view(&mut self) {
        self.refresh_requested = true;
    }

    fn update_status(&mut self, status: SyncStatus) {
        self.status = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn output(view: ConsoleView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).unwrap()
    }

    #[test]
    fn test_notify_prefixes_severity() {
        let mut view = ConsoleView::new(Vec::new());
        view.notify(Severity::Success, "All changes synced successfully!");
        view.notify(Severity::Warning, "careful");
        assert_eq!(
            output(view),
            "[success] All changes synced successfully!\n[warning] careful\n"
        );
    }

    #[test]
    fn test_pending_item_line() {
        let mut view = ConsoleView::new(Vec::new());
        view.render_pending_item(&PendingItem {
            temp_id: TempId::from("temp_1_abc"),
            item_name: "Milk".to_string(),
            category: "Dairy".to_string(),
        });
        assert_eq!(output(view), "+ Milk [Dairy] (pending, temp_1_abc)\n");
    }

    #[test]
    fn test_refresh_request_is_taken_once() {
        let mut view = ConsoleView::new(Vec::new());
        assert!(!view.take_refresh_request());
        view.refresh_view();
        assert!(view.take_refresh_request());
        assert!(!view.take_refresh_request());
    }

    #[test]
    fn test_status_line_shows_latest_status() {
        let mut view = ConsoleView::new(Vec::new());
        view.write_status_line();
        view.update_status(SyncStatus {
            online: true,
            pending: 3,
        });
        view.update_status(SyncStatus {
            online: false,
            pending: 2,
        });
        view.write_status_line();
        assert_eq!(output(view), "Status: offline, 2 pending\n");
    }
}
