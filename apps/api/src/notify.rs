//! User-facing notifications (the toast sink of a UI).

use tracing::{error, info};

/// Receives short messages meant for the user.
pub trait Notifier: Send + Sync {
    fn notify_error(&self, message: &str);
    fn notify_success(&self, message: &str);
}

/// Writes notifications to the log. Default sink for the HTTP service, where the
/// response body carries the user-visible message.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify_error(&self, message: &str) {
        error!(target: "notify", "{message}");
    }

    fn notify_success(&self, message: &str) {
        info!(target: "notify", "{message}");
    }
}
