use std::sync::Arc;

use tokio::sync::mpsc;

use crate::events::queue::StoreNotification;

/// Anything that can show a notification to the user.
pub trait NotificationSink: Send + Sync {
    fn show(&self, notification: &StoreNotification);
}

/// Prints notifications to stdout, failures to stderr.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn show(&self, notification: &StoreNotification) {
        let line = render_notification(notification);
        if notification.kind.is_failure() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

pub fn render_notification(notification: &StoreNotification) -> String {
    let marker = if notification.kind.is_failure() { "!" } else { "*" };
    format!("[{}] {}: {}", marker, notification.title, notification.description)
}

/// Runs until every sender is gone.
pub async fn run_notification_worker(
    mut rx: mpsc::UnboundedReceiver<StoreNotification>,
    sink: Arc<dyn NotificationSink>,
) {
    while let Some(notification) = rx.recv().await {
        sink.show(&notification);
    }
}

/// Shows whatever is already queued without waiting for more.
pub fn drain_notifications(
    rx: &mut mpsc::UnboundedReceiver<StoreNotification>,
    sink: &dyn NotificationSink,
) -> usize {
    let mut shown = 0;
    while let Ok(notification) = rx.try_recv() {
        sink.show(&notification);
        shown += 1;
    }
    shown
}
