use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    EventAdded,
    EventUpdated,
    EventRemoved,
    SuggestionImported,
    SuggestionRejected,
}

impl NotificationKind {
    pub fn is_failure(&self) -> bool {
        matches!(self, NotificationKind::SuggestionRejected)
    }
}

/// What the store tells the presentation layer after each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNotification {
    pub kind: NotificationKind,
    pub title: String,
    pub description: String,
}

impl StoreNotification {
    pub fn new(kind: NotificationKind, title: &str, description: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            description: description.into(),
        }
    }
}

/// Fan-out of store notifications. Emitting never blocks, so the store can stay
/// synchronous; subscribers whose receiver was dropped are pruned on the next emit.
#[derive(Debug, Default)]
pub struct NotificationBus {
    subscribers: Vec<mpsc::UnboundedSender<StoreNotification>>,
}

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StoreNotification> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, notification: StoreNotification) {
        self.subscribers
            .retain(|tx| tx.send(notification.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
