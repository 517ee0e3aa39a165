use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ScheduleError;
use crate::service::openai_service::SuggestionClient;
use crate::service::schedule_store::ScheduleStore;

pub const GREETING: &str = "Hello! I'm SchedulAI. Tell me your preferences, and I'll suggest a schedule for you. \
     For example: 'I need to take Math 101 on MWF mornings and Art History on Tuesdays.'";

pub const FALLBACK_REPLY: &str = "Sorry, I couldn't generate a schedule. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Prompt,
    Greeting,
    Suggestion,
    Failure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub kind: MessageKind,
    pub content: String,
}

impl ChatMessage {
    fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        match self.kind {
            MessageKind::Prompt => Role::User,
            _ => Role::Assistant,
        }
    }

    /// Only assistant replies carrying a schedule can go to the calendar.
    pub fn is_suggestion(&self) -> bool {
        self.kind == MessageKind::Suggestion
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyInput,
    #[error("a suggestion request is already in progress")]
    RequestInFlight,
    #[error("message {0} is not a schedule suggestion")]
    NotASuggestion(String),
    #[error(transparent)]
    Import(#[from] ScheduleError),
}

/// Conversation with the suggestion service. At most one request is
/// outstanding at a time; a second `submit` while one is pending is refused.
pub struct ChatSession {
    client: Arc<dyn SuggestionClient>,
    messages: Mutex<Vec<ChatMessage>>,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ChatSession {
    pub fn new(client: Arc<dyn SuggestionClient>) -> Self {
        Self {
            client,
            messages: Mutex::new(vec![ChatMessage::new(MessageKind::Greeting, GREETING)]),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.messages.lock().await.clone()
    }

    pub async fn latest_suggestion(&self) -> Option<ChatMessage> {
        self.messages
            .lock()
            .await
            .iter()
            .rev()
            .find(|m| m.is_suggestion())
            .cloned()
    }

    /// Sends the user's preferences and returns the assistant reply. Service
    /// failures become the fallback reply rather than an error.
    pub async fn submit(&self, input: &str) -> Result<ChatMessage, ChatError> {
        if input.trim().is_empty() {
            return Err(ChatError::EmptyInput);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(ChatError::RequestInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        self.messages
            .lock()
            .await
            .push(ChatMessage::new(MessageKind::Prompt, input));

        let reply = match self.client.suggest(input).await {
            Ok(schedule) => {
                info!(chars = schedule.len(), "schedule suggestion received");
                ChatMessage::new(MessageKind::Suggestion, schedule)
            }
            Err(err) => {
                warn!(error = %err, "schedule suggestion failed");
                ChatMessage::new(MessageKind::Failure, FALLBACK_REPLY)
            }
        };

        self.messages.lock().await.push(reply.clone());
        Ok(reply)
    }

    /// Imports the schedule carried by a suggestion message into the store.
    pub async fn add_to_calendar(
        &self,
        message_id: &str,
        store: &Mutex<ScheduleStore>,
    ) -> Result<usize, ChatError> {
        let content = {
            let messages = self.messages.lock().await;
            match messages.iter().find(|m| m.id == message_id) {
                Some(message) if message.is_suggestion() => message.content.clone(),
                _ => return Err(ChatError::NotASuggestion(message_id.to_string())),
            }
        };
        let mut store = store.lock().await;
        Ok(store.add_events_from_suggestion(&content)?)
    }
}
