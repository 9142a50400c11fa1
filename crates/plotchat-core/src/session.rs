//! Exchange state machine: idle -> awaiting reply -> idle

use tracing::{debug, warn};

use crate::exchange::{ExchangeError, NormalizedReply};
use crate::message::Message;
use crate::store::MessageStore;

pub struct ChatSession {
    store: MessageStore,
    draft: String,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(MessageStore::with_greeting())
    }
}

impl ChatSession {
    pub fn new(store: MessageStore) -> Self {
        Self {
            store,
            draft: String::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.store.current()
    }

    pub fn is_pending(&self) -> bool {
        self.store.is_pending()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether a submission would be accepted right now
    pub fn can_submit(&self) -> bool {
        !self.store.is_pending() && !self.draft.trim().is_empty()
    }

    /// Start an exchange from the current draft.
    ///
    /// Returns the trimmed text to send, or `None` when the draft is blank or a
    /// reply is already pending. In that case nothing changes.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.can_submit() {
            return None;
        }

        let text = self.draft.trim().to_string();
        self.store.append(Message::user(text.clone()));
        self.store.set_pending(true);
        self.draft.clear();

        debug!(messages = self.store.current().len(), "exchange started");
        Some(text)
    }

    /// Finish the pending exchange with exactly one bot message.
    pub fn settle(&mut self, result: Result<NormalizedReply, ExchangeError>) {
        let message = match result {
            Ok(reply) => reply.into_message(),
            Err(err) => {
                warn!(error = %err, "exchange failed");
                Message::bot(err.user_message())
            }
        };

        self.store.append(message);
        self.store.set_pending(false);
    }
}
