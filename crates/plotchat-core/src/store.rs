use crate::message::Message;

pub const GREETING: &str =
    "Hello! I'm your AI assistant. How can I help you today? Try typing 'plot' to see a sample visualization!";

/// Ordered conversation history plus the "reply pending" gate
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    pending: bool,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the assistant's opening message
    pub fn with_greeting() -> Self {
        let mut store = Self::new();
        store.append(Message::bot(GREETING));
        store
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn current(&self) -> &[Message] {
        &self.messages
    }
}
