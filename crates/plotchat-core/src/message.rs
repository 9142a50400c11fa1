//! UI-agnostic conversation types
//!
//! Messages are created once and never edited, so fields are read through accessors.

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::chart::ChartPayload;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// A single entry in the conversation
#[derive(Debug, Clone)]
pub struct Message {
    id: Uuid,
    text: String,
    sender: Sender,
    timestamp: DateTime<Local>,
    chart: Option<ChartPayload>,
}

impl Message {
    pub fn new(text: impl Into<String>, sender: Sender, chart: Option<ChartPayload>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender,
            timestamp: Local::now(),
            chart,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User, None)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Bot, None)
    }

    pub fn bot_with_chart(text: impl Into<String>, chart: ChartPayload) -> Self {
        Self::new(text, Sender::Bot, Some(chart))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn chart(&self) -> Option<&ChartPayload> {
        self.chart.as_ref()
    }
}
