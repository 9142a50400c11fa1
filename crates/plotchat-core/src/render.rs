//! Presentation pipeline: turns the conversation into rows a UI can draw.
//!
//! Everything here is pure. UIs decide how an avatar, bubble or chart looks;
//! this module decides what there is to show.

use chrono::{DateTime, Local};
use uuid::Uuid;

use crate::chart::{ChartKind, ChartPayload, ChartPoint};
use crate::message::{Message, Sender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Avatar {
    User,
    Bot,
}

impl From<Sender> for Avatar {
    fn from(sender: Sender) -> Self {
        match sender {
            Sender::User => Avatar::User,
            Sender::Bot => Avatar::Bot,
        }
    }
}

impl Avatar {
    pub fn label(&self) -> &'static str {
        match self {
            Avatar::User => "You",
            Avatar::Bot => "Assistant",
        }
    }
}

/// What to draw for a message's chart. Points are passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDirective {
    pub kind: ChartKind,
    pub points: Vec<ChartPoint>,
}

impl From<&ChartPayload> for ChartDirective {
    fn from(payload: &ChartPayload) -> Self {
        Self {
            kind: payload.kind,
            points: payload.points.clone(),
        }
    }
}

impl ChartDirective {
    /// `(x, y)` pairs, used by line and scatter charts. Non-finite pairs are skipped.
    pub fn xy_series(&self) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(|p| (p.x, p.y))
            .collect()
    }

    /// `(name, value)` pairs, used by bar charts
    pub fn bar_series(&self) -> Vec<(&str, f64)> {
        self.points
            .iter()
            .map(|p| (p.name.as_str(), p.value))
            .collect()
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        axis_bounds(self.points.iter().map(|p| p.x))
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        axis_bounds(self.points.iter().map(|p| p.y))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Min/max of the values, widened so a flat or single-point series still has a span.
fn axis_bounds(values: impl Iterator<Item = f64>) -> [f64; 2] {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        return [0.0, 1.0];
    }
    if min == max {
        return [min - 1.0, max + 1.0];
    }
    [min, max]
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageRow {
    pub id: Uuid,
    pub avatar: Avatar,
    pub text: String,
    pub time: String,
    pub chart: Option<ChartDirective>,
}

impl From<&Message> for MessageRow {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id(),
            avatar: message.sender().into(),
            text: message.text().to_string(),
            time: format_time(message.timestamp()),
            chart: message.chart().map(ChartDirective::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderRow {
    Message(MessageRow),
    Typing,
}

/// One row per message, plus a typing row while a reply is pending
pub fn build_rows(messages: &[Message], pending: bool) -> Vec<RenderRow> {
    let mut rows: Vec<RenderRow> = messages
        .iter()
        .map(|m| RenderRow::Message(MessageRow::from(m)))
        .collect();

    if pending {
        rows.push(RenderRow::Typing);
    }

    rows
}

/// Local wall-clock hour and minute, e.g. `14:05`
pub fn format_time(timestamp: DateTime<Local>) -> String {
    timestamp.format("%H:%M").to_string()
}
