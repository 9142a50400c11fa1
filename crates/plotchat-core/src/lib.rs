pub mod chart;
pub mod config;
pub mod exchange;
pub mod message;
pub mod render;
pub mod session;
pub mod store;

// Re-export main types for convenience
pub use chart::{ChartKind, ChartPayload, ChartPoint};
pub use config::Config;
pub use exchange::{ChatClient, Exchange, ExchangeError, NormalizedReply};
pub use message::{Message, Sender};
pub use render::{build_rows, Avatar, ChartDirective, MessageRow, RenderRow};
pub use session::ChatSession;
pub use store::MessageStore;
