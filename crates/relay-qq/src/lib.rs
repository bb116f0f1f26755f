pub mod adapter;
pub mod commands;
pub mod error;
pub mod inbound;
pub mod membership;
pub mod mention;
pub mod outbound;
pub mod suppress;
pub mod truncate;

pub use adapter::{PlatformEvent, QqAdapter};
pub use error::ExchangeError;
pub use inbound::InboundOutcome;
pub use suppress::SuppressionCache;
