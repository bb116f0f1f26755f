//! Canonical data model and configuration shared by every relay adapter.

pub mod config;
pub mod error;
pub mod types;

pub use config::{NotifyConfig, QqConfig, RelayConfig};
pub use error::{RelayError, Result};
pub use types::{
    BridgeMessage, Broadcast, Context, ContextKind, Extra, ForwardInfo, GroupId, HandlerRef,
    ReplyInfo, Request, Upload,
};
