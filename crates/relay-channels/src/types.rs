use serde::{Deserialize, Serialize};

use relay_core::Context;

/// Options for a single [`PlatformHandler::say`](crate::PlatformHandler::say) call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SayOptions {
    /// The text is already escaped (it embeds platform codes such as image
    /// references) and must be sent as-is.
    pub no_escape: bool,
}

impl SayOptions {
    pub fn raw() -> Self {
        Self { no_escape: true }
    }
}

/// Group member as returned by the platform's member directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    /// Platform-native user id (the QQ number on QQ).
    pub user_id: String,
    /// Account nickname.
    pub nickname: String,
    /// Group-specific display name, if the member set one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
}

/// Events an adapter republishes locally for narrower subscribers.
///
/// Replaces string-keyed `request` / `request#<command>` event names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum LocalEvent {
    /// Any request that reached this platform.
    Request { context: Context },
    /// A request carrying a command token; emitted after the matching `Request`.
    Command { command: String, context: Context },
}
