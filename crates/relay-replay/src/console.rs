//! Console stand-ins for the QQ client and the bridge.
//!
//! Everything the adapter would post, hand to the bridge or republish locally
//! is printed to stdout as one JSON object per line.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use tracing::warn;

use relay_channels::{Bridge, ChannelError, LocalEvent, MemberInfo, PlatformHandler, SayOptions};
use relay_core::{BridgeMessage, GroupId};

#[derive(Serialize)]
#[serde(rename_all = "snake_case", tag = "out")]
enum Output<'a> {
    Say {
        target: Option<&'a str>,
        text: &'a str,
        no_escape: bool,
    },
    Bridge {
        message: &'a BridgeMessage,
    },
    Local {
        event: &'a LocalEvent,
    },
}

fn print(out: &Output<'_>) {
    match serde_json::to_string(out) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!(error = %e, "failed to serialize replay output"),
    }
}

/// QQ client that prints instead of posting.
pub struct ConsolePlatform {
    id: String,
    members: HashMap<String, MemberInfo>,
}

impl ConsolePlatform {
    pub fn new(id: impl Into<String>, members: HashMap<String, MemberInfo>) -> Self {
        Self {
            id: id.into(),
            members,
        }
    }
}

#[async_trait]
impl PlatformHandler for ConsolePlatform {
    fn id(&self) -> &str {
        &self.id
    }

    fn platform(&self) -> &str {
        "QQ"
    }

    async fn say(
        &self,
        target: Option<&str>,
        text: &str,
        options: SayOptions,
    ) -> Result<(), ChannelError> {
        // Escaping happens at send time unless the text is already escaped.
        let text = if options.no_escape {
            text.to_string()
        } else {
            self.escape(text)
        };
        print(&Output::Say {
            target,
            text: &text,
            no_escape: options.no_escape,
        });
        Ok(())
    }

    /// CQ code escaping.
    fn escape(&self, text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('[', "&#91;")
            .replace(']', "&#93;")
            .replace(',', "&#44;")
    }

    fn nick(&self, member: &MemberInfo) -> String {
        match &member.card {
            Some(card) if !card.is_empty() => card.clone(),
            _ => member.nickname.clone(),
        }
    }

    async fn group_member_info(
        &self,
        group: &GroupId,
        token: &str,
    ) -> Result<MemberInfo, ChannelError> {
        self.members
            .get(token)
            .cloned()
            .ok_or_else(|| ChannelError::LookupFailed {
                token: token.to_string(),
                reason: format!("not in member table for group {group}"),
            })
    }

    fn emit(&self, event: LocalEvent) {
        print(&Output::Local { event: &event });
    }
}

/// Bridge that prints every message it is handed.
pub struct ConsoleBridge;

#[async_trait]
impl Bridge for ConsoleBridge {
    async fn send(&self, msg: BridgeMessage) -> Result<(), ChannelError> {
        print(&Output::Bridge { message: &msg });
        Ok(())
    }
}
