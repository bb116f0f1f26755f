use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Opaque identifier for a group, channel or chat on some platform.
///
/// Platforms with numeric ids carry them as their decimal text so every
/// adapter can compare and format them the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for GroupId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<i64> for GroupId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

/// What a [`Context`] represents on the wire.
///
/// Unrecognized values are kept verbatim in [`ContextKind::Other`] so the
/// receiving adapter can reject them instead of guessing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContextKind {
    #[default]
    Message,
    Request,
    Broadcast,
    Other(String),
}

impl ContextKind {
    pub fn as_str(&self) -> &str {
        match self {
            ContextKind::Message => "message",
            ContextKind::Request => "request",
            ContextKind::Broadcast => "broadcast",
            ContextKind::Other(s) => s,
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for ContextKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "message" => ContextKind::Message,
            "request" => ContextKind::Request,
            "broadcast" => ContextKind::Broadcast,
            _ => ContextKind::Other(s),
        }
    }
}

impl From<ContextKind> for String {
    fn from(kind: ContextKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Identity of the adapter a [`Context`] came from.
///
/// Lookup only: holding one never keeps the adapter alive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerRef {
    /// Short id shown in message prefixes (e.g. `"QQ"`, `"T"`).
    pub id: String,
    /// Platform type shown in broadcasts (e.g. `"QQ"`, `"IRC"`, `"Telegram"`).
    pub platform: String,
}

impl HandlerRef {
    pub fn new(id: impl Into<String>, platform: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            platform: platform.into(),
        }
    }
}

/// Summary of the message being replied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyInfo {
    pub nick: String,
    /// Body for text replies, or a label such as `<Sticker>` otherwise.
    pub message: String,
    #[serde(default)]
    pub is_text: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardInfo {
    pub nick: String,
}

/// One attachment carried with a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Open attribute bag of a [`Context`]. Which fields matter depends on the kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extra {
    /// IRC `/me` style action.
    pub is_action: bool,
    /// Password red envelope / lucky draw message.
    pub is_cash: bool,
    /// The uploads are images.
    pub is_image: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_caption: Option<String>,
    /// Raw mention tokens in order of appearance.
    pub ats: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward: Option<ForwardInfo>,
    pub uploads: Vec<Upload>,
    /// Number of platforms currently bridged.
    pub clients: usize,
    /// Platform type -> destination target on that platform.
    pub mapto: HashMap<String, String>,
}

/// Canonical cross-platform envelope for one chat event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub from: GroupId,
    pub to: GroupId,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default, rename = "type")]
    pub kind: ContextKind,
    /// Set on requests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Set on requests only: a platform name or `"all"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<String>,
    #[serde(default)]
    pub extra: Extra,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handler: Option<HandlerRef>,
    /// Originating platform payload, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "_rawdata")]
    pub raw: Option<serde_json::Value>,
}

impl Context {
    pub fn new(
        from: impl Into<GroupId>,
        to: impl Into<GroupId>,
        nick: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            nick: nick.into(),
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_handler(mut self, handler: HandlerRef) -> Self {
        self.handler = Some(handler);
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Destination target on `platform`, if the bridge mapped one.
    pub fn target_for(&self, platform: &str) -> Option<&str> {
        self.extra.mapto.get(platform).map(String::as_str)
    }
}

/// System-wide notice. Built once, sent once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broadcast {
    context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Broadcast {
    pub fn new(context: Context) -> Self {
        Self {
            context,
            text: None,
        }
    }

    /// Broadcast `context` but announce `text` instead of the original body.
    pub fn with_text(context: Context, text: impl Into<String>) -> Self {
        Self {
            context,
            text: Some(text.into()),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The text that will actually be announced.
    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.context.text)
    }

    /// Flatten into the `broadcast` context delivered to other platforms.
    pub fn into_context(self) -> Context {
        let mut ctx = self.context;
        if let Some(text) = self.text {
            ctx.text = text;
        }
        ctx.kind = ContextKind::Broadcast;
        ctx
    }
}

/// Cross-platform query, e.g. asking IRC for its member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    context: Context,
    pub targets: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl Request {
    /// Wrap `context`, addressed to every platform until `targets` is narrowed.
    pub fn new(context: Context) -> Self {
        Self {
            context,
            targets: "all".to_string(),
            command: None,
        }
    }

    pub fn with_targets(mut self, targets: impl Into<String>) -> Self {
        self.targets = targets.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn into_context(self) -> Context {
        let mut ctx = self.context;
        ctx.kind = ContextKind::Request;
        ctx.targets = Some(self.targets);
        ctx.command = self.command;
        ctx
    }
}

/// Everything an adapter can hand to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "variant", content = "payload")]
pub enum BridgeMessage {
    Message(Context),
    Broadcast(Broadcast),
    Request(Request),
}

impl BridgeMessage {
    /// The context as it will be delivered to the other platforms.
    pub fn into_context(self) -> Context {
        match self {
            BridgeMessage::Message(ctx) => ctx,
            BridgeMessage::Broadcast(b) => b.into_context(),
            BridgeMessage::Request(r) => r.into_context(),
        }
    }
}

impl From<Context> for BridgeMessage {
    fn from(ctx: Context) -> Self {
        BridgeMessage::Message(ctx)
    }
}

impl From<Broadcast> for BridgeMessage {
    fn from(b: Broadcast) -> Self {
        BridgeMessage::Broadcast(b)
    }
}

impl From<Request> for BridgeMessage {
    fn from(r: Request) -> Self {
        BridgeMessage::Request(r)
    }
}
