use async_trait::async_trait;

use relay_core::{BridgeMessage, Context, GroupId};

use crate::{
    error::ChannelError,
    types::{LocalEvent, MemberInfo, SayOptions},
};

/// The bridge's routing and fan-out engine, seen from one adapter.
///
/// Implementations must be `Send + Sync` so one instance can be shared by
/// every platform task.
#[async_trait]
pub trait Bridge: Send + Sync {
    /// Hand a message to the bridge for distribution to the other platforms.
    async fn send(&self, msg: BridgeMessage) -> Result<(), ChannelError>;
}

/// The platform client an adapter formats for (QQ, IRC, Telegram, …).
#[async_trait]
pub trait PlatformHandler: Send + Sync {
    /// Short id shown in multi-platform prefixes.
    fn id(&self) -> &str;

    /// Platform type shown in broadcasts and used as the key into `extra.mapto`.
    fn platform(&self) -> &str;

    /// Post `text` to `target`, or to the platform's default target when `None`.
    async fn say(
        &self,
        target: Option<&str>,
        text: &str,
        options: SayOptions,
    ) -> Result<(), ChannelError>;

    /// Escape `text` so the platform shows it literally.
    fn escape(&self, text: &str) -> String;

    /// Display name to use for `member`.
    fn nick(&self, member: &MemberInfo) -> String;

    /// Look up the member behind a raw mention token in `group`.
    async fn group_member_info(
        &self,
        group: &GroupId,
        token: &str,
    ) -> Result<MemberInfo, ChannelError>;

    /// Republish an event to local subscribers (command handlers, plugins).
    fn emit(&self, event: LocalEvent);
}

/// Optional attachment renderer (e.g. turns image uploads into CQ codes).
#[async_trait]
pub trait FileProcessor: Send + Sync {
    /// Render one reference block per upload of `ctx`.
    async fn process(&self, ctx: &Context) -> Result<Vec<String>, ChannelError>;
}
