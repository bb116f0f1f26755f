// Recording doubles for the collaborators the adapter talks to.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use relay_channels::{
    Bridge, ChannelError, FileProcessor, LocalEvent, MemberInfo, PlatformHandler, SayOptions,
};
use relay_core::{BridgeMessage, Context, GroupId, RelayConfig};
use relay_qq::QqAdapter;

#[derive(Default)]
pub struct RecordingBridge {
    pub sent: Mutex<Vec<BridgeMessage>>,
    pub fail: bool,
}

impl RecordingBridge {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<BridgeMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bridge for RecordingBridge {
    async fn send(&self, msg: BridgeMessage) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(msg);
        if self.fail {
            return Err(ChannelError::SendFailed("bridge offline".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Said {
    pub target: Option<String>,
    pub text: String,
    pub options: SayOptions,
}

/// QQ-like platform: escapes CQ special characters, prefers group cards.
#[derive(Default)]
pub struct RecordingPlatform {
    pub said: Mutex<Vec<Said>>,
    pub events: Mutex<Vec<LocalEvent>>,
    /// token -> (member, artificial lookup delay in ms)
    pub members: HashMap<String, (MemberInfo, u64)>,
    pub fail_say: bool,
}

impl RecordingPlatform {
    pub fn with_member(mut self, token: &str, nickname: &str, card: Option<&str>, delay_ms: u64) -> Self {
        self.members.insert(
            token.to_string(),
            (
                MemberInfo {
                    user_id: token.to_string(),
                    nickname: nickname.to_string(),
                    card: card.map(str::to_string),
                },
                delay_ms,
            ),
        );
        self
    }

    pub fn said(&self) -> Vec<Said> {
        self.said.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<LocalEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlatformHandler for RecordingPlatform {
    fn id(&self) -> &str {
        "Q"
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
        self.said.lock().unwrap().push(Said {
            target: target.map(str::to_string),
            text: text.to_string(),
            options,
        });
        if self.fail_say {
            return Err(ChannelError::SendFailed("rate limited".into()));
        }
        Ok(())
    }

    fn escape(&self, text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('[', "&#91;")
            .replace(']', "&#93;")
    }

    fn nick(&self, member: &MemberInfo) -> String {
        member
            .card
            .clone()
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| member.nickname.clone())
    }

    async fn group_member_info(
        &self,
        _group: &GroupId,
        token: &str,
    ) -> Result<MemberInfo, ChannelError> {
        let (member, delay_ms) =
            self.members
                .get(token)
                .cloned()
                .ok_or_else(|| ChannelError::LookupFailed {
                    token: token.to_string(),
                    reason: "not a member".into(),
                })?;
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(member)
    }

    fn emit(&self, event: LocalEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct StaticFiles(pub Vec<String>);

#[async_trait]
impl FileProcessor for StaticFiles {
    async fn process(&self, _ctx: &Context) -> Result<Vec<String>, ChannelError> {
        Ok(self.0.clone())
    }
}

pub struct BrokenFiles;

#[async_trait]
impl FileProcessor for BrokenFiles {
    async fn process(&self, _ctx: &Context) -> Result<Vec<String>, ChannelError> {
        Err(ChannelError::ProcessFailed("download timed out".into()))
    }
}

pub struct Harness {
    pub adapter: QqAdapter,
    pub platform: Arc<RecordingPlatform>,
    pub bridge: Arc<RecordingBridge>,
}

pub fn harness(toml: &str) -> Harness {
    harness_with(toml, RecordingPlatform::default(), RecordingBridge::default(), None)
}

pub fn harness_with(
    toml: &str,
    platform: RecordingPlatform,
    bridge: RecordingBridge,
    files: Option<Arc<dyn FileProcessor>>,
) -> Harness {
    let config = RelayConfig::from_toml_str(toml).unwrap();
    let platform = Arc::new(platform);
    let bridge = Arc::new(bridge);
    let adapter = QqAdapter::new(&config, platform.clone(), bridge.clone(), files);
    Harness {
        adapter,
        platform,
        bridge,
    }
}
