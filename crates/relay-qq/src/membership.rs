//! Join, leave and admin-change notices.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use relay_channels::{Bridge, PlatformHandler};
use relay_core::{Broadcast, Context, GroupId, HandlerRef, NotifyConfig};

/// The member an event is about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRef {
    /// QQ number.
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEvent {
    pub group: GroupId,
    pub user: MemberRef,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    #[default]
    Voluntary,
    Kicked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveEvent {
    pub group: GroupId,
    pub user: MemberRef,
    #[serde(default)]
    pub kind: LeaveKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminChange {
    Promoted,
    Demoted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEvent {
    pub group: GroupId,
    pub user: MemberRef,
    pub change: AdminChange,
}

pub fn join_text(ev: &JoinEvent) -> String {
    format!("{} ({}) 加入QQ群", ev.user.name, ev.user.id)
}

pub fn leave_text(ev: &LeaveEvent) -> String {
    match ev.kind {
        LeaveKind::Voluntary => format!("{} ({}) 退出QQ群", ev.user.name, ev.user.id),
        LeaveKind::Kicked => format!("{} ({}) 被管理員踢出QQ群", ev.user.name, ev.user.id),
    }
}

pub fn admin_text(ev: &AdminEvent) -> String {
    match ev.change {
        AdminChange::Demoted => format!("{} ({}) 被取消管理員", ev.user.name, ev.user.id),
        AdminChange::Promoted => format!("{} ({}) 成為管理員", ev.user.name, ev.user.id),
    }
}

/// Translates membership events into broadcasts, each kind behind its own flag.
pub struct MembershipTranslator {
    handler: Arc<dyn PlatformHandler>,
    bridge: Arc<dyn Bridge>,
    notify: NotifyConfig,
}

impl MembershipTranslator {
    pub fn new(
        handler: Arc<dyn PlatformHandler>,
        bridge: Arc<dyn Bridge>,
        notify: NotifyConfig,
    ) -> Self {
        Self {
            handler,
            bridge,
            notify,
        }
    }

    /// Returns `true` if a notice was handed to the bridge.
    pub async fn on_join(&self, ev: JoinEvent) -> bool {
        if !self.notify.join {
            return false;
        }
        let text = join_text(&ev);
        self.announce(&ev.group, &ev.user, text, &ev).await;
        true
    }

    pub async fn on_leave(&self, ev: LeaveEvent) -> bool {
        if !self.notify.leave {
            return false;
        }
        let text = leave_text(&ev);
        self.announce(&ev.group, &ev.user, text, &ev).await;
        true
    }

    pub async fn on_admin(&self, ev: AdminEvent) -> bool {
        if !self.notify.setadmin {
            return false;
        }
        let text = admin_text(&ev);
        self.announce(&ev.group, &ev.user, text, &ev).await;
        true
    }

    async fn announce<E: Serialize>(&self, group: &GroupId, user: &MemberRef, text: String, raw: &E) {
        let mut ctx = Context::new(group.clone(), group.clone(), user.name.clone(), text)
            .with_handler(HandlerRef::new(self.handler.id(), self.handler.platform()));
        ctx.raw = serde_json::to_value(raw).ok();

        if let Err(e) = self.bridge.send(Broadcast::new(ctx).into()).await {
            debug!(group = %group, error = %e, "membership notice not delivered");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> MemberRef {
        MemberRef {
            id: "10001".into(),
            name: "Alice".into(),
        }
    }

    #[test]
    fn join_template() {
        let ev = JoinEvent {
            group: "42".into(),
            user: user(),
        };
        assert_eq!(join_text(&ev), "Alice (10001) 加入QQ群");
    }

    #[test]
    fn leave_distinguishes_kick() {
        let mut ev = LeaveEvent {
            group: "42".into(),
            user: user(),
            kind: LeaveKind::Voluntary,
        };
        assert_eq!(leave_text(&ev), "Alice (10001) 退出QQ群");
        ev.kind = LeaveKind::Kicked;
        assert_eq!(leave_text(&ev), "Alice (10001) 被管理員踢出QQ群");
    }

    #[test]
    fn admin_distinguishes_promotion() {
        let mut ev = AdminEvent {
            group: "42".into(),
            user: user(),
            change: AdminChange::Promoted,
        };
        assert_eq!(admin_text(&ev), "Alice (10001) 成為管理員");
        ev.change = AdminChange::Demoted;
        assert_eq!(admin_text(&ev), "Alice (10001) 被取消管理員");
    }

    #[test]
    fn leave_kind_defaults_to_voluntary() {
        let ev: LeaveEvent =
            serde_json::from_str(r#"{"group":"42","user":{"id":"1","name":"A"}}"#).unwrap();
        assert_eq!(ev.kind, LeaveKind::Voluntary);
    }
}
