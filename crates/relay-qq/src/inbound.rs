//! Inbound normalization of new QQ group and private messages.

use std::sync::Arc;

use tracing::debug;

use relay_channels::{Bridge, PlatformHandler};
use relay_core::{BridgeMessage, Broadcast, Context};

use crate::mention::resolve_mentions;
use crate::suppress::{cash_key, SuppressionCache};

/// Which branch an inbound message took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Sent by the system account and relayed as a broadcast.
    SystemNotice,
    /// Red-envelope text seen for the first time; a block notice was broadcast.
    CashBlocked,
    /// Red-envelope text already blocked within the window; nothing was sent.
    CashSuppressed,
    /// Handed to the bridge as a normal message.
    Forwarded { mentions_resolved: bool },
}

/// Turns raw QQ messages into bridge traffic.
pub struct Normalizer {
    handler: Arc<dyn PlatformHandler>,
    bridge: Arc<dyn Bridge>,
    suppression: Arc<SuppressionCache>,
    system_sender: String,
    forward_system_notices: bool,
}

impl Normalizer {
    pub fn new(
        handler: Arc<dyn PlatformHandler>,
        bridge: Arc<dyn Bridge>,
        suppression: Arc<SuppressionCache>,
        system_sender: impl Into<String>,
        forward_system_notices: bool,
    ) -> Self {
        Self {
            handler,
            bridge,
            suppression,
            system_sender: system_sender.into(),
            forward_system_notices,
        }
    }

    /// Process one new message, in arrival order for its platform.
    ///
    /// 1. System notice short-circuit
    /// 2. Red-envelope filter (the message itself is never relayed)
    /// 3. Mention resolution for public messages
    /// 4. Best-effort hand-off to the bridge
    pub async fn on_text(&self, mut ctx: Context) -> InboundOutcome {
        // 1. "App messages" from the system account.
        if self.forward_system_notices && ctx.from.as_str() == self.system_sender {
            self.deliver(Broadcast::new(ctx).into()).await;
            return InboundOutcome::SystemNotice;
        }

        // 2. Password red envelopes: announce once per window, never relay.
        if ctx.extra.is_cash {
            let key = cash_key(&ctx.to, &ctx.text);
            if self.suppression.should_suppress(&key) {
                debug!(group = %ctx.to, "red envelope already blocked, dropping");
                return InboundOutcome::CashSuppressed;
            }
            let notice = blocked_notice(&ctx.text);
            self.deliver(Broadcast::with_text(ctx, notice).into()).await;
            return InboundOutcome::CashBlocked;
        }

        // 3. Resolve @mentions; a failed batch leaves the text untouched.
        let mut mentions_resolved = false;
        if !ctx.is_private && !ctx.extra.ats.is_empty() {
            match resolve_mentions(self.handler.as_ref(), &ctx.to, &ctx.extra.ats).await {
                Ok(resolution) => {
                    ctx.text = resolution.apply(&ctx.text);
                    mentions_resolved = true;
                }
                Err(e) => {
                    debug!(group = %ctx.to, error = %e, "mention lookup failed, relaying raw text");
                }
            }
        }

        // 4. Relay.
        self.deliver(ctx.into()).await;
        InboundOutcome::Forwarded { mentions_resolved }
    }

    async fn deliver(&self, msg: BridgeMessage) {
        if let Err(e) = self.bridge.send(msg).await {
            debug!(error = %e, "bridge send failed, dropping");
        }
    }
}

/// Announcement broadcast in place of a blocked red envelope.
pub fn blocked_notice(text: &str) -> String {
    format!("已暫時屏蔽「{text}」")
}
