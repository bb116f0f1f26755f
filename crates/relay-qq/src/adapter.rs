//! QQ exchange adapter.
//!
//! Owns one instance of each component and routes typed platform events to
//! them. Distinct platforms each get their own adapter and run concurrently;
//! events for one adapter should be dispatched in arrival order.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use relay_channels::{Bridge, FileProcessor, PlatformHandler};
use relay_core::{Context, RelayConfig};

use crate::commands::CommandRouter;
use crate::error::ExchangeError;
use crate::inbound::{InboundOutcome, Normalizer};
use crate::membership::{AdminEvent, JoinEvent, LeaveEvent, MembershipTranslator};
use crate::outbound::Formatter;
use crate::suppress::SuppressionCache;

/// Everything the QQ client can hand to the adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum PlatformEvent {
    /// A new message posted on QQ.
    Text { context: Context },
    /// A context from another platform to deliver on QQ.
    Exchange { context: Context },
    Join(JoinEvent),
    Leave(LeaveEvent),
    Admin(AdminEvent),
    /// A registered slash command was invoked on QQ.
    Command { command: String, context: Context },
}

pub struct QqAdapter {
    normalizer: Normalizer,
    formatter: Formatter,
    membership: MembershipTranslator,
    commands: CommandRouter,
    suppression: Arc<SuppressionCache>,
}

impl QqAdapter {
    pub fn new(
        config: &RelayConfig,
        handler: Arc<dyn PlatformHandler>,
        bridge: Arc<dyn Bridge>,
        files: Option<Arc<dyn FileProcessor>>,
    ) -> Self {
        let qq = &config.options.qq;
        let suppression = Arc::new(SuppressionCache::new(Duration::from_millis(
            qq.suppress_window_ms,
        )));

        info!(
            platform = %handler.platform(),
            id = %handler.id(),
            file_processor = files.is_some(),
            hidenick = config.options.hidenick,
            "QQ adapter ready"
        );

        Self {
            normalizer: Normalizer::new(
                Arc::clone(&handler),
                Arc::clone(&bridge),
                Arc::clone(&suppression),
                qq.system_sender.clone(),
                qq.notify.sysmessage,
            ),
            formatter: Formatter::new(Arc::clone(&handler), files, config.options.hidenick),
            membership: MembershipTranslator::new(
                Arc::clone(&handler),
                Arc::clone(&bridge),
                qq.notify,
            ),
            commands: CommandRouter::new(bridge, qq.commands.clone(), qq.request_target.clone()),
            suppression,
        }
    }

    /// The cache shared with the normalizer.
    ///
    /// The adapter does not start a sweeper on its own. Without one, expired
    /// keys are only replaced on their next sighting and unique spam texts stay
    /// in memory; long-running callers should call
    /// [`SuppressionCache::spawn_sweeper`] once from inside a tokio runtime.
    pub fn suppression(&self) -> &Arc<SuppressionCache> {
        &self.suppression
    }

    /// Commands the platform should register and route back as
    /// [`PlatformEvent::Command`].
    pub fn commands(&self) -> &[String] {
        self.commands.commands()
    }

    /// Route one event to its handler.
    ///
    /// Only an exchange of an unrecognized kind is an error; every other
    /// failure is absorbed by the component that hit it.
    pub async fn dispatch(&self, event: PlatformEvent) -> Result<(), ExchangeError> {
        match event {
            PlatformEvent::Text { context } => {
                self.on_text(context).await;
            }
            PlatformEvent::Exchange { context } => {
                if let Err(e) = self.formatter.exchange(context).await {
                    warn!(error = %e, "exchange rejected");
                    return Err(e);
                }
            }
            PlatformEvent::Join(ev) => {
                self.membership.on_join(ev).await;
            }
            PlatformEvent::Leave(ev) => {
                self.membership.on_leave(ev).await;
            }
            PlatformEvent::Admin(ev) => {
                self.membership.on_admin(ev).await;
            }
            PlatformEvent::Command { command, context } => {
                if !self.commands.dispatch(&command, context).await {
                    warn!(command = %command, "command is not bound to this adapter");
                }
            }
        }
        Ok(())
    }

    pub async fn on_text(&self, ctx: Context) -> InboundOutcome {
        self.normalizer.on_text(ctx).await
    }

    pub async fn on_exchange(&self, ctx: Context) -> Result<(), ExchangeError> {
        self.formatter.exchange(ctx).await
    }
}
