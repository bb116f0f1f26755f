use std::sync::Arc;

use tracing::debug;

use relay_channels::Bridge;
use relay_core::{Context, Request};

/// Binds the IRC query commands to a cross-platform request.
pub struct CommandRouter {
    bridge: Arc<dyn Bridge>,
    commands: Vec<String>,
    target: String,
}

impl CommandRouter {
    pub fn new(bridge: Arc<dyn Bridge>, commands: Vec<String>, target: impl Into<String>) -> Self {
        Self {
            bridge,
            commands,
            target: target.into(),
        }
    }

    /// Commands the platform should register for this router.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn handles(&self, command: &str) -> bool {
        self.commands.iter().any(|c| c == command)
    }

    /// Forward `ctx` to the target platform as a request for `command`.
    ///
    /// Returns `false` for commands this router does not own.
    pub async fn dispatch(&self, command: &str, ctx: Context) -> bool {
        if !self.handles(command) {
            return false;
        }

        let request = Request::new(ctx)
            .with_targets(self.target.clone())
            .with_command(command);
        if let Err(e) = self.bridge.send(request.into()).await {
            debug!(command, target = %self.target, error = %e, "request not delivered");
        }
        true
    }
}
