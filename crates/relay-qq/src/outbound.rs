//! Outbound formatting: renders contexts arriving from other platforms as QQ text.

use std::sync::Arc;

use tracing::{debug, warn};

use relay_channels::{FileProcessor, LocalEvent, PlatformHandler, SayOptions};
use relay_core::{Context, ContextKind, Upload};

use crate::error::ExchangeError;
use crate::truncate::{truncate, REPLY_EXCERPT_CHARS};

/// From this many bridged platforms on, prefixes name the origin platform.
pub const MULTI_PLATFORM_CLIENTS: usize = 3;

/// Renders exchanged contexts and posts them through the platform handler.
pub struct Formatter {
    handler: Arc<dyn PlatformHandler>,
    files: Option<Arc<dyn FileProcessor>>,
    hidenick: bool,
}

impl Formatter {
    pub fn new(
        handler: Arc<dyn PlatformHandler>,
        files: Option<Arc<dyn FileProcessor>>,
        hidenick: bool,
    ) -> Self {
        Self {
            handler,
            files,
            hidenick,
        }
    }

    /// Deliver `ctx` on this platform.
    ///
    /// `Ok` resolves the exchange even when the platform failed to post the
    /// text; only an unrecognized context kind is rejected.
    pub async fn exchange(&self, ctx: Context) -> Result<(), ExchangeError> {
        let target = ctx.target_for(self.handler.platform()).map(str::to_owned);

        match ctx.kind {
            ContextKind::Message if ctx.extra.is_action => {
                let output = format!("* {} {}", ctx.nick, ctx.text);
                self.say(target.as_deref(), &output, SayOptions::default()).await;
            }
            ContextKind::Message => {
                let prefix = build_prefix(self.hidenick, &ctx);
                let (output, options) = self.render_message(&ctx, &prefix).await;
                self.say(target.as_deref(), &output, options).await;
            }
            ContextKind::Request => {
                let command = ctx.command.clone();
                self.handler.emit(LocalEvent::Request { context: ctx.clone() });
                if let Some(command) = command {
                    self.handler.emit(LocalEvent::Command {
                        command,
                        context: ctx,
                    });
                }
            }
            ContextKind::Broadcast => {
                let output = render_broadcast(&ctx);
                self.say(target.as_deref(), &output, SayOptions::default()).await;
            }
            ContextKind::Other(kind) => {
                return Err(ExchangeError::UnknownKind(kind));
            }
        }

        Ok(())
    }

    /// Prefix, body and attachments of a normal message.
    ///
    /// Image uploads go through the file processor when one is registered;
    /// otherwise (or when it fails) upload URLs are appended to the text.
    async fn render_message(&self, ctx: &Context, prefix: &str) -> (String, SayOptions) {
        if !ctx.extra.uploads.is_empty() && ctx.extra.is_image {
            if let Some(files) = &self.files {
                match files.process(ctx).await {
                    Ok(blocks) => {
                        let mut output = self.handler.escape(prefix);
                        output.push('\n');
                        output.push_str(&blocks.join("\n"));
                        if let Some(caption) = &ctx.extra.image_caption {
                            output.push('\n');
                            output.push_str(&self.handler.escape(caption));
                        }
                        return (output, SayOptions::raw());
                    }
                    Err(e) => {
                        debug!(error = %e, "file processor failed, falling back to upload URLs");
                    }
                }
            }
        }

        let output = format!("{prefix}{}{}", ctx.text, upload_urls(&ctx.extra.uploads));
        (output, SayOptions::default())
    }

    async fn say(&self, target: Option<&str>, text: &str, options: SayOptions) {
        if let Err(e) = self.handler.say(target, text, options).await {
            warn!(
                platform = %self.handler.platform(),
                target = target.unwrap_or("<default>"),
                error = %e,
                "failed to post exchanged message"
            );
        }
    }
}

/// Build the `[nick] Re …: ` style prefix of a relayed message.
///
/// Pure in (`hidenick`, reply, forward, client count, origin id).
pub fn build_prefix(hidenick: bool, ctx: &Context) -> String {
    if hidenick {
        return String::new();
    }

    let mut special = String::new();
    if let Some(reply) = &ctx.extra.reply {
        special.push_str(&format!("Re {} ", reply.nick));
        if reply.is_text {
            special.push_str(&format!("「{}」", truncate(&reply.message, REPLY_EXCERPT_CHARS)));
        } else {
            special.push_str(&reply.message);
        }
        special.push_str(": ");
    } else if let Some(forward) = &ctx.extra.forward {
        special = format!("Fwd {}: ", forward.nick);
    }

    match &ctx.handler {
        Some(origin) if ctx.extra.clients >= MULTI_PLATFORM_CLIENTS => {
            format!("[{} - {}] {special}", origin.id, ctx.nick)
        }
        _ => format!("[{}] {special}", ctx.nick),
    }
}

/// `< text >`, naming the origin platform once three or more are bridged.
pub fn render_broadcast(ctx: &Context) -> String {
    match &ctx.handler {
        Some(origin) if ctx.extra.clients >= MULTI_PLATFORM_CLIENTS => {
            format!("< {}: {} >", origin.platform, ctx.text)
        }
        _ => format!("< {} >", ctx.text),
    }
}

fn upload_urls(uploads: &[Upload]) -> String {
    uploads.iter().map(|u| format!(" {}", u.url)).collect()
}
