//! `relay-replay` -- run recorded QQ events through the exchange adapter.
//!
//! Reads one JSON `PlatformEvent` per line from `--input` (or stdin) and prints
//! every resulting post, bridge message and local event as JSON lines.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use relay_channels::{MemberInfo, PlatformHandler};
use relay_core::{HandlerRef, RelayConfig};
use relay_qq::{PlatformEvent, QqAdapter};

mod console;

use console::{ConsoleBridge, ConsolePlatform};

/// Replay recorded QQ events through the exchange adapter.
#[derive(Parser)]
#[command(name = "relay-replay", version)]
struct Cli {
    /// Config file (default: $RELAY_CONFIG, then ~/.relay/relay.toml).
    #[arg(short, long)]
    config: Option<String>,

    /// JSON-lines event file; reads stdin when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON object mapping mention tokens to members, used for @-lookups.
    #[arg(long)]
    members: Option<PathBuf>,

    /// Id this platform is known by in multi-platform prefixes.
    #[arg(long, default_value = "QQ")]
    platform_id: String,

    /// Interval of the suppression cache sweeper, in seconds.
    #[arg(long, default_value_t = 60)]
    sweep_secs: u64,
}

#[derive(Debug, Default)]
struct ReplayStats {
    dispatched: u64,
    rejected: u64,
    malformed: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries the replay output; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay_replay=info,relay_qq=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // load config: --config > RELAY_CONFIG env > ~/.relay/relay.toml
    let config_path = cli.config.clone().or_else(|| std::env::var("RELAY_CONFIG").ok());
    let config = RelayConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        warn!(code = e.code(), "Config load failed ({}), using defaults", e);
        RelayConfig::default()
    });

    let members = match &cli.members {
        Some(path) => load_members(path)?,
        None => HashMap::new(),
    };
    info!(members = members.len(), "member table loaded");

    let platform = Arc::new(ConsolePlatform::new(cli.platform_id.clone(), members));
    let origin = HandlerRef::new(platform.id(), platform.platform());
    let adapter = QqAdapter::new(&config, platform, Arc::new(ConsoleBridge), None);
    let _sweeper = adapter
        .suppression()
        .spawn_sweeper(Duration::from_secs(cli.sweep_secs.max(1)));

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &cli.input {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut stats = ReplayStats::default();
    let mut lines = reader.lines();
    let mut line_no = 0u64;
    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let event = match parse_event(line, &origin) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = line_no, code = e.code(), error = %e, "skipping malformed event");
                stats.malformed += 1;
                continue;
            }
        };

        match adapter.dispatch(event).await {
            Ok(()) => stats.dispatched += 1,
            Err(_) => stats.rejected += 1,
        }
    }

    info!(
        dispatched = stats.dispatched,
        rejected = stats.rejected,
        malformed = stats.malformed,
        "replay finished"
    );
    Ok(())
}

/// Parse one event line. Messages posted on QQ without an origin are
/// stamped with this platform's identity.
fn parse_event(line: &str, origin: &HandlerRef) -> relay_core::Result<PlatformEvent> {
    let mut event: PlatformEvent = serde_json::from_str(line)?;
    if let PlatformEvent::Text { context } | PlatformEvent::Command { context, .. } = &mut event {
        if context.handler.is_none() {
            context.handler = Some(origin.clone());
        }
    }
    Ok(event)
}

fn load_members(path: &Path) -> relay_core::Result<HashMap<String, MemberInfo>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> HandlerRef {
        HandlerRef::new("QQ", "QQ")
    }

    #[test]
    fn text_events_get_origin_stamped() {
        let line = r#"{"event":"text","context":{"from":"10001","to":"42","nick":"a","text":"hi"}}"#;
        match parse_event(line, &origin()).unwrap() {
            PlatformEvent::Text { context } => assert_eq!(context.handler, Some(origin())),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn exchange_events_keep_their_origin() {
        let line = r##"{"event":"exchange","context":{"from":"#c","to":"#c","handler":{"id":"I","platform":"IRC"}}}"##;
        match parse_event(line, &origin()).unwrap() {
            PlatformEvent::Exchange { context } => {
                assert_eq!(context.handler, Some(HandlerRef::new("I", "IRC")))
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn malformed_line_is_serialization_error() {
        let err = parse_event("{not json", &origin()).unwrap_err();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn missing_member_file_is_io_error() {
        let err = load_members(Path::new("/nonexistent/members.json")).unwrap_err();
        assert_eq!(err.code(), "IO_ERROR");
    }
}
