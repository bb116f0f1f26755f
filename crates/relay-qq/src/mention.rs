//! Batched mention resolution.
//!
//! QQ messages carry mentions as `@<qq number>`. Before relaying, each token is
//! looked up in the group's member list and rewritten to `＠<display name>`.
//! The full-width sign marks the mention as resolved, so rewriting is
//! idempotent.

use futures_util::future::try_join_all;
use tracing::debug;

use relay_channels::{ChannelError, PlatformHandler};
use relay_core::GroupId;

/// Marker placed in front of a resolved display name (U+FF20).
pub const RESOLVED_MARK: char = '＠';

/// Token -> display name pairs for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionResolution {
    /// Sorted longest token first so `@1234` wins over `@123`.
    pairs: Vec<(String, String)>,
}

impl MentionResolution {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (token, name) in entries {
            if token.is_empty() || pairs.iter().any(|(t, _)| *t == token) {
                continue;
            }
            pairs.push((token, name));
        }
        pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        Self { pairs }
    }

    pub fn get(&self, token: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, name)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Rewrite every `@<token>` in `text` to `＠<name>`, scanning left to right.
    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('@') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];

            match self.pairs.iter().find(|(token, _)| after.starts_with(token.as_str())) {
                Some((token, name)) => {
                    out.push(RESOLVED_MARK);
                    out.push_str(name);
                    rest = &after[token.len()..];
                }
                None => {
                    out.push('@');
                    rest = after;
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Look up every token in `group`, concurrently.
///
/// All-or-nothing: the first failed lookup fails the whole batch, so the
/// caller never substitutes a partial set.
pub async fn resolve_mentions(
    handler: &dyn PlatformHandler,
    group: &GroupId,
    tokens: &[String],
) -> Result<MentionResolution, ChannelError> {
    let lookups = tokens.iter().map(|token| async move {
        let member = handler.group_member_info(group, token).await?;
        Ok::<_, ChannelError>((token.clone(), handler.nick(&member)))
    });

    let pairs = try_join_all(lookups).await?;
    debug!(group = %group, resolved = pairs.len(), "mentions resolved");
    Ok(MentionResolution::new(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolution(pairs: &[(&str, &str)]) -> MentionResolution {
        MentionResolution::new(
            pairs
                .iter()
                .map(|(t, n)| (t.to_string(), n.to_string())),
        )
    }

    #[test]
    fn rewrites_every_occurrence() {
        let r = resolution(&[("10001", "Alice")]);
        assert_eq!(
            r.apply("@10001 hi, @10001 again"),
            "＠Alice hi, ＠Alice again"
        );
    }

    #[test]
    fn keeps_source_order_for_multiple_tokens() {
        let r = resolution(&[("2", "Bob"), ("1", "Ann")]);
        assert_eq!(r.apply("@1 and @2"), "＠Ann and ＠Bob");
    }

    #[test]
    fn longest_token_wins() {
        let r = resolution(&[("123", "short"), ("1234", "long")]);
        assert_eq!(r.apply("@1234 @123"), "＠long ＠short");
    }

    #[test]
    fn unknown_mentions_and_plain_at_signs_untouched() {
        let r = resolution(&[("1", "Ann")]);
        assert_eq!(r.apply("mail me@ example @9"), "mail me@ example @9");
    }

    #[test]
    fn apply_is_idempotent() {
        let r = resolution(&[("10001", "Alice"), ("10002", "Bob")]);
        let once = r.apply("@10001 @10002 see");
        let twice = r.apply(&once);
        assert_eq!(once, twice);
        assert!(!twice.contains("＠＠"));
    }

    #[test]
    fn duplicate_tokens_collapse() {
        let r = resolution(&[("1", "Ann"), ("1", "Ann")]);
        assert_eq!(r.len(), 1);
        assert_eq!(r.get("1"), Some("Ann"));
    }
}
