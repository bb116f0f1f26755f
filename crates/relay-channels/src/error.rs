use thiserror::Error;

/// Errors reported by the collaborators an adapter talks to.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A message could not be delivered to the bridge or the remote endpoint.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// A member directory lookup failed (unknown member, API error, …).
    #[error("Lookup failed for {token}: {reason}")]
    LookupFailed { token: String, reason: String },

    /// The attachment processor could not render the upload block.
    #[error("Processing failed: {0}")]
    ProcessFailed(String),
}
