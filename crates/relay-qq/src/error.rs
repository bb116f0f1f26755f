/// Outcome of an exchange the adapter refuses to deliver.
///
/// This is the reject half of the exchange handshake; delivery failures are
/// never reported through it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    #[error("unrecognized exchange type: {0}")]
    UnknownKind(String),
}
