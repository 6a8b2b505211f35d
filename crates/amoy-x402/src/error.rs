use thiserror::Error;

/// Errors returned by x402 operations.
///
/// Every failure of a challenge round maps to exactly one variant; nothing
/// downstream of the signing boundary inspects error strings.
#[derive(Debug, Error)]
pub enum X402Error {
    /// Non-challenge failure from the first call, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("malformed payment challenge: {0}")]
    MalformedChallenge(String),

    #[error("no compatible payment scheme: {0}")]
    NoCompatibleScheme(String),

    #[error("you declined the payment")]
    SigningRejected,

    #[error("payment signing timed out after {0}s")]
    SigningTimedOut(u64),

    #[error("payment signing failed: {0}")]
    SigningFailed(String),

    #[error("credential encoding failed: {0}")]
    CredentialEncodingFailed(String),

    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    #[error("paid request failed: {0}")]
    ReplayFailed(ReplayFailure),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Failure reported by a signing capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    /// The holder of the key explicitly declined.
    #[error("signature request rejected")]
    Rejected,

    /// The signer did not answer in time.
    #[error("signature request timed out")]
    TimedOut,

    /// Anything else: misconfigured wallet, malformed message, closed channel.
    #[error("{0}")]
    Failed(String),
}

/// Network-level failure from a transport. HTTP error statuses are not
/// transport errors; they come back as ordinary responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("request failed: {0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Why the single replay did not produce a usable response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayFailure {
    #[error(transparent)]
    Transport(TransportError),

    /// The server challenged the paid request again. Never re-signed.
    #[error("server answered {status} again: {body}")]
    Challenged { status: u16, body: String },
}

impl X402Error {
    /// Classify a signer failure. `timeout_secs` is the window the signer
    /// was given, reported back when the signer itself says it timed out.
    pub fn from_signer(err: SignerError, timeout_secs: u64) -> Self {
        match err {
            SignerError::Rejected => X402Error::SigningRejected,
            SignerError::TimedOut => X402Error::SigningTimedOut(timeout_secs),
            SignerError::Failed(msg) => X402Error::SigningFailed(msg),
        }
    }
}
