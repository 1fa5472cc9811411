//! Error taxonomy for the DEAT client.
//!
//! [`ClientError`] covers every failure the session layer can produce.
//! The surface is deliberately small: each variant maps to one boundary
//! where the failure is handled, and nothing here is fatal — the worst
//! outcome for the caller is a blocked action plus a notice.

use thiserror::Error;

/// Errors surfaced by the DEAT client session layer.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// User-supplied payload text is not valid JSON. Local validation
    /// failure; the send is aborted and the connection is untouched.
    #[error("invalid user JSON: {0}")]
    InvalidUserJson(String),

    /// A send was attempted while no open connection exists. Nothing
    /// is transmitted.
    #[error("not connected")]
    NotConnected,

    /// An inbound frame failed to parse or lacks the required fields.
    /// The frame is logged and dropped; the connection stays open.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Transport construction or mid-session failure. The connection
    /// is torn down and a reconnect is scheduled.
    #[error("transport error: {0}")]
    Transport(String),

    /// A handle outlived its supervisor task. Treated like a transport
    /// fault by callers; only reachable after an explicit shutdown.
    #[error("connection supervisor is gone")]
    ChannelClosed,
}

/// Convenience alias for client results.
pub type Result<T> = std::result::Result<T, ClientError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
