// ABOUTME: Crate-wide error taxonomy shared by the codec, session, client, and server layers
// ABOUTME: Mirrors the client module's error style, one variant per failure kind

use crate::codec::CodecError;
use crate::connection::ConnectionError;
use crate::datatypes::CommandStatus;
use thiserror::Error;

/// Errors that can occur anywhere in the protocol engine: framing, session
/// state, bind negotiation, or server-side authentication/capacity limits.
///
/// Lower-level error types (`CodecError`, `ConnectionError`) remain distinct
/// and convert into this one via `#[from]` rather than being folded away, so
/// a caller close to the wire can still match on the precise cause.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed PDU bytes below the frame level.
    #[error("protocol error: {0}")]
    ProtocolError(#[from] CodecError),

    /// Transport-level framing failure (I/O, incomplete frame).
    #[error("frame error: {0}")]
    FrameError(#[from] ConnectionError),

    /// Operation attempted from a session state that doesn't allow it.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A bind attempt was rejected by the peer with the given status.
    #[error("bind rejected: {0:?}")]
    BindError(CommandStatus),

    /// A request's response, or the bind handshake, did not arrive in time.
    #[error("operation timed out")]
    Timeout,

    /// A pending request was cancelled before it resolved, e.g. by teardown.
    #[error("operation cancelled")]
    Cancelled,

    /// The underlying TCP connection failed or closed unexpectedly.
    #[error("connection error: {0}")]
    ConnectionError(String),

    /// `authenticate` rejected a bind attempt's credentials.
    #[error("authentication failed")]
    AuthenticationError,

    /// The server acceptor is at `max_connections` capacity.
    #[error("server at capacity")]
    CapacityError,
}

/// Result type alias used throughout the session and server modules.
pub type Result<T> = std::result::Result<T, Error>;
