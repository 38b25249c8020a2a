//! Unified error handling for linkbot.
//!
//! One enum covers the failure taxonomy of a connection attempt: startup
//! failures (log sink, users db), protocol transport errors, and loss of an
//! established connection. The factory keys its retry policy off
//! [`SessionError::is_connection_loss`].

use thiserror::Error;

use crate::db::DbError;

/// Errors that can terminate a protocol session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The activity log could not be opened or written. Fatal: at startup
    /// this aborts before the handshake; mid-session it tears the session
    /// down.
    #[error("activity log error: {0}")]
    LogSink(#[from] std::io::Error),

    /// Users database failure.
    #[error(transparent)]
    Db(#[from] DbError),

    /// Wire-level protocol failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] linkbot_proto::ProtocolError),

    /// The TCP connection attempt failed before a session was established.
    #[error("connection failed: {0}")]
    ConnectionFailed(std::io::Error),

    /// An established connection dropped.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}

impl SessionError {
    /// Whether this is loss of an established connection, recoverable by
    /// the factory via immediate reconnect.
    pub fn is_connection_loss(&self) -> bool {
        matches!(self, SessionError::ConnectionLost(_))
    }
}

/// Process exit status for an unopenable activity log sink.
pub const EXIT_LOG_SINK: i32 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_connection_loss_is_recoverable() {
        assert!(SessionError::ConnectionLost("eof".into()).is_connection_loss());
        assert!(!SessionError::LogSink(std::io::Error::other("disk full")).is_connection_loss());
        assert!(
            !SessionError::ConnectionFailed(std::io::Error::other("refused"))
                .is_connection_loss()
        );
    }
}
