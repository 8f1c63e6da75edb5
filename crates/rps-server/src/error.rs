//! Session-level failures.

use std::io;

use thiserror::Error;

/// Why a session handler stopped.
///
/// Protocol errors never show up here; they are acknowledged to the
/// client and the session carries on.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Peer reset, broken pipe, or any other read/write failure.
    #[error("connection fault: {0}")]
    ConnectionFault(#[from] io::Error),

    /// The coordinator task is gone; nothing can be processed.
    #[error("round coordinator has shut down")]
    CoordinatorGone,
}
