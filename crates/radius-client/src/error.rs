//! Client error types

use crate::config::ConfigError;
use radius_proto::PacketError;
use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by an authentication exchange
///
/// An Access-Reject is not an error; it is reported as a normal outcome.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Caller input exceeds a protocol size limit; nothing was sent
    #[error("Validation error: {0}")]
    Validation(#[from] PacketError),

    /// Address resolution, socket setup, send or receive failed
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// No answer after every transmission
    #[error("server is not responding: waited {attempts} times {timeout:?} for an answer")]
    Timeout { attempts: u32, timeout: Duration },

    /// The reply's Response Authenticator did not match, or the reply could not be parsed
    #[error("forged or corrupted answer")]
    IntegrityFailure,

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
