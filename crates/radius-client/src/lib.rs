//! RADIUS PAP Client
//!
//! This crate authenticates users against a RADIUS server with the
//! Password Authentication Protocol, on top of the `radius-proto`
//! protocol implementation.
//!
//! # Features
//!
//! - Async UDP exchange with Tokio
//! - Bounded per-attempt timeout with retransmission
//! - Response Authenticator verification before any verdict is trusted
//! - Optional NAS-Identifier
//! - JSON configuration
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_client::{Authenticator, AuthenticatorConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AuthenticatorConfig::new("192.168.1.10", 1812, "testing123")
//!         .with_retries(3)
//!         .with_timeout(Duration::from_secs(5));
//!
//!     let authenticator = Authenticator::new(config)?;
//!     let accepted = authenticator
//!         .authenticate("alice", "password", Some("vpn-gateway-01"))
//!         .await?;
//!
//!     println!("accepted: {}", accepted);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::{AccessVerdict, Authenticator};
pub use config::{AuthenticatorConfig, ConfigError};
pub use error::{ClientError, ClientResult};
