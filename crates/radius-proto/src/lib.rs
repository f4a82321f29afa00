//! RADIUS PAP Protocol Implementation
//!
//! This crate implements the parts of RFC 2865 a PAP client needs to
//! authenticate a user against a RADIUS server. It performs no I/O.
//!
//! # Features
//!
//! - Access-Request encoding and response decoding
//! - User-Name, User-Password and NAS-Identifier attributes
//! - MD5-based User-Password hiding (RFC 2865 Section 5.2)
//! - Request/Response Authenticator calculation and verification
//! - Zero-copy response parsing bounded by the declared packet length
//!
//! # Example
//!
//! ```rust
//! use radius_proto::{Packet, Response};
//! use radius_proto::auth::{
//!     encrypt_user_password, generate_request_authenticator, verify_response_authenticator,
//! };
//!
//! let req_auth = generate_request_authenticator(&mut rand::rng());
//! let encrypted_pwd = encrypt_user_password(b"password", b"secret", &req_auth).unwrap();
//!
//! // Create and encode an Access-Request packet
//! let packet = Packet::access_request(1, req_auth, "alice", encrypted_pwd, None).unwrap();
//! let bytes = packet.encode().unwrap();
//! assert_eq!(bytes[0], 1);
//!
//! // A reply is trusted only once its authenticator checks out
//! # let reply = radius_proto::Packet::new(radius_proto::Code::AccessAccept, 1, [0u8; 16])
//! #     .encode_response(&req_auth, b"secret").unwrap();
//! assert!(verify_response_authenticator(&reply, &req_auth, b"secret"));
//! let response = Response::decode(&reply).unwrap();
//! assert_eq!(response.code(), Some(radius_proto::Code::AccessAccept));
//! ```

pub mod attributes;
pub mod auth;
pub mod packet;

pub use attributes::{Attribute, AttributeType};
pub use auth::{
    MAX_PASSWORD_LENGTH, calculate_response_authenticator, decrypt_user_password,
    encrypt_user_password, generate_request_authenticator, verify_response_authenticator,
};
pub use packet::{Code, Packet, PacketError, Response};
