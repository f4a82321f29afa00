//! PAP authentication exchange against a RADIUS server
//!
//! One call to [`Authenticator::authenticate`] is one self-contained exchange:
//!
//! 1. Draw a fresh identifier and Request Authenticator
//! 2. Hide the password and encode the Access-Request once
//! 3. Send it, then wait for a reply or the per-attempt timeout
//! 4. On timeout, resend the same bytes until the retries are used up
//! 5. Verify the Response Authenticator before looking at the reply code
//!
//! The request is not regenerated between retries: every transmission of one
//! call carries the same identifier and authenticator, so a reply to any of
//! them is accepted.

use crate::config::AuthenticatorConfig;
use crate::error::{ClientError, ClientResult};
use radius_proto::auth::{
    encrypt_user_password, generate_request_authenticator, verify_response_authenticator,
};
use radius_proto::{Code, Packet, Response};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::{Mutex, PoisonError};
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, info, warn};

/// Outcome of an exchange that produced a trusted reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessVerdict {
    /// The server answered Access-Accept
    Accepted,
    /// The server answered Access-Reject, or any other code
    Rejected,
}

/// What to do with one received datagram
enum Reply {
    /// Identifier does not match this exchange; keep waiting
    Stray,
    /// The exchange is over
    Done(ClientResult<AccessVerdict>),
}

/// RADIUS PAP client bound to one server configuration
///
/// Each instance owns its own random generator, so instances created at the
/// same time do not produce correlated identifiers or authenticators. The
/// generator lock is held only while drawing those values, and an instance
/// can be shared between tasks (e.g. in an `Arc`).
pub struct Authenticator {
    config: AuthenticatorConfig,
    rng: Mutex<StdRng>,
}

impl Authenticator {
    /// Create an authenticator, validating the configuration
    pub fn new(config: AuthenticatorConfig) -> ClientResult<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create an authenticator drawing identifiers and authenticators from `rng`
    pub fn with_rng(config: AuthenticatorConfig, rng: StdRng) -> ClientResult<Self> {
        config.validate()?;
        Ok(Authenticator {
            config,
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &AuthenticatorConfig {
        &self.config
    }

    /// Authenticate `username` with `password`.
    ///
    /// Returns `Ok(true)` on Access-Accept and `Ok(false)` on Access-Reject.
    /// `nas_identifier` overrides the configured NAS-Identifier; when neither
    /// is set (or the value is empty) the attribute is left out.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        nas_identifier: Option<&str>,
    ) -> ClientResult<bool> {
        let verdict = self.exchange(username, password, nas_identifier).await?;
        Ok(verdict == AccessVerdict::Accepted)
    }

    /// Run one exchange and return the server's verdict
    pub async fn exchange(
        &self,
        username: &str,
        password: &str,
        nas_identifier: Option<&str>,
    ) -> ClientResult<AccessVerdict> {
        let nas_identifier = nas_identifier.or(self.config.nas_identifier.as_deref());
        let (identifier, request_authenticator) = self.next_request_header();

        // Everything that can fail on caller input happens before any I/O.
        let encrypted_password = encrypt_user_password(
            password.as_bytes(),
            self.config.get_secret(),
            &request_authenticator,
        )?;
        let request = Packet::access_request(
            identifier,
            request_authenticator,
            username,
            encrypted_password,
            nas_identifier,
        )?
        .encode()?;

        let socket = self.connect().await?;

        let result = self
            .send_and_wait(&socket, &request, identifier, &request_authenticator)
            .await;

        match &result {
            Ok(verdict) => info!(
                server = %self.config.server,
                username = username,
                identifier = identifier,
                verdict = ?verdict,
                "RADIUS exchange completed"
            ),
            Err(e) => warn!(
                server = %self.config.server,
                username = username,
                identifier = identifier,
                error = %e,
                "RADIUS exchange failed"
            ),
        }

        result
    }

    /// Draw the identifier and Request Authenticator for one exchange
    fn next_request_header(&self) -> (u8, [u8; 16]) {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let identifier: u8 = rng.random();
        let authenticator = generate_request_authenticator(&mut *rng);
        (identifier, authenticator)
    }

    /// Resolve the server and open a UDP socket connected to it
    async fn connect(&self) -> ClientResult<UdpSocket> {
        let host = (self.config.server.as_str(), self.config.port);

        let server_addr = match timeout(self.config.timeout(), lookup_host(host)).await {
            Ok(resolved) => resolved?.next().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no address found for {}", self.config.server),
                )
            })?,
            Err(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("resolving {} timed out", self.config.server),
                )
                .into());
            }
        };

        let bind_addr: SocketAddr = if server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(server_addr).await?;

        debug!(
            server = %server_addr,
            local = %socket.local_addr()?,
            "UDP socket connected"
        );

        Ok(socket)
    }

    /// Retry loop: send, then race the receive against the attempt deadline
    async fn send_and_wait(
        &self,
        socket: &UdpSocket,
        request: &[u8],
        identifier: u8,
        request_authenticator: &[u8; 16],
    ) -> ClientResult<AccessVerdict> {
        let retries = self.config.retries;
        let attempt_timeout = self.config.timeout();
        let mut buffer = vec![0u8; Packet::MAX_PACKET_SIZE];

        for attempt in 1..=retries {
            socket.send(request).await?;
            debug!(
                attempt = attempt,
                retries = retries,
                identifier = identifier,
                bytes = request.len(),
                "Access-Request sent"
            );

            let deadline = Instant::now() + attempt_timeout;
            loop {
                // Dropping the receive future on timeout cancels the read, so
                // at most one read is ever outstanding on the socket.
                let len = match timeout_at(deadline, socket.recv(&mut buffer)).await {
                    Ok(received) => received?,
                    Err(_) => {
                        warn!(
                            attempt = attempt,
                            retries = retries,
                            timeout = ?attempt_timeout,
                            "No answer from RADIUS server"
                        );
                        break;
                    }
                };

                match self.interpret_reply(&buffer[..len], identifier, request_authenticator) {
                    Reply::Stray => continue,
                    Reply::Done(result) => return result,
                }
            }
        }

        Err(ClientError::Timeout {
            attempts: retries,
            timeout: attempt_timeout,
        })
    }

    /// Decode and verify one datagram; the verdict is only read once the
    /// Response Authenticator has been checked.
    fn interpret_reply(
        &self,
        datagram: &[u8],
        identifier: u8,
        request_authenticator: &[u8; 16],
    ) -> Reply {
        let response = match Response::decode(datagram) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, bytes = datagram.len(), "Undecodable reply from server");
                return Reply::Done(Err(ClientError::IntegrityFailure));
            }
        };

        if response.identifier() != identifier {
            debug!(
                expected = identifier,
                received = response.identifier(),
                "Ignoring reply for another request"
            );
            return Reply::Stray;
        }

        if !verify_response_authenticator(
            response.as_bytes(),
            request_authenticator,
            self.config.get_secret(),
        ) {
            warn!(
                identifier = identifier,
                code = response.raw_code(),
                "Response Authenticator mismatch"
            );
            return Reply::Done(Err(ClientError::IntegrityFailure));
        }

        let verdict = match response.code() {
            Some(Code::AccessAccept) => AccessVerdict::Accepted,
            other => {
                if other != Some(Code::AccessReject) {
                    debug!(code = response.raw_code(), "Unexpected reply code treated as reject");
                }
                AccessVerdict::Rejected
            }
        };

        Reply::Done(Ok(verdict))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radius_proto::{Attribute, AttributeType};
    use std::time::Duration;

    fn test_authenticator() -> Authenticator {
        let config = AuthenticatorConfig::new("127.0.0.1", 1812, "testing123");
        Authenticator::with_rng(config, StdRng::seed_from_u64(7)).unwrap()
    }

    fn signed_reply(code: Code, identifier: u8, request_auth: &[u8; 16], secret: &[u8]) -> Vec<u8> {
        Packet::new(code, identifier, [0u8; 16])
            .encode_response(request_auth, secret)
            .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = AuthenticatorConfig::new("127.0.0.1", 1812, "");
        assert!(matches!(
            Authenticator::new(config),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn test_request_headers_are_fresh() {
        let auth = test_authenticator();
        let (_, first) = auth.next_request_header();
        let (_, second) = auth.next_request_header();
        assert_ne!(first, second);
    }

    #[test]
    fn test_instances_have_independent_generators() {
        let config = AuthenticatorConfig::new("127.0.0.1", 1812, "testing123");
        let a = Authenticator::new(config.clone()).unwrap();
        let b = Authenticator::new(config).unwrap();
        assert_ne!(a.next_request_header().1, b.next_request_header().1);
    }

    #[test]
    fn test_interpret_accept_and_reject() {
        let auth = test_authenticator();
        let request_auth = [3u8; 16];

        let accept = signed_reply(Code::AccessAccept, 5, &request_auth, b"testing123");
        assert!(matches!(
            auth.interpret_reply(&accept, 5, &request_auth),
            Reply::Done(Ok(AccessVerdict::Accepted))
        ));

        let reject = signed_reply(Code::AccessReject, 5, &request_auth, b"testing123");
        assert!(matches!(
            auth.interpret_reply(&reject, 5, &request_auth),
            Reply::Done(Ok(AccessVerdict::Rejected))
        ));

        let challenge = signed_reply(Code::AccessChallenge, 5, &request_auth, b"testing123");
        assert!(matches!(
            auth.interpret_reply(&challenge, 5, &request_auth),
            Reply::Done(Ok(AccessVerdict::Rejected))
        ));
    }

    #[test]
    fn test_interpret_forged_accept() {
        let auth = test_authenticator();
        let request_auth = [3u8; 16];

        let forged = signed_reply(Code::AccessAccept, 5, &request_auth, b"other-secret");
        assert!(matches!(
            auth.interpret_reply(&forged, 5, &request_auth),
            Reply::Done(Err(ClientError::IntegrityFailure))
        ));
    }

    #[test]
    fn test_interpret_stray_and_garbage() {
        let auth = test_authenticator();
        let request_auth = [3u8; 16];

        let other = signed_reply(Code::AccessAccept, 6, &request_auth, b"testing123");
        assert!(matches!(
            auth.interpret_reply(&other, 5, &request_auth),
            Reply::Stray
        ));

        assert!(matches!(
            auth.interpret_reply(b"not radius", 5, &request_auth),
            Reply::Done(Err(ClientError::IntegrityFailure))
        ));
    }

    #[test]
    fn test_interpret_ignores_bytes_past_length() {
        let auth = test_authenticator();
        let request_auth = [9u8; 16];

        let mut packet = Packet::new(Code::AccessAccept, 1, [0u8; 16]);
        packet.add_attribute(
            Attribute::string(AttributeType::ReplyMessage as u8, "Welcome").unwrap(),
        );
        let mut datagram = packet.encode_response(&request_auth, b"testing123").unwrap();
        datagram.extend_from_slice(&[0xFF; 32]);

        assert!(matches!(
            auth.interpret_reply(&datagram, 1, &request_auth),
            Reply::Done(Ok(AccessVerdict::Accepted))
        ));
    }

    #[tokio::test]
    async fn test_validation_happens_before_io() {
        // Unresolvable server: reaching the network would yield a transport error.
        let config = AuthenticatorConfig::new("unreachable.invalid", 1812, "testing123")
            .with_timeout(Duration::from_millis(100));
        let auth = Authenticator::new(config).unwrap();

        let password = "p".repeat(129);
        let result = auth.authenticate("alice", &password, None).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));

        let username = "u".repeat(254);
        let result = auth.authenticate(&username, "secret", None).await;
        assert!(matches!(result, Err(ClientError::Validation(_))));
    }
}
