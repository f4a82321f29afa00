use crate::packet::{Packet, PacketError, Response};
use rand::Rng;

/// Longest User-Password plaintext accepted by the cipher
pub const MAX_PASSWORD_LENGTH: usize = 128;

const BLOCK_SIZE: usize = 16;

/// Generate a Request Authenticator (16 bytes) per RFC 2865 Section 3
///
/// The value only needs to be unpredictable across exchanges, so any
/// generator will do; callers pass their own to avoid sharing state.
pub fn generate_request_authenticator<R: Rng>(rng: &mut R) -> [u8; 16] {
    let mut authenticator = [0u8; 16];
    rng.fill(&mut authenticator);
    authenticator
}

/// Calculate the Response Authenticator of an encoded response per RFC 2865 Section 3
///
/// Response Authenticator = MD5(Code + ID + Length + Request Authenticator + Attributes + Secret)
///
/// Only the bytes covered by the header's length field take part in the hash.
pub fn calculate_response_authenticator(
    response: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> Result<[u8; 16], PacketError> {
    let response = Response::decode(response)?;
    let bytes = response.as_bytes();

    let mut ctx = md5::Context::new();
    // Code, Identifier, Length
    ctx.consume(&bytes[..4]);
    ctx.consume(request_authenticator);
    ctx.consume(&bytes[Packet::MIN_PACKET_SIZE..]);
    ctx.consume(secret);

    Ok(ctx.compute().0)
}

/// Verify the Response Authenticator of an encoded response
///
/// Returns false for a malformed response as well as for a mismatch; neither
/// may be trusted.
pub fn verify_response_authenticator(
    response: &[u8],
    request_authenticator: &[u8; 16],
    secret: &[u8],
) -> bool {
    match calculate_response_authenticator(response, request_authenticator, secret) {
        Ok(calculated) => response[4..Packet::MIN_PACKET_SIZE] == calculated,
        Err(_) => false,
    }
}

/// MD5(secret + previous) where previous is the authenticator or the last cipher block
fn keystream_block(secret: &[u8], previous: &[u8]) -> [u8; 16] {
    let mut ctx = md5::Context::new();
    ctx.consume(secret);
    ctx.consume(previous);
    ctx.compute().0
}

/// Encrypt User-Password attribute per RFC 2865 Section 5.2
///
/// The password is first padded with zeros to a multiple of 16 bytes (an empty
/// password becomes one zero block), then XORed with
/// MD5(secret + request_authenticator) for the first 16 bytes, and
/// MD5(secret + previous_ciphertext_block) for subsequent blocks.
pub fn encrypt_user_password(
    password: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PacketError> {
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(PacketError::PasswordTooLong(password.len()));
    }

    let padded_len = password.len().div_ceil(BLOCK_SIZE).max(1) * BLOCK_SIZE;
    let mut result = password.to_vec();
    result.resize(padded_len, 0);

    let mut previous: [u8; 16] = *authenticator;
    for block in result.chunks_mut(BLOCK_SIZE) {
        let hash = keystream_block(secret, &previous);
        for (byte, key) in block.iter_mut().zip(hash.iter()) {
            *byte ^= key;
        }
        previous.copy_from_slice(block);
    }

    Ok(result)
}

/// Decrypt User-Password attribute per RFC 2865 Section 5.2
///
/// Returns the padded plaintext; trailing zero bytes are left in place since
/// they cannot be told apart from padding.
pub fn decrypt_user_password(
    encrypted: &[u8],
    secret: &[u8],
    authenticator: &[u8; 16],
) -> Result<Vec<u8>, PacketError> {
    if encrypted.is_empty()
        || encrypted.len() % BLOCK_SIZE != 0
        || encrypted.len() > MAX_PASSWORD_LENGTH
    {
        return Err(PacketError::InvalidCiphertextLength(encrypted.len()));
    }

    let mut result = Vec::with_capacity(encrypted.len());
    let mut previous: &[u8] = authenticator;

    for chunk in encrypted.chunks(BLOCK_SIZE) {
        let hash = keystream_block(secret, previous);
        result.extend(chunk.iter().zip(hash.iter()).map(|(c, k)| c ^ k));
        previous = chunk;
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Attribute, AttributeType};
    use crate::packet::Code;

    fn padded(plaintext: &[u8]) -> Vec<u8> {
        let mut expected = plaintext.to_vec();
        let len = plaintext.len().div_ceil(16).max(1) * 16;
        expected.resize(len, 0);
        expected
    }

    #[test]
    fn test_generate_authenticator() {
        let mut rng = rand::rng();
        let auth1 = generate_request_authenticator(&mut rng);
        let auth2 = generate_request_authenticator(&mut rng);
        // Should be random
        assert_ne!(auth1, auth2);
    }

    #[test]
    fn test_password_encryption_decryption() {
        let secret = b"sharedsecret";
        let authenticator = [1u8; 16];

        for len in 0..=MAX_PASSWORD_LENGTH {
            let password: Vec<u8> = (0..len).map(|i| b'a' + (i % 26) as u8).collect();
            let encrypted = encrypt_user_password(&password, secret, &authenticator).unwrap();
            let decrypted = decrypt_user_password(&encrypted, secret, &authenticator).unwrap();
            assert_eq!(decrypted, padded(&password), "length {}", len);
        }
    }

    #[test]
    fn test_round_trip_with_various_secrets() {
        let authenticator = *b"0123456789abcdef";
        for secret in [&b"x"[..], &b"testing123"[..], &[0u8; 64][..], &[0xFFu8; 128][..]] {
            let encrypted = encrypt_user_password(b"hunter2", secret, &authenticator).unwrap();
            let decrypted = decrypt_user_password(&encrypted, secret, &authenticator).unwrap();
            assert_eq!(decrypted, padded(b"hunter2"));
        }
    }

    #[test]
    fn test_output_length_is_block_multiple() {
        let authenticator = [9u8; 16];
        for (len, expected) in [(0, 16), (1, 16), (15, 16), (16, 16), (17, 32), (128, 128)] {
            let password = vec![b'p'; len];
            let encrypted = encrypt_user_password(&password, b"secret", &authenticator).unwrap();
            assert_eq!(encrypted.len(), expected, "length {}", len);
        }
    }

    #[test]
    fn test_password_encryption_empty() {
        let secret = b"sharedsecret";
        let authenticator = [1u8; 16];

        let encrypted = encrypt_user_password(b"", secret, &authenticator).unwrap();
        // One all-zero block XORed with MD5(secret + authenticator)
        assert_eq!(encrypted, keystream_block(secret, &authenticator).to_vec());
    }

    #[test]
    fn test_password_too_long() {
        let password = vec![b'x'; MAX_PASSWORD_LENGTH + 1];
        let err = encrypt_user_password(&password, b"secret", &[0u8; 16]).unwrap_err();
        assert!(matches!(err, PacketError::PasswordTooLong(129)));
        assert!(err.is_validation());
    }

    #[test]
    fn test_encryption_is_deterministic() {
        let a = encrypt_user_password(b"password", b"secret", &[5u8; 16]).unwrap();
        let b = encrypt_user_password(b"password", b"secret", &[5u8; 16]).unwrap();
        let c = encrypt_user_password(b"password", b"secret", &[6u8; 16]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_second_block_chains_on_ciphertext() {
        let secret = b"secret";
        let authenticator = [2u8; 16];
        let password = [b'q'; 32];
        let encrypted = encrypt_user_password(&password, secret, &authenticator).unwrap();

        let key2 = keystream_block(secret, &encrypted[..16]);
        let block2: Vec<u8> = encrypted[16..]
            .iter()
            .zip(key2.iter())
            .map(|(c, k)| c ^ k)
            .collect();
        assert_eq!(block2, vec![b'q'; 16]);
    }

    #[test]
    fn test_decrypt_invalid_length() {
        assert!(decrypt_user_password(&[], b"s", &[0u8; 16]).is_err());
        assert!(decrypt_user_password(&[0u8; 15], b"s", &[0u8; 16]).is_err());
        assert!(decrypt_user_password(&[0u8; 144], b"s", &[0u8; 16]).is_err());
    }

    #[test]
    fn test_response_authenticator() {
        let secret = b"sharedsecret";
        let request_auth = [1u8; 16];
        let mut packet = Packet::new(Code::AccessAccept, 42, [0u8; 16]);
        packet.add_attribute(
            Attribute::string(AttributeType::ReplyMessage as u8, "welcome").unwrap(),
        );

        let bytes = packet.encode_response(&request_auth, secret).unwrap();
        assert!(verify_response_authenticator(&bytes, &request_auth, secret));
        assert!(!verify_response_authenticator(&bytes, &[2u8; 16], secret));
        assert!(!verify_response_authenticator(&bytes, &request_auth, b"wrong"));
    }

    #[test]
    fn test_response_authenticator_matches_manual_digest() {
        let secret = b"testing123";
        let request_auth = [0xABu8; 16];
        let bytes = Packet::new(Code::AccessReject, 3, [0u8; 16])
            .encode_response(&request_auth, secret)
            .unwrap();

        let mut data = vec![3, 3, 0, 20];
        data.extend_from_slice(&request_auth);
        data.extend_from_slice(secret);
        assert_eq!(&bytes[4..20], &md5::compute(&data).0);
    }

    #[test]
    fn test_verification_rejects_bit_flips() {
        let secret = b"testing123";
        let request_auth = [4u8; 16];
        let mut packet = Packet::new(Code::AccessAccept, 200, [0u8; 16]);
        packet.add_attribute(
            Attribute::string(AttributeType::ReplyMessage as u8, "hello").unwrap(),
        );
        let bytes = packet.encode_response(&request_auth, secret).unwrap();

        // Every bit of code, identifier, length and attributes
        let body_positions = (0..4).chain(20..bytes.len());
        for pos in body_positions {
            for bit in 0..8 {
                let mut mutated = bytes.clone();
                mutated[pos] ^= 1 << bit;
                assert!(
                    !verify_response_authenticator(&mutated, &request_auth, secret),
                    "flip of byte {} bit {} was accepted",
                    pos,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_verification_ignores_trailing_bytes() {
        let secret = b"testing123";
        let request_auth = [8u8; 16];
        let mut bytes = Packet::new(Code::AccessAccept, 1, [0u8; 16])
            .encode_response(&request_auth, secret)
            .unwrap();
        bytes.extend_from_slice(b"garbage past the declared length");

        assert!(verify_response_authenticator(&bytes, &request_auth, secret));
    }

    #[test]
    fn test_verification_of_malformed_response() {
        assert!(!verify_response_authenticator(&[2u8; 10], &[0u8; 16], b"s"));
    }
}
