use super::Code;
use crate::attributes::{Attribute, AttributeType};
use crate::auth::calculate_response_authenticator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PacketError {
    #[error("Invalid packet length: {0}")]
    InvalidLength(usize),
    #[error("Truncated packet: header declares {declared} bytes, only {received} received")]
    Truncated { declared: usize, received: usize },
    #[error("Invalid packet code: {0}")]
    InvalidCode(u8),
    #[error("Attribute {attr_type} value too long: {len} bytes (max 253)")]
    AttributeTooLong { attr_type: u8, len: usize },
    #[error("Malformed attribute: {0}")]
    MalformedAttribute(String),
    #[error("Password exceeds maximum of 128 bytes: {0} bytes")]
    PasswordTooLong(usize),
    #[error("Invalid encrypted password length: {0}")]
    InvalidCiphertextLength(usize),
    #[error("Packet too large: {0} bytes")]
    PacketTooLarge(usize),
}

impl PacketError {
    /// True for errors caused by caller input exceeding protocol size limits
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PacketError::AttributeTooLong { .. } | PacketError::PasswordTooLong(_)
        )
    }
}

/// RADIUS Packet structure as defined in RFC 2865 Section 3
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     Code      |  Identifier   |            Length             |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// |                         Authenticator                         |
/// |                                                               |
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  Attributes ...
/// +-+-+-+-+-+-+-+-+-+-+-+-+-
/// ```
#[derive(Debug, Clone)]
pub struct Packet {
    /// Packet type (1 byte)
    pub code: Code,
    /// Packet identifier for matching requests/responses (1 byte)
    pub identifier: u8,
    /// Request or Response Authenticator (16 bytes)
    pub authenticator: [u8; 16],
    /// List of attributes, in wire order
    pub attributes: Vec<Attribute>,
}

impl Packet {
    /// Header size (20 bytes: 1 code + 1 id + 2 length + 16 authenticator)
    pub const MIN_PACKET_SIZE: usize = 20;
    /// Maximum RADIUS packet size (4096 bytes as per RFC 2865)
    pub const MAX_PACKET_SIZE: usize = 4096;

    pub fn new(code: Code, identifier: u8, authenticator: [u8; 16]) -> Self {
        Packet {
            code,
            identifier,
            authenticator,
            attributes: Vec::new(),
        }
    }

    /// Build a PAP Access-Request.
    ///
    /// Attributes are laid out as User-Name, User-Password and, only when
    /// `nas_identifier` is a non-empty string, NAS-Identifier.
    pub fn access_request(
        identifier: u8,
        authenticator: [u8; 16],
        username: &str,
        encrypted_password: Vec<u8>,
        nas_identifier: Option<&str>,
    ) -> Result<Self, PacketError> {
        let mut packet = Packet::new(Code::AccessRequest, identifier, authenticator);

        packet.add_attribute(Attribute::string(AttributeType::UserName as u8, username)?);
        packet.add_attribute(Attribute::new(
            AttributeType::UserPassword as u8,
            encrypted_password,
        )?);

        if let Some(nas_id) = nas_identifier.filter(|id| !id.is_empty()) {
            packet.add_attribute(Attribute::string(
                AttributeType::NasIdentifier as u8,
                nas_id,
            )?);
        }

        Ok(packet)
    }

    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> Result<Vec<u8>, PacketError> {
        let total_length = self.length();
        if total_length > Self::MAX_PACKET_SIZE {
            return Err(PacketError::PacketTooLarge(total_length));
        }

        let mut buffer = Vec::with_capacity(total_length);
        buffer.push(self.code.as_u8());
        buffer.push(self.identifier);
        buffer.extend_from_slice(&(total_length as u16).to_be_bytes());
        buffer.extend_from_slice(&self.authenticator);

        for attr in &self.attributes {
            attr.encode_into(&mut buffer)?;
        }

        Ok(buffer)
    }

    /// Encode a response packet, replacing the authenticator field with the
    /// Response Authenticator computed over the encoded bytes.
    pub fn encode_response(
        &self,
        request_authenticator: &[u8; 16],
        secret: &[u8],
    ) -> Result<Vec<u8>, PacketError> {
        let mut buffer = self.encode()?;
        let response_auth =
            calculate_response_authenticator(&buffer, request_authenticator, secret)?;
        buffer[4..Self::MIN_PACKET_SIZE].copy_from_slice(&response_auth);
        Ok(buffer)
    }

    /// Decode packet from bytes
    ///
    /// Bytes beyond the length declared in the header are ignored.
    pub fn decode(data: &[u8]) -> Result<Self, PacketError> {
        let length = declared_length(data)?;

        let code = Code::from_u8(data[0]).ok_or(PacketError::InvalidCode(data[0]))?;
        let identifier = data[1];
        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..Self::MIN_PACKET_SIZE]);

        let mut attributes = Vec::new();
        let mut attr_data = &data[Self::MIN_PACKET_SIZE..length];

        while !attr_data.is_empty() {
            let attr = Attribute::decode(attr_data)?;
            let attr_len = attr.encoded_length();
            attributes.push(attr);
            attr_data = &attr_data[attr_len..];
        }

        Ok(Packet {
            code,
            identifier,
            authenticator,
            attributes,
        })
    }

    /// Get the length of the encoded packet
    pub fn length(&self) -> usize {
        Self::MIN_PACKET_SIZE
            + self
                .attributes
                .iter()
                .map(Attribute::encoded_length)
                .sum::<usize>()
    }

    /// Find first attribute by type
    pub fn find_attribute(&self, attr_type: u8) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.attr_type == attr_type)
    }
}

/// Validate the header of `data` and return the declared packet length.
pub(crate) fn declared_length(data: &[u8]) -> Result<usize, PacketError> {
    if data.len() < Packet::MIN_PACKET_SIZE {
        return Err(PacketError::InvalidLength(data.len()));
    }

    let length = u16::from_be_bytes([data[2], data[3]]) as usize;

    if !(Packet::MIN_PACKET_SIZE..=Packet::MAX_PACKET_SIZE).contains(&length) {
        return Err(PacketError::InvalidLength(length));
    }

    if data.len() < length {
        return Err(PacketError::Truncated {
            declared: length,
            received: data.len(),
        });
    }

    Ok(length)
}
