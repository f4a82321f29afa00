use super::packet::declared_length;
use super::{Code, Packet, PacketError};

/// Borrowed view of a reply to an Access-Request.
///
/// Only the header is interpreted. The attribute region is exposed as raw
/// bytes and is never parsed, since PAP needs nothing beyond the code and the
/// Response Authenticator. Every accessor is limited to the length declared in
/// the header, regardless of how many bytes the receive buffer holds.
#[derive(Debug, Clone, Copy)]
pub struct Response<'a> {
    bytes: &'a [u8],
}

impl<'a> Response<'a> {
    /// Decode a response, ignoring any bytes past the declared length
    pub fn decode(data: &'a [u8]) -> Result<Self, PacketError> {
        let length = declared_length(data)?;
        Ok(Response {
            bytes: &data[..length],
        })
    }

    /// Raw code octet
    pub fn raw_code(&self) -> u8 {
        self.bytes[0]
    }

    /// Packet code, `None` for codes this crate does not model
    pub fn code(&self) -> Option<Code> {
        Code::from_u8(self.raw_code())
    }

    pub fn identifier(&self) -> u8 {
        self.bytes[1]
    }

    /// Declared packet length
    pub fn length(&self) -> usize {
        self.bytes.len()
    }

    /// Response Authenticator carried in bytes 4..20
    pub fn authenticator(&self) -> &'a [u8] {
        &self.bytes[4..Packet::MIN_PACKET_SIZE]
    }

    /// Undecoded attribute region
    pub fn attributes(&self) -> &'a [u8] {
        &self.bytes[Packet::MIN_PACKET_SIZE..]
    }

    /// The packet bytes, truncated to the declared length
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}
