/// RADIUS Attribute Types carried by the PAP exchange (RFC 2865 Section 5)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AttributeType {
    /// User-Name (1) - RFC 2865
    UserName = 1,
    /// User-Password (2) - RFC 2865
    UserPassword = 2,
    /// Reply-Message (18) - RFC 2865
    ReplyMessage = 18,
    /// NAS-Identifier (32) - RFC 2865
    NasIdentifier = 32,
}

impl AttributeType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(AttributeType::UserName),
            2 => Some(AttributeType::UserPassword),
            18 => Some(AttributeType::ReplyMessage),
            32 => Some(AttributeType::NasIdentifier),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}
