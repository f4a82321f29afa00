//! RADIUS packet header and body codec

mod code;
#[allow(clippy::module_inception)]
mod packet;
mod response;

pub use code::Code;
pub use packet::{Packet, PacketError};
pub use response::Response;
