//! Wire protocols: the Viable command set, the client wrapper, and the packet
//! router that sits in front of both.

pub mod commands;
pub mod dispatch;
pub mod router;
pub mod session;
pub mod wrapper;

pub use commands::{CommandId, COMMAND_ERROR, PROTOCOL_VERSION, VIABLE_PREFIX};
pub use dispatch::{dispatch, DispatchError};
pub use router::{LegacyProtocol, NoLegacy, PacketRouter};
pub use session::{ClientId, SessionAllocator};
pub use wrapper::{ClientWrapper, Inbound, WrapperError, LEGACY_PROTOCOL, WRAPPER_PREFIX};
