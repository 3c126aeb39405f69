//! Client wrapper: several logical clients sharing one transport.
//!
//! Wire format (6-byte header):
//! ```text
//! [0xDD][client_id:4 LE][protocol][payload...]
//! ```
//! - `client_id == 0` is a bootstrap: bytes 5..25 are a nonce echoed back,
//!   followed by the new id (25..29) and the TTL in seconds (29..31).
//! - protocol `0xDF`: a Viable command; its reply replaces the payload in
//!   place and the header is kept.
//! - protocol `0xFE`: a legacy command; the payload after the header goes to
//!   the legacy handler and its reply is re-wrapped with
//!   [`ClientWrapper::wrap_reply`].
//!
//! Errors zero the buffer and reply `[0xDD][client_id][0xFF][code]`.

use thiserror::Error;
use tracing::{debug, warn};

use super::commands::VIABLE_PREFIX;
use super::session::{ClientId, SessionAllocator};

/// First byte of a wrapped packet.
pub const WRAPPER_PREFIX: u8 = 0xDD;

/// Protocol byte for tunneled legacy commands.
pub const LEGACY_PROTOCOL: u8 = 0xFE;

/// Protocol byte of an error reply.
pub const ERROR_PROTOCOL: u8 = 0xFF;

/// Size of the wrapper header, protocol byte included.
pub const HEADER_SIZE: usize = 6;

const NONCE_SIZE: usize = 20;
const NONCE_START: usize = 5;
const NEW_ID_START: usize = NONCE_START + NONCE_SIZE;
const TTL_START: usize = NEW_ID_START + 4;
const BOOTSTRAP_REPLY_LEN: usize = TTL_START + 2;

/// Error codes sent in byte 6 of an error reply.
pub mod error_code {
    pub const INVALID_ID: u8 = 0x01;
    /// Reserved; allocation never runs out of ids.
    pub const NO_IDS: u8 = 0x02;
    pub const UNKNOWN_PROTOCOL: u8 = 0x03;
}

#[derive(Debug, Error, PartialEq)]
pub enum WrapperError {
    #[error("client id {0} is invalid or expired")]
    InvalidId(ClientId),

    #[error("unknown wrapped protocol 0x{0:02X}")]
    UnknownProtocol(u8),

    #[error("wrapped packet too short: need {needed} bytes, got {available}")]
    TooShort { needed: usize, available: usize },
}

impl WrapperError {
    /// The code written into an error reply, if this error produces one.
    pub fn code(&self) -> Option<u8> {
        match self {
            WrapperError::InvalidId(_) => Some(error_code::INVALID_ID),
            WrapperError::UnknownProtocol(_) => Some(error_code::UNKNOWN_PROTOCOL),
            WrapperError::TooShort { .. } => None,
        }
    }
}

/// What the caller must do with a wrapped packet after [`ClientWrapper::receive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inbound {
    /// The buffer already holds the reply (bootstrap).
    Reply,
    /// Dispatch `buffer[5..]` as a Viable command; the header stays.
    Viable { client: ClientId },
    /// Hand `buffer[6..]` to the legacy handler and re-wrap its reply.
    Legacy { client: ClientId, protocol: u8 },
}

#[derive(Debug, Clone, Default)]
pub struct ClientWrapper {
    sessions: SessionAllocator,
}

impl ClientWrapper {
    pub fn new(sessions: SessionAllocator) -> Self {
        Self { sessions }
    }

    pub fn sessions(&self) -> &SessionAllocator {
        &self.sessions
    }

    /// Classifies a packet starting with [`WRAPPER_PREFIX`].
    ///
    /// # Errors
    ///
    /// [`WrapperError::InvalidId`] and [`WrapperError::UnknownProtocol`]
    /// leave an error reply in `data`.  [`WrapperError::TooShort`] leaves
    /// `data` untouched and has no reply.
    pub fn receive(&mut self, data: &mut [u8], now_ms: u32) -> Result<Inbound, WrapperError> {
        need(data, HEADER_SIZE)?;
        let client = ClientId::from_le_bytes([data[1], data[2], data[3], data[4]]);

        if client == ClientId::BOOTSTRAP {
            need(data, BOOTSTRAP_REPLY_LEN)?;
            let id = self.sessions.allocate(now_ms);
            data[NEW_ID_START..TTL_START].copy_from_slice(&id.to_le_bytes());
            data[TTL_START..BOOTSTRAP_REPLY_LEN]
                .copy_from_slice(&self.sessions.ttl_secs().to_le_bytes());
            return Ok(Inbound::Reply);
        }

        if !self.sessions.is_valid(client, now_ms) {
            warn!(%client, "rejected wrapped packet from invalid client");
            return Err(write_error(data, WrapperError::InvalidId(client), client));
        }

        match data[5] {
            VIABLE_PREFIX => Ok(Inbound::Viable { client }),
            LEGACY_PROTOCOL => Ok(Inbound::Legacy {
                client,
                protocol: LEGACY_PROTOCOL,
            }),
            other => {
                warn!(%client, protocol = other, "unknown wrapped protocol");
                Err(write_error(data, WrapperError::UnknownProtocol(other), client))
            }
        }
    }

    /// Wraps a legacy `reply` into a `len`-byte packet.
    ///
    /// The header takes six bytes, so the last six bytes of a full-size
    /// reply do not fit and are dropped.
    pub fn wrap_reply(client: ClientId, protocol: u8, reply: &[u8], len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len.max(HEADER_SIZE)];
        out[0] = WRAPPER_PREFIX;
        out[1..5].copy_from_slice(&client.to_le_bytes());
        out[5] = protocol;
        let n = reply.len().min(out.len() - HEADER_SIZE);
        out[HEADER_SIZE..HEADER_SIZE + n].copy_from_slice(&reply[..n]);
        debug!(%client, bytes = n, "wrapped legacy reply");
        out
    }
}

fn need(data: &[u8], needed: usize) -> Result<(), WrapperError> {
    if data.len() < needed {
        return Err(WrapperError::TooShort {
            needed,
            available: data.len(),
        });
    }
    Ok(())
}

fn write_error(data: &mut [u8], err: WrapperError, client: ClientId) -> WrapperError {
    data.fill(0);
    data[0] = WRAPPER_PREFIX;
    data[1..5].copy_from_slice(&client.to_le_bytes());
    data[5] = ERROR_PROTOCOL;
    if let (Some(code), Some(slot)) = (err.code(), data.get_mut(6)) {
        *slot = code;
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: u32 = 0x1_0000;

    fn wrapper() -> ClientWrapper {
        ClientWrapper::new(SessionAllocator::new(0x10, 120))
    }

    fn wrapped(client: ClientId, protocol: u8, payload: &[u8]) -> [u8; 32] {
        let mut p = [0u8; 32];
        p[0] = WRAPPER_PREFIX;
        p[1..5].copy_from_slice(&client.to_le_bytes());
        p[5] = protocol;
        p[6..6 + payload.len()].copy_from_slice(payload);
        p
    }

    #[test]
    fn test_bootstrap_echoes_nonce_and_returns_id_and_ttl() {
        let mut w = wrapper();
        let mut p = [0u8; 32];
        p[0] = WRAPPER_PREFIX;
        for (i, b) in p[5..25].iter_mut().enumerate() {
            *b = 0xA0 + i as u8;
        }
        let nonce = p[5..25].to_vec();

        let inbound = w.receive(&mut p, 4 * TICK + 3).unwrap();

        assert_eq!(inbound, Inbound::Reply);
        assert_eq!(&p[5..25], &nonce[..]);
        assert_eq!(&p[25..29], &(4 * TICK | 0x10).to_le_bytes());
        assert_eq!(&p[29..31], &120u16.to_le_bytes());
    }

    #[test]
    fn test_expired_id_gets_error_reply() {
        let mut w = wrapper();
        let client = ClientId(TICK | 5);
        let mut p = wrapped(client, VIABLE_PREFIX, &[0x00, 0x77]);

        let err = w.receive(&mut p, 3 * TICK).unwrap_err();

        assert_eq!(err, WrapperError::InvalidId(client));
        assert_eq!(p[0], WRAPPER_PREFIX);
        assert_eq!(&p[1..5], &client.to_le_bytes());
        assert_eq!(&p[5..7], &[ERROR_PROTOCOL, error_code::INVALID_ID]);
        assert!(p[7..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reserved_error_id_is_rejected() {
        let mut w = wrapper();
        let mut p = wrapped(ClientId::ERROR, VIABLE_PREFIX, &[]);

        assert!(w.receive(&mut p, 0).is_err());
        assert_eq!(p[6], error_code::INVALID_ID);
    }

    #[test]
    fn test_unknown_protocol() {
        let mut w = wrapper();
        let client = ClientId(TICK | 1);
        let mut p = wrapped(client, 0x42, &[]);

        let err = w.receive(&mut p, TICK).unwrap_err();

        assert_eq!(err, WrapperError::UnknownProtocol(0x42));
        assert_eq!(p[6], error_code::UNKNOWN_PROTOCOL);
    }

    #[test]
    fn test_protocol_selection() {
        let mut w = wrapper();
        let client = ClientId(TICK | 1);

        let mut viable = wrapped(client, VIABLE_PREFIX, &[]);
        let mut legacy = wrapped(client, LEGACY_PROTOCOL, &[]);

        assert_eq!(w.receive(&mut viable, TICK), Ok(Inbound::Viable { client }));
        assert_eq!(
            w.receive(&mut legacy, TICK),
            Ok(Inbound::Legacy {
                client,
                protocol: LEGACY_PROTOCOL
            })
        );
    }

    #[test]
    fn test_wrap_reply_truncates_to_packet() {
        let reply: Vec<u8> = (1..=32).collect();

        let out = ClientWrapper::wrap_reply(ClientId(0x0102_0304), LEGACY_PROTOCOL, &reply, 32);

        assert_eq!(out.len(), 32);
        assert_eq!(&out[..6], &[0xDD, 0x04, 0x03, 0x02, 0x01, 0xFE]);
        assert_eq!(&out[6..], &reply[..26]);
    }

    #[test]
    fn test_short_bootstrap_is_dropped() {
        let mut w = wrapper();
        let mut p = [WRAPPER_PREFIX, 0, 0, 0, 0, 0, 0];

        let err = w.receive(&mut p, 0).unwrap_err();

        assert_eq!(err.code(), None);
        assert_eq!(p, [WRAPPER_PREFIX, 0, 0, 0, 0, 0, 0]);
    }
}
