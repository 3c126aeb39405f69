//! Top-level packet routing.
//!
//! Every packet from the transport lands here and is routed by its first
//! byte:
//!
//! | first byte | route |
//! |------------|-------|
//! | `0xDD` | client wrapper, then Viable or legacy |
//! | `0xDF` | Viable dispatcher directly; the mutated packet is the reply |
//! | other  | legacy protocol handler, unwrapped |
//!
//! The legacy handler is a plain request → reply function.  When its request
//! came through the wrapper, the router re-wraps the reply on the way out;
//! the handler never knows it was wrapped.

use tracing::{debug, warn};

use super::commands::{COMMAND_ERROR, VIABLE_PREFIX};
use super::dispatch::{dispatch, DispatchError};
use super::session::SessionAllocator;
use super::wrapper::{ClientWrapper, Inbound, HEADER_SIZE, WRAPPER_PREFIX};
use crate::clock::Clock;
use crate::device::Viable;
use crate::storage::Storage;

/// The configuration protocol the device spoke before Viable (VIA).
///
/// Receives the request with any wrapper header already stripped and returns
/// the reply to send, or `None` to send nothing.
#[cfg_attr(test, mockall::automock)]
pub trait LegacyProtocol {
    fn process(&mut self, request: &[u8]) -> Option<Vec<u8>>;
}

/// Legacy handler that answers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLegacy;

impl LegacyProtocol for NoLegacy {
    fn process(&mut self, _request: &[u8]) -> Option<Vec<u8>> {
        None
    }
}

/// Owns the device and routes packets to it.
pub struct PacketRouter<S, C> {
    viable: Viable<S>,
    wrapper: ClientWrapper,
    legacy: Box<dyn LegacyProtocol>,
    clock: C,
}

impl<S: Storage, C: Clock> PacketRouter<S, C> {
    /// Seeds the session counter from `clock` and takes the TTL from the
    /// device configuration.
    pub fn new(viable: Viable<S>, legacy: impl LegacyProtocol + 'static, clock: C) -> Self {
        let sessions = SessionAllocator::new(clock.now_ms(), viable.config().session_ttl_secs);
        Self {
            viable,
            wrapper: ClientWrapper::new(sessions),
            legacy: Box::new(legacy),
            clock,
        }
    }

    pub fn viable(&self) -> &Viable<S> {
        &self.viable
    }

    pub fn viable_mut(&mut self) -> &mut Viable<S> {
        &mut self.viable
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_viable(self) -> Viable<S> {
        self.viable
    }

    /// Handles one packet and returns the reply to transmit, if any.
    pub fn handle(&mut self, packet: &[u8]) -> Option<Vec<u8>> {
        let first = *packet.first()?;
        let mut buf = packet.to_vec();

        match first {
            WRAPPER_PREFIX => self.handle_wrapped(buf),
            VIABLE_PREFIX => {
                self.dispatch_viable(&mut buf);
                Some(buf)
            }
            _ => {
                debug!(first, "routing to legacy protocol");
                self.legacy.process(&buf)
            }
        }
    }

    fn handle_wrapped(&mut self, mut buf: Vec<u8>) -> Option<Vec<u8>> {
        let now = self.clock.now_ms();
        match self.wrapper.receive(&mut buf, now) {
            Ok(Inbound::Reply) => Some(buf),
            Ok(Inbound::Viable { .. }) => {
                self.dispatch_viable(&mut buf[5..]);
                Some(buf)
            }
            Ok(Inbound::Legacy { client, protocol }) => {
                let reply = self.legacy.process(&buf[HEADER_SIZE..])?;
                Some(ClientWrapper::wrap_reply(client, protocol, &reply, buf.len()))
            }
            Err(err) => err.code().map(|_| buf),
        }
    }

    /// Runs the dispatcher on `data` (starting at the `0xDF` byte).  A packet
    /// too short for its command gets the error sentinel at byte 1, the same
    /// reply an unknown command produces.
    fn dispatch_viable(&mut self, data: &mut [u8]) {
        match dispatch(&mut self.viable, data) {
            Ok(()) => {}
            Err(DispatchError::UnknownCommand(command)) => {
                debug!(command, "unknown Viable command");
            }
            Err(err @ DispatchError::TooShort { .. }) => {
                warn!(%err, "rejecting short Viable packet");
                if let Some(command) = data.get_mut(1) {
                    *command = COMMAND_ERROR;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::ViableConfig;
    use crate::protocol::session::ClientId;
    use crate::protocol::wrapper::LEGACY_PROTOCOL;
    use crate::storage::{Layout, MemoryStorage};

    const TICK: u32 = 0x1_0000;

    fn router<'a>(
        legacy: MockLegacyProtocol,
        clock: &'a ManualClock,
    ) -> PacketRouter<MemoryStorage, &'a ManualClock> {
        let config = ViableConfig::default();
        let size = Layout::new(config.capacities).total_size();
        let mut viable = Viable::new(MemoryStorage::new(size), config).unwrap();
        viable.init().unwrap();
        PacketRouter::new(viable, legacy, clock)
    }

    fn bootstrap(router: &mut PacketRouter<MemoryStorage, &ManualClock>) -> ClientId {
        let mut p = vec![0u8; 32];
        p[0] = WRAPPER_PREFIX;
        let reply = router.handle(&p).unwrap();
        ClientId::from_le_bytes([reply[25], reply[26], reply[27], reply[28]])
    }

    #[test]
    fn test_unwrapped_legacy_packet_goes_straight_to_handler() {
        let clock = ManualClock::new(0);
        let mut legacy = MockLegacyProtocol::new();
        legacy
            .expect_process()
            .withf(|req: &[u8]| req == [0x01, 0x02])
            .times(1)
            .returning(|req| Some(req.iter().map(|b| b + 1).collect()));
        let mut router = router(legacy, &clock);

        let reply = router.handle(&[0x01, 0x02]);

        assert_eq!(reply, Some(vec![0x02, 0x03]));
    }

    #[test]
    fn test_wrapped_legacy_reply_is_rewrapped() {
        let clock = ManualClock::new(5 * TICK);
        let mut legacy = MockLegacyProtocol::new();
        legacy
            .expect_process()
            .withf(|req: &[u8]| req.len() == 26 && req[0] == 0x01)
            .times(1)
            .returning(|req| Some(req.to_vec()));
        let mut router = router(legacy, &clock);
        let client = bootstrap(&mut router);

        let mut p = vec![0u8; 32];
        p[0] = WRAPPER_PREFIX;
        p[1..5].copy_from_slice(&client.to_le_bytes());
        p[5] = LEGACY_PROTOCOL;
        p[6] = 0x01;
        let reply = router.handle(&p).unwrap();

        assert_eq!(reply.len(), 32);
        assert_eq!(&reply[..6], &p[..6]);
        assert_eq!(reply[6], 0x01);
    }

    #[test]
    fn test_wrapped_viable_keeps_header() {
        let clock = ManualClock::new(TICK);
        let mut router = router(MockLegacyProtocol::new(), &clock);
        let client = bootstrap(&mut router);

        let mut p = vec![0u8; 32];
        p[0] = WRAPPER_PREFIX;
        p[1..5].copy_from_slice(&client.to_le_bytes());
        p[5] = VIABLE_PREFIX;
        p[6] = 0x00;
        let reply = router.handle(&p).unwrap();

        assert_eq!(&reply[..7], &p[..7]);
        assert_eq!(&reply[7..11], &1u32.to_le_bytes());
    }

    #[test]
    fn test_session_expires_with_clock() {
        let clock = ManualClock::new(TICK);
        let mut router = router(MockLegacyProtocol::new(), &clock);
        let client = bootstrap(&mut router);
        clock.advance(2 * TICK);

        let mut p = vec![0u8; 32];
        p[0] = WRAPPER_PREFIX;
        p[1..5].copy_from_slice(&client.to_le_bytes());
        p[5] = VIABLE_PREFIX;
        let reply = router.handle(&p).unwrap();

        assert_eq!(&reply[5..7], &[0xFF, 0x01]);
    }

    #[test]
    fn test_short_viable_packet_gets_error_sentinel() {
        let clock = ManualClock::new(0);
        let mut router = router(MockLegacyProtocol::new(), &clock);

        let reply = router.handle(&[VIABLE_PREFIX, 0x0E]);

        assert_eq!(reply, Some(vec![VIABLE_PREFIX, COMMAND_ERROR]));
    }

    #[test]
    fn test_short_wrapped_viable_packet_gets_error_sentinel() {
        let clock = ManualClock::new(TICK);
        let mut router = router(MockLegacyProtocol::new(), &clock);
        let client = bootstrap(&mut router);

        let mut p = vec![0u8; 8];
        p[0] = WRAPPER_PREFIX;
        p[1..5].copy_from_slice(&client.to_le_bytes());
        p[5] = VIABLE_PREFIX;
        p[6] = 0x01;
        let reply = router.handle(&p).unwrap();

        assert_eq!(&reply[..6], &p[..6]);
        assert_eq!(reply[6], COMMAND_ERROR);
        assert_eq!(reply[7], 0);
    }

    #[test]
    fn test_empty_packet_has_no_reply() {
        let clock = ManualClock::new(0);
        let mut router = router(MockLegacyProtocol::new(), &clock);
        assert_eq!(router.handle(&[]), None);
    }
}
