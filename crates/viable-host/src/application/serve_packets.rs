//! The packet loop.
//!
//! Each input line is one packet in hex (whitespace between bytes allowed).
//! Lines shorter than the packet size are zero-padded, longer ones are cut,
//! the same framing a raw-HID endpoint imposes.  Each reply is written as one
//! hex line.  Blank lines and lines starting with `#` are skipped.
//!
//! After every packet the loop gives the leader engine a chance to time out,
//! the periodic task a firmware main loop would run.

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, warn};
use viable_core::{Clock, KeyActions, PacketRouter, Storage};

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("I/O error in packet loop: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum LineError {
    #[error("invalid hex packet: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Counters reported when the loop ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ServeStats {
    pub packets: usize,
    pub replies: usize,
    pub rejected: usize,
}

/// Parses one input line into a packet of exactly `packet_size` bytes.
///
/// Returns `Ok(None)` for blank and comment lines.
///
/// # Errors
///
/// [`LineError::Hex`] when the line is not valid hex.
pub fn parse_line(line: &str, packet_size: usize) -> Result<Option<Vec<u8>>, LineError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let digits: String = line.split_whitespace().collect();
    let mut packet = hex::decode(digits)?;
    packet.resize(packet_size, 0);
    Ok(Some(packet))
}

/// Runs the loop until `input` reaches end of file.
///
/// Malformed lines are logged and counted, never fatal.
///
/// # Errors
///
/// [`ServeError::Io`] when reading input or writing a reply fails.
pub async fn serve<S, C, R, W>(
    router: &mut PacketRouter<S, C>,
    actions: &mut dyn KeyActions,
    input: R,
    mut output: W,
    packet_size: usize,
) -> Result<ServeStats, ServeError>
where
    S: Storage,
    C: Clock,
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut stats = ServeStats::default();

    while let Some(line) = lines.next_line().await? {
        let packet = match parse_line(&line, packet_size) {
            Ok(Some(packet)) => packet,
            Ok(None) => continue,
            Err(e) => {
                warn!("skipping line: {e}");
                stats.rejected += 1;
                continue;
            }
        };
        stats.packets += 1;

        if let Some(reply) = router.handle(&packet) {
            stats.replies += 1;
            let mut text = hex::encode(&reply);
            text.push('\n');
            output.write_all(text.as_bytes()).await?;
            output.flush().await?;
        } else {
            debug!(first = packet[0], "no reply");
        }

        let now = router.clock().now_ms();
        router
            .viable_mut()
            .engines_mut()
            .leader
            .tick(now, actions);
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::legacy::ViaLegacy;
    use crate::infrastructure::sinks::TracingActions;
    use viable_core::{Layout, ManualClock, MemoryStorage, Viable, ViableConfig};

    fn router(clock: &ManualClock) -> PacketRouter<MemoryStorage, &ManualClock> {
        let config = ViableConfig::default();
        let size = Layout::new(config.capacities).total_size();
        let mut viable = Viable::new(MemoryStorage::new(size), config).unwrap();
        viable.init().unwrap();
        PacketRouter::new(viable, ViaLegacy, clock)
    }

    #[test]
    fn test_parse_line_pads_and_accepts_spaces() {
        let packet = parse_line("df 00", 32).unwrap().unwrap();
        assert_eq!(packet.len(), 32);
        assert_eq!(&packet[..2], &[0xDF, 0x00]);
        assert!(packet[2..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_parse_line_truncates_long_packets() {
        let line = "ab".repeat(40);
        assert_eq!(parse_line(&line, 32).unwrap().unwrap().len(), 32);
    }

    #[test]
    fn test_parse_line_skips_blank_and_comments() {
        assert_eq!(parse_line("   ", 32), Ok(None));
        assert_eq!(parse_line("# get info", 32), Ok(None));
    }

    #[test]
    fn test_parse_line_rejects_bad_hex() {
        assert!(matches!(parse_line("zz", 32), Err(LineError::Hex(_))));
    }

    #[tokio::test]
    async fn test_serve_answers_each_packet_on_its_own_line() {
        // Arrange
        let clock = ManualClock::new(0);
        let mut router = router(&clock);
        let mut actions = TracingActions::default();
        let input = tokio_test::io::Builder::new()
            .read(b"df00\n# comment\n01\nnot-hex\n")
            .build();
        let mut output = Vec::new();

        // Act
        let stats = serve(&mut router, &mut actions, input, &mut output, 32)
            .await
            .unwrap();

        // Assert
        assert_eq!(
            stats,
            ServeStats {
                packets: 2,
                replies: 2,
                rejected: 1
            }
        );
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("df0001000000"));
        assert!(lines[1].starts_with("01000c"));
        assert_eq!(lines[1].len(), 64);
    }
}
