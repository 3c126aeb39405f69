//! Build stamp used to detect a stale persistent schema.
//!
//! The stamp is the firmware build time, `YYYY-MM-DD-HH:MM:SS`, packed as six
//! BCD bytes (two-digit year, month, day, hour, minute, second).  Every build
//! gets a different stamp, so flashing new firmware always resets the
//! persistent region.  It is a version tag, not a checksum.

use thiserror::Error;

use super::layout::MAGIC_SIZE;

/// Errors from parsing a build stamp string.
#[derive(Debug, Error, PartialEq)]
pub enum MagicError {
    #[error("build stamp must look like YYYY-MM-DD-HH:MM:SS, got {0:?}")]
    Malformed(String),
}

/// Parsed build stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStamp([u8; MAGIC_SIZE]);

impl BuildStamp {
    /// Byte positions of the two-digit groups in `YYYY-MM-DD-HH:MM:SS`.
    const DIGIT_PAIRS: [usize; MAGIC_SIZE] = [2, 5, 8, 11, 14, 17];
    const SEPARATORS: [(usize, u8); 5] = [(4, b'-'), (7, b'-'), (10, b'-'), (13, b':'), (16, b':')];
    const LEN: usize = 19;

    /// Parses a `YYYY-MM-DD-HH:MM:SS` build time.
    ///
    /// # Errors
    ///
    /// Returns [`MagicError::Malformed`] if the string has the wrong length,
    /// separators, or non-digit characters.
    pub fn parse(stamp: &str) -> Result<Self, MagicError> {
        let bytes = stamp.as_bytes();
        let malformed = || MagicError::Malformed(stamp.to_string());

        if bytes.len() != Self::LEN {
            return Err(malformed());
        }
        if Self::SEPARATORS.iter().any(|&(i, sep)| bytes[i] != sep) {
            return Err(malformed());
        }
        let digits_ok = bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| !Self::SEPARATORS.iter().any(|&(s, _)| s == *i))
            .all(|(_, b)| b.is_ascii_digit());
        if !digits_ok {
            return Err(malformed());
        }

        let mut magic = [0u8; MAGIC_SIZE];
        for (out, &pos) in magic.iter_mut().zip(Self::DIGIT_PAIRS.iter()) {
            *out = ((bytes[pos] - b'0') << 4) | (bytes[pos + 1] - b'0');
        }
        Ok(Self(magic))
    }

    /// The six BCD bytes written to the magic table.
    pub fn bytes(&self) -> [u8; MAGIC_SIZE] {
        self.0
    }
}

impl std::fmt::Display for BuildStamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.0;
        write!(
            f,
            "20{:02x}-{:02x}-{:02x}-{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_packs_bcd_digits() {
        let stamp = BuildStamp::parse("2019-11-05-11:29:54").unwrap();
        assert_eq!(stamp.bytes(), [0x19, 0x11, 0x05, 0x11, 0x29, 0x54]);
    }

    #[test]
    fn test_display_round_trips() {
        let stamp = BuildStamp::parse("2025-01-31-23:59:01").unwrap();
        assert_eq!(stamp.to_string(), "2025-01-31-23:59:01");
    }

    #[test]
    fn test_parse_rejects_wrong_separator() {
        assert!(BuildStamp::parse("2019-11-05 11:29:54").is_err());
    }

    #[test]
    fn test_parse_rejects_non_digits_and_bad_length() {
        assert!(BuildStamp::parse("2019-1a-05-11:29:54").is_err());
        assert!(BuildStamp::parse("2019-11-05").is_err());
    }
}
