//! Compressed keyboard definition, served to clients in fixed-size chunks.
//!
//! The blob is produced at build time and is opaque here: the client asks for
//! its total size, then pulls it one chunk at a time by offset.  There is no
//! acknowledgment or retry beyond the client asking for the same offset again.

/// Bytes returned per chunk request.
pub const DEFINITION_CHUNK_SIZE: usize = 28;

/// The definition blob.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardDefinition {
    data: Vec<u8>,
}

impl KeyboardDefinition {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Total size in bytes.
    pub fn size(&self) -> u32 {
        u32::try_from(self.data.len()).unwrap_or(u32::MAX)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Copies up to [`DEFINITION_CHUNK_SIZE`] bytes starting at `offset` into
    /// the front of `out` and returns how many were copied.
    ///
    /// Everything in `out` past the copied bytes is zeroed, so a short final
    /// chunk or an offset past the end leaves no stale request bytes behind.
    pub fn chunk(&self, offset: u16, out: &mut [u8]) -> usize {
        out.fill(0);
        let offset = usize::from(offset);
        if offset >= self.data.len() {
            return 0;
        }
        let n = (self.data.len() - offset)
            .min(DEFINITION_CHUNK_SIZE)
            .min(out.len());
        out[..n].copy_from_slice(&self.data[offset..offset + n]);
        n
    }
}

impl From<Vec<u8>> for KeyboardDefinition {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}
