//! Fixed-size `(global id, color)` records exchanged between ranks.
//!
//! Records are little-endian and unaligned, so a receive buffer can be
//! decoded in place regardless of where the allocator put it.

use zerocopy::byteorder::{LittleEndian, U32, U64};
use zerocopy::{AsBytes, FromBytes, FromZeroes};

use crate::error::{ColoringError, Result};
use crate::{Color, GlobalId};

/// One ghost update: the owner's current color for `gid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsBytes, FromBytes, FromZeroes)]
#[repr(C)]
pub struct ColorUpdate {
    gid: U64<LittleEndian>,
    color: U32<LittleEndian>,
}

impl ColorUpdate {
    /// Encoded size in bytes.
    pub const SIZE: usize = core::mem::size_of::<Self>();

    /// Creates an update record.
    pub fn new(gid: GlobalId, color: Color) -> Self {
        Self {
            gid: U64::new(gid),
            color: U32::new(color),
        }
    }

    /// Global id of the updated vertex.
    #[inline]
    pub fn gid(&self) -> GlobalId {
        self.gid.get()
    }

    /// New color.
    #[inline]
    pub fn color(&self) -> Color {
        self.color.get()
    }

    /// Appends the encoded record to `out`.
    #[inline]
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }

    /// Decodes a buffer of back-to-back records.
    ///
    /// # Errors
    /// Returns [`ColoringError::MalformedMessage`] if the length is not a multiple
    /// of [`ColorUpdate::SIZE`].
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Self>> {
        if bytes.len() % Self::SIZE != 0 {
            return Err(ColoringError::MalformedMessage(format!(
                "{} bytes is not a whole number of {}-byte color updates",
                bytes.len(),
                Self::SIZE
            )));
        }
        bytes
            .chunks_exact(Self::SIZE)
            .map(|chunk| {
                Self::read_from(chunk)
                    .ok_or_else(|| ColoringError::MalformedMessage("short color update".into()))
            })
            .collect()
    }
}
