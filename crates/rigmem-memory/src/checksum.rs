//! Checksummed regions of a clone image.
//!
//! Each region is summed byte by byte, modulo 256, and the sum is stored in
//! the byte right after the region. Regions may nest: a whole-image region
//! covers the bytes where smaller regions keep their sums, so update them
//! in the order declared.

use tracing::warn;

use rigmem_core::error::{FrameError, Result};
use rigmem_core::layout::MemoryImage;

/// Bytes `start..=stop`, with the sum stored at `stop + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChecksumRegion {
    pub start: usize,
    pub stop: usize,
}

impl ChecksumRegion {
    pub const fn new(start: usize, stop: usize) -> Self {
        ChecksumRegion { start, stop }
    }

    /// Offset of the stored sum.
    pub const fn address(&self) -> usize {
        self.stop + 1
    }

    /// Sum of the region as it is now.
    pub fn compute(&self, image: &MemoryImage) -> Result<u8> {
        let bytes = image.slice(self.start..self.stop + 1)?;
        Ok(bytes.iter().fold(0u8, |acc, &b| acc.wrapping_add(b)))
    }

    pub fn stored(&self, image: &MemoryImage) -> Result<u8> {
        Ok(image.slice(self.address()..self.address() + 1)?[0])
    }

    pub fn verify(&self, image: &MemoryImage) -> Result<()> {
        let expected = self.compute(image)?;
        let stored = self.stored(image)?;
        if expected != stored {
            return Err(FrameError::ChecksumMismatch {
                residue: stored.wrapping_sub(expected),
            }
            .into());
        }
        Ok(())
    }

    pub fn update(&self, image: &mut MemoryImage) -> Result<()> {
        let sum = self.compute(image)?;
        let at = self.address();
        image.slice_mut(at..at + 1)?[0] = sum;
        Ok(())
    }
}

/// Check every region, reporting the first that fails.
pub fn verify_checksums(image: &MemoryImage, regions: &[ChecksumRegion]) -> Result<()> {
    for region in regions {
        if let Err(e) = region.verify(image) {
            warn!(
                start = format_args!("{:#06x}", region.start),
                stop = format_args!("{:#06x}", region.stop),
                error = %e,
                "image checksum mismatch"
            );
            return Err(e);
        }
    }
    Ok(())
}

/// Recompute every region in order. Done just before an upload.
pub fn update_checksums(image: &mut MemoryImage, regions: &[ChecksumRegion]) -> Result<()> {
    for region in regions {
        region.update(image)?;
    }
    Ok(())
}
