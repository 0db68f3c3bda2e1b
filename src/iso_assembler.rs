//! Turns a disc header's data-block table into a raw, linear data-track byte stream.
//!
//! Each entry in the table points at a 16-sector (37632-byte) block that's either stored
//! raw or LZ-compressed; blocks are concatenated in table order. The final block of real
//! content is flagged by `marker == 0` and is usually followed by leftover pregap/trash
//! bytes that never belonged to the disc image; those are split off as diagnostic
//! artifacts rather than fed into the sector fixer.

use crate::crypto::LzDecompressor;
use crate::psar::layout::{self, IsoEntry};
use crate::psar::DiscHeader;
use crate::sector::SYNC_PATTERN;
use crate::{CoreError, CoreResult};

/// Result of assembling one disc's data blocks.
pub struct AssembledTrack {
    /// Real disc content, ready for the sector fixer.
    pub data: Vec<u8>,
    /// Bytes between the last real sync pattern and the start of all-zero padding, if a
    /// `marker == 0` boundary entry was present.
    pub trash: Option<Vec<u8>>,
    /// Bytes after the all-zero padding boundary, if any.
    pub overdump: Option<Vec<u8>>,
}

/// Assemble the full data track for one disc.
pub fn assemble(header: &DiscHeader, psar: &[u8], lz: &dyn LzDecompressor) -> CoreResult<AssembledTrack> {
    let base = header.block_base();
    let mut data = Vec::new();
    let mut trash = None;
    let mut overdump = None;

    for entry in &header.iso_entries {
        let block = read_block(psar, base, entry, lz)?;

        if entry.marker == 0 {
            let (t, o) = split_trash_overdump(&block);
            trash = Some(t);
            overdump = Some(o);
        }

        data.extend_from_slice(&block);
    }

    Ok(AssembledTrack { data, trash, overdump })
}

fn read_block(psar: &[u8], base: u32, entry: &IsoEntry, lz: &dyn LzDecompressor) -> CoreResult<Vec<u8>> {
    let start = base as usize + entry.offset as usize;
    let compressed_len = entry.size as usize;
    let end = start + compressed_len;

    let compressed = psar.get(start..end).ok_or(CoreError::Truncated {
        expected: end,
        actual: psar.len(),
    })?;

    if compressed_len >= layout::ISO_BLOCK_SIZE {
        Ok(compressed[..layout::ISO_BLOCK_SIZE].to_vec())
    } else {
        let mut dst = vec![0u8; layout::ISO_BLOCK_SIZE];
        lz.decompress(&mut dst, compressed)
            .map_err(|_| CoreError::DecompressFailed { offset: start as u64 })?;
        Ok(dst)
    }
}

/// Split a boundary block into its leading "trash" portion (content still worth keeping,
/// up to the last recognizable sector sync pattern) and trailing "overdump" portion (the
/// zero-padded remainder).
fn split_trash_overdump(block: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let mut last_sync_end = 0;
    let mut pos = 0;
    while pos + SYNC_PATTERN.len() <= block.len() {
        if block[pos..pos + SYNC_PATTERN.len()] == SYNC_PATTERN {
            last_sync_end = pos + crate::SECTOR_SIZE.min(block.len() - pos);
        }
        pos += 1;
    }

    let boundary = if last_sync_end > 0 { last_sync_end } else { block.len() };
    (block[..boundary].to_vec(), block[boundary..].to_vec())
}
