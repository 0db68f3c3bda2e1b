//! Outer `.PBP` ("EBOOT") container parser.
//!
//! A PBP file is a flat sequence of eight named segments, each identified by a
//! little-endian `u32` byte offset stored in a fixed header. Only `DATA.PSAR` is
//! required for disc reconstruction; the others (icons, screenshots, the PSP
//! executable) are ignored by this crate but still sliced out so a caller can save
//! them if it wants to.

use crate::{CoreError, CoreResult};

const MAGIC: &[u8; 4] = b"\0PBP";

/// The eight segments a PBP header can point to, in on-disk order.
pub const SEGMENT_NAMES: [&str; 8] = [
    "PARAM.SFO",
    "ICON0.PNG",
    "ICON1.PMF",
    "PIC0.PNG",
    "PIC1.PNG",
    "SND0.AT3",
    "DATA.PSP",
    "DATA.PSAR",
];

/// A single named byte range within the PBP file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Offset of the first byte of this segment within the PBP file.
    pub offset: u32,
    /// Offset just past the last byte of this segment.
    pub end: u32,
}

impl Segment {
    /// Length of this segment in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.offset
    }

    /// True if this segment is empty (start offset equal to end offset), which is how an
    /// unused/omitted segment is represented in a PBP header.
    pub fn is_empty(&self) -> bool {
        self.offset == self.end
    }
}

/// Parsed view of a `.PBP` file's segment table.
#[derive(Clone, Debug)]
pub struct Package {
    segments: [Segment; 8],
}

impl Package {
    /// Parse the header of `pbp` (the full contents of a `.PBP` file) and compute every
    /// segment's byte range.
    pub fn parse(pbp: &[u8]) -> CoreResult<Package> {
        if pbp.len() < 40 {
            return Err(CoreError::Truncated {
                expected: 40,
                actual: pbp.len(),
            });
        }

        if &pbp[0..4] != MAGIC {
            return Err(CoreError::InvalidMagic {
                path: "<pbp buffer>".into(),
            });
        }

        // pbp[4..8] is the version, which we don't need to interpret.
        let mut offsets = [0u32; 8];
        for (i, slot) in offsets.iter_mut().enumerate() {
            let o = 8 + i * 4;
            *slot = u32::from_le_bytes(*array_ref![pbp, o, 4]);
        }

        let file_len = pbp.len() as u32;

        let mut segments = [Segment { offset: 0, end: 0 }; 8];
        for i in 0..8 {
            let offset = offsets[i];
            let end = if i + 1 < 8 { offsets[i + 1] } else { file_len };

            if offset as usize > pbp.len() || end as usize > pbp.len() || end < offset {
                return Err(CoreError::Truncated {
                    expected: end as usize,
                    actual: pbp.len(),
                });
            }

            segments[i] = Segment { offset, end };
        }

        Ok(Package { segments })
    }

    /// Return the byte range for the named segment, or `None` if `name` isn't one of the
    /// eight known segment names.
    pub fn segment(&self, name: &str) -> Option<Segment> {
        SEGMENT_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.segments[i])
    }

    /// Return the raw bytes of the named segment, sliced out of `pbp` (the same buffer
    /// originally passed to [`Package::parse`]).
    pub fn segment_bytes<'a>(&self, pbp: &'a [u8], name: &str) -> Option<&'a [u8]> {
        let seg = self.segment(name)?;

        pbp.get(seg.offset as usize..seg.end as usize)
    }

    /// Convenience accessor for the mandatory `DATA.PSAR` segment.
    pub fn psar<'a>(&self, pbp: &'a [u8]) -> CoreResult<&'a [u8]> {
        self.segment_bytes(pbp, "DATA.PSAR").ok_or(CoreError::Truncated {
            expected: 0,
            actual: 0,
        })
    }

    /// Iterate over all eight segments paired with their name, in on-disk order.
    pub fn segments(&self) -> impl Iterator<Item = (&'static str, Segment)> + '_ {
        SEGMENT_NAMES.iter().copied().zip(self.segments.iter().copied())
    }
}
