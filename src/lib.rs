//! Reconstructs PSOne Classic optical disc images (`BIN`/`CUE`) from the `.PBP` EBOOT
//! packages used to ship them on the PlayStation Portable and PlayStation Store.
//!
//! The crate is organized the way the original disc is laid out: an outer [`pbp`]
//! container holds a [`psar`] archive, which in turn holds one or more encrypted disc
//! headers describing a compressed data track ([`iso_assembler`]) and zero or more
//! scrambled CDDA tracks ([`audio`]). [`sector`] rebuilds CD-ROM sector headers and
//! parity, [`cue`] emits the final `CUE` sheet, and [`pipeline`] wires every stage
//! together behind an [`ExtractionContext`](context::ExtractionContext).

#[macro_use]
extern crate arrayref;
extern crate thiserror;

pub mod audio;
pub mod bcd;
pub mod context;
pub mod crypto;
pub mod cue;
pub mod iso_assembler;
pub mod md5_catalog;
pub mod msf;
pub mod pbp;
pub mod pipeline;
pub mod psar;
pub mod sector;

pub use bcd::Bcd;
pub use context::{Config, ExtractionContext, Warning, WarningKind};
pub use msf::Msf;

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Number of frames (sectors) in the standard two-second pregap before the first track of
/// a session, and the default pregap for any track not covered by [`audio::pregap`]'s
/// override catalog.
pub const GAP_FRAMES: u32 = 150;

/// Size in bytes of a single CD-ROM sector, regardless of its mode or form.
pub const SECTOR_SIZE: usize = 2352;

/// Error type covering every fatal condition the extraction pipeline can hit.
#[allow(missing_docs)]
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
    #[error("Bad magic number in `{path}`: expected a PBP or PSAR signature")]
    InvalidMagic { path: PathBuf },
    #[error("Truncated input: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("Decryption failed for `{what}`")]
    DecryptFailed { what: String },
    #[error("LZ decompression failed for block at offset {offset}")]
    DecompressFailed { offset: u64 },
    #[error("Mode 1 sector encountered at sector {0}; only Mode 2 discs are supported")]
    UnsupportedMode(u32),
    #[error("Unexpected sector mode {mode} at sector {sector}")]
    UnexpectedMode { sector: u32, mode: u8 },
    #[error("Mode 0 sector at {0} has non-zero user data; image is corrupt")]
    Mode0NotZero(u32),
    #[error("Allocation of {0} bytes failed")]
    OutOfMemory(usize),
    #[error("CUE table entry for track {0} is missing or malformed")]
    BadCueEntry(u8),
    #[error("Unknown disc serial, no CUE table entry found")]
    UnknownSerial,
}

/// Convenience alias for `Result<T, CoreError>`.
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[test]
fn coreerror_display() {
    // Make sure every variant implements Display, i.e. that we didn't forget a `#[error(...)]`.
    println!("{}", CoreError::UnknownSerial);
}
