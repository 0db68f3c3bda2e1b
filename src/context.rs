//! Owned replacement for the original tool's global state and working-directory
//! juggling: everything a pipeline run needs is threaded through one
//! [`ExtractionContext`], built once from a [`Config`].

use std::path::{Path, PathBuf};

use crate::audio::AudioCodec;
use crate::crypto::{DocumentDecryptor, LzDecompressor, PgdDecryptor};

/// Upper bound on how many warnings a single extraction keeps around; past this the
/// overflow is just counted, not stored, so a pathological input can't turn a warning
/// log into an unbounded allocation.
pub const MAX_WARNINGS: usize = 256;

/// Settings parsed once from CLI flags (or constructed directly by a library caller) and
/// carried into an [`ExtractionContext`].
#[derive(Clone, Debug)]
pub struct Config {
    /// Path to the input `.PBP` package.
    pub input: PathBuf,
    /// Directory extracted artifacts are written under.
    pub output_dir: PathBuf,
    /// PGD key override, if the caller wants to supply one instead of relying on
    /// MAC-derived keys.
    pub pgd_key: Option<[u8; 16]>,
    /// Path to an external ATRAC3 decoder binary, if audio recovery is desired.
    pub codec_path: Option<PathBuf>,
    /// Path to an optional standalone `DOCUMENT.DAT` (the game manual), supplied
    /// separately from the `.PBP` itself.
    pub document_path: Option<PathBuf>,
    /// Run the optional MD5 catalog check after writing the data track.
    pub verify_md5: bool,
    /// Keep intermediate artifacts (`ISO_HEADER.BIN`, per-track `AT3`/`WAV`, ...) instead
    /// of deleting them once the final `BIN`/`CUE` is written.
    pub keep_intermediate: bool,
}

impl Config {
    /// Build a `Config` pointing at `input`, writing into `output_dir`, with every
    /// optional feature left at its default (off).
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Config {
        Config {
            input: input.into(),
            output_dir: output_dir.into(),
            pgd_key: None,
            codec_path: None,
            document_path: None,
            verify_md5: false,
            keep_intermediate: false,
        }
    }
}

/// Category of a non-fatal condition recorded during extraction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// The two copies of a sector's sub-header disagree.
    SubheaderCopyMismatch,
    /// A sector mode outside `{0, 1, 2}` was encountered and the stream was truncated.
    UnexpectedMode,
    /// The external audio codec failed or was unavailable; the track was dropped.
    AudioDecodeFailed,
    /// The optional special-data or unknown-data blob failed to decrypt.
    AuxiliaryDecryptFailed,
}

/// One recorded non-fatal condition, tied to the disc position it occurred at when that's
/// meaningful.
#[derive(Clone, Debug)]
pub struct Warning {
    /// Disc position `(mm, ss, ff)`, BCD-encoded, or `(0, 0, 0)` when not applicable.
    pub msf: (u8, u8, u8),
    pub kind: WarningKind,
    pub details: String,
}

/// Owns every piece of state a pipeline run needs: where to write output, which codec
/// implementations to use, and the accumulated warning log. Threaded by reference through
/// every pipeline stage; no stage touches the process's current working directory.
pub struct ExtractionContext {
    output_dir: PathBuf,
    pgd: Box<dyn PgdDecryptor>,
    document: Box<dyn DocumentDecryptor>,
    lz: Box<dyn LzDecompressor>,
    codec: Box<dyn AudioCodec>,
    warnings: Vec<Warning>,
    warning_overflow: usize,
}

impl ExtractionContext {
    /// Build a context rooted at `output_dir`, using the given codec implementations.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        pgd: Box<dyn PgdDecryptor>,
        document: Box<dyn DocumentDecryptor>,
        lz: Box<dyn LzDecompressor>,
        codec: Box<dyn AudioCodec>,
    ) -> ExtractionContext {
        ExtractionContext {
            output_dir: output_dir.into(),
            pgd,
            document,
            lz,
            codec,
            warnings: Vec::new(),
            warning_overflow: 0,
        }
    }

    /// Root output directory for this extraction.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Subdirectory a given disc's artifacts should be written under (`disc_<n>/`,
    /// 1-based), replacing the original's per-disc `chdir` convention.
    pub fn disc_dir(&self, disc_number: usize) -> PathBuf {
        self.output_dir.join(format!("disc_{}", disc_number))
    }

    pub fn pgd(&self) -> &dyn PgdDecryptor {
        self.pgd.as_ref()
    }

    pub fn document(&self) -> &dyn DocumentDecryptor {
        self.document.as_ref()
    }

    pub fn lz(&self) -> &dyn LzDecompressor {
        self.lz.as_ref()
    }

    pub fn codec(&self) -> &dyn AudioCodec {
        self.codec.as_ref()
    }

    /// Record a non-fatal warning, logging it immediately and dropping it (while still
    /// counting it) once [`MAX_WARNINGS`] have accumulated.
    pub fn warn(&mut self, msf: (u8, u8, u8), kind: WarningKind, details: impl Into<String>) {
        let details = details.into();
        log::warn!("{:?} at {:02x}:{:02x}:{:02x}: {}", kind, msf.0, msf.1, msf.2, details);

        if self.warnings.len() < MAX_WARNINGS {
            self.warnings.push(Warning { msf, kind, details });
        } else {
            self.warning_overflow += 1;
        }
    }

    /// Warnings recorded so far, oldest first.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Number of warnings dropped after [`MAX_WARNINGS`] was reached.
    pub fn warning_overflow(&self) -> usize {
        self.warning_overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FakeCodec;
    use crate::crypto::PassthroughCodecs;

    fn test_context() -> ExtractionContext {
        ExtractionContext::new(
            "/tmp/eboot2cue-test",
            Box::new(PassthroughCodecs),
            Box::new(PassthroughCodecs),
            Box::new(PassthroughCodecs),
            Box::new(FakeCodec),
        )
    }

    #[test]
    fn disc_dir_is_scoped_under_output() {
        let ctx = test_context();
        assert_eq!(ctx.disc_dir(2), PathBuf::from("/tmp/eboot2cue-test/disc_2"));
    }

    #[test]
    fn warnings_cap_and_count_overflow() {
        let mut ctx = test_context();
        for i in 0..MAX_WARNINGS + 10 {
            ctx.warn((0, 0, 0), WarningKind::SubheaderCopyMismatch, format!("warning {}", i));
        }
        assert_eq!(ctx.warnings().len(), MAX_WARNINGS);
        assert_eq!(ctx.warning_overflow(), 10);
    }
}
