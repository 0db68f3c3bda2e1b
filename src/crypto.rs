//! Facades for the cryptographic and compression primitives the disc format relies on.
//!
//! The real PGD/KIRK ciphers and the LZ decompressor used by retail EBOOTs are Sony
//! intellectual property and are deliberately kept out of this crate: callers supply
//! their own implementation of these traits (wrapping whatever cipher/decompression
//! library they're licensed to use) through [`crate::context::ExtractionContext`].

use crate::CoreResult;

/// Size in bytes of the PGD header prepended to every encrypted blob.
pub const PGD_HEADER_SIZE: usize = 0x90;

/// Decrypts Sony's PGD DRM container format in place.
///
/// Implementations receive the full PGD blob (header + ciphertext) and must decrypt it
/// in place, returning the length of the plaintext payload that follows the stripped
/// header. A `key` of `None` means the key should be derived from the PGD's internal MAC
/// rather than supplied externally.
pub trait PgdDecryptor {
    /// Decrypt `buf` in place. `mac_type` selects which of the PGD's MAC/cipher variants
    /// to use. Returns the plaintext length, not counting the header.
    fn decrypt(&self, buf: &mut [u8], mac_type: u32, key: Option<&[u8; 16]>) -> CoreResult<usize>;
}

/// Decrypts the DES-keyed `DOCUMENT.DAT` blob some titles ship alongside the PGD-wrapped
/// disc header.
pub trait DocumentDecryptor {
    /// Decrypt `buf` in place, returning the plaintext length.
    fn decrypt(&self, buf: &mut [u8]) -> CoreResult<usize>;
}

/// LZ-class decompressor used to expand the 16-sector blocks of the ISO block table.
pub trait LzDecompressor {
    /// Decompress `src` into `dst`, which has capacity `dst.len()`. Implementations must
    /// fill the whole of `dst` on success.
    fn decompress(&self, dst: &mut [u8], src: &[u8]) -> CoreResult<()>;
}

/// Idempotent setup hook for the KIRK cipher engine that backs PGD decryption. Real
/// implementations typically need to run this once per process before the first PGD
/// call; it's modeled here as a no-op so the pipeline always has something to call.
pub fn kirk_init() {}

/// A [`PgdDecryptor`]/[`LzDecompressor`]/[`DocumentDecryptor`] triple that doesn't perform
/// any actual cryptography or compression: it treats its input as already being
/// plaintext/uncompressed. Useful for exercising the pipeline's control flow in tests
/// with synthetic fixtures that were never really encrypted or compressed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassthroughCodecs;

impl PgdDecryptor for PassthroughCodecs {
    fn decrypt(&self, buf: &mut [u8], _mac_type: u32, _key: Option<&[u8; 16]>) -> CoreResult<usize> {
        // There's no header to strip since nothing was ever encrypted: the whole buffer
        // is already "plaintext".
        Ok(buf.len())
    }
}

impl DocumentDecryptor for PassthroughCodecs {
    fn decrypt(&self, buf: &mut [u8]) -> CoreResult<usize> {
        Ok(buf.len())
    }
}

impl LzDecompressor for PassthroughCodecs {
    fn decompress(&self, dst: &mut [u8], src: &[u8]) -> CoreResult<()> {
        let n = dst.len().min(src.len());
        dst[..n].copy_from_slice(&src[..n]);
        for b in &mut dst[n..] {
            *b = 0;
        }
        Ok(())
    }
}
