//! Optional integrity check: compare the fixed data track's MD5 against a catalog of
//! known-good hashes keyed by disc serial.
//!
//! The original tool embedded this catalog as a set of Windows resources, one pre-baked
//! `CUE` file per known title, each carrying a `REM MD5 <hex32>` comment line. This port
//! keeps the same external shape (a `REM MD5` line inside a `CUE`-formatted string) but
//! stores entries in a plain in-memory map built at runtime, so a caller can seed it from
//! an embedded default set and extend it from a directory of real `.cue` files without
//! recompiling.

use std::collections::HashMap;

/// A lookup table from disc serial to expected data-track MD5 hash.
#[derive(Default)]
pub struct CueCatalog {
    entries: HashMap<String, String>,
}

fn normalize(serial: &str) -> String {
    serial.trim().replace('-', "_").to_ascii_uppercase()
}

impl CueCatalog {
    /// Build an empty catalog.
    pub fn new() -> CueCatalog {
        CueCatalog::default()
    }

    /// Register one `serial -> md5` entry directly. `md5` is stored lowercase.
    pub fn register(&mut self, serial: &str, md5: &str) {
        self.entries.insert(normalize(serial), md5.to_ascii_lowercase());
    }

    /// Parse a `REM MD5 <hex32>` line out of a `CUE`-formatted string and register it
    /// under `serial`. Returns `false` if no such line is found.
    pub fn register_from_cue_text(&mut self, serial: &str, cue_text: &str) -> bool {
        for line in cue_text.lines() {
            let line = line.trim();
            if let Some(rest) = line.strip_prefix("REM MD5 ") {
                let hex = rest.trim();
                if hex.len() == 32 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
                    self.register(serial, hex);
                    return true;
                }
            }
        }
        false
    }

    /// Look up the expected MD5 for `serial`, trying both `_` and `-` separator forms.
    pub fn lookup(&self, serial: &str) -> Option<&str> {
        self.entries.get(&normalize(serial)).map(String::as_str)
    }
}

/// Compute the lowercase hex MD5 digest of `data`.
pub fn digest_hex(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

/// Check `data`'s MD5 against the catalog entry for `serial`. Returns `None` if the
/// catalog has no entry (the caller should treat this as "unverified", never as failure).
pub fn verify(catalog: &CueCatalog, serial: &str, data: &[u8]) -> Option<bool> {
    let expected = catalog.lookup(serial)?;
    Some(digest_hex(data) == expected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_and_looks_up() {
        let mut catalog = CueCatalog::new();
        catalog.register("SLUS-01288", "0123456789abcdef0123456789abcdef");
        assert_eq!(catalog.lookup("SLUS_01288"), Some("0123456789abcdef0123456789abcdef"));
    }

    #[test]
    fn parses_rem_md5_line() {
        let mut catalog = CueCatalog::new();
        let cue = "FILE \"cdrom.bin\" BINARY\nREM MD5 00112233445566778899aabbccddeeff\n  TRACK 01 MODE2/2352\n";
        assert!(catalog.register_from_cue_text("SCPS_18012", cue));
        assert_eq!(catalog.lookup("SCPS_18012"), Some("00112233445566778899aabbccddeeff"));
    }

    #[test]
    fn missing_entry_is_unverified_not_failed() {
        let catalog = CueCatalog::new();
        assert_eq!(verify(&catalog, "SLUS_99999", b"anything"), None);
    }

    #[test]
    fn verify_detects_mismatch() {
        let mut catalog = CueCatalog::new();
        catalog.register("SLUS_00000", &digest_hex(b"expected"));
        assert_eq!(verify(&catalog, "SLUS_00000", b"expected"), Some(true));
        assert_eq!(verify(&catalog, "SLUS_00000", b"different"), Some(false));
    }
}
