//! CD-ROM XA Mode 2 sub-header parsing.
//!
//! Adapted from the generic CD image sector interface this crate started from: the parts
//! that depended on lazily-reconstructed, format-agnostic sector payloads were dropped
//! since this crate always has every byte of a sector in hand when it needs to inspect
//! its sub-header.

/// Mode for a CD-ROM sector, taken from byte 15 of its header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CdRomMode {
    /// Mode 0: all-zero filler sector.
    Mode0 = 0,
    /// Mode 1 ("regular" CD-ROM, not supported by this crate).
    Mode1 = 1,
    /// Mode 2 (used for CD-ROM XA, the format PSOne Classic discs use).
    Mode2 = 2,
}

impl CdRomMode {
    /// Decode a raw mode byte. Returns `None` for anything other than 0, 1 or 2.
    pub fn from_byte(b: u8) -> Option<CdRomMode> {
        match b {
            0 => Some(CdRomMode::Mode0),
            1 => Some(CdRomMode::Mode1),
            2 => Some(CdRomMode::Mode2),
            _ => None,
        }
    }
}

/// Mode 2 XA sub-header (from the CD-i "green book"):
///
/// ```text
///   byte 0: File Number
///   byte 1: Channel Number
///   byte 2: Submode
///   byte 3: Coding Information
///   byte 4: File Number (copy)
///   byte 5: Channel Number (copy)
///   byte 6: Submode (copy)
///   byte 7: Coding Information (copy)
/// ```
///
/// The subheader starts at byte 16 of a CD-ROM XA sector, just after the 16-byte sync +
/// header. The data is duplicated for resilience; both copies are normally identical but
/// some pressed discs carry mismatched copies, which this crate treats as a non-fatal
/// warning rather than a hard error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XaSubHeader(pub [u8; 8]);

impl XaSubHeader {
    /// Parse a sub-header out of the 8 bytes at offset 16 of a raw sector.
    pub fn from_sector(sector: &[u8; 2352]) -> XaSubHeader {
        XaSubHeader(*array_ref![sector, 16, 8])
    }

    /// First copy's File Number.
    pub fn file_number(&self) -> u8 {
        self.0[0]
    }

    /// First copy's Channel Number.
    pub fn channel_number(&self) -> u8 {
        self.0[1]
    }

    /// First copy's Submode.
    pub fn submode(&self) -> XaSubmode {
        XaSubmode(self.0[2])
    }

    /// First copy's Coding Information (raw byte; interpretation depends on submode).
    pub fn coding_info(&self) -> u8 {
        self.0[3]
    }

    /// True if the two 4-byte copies of the sub-header disagree on any field.
    pub fn copies_mismatch(&self) -> bool {
        self.0[0..4] != self.0[4..8]
    }
}

/// The Submode byte in a Mode 2 XA sub-header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct XaSubmode(pub u8);

impl XaSubmode {
    /// True if the End Of Record (EOR) bit is set.
    pub fn end_of_record(self) -> bool {
        self.0 & 1 != 0
    }

    /// True if the Video (V) bit is set.
    pub fn video(self) -> bool {
        self.0 & (1 << 1) != 0
    }

    /// True if the Audio (A) bit is set.
    pub fn audio(self) -> bool {
        self.0 & (1 << 2) != 0
    }

    /// True if the Data (D) bit is set.
    pub fn data(self) -> bool {
        self.0 & (1 << 3) != 0
    }

    /// True if the Trigger (T) bit is set.
    pub fn trigger(self) -> bool {
        self.0 & (1 << 4) != 0
    }

    /// Decode the sector form from the Form (F) bit.
    pub fn form(self) -> XaForm {
        if self.0 & (1 << 5) != 0 {
            XaForm::Form2
        } else {
            XaForm::Form1
        }
    }

    /// True if the Real-Time Sector (RT) bit is set.
    pub fn real_time(self) -> bool {
        self.0 & (1 << 6) != 0
    }

    /// True if the End Of File (EOF) bit is set.
    pub fn end_of_file(self) -> bool {
        self.0 & (1 << 7) != 0
    }
}

/// CD-ROM XA Mode 2 sectors have two possible forms, advertised by the sub-header's Form
/// bit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XaForm {
    /// Form 1: 2048 bytes of user data, plus a 4-byte EDC and 276 bytes of Reed-Solomon
    /// P/Q parity.
    Form1,
    /// Form 2: 2324 bytes of user data and a 4-byte field that's either a real EDC, all
    /// zero, or left as whatever was on the original pressing, depending on the image's
    /// inferred policy.
    Form2,
}
