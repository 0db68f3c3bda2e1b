//! CD-ROM Mode 2 sector reconstruction.
//!
//! A compressed disc image only stores the 2048 (Form 1) or 2324 (Form 2) bytes of real
//! user data per sector; everything else — the sync pattern, the BCD MSF header, the
//! sub-header, and the EDC/ECC parity — is fully determined by that position on the disc
//! and can be rebuilt from scratch. [`fix_sector`] does exactly that for one sector at a
//! time; [`SectorStream`] drives it across an entire track, tracking the running MSF
//! counter and inferring the Form 2 EDC policy the same way the rest of the pipeline
//! infers per-title quirks.

pub mod crc;
pub mod ecc;
pub mod xa;

use crate::bcd::Bcd;
use crate::msf::Msf;
use crate::{CoreError, CoreResult};
use xa::{CdRomMode, XaForm, XaSubHeader};

/// The 12-byte sync pattern every CD-ROM sector starts with.
pub const SYNC_PATTERN: [u8; 12] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];

/// Offset of the BCD MSF header, right after the sync pattern.
const HEADER_OFFSET: usize = 12;
/// Offset of the mode byte within the header.
const MODE_OFFSET: usize = 15;
/// Offset of the sub-header (Mode 2 only).
const SUBHEADER_OFFSET: usize = 16;
/// Offset where Form 1/Form 2 user data begins.
const USER_DATA_OFFSET: usize = 24;
/// Length of Form 1 user data.
const FORM1_DATA_LEN: usize = 2048;
/// Length of Form 2 user data.
const FORM2_DATA_LEN: usize = 2324;
/// Offset of the Form 2 trailer (either a real EDC or filler), relative to sector start.
const FORM2_EDC_OFFSET: usize = USER_DATA_OFFSET + FORM2_DATA_LEN;

/// Policy for the 4-byte trailer on Form 2 sectors, which isn't protected by parity and
/// so can't be recovered: different titles either always wrote a real EDC, always left it
/// zeroed, or (rarely) left whatever garbage happened to be in the encoder's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Form2EdcPolicy {
    /// Compute and write a real EDC over the Form 2 user data.
    Compute,
    /// Always write four zero bytes.
    Zero,
    /// Leave the trailer bytes exactly as decompressed, unmodified.
    Keep,
}

/// Write the sync pattern and BCD MSF header into a sector buffer.
fn write_header(sector: &mut [u8; 2352], msf: Msf, mode: CdRomMode) {
    sector[0..12].copy_from_slice(&SYNC_PATTERN);
    let (m, s, f) = msf.into_bcd();
    sector[HEADER_OFFSET] = m.bcd();
    sector[HEADER_OFFSET + 1] = s.bcd();
    sector[HEADER_OFFSET + 2] = f.bcd();
    sector[MODE_OFFSET] = mode as u8;
}

/// Rebuild one Mode 2 Form 1 sector in place: header, sub-header copies, EDC and P/Q
/// parity. `sector[16..24]` (the sub-header) and `sector[24..2072]` (user data) must
/// already hold their final decompressed values.
fn fix_form1(sector: &mut [u8; 2352], msf: Msf) {
    write_header(sector, msf, CdRomMode::Mode2);

    // The header bytes must read as zero while computing EDC/ECC: Form 1 parity doesn't
    // actually cover the position on disc, only the sub-header, data and EDC fields.
    let saved_header = [sector[HEADER_OFFSET], sector[HEADER_OFFSET + 1], sector[HEADER_OFFSET + 2], sector[MODE_OFFSET]];
    sector[HEADER_OFFSET..HEADER_OFFSET + 4].fill(0);

    let edc_value = crc::edc(&sector[SUBHEADER_OFFSET..ecc::EDC_OFFSET]);
    sector[ecc::EDC_OFFSET..ecc::EDC_OFFSET + 4].copy_from_slice(&edc_value.to_le_bytes());

    ecc::write_parity(sector);

    sector[HEADER_OFFSET] = saved_header[0];
    sector[HEADER_OFFSET + 1] = saved_header[1];
    sector[HEADER_OFFSET + 2] = saved_header[2];
    sector[MODE_OFFSET] = saved_header[3];
}

/// Rebuild one Mode 2 Form 2 sector in place, applying the given EDC policy to the
/// trailing 4 bytes. `sector[16..24]` and `sector[24..2348]` must already hold their
/// final values.
fn fix_form2(sector: &mut [u8; 2352], msf: Msf, policy: Form2EdcPolicy) {
    write_header(sector, msf, CdRomMode::Mode2);

    match policy {
        Form2EdcPolicy::Compute => {
            let edc_value = crc::edc(&sector[SUBHEADER_OFFSET..FORM2_EDC_OFFSET]);
            sector[FORM2_EDC_OFFSET..FORM2_EDC_OFFSET + 4].copy_from_slice(&edc_value.to_le_bytes());
        }
        Form2EdcPolicy::Zero => {
            sector[FORM2_EDC_OFFSET..FORM2_EDC_OFFSET + 4].fill(0);
        }
        Form2EdcPolicy::Keep => {}
    }
}

/// A single reconstructed sector, assembled from its decompressed sub-header and user
/// data plus a known disc position.
pub struct SectorBuilder {
    buf: [u8; 2352],
}

impl SectorBuilder {
    /// Start building a sector from its 8-byte sub-header and form-appropriate user data
    /// payload (2048 bytes for Form 1, 2324 for Form 2). The sub-header is duplicated into
    /// both copies.
    pub fn new(subheader: [u8; 4], form: XaForm, payload: &[u8]) -> CoreResult<SectorBuilder> {
        let expected = match form {
            XaForm::Form1 => FORM1_DATA_LEN,
            XaForm::Form2 => FORM2_DATA_LEN,
        };

        if payload.len() != expected {
            return Err(CoreError::Truncated {
                expected,
                actual: payload.len(),
            });
        }

        let mut buf = [0u8; 2352];
        buf[SUBHEADER_OFFSET..SUBHEADER_OFFSET + 4].copy_from_slice(&subheader);
        buf[SUBHEADER_OFFSET + 4..SUBHEADER_OFFSET + 8].copy_from_slice(&subheader);
        buf[USER_DATA_OFFSET..USER_DATA_OFFSET + payload.len()].copy_from_slice(payload);

        Ok(SectorBuilder { buf })
    }

    /// Finish the sector, writing its header and parity for the given disc position.
    pub fn finish_form1(mut self, msf: Msf) -> [u8; 2352] {
        fix_form1(&mut self.buf, msf);
        self.buf
    }

    /// Finish the sector, writing its header and trailer per the given EDC policy.
    pub fn finish_form2(mut self, msf: Msf, policy: Form2EdcPolicy) -> [u8; 2352] {
        fix_form2(&mut self.buf, msf, policy);
        self.buf
    }

    /// Read back the sub-header of the sector under construction.
    pub fn subheader(&self) -> XaSubHeader {
        XaSubHeader::from_sector(&self.buf)
    }
}

/// Infer the Form 2 EDC policy a title used from its bootloader sectors.
///
/// PSOne boot images reliably place Form 2 XA sectors at sectors 12-15 (the `SYSTEM.CNF`
/// region read by the BIOS before anything else); majority vote across those four sectors
/// decides between [`Form2EdcPolicy::Zero`] and [`Form2EdcPolicy::Compute`], with ties
/// favoring `Zero` (the common case for discs that never wrote a real Form 2 EDC at all).
pub fn infer_form2_policy(bootloader_sectors: &[[u8; 2352]]) -> Form2EdcPolicy {
    let mut compute_votes = 0;
    let mut zero_votes = 0;

    for sector in bootloader_sectors {
        let trailer = &sector[FORM2_EDC_OFFSET..FORM2_EDC_OFFSET + 4];
        if trailer == [0, 0, 0, 0] {
            zero_votes += 1;
            continue;
        }

        let expected = crc::edc(&sector[SUBHEADER_OFFSET..FORM2_EDC_OFFSET]).to_le_bytes();
        if trailer == expected {
            compute_votes += 1;
        }
    }

    if compute_votes > zero_votes {
        Form2EdcPolicy::Compute
    } else {
        Form2EdcPolicy::Zero
    }
}
