//! Top-level driver: wires the container readers, block assembler, sector fixer and audio
//! pipeline together into one end-to-end disc extraction, threaded through an
//! [`ExtractionContext`].

use std::path::PathBuf;

use crate::audio::{self, AudioCodec};
use crate::bcd::Bcd;
use crate::context::{ExtractionContext, WarningKind};
use crate::cue::{self, CueTrack, TrackKind};
use crate::md5_catalog;
use crate::msf::Msf;
use crate::pbp::Package;
use crate::psar::layout::{CueEntry, CueEntryType};
use crate::psar::{DiscHeader, PsarContainer, PsarVariant};
use crate::sector::xa::{CdRomMode, XaForm, XaSubHeader};
use crate::sector::{self, SectorBuilder, SYNC_PATTERN};
use crate::{CoreError, CoreResult, Config, SECTOR_SIZE};

/// Count of sectors processed by [`fix_data_track`], broken down by mode/form.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectorCounts {
    pub mode0: u32,
    pub mode2_form1: u32,
    pub mode2_form2: u32,
}

impl SectorCounts {
    pub fn total(&self) -> u32 {
        self.mode0 + self.mode2_form1 + self.mode2_form2
    }
}

/// Result of extracting a single disc.
#[derive(Debug)]
pub struct DiscSummary {
    pub serial: String,
    pub title: String,
    pub bin_path: PathBuf,
    pub cue_path: PathBuf,
    pub sector_counts: SectorCounts,
    pub audio_tracks_recovered: usize,
    pub audio_tracks_skipped: usize,
    /// `Some(true/false)` when [`Config::verify_md5`] was set and a catalog entry existed,
    /// `None` when verification was skipped or the serial wasn't catalogued.
    pub md5_verified: Option<bool>,
}

/// Result of running the full pipeline over one `.PBP` (one disc for a single-disc
/// package, one per contained disc for a multi-disc package).
#[derive(Debug, Default)]
pub struct Summary {
    pub discs: Vec<DiscSummary>,
}

/// Run the full pipeline: unpack, decrypt, assemble, fix, recover audio, write `BIN`/`CUE`.
pub fn run(pbp: &[u8], config: &Config, ctx: &mut ExtractionContext) -> CoreResult<Summary> {
    let package = Package::parse(pbp)?;
    let psar = package.psar(pbp)?;
    let container = PsarContainer::parse(psar)?;

    if let Some(document_path) = &config.document_path {
        decrypt_document(document_path, &config.output_dir, ctx);
    }

    let mut summary = Summary::default();

    match container.variant {
        PsarVariant::Single => {
            let header = container.decrypt_disc_header(psar, 0, ctx.pgd())?;
            let disc = extract_disc(psar, &header, None, config, ctx)?;
            summary.discs.push(disc);
        }
        PsarVariant::Multi => {
            let disc_map = container.decrypt_disc_map(psar, ctx.pgd())?;
            for (i, disc_offset) in disc_map.discs().enumerate() {
                let header = container.decrypt_disc_header(psar, disc_offset, ctx.pgd())?;
                let disc = extract_disc(psar, &header, Some(i + 1), config, ctx)?;
                summary.discs.push(disc);
            }
        }
    }

    Ok(summary)
}

/// Decrypt an optional standalone `DOCUMENT.DAT` (the game manual some titles ship
/// alongside the `.PBP`) and write it as `DOCUMENT.BIN`. Unlike the disc header or ISO
/// blocks, this file never lives inside the PSAR; a caller points at it directly. Failure
/// here is logged, never fatal.
fn decrypt_document(document_path: &std::path::Path, output_dir: &std::path::Path, ctx: &mut ExtractionContext) {
    let mut buf = match std::fs::read(document_path) {
        Ok(buf) => buf,
        Err(e) => {
            ctx.warn((0, 0, 0), WarningKind::AuxiliaryDecryptFailed, format!("reading {}: {}", document_path.display(), e));
            return;
        }
    };

    match ctx.document().decrypt(&mut buf) {
        Ok(len) => {
            buf.truncate(len);
            if let Err(e) = std::fs::create_dir_all(output_dir).and_then(|_| std::fs::write(output_dir.join("DOCUMENT.BIN"), &buf)) {
                ctx.warn((0, 0, 0), WarningKind::AuxiliaryDecryptFailed, format!("writing DOCUMENT.BIN: {}", e));
            }
        }
        Err(e) => {
            ctx.warn((0, 0, 0), WarningKind::AuxiliaryDecryptFailed, format!("DOCUMENT.DAT decryption failed: {}", e));
        }
    }
}

fn extract_disc(
    psar: &[u8],
    header: &DiscHeader,
    disc_number: Option<usize>,
    config: &Config,
    ctx: &mut ExtractionContext,
) -> CoreResult<DiscSummary> {
    log::info!("extracting disc {} ({})", header.serial, header.title);

    let assembled = crate::iso_assembler::assemble(header, psar, ctx.lz())?;
    if let Some(trash) = &assembled.trash {
        log::debug!("{} bytes of trailing trash at the trash/overdump boundary", trash.len());
    }

    let num_sectors = expected_data_sectors(&header.cue_entries)?;
    let (fixed_data, counts) = fix_data_track(&assembled.data, num_sectors, ctx)?;

    let data_gap = compute_data_gap(num_sectors, counts.total());
    let (audio_bins, audio_cues, recovered, skipped) =
        build_audio_tracks(header, psar, &header.serial, data_gap, ctx);

    let mut tracks = vec![CueTrack {
        number: 1,
        kind: TrackKind::Data,
        index0: Msf::zero(),
        index1: Msf::zero(),
    }];
    tracks.extend(audio_cues);

    let final_bin = cue::concatenate(&fixed_data, &audio_bins);

    let md5_verified = if config.verify_md5 {
        let catalog = md5_catalog::CueCatalog::new();
        md5_catalog::verify(&catalog, &header.serial, &fixed_data)
    } else {
        None
    };

    let (bin_name, cue_name) = match disc_number {
        Some(n) => (format!("CDROM_{}.BIN", n), format!("CDROM_{}.CUE", n)),
        None => ("CDROM.BIN".to_string(), "CDROM.CUE".to_string()),
    };

    let bin_path = config.output_dir.join(&bin_name);
    let cue_path = config.output_dir.join(&cue_name);

    let cue_text = match md5_verified {
        Some(true) => cue::build_with_md5(&bin_name, &tracks, &md5_catalog::digest_hex(&fixed_data)),
        _ => cue::build(&bin_name, &tracks),
    };

    std::fs::create_dir_all(&config.output_dir)?;
    std::fs::write(&bin_path, &final_bin)?;
    std::fs::write(&cue_path, cue_text.as_bytes())?;

    if config.keep_intermediate {
        let intermediate_dir = match disc_number {
            Some(n) => ctx.disc_dir(n),
            None => config.output_dir.clone(),
        };
        std::fs::create_dir_all(&intermediate_dir)?;
        std::fs::write(intermediate_dir.join("DATA_TRACK.BIN"), &assembled.data)?;
        if let Some(trash) = &assembled.trash {
            std::fs::write(intermediate_dir.join("TRASH.BIN"), trash)?;
        }
        if let Some(overdump) = &assembled.overdump {
            std::fs::write(intermediate_dir.join("OVERDUMP.BIN"), overdump)?;
        }
    }

    Ok(DiscSummary {
        serial: header.serial.clone(),
        title: header.title.clone(),
        bin_path,
        cue_path,
        sector_counts: counts,
        audio_tracks_recovered: recovered,
        audio_tracks_skipped: skipped,
        md5_verified,
    })
}

/// Build a sector carrying only a sync pattern, BCD MSF header and the given mode byte,
/// with an all-zero payload.
fn synth_sector(msf: Msf, mode: CdRomMode) -> [u8; SECTOR_SIZE] {
    let mut buf = [0u8; SECTOR_SIZE];
    buf[0..12].copy_from_slice(&SYNC_PATTERN);
    let (m, s, f) = msf.into_bcd();
    buf[12] = m.bcd();
    buf[13] = s.bcd();
    buf[14] = f.bcd();
    buf[15] = mode as u8;
    buf
}

fn msf_tuple(msf: Msf) -> (u8, u8, u8) {
    let (m, s, f) = msf.into_bcd();
    (m.bcd(), s.bcd(), f.bcd())
}

fn bootloader_sectors(data: &[u8]) -> Vec<[u8; SECTOR_SIZE]> {
    (12..16)
        .filter_map(|i| {
            let start = i * SECTOR_SIZE;
            data.get(start..start + SECTOR_SIZE)
                .map(|s| s.try_into().expect("slice is exactly SECTOR_SIZE"))
        })
        .collect()
}

/// Rebuild exactly `num_sectors` sectors of a raw, decompressed data track: sync, BCD MSF
/// header, and for Mode 2 sectors the sub-header-driven EDC/parity reconstruction.
///
/// `data` may run out into real zero-padding before `num_sectors` is reached (or may
/// carry trailing trash the assembler appended past the last real block); once a Mode 0
/// sector is found whose remainder of `data` is entirely zero, the rest of the output is
/// synthesized as Mode 0 sectors rather than read from `data`, so the returned stream
/// always has exactly `num_sectors * SECTOR_SIZE` bytes on success.
pub fn fix_data_track(data: &[u8], num_sectors: u32, ctx: &mut ExtractionContext) -> CoreResult<(Vec<u8>, SectorCounts)> {
    let edc_policy = sector::infer_form2_policy(&bootloader_sectors(data));

    let mut out = Vec::with_capacity(num_sectors as usize * SECTOR_SIZE);
    let mut counts = SectorCounts::default();
    let mut msf = Msf::new(Bcd::zero(), Bcd::from_binary(2).unwrap(), Bcd::zero()).unwrap();

    let mut cursor = 0usize;
    let mut reached_zero_padding = false;

    for i in 0..num_sectors {
        let sector_buf: [u8; SECTOR_SIZE] = if reached_zero_padding {
            [0u8; SECTOR_SIZE]
        } else {
            let end = cursor + SECTOR_SIZE;
            let slice = data.get(cursor..end).ok_or(CoreError::Truncated { expected: end, actual: data.len() })?;
            cursor = end;
            slice.try_into().expect("slice is exactly SECTOR_SIZE")
        };

        let mode = if reached_zero_padding {
            CdRomMode::Mode0
        } else {
            CdRomMode::from_byte(sector_buf[15]).ok_or(CoreError::UnexpectedMode {
                sector: i,
                mode: sector_buf[15],
            })?
        };

        match mode {
            CdRomMode::Mode0 => {
                if reached_zero_padding {
                    out.extend_from_slice(&synth_sector(msf, CdRomMode::Mode0));
                    counts.mode0 += 1;
                } else {
                    if sector_buf[16..].iter().any(|&b| b != 0) {
                        return Err(CoreError::Mode0NotZero(i));
                    }

                    if data[cursor..].iter().all(|&b| b == 0) {
                        reached_zero_padding = true;
                        out.extend_from_slice(&synth_sector(msf, CdRomMode::Mode0));
                    } else {
                        ctx.warn(
                            msf_tuple(msf),
                            WarningKind::UnexpectedMode,
                            format!("sector {} is mode 0 but followed by more data; writing it as a boundary anomaly", i),
                        );
                        out.extend_from_slice(&synth_sector(msf, CdRomMode::Mode2));
                    }
                    counts.mode0 += 1;
                }
            }
            CdRomMode::Mode1 => return Err(CoreError::UnsupportedMode(i)),
            CdRomMode::Mode2 => {
                let subheader = XaSubHeader::from_sector(&sector_buf);
                if subheader.copies_mismatch() {
                    ctx.warn(
                        msf_tuple(msf),
                        WarningKind::SubheaderCopyMismatch,
                        format!("sector {} sub-header copies disagree", i),
                    );
                }

                let first_copy = *array_ref![sector_buf, 16, 4];
                let form = subheader.submode().form();

                let fixed = match form {
                    XaForm::Form1 => {
                        let payload = &sector_buf[24..24 + 2048];
                        let builder = SectorBuilder::new(first_copy, XaForm::Form1, payload)?;
                        counts.mode2_form1 += 1;
                        builder.finish_form1(msf)
                    }
                    XaForm::Form2 => {
                        let payload = &sector_buf[24..24 + 2324];
                        let builder = SectorBuilder::new(first_copy, XaForm::Form2, payload)?;
                        counts.mode2_form2 += 1;
                        builder.finish_form2(msf, edc_policy)
                    }
                };

                out.extend_from_slice(&fixed);
            }
        }

        msf = msf.next().ok_or(CoreError::Truncated { expected: 0, actual: 0 })?;
    }

    Ok((out, counts))
}

/// Derive the data track's expected sector count from the `CUE` table, the way the
/// original's `data_track_sectors`/`get_track_size_from_cue` compute it: track 1's
/// `INDEX 01` and the next entry's `INDEX 01` (the first audio track, or the lead-out if
/// the disc has no audio) are each converted to a frame count with the standard 2-second
/// lead-in subtracted — except the lead-out, which keeps its own frame count as-is — and
/// the distance between the two, minus one further [`crate::GAP_FRAMES`], is the expected
/// sector count. The intermediate subtraction is allowed to go negative (matching the
/// original's signed-int arithmetic) and only the final result is checked for validity.
fn expected_data_sectors(cue_entries: &[CueEntry]) -> CoreResult<u32> {
    let gap = crate::GAP_FRAMES as i64;

    let track1_idx = cue_entries
        .iter()
        .position(|e| e.ty == CueEntryType::Data && e.number == 1)
        .ok_or(CoreError::BadCueEntry(1))?;
    let track1 = &cue_entries[track1_idx];

    let cur = Msf::from_bcd(track1.index1.0, track1.index1.1, track1.index1.2)
        .ok_or(CoreError::BadCueEntry(track1.number))?
        .frames() as i64
        - gap;

    let next = match cue_entries.get(track1_idx + 1) {
        Some(e) if e.ty != CueEntryType::LeadOut => {
            Msf::from_bcd(e.index1.0, e.index1.1, e.index1.2)
                .ok_or(CoreError::BadCueEntry(e.number))?
                .frames() as i64
                - gap
        }
        _ => {
            let lead_out = cue_entries
                .iter()
                .find(|e| e.ty == CueEntryType::LeadOut)
                .ok_or(CoreError::BadCueEntry(0))?;
            Msf::from_bcd(lead_out.index1.0, lead_out.index1.1, lead_out.index1.2)
                .ok_or(CoreError::BadCueEntry(0))?
                .frames() as i64
        }
    };

    u32::try_from(next - cur - gap).map_err(|_| CoreError::BadCueEntry(track1.number))
}

/// The true post-fix pregap before track 2's audio, derived from the gap between the
/// `CUE` table's expectation and the data track's actual fixed sector count.
fn compute_data_gap(expected_data_sectors: u32, actual_data_sectors: u32) -> u32 {
    expected_data_sectors
        .saturating_sub(actual_data_sectors)
        .saturating_add(crate::GAP_FRAMES)
}

/// Resolve the pregap, in frames, a given audio track should use ahead of its payload:
/// track 2 always uses the data-track-derived gap; tracks 3+ consult the override
/// catalog, defaulting to the standard two-second gap.
fn pregap_frames_for(serial: &str, track: u8, data_gap: u32) -> u32 {
    if track <= 2 {
        return data_gap;
    }

    audio::pregap::lookup(serial, track)
        .map(|(m, s, f)| (m as u32 * 60 + s as u32) * 75 + f as u32)
        .unwrap_or(crate::GAP_FRAMES)
}

/// Recover and pad every audio track listed in the disc's `CUE` table, returning the
/// ready-to-concatenate `BIN` bytes for each plus the matching `CueTrack` entries.
fn build_audio_tracks(
    header: &DiscHeader,
    psar: &[u8],
    serial: &str,
    data_gap: u32,
    ctx: &mut ExtractionContext,
) -> (Vec<Vec<u8>>, Vec<CueTrack>, usize, usize) {
    let audio_cues: Vec<&CueEntry> = header
        .cue_entries
        .iter()
        .filter(|e| e.ty == CueEntryType::Audio)
        .collect();

    let lead_out_frames = header
        .cue_entries
        .iter()
        .find(|e| e.ty == CueEntryType::LeadOut)
        .and_then(|e| Msf::from_bcd(e.index1.0, e.index1.1, e.index1.2))
        .map(Msf::frames);

    let audio_base = header.block_base();

    let mut bins = Vec::new();
    let mut cues = Vec::new();
    let mut recovered = 0;
    let mut skipped = 0;

    for (i, cue) in audio_cues.iter().enumerate() {
        let this_frames = match Msf::from_bcd(cue.index1.0, cue.index1.1, cue.index1.2) {
            Some(msf) => msf.frames(),
            None => {
                skipped += 1;
                continue;
            }
        };

        let next_frames = audio_cues
            .get(i + 1)
            .and_then(|e| Msf::from_bcd(e.index1.0, e.index1.1, e.index1.2))
            .map(Msf::frames)
            .or(lead_out_frames)
            .unwrap_or(this_frames);

        let track_sectors = next_frames.saturating_sub(this_frames);
        let sample_frames = track_sectors * SECTOR_SIZE as u32 / 4;
        let pregap = pregap_frames_for(serial, cue.number, data_gap);

        let cdda = match header.cdda_entries.get(i) {
            Some(e) => e,
            None => {
                ctx.warn(
                    (cue.index1.0, cue.index1.1, cue.index1.2),
                    WarningKind::AudioDecodeFailed,
                    format!("track {} has no matching audio-track table entry", cue.number),
                );
                skipped += 1;
                continue;
            }
        };

        let start = audio_base as usize + cdda.offset as usize;
        let end = start + cdda.size as usize;
        let raw = match psar.get(start..end) {
            Some(r) => r,
            None => {
                ctx.warn(
                    (cue.index1.0, cue.index1.1, cue.index1.2),
                    WarningKind::AudioDecodeFailed,
                    format!("track {} payload out of range", cue.number),
                );
                skipped += 1;
                continue;
            }
        };

        let descrambled = audio::descramble(raw, cdda.checksum);
        let wav = audio::wrap_at3(&descrambled, sample_frames);

        let pcm = match ctx.codec().decode(&wav) {
            Ok(pcm) => pcm,
            Err(e) => {
                ctx.warn(
                    (cue.index1.0, cue.index1.1, cue.index1.2),
                    WarningKind::AudioDecodeFailed,
                    format!("track {}: {}", cue.number, e),
                );
                skipped += 1;
                continue;
            }
        };

        let mut synthetic_wav = vec![0u8; 44];
        synthetic_wav.extend_from_slice(&pcm);

        let expected_size = pregap.saturating_sub(1) as usize * SECTOR_SIZE + track_sectors as usize * SECTOR_SIZE;
        let bin = audio::wav_to_bin(&synthetic_wav, pregap, expected_size);

        let index1 = Msf::from_frames(this_frames).unwrap_or(Msf::zero());
        let index0 = index1.checked_sub(pregap).unwrap_or(Msf::zero());

        cues.push(CueTrack {
            number: cue.number,
            kind: TrackKind::Audio,
            index0,
            index1,
        });
        bins.push(bin);
        recovered += 1;
    }

    (bins, cues, recovered, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FakeCodec;
    use crate::context::ExtractionContext;
    use crate::crypto::PassthroughCodecs;
    use crate::sector::xa::{XaForm, XaSubmode};

    fn test_ctx() -> ExtractionContext {
        ExtractionContext::new(
            "/tmp/eboot2cue-pipeline-test",
            Box::new(PassthroughCodecs),
            Box::new(PassthroughCodecs),
            Box::new(PassthroughCodecs),
            Box::new(FakeCodec),
        )
    }

    fn raw_mode2_sector(form: XaForm) -> Vec<u8> {
        let mut sector = vec![0u8; SECTOR_SIZE];
        sector[15] = CdRomMode::Mode2 as u8;
        let submode = match form {
            XaForm::Form1 => 0u8,
            XaForm::Form2 => 0x20u8,
        };
        sector[16] = 1; // file number
        sector[17] = 0; // channel number
        sector[18] = submode;
        sector[19] = 0;
        let subheader_copy: Vec<u8> = sector[16..20].to_vec();
        sector[20..24].copy_from_slice(&subheader_copy);
        sector
    }

    #[test]
    fn fixes_a_single_form1_sector() {
        let mut ctx = test_ctx();
        let sector = raw_mode2_sector(XaForm::Form1);

        let (fixed, counts) = fix_data_track(&sector, 1, &mut ctx).unwrap();
        assert_eq!(fixed.len(), SECTOR_SIZE);
        assert_eq!(counts.mode2_form1, 1);
        assert_eq!(counts.total(), 1);
        assert_eq!(&fixed[0..12], &SYNC_PATTERN);
        // 00:02:00 is the conventional start of the data track.
        assert_eq!(&fixed[12..15], &[0x00, 0x02, 0x00]);
    }

    #[test]
    fn mode0_sector_with_nonzero_payload_is_corrupt() {
        let mut ctx = test_ctx();
        let mut sector = vec![0u8; SECTOR_SIZE];
        sector[15] = CdRomMode::Mode0 as u8;
        sector[100] = 0xFF;

        assert!(matches!(fix_data_track(&sector, 1, &mut ctx), Err(CoreError::Mode0NotZero(_))));
    }

    #[test]
    fn mode1_sector_is_unsupported() {
        let mut ctx = test_ctx();
        let mut sector = vec![0u8; SECTOR_SIZE];
        sector[15] = CdRomMode::Mode1 as u8;

        assert!(matches!(fix_data_track(&sector, 1, &mut ctx), Err(CoreError::UnsupportedMode(_))));
    }

    #[test]
    fn mismatched_subheader_copies_produce_a_warning_not_a_failure() {
        let mut ctx = test_ctx();
        let mut sector = raw_mode2_sector(XaForm::Form1);
        sector[23] = 0xFF; // corrupt the second copy's coding-info byte

        let (_fixed, counts) = fix_data_track(&sector, 1, &mut ctx).unwrap();
        assert_eq!(counts.mode2_form1, 1);
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].kind, WarningKind::SubheaderCopyMismatch);
    }

    #[test]
    fn running_out_of_real_sectors_into_zero_padding_synthesizes_the_rest() {
        let mut ctx = test_ctx();
        let mut data = raw_mode2_sector(XaForm::Form1);
        data.extend(std::iter::repeat(0u8).take(SECTOR_SIZE)); // one all-zero trailing sector

        let (fixed, counts) = fix_data_track(&data, 3, &mut ctx).unwrap();
        assert_eq!(fixed.len(), 3 * SECTOR_SIZE);
        assert_eq!(counts.mode2_form1, 1);
        assert_eq!(counts.mode0, 2);
        assert_eq!(counts.total(), 3);
        // The two synthesized tail sectors both carry sync patterns, not raw zeros.
        assert_eq!(&fixed[SECTOR_SIZE..SECTOR_SIZE + 12], &SYNC_PATTERN);
        assert_eq!(&fixed[2 * SECTOR_SIZE..2 * SECTOR_SIZE + 12], &SYNC_PATTERN);
    }

    #[test]
    fn truncated_input_with_no_zero_padding_is_an_error() {
        let mut ctx = test_ctx();
        let data = raw_mode2_sector(XaForm::Form1);

        assert!(matches!(fix_data_track(&data, 3, &mut ctx), Err(CoreError::Truncated { .. })));
    }

    #[test]
    fn embedded_mode0_sector_followed_by_more_data_is_a_warning_not_a_boundary() {
        let mut ctx = test_ctx();
        let mut data = vec![0u8; SECTOR_SIZE];
        data[15] = CdRomMode::Mode0 as u8;
        data.extend(raw_mode2_sector(XaForm::Form1));

        let (fixed, counts) = fix_data_track(&data, 2, &mut ctx).unwrap();
        assert_eq!(fixed.len(), 2 * SECTOR_SIZE);
        assert_eq!(counts.mode0, 1);
        assert_eq!(counts.mode2_form1, 1);
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].kind, WarningKind::UnexpectedMode);
        // The anomalous mode-0 sector is still written out with a sync pattern.
        assert_eq!(&fixed[0..12], &SYNC_PATTERN);
    }

    #[test]
    fn xa_submode_form_bit_selects_form2() {
        let sector = raw_mode2_sector(XaForm::Form2);
        let subheader = XaSubHeader::from_sector(sector[..].try_into().unwrap());
        assert_eq!(subheader.submode(), XaSubmode(0x20));
        assert_eq!(subheader.submode().form(), XaForm::Form2);
    }

    #[test]
    fn pregap_defaults_to_standard_gap_for_unlisted_serial() {
        assert_eq!(pregap_frames_for("SLUS_99999", 3, 200), crate::GAP_FRAMES);
    }

    #[test]
    fn pregap_uses_data_gap_for_track_two() {
        assert_eq!(pregap_frames_for("SLUS_99999", 2, 321), 321);
    }

    #[test]
    fn compute_data_gap_accounts_for_shortfall_against_expected() {
        let gap = compute_data_gap(300, 150);
        assert_eq!(gap, 300 - 150 + crate::GAP_FRAMES);
    }

    fn cue_entry(ty: u16, number: u8, index1: (u8, u8, u8)) -> CueEntry {
        let mut entry_bytes = [0u8; 10];
        entry_bytes[0..2].copy_from_slice(&ty.to_le_bytes());
        entry_bytes[2] = number;
        entry_bytes[7..10].copy_from_slice(&[index1.0, index1.1, index1.2]);
        CueEntry::parse(&entry_bytes).unwrap()
    }

    #[test]
    fn expected_data_sectors_measures_up_to_the_first_audio_track() {
        // Track 1 (data) starts at 00:00:00, the canonical position; track 2 (audio)
        // starts at 00:06:00 (450 frames).
        let cue_entries = vec![
            cue_entry(0x41, 1, (0x00, 0x00, 0x00)),
            cue_entry(0x01, 2, (0x00, 0x06, 0x00)),
        ];

        // (450 - GAP) - (0 - GAP) - GAP == 450 - GAP == 300
        assert_eq!(expected_data_sectors(&cue_entries).unwrap(), 300);
    }

    #[test]
    fn expected_data_sectors_measures_up_to_the_lead_out_with_no_audio_tracks() {
        // Lead-out at 00:00:10 (10 frames), no gap subtraction applied to it.
        let cue_entries = vec![
            cue_entry(0x41, 1, (0x00, 0x00, 0x00)),
            cue_entry(0xA2, 0, (0x00, 0x00, 0x10)),
        ];

        // 10 - (0 - GAP) - GAP == 10
        assert_eq!(expected_data_sectors(&cue_entries).unwrap(), 10);
    }

    #[test]
    fn expected_data_sectors_rejects_a_missing_track_one() {
        let cue_entries = vec![cue_entry(0xA2, 0, (0x00, 0x06, 0x00))];
        assert!(matches!(expected_data_sectors(&cue_entries), Err(CoreError::BadCueEntry(1))));
    }

    #[test]
    fn decrypts_standalone_document_and_writes_it_out() {
        let dir = std::env::temp_dir().join("eboot2cue-pipeline-document-test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let document_path = dir.join("DOCUMENT.DAT");
        std::fs::write(&document_path, b"manual contents").unwrap();

        let output_dir = dir.join("out");
        let mut ctx = test_ctx();
        decrypt_document(&document_path, &output_dir, &mut ctx);

        assert_eq!(std::fs::read(output_dir.join("DOCUMENT.BIN")).unwrap(), b"manual contents");
        assert!(ctx.warnings().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_document_file_warns_instead_of_panicking() {
        let mut ctx = test_ctx();
        decrypt_document(std::path::Path::new("/nonexistent/DOCUMENT.DAT"), std::path::Path::new("/tmp/eboot2cue-unused"), &mut ctx);
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.warnings()[0].kind, WarningKind::AuxiliaryDecryptFailed);
    }
}
