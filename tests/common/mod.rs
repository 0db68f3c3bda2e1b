//! Shared fixture builder for the end-to-end scenarios: synthesizes minimal but
//! structurally valid `.PBP`/`DATA.PSAR` buffers in memory, the same way the unit tests
//! scattered through `src/` build one-off PSAR fragments, just wired up for a whole disc
//! at once so the pipeline can be driven through [`eboot2cue::pipeline::run`] without a
//! real EBOOT on disk.

use std::sync::atomic::{AtomicU32, Ordering};

use eboot2cue::audio::FakeCodec;
use eboot2cue::context::ExtractionContext;
use eboot2cue::crypto::PassthroughCodecs;

pub const ISO_BLOCK_SIZE: usize = 16 * 2352;
pub const ISO_ENTRY_SIZE: usize = 32;
pub const CDDA_ENTRY_SIZE: usize = 16;
pub const CUE_ENTRY_SIZE: usize = 10;
pub const ISO_TABLE_OFFSET: usize = 0x3C00;
pub const CDDA_TABLE_OFFSET: usize = 0x0800;
pub const CUE_TABLE_OFFSET: usize = 0x041E;
pub const SERIAL_OFFSET: usize = 0x001;
pub const SERIAL_LEN: usize = 15;
pub const TITLE_OFFSET: usize = 0xE2C;
pub const TITLE_LEN: usize = 128;
pub const ISO_BASE_OFFSET: u32 = 0x100000;
pub const ISO_HEADER_OFFSET: u32 = 0x400;
pub const ISO_HEADER_SIZE: usize = 0xB6600;
pub const PGD_HEADER_SIZE: usize = 0x90;

const SINGLE_MAGIC: &[u8; 12] = b"PSISOIMG0000";
const MULTI_MAGIC: &[u8; 14] = b"PSTITLEIMG0000";

const DISC_MAP_OFFSET: usize = 0x200;
const DISC_MAP_HEADER_SIZE: usize = 0xA0;
const DISC_MAP_PAYLOAD_LEN: usize = 0x200;
const DISC_MAP_SERIAL_OFFSET: usize = 0x65;
const DISC_MAP_TITLE_OFFSET: usize = 0x10C;

/// A raw, undecompressed CD-ROM XA Mode 2 sector the way it sits in an ISO block before
/// [`eboot2cue::pipeline::fix_data_track`] rebuilds its header and parity: sync/BCD header
/// are left blank (the fixer overwrites them unconditionally), but the mode byte,
/// sub-header and user data must already hold their final values.
pub fn raw_mode2_sector(form2: bool, fill: u8) -> Vec<u8> {
    let mut sector = vec![0u8; 2352];
    sector[15] = 2; // CdRomMode::Mode2
    let submode = if form2 { 0x20u8 } else { 0u8 };
    sector[16] = 1; // file number
    sector[17] = 0; // channel number
    sector[18] = submode;
    sector[19] = 0; // coding info
    let subheader_copy: Vec<u8> = sector[16..20].to_vec();
    sector[20..24].copy_from_slice(&subheader_copy);

    let data_len = if form2 { 2324 } else { 2048 };
    for b in sector[24..24 + data_len].iter_mut() {
        *b = fill;
    }

    sector
}

/// A raw Mode 1 sector — triggers [`eboot2cue::CoreError::UnsupportedMode`].
pub fn raw_mode1_sector() -> Vec<u8> {
    let mut sector = vec![0u8; 2352];
    sector[15] = 1; // CdRomMode::Mode1
    sector
}

/// A raw Mode 0 (zero filler) sector.
pub fn raw_mode0_sector() -> Vec<u8> {
    vec![0u8; 2352]
}

/// Lay out `sectors` (each exactly 2352 bytes) into as many 16-sector, `ISO_BLOCK_SIZE`
/// blocks as needed, zero-padding the final block. Returns one `(block_bytes, marker)` pair
/// per block, `marker` always `1` (no trash/overdump boundary).
pub fn blocks_from_sectors(sectors: &[Vec<u8>]) -> Vec<(Vec<u8>, u16)> {
    let mut flat = Vec::new();
    for s in sectors {
        assert_eq!(s.len(), 2352);
        flat.extend_from_slice(s);
    }
    flat.resize(flat.len().div_ceil(ISO_BLOCK_SIZE) * ISO_BLOCK_SIZE, 0);

    flat.chunks(ISO_BLOCK_SIZE).map(|b| (b.to_vec(), 1u16)).collect()
}

/// Build `count` identical Form 1 sectors, a simple data track fixture.
pub fn plain_form1_sectors(count: u32) -> Vec<Vec<u8>> {
    (0..count).map(|_| raw_mode2_sector(false, 0x42)).collect()
}

pub struct RawCue {
    pub ty: u16,
    pub number: u8,
    pub index0: (u8, u8, u8),
    pub index1: (u8, u8, u8),
}

impl RawCue {
    pub fn data(number: u8, index1: (u8, u8, u8)) -> RawCue {
        RawCue { ty: 0x41, number, index0: (0, 0, 0), index1 }
    }

    pub fn audio(number: u8, index1: (u8, u8, u8)) -> RawCue {
        RawCue { ty: 0x01, number, index0: (0, 0, 0), index1 }
    }

    pub fn lead_out(index1: (u8, u8, u8)) -> RawCue {
        RawCue { ty: 0xA2, number: 0, index0: (0, 0, 0), index1 }
    }
}

pub struct CddaSpec {
    pub checksum: u32,
    /// Already-scrambled payload bytes, as they'd sit on the disc.
    pub payload: Vec<u8>,
}

pub struct DiscFixture {
    pub serial: String,
    pub title: String,
    pub iso_blocks: Vec<(Vec<u8>, u16)>,
    pub cue_entries: Vec<RawCue>,
    pub cdda: Vec<CddaSpec>,
}

impl DiscFixture {
    pub fn new(serial: &str, title: &str) -> DiscFixture {
        DiscFixture {
            serial: serial.to_string(),
            title: title.to_string(),
            iso_blocks: Vec::new(),
            cue_entries: Vec::new(),
            cdda: Vec::new(),
        }
    }
}

fn write_ascii(buf: &mut [u8], offset: usize, len: usize, s: &str) {
    let bytes = s.as_bytes();
    let n = bytes.len().min(len);
    buf[offset..offset + n].copy_from_slice(&bytes[..n]);
}

/// Write one disc's PGD-"encrypted" header, ISO blocks, CDDA payloads and CUE table into
/// `psar` at `disc_offset`, growing the buffer as needed. Everything is laid out as plain
/// little-endian bytes since the fixtures are read back through [`PassthroughCodecs`],
/// which never actually decrypts or decompresses anything.
pub fn write_disc(psar: &mut Vec<u8>, disc_offset: u32, fixture: &DiscFixture) {
    let header_start = disc_offset as usize + ISO_HEADER_OFFSET as usize;
    let payload_start = header_start + PGD_HEADER_SIZE;
    let header_total = header_start + ISO_HEADER_SIZE;
    if psar.len() < header_total {
        psar.resize(header_total, 0);
    }

    write_ascii(psar, payload_start + SERIAL_OFFSET, SERIAL_LEN, &fixture.serial);
    write_ascii(psar, payload_start + TITLE_OFFSET, TITLE_LEN, &fixture.title);

    let iso_table_at = payload_start + ISO_TABLE_OFFSET;
    let block_base = disc_offset + ISO_BASE_OFFSET;
    let mut block_rel = 0u32;
    for (i, (block, marker)) in fixture.iso_blocks.iter().enumerate() {
        assert_eq!(block.len(), ISO_BLOCK_SIZE);

        let entry_at = iso_table_at + i * ISO_ENTRY_SIZE;
        let mut entry = [0u8; ISO_ENTRY_SIZE];
        entry[0..4].copy_from_slice(&block_rel.to_le_bytes());
        entry[4..6].copy_from_slice(&(ISO_BLOCK_SIZE as u16).to_le_bytes());
        entry[6..8].copy_from_slice(&marker.to_le_bytes());
        psar[entry_at..entry_at + ISO_ENTRY_SIZE].copy_from_slice(&entry);

        let start = block_base as usize + block_rel as usize;
        let end = start + ISO_BLOCK_SIZE;
        if psar.len() < end {
            psar.resize(end, 0);
        }
        psar[start..end].copy_from_slice(block);

        block_rel += ISO_BLOCK_SIZE as u32;
    }

    let cdda_table_at = payload_start + CDDA_TABLE_OFFSET;
    let mut cdda_rel = block_rel;
    for (i, c) in fixture.cdda.iter().enumerate() {
        let entry_at = cdda_table_at + i * CDDA_ENTRY_SIZE;
        let mut entry = [0u8; CDDA_ENTRY_SIZE];
        entry[0..4].copy_from_slice(&cdda_rel.to_le_bytes());
        entry[4..8].copy_from_slice(&(c.payload.len() as u32).to_le_bytes());
        entry[12..16].copy_from_slice(&c.checksum.to_le_bytes());
        psar[entry_at..entry_at + CDDA_ENTRY_SIZE].copy_from_slice(&entry);

        let start = block_base as usize + cdda_rel as usize;
        let end = start + c.payload.len();
        if psar.len() < end {
            psar.resize(end, 0);
        }
        psar[start..end].copy_from_slice(&c.payload);

        cdda_rel += c.payload.len() as u32;
    }

    let cue_table_at = payload_start + CUE_TABLE_OFFSET;
    for (i, cue) in fixture.cue_entries.iter().enumerate() {
        let entry_at = cue_table_at + i * CUE_ENTRY_SIZE;
        let mut entry = [0u8; CUE_ENTRY_SIZE];
        entry[0..2].copy_from_slice(&cue.ty.to_le_bytes());
        entry[2] = cue.number;
        entry[3..6].copy_from_slice(&[cue.index0.0, cue.index0.1, cue.index0.2]);
        entry[7..10].copy_from_slice(&[cue.index1.0, cue.index1.1, cue.index1.2]);
        psar[entry_at..entry_at + CUE_ENTRY_SIZE].copy_from_slice(&entry);
    }
}

fn wrap_pbp(psar: &[u8]) -> Vec<u8> {
    const DATA_PSAR_INDEX: usize = 7;
    let mut offsets = [0u32; 8];
    let mut cursor = 40u32;
    for (i, o) in offsets.iter_mut().enumerate() {
        *o = cursor;
        if i == DATA_PSAR_INDEX {
            cursor += psar.len() as u32;
        }
    }

    let mut buf = Vec::new();
    buf.extend_from_slice(b"\0PBP");
    buf.extend_from_slice(&1u32.to_le_bytes());
    for o in offsets {
        buf.extend_from_slice(&o.to_le_bytes());
    }
    buf.extend_from_slice(psar);
    buf
}

/// Build a full single-disc `.PBP` buffer wrapping one [`DiscFixture`].
pub fn single_disc_pbp(fixture: &DiscFixture) -> Vec<u8> {
    let mut psar = vec![0u8; 0x20];
    psar[0..12].copy_from_slice(SINGLE_MAGIC);
    write_disc(&mut psar, 0, fixture);
    wrap_pbp(&psar)
}

/// Build a full multi-disc `.PBP` buffer, one [`DiscFixture`] per `(disc_offset, fixture)`
/// pair.
pub fn multi_disc_pbp(discs: &[(u32, DiscFixture)], map_serial: &str, map_title: &str) -> Vec<u8> {
    let mut psar = vec![0u8; 0x20];
    psar[0..14].copy_from_slice(MULTI_MAGIC);

    let map_payload_start = DISC_MAP_OFFSET + DISC_MAP_HEADER_SIZE;
    let map_end = map_payload_start + DISC_MAP_PAYLOAD_LEN;
    if psar.len() < map_end {
        psar.resize(map_end, 0);
    }

    for (i, (offset, _)) in discs.iter().enumerate() {
        let o = map_payload_start + i * 4;
        psar[o..o + 4].copy_from_slice(&offset.to_le_bytes());
    }
    write_ascii(&mut psar, map_payload_start + DISC_MAP_SERIAL_OFFSET, SERIAL_LEN, map_serial);
    write_ascii(&mut psar, map_payload_start + DISC_MAP_TITLE_OFFSET, TITLE_LEN, map_title);

    for (offset, fixture) in discs {
        write_disc(&mut psar, *offset, fixture);
    }

    wrap_pbp(&psar)
}

/// An [`ExtractionContext`] wired with the always-available reference codecs, writing into
/// a freshly allocated, per-call scratch directory under the system temp dir.
pub fn test_ctx() -> (ExtractionContext, std::path::PathBuf) {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("eboot2cue-e2e-{}-{}", std::process::id(), n));

    let ctx = ExtractionContext::new(
        dir.clone(),
        Box::new(PassthroughCodecs),
        Box::new(PassthroughCodecs),
        Box::new(PassthroughCodecs),
        Box::new(FakeCodec),
    );
    (ctx, dir)
}
