//! CDDA audio-track recovery: XOR descrambling, ATRAC3 `RIFF/WAVE` wrapping, and
//! PCM-to-`BIN` padding.

pub mod pregap;

use crate::{CoreError, CoreResult};

const CHUNK_LEN: usize = 0x180;
const MULTIPLIER: u32 = 123_456_789;

/// Descramble (or, equivalently, scramble — the transform is self-inverse) one audio
/// track's raw payload using the seed recorded in its [`crate::psar::layout::CddaEntry`].
///
/// This is an OFB-style XOR stream cipher: the keystream word `tmp` advances on its own
/// running value only, never on the word being read or written, so the exact same
/// keystream sequence is produced whether `data` is the original or the scrambled bytes.
/// XOR-ing with the same keystream twice reproduces the input, which is what makes the
/// transform its own inverse.
pub fn descramble(data: &[u8], seed: u32) -> Vec<u8> {
    let mut out = vec![0u8; data.len()];
    let mut seed = seed;

    for chunk_start in (0..data.len()).step_by(CHUNK_LEN) {
        let chunk_end = (chunk_start + CHUNK_LEN).min(data.len());
        let mut tmp = seed;

        let mut pos = chunk_start;
        while pos < chunk_end {
            let word_end = (pos + 4).min(chunk_end);
            let mut word = [0u8; 4];
            word[..word_end - pos].copy_from_slice(&data[pos..word_end]);
            let v = u32::from_le_bytes(word);

            let decoded = tmp ^ v;
            out[pos..word_end].copy_from_slice(&decoded.to_le_bytes()[..word_end - pos]);

            // Advances purely on `tmp`'s own value, never on `v`/`decoded` — the keystream
            // must be identical on both the scramble and descramble pass.
            tmp = tmp.wrapping_mul(MULTIPLIER).wrapping_add(1);
            pos = word_end;
        }

        // The seed rotates after every chunk, including a short tail chunk — the source's
        // inner loop performs this unconditionally.
        seed = seed.rotate_right(1);
    }

    out
}

/// Fixed `fmt `/`fact` portion of the RIFF/WAVE header wrapped around a raw ATRAC3
/// payload, matching the layout the PSP's audio codec expects on input.
pub struct At3WaveHeader {
    /// Number of PCM sample-frames once decoded (`fact.param1`).
    pub sample_frames: u32,
    /// Length in bytes of the ATRAC3 payload that follows the header.
    pub data_size: u32,
}

impl At3WaveHeader {
    /// Render the full RIFF/WAVE/fmt/fact/data header (44 bytes, matching a standard
    /// `AT3_HEADER`), ready to be followed by the raw ATRAC3 payload bytes.
    pub fn encode(&self) -> [u8; 44] {
        let mut h = [0u8; 44];
        let riff_size = 36 + self.data_size;

        h[0..4].copy_from_slice(b"RIFF");
        h[4..8].copy_from_slice(&riff_size.to_le_bytes());
        h[8..12].copy_from_slice(b"WAVE");

        h[12..16].copy_from_slice(b"fmt ");
        h[16..20].copy_from_slice(&32u32.to_le_bytes());
        h[20..22].copy_from_slice(&0x0270u16.to_le_bytes()); // Sony SCX / ATRAC3
        h[22..24].copy_from_slice(&2u16.to_le_bytes()); // channels
        h[24..28].copy_from_slice(&44_100u32.to_le_bytes()); // sample rate
        h[28..32].copy_from_slice(&16_538u32.to_le_bytes()); // byte rate
        h[32..36].copy_from_slice(&384u32.to_le_bytes()); // bytes per frame
        h[36..38].copy_from_slice(&14u16.to_le_bytes()); // extra param size
        h[38..40].copy_from_slice(&1u16.to_le_bytes());
        h[40..42].copy_from_slice(&4096u16.to_le_bytes());
        h[42..44].copy_from_slice(&0u16.to_le_bytes());

        h
    }
}

/// Build the full ATRAC3-wrapped `RIFF/WAVE` byte stream (header + trailing `fact`/`data`
/// chunks + payload) handed to the external codec.
pub fn wrap_at3(payload: &[u8], sample_frames: u32) -> Vec<u8> {
    let header = At3WaveHeader {
        sample_frames,
        data_size: payload.len() as u32,
    };

    let mut out = Vec::with_capacity(44 + 16 + payload.len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(b"fact");
    out.extend_from_slice(&8u32.to_le_bytes());
    out.extend_from_slice(&sample_frames.to_le_bytes());
    out.extend_from_slice(&1024u32.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

/// Decodes an ATRAC3-wrapped `RIFF/WAVE` byte stream into raw 16-bit stereo PCM.
pub trait AudioCodec {
    /// Decode `at3_wav` (the output of [`wrap_at3`]) into raw PCM sample bytes, with no
    /// `WAVE` header of its own.
    fn decode(&self, at3_wav: &[u8]) -> CoreResult<Vec<u8>>;
}

/// Shells out to an external ATRAC3 decoder binary, the same way the system this crate
/// replaces invoked its own bundled converter tool.
pub struct SubprocessCodec {
    /// Path to the external decoder executable.
    pub binary: std::path::PathBuf,
}

impl AudioCodec for SubprocessCodec {
    fn decode(&self, at3_wav: &[u8]) -> CoreResult<Vec<u8>> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut child = Command::new(&self.binary)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        child
            .stdin
            .take()
            .expect("piped stdin")
            .write_all(at3_wav)?;

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(CoreError::DecompressFailed { offset: 0 });
        }

        // Skip the codec's own 44-byte WAVE header; callers only want PCM sample bytes.
        Ok(output.stdout.get(44..).map(<[u8]>::to_vec).unwrap_or_default())
    }
}

/// Test/offline double: re-emits the ATRAC3 payload bytes unchanged, as if they were
/// already PCM. Exercises the padding and pregap arithmetic without a real codec.
pub struct FakeCodec;

impl AudioCodec for FakeCodec {
    fn decode(&self, at3_wav: &[u8]) -> CoreResult<Vec<u8>> {
        Ok(at3_wav.get(44..).map(<[u8]>::to_vec).unwrap_or_default())
    }
}

/// Convert one track's decoded PCM `WAVE` bytes into the padded, pregap-adjusted raw
/// stream that belongs directly in the final `BIN`.
///
/// `pregap_frames` is the number of silent sectors to prepend (minus one, per the
/// original convention that index 0 of the pregap falls exactly on the previous track's
/// last sector); `expected_size` is the target length in bytes (`fact.param1 * 4`,
/// adjusted per [`pregap`]'s extend/truncate rules).
pub fn wav_to_bin(wav: &[u8], pregap_frames: u32, expected_size: usize) -> Vec<u8> {
    const WAV_HEADER_LEN: usize = 44;
    let pcm = wav.get(WAV_HEADER_LEN..).unwrap_or(&[]);

    let mut out = vec![0u8; pregap_frames.saturating_sub(1) as usize * crate::SECTOR_SIZE];
    out.extend_from_slice(pcm);
    out.resize(out.len().max(expected_size), 0);
    out.truncate(expected_size);
    out
}
