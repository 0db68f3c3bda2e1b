//! CD-ROM Mode 2 Form 1 Reed-Solomon Product Code (RS-PC) parity.
//!
//! Builds the 172-byte P parity and 104-byte Q parity fields the way the Yellow Book
//! defines them: two interleaved Reed-Solomon codewords per "column", each evaluated at
//! GF(256) roots 1 and 2 via Horner's method (the standard "ecc_f_lut"/"ecc_b_lut"
//! construction used by every open CD-ROM sector rebuilder, from `ecm` to `mednafen`'s
//! CD subsystem).
//!
//! P parity protects the (header-zeroed) header, sub-header, user data and EDC — 2064
//! bytes, traversed as 86 interleaved codewords of 24 bytes spaced 86 bytes apart. Q
//! parity protects that same region *plus* the just-computed P parity — 2236 bytes,
//! traversed as 52 interleaved codewords of 43 bytes on a diagonal stride of 88, wrapping
//! around the 2236-byte window (which is why Q parity is always computed after P).

/// Byte offset (from the start of a 2352-byte sector) where Form 1 user data ends and EDC
/// begins.
pub const EDC_OFFSET: usize = 2072;
/// Byte offset where P parity begins.
pub const P_OFFSET: usize = 2076;
/// Byte offset where Q parity begins.
pub const Q_OFFSET: usize = 2248;
/// Length in bytes of the P parity field.
pub const P_LEN: usize = 172;
/// Length in bytes of the Q parity field.
pub const Q_LEN: usize = 104;

fn gf_mul2_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        let doubled = (i << 1) as u8;
        table[i] = if i & 0x80 != 0 { doubled ^ 0x1D } else { doubled };
        i += 1;
    }
    table
}

fn gf_b_lut(f_lut: &[u8; 256]) -> [u8; 256] {
    let mut table = [0u8; 256];
    for i in 0..256u16 {
        let idx = (i as u8) ^ f_lut[i as usize];
        table[idx as usize] = i as u8;
    }
    table
}

thread_local! {
    static F_LUT: [u8; 256] = gf_mul2_table();
    static B_LUT: [u8; 256] = F_LUT.with(gf_b_lut);
}

/// Compute one interleaved Reed-Solomon parity block, writing `2 * major_count` bytes.
///
/// `data[index]` is read for `minor_count` positions per "major" column, starting at
/// `(major / 2) * major_mult + (major % 2)` and advancing by `minor_inc` (wrapping modulo
/// `data.len()`).
fn compute_block(data: &[u8], major_count: usize, minor_count: usize, major_mult: usize, minor_inc: usize) -> Vec<u8> {
    F_LUT.with(|f_lut| {
        B_LUT.with(|b_lut| {
            let size = data.len();
            let mut out = vec![0u8; 2 * major_count];

            for major in 0..major_count {
                let mut index = (major >> 1) * major_mult + (major & 1);
                let mut ecc_a = 0u8;
                let mut ecc_b = 0u8;

                for _ in 0..minor_count {
                    let temp = data[index];

                    index += minor_inc;
                    if index >= size {
                        index -= size;
                    }

                    ecc_a ^= temp;
                    ecc_b ^= temp;
                    ecc_a = f_lut[ecc_a as usize];
                }

                ecc_a = b_lut[(f_lut[ecc_a as usize] ^ ecc_b) as usize];

                out[major] = ecc_a;
                out[major + major_count] = ecc_a ^ ecc_b;
            }

            out
        })
    })
}

/// Compute and write the P and Q parity fields of a Mode 2 Form 1 sector.
///
/// Preconditions: `sector[12..16]` (the header) must already be zeroed, and `sector[2072..2076]`
/// (the EDC) must already hold its final value — both fields are covered by the P/Q
/// parity computation itself.
pub fn write_parity(sector: &mut [u8; 2352]) {
    let p_src = sector[12..P_OFFSET].to_vec();
    let p = compute_block(&p_src, 86, 24, 2, 86);
    sector[P_OFFSET..P_OFFSET + P_LEN].copy_from_slice(&p);

    let q_src = sector[12..Q_OFFSET].to_vec();
    let q = compute_block(&q_src, 52, 43, 86, 88);
    sector[Q_OFFSET..Q_OFFSET + Q_LEN].copy_from_slice(&q);
}
