use serde::Serialize;

use super::take_batch;
use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHCHRG";

// The source material's prose gives a 206-byte record size for PHCHRG, but
// its own field list (4 i32 + 13 f32 scalars + hlxpar[6] + dhlxpar[15] +
// tkpar[5] + dtkpar[15], all f32, + 11 i16 counters) sums to 254 bytes; no
// surviving reference implementation exists to reconcile the two. This
// decoder treats the enumerated field list as authoritative.
const RECORD_SIZE: usize = 254;
const N_SCALARS: usize = 13;
const N_HLXPAR: usize = 6;
const N_DHLXPAR: usize = 15;
const N_TKPAR: usize = 5;
const N_DTKPAR: usize = 15;
const FLOATS_PER_RECORD: usize = N_SCALARS + N_HLXPAR + N_DHLXPAR + N_TKPAR + N_DTKPAR;

/// A reconstructed charged-particle track.
#[derive(Debug, Clone, Serialize)]
pub struct PhchrgRecord {
    pub id: i32,
    pub status: i32,
    pub vxdhit: i32,
    pub dedx: i32,
    pub scalars: [f32; N_SCALARS],
    pub hlxpar: [f32; N_HLXPAR],
    pub dhlxpar: [f32; N_DHLXPAR],
    pub tkpar: [f32; N_TKPAR],
    pub dtkpar: [f32; N_DTKPAR],
    pub counters: [i16; 11],
}

pub(crate) fn parse(buffer: &mut BufferReader, n: usize) -> Result<Vec<PhchrgRecord>> {
    let raw = take_batch(buffer, BANK, n, RECORD_SIZE)?;

    let mut float_words = Vec::with_capacity(n * FLOATS_PER_RECORD);
    for chunk in raw.chunks_exact(RECORD_SIZE) {
        for i in 0..FLOATS_PER_RECORD {
            let off = 16 + i * 4;
            float_words.push(bp::read_u32(&chunk[off..off + 4]));
        }
    }
    let floats = vax::vax_f32_to_ieee_bulk(&float_words);

    let mut out = Vec::with_capacity(n);
    for (i, chunk) in raw.chunks_exact(RECORD_SIZE).enumerate() {
        let id = bp::read_i32(&chunk[0..4]);
        let status = bp::read_i32(&chunk[4..8]);
        let vxdhit = bp::read_i32(&chunk[8..12]);
        let dedx = bp::read_i32(&chunk[12..16]);

        let f = &floats[i * FLOATS_PER_RECORD..(i + 1) * FLOATS_PER_RECORD];
        let mut scalars = [0.0f32; N_SCALARS];
        scalars.copy_from_slice(&f[0..N_SCALARS]);
        let mut hlxpar = [0.0f32; N_HLXPAR];
        hlxpar.copy_from_slice(&f[N_SCALARS..N_SCALARS + N_HLXPAR]);
        let mut dhlxpar = [0.0f32; N_DHLXPAR];
        dhlxpar.copy_from_slice(&f[N_SCALARS + N_HLXPAR..N_SCALARS + N_HLXPAR + N_DHLXPAR]);
        let tkpar_start = N_SCALARS + N_HLXPAR + N_DHLXPAR;
        let mut tkpar = [0.0f32; N_TKPAR];
        tkpar.copy_from_slice(&f[tkpar_start..tkpar_start + N_TKPAR]);
        let dtkpar_start = tkpar_start + N_TKPAR;
        let mut dtkpar = [0.0f32; N_DTKPAR];
        dtkpar.copy_from_slice(&f[dtkpar_start..dtkpar_start + N_DTKPAR]);

        let counters_off = 232;
        let mut counters = [0i16; 11];
        for (j, c) in counters.iter_mut().enumerate() {
            let off = counters_off + j * 2;
            *c = bp::read_i16(&chunk[off..off + 2]);
        }

        out.push(PhchrgRecord {
            id,
            status,
            vxdhit,
            dedx,
            scalars,
            hlxpar,
            dhlxpar,
            tkpar,
            dtkpar,
            counters,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_size_matches_layout() {
        assert_eq!(RECORD_SIZE, 16 + FLOATS_PER_RECORD * 4 + 11 * 2);
    }

    #[test]
    fn underflow_on_short_buffer() {
        let raw = vec![0u8; RECORD_SIZE - 1];
        let mut buffer = BufferReader::new(&raw);
        assert!(parse(&mut buffer, 1).is_err());
    }
}
