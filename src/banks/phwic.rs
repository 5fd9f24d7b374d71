use serde::Serialize;

use super::take_batch;
use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHWIC";

// The source material names the three float arrays exactly (pref1[3],
// pfit[4], dpfit[10], 17 words = 68 bytes) and describes the rest only as
// "mixed i16/i32/VAX float" totalling ~126 meaningful bytes plus a 2-byte
// trailing pad whose origin is itself left ambiguous. No surviving
// reference implementation exists, so the remaining scalar fields (three
// i32, three i16, ten VAX-float scalars — chosen to make the 126-byte total
// exact) are this decoder's own reconstruction.
const RECORD_SIZE: usize = 128;
const MEANINGFUL_SIZE: usize = 126;
const N_SCALARS: usize = 10;
const N_PREF1: usize = 3;
const N_PFIT: usize = 4;
const N_DPFIT: usize = 10;
const FLOATS_PER_RECORD: usize = N_SCALARS + N_PREF1 + N_PFIT + N_DPFIT;
const INT_FIELDS_OFFSET: usize = 0;
const INT_FIELDS_BYTES: usize = 3 * 4;
const SHORT_FIELDS_OFFSET: usize = INT_FIELDS_OFFSET + INT_FIELDS_BYTES;
const SHORT_FIELDS_BYTES: usize = 3 * 2;
const FLOATS_OFFSET: usize = SHORT_FIELDS_OFFSET + SHORT_FIELDS_BYTES;

/// A wire-chamber hit/track association.
#[derive(Debug, Clone, Serialize)]
pub struct PhwicRecord {
    pub id: i32,
    pub status: i32,
    pub layer: i32,
    pub nhit: i16,
    pub qflag: i16,
    pub flag1: i16,
    pub scalars: [f32; N_SCALARS],
    pub pref1: [f32; N_PREF1],
    pub pfit: [f32; N_PFIT],
    pub dpfit: [f32; N_DPFIT],
}

pub(crate) fn parse(buffer: &mut BufferReader, n: usize) -> Result<Vec<PhwicRecord>> {
    let raw = take_batch(buffer, BANK, n, RECORD_SIZE)?;

    let mut float_words = Vec::with_capacity(n * FLOATS_PER_RECORD);
    for chunk in raw.chunks_exact(RECORD_SIZE) {
        for i in 0..FLOATS_PER_RECORD {
            let off = FLOATS_OFFSET + i * 4;
            float_words.push(bp::read_u32(&chunk[off..off + 4]));
        }
    }
    let floats = vax::vax_f32_to_ieee_bulk(&float_words);

    let mut out = Vec::with_capacity(n);
    for (i, chunk) in raw.chunks_exact(RECORD_SIZE).enumerate() {
        let id = bp::read_i32(&chunk[0..4]);
        let status = bp::read_i32(&chunk[4..8]);
        let layer = bp::read_i32(&chunk[8..12]);
        let nhit = bp::read_i16(&chunk[12..14]);
        let qflag = bp::read_i16(&chunk[14..16]);
        let flag1 = bp::read_i16(&chunk[16..18]);

        let f = &floats[i * FLOATS_PER_RECORD..(i + 1) * FLOATS_PER_RECORD];
        let mut scalars = [0.0f32; N_SCALARS];
        scalars.copy_from_slice(&f[0..N_SCALARS]);
        let mut pref1 = [0.0f32; N_PREF1];
        pref1.copy_from_slice(&f[N_SCALARS..N_SCALARS + N_PREF1]);
        let mut pfit = [0.0f32; N_PFIT];
        pfit.copy_from_slice(&f[N_SCALARS + N_PREF1..N_SCALARS + N_PREF1 + N_PFIT]);
        let dpfit_start = N_SCALARS + N_PREF1 + N_PFIT;
        let mut dpfit = [0.0f32; N_DPFIT];
        dpfit.copy_from_slice(&f[dpfit_start..dpfit_start + N_DPFIT]);

        out.push(PhwicRecord {
            id,
            status,
            layer,
            nhit,
            qflag,
            flag1,
            scalars,
            pref1,
            pfit,
            dpfit,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_accounts_for_the_documented_126_meaningful_bytes() {
        assert_eq!(FLOATS_OFFSET + FLOATS_PER_RECORD * 4, MEANINGFUL_SIZE);
        assert_eq!(MEANINGFUL_SIZE + 2, RECORD_SIZE);
    }

    #[test]
    fn underflow_on_short_buffer() {
        let raw = vec![0u8; RECORD_SIZE - 1];
        let mut buffer = BufferReader::new(&raw);
        assert!(parse(&mut buffer, 1).is_err());
    }
}
