use serde::Serialize;

use super::take_batch;
use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHKLUS";
const RECORD_SIZE: usize = 100;
const N_ELAYER: usize = 8;
const N_SCALARS: usize = 13;
const FLOATS_PER_RECORD: usize = N_ELAYER + N_SCALARS;

/// A calorimeter cluster.
#[derive(Debug, Clone, Serialize)]
pub struct PhklusRecord {
    pub id: i32,
    pub status: i32,
    pub nhit2: i32,
    pub nhit3: i32,
    pub elayer: [f32; N_ELAYER],
    pub scalars: [f32; N_SCALARS],
}

pub(crate) fn parse(buffer: &mut BufferReader, n: usize) -> Result<Vec<PhklusRecord>> {
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
        let nhit2 = bp::read_i32(&chunk[8..12]);
        let nhit3 = bp::read_i32(&chunk[12..16]);

        let f = &floats[i * FLOATS_PER_RECORD..(i + 1) * FLOATS_PER_RECORD];
        let mut elayer = [0.0f32; N_ELAYER];
        elayer.copy_from_slice(&f[0..N_ELAYER]);
        let mut scalars = [0.0f32; N_SCALARS];
        scalars.copy_from_slice(&f[N_ELAYER..N_ELAYER + N_SCALARS]);

        out.push(PhklusRecord {
            id,
            status,
            nhit2,
            nhit3,
            elayer,
            scalars,
        });
    }
    Ok(out)
}
