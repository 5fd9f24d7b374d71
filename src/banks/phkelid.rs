use serde::Serialize;

use super::take_batch;
use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHKELID";

// The source material's prose gives a 92-byte record size for PHKELID, but
// its field list (id: i32, idstat: i16, prob: i16, plus 22 VAX-float
// likelihoods) sums to 96 bytes; no surviving reference implementation
// exists to reconcile the two. This decoder trusts the enumerated field
// list.
const RECORD_SIZE: usize = 96;
const N_LIKELIHOODS: usize = 22;

/// Particle-identification likelihoods for one track.
#[derive(Debug, Clone, Serialize)]
pub struct PhkelidRecord {
    pub id: i32,
    pub idstat: i16,
    pub prob: i16,
    pub likelihoods: [f32; N_LIKELIHOODS],
}

pub(crate) fn parse(buffer: &mut BufferReader, n: usize) -> Result<Vec<PhkelidRecord>> {
    let raw = take_batch(buffer, BANK, n, RECORD_SIZE)?;

    let mut float_words = Vec::with_capacity(n * N_LIKELIHOODS);
    for chunk in raw.chunks_exact(RECORD_SIZE) {
        for i in 0..N_LIKELIHOODS {
            let off = 8 + i * 4;
            float_words.push(bp::read_u32(&chunk[off..off + 4]));
        }
    }
    let floats = vax::vax_f32_to_ieee_bulk(&float_words);

    let mut out = Vec::with_capacity(n);
    for (i, chunk) in raw.chunks_exact(RECORD_SIZE).enumerate() {
        let id = bp::read_i32(&chunk[0..4]);
        let idstat = bp::read_i16(&chunk[4..6]);
        let prob = bp::read_i16(&chunk[6..8]);

        let f = &floats[i * N_LIKELIHOODS..(i + 1) * N_LIKELIHOODS];
        let mut likelihoods = [0.0f32; N_LIKELIHOODS];
        likelihoods.copy_from_slice(f);

        out.push(PhkelidRecord {
            id,
            idstat,
            prob,
            likelihoods,
        });
    }
    Ok(out)
}
