use serde::Serialize;

use super::take_batch;
use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHKTRK";
const RECORD_SIZE: usize = 4;

/// Placeholder bank: the source format reserves only an `id` field here.
/// A richer layout may exist upstream; this decoder matches the documented
/// placeholder exactly.
#[derive(Debug, Clone, Serialize)]
pub struct PhktrkRecord {
    pub id: i32,
}

pub(crate) fn parse(buffer: &mut BufferReader, n: usize) -> Result<Vec<PhktrkRecord>> {
    let raw = take_batch(buffer, BANK, n, RECORD_SIZE)?;
    let mut out = Vec::with_capacity(n);
    for chunk in raw.chunks_exact(RECORD_SIZE) {
        out.push(PhktrkRecord {
            id: bp::read_i32(chunk),
        });
    }
    Ok(out)
}
