use serde::Serialize;

use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHMTOC";

/// Single 72-byte table-of-contents record: a VAX-float `version` word
/// followed by 17 signed 32-bit counts, one per downstream bank. The source
/// material names eight of the seventeen explicitly (`NPhPSum`, `NPhChrg`,
/// `NPhKlus`, `NPhWic`, `NPhCrid`, `NPhKTrk`, `NPhKElId`, `NMcPart`) and
/// leaves the rest undocumented; with no surviving reference implementation
/// to recover names for them, this decoder keeps the remaining nine only as
/// `reserved`.
pub(crate) const RECORD_SIZE: usize = 72;
const N_COUNTS: usize = 17;
const N_RESERVED: usize = N_COUNTS - 8;

#[derive(Debug, Clone, Serialize)]
pub struct Phmtoc {
    pub version: f32,
    pub n_phpsum: i32,
    pub n_phchrg: i32,
    pub n_phklus: i32,
    pub n_phwic: i32,
    pub n_phcrid: i32,
    pub n_phktrk: i32,
    pub n_phkelid: i32,
    pub n_mcpart: i32,
    pub reserved: [i32; N_RESERVED],
}

pub(crate) fn parse(buffer: &mut BufferReader) -> Result<Phmtoc> {
    let raw = buffer.read(RECORD_SIZE, BANK)?;
    let version = vax::vax_f32_to_ieee(bp::read_u32(&raw[0..4]));

    let mut counts = [0i32; N_COUNTS];
    for (i, c) in counts.iter_mut().enumerate() {
        let off = 4 + i * 4;
        *c = bp::read_i32(&raw[off..off + 4]);
    }

    let mut reserved = [0i32; N_RESERVED];
    reserved.copy_from_slice(&counts[8..]);

    Ok(Phmtoc {
        version,
        n_phpsum: counts[0],
        n_phchrg: counts[1],
        n_phklus: counts[2],
        n_phwic: counts[3],
        n_phcrid: counts[4],
        n_phktrk: counts[5],
        n_phkelid: counts[6],
        n_mcpart: counts[7],
        reserved,
    })
}
