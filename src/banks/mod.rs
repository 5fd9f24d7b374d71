//! Typed bank decoders. Each submodule decodes exactly one MINIDST bank type
//! into a `Vec` of its own record struct: strongly typed records per bank,
//! no runtime polymorphism, since `EventAssembler` always knows statically
//! which decoder a PHMTOC count belongs to.
//!
//! The fixed-width banks (everything but PHCRID) share one shape: validate
//! the whole record batch is present, gather every VAX float field across
//! the batch into one scratch buffer, convert it in a single vectorized
//! call, then scatter the results back into the output structs alongside
//! the plain integer fields. PHCRID is parsed record-by-record instead,
//! since its length depends on a control word inside each record.

mod phchrg;
mod phcrid;
mod phkelid;
mod phklus;
mod phktrk;
mod phmtoc;
mod phpsum;
mod phwic;

pub use phchrg::PhchrgRecord;
pub use phcrid::{Cridhyp, PhcridRecord};
pub use phkelid::PhkelidRecord;
pub use phklus::PhklusRecord;
pub use phktrk::PhktrkRecord;
pub use phmtoc::{Phmtoc, RECORD_SIZE as PHMTOC_RECORD_SIZE};
pub use phpsum::PhpsumRecord;
pub use phwic::PhwicRecord;

pub(crate) use phchrg::parse as parse_phchrg;
pub(crate) use phcrid::parse as parse_phcrid;
pub(crate) use phkelid::parse as parse_phkelid;
pub(crate) use phklus::parse as parse_phklus;
pub(crate) use phktrk::parse as parse_phktrk;
pub(crate) use phmtoc::parse as parse_phmtoc;
pub(crate) use phpsum::parse as parse_phpsum;
pub(crate) use phwic::parse as parse_phwic;

use crate::buffer::BufferReader;
use crate::error::JazelleError;

type Result<T> = std::result::Result<T, JazelleError>;

/// Validates that `n` fixed-width records of `record_size` bytes are
/// present, then returns the raw slice covering all of them in one read.
fn take_batch<'a>(
    buffer: &mut BufferReader<'a>,
    bank: &'static str,
    n: usize,
    record_size: usize,
) -> Result<&'a [u8]> {
    buffer.read(n * record_size, bank)
}
