//! The record-header and event-level types used by [`crate::reader::JazelleReader`]
//! and [`crate::assembler::EventAssembler`]: the file header, the per-record
//! user-level header, the `IJEVHD` event-metadata payload, and the assembled
//! `EventRecord` the assembler yields.

use serde::Serialize;

use crate::banks::{
    PhchrgRecord, PhcridRecord, PhkelidRecord, PhklusRecord, PhktrkRecord, PhpsumRecord,
    PhwicRecord,
};
use crate::binary_parsing::FlexString;

/// The file-level header: the literal `JAZELLE` tag plus bookkeeping fields.
/// Not retained past construction beyond `ibmvax`, which is captured but
/// unused downstream.
#[derive(Debug)]
pub struct FileHeader {
    pub ibmvax: i32,
    pub created: chrono::NaiveDateTime,
    pub modified: chrono::NaiveDateTime,
    pub nmod: i32,
    pub filename: String,
}

/// The 124-byte user-level record header that follows every logical header.
///
/// The source material names 16 `i32` scalar fields, five 8-byte strings,
/// and "two spare words", which sums to 104 named bytes against a
/// documented 124-byte total. The exact intra-record byte offsets and the
/// contents of the remaining 20 bytes aren't pinned down by any surviving
/// reference implementation; this decoder reads the named fields in their
/// documented order and discards the rest as reserved padding.
#[derive(Debug)]
pub struct JazelleRecordHeader {
    pub record_number: i32,
    pub tag1: i32,
    pub tag2: i32,
    pub target: i32,
    pub rectype: FlexString,
    pub flag1: i32,
    pub flag2: i32,
    pub format: FlexString,
    pub context: FlexString,
    pub tocrec: i32,
    pub datrec: i32,
    pub tocsiz: i32,
    pub datsiz: i32,
    pub tocoff1: i32,
    pub tocoff2: i32,
    pub tocoff3: i32,
    pub datoff: i32,
    pub segment: FlexString,
    pub usrnam: FlexString,
    pub usroff: i32,
    pub lr_flags: i32,
}

impl JazelleRecordHeader {
    pub(crate) const SIZE: usize = 124;
    /// Bytes consumed by the 16 named `i32` fields and 5 named 8-byte
    /// strings above; the rest (the source's "two spare words" plus
    /// unaccounted slack) is read and discarded as reserved padding.
    const NAMED_FIELD_BYTES: usize = 16 * 4 + 5 * 8;

    pub(crate) fn reserved_padding_len() -> usize {
        Self::SIZE - Self::NAMED_FIELD_BYTES
    }
}

/// The `IJEVHD` payload: per-event metadata that precedes the MINIDST data
/// record it describes.
#[derive(Debug, Clone, Serialize)]
pub struct EventHeader {
    pub header: i32,
    pub run: i32,
    pub event: i32,
    pub time: chrono::NaiveDateTime,
    pub weight: f32,
    pub event_type: i32,
    pub trigger_mask: i32,
}

impl EventHeader {
    pub(crate) const SIZE: usize = 32;
}

/// One fully assembled event: the flat header fields plus every bank's
/// decoded records.
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    pub header: i32,
    pub run: i32,
    pub event: i32,
    pub time: chrono::NaiveDateTime,
    pub weight: f32,
    pub event_type: i32,
    pub trigger_mask: i32,
    pub particles: Vec<PhpsumRecord>,
    pub tracks: Vec<PhchrgRecord>,
    pub clusters: Vec<PhklusRecord>,
    pub wic: Vec<PhwicRecord>,
    pub crid: Vec<PhcridRecord>,
    pub kelid: Vec<PhkelidRecord>,
    pub ktrk: Vec<PhktrkRecord>,
}
