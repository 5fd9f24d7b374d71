use thiserror::Error;

/// Crate errors.
///
/// Every variant carries enough context (record number, bank name, field
/// position) that a caller can report the first fault without re-deriving
/// where in the stream it happened.
#[derive(Error, Debug)]
pub enum JazelleError {
    #[error("file does not start with the JAZELLE tag, found {found:?}")]
    BadMagic { found: [u8; 8] },

    #[error("unexpected end of file while reading {while_reading}")]
    UnexpectedEof { while_reading: &'static str },

    #[error("sync fault 1: logical header flags {flags:#06x} set bits outside 0x3")]
    SyncFault1 { flags: u16 },

    #[error(
        "sync fault 2: continuation bit disagrees with prior fragment (expected {expected}, found {found})"
    )]
    SyncFault2 { expected: bool, found: bool },

    #[error("offset mismatch on {invariant}: expected {expected}, found {found}")]
    OffsetMismatch {
        invariant: &'static str,
        expected: u64,
        found: u64,
    },

    #[error("buffer underflow decoding {bank}: needed {needed} bytes, {remaining} remaining")]
    BufferUnderflow {
        bank: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("unsupported content: {reason}")]
    UnsupportedContent { reason: &'static str },

    #[error("bad value for {field}: {value}")]
    BadValue { field: &'static str, value: i64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JazelleError {
    /// Attaches the logical record number a fault was discovered at, by
    /// folding it into the message of variants that don't already name a
    /// position of their own. Used by `EventAssembler` so every surfaced
    /// error names the record it happened on, per the propagation policy.
    pub fn at_record(self, record_no: u64) -> RecordError {
        RecordError {
            record_no,
            source: self,
        }
    }
}

/// A `JazelleError` tagged with the logical record number it was raised at.
#[derive(Error, Debug)]
#[error("record {record_no}: {source}")]
pub struct RecordError {
    pub record_no: u64,
    #[source]
    pub source: JazelleError,
}

pub(crate) type Result<T> = std::result::Result<T, JazelleError>;
