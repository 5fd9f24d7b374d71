//! The logical record framer layered on [`PhysicalReader`]: glues physical
//! fragments into one logical record via the continuation bit, and enforces
//! the two synchronization invariants of the format's framing rules.

use std::io::Read;

use log::debug;

use crate::binary_parsing as bp;
use crate::error::JazelleError;
use crate::physical::PhysicalReader;

type Result<T> = std::result::Result<T, JazelleError>;

pub(crate) struct LogicalReader<R> {
    physical: PhysicalReader<R>,
    expect_continuation: bool,
}

impl<R: Read> LogicalReader<R> {
    pub(crate) fn new(reader: R) -> Result<Self> {
        let physical = PhysicalReader::new(reader)?;
        let mut logical = LogicalReader {
            physical,
            expect_continuation: false,
        };
        logical.read_logical_header()?;
        Ok(logical)
    }

    /// Reads and validates the 4-byte logical header that follows every
    /// physical header, including the very first one.
    fn read_logical_header(&mut self) -> Result<()> {
        let header = self.physical.read(4)?;
        let logical_len = bp::read_i16(&header[0..2]);
        if logical_len < 0 {
            return Err(JazelleError::BadValue {
                field: "logical record length",
                value: logical_len as i64,
            });
        }
        let flags = bp::read_u16(&header[2..4]);
        if flags & !0x3 != 0 {
            return Err(JazelleError::SyncFault1 { flags });
        }

        let is_continuation = flags & 0x2 != 0;
        if is_continuation != self.expect_continuation {
            return Err(JazelleError::SyncFault2 {
                expected: self.expect_continuation,
                found: is_continuation,
            });
        }

        self.expect_continuation = flags & 0x1 != 0;
        debug!(
            target: "logical framing",
            "logical header read: {} payload bytes, flags {:#06x}, continues {}",
            logical_len, flags, self.expect_continuation
        );
        Ok(())
    }

    /// Reads `n` bytes of logical payload, crossing physical boundaries and
    /// re-validating the logical header at each one it crosses.
    pub(crate) fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        let mut needed = n;
        while needed > 0 {
            if self.physical.remaining() == 0 {
                self.physical.next_physical_record()?;
                self.read_logical_header()?;
                continue;
            }
            let take = (self.physical.remaining() as usize).min(needed);
            out.extend_from_slice(&self.physical.read(take)?);
            needed -= take;
        }
        Ok(out)
    }

    /// Advances one physical record and re-validates the logical header that
    /// follows it, without regard to `expect_continuation`. Used by
    /// `EventAssembler` when a MINIDST record's data payload is known to
    /// start in the next physical fragment of the same logical record.
    pub(crate) fn next_physical_fragment(&mut self) -> Result<()> {
        self.physical.next_physical_record()?;
        self.read_logical_header()
    }

    /// Advances past any remaining continuation fragments of the current
    /// logical record, then one more physical record to begin the next one.
    pub(crate) fn next_logical_record(&mut self) -> Result<()> {
        while self.expect_continuation {
            self.next_physical_fragment()?;
        }
        self.next_physical_fragment()
    }

    pub(crate) fn bytes_in_record(&self) -> u64 {
        self.physical.bytes_in_record()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn physical_record(logical_flags: u16, payload: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(&(payload.len() as i16).to_le_bytes());
        body.extend_from_slice(&logical_flags.to_le_bytes());
        body.extend_from_slice(payload);

        let mut v = Vec::new();
        v.extend_from_slice(&((body.len() + 4) as u16).to_le_bytes());
        v.extend_from_slice(&0u16.to_le_bytes());
        v.extend_from_slice(&body);
        v
    }

    #[test]
    fn continuation_across_three_fragments_concatenates_payloads() {
        let mut bytes = physical_record(0x1, b"one-");
        bytes.extend(physical_record(0x3, b"two-"));
        bytes.extend(physical_record(0x2, b"three"));

        let mut r = LogicalReader::new(Cursor::new(bytes)).unwrap();
        let payload = r.read(13).unwrap();
        assert_eq!(payload, b"one-two-three");
    }

    #[test]
    fn sync_fault_1_on_unknown_flag_bits() {
        let bytes = physical_record(0x4, b"x");
        let err = LogicalReader::new(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, JazelleError::SyncFault1 { flags: 0x4 }));
    }

    #[test]
    fn sync_fault_2_on_continuation_mismatch() {
        // First fragment doesn't set "continues"; second claims to be a
        // continuation anyway.
        let mut bytes = physical_record(0x0, b"x");
        bytes.extend(physical_record(0x2, b"y"));
        let mut r = LogicalReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(r.read(1).unwrap(), b"x");
        let err = r.next_logical_record().unwrap_err();
        assert!(matches!(err, JazelleError::SyncFault2 { .. }));
    }
}
