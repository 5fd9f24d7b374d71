//! The physical record framer: a length-prefixed byte frame with seamless
//! reads across frame boundaries.

use std::io::Read;

use log::debug;

use crate::binary_parsing as bp;
use crate::error::JazelleError;

type Result<T> = std::result::Result<T, JazelleError>;

/// Fills `buf` completely, distinguishing a clean end-of-file (zero bytes
/// read before anything was filled) from a mid-read truncation. Returns
/// `Ok(false)` only for the clean case; any partial fill is a fatal
/// `UnexpectedEof` from the caller's point of view.
fn fill_or_clean_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(false);
            }
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "truncated mid physical record header",
            ));
        }
        filled += n;
    }
    Ok(true)
}

/// Consumes a raw byte source and exposes a record-bounded read interface:
/// callers ask for `n` bytes and get exactly `n`, with physical record
/// headers consumed transparently in between.
pub(crate) struct PhysicalReader<R> {
    reader: R,
    record_len: u64,
    bytes_in_record: u64,
}

impl<R: Read> PhysicalReader<R> {
    pub(crate) fn new(mut reader: R) -> Result<Self> {
        let mut header = [0u8; 4];
        let filled = fill_or_clean_eof(&mut reader, &mut header)?;
        if !filled {
            return Err(JazelleError::UnexpectedEof {
                while_reading: "first physical record header",
            });
        }
        let record_len = Self::payload_len(&header)?;
        Ok(PhysicalReader {
            reader,
            record_len,
            bytes_in_record: 0,
        })
    }

    fn payload_len(header: &[u8; 4]) -> Result<u64> {
        let length = bp::read_u16(&header[0..2]) as u64;
        // header[2..4] is the reserved word; read and discarded.
        length.checked_sub(4).ok_or(JazelleError::BadValue {
            field: "physical record length",
            value: length as i64,
        })
    }

    /// Reads the next physical header, returning `Ok(false)` only when the
    /// prior record ended exactly at a clean end-of-file.
    fn advance_header(&mut self) -> Result<bool> {
        let mut header = [0u8; 4];
        let filled = fill_or_clean_eof(&mut self.reader, &mut header)?;
        if !filled {
            return Ok(false);
        }
        self.record_len = Self::payload_len(&header)?;
        self.bytes_in_record = 0;
        debug!(
            target: "physical framing",
            "advanced to next physical record, payload {} bytes",
            self.record_len
        );
        Ok(true)
    }

    /// Bytes left unread in the current physical record.
    pub(crate) fn remaining(&self) -> u64 {
        self.record_len - self.bytes_in_record
    }

    /// Seeks over any unread tail of the current physical record, then reads
    /// the next physical header. Fails with `UnexpectedEof` unless this lands
    /// on a clean end-of-file.
    pub(crate) fn next_physical_record(&mut self) -> Result<()> {
        let tail = self.remaining() as usize;
        if tail > 0 {
            self.read(tail)?;
        }
        if !self.advance_header()? {
            return Err(JazelleError::UnexpectedEof {
                while_reading: "next physical record header",
            });
        }
        Ok(())
    }

    /// Reads exactly `n` bytes, crossing into as many following physical
    /// records as needed and transparently consuming their headers. This is
    /// the low-level contract; the logical layer never actually exercises
    /// the crossing path itself, since it needs to re-validate the logical
    /// header that follows each physical boundary, but the capability is
    /// part of `PhysicalReader`'s own contract regardless of who is above
    /// it.
    pub(crate) fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(n);
        let mut needed = n;
        while needed > 0 {
            if self.remaining() == 0 {
                if !self.advance_header()? {
                    return Err(JazelleError::UnexpectedEof {
                        while_reading: "physical record payload",
                    });
                }
                continue;
            }
            let take = (self.remaining() as usize).min(needed);
            let mut chunk = vec![0u8; take];
            self.reader.read_exact(&mut chunk).map_err(|e| {
                if e.kind() == std::io::ErrorKind::UnexpectedEof {
                    JazelleError::UnexpectedEof {
                        while_reading: "physical record payload",
                    }
                } else {
                    JazelleError::Io(e)
                }
            })?;
            out.extend_from_slice(&chunk);
            self.bytes_in_record += take as u64;
            needed -= take;
        }
        Ok(out)
    }

    pub(crate) fn bytes_in_record(&self) -> u64 {
        self.bytes_in_record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn physical_record(payload: &[u8]) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&((payload.len() + 4) as u16).to_le_bytes());
        v.extend_from_slice(&0u16.to_le_bytes());
        v.extend_from_slice(payload);
        v
    }

    #[test]
    fn reads_within_a_single_record() {
        let bytes = physical_record(b"hello!!!");
        let mut r = PhysicalReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(r.read(5).unwrap(), b"hello");
        assert_eq!(r.bytes_in_record(), 5);
    }

    #[test]
    fn reads_cross_physical_boundaries_transparently() {
        let mut bytes = physical_record(b"abc");
        bytes.extend(physical_record(b"defgh"));
        let mut r = PhysicalReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(r.read(6).unwrap(), b"abcdef");
    }

    #[test]
    fn clean_eof_at_boundary_vs_truncation() {
        let bytes = physical_record(b"ok");
        let mut r = PhysicalReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(r.read(2).unwrap(), b"ok");
        assert!(matches!(
            r.next_physical_record(),
            Err(JazelleError::UnexpectedEof { .. })
        ));

        let truncated = physical_record(b"ok")[..5].to_vec();
        let mut r2 = PhysicalReader::new(Cursor::new(truncated)).unwrap();
        assert!(matches!(r2.read(2), Err(JazelleError::UnexpectedEof { .. })));
    }
}
