//! The top-level driver: iterates logical records, dispatches on the
//! record's `usrnam`/`format` fields, validates the byte-offset checkpoints,
//! and yields one [`EventRecord`] per `IJEVHD` header + `MINIDST` payload
//! pair.

use std::io::Read;

use log::warn;

use crate::banks;
use crate::buffer::BufferReader;
use crate::error::{JazelleError, RecordError};
use crate::event::{EventHeader, EventRecord, JazelleRecordHeader};
use crate::reader::JazelleReader;

type Result<T> = std::result::Result<T, JazelleError>;

const MCHEAD_SIZE: usize = 20;
const IJEVHD: &str = "IJEVHD";
const MINIDST: &str = "MINIDST";

/// Drives a single [`JazelleReader`] to completion, yielding assembled
/// events. Strictly single-threaded and synchronous: all state (the pending
/// event header, the logical record counter) belongs to this one instance.
pub struct EventAssembler<R> {
    reader: JazelleReader<R>,
    pending: Option<EventHeader>,
    record_no: u64,
    other_records: u64,
}

impl<R: Read> EventAssembler<R> {
    pub fn new(reader: R) -> std::result::Result<Self, RecordError> {
        let reader = JazelleReader::new(reader).map_err(|e| e.at_record(0))?;
        Ok(EventAssembler {
            reader,
            pending: None,
            record_no: 0,
            other_records: 0,
        })
    }

    /// Count of logical records seen that were neither an `IJEVHD` header
    /// nor a `MINIDST` payload.
    pub fn other_records(&self) -> u64 {
        self.other_records
    }

    fn read_record_header(&mut self) -> Result<JazelleRecordHeader> {
        let record_number = self.reader.read_i32()?;
        let tag1 = self.reader.read_i32()?;
        let tag2 = self.reader.read_i32()?;
        let target = self.reader.read_i32()?;
        let rectype = self.reader.read_flex_string()?;
        let flag1 = self.reader.read_i32()?;
        let flag2 = self.reader.read_i32()?;
        let format = self.reader.read_flex_string()?;
        let context = self.reader.read_flex_string()?;
        let tocrec = self.reader.read_i32()?;
        let datrec = self.reader.read_i32()?;
        let tocsiz = self.reader.read_i32()?;
        let datsiz = self.reader.read_i32()?;
        let tocoff1 = self.reader.read_i32()?;
        let tocoff2 = self.reader.read_i32()?;
        let tocoff3 = self.reader.read_i32()?;
        let datoff = self.reader.read_i32()?;
        let segment = self.reader.read_flex_string()?;
        let usrnam = self.reader.read_flex_string()?;
        let usroff = self.reader.read_i32()?;
        let lr_flags = self.reader.read_i32()?;
        self.reader
            .read(JazelleRecordHeader::reserved_padding_len())?;

        Ok(JazelleRecordHeader {
            record_number,
            tag1,
            tag2,
            target,
            rectype,
            flag1,
            flag2,
            format,
            context,
            tocrec,
            datrec,
            tocsiz,
            datsiz,
            tocoff1,
            tocoff2,
            tocoff3,
            datoff,
            segment,
            usrnam,
            usroff,
            lr_flags,
        })
    }

    fn handle_header_record(&mut self, header: &JazelleRecordHeader) -> Result<()> {
        let at = self.reader.bytes_in_record();
        if at != header.usroff as u64 {
            return Err(JazelleError::OffsetMismatch {
                invariant: "usroff",
                expected: header.usroff as u64,
                found: at,
            });
        }

        let event_header = EventHeader {
            header: self.reader.read_i32()?,
            run: self.reader.read_i32()?,
            event: self.reader.read_i32()?,
            time: self.reader.read_timestamp()?,
            weight: self.reader.read_vax_f32()?,
            event_type: self.reader.read_i32()?,
            trigger_mask: self.reader.read_i32()?,
        };
        self.pending = Some(event_header);
        Ok(())
    }

    fn handle_data_record(&mut self, header: &JazelleRecordHeader) -> Result<Option<EventRecord>> {
        let at = self.reader.bytes_in_record();
        if at != header.tocoff1 as u64 {
            return Err(JazelleError::OffsetMismatch {
                invariant: "tocoff1",
                expected: header.tocoff1 as u64,
                found: at,
            });
        }

        let toc_raw = self.reader.read(banks::PHMTOC_RECORD_SIZE)?;
        let mut toc_buffer = BufferReader::new(&toc_raw);
        let toc = banks::parse_phmtoc(&mut toc_buffer)?;

        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => {
                warn!(
                    "record {}: MINIDST data record with no pending IJEVHD header, skipping",
                    self.record_no
                );
                return Ok(None);
            }
        };

        if header.datrec > 0 {
            self.reader.next_physical_fragment()?;
        }

        let at = self.reader.bytes_in_record();
        if at != header.datoff as u64 {
            return Err(JazelleError::OffsetMismatch {
                invariant: "datoff",
                expected: header.datoff as u64,
                found: at,
            });
        }

        let data = self.reader.read(header.datsiz as usize)?;
        let mut payload = BufferReader::new(&data);
        payload.skip(MCHEAD_SIZE, "MCHEAD")?;

        if toc.n_mcpart != 0 {
            return Err(JazelleError::UnsupportedContent {
                reason: "Monte Carlo banks are present (NMcPart > 0)",
            });
        }

        let particles = banks::parse_phpsum(&mut payload, toc.n_phpsum as usize)?;
        let tracks = banks::parse_phchrg(&mut payload, toc.n_phchrg as usize)?;
        let clusters = banks::parse_phklus(&mut payload, toc.n_phklus as usize)?;
        let wic = banks::parse_phwic(&mut payload, toc.n_phwic as usize)?;
        let crid = banks::parse_phcrid(&mut payload, toc.n_phcrid as usize)?;
        let kelid = banks::parse_phkelid(&mut payload, toc.n_phkelid as usize)?;
        let ktrk = banks::parse_phktrk(&mut payload, toc.n_phktrk as usize)?;

        Ok(Some(EventRecord {
            header: pending.header,
            run: pending.run,
            event: pending.event,
            time: pending.time,
            weight: pending.weight,
            event_type: pending.event_type,
            trigger_mask: pending.trigger_mask,
            particles,
            tracks,
            clusters,
            wic,
            crid,
            kelid,
            ktrk,
        }))
    }

    fn advance(&mut self) -> Option<Result<EventRecord>> {
        loop {
            match self.reader.next_logical_record() {
                Ok(()) => {}
                Err(JazelleError::UnexpectedEof {
                    while_reading: "next physical record header",
                }) => return None,
                Err(e) => return Some(Err(e)),
            }
            self.record_no += 1;

            let header = match self.read_record_header() {
                Ok(h) => h,
                Err(e) => return Some(Err(e)),
            };

            if header.usrnam == IJEVHD {
                if let Err(e) = self.handle_header_record(&header) {
                    return Some(Err(e));
                }
                continue;
            }

            if header.format == MINIDST {
                match self.handle_data_record(&header) {
                    Ok(Some(event)) => return Some(Ok(event)),
                    Ok(None) => continue,
                    Err(e) => return Some(Err(e)),
                }
            }

            self.other_records += 1;
        }
    }
}

impl<R: Read> Iterator for EventAssembler<R> {
    type Item = std::result::Result<EventRecord, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record_no = self.record_no;
        self.advance()
            .map(|result| result.map_err(|e| e.at_record(record_no)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FILENAME_LEN: usize = 80;

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

    fn file_header_record() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"JAZELLE ");
        payload.extend_from_slice(&0i32.to_le_bytes()); // ibmvax
        payload.extend_from_slice(&0i64.to_le_bytes()); // created
        payload.extend_from_slice(&0i64.to_le_bytes()); // modified
        payload.extend_from_slice(&0i32.to_le_bytes()); // nmod
        payload.extend_from_slice(&[b' '; FILENAME_LEN]);
        physical_record(0x0, &payload)
    }

    fn flex(s: &str) -> Vec<u8> {
        let mut v = s.as_bytes().to_vec();
        v.resize(8, b' ');
        v
    }

    /// Builds one `IJEVHD` record header with a caller-chosen `usroff`, so a
    /// mismatch against the true byte offset can be forced deliberately.
    fn ijevhd_record(usroff: i32) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&0i32.to_le_bytes()); // record_number
        payload.extend_from_slice(&0i32.to_le_bytes()); // tag1
        payload.extend_from_slice(&0i32.to_le_bytes()); // tag2
        payload.extend_from_slice(&0i32.to_le_bytes()); // target
        payload.extend_from_slice(&flex("")); // rectype
        payload.extend_from_slice(&0i32.to_le_bytes()); // flag1
        payload.extend_from_slice(&0i32.to_le_bytes()); // flag2
        payload.extend_from_slice(&flex("")); // format
        payload.extend_from_slice(&flex("")); // context
        payload.extend_from_slice(&0i32.to_le_bytes()); // tocrec
        payload.extend_from_slice(&0i32.to_le_bytes()); // datrec
        payload.extend_from_slice(&0i32.to_le_bytes()); // tocsiz
        payload.extend_from_slice(&0i32.to_le_bytes()); // datsiz
        payload.extend_from_slice(&0i32.to_le_bytes()); // tocoff1
        payload.extend_from_slice(&0i32.to_le_bytes()); // tocoff2
        payload.extend_from_slice(&0i32.to_le_bytes()); // tocoff3
        payload.extend_from_slice(&0i32.to_le_bytes()); // datoff
        payload.extend_from_slice(&flex("")); // segment
        payload.extend_from_slice(&flex(IJEVHD)); // usrnam
        payload.extend_from_slice(&usroff.to_le_bytes()); // usroff
        payload.extend_from_slice(&0i32.to_le_bytes()); // lr_flags
        payload.extend_from_slice(&vec![0u8; JazelleRecordHeader::reserved_padding_len()]);
        physical_record(0x0, &payload)
    }

    /// The `usroff` checkpoint must match the byte offset actually reached
    /// by the time the `IJEVHD` payload is about to be read, counting the
    /// 4-byte logical header consumed at the start of the fragment.
    #[test]
    fn wrong_usroff_surfaces_offset_mismatch() {
        let true_usroff = 4 + JazelleRecordHeader::SIZE as i32;

        let mut bytes = file_header_record();
        bytes.extend(ijevhd_record(true_usroff + 1));
        let mut assembler = EventAssembler::new(Cursor::new(bytes)).unwrap();

        let err = assembler.next().unwrap().unwrap_err();
        match err.source {
            JazelleError::OffsetMismatch {
                invariant: "usroff",
                expected,
                found,
            } => {
                assert_eq!(expected, (true_usroff + 1) as u64);
                assert_eq!(found, true_usroff as u64);
            }
            other => panic!("wrong error variant: {other:?}"),
        }
    }
}
