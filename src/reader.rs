//! [`JazelleReader`]: the file-level header plus typed primitive reads,
//! layered on [`LogicalReader`].

use std::io::Read;

use crate::binary_parsing as bp;
use crate::error::JazelleError;
use crate::event::FileHeader;
use crate::logical::LogicalReader;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const MAGIC: &[u8; 8] = b"JAZELLE ";
const FILENAME_LEN: usize = 80;

pub(crate) struct JazelleReader<R> {
    logical: LogicalReader<R>,
    pub(crate) header: FileHeader,
}

impl<R: Read> JazelleReader<R> {
    pub(crate) fn new(reader: R) -> Result<Self> {
        let mut logical = LogicalReader::new(reader)?;

        let tag = logical.read(8)?;
        if tag.as_slice() != MAGIC {
            let mut found = [0u8; 8];
            found.copy_from_slice(&tag);
            return Err(JazelleError::BadMagic { found });
        }

        let ibmvax = bp::read_i32(&logical.read(4)?);
        let created = vax::ticks_to_timestamp(bp::read_i64(&logical.read(8)?));
        let modified = vax::ticks_to_timestamp(bp::read_i64(&logical.read(8)?));
        let nmod = bp::read_i32(&logical.read(4)?);
        let filename = bp::read_fixed_ascii(&logical.read(FILENAME_LEN)?);

        let header = FileHeader {
            ibmvax,
            created,
            modified,
            nmod,
            filename,
        };

        Ok(JazelleReader { logical, header })
    }

    pub(crate) fn read(&mut self, n: usize) -> Result<Vec<u8>> {
        self.logical.read(n)
    }

    pub(crate) fn read_i16(&mut self) -> Result<i16> {
        Ok(bp::read_i16(&self.read(2)?))
    }

    pub(crate) fn read_u16(&mut self) -> Result<u16> {
        Ok(bp::read_u16(&self.read(2)?))
    }

    pub(crate) fn read_i32(&mut self) -> Result<i32> {
        Ok(bp::read_i32(&self.read(4)?))
    }

    pub(crate) fn read_u32(&mut self) -> Result<u32> {
        Ok(bp::read_u32(&self.read(4)?))
    }

    pub(crate) fn read_i64(&mut self) -> Result<i64> {
        Ok(bp::read_i64(&self.read(8)?))
    }

    pub(crate) fn read_u64(&mut self) -> Result<u64> {
        Ok(bp::read_u64(&self.read(8)?))
    }

    pub(crate) fn read_vax_f32(&mut self) -> Result<f32> {
        Ok(vax::vax_f32_to_ieee(self.read_u32()?))
    }

    pub(crate) fn read_timestamp(&mut self) -> Result<chrono::NaiveDateTime> {
        Ok(vax::ticks_to_timestamp(self.read_i64()?))
    }

    pub(crate) fn read_string(&mut self, n: usize) -> Result<String> {
        Ok(bp::read_fixed_ascii(&self.read(n)?))
    }

    /// Reads one of the format's 8-byte name fields (`rectype`, `format`,
    /// `context`, `segment`, `usrnam`) as a [`crate::binary_parsing::FlexString`].
    pub(crate) fn read_flex_string(&mut self) -> Result<bp::FlexString> {
        Ok(bp::read_flex_ascii(&self.read(8)?))
    }

    pub(crate) fn next_logical_record(&mut self) -> Result<()> {
        self.logical.next_logical_record()
    }

    /// Advances one physical record within the current logical record. Used
    /// when a MINIDST record's `datrec` field says the data payload starts
    /// in the following physical fragment.
    pub(crate) fn next_physical_fragment(&mut self) -> Result<()> {
        self.logical.next_physical_fragment()
    }

    pub(crate) fn bytes_in_record(&self) -> u64 {
        self.logical.bytes_in_record()
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

    fn file_header_payload() -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(b"JAZELLE ");
        payload.extend_from_slice(&0i32.to_le_bytes()); // ibmvax
        payload.extend_from_slice(&0i64.to_le_bytes()); // created
        payload.extend_from_slice(&0i64.to_le_bytes()); // modified
        payload.extend_from_slice(&1i32.to_le_bytes()); // nmod
        let mut name = vec![b' '; FILENAME_LEN];
        name[..4].copy_from_slice(b"TEST");
        payload.extend_from_slice(&name);
        payload
    }

    #[test]
    fn parses_file_header_and_rejects_bad_magic() {
        let bytes = physical_record(0x0, &file_header_payload());
        let r = JazelleReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(r.header.filename, "TEST");

        let mut bad = file_header_payload();
        bad[0] = b'X';
        let bytes = physical_record(0x0, &bad);
        let err = JazelleReader::new(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, JazelleError::BadMagic { .. }));
    }
}
