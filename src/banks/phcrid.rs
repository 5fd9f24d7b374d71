use serde::Serialize;

use crate::binary_parsing as bp;
use crate::buffer::BufferReader;
use crate::error::JazelleError;
use crate::vax;

type Result<T> = std::result::Result<T, JazelleError>;

const BANK: &str = "PHCRID";
const HEADER_SIZE: usize = 16;
const FULL_SIZE: usize = 36;
const SHORT_SIZE: usize = 4;
const N_LOGLIK: usize = 5;

const LIQUID_FULL_BIT: i32 = 0x1_0000;
const GAS_FULL_BIT: i32 = 0x2_0000;

/// One CRIDHYP hypothesis block: either the full 36-byte fit result or the
/// 4-byte short form written when the corresponding control bit is clear.
#[derive(Debug, Clone, Serialize)]
pub enum Cridhyp {
    Full {
        loglik: [f32; N_LOGLIK],
        rc: i16,
        nhits: i16,
        besthyp: i32,
        nhexp: i16,
        nhfnd: i16,
        nhbkg: i16,
        mskphot: i16,
    },
    Short {
        rc: i16,
        nhits: i16,
    },
}

impl Cridhyp {
    fn loglik(&self) -> Option<&[f32; N_LOGLIK]> {
        match self {
            Cridhyp::Full { loglik, .. } => Some(loglik),
            Cridhyp::Short { .. } => None,
        }
    }
}

/// A particle-identification record: the liquid and gas Cherenkov hypothesis
/// blocks plus the combined five-species log-likelihood vector (PIDVEC).
#[derive(Debug, Clone, Serialize)]
pub struct PhcridRecord {
    pub id: i32,
    pub norm: f32,
    pub rc: i16,
    pub geom: i16,
    pub trkp: i16,
    pub nhits: i16,
    pub liquid: Cridhyp,
    pub gas: Cridhyp,
    /// PIDVEC: (electron, muon, pion, kaon, proton).
    pub pidvec: [f32; N_LOGLIK],
}

pub(crate) fn parse(buffer: &mut BufferReader, n: usize) -> Result<Vec<PhcridRecord>> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        out.push(parse_one(buffer)?);
    }
    Ok(out)
}

fn parse_one(buffer: &mut BufferReader) -> Result<PhcridRecord> {
    let header = buffer.read(HEADER_SIZE, BANK)?;
    let id = bp::read_i32(&header[0..4]);
    let norm = vax::vax_f32_to_ieee(bp::read_u32(&header[4..8]));
    let rc = bp::read_i16(&header[8..10]);
    let geom = bp::read_i16(&header[10..12]);
    let trkp = bp::read_i16(&header[12..14]);
    let nhits = bp::read_i16(&header[14..16]);

    let liquid = parse_hypothesis(buffer, id & LIQUID_FULL_BIT != 0)?;
    let gas = parse_hypothesis(buffer, id & GAS_FULL_BIT != 0)?;

    let mut pidvec = [norm; N_LOGLIK];
    if let Some(loglik) = liquid.loglik() {
        for (v, l) in pidvec.iter_mut().zip(loglik.iter()) {
            *v += l;
        }
    }
    if let Some(loglik) = gas.loglik() {
        for (v, l) in pidvec.iter_mut().zip(loglik.iter()) {
            *v += l;
        }
    }

    Ok(PhcridRecord {
        id,
        norm,
        rc,
        geom,
        trkp,
        nhits,
        liquid,
        gas,
        pidvec,
    })
}

fn parse_hypothesis(buffer: &mut BufferReader, is_full: bool) -> Result<Cridhyp> {
    if is_full {
        let raw = buffer.read(FULL_SIZE, BANK)?;
        let mut loglik = [0.0f32; N_LOGLIK];
        for (i, v) in loglik.iter_mut().enumerate() {
            let off = i * 4;
            *v = vax::vax_f32_to_ieee(bp::read_u32(&raw[off..off + 4]));
        }
        let rc = bp::read_i16(&raw[20..22]);
        let nhits = bp::read_i16(&raw[22..24]);
        let besthyp = bp::read_i32(&raw[24..28]);
        let nhexp = bp::read_i16(&raw[28..30]);
        let nhfnd = bp::read_i16(&raw[30..32]);
        let nhbkg = bp::read_i16(&raw[32..34]);
        let mskphot = bp::read_i16(&raw[34..36]);
        Ok(Cridhyp::Full {
            loglik,
            rc,
            nhits,
            besthyp,
            nhexp,
            nhfnd,
            nhbkg,
            mskphot,
        })
    } else {
        let raw = buffer.read(SHORT_SIZE, BANK)?;
        Ok(Cridhyp::Short {
            rc: bp::read_i16(&raw[0..2]),
            nhits: bp::read_i16(&raw[2..4]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_vax(value: f32) -> u32 {
        let bits = value.to_bits();
        let sign = (bits >> 31) & 0x1;
        let ieee_exp = (bits >> 23) & 0xFF;
        let mantissa = bits & 0x7F_FFFF;
        let vax_exp = ieee_exp as i32 - 127 + 128;
        let mantissa_hi = mantissa >> 16;
        let mantissa_lo = mantissa & 0xFFFF;
        let w = (sign << 15) | ((vax_exp as u32) << 7) | mantissa_hi | (mantissa_lo << 16);
        w.rotate_right(16)
    }

    fn header(id: i32, norm: f32) -> Vec<u8> {
        let mut v = Vec::new();
        v.extend_from_slice(&id.to_le_bytes());
        v.extend_from_slice(&encode_vax(norm).to_le_bytes());
        v.extend_from_slice(&0i16.to_le_bytes()); // rc
        v.extend_from_slice(&0i16.to_le_bytes()); // geom
        v.extend_from_slice(&0i16.to_le_bytes()); // trkp
        v.extend_from_slice(&0i16.to_le_bytes()); // nhits
        v
    }

    fn full_block(loglik: [f32; N_LOGLIK]) -> Vec<u8> {
        let mut v = Vec::new();
        for value in loglik {
            v.extend_from_slice(&encode_vax(value).to_le_bytes());
        }
        v.extend_from_slice(&0i16.to_le_bytes()); // rc
        v.extend_from_slice(&0i16.to_le_bytes()); // nhits
        v.extend_from_slice(&0i32.to_le_bytes()); // besthyp
        v.extend_from_slice(&0i16.to_le_bytes()); // nhexp
        v.extend_from_slice(&0i16.to_le_bytes()); // nhfnd
        v.extend_from_slice(&0i16.to_le_bytes()); // nhbkg
        v.extend_from_slice(&0i16.to_le_bytes()); // mskphot
        assert_eq!(v.len(), FULL_SIZE);
        v
    }

    fn short_block() -> Vec<u8> {
        vec![0u8; SHORT_SIZE]
    }

    #[test]
    fn liquid_only_consumes_56_bytes_and_adds_liquid_loglik() {
        let loglik_liq = [1.0f32, 2.0, 3.0, 4.0, 5.0];
        let mut raw = header(LIQUID_FULL_BIT, 10.0);
        raw.extend(full_block(loglik_liq));
        raw.extend(short_block());
        assert_eq!(raw.len(), 56);

        let mut buffer = BufferReader::new(&raw);
        let records = parse(&mut buffer, 1).unwrap();
        let r = &records[0];
        assert_eq!(r.pidvec, [11.0, 12.0, 13.0, 14.0, 15.0]);
        assert!(matches!(r.liquid, Cridhyp::Full { .. }));
        assert!(matches!(r.gas, Cridhyp::Short { .. }));
    }

    #[test]
    fn both_full_consumes_88_bytes_and_adds_both() {
        let loglik_liq = [1.0f32, 1.0, 1.0, 1.0, 1.0];
        let loglik_gas = [2.0f32, 2.0, 2.0, 2.0, 2.0];
        let mut raw = header(LIQUID_FULL_BIT | GAS_FULL_BIT, 0.0);
        raw.extend(full_block(loglik_liq));
        raw.extend(full_block(loglik_gas));
        assert_eq!(raw.len(), 88);

        let mut buffer = BufferReader::new(&raw);
        let records = parse(&mut buffer, 1).unwrap();
        assert_eq!(records[0].pidvec, [3.0, 3.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn neither_full_consumes_24_bytes_and_yields_norm_only() {
        let mut raw = header(0, 7.0);
        raw.extend(short_block());
        raw.extend(short_block());
        assert_eq!(raw.len(), 24);

        let mut buffer = BufferReader::new(&raw);
        let records = parse(&mut buffer, 1).unwrap();
        assert_eq!(records[0].pidvec, [7.0, 7.0, 7.0, 7.0, 7.0]);
    }

    #[test]
    fn underflow_mid_record() {
        let raw = header(LIQUID_FULL_BIT, 0.0);
        let mut buffer = BufferReader::new(&raw);
        assert!(parse(&mut buffer, 1).is_err());
    }
}
