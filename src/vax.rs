//! VAX F_FLOAT → IEEE-754 conversion and the tick-count timestamp rule.
//!
//! Both functions are pure: they interpret already-extracted 32/64-bit words
//! and never touch a reader. The bulk of a JAZELLE file is VAX floats, so
//! [`vax_f32_to_ieee_bulk`] exists alongside the scalar form for the bank
//! decoders, which convert every float field of a record batch in one pass.

use chrono::NaiveDateTime;

/// Milliseconds between the VAX/Java-style 100ns-tick epoch this format uses
/// and the Unix epoch.
const EPOCH_SHIFT_MS: i64 = 3_506_716_800_730;

/// Converts a single VAX F_FLOAT word (as read from the file, i.e. still in
/// its on-disk middle-endian word order) to an IEEE-754 `f32`.
pub fn vax_f32_to_ieee(raw: u32) -> f32 {
    if raw == 0 {
        return 0.0;
    }

    // The two 16-bit halves are stored swapped relative to a plain
    // little-endian u32; un-swapping them is a 16-bit rotation.
    let w = raw.rotate_left(16);

    let sign = (w >> 15) & 0x1;
    let vax_exp = (w >> 7) & 0xFF;
    let mantissa_hi = w & 0x7F;
    let mantissa_lo = (w >> 16) & 0xFFFF;
    let mantissa = (mantissa_hi << 16) | mantissa_lo;

    let ieee_exp = vax_exp as i32 - 128 + 127;

    if ieee_exp <= 0 {
        return 0.0;
    }
    if ieee_exp >= 255 {
        return f32::from_bits((sign << 31) | (0xFFu32 << 23));
    }

    f32::from_bits((sign << 31) | ((ieee_exp as u32) << 23) | mantissa)
}

/// Converts a batch of VAX F_FLOAT words to IEEE-754 `f32`s. This is the
/// vectorized form bank decoders call after gathering every float field of a
/// record batch into one contiguous scratch buffer.
pub fn vax_f32_to_ieee_bulk(raw: &[u32]) -> Vec<f32> {
    raw.iter().copied().map(vax_f32_to_ieee).collect()
}

/// Converts a signed 64-bit count of 100-nanosecond ticks since the format's
/// proprietary epoch to a civil UTC timestamp.
pub fn ticks_to_timestamp(ticks: i64) -> NaiveDateTime {
    let ms = ticks.div_euclid(10_000);
    let unix_ms = ms - EPOCH_SHIFT_MS;
    let secs = unix_ms.div_euclid(1000);
    let millis = unix_ms.rem_euclid(1000);
    #[allow(deprecated)]
    NaiveDateTime::from_timestamp(secs, (millis * 1_000_000) as u32)
}
