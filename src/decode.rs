/*
 * This file is part of Smctherm.
 *
 * Copyright (C) 2026 Smctherm contributors
 *
 * Smctherm is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Smctherm is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Smctherm. If not, see <https://www.gnu.org/licenses/>.
 */

//! Pure decoding of raw SMC payloads into numbers.
//!
//! The SMC reports every value as a 4-character type tag plus up to 32 raw
//! bytes. This module maps the closed set of known encodings to `f64`.
//! Anything outside that set decodes to exactly 0.0; existing tooling relies
//! on range filtering downstream to reject those, so an unknown encoding is
//! not an error here.

use crate::types::{tags, RawValue, SmcBytes, TypeTag, SMC_BYTES_LEN};

/// Unsigned fixed-point encodings: big-endian u16 divided by a per-format
/// power of two.
const FP_SCALES: [(TypeTag, f64); 9] = [
    (tags::FP1F, 32768.0),
    (tags::FP4C, 4096.0),
    (tags::FP5B, 2048.0),
    (tags::FP6A, 1024.0),
    (tags::FP79, 512.0),
    (tags::FP88, 256.0),
    (tags::FPA6, 64.0),
    (tags::FPC4, 16.0),
    (tags::FPE2, 4.0),
];

/// Signed fixed-point encodings: big-endian i16 divided by a per-format
/// power of two.
const SP_SCALES: [(TypeTag, f64); 10] = [
    (tags::SP1E, 16384.0),
    (tags::SP3C, 4096.0),
    (tags::SP4B, 2048.0),
    (tags::SP5A, 1024.0),
    (tags::SP69, 512.0),
    (tags::SP78, 256.0),
    (tags::SP87, 128.0),
    (tags::SP96, 64.0),
    (tags::SPB4, 16.0),
    (tags::SPF0, 1.0),
];

fn scale_for(tag: TypeTag, table: &[(TypeTag, f64)]) -> Option<f64> {
    table.iter().find(|(t, _)| *t == tag).map(|(_, s)| *s)
}

fn be_u16(bytes: &SmcBytes) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

fn be_i16(bytes: &SmcBytes) -> i16 {
    i16::from_be_bytes([bytes[0], bytes[1]])
}

/// Big-endian unsigned integer over the first `size` bytes. Also used for the
/// reserved `#KEY` count register, whatever type it declares.
pub fn unsigned_from_be(size: u32, bytes: &SmcBytes) -> u64 {
    let n = (size as usize).min(SMC_BYTES_LEN);
    bytes[..n]
        .iter()
        .fold(0u64, |acc, &b| acc.wrapping_mul(256).wrapping_add(u64::from(b)))
}

/// Decode one payload according to its declared type tag and size.
///
/// Pure and deterministic. Any (tag, size) combination outside the known set
/// yields 0.0; callers cannot distinguish that from a true zero here and must
/// apply validity filtering themselves.
pub fn decode(tag: TypeTag, size: u32, bytes: &SmcBytes) -> f64 {
    if tag == tags::UI8 || tag == tags::UI16 || tag == tags::UI32 || tag == tags::UI64 {
        return unsigned_from_be(size, bytes) as f64;
    }
    if tag == tags::FLT {
        // Deliberately native byte order, no swap: matches the original
        // tooling bit-for-bit.
        return f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64;
    }
    if size == 2 {
        if let Some(scale) = scale_for(tag, &FP_SCALES) {
            return f64::from(be_u16(bytes)) / scale;
        }
        if let Some(scale) = scale_for(tag, &SP_SCALES) {
            return f64::from(be_i16(bytes)) / scale;
        }
        if tag == tags::SI16 {
            return f64::from(be_i16(bytes));
        }
        if tag == tags::PWM {
            return f64::from(be_u16(bytes)) * 100.0 / 65536.0;
        }
    }
    if tag == tags::SI8 && size == 1 {
        return f64::from(bytes[0] as i8);
    }
    0.0
}

/// Convenience for a full register read.
pub fn decode_raw(val: &RawValue) -> f64 {
    decode(val.data_type, val.size, &val.bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::bytes_from;
    use crate::types::tags;

    #[test]
    fn test_sp78_quarter_degree() {
        // 0x1900 = 6400, /256 = 25.0 exactly.
        assert_eq!(decode(tags::SP78, 2, &bytes_from(&[0x19, 0x00])), 25.0);
    }

    #[test]
    fn test_sp78_sign_extends() {
        // 0xFF00 as i16 = -256, /256 = -1.0.
        assert_eq!(decode(tags::SP78, 2, &bytes_from(&[0xFF, 0x00])), -1.0);
    }

    #[test]
    fn test_fp88_half_scale() {
        // 0x8000 = 32768, /256 = 128.0 since fp formats stay unsigned.
        assert_eq!(decode(tags::FP88, 2, &bytes_from(&[0x80, 0x00])), 128.0);
    }

    #[test]
    fn test_all_fp_scales() {
        let expected = [
            (tags::FP1F, 32768.0),
            (tags::FP4C, 4096.0),
            (tags::FP5B, 2048.0),
            (tags::FP6A, 1024.0),
            (tags::FP79, 512.0),
            (tags::FP88, 256.0),
            (tags::FPA6, 64.0),
            (tags::FPC4, 16.0),
            (tags::FPE2, 4.0),
        ];
        // 0x0100 = 256 before scaling.
        for (tag, scale) in expected {
            assert_eq!(decode(tag, 2, &bytes_from(&[0x01, 0x00])), 256.0 / scale);
        }
    }

    #[test]
    fn test_all_sp_scales() {
        let expected = [
            (tags::SP1E, 16384.0),
            (tags::SP3C, 4096.0),
            (tags::SP4B, 2048.0),
            (tags::SP5A, 1024.0),
            (tags::SP69, 512.0),
            (tags::SP78, 256.0),
            (tags::SP87, 128.0),
            (tags::SP96, 64.0),
            (tags::SPB4, 16.0),
            (tags::SPF0, 1.0),
        ];
        for (tag, scale) in expected {
            assert_eq!(decode(tag, 2, &bytes_from(&[0x01, 0x00])), 256.0 / scale);
            // Top bit set must go negative in every signed format.
            assert!(decode(tag, 2, &bytes_from(&[0x80, 0x00])) < 0.0);
        }
    }

    #[test]
    fn test_unsigned_family() {
        assert_eq!(decode(tags::UI8, 1, &bytes_from(&[0x2A])), 42.0);
        assert_eq!(decode(tags::UI16, 2, &bytes_from(&[0x01, 0x00])), 256.0);
        assert_eq!(
            decode(tags::UI32, 4, &bytes_from(&[0x00, 0x01, 0x00, 0x00])),
            65536.0
        );
        assert_eq!(
            decode(tags::UI64, 8, &bytes_from(&[0, 0, 0, 0, 0, 0, 0x02, 0x01])),
            513.0
        );
    }

    #[test]
    fn test_unsigned_empty_payload_is_zero() {
        assert_eq!(decode(tags::UI32, 0, &bytes_from(&[])), 0.0);
    }

    #[test]
    fn test_flt_native_order_no_swap() {
        let bits = 52.5f32.to_ne_bytes();
        assert_eq!(decode(tags::FLT, 4, &bytes_from(&bits)), 52.5);
    }

    #[test]
    fn test_si8_sign_extends() {
        assert_eq!(decode(tags::SI8, 1, &bytes_from(&[0xFE])), -2.0);
        assert_eq!(decode(tags::SI8, 1, &bytes_from(&[0x7F])), 127.0);
    }

    #[test]
    fn test_si16_big_endian() {
        assert_eq!(decode(tags::SI16, 2, &bytes_from(&[0xFF, 0xFE])), -2.0);
        assert_eq!(decode(tags::SI16, 2, &bytes_from(&[0x12, 0x34])), 4660.0);
    }

    #[test]
    fn test_pwm_percentage() {
        // 0x8000 / 65536 * 100 = 50%.
        assert_eq!(decode(tags::PWM, 2, &bytes_from(&[0x80, 0x00])), 50.0);
        assert_eq!(decode(tags::PWM, 2, &bytes_from(&[0x00, 0x00])), 0.0);
        let full = decode(tags::PWM, 2, &bytes_from(&[0xFF, 0xFF]));
        assert!(full < 100.0 && full > 99.9);
    }

    #[test]
    fn test_unknown_tag_decodes_to_zero() {
        let bogus = crate::types::TypeTag::new("ch8*");
        assert_eq!(decode(bogus, 2, &bytes_from(&[0xFF, 0xFF])), 0.0);
    }

    #[test]
    fn test_wrong_size_decodes_to_zero() {
        // Fixed-point formats only decode at their stated 2-byte size.
        assert_eq!(decode(tags::SP78, 4, &bytes_from(&[0x19, 0x00, 0, 0])), 0.0);
        assert_eq!(decode(tags::SP78, 0, &bytes_from(&[])), 0.0);
        assert_eq!(decode(tags::SI8, 2, &bytes_from(&[0xFE, 0x00])), 0.0);
        assert_eq!(decode(tags::PWM, 1, &bytes_from(&[0x80])), 0.0);
    }

    #[test]
    fn test_unsigned_from_be_matches_place_value() {
        let b = bytes_from(&[0x01, 0x02, 0x03]);
        assert_eq!(
            unsigned_from_be(3, &b),
            0x01 * 256 * 256 + 0x02 * 256 + 0x03
        );
    }

    #[test]
    fn test_decode_is_deterministic() {
        let b = bytes_from(&[0x19, 0x00]);
        let first = decode(tags::SP78, 2, &b);
        for _ in 0..5 {
            assert_eq!(decode(tags::SP78, 2, &b), first);
        }
    }
}
