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

//! Formatting for the diagnostic list-all dump. Not meant for machine
//! parsing; the column layout matches what existing SMC tooling prints.

use std::fmt::Write;

use crate::types::{RawValue, SMC_BYTES_LEN};

/// One dump line: right-aligned key, bracketed type, decoded value with one
/// decimal, raw bytes in uppercase hex. Keys with no payload print `no data`.
pub fn format_raw(val: &RawValue, decoded: f64) -> String {
    let mut line = format!("{:>6}{:>10}", val.key, format!("[{}]  ", val.data_type));
    if val.size == 0 {
        line.push_str("no data");
        return line;
    }
    let _ = write!(line, "{:.1} (bytes:", decoded);
    for b in &val.bytes[..(val.size as usize).min(SMC_BYTES_LEN)] {
        let _ = write!(line, " {:02X}", b);
    }
    line.push(')');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::bytes_from;
    use crate::types::{tags, RawValue, SensorKey};

    #[test]
    fn test_format_with_payload() {
        let raw = RawValue {
            key: SensorKey::new("TC0P"),
            data_type: tags::SP78,
            size: 2,
            bytes: bytes_from(&[0x19, 0x00]),
        };
        assert_eq!(format_raw(&raw, 25.0), "  TC0P  [sp78]  25.0 (bytes: 19 00)");
    }

    #[test]
    fn test_format_no_data() {
        let raw = RawValue {
            key: SensorKey::new("#KEY"),
            data_type: tags::UI32,
            size: 0,
            bytes: bytes_from(&[]),
        };
        let line = format_raw(&raw, 0.0);
        assert!(line.ends_with("no data"));
        assert!(line.contains("[ui32]"));
    }

    #[test]
    fn test_hex_bytes_are_uppercase_and_padded() {
        let raw = RawValue {
            key: SensorKey::new("Tg0f"),
            data_type: tags::FLT,
            size: 4,
            bytes: bytes_from(&[0x00, 0x0a, 0xff, 0x01]),
        };
        let line = format_raw(&raw, 1.5);
        assert!(line.ends_with("(bytes: 00 0A FF 01)"));
    }
}
