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

//! Core data types shared by the SMC access layers: sensor keys, type tags,
//! raw value buffers and key metadata.

use std::fmt;

/// SMC values are at most 32 bytes on the wire.
pub const SMC_BYTES_LEN: usize = 32;

/// Raw byte payload of one SMC register, zero-padded past `size`.
pub type SmcBytes = [u8; SMC_BYTES_LEN];

/// Identifier of one SMC telemetry register: exactly 4 printable ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorKey([u8; 4]);

impl SensorKey {
    /// Panics at compile time if the literal is not exactly 4 bytes.
    pub const fn new(s: &str) -> Self {
        let b = s.as_bytes();
        assert!(b.len() == 4, "sensor keys are exactly 4 characters");
        Self([b[0], b[1], b[2], b[3]])
    }

    /// Big-endian packing of the 4 key characters, the form the kernel call takes.
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn from_u32(v: u32) -> Self {
        Self(v.to_be_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for SensorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.pad(s),
            Err(_) => f.pad("????"),
        }
    }
}

/// Identifier of a register's byte encoding: 4 ASCII bytes, trailing-space
/// padded where the native form is 3 characters (e.g. `"flt "`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag([u8; 4]);

impl TypeTag {
    pub const fn new(s: &str) -> Self {
        let b = s.as_bytes();
        assert!(b.len() == 4, "type tags are exactly 4 characters");
        Self([b[0], b[1], b[2], b[3]])
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn from_u32(v: u32) -> Self {
        Self(v.to_be_bytes())
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match std::str::from_utf8(&self.0) {
            Ok(s) => f.pad(s),
            Err(_) => f.pad("????"),
        }
    }
}

/// The closed set of encodings the decoder understands.
pub mod tags {
    use super::TypeTag;

    pub const FLT: TypeTag = TypeTag::new("flt ");
    pub const FP1F: TypeTag = TypeTag::new("fp1f");
    pub const FP4C: TypeTag = TypeTag::new("fp4c");
    pub const FP5B: TypeTag = TypeTag::new("fp5b");
    pub const FP6A: TypeTag = TypeTag::new("fp6a");
    pub const FP79: TypeTag = TypeTag::new("fp79");
    pub const FP88: TypeTag = TypeTag::new("fp88");
    pub const FPA6: TypeTag = TypeTag::new("fpa6");
    pub const FPC4: TypeTag = TypeTag::new("fpc4");
    pub const FPE2: TypeTag = TypeTag::new("fpe2");
    pub const SP1E: TypeTag = TypeTag::new("sp1e");
    pub const SP3C: TypeTag = TypeTag::new("sp3c");
    pub const SP4B: TypeTag = TypeTag::new("sp4b");
    pub const SP5A: TypeTag = TypeTag::new("sp5a");
    pub const SP69: TypeTag = TypeTag::new("sp69");
    pub const SP78: TypeTag = TypeTag::new("sp78");
    pub const SP87: TypeTag = TypeTag::new("sp87");
    pub const SP96: TypeTag = TypeTag::new("sp96");
    pub const SPB4: TypeTag = TypeTag::new("spb4");
    pub const SPF0: TypeTag = TypeTag::new("spf0");
    pub const UI8: TypeTag = TypeTag::new("ui8 ");
    pub const UI16: TypeTag = TypeTag::new("ui16");
    pub const UI32: TypeTag = TypeTag::new("ui32");
    pub const UI64: TypeTag = TypeTag::new("ui64");
    pub const SI8: TypeTag = TypeTag::new("si8 ");
    pub const SI16: TypeTag = TypeTag::new("si16");
    pub const PWM: TypeTag = TypeTag::new("{pwm");
}

/// Reserved key holding the total number of enumerable keys.
pub const KEY_COUNT_KEY: SensorKey = SensorKey::new("#KEY");

/// Metadata for one key: payload size in bytes and its declared encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInfo {
    pub size: u32,
    pub data_type: TypeTag,
}

/// One complete register read. `size == 0` means the key exists but returned
/// no payload; that is a valid empty result, not an error.
#[derive(Debug, Clone, Copy)]
pub struct RawValue {
    pub key: SensorKey,
    pub data_type: TypeTag,
    pub size: u32,
    pub bytes: SmcBytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_round_trips_through_u32() {
        let key = SensorKey::new("Tp01");
        assert_eq!(SensorKey::from_u32(key.to_u32()), key);
        // Big-endian packing: 'T' lands in the high byte.
        assert_eq!(key.to_u32() >> 24, u32::from(b'T'));
    }

    #[test]
    fn test_key_display_and_padding() {
        let key = SensorKey::new("TC0P");
        assert_eq!(format!("{}", key), "TC0P");
        assert_eq!(format!("{:>6}", key), "  TC0P");
    }

    #[test]
    fn test_tag_display_keeps_trailing_space() {
        assert_eq!(format!("{}", tags::FLT), "flt ");
        assert_eq!(format!("{}", tags::SP78), "sp78");
    }

    #[test]
    fn test_tag_round_trips_through_u32() {
        for tag in [tags::UI8, tags::PWM, tags::SP1E] {
            assert_eq!(TypeTag::from_u32(tag.to_u32()), tag);
        }
    }

    #[test]
    fn test_key_count_key_spelling() {
        assert_eq!(format!("{}", KEY_COUNT_KEY), "#KEY");
    }
}
