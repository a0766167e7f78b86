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

//! Hardware-generation aware sensor catalog.
//!
//! Key lists are hand-curated per generation, cross-checked against the
//! community SMC key documentation (exelban/stats, VirtualSMC SMCSensorKeys).
//! The active generation is derived once per run from the CPU brand string;
//! everything below is a pure function of that enumeration.

use crate::types::SensorKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HardwareFamily {
    Intel,
    AppleM1,
    AppleM2,
    AppleM3,
    AppleM4,
    Unknown,
}

/// Ordered, case-insensitive substring rules over the CPU brand string.
pub fn detect_family(brand: &str) -> HardwareFamily {
    let brand = brand.to_ascii_lowercase();
    if brand.contains("intel") {
        HardwareFamily::Intel
    } else if brand.contains("m1") {
        HardwareFamily::AppleM1
    } else if brand.contains("m2") {
        HardwareFamily::AppleM2
    } else if brand.contains("m3") {
        HardwareFamily::AppleM3
    } else if brand.contains("m4") {
        HardwareFamily::AppleM4
    } else {
        HardwareFamily::Unknown
    }
}

/// One catalog entry: a short human label and the concrete register key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sensor {
    pub label: &'static str,
    pub key: SensorKey,
}

const fn sensor(label: &'static str, key: &'static str) -> Sensor {
    Sensor {
        label,
        key: SensorKey::new(key),
    }
}

/// Plausible-temperature window, exclusive on both ends. A reading exactly at
/// a bound is invalid; this matches the original tooling and is load-bearing
/// for callers that treat 0.0 as "no reading".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidityRange {
    pub min: f64,
    pub max: f64,
}

impl ValidityRange {
    pub fn is_valid(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }
}

pub fn validity_range(family: HardwareFamily) -> ValidityRange {
    match family {
        HardwareFamily::Intel => ValidityRange { min: 0.0, max: 110.0 },
        _ => ValidityRange { min: 10.0, max: 120.0 },
    }
}

const CPU_CORES_M1: [Sensor; 10] = [
    sensor("CPU performance core 1", "Tp01"),
    sensor("CPU performance core 2", "Tp05"),
    sensor("CPU performance core 3", "Tp0D"),
    sensor("CPU performance core 4", "Tp0H"),
    sensor("CPU performance core 5", "Tp0L"),
    sensor("CPU performance core 6", "Tp0P"),
    sensor("CPU performance core 7", "Tp0X"),
    sensor("CPU performance core 8", "Tp0b"),
    sensor("CPU efficiency core 1", "Tp09"),
    sensor("CPU efficiency core 2", "Tp0T"),
];

const CPU_CORES_M2: [Sensor; 12] = [
    sensor("CPU efficiency core 1", "Tp1h"),
    sensor("CPU efficiency core 2", "Tp1t"),
    sensor("CPU efficiency core 3", "Tp1p"),
    sensor("CPU efficiency core 4", "Tp1l"),
    sensor("CPU performance core 1", "Tp01"),
    sensor("CPU performance core 2", "Tp05"),
    sensor("CPU performance core 3", "Tp09"),
    sensor("CPU performance core 4", "Tp0D"),
    sensor("CPU performance core 5", "Tp0X"),
    sensor("CPU performance core 6", "Tp0b"),
    sensor("CPU performance core 7", "Tp0f"),
    sensor("CPU performance core 8", "Tp0j"),
];

const CPU_CORES_M3: [Sensor; 18] = [
    sensor("CPU efficiency core 1", "Te05"),
    sensor("CPU efficiency core 2", "Te0L"),
    sensor("CPU efficiency core 3", "Te0P"),
    sensor("CPU efficiency core 4", "Te0S"),
    sensor("CPU performance core 1", "Tf04"),
    sensor("CPU performance core 2", "Tf09"),
    sensor("CPU performance core 3", "Tf0A"),
    sensor("CPU performance core 4", "Tf0B"),
    sensor("CPU performance core 5", "Tf0D"),
    sensor("CPU performance core 6", "Tf0E"),
    sensor("CPU performance core 7", "Tp01"),
    sensor("CPU performance core 8", "Tp05"),
    sensor("CPU performance core 9", "Tp09"),
    sensor("CPU performance core 10", "Tp0D"),
    sensor("CPU performance core 11", "Tp0V"),
    sensor("CPU performance core 12", "Tp0Y"),
    sensor("CPU performance core 13", "Tp0b"),
    sensor("CPU performance core 14", "Tp0e"),
];

const CPU_CORES_M4: [Sensor; 12] = [
    sensor("CPU efficiency core 1", "Te05"),
    sensor("CPU efficiency core 2", "Te0S"),
    sensor("CPU efficiency core 3", "Te09"),
    sensor("CPU efficiency core 4", "Te0H"),
    sensor("CPU performance core 1", "Tp01"),
    sensor("CPU performance core 2", "Tp05"),
    sensor("CPU performance core 3", "Tp09"),
    sensor("CPU performance core 4", "Tp0D"),
    sensor("CPU performance core 5", "Tp0V"),
    sensor("CPU performance core 6", "Tp0Y"),
    sensor("CPU performance core 7", "Tp0b"),
    sensor("CPU performance core 8", "Tp0e"),
];

const GPU_CORES_M1: [Sensor; 4] = [
    sensor("GPU core 1", "Tg05"),
    sensor("GPU core 2", "Tg0D"),
    sensor("GPU core 3", "Tg0L"),
    sensor("GPU core 4", "Tg0T"),
];

const GPU_CORES_M2: [Sensor; 2] = [
    sensor("GPU core 1", "Tg0f"),
    sensor("GPU core 2", "Tg0j"),
];

const GPU_CORES_M3: [Sensor; 8] = [
    sensor("GPU core 1", "Tf14"),
    sensor("GPU core 2", "Tf18"),
    sensor("GPU core 3", "Tf19"),
    sensor("GPU core 4", "Tf1A"),
    sensor("GPU core 5", "Tf24"),
    sensor("GPU core 6", "Tf28"),
    sensor("GPU core 7", "Tf29"),
    sensor("GPU core 8", "Tf2A"),
];

const GPU_CORES_M4: [Sensor; 4] = [
    sensor("GPU core 1", "Tg0G"),
    sensor("GPU core 2", "Tg0H"),
    sensor("GPU core 3", "Tg1U"),
    sensor("GPU core 4", "Tg1k"),
];

const CPU_LEGACY_INTEL: [Sensor; 2] = [
    sensor("CPU proximity", "TC0P"),
    sensor("CPU die", "TC0D"),
];

const GPU_LEGACY_INTEL: [Sensor; 2] = [
    sensor("GPU proximity", "TG0P"),
    sensor("GPU die", "TG0D"),
];

/// Per-core CPU sensors for the given generation. Empty means the generation
/// has no core listing (unsupported, not an error).
pub fn cpu_core_sensors(family: HardwareFamily) -> &'static [Sensor] {
    match family {
        HardwareFamily::AppleM1 => &CPU_CORES_M1,
        HardwareFamily::AppleM2 => &CPU_CORES_M2,
        HardwareFamily::AppleM3 => &CPU_CORES_M3,
        HardwareFamily::AppleM4 => &CPU_CORES_M4,
        HardwareFamily::Intel | HardwareFamily::Unknown => &[],
    }
}

/// Auxiliary CPU tier, consulted only after the primary tier yields no valid
/// readings. M2 machines occasionally expose the M1-era key namespace
/// instead of their own, so that list is the fallback there.
pub fn cpu_aux_sensors(family: HardwareFamily) -> &'static [Sensor] {
    match family {
        HardwareFamily::AppleM2 => &CPU_CORES_M1,
        _ => &[],
    }
}

/// Legacy single-key candidates, tried individually in priority order before
/// any multi-core averaging. Intel-only.
pub fn cpu_legacy_sensors(family: HardwareFamily) -> &'static [Sensor] {
    match family {
        HardwareFamily::Intel => &CPU_LEGACY_INTEL,
        _ => &[],
    }
}

pub fn gpu_core_sensors(family: HardwareFamily) -> &'static [Sensor] {
    match family {
        HardwareFamily::AppleM1 => &GPU_CORES_M1,
        HardwareFamily::AppleM2 => &GPU_CORES_M2,
        HardwareFamily::AppleM3 => &GPU_CORES_M3,
        HardwareFamily::AppleM4 => &GPU_CORES_M4,
        HardwareFamily::Intel | HardwareFamily::Unknown => &[],
    }
}

pub fn gpu_aux_sensors(family: HardwareFamily) -> &'static [Sensor] {
    let _ = family;
    &[]
}

pub fn gpu_legacy_sensors(family: HardwareFamily) -> &'static [Sensor] {
    match family {
        HardwareFamily::Intel => &GPU_LEGACY_INTEL,
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_family_case_insensitive() {
        assert_eq!(detect_family("Apple M1 Pro"), HardwareFamily::AppleM1);
        assert_eq!(detect_family("apple m2"), HardwareFamily::AppleM2);
        assert_eq!(detect_family("APPLE M3 MAX"), HardwareFamily::AppleM3);
        assert_eq!(detect_family("Apple M4"), HardwareFamily::AppleM4);
        assert_eq!(
            detect_family("Intel(R) Core(TM) i7-9750H CPU @ 2.60GHz"),
            HardwareFamily::Intel
        );
    }

    #[test]
    fn test_detect_family_unknown() {
        assert_eq!(detect_family(""), HardwareFamily::Unknown);
        assert_eq!(detect_family("Snapdragon X Elite"), HardwareFamily::Unknown);
    }

    #[test]
    fn test_m1_cpu_core_list_is_documented_order() {
        let sensors = cpu_core_sensors(HardwareFamily::AppleM1);
        assert_eq!(sensors.len(), 10);
        let keys: Vec<String> = sensors.iter().map(|s| s.key.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "Tp01", "Tp05", "Tp0D", "Tp0H", "Tp0L", "Tp0P", "Tp0X", "Tp0b", "Tp09", "Tp0T"
            ]
        );
        assert_eq!(sensors[0].label, "CPU performance core 1");
        assert_eq!(sensors[7].label, "CPU performance core 8");
        assert_eq!(sensors[8].label, "CPU efficiency core 1");
        assert_eq!(sensors[9].label, "CPU efficiency core 2");
    }

    #[test]
    fn test_unsupported_families_yield_empty_core_lists() {
        assert!(cpu_core_sensors(HardwareFamily::Intel).is_empty());
        assert!(cpu_core_sensors(HardwareFamily::Unknown).is_empty());
        assert!(gpu_core_sensors(HardwareFamily::Unknown).is_empty());
    }

    #[test]
    fn test_aux_tier_only_on_m2() {
        assert_eq!(cpu_aux_sensors(HardwareFamily::AppleM2), &CPU_CORES_M1);
        assert!(cpu_aux_sensors(HardwareFamily::AppleM1).is_empty());
        assert!(cpu_aux_sensors(HardwareFamily::AppleM3).is_empty());
        assert!(cpu_aux_sensors(HardwareFamily::Intel).is_empty());
    }

    #[test]
    fn test_legacy_tier_only_on_intel() {
        let legacy = cpu_legacy_sensors(HardwareFamily::Intel);
        assert_eq!(legacy.len(), 2);
        assert_eq!(legacy[0].key, SensorKey::new("TC0P"));
        assert_eq!(legacy[1].key, SensorKey::new("TC0D"));
        assert!(cpu_legacy_sensors(HardwareFamily::AppleM1).is_empty());
    }

    #[test]
    fn test_validity_ranges_by_family() {
        assert_eq!(
            validity_range(HardwareFamily::Intel),
            ValidityRange { min: 0.0, max: 110.0 }
        );
        assert_eq!(
            validity_range(HardwareFamily::AppleM1),
            ValidityRange { min: 10.0, max: 120.0 }
        );
    }

    #[test]
    fn test_validity_is_strictly_exclusive() {
        let range = ValidityRange { min: 10.0, max: 120.0 };
        assert!(!range.is_valid(10.0));
        assert!(!range.is_valid(120.0));
        assert!(range.is_valid(10.0 + f64::EPSILON * 16.0));
        assert!(range.is_valid(120.0 - 1e-9));
        assert!(range.is_valid(25.0));
        assert!(!range.is_valid(0.0));
        assert!(!range.is_valid(-5.0));
        assert!(!range.is_valid(150.0));
    }
}
