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

//! Turns possibly-missing or implausible per-sensor readings into one
//! trustworthy temperature per metric.
//!
//! Per request: select the candidate keys for the detected generation, sample
//! each one (a failing key is skipped, never aborts the batch), keep readings
//! inside the validity window, average the survivors, fall back tier by tier,
//! and persist the final aggregate when it is valid. The resolver always
//! returns the computed value; 0.0 means "no valid reading" by convention.

use std::io;

use serde_json::json;

use crate::cache::KeyInfoCache;
use crate::catalog::{
    self, validity_range, HardwareFamily, Sensor, ValidityRange,
};
use crate::decode;
use crate::display;
use crate::logger;
use crate::persist::{LastValidStore, Metric, PersistError};
use crate::transport::{self, Transport, TransportError};
use crate::types::{SensorKey, KEY_COUNT_KEY};

pub struct TempResolver<T: Transport> {
    transport: T,
    cache: KeyInfoCache,
    store: LastValidStore,
    family: HardwareFamily,
}

impl<T: Transport> TempResolver<T> {
    pub fn new(transport: T, family: HardwareFamily, store: LastValidStore) -> Self {
        TempResolver {
            transport,
            cache: KeyInfoCache::new(),
            store,
            family,
        }
    }

    pub fn family(&self) -> HardwareFamily {
        self.family
    }

    pub fn range(&self) -> ValidityRange {
        validity_range(self.family)
    }

    fn read_value(&self, key: SensorKey) -> Result<f64, TransportError> {
        let raw = transport::read_raw(&self.transport, &self.cache, key)?;
        Ok(decode::decode_raw(&raw))
    }

    /// Average of the valid readings in one tier; 0.0 when none are valid.
    /// Transport failures exclude the key from the average.
    fn average_valid(&self, sensors: &[Sensor], range: ValidityRange) -> f64 {
        let mut sum = 0.0;
        let mut count = 0u32;
        for sensor in sensors {
            let value = match self.read_value(sensor.key) {
                Ok(v) => v,
                Err(e) => {
                    logger::log_event(
                        "sensor_read_failed",
                        json!({ "key": sensor.key.to_string(), "error": e.to_string() }),
                    );
                    continue;
                }
            };
            if range.is_valid(value) {
                sum += value;
                count += 1;
            }
        }
        if count == 0 {
            0.0
        } else {
            sum / f64::from(count)
        }
    }

    /// Legacy single-key candidates accepted individually in priority order.
    fn first_valid(&self, sensors: &[Sensor], range: ValidityRange) -> Option<f64> {
        for sensor in sensors {
            match self.read_value(sensor.key) {
                Ok(v) if range.is_valid(v) => return Some(v),
                Ok(_) => {}
                Err(e) => {
                    logger::log_event(
                        "sensor_read_failed",
                        json!({ "key": sensor.key.to_string(), "error": e.to_string() }),
                    );
                }
            }
        }
        None
    }

    fn resolve(
        &self,
        metric: Metric,
        legacy: &[Sensor],
        primary: &[Sensor],
        aux: &[Sensor],
    ) -> f64 {
        let range = self.range();

        if let Some(value) = self.first_valid(legacy, range) {
            self.persist(metric, value);
            return value;
        }

        let mut temp = self.average_valid(primary, range);
        if !range.is_valid(temp) && !aux.is_empty() {
            temp = self.average_valid(aux, range);
        }

        if range.is_valid(temp) {
            self.persist(metric, temp);
        }
        temp
    }

    /// Representative CPU package temperature in degrees Celsius; 0.0 when no
    /// valid reading could be obtained.
    pub fn cpu_temp(&self) -> f64 {
        self.resolve(
            Metric::Cpu,
            catalog::cpu_legacy_sensors(self.family),
            catalog::cpu_core_sensors(self.family),
            catalog::cpu_aux_sensors(self.family),
        )
    }

    pub fn gpu_temp(&self) -> f64 {
        self.resolve(
            Metric::Gpu,
            catalog::gpu_legacy_sensors(self.family),
            catalog::gpu_core_sensors(self.family),
            catalog::gpu_aux_sensors(self.family),
        )
    }

    fn individual(&self, sensors: &[Sensor]) -> Vec<(String, f64)> {
        let range = self.range();
        let mut out = Vec::new();
        for sensor in sensors {
            let value = match self.read_value(sensor.key) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if range.is_valid(value) {
                out.push((sensor.label.to_string(), value));
            }
        }
        out
    }

    /// Per-core readings that passed validation, in catalog order. No
    /// averaging and no tier fallback; empty on unsupported hardware.
    pub fn individual_cpu_temps(&self) -> Vec<(String, f64)> {
        self.individual(catalog::cpu_core_sensors(self.family))
    }

    pub fn individual_gpu_temps(&self) -> Vec<(String, f64)> {
        self.individual(catalog::gpu_core_sensors(self.family))
    }

    /// Fail-soft read-back of the last persisted valid value.
    pub fn last_valid_temp(&self, metric: Metric) -> Result<f64, PersistError> {
        self.store.read(metric)
    }

    fn persist(&self, metric: Metric, value: f64) {
        if let Err(e) = self.store.write(metric, value) {
            // Reported, never fatal to the read path.
            eprintln!(
                "warning: failed to persist last valid {} temperature: {}",
                metric.as_str(),
                e
            );
            logger::log_event(
                "persist_failed",
                json!({ "metric": metric.as_str(), "error": e.to_string() }),
            );
        }
    }

    /// Total number of enumerable keys, from the reserved `#KEY` register.
    pub fn key_count(&self) -> Result<u32, TransportError> {
        let raw = transport::read_raw(&self.transport, &self.cache, KEY_COUNT_KEY)?;
        Ok(decode::unsigned_from_be(raw.size, &raw.bytes) as u32)
    }

    /// Diagnostic dump of every enumerable key. A key whose enumeration or
    /// read fails is skipped.
    pub fn print_all(&self, out: &mut dyn io::Write) -> Result<(), TransportError> {
        let total = self.key_count()?;
        for index in 0..total {
            let key = match self.transport.key_by_index(index) {
                Ok(k) => k,
                Err(_) => continue,
            };
            let raw = match transport::read_raw(&self.transport, &self.cache, key) {
                Ok(r) => r,
                Err(_) => continue,
            };
            let decoded = decode::decode_raw(&raw);
            let _ = writeln!(out, "{}", display::format_raw(&raw, decoded));
        }
        Ok(())
    }
}
