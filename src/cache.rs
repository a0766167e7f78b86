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

//! Memoization of per-key (size, type) metadata.
//!
//! Metadata queries dominate the energy cost of a read cycle, so results are
//! cached for the lifetime of the resolver. The cache is append-only within a
//! fixed capacity: once full, new misses still resolve but are not stored.

use std::sync::Mutex;

use crate::transport::{Transport, TransportError};
use crate::types::{KeyInfo, SensorKey};

pub const KEY_INFO_CACHE_SIZE: usize = 100;

pub struct KeyInfoCache {
    entries: Mutex<Vec<(SensorKey, KeyInfo)>>,
    capacity: usize,
}

impl KeyInfoCache {
    pub fn new() -> Self {
        Self::with_capacity(KEY_INFO_CACHE_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        KeyInfoCache {
            entries: Mutex::new(Vec::new()),
            capacity,
        }
    }

    /// Cached metadata for `key`, querying the transport on a miss.
    ///
    /// The whole lookup-miss-fetch-insert sequence runs under one lock so a
    /// key is never queried and inserted twice under contention. Entries are
    /// immutable once inserted; duplicates cannot occur. Nothing is cached
    /// when the query fails.
    pub fn get_or_fetch<T: Transport + ?Sized>(
        &self,
        key: SensorKey,
        transport: &T,
    ) -> Result<KeyInfo, TransportError> {
        let mut entries = match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((_, info)) = entries.iter().find(|(k, _)| *k == key) {
            return Ok(*info);
        }
        let info = transport.key_info(key)?;
        if entries.len() < self.capacity {
            entries.push((key, info));
        }
        Ok(info)
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for KeyInfoCache {
    fn default() -> Self {
        Self::new()
    }
}
