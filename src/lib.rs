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

//! Smctherm - CPU and GPU temperature reporting for macOS via the SMC
//!
//! This library provides the core functionality for talking to the System
//! Management Controller, decoding its typed sensor payloads, and turning
//! per-core readings into a single validated temperature per metric.

pub mod cache;
pub mod catalog;
pub mod decode;
pub mod display;
pub mod logger;
pub mod persist;
pub mod resolver;
pub mod system;
pub mod transport;
pub mod types;

#[cfg(test)]
pub mod test_utils;
