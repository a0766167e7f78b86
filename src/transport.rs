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

//! Raw access to the SMC: key metadata queries, byte reads and key
//! enumeration.
//!
//! The `Transport` trait is the boundary the rest of the crate sees; the real
//! IOKit-backed implementation only exists on macOS, so every policy module
//! stays testable on any host.

use thiserror::Error;

use crate::cache::KeyInfoCache;
use crate::types::{KeyInfo, RawValue, SensorKey, SmcBytes};

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no SMC service available: {0}")]
    ServiceUnavailable(String),
    #[error("SMC call for key {key} failed: kernel result {code:#x}")]
    CallFailed { key: SensorKey, code: i32 },
    #[error("SMC key enumeration failed at index {index}: kernel result {code:#x}")]
    IndexFailed { index: u32, code: i32 },
}

/// The raw request/response exchange with the controller. One metadata query,
/// one sized byte read, and index-based key enumeration for the dump mode.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    fn key_info(&self, key: SensorKey) -> Result<KeyInfo, TransportError>;
    fn read_bytes(&self, key: SensorKey, info: KeyInfo) -> Result<SmcBytes, TransportError>;
    fn key_by_index(&self, index: u32) -> Result<SensorKey, TransportError>;
}

/// Resolve a key's metadata through the cache, then fetch its payload.
pub fn read_raw<T: Transport + ?Sized>(
    transport: &T,
    cache: &KeyInfoCache,
    key: SensorKey,
) -> Result<RawValue, TransportError> {
    let info = cache.get_or_fetch(key, transport)?;
    let bytes = transport.read_bytes(key, info)?;
    Ok(RawValue {
        key,
        data_type: info.data_type,
        size: info.size,
        bytes,
    })
}

#[cfg(target_os = "macos")]
pub use iokit::SystemSmc;

#[cfg(target_os = "macos")]
mod iokit {
    use super::{Transport, TransportError};
    use crate::types::{KeyInfo, SensorKey, SmcBytes, TypeTag};

    const KERNEL_INDEX_SMC: u32 = 2;
    const CMD_READ_BYTES: u8 = 5;
    const CMD_READ_INDEX: u8 = 8;
    const CMD_READ_KEY_INFO: u8 = 9;
    const SMC_SERVICE_NAME: &[u8] = b"AppleSMC\0";

    const KERN_SUCCESS: i32 = 0;

    #[repr(C)]
    #[derive(Clone, Copy, Default)]
    struct KeyDataVers {
        major: u8,
        minor: u8,
        build: u8,
        reserved: [u8; 1],
        release: u16,
    }

    #[repr(C)]
    #[derive(Clone, Copy, Default)]
    struct KeyDataPLimit {
        version: u16,
        length: u16,
        cpu_p_limit: u32,
        gpu_p_limit: u32,
        mem_p_limit: u32,
    }

    #[repr(C)]
    #[derive(Clone, Copy, Default)]
    struct KeyDataKeyInfo {
        data_size: u32,
        data_type: u32,
        data_attributes: u8,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct KeyData {
        key: u32,
        vers: KeyDataVers,
        p_limit: KeyDataPLimit,
        key_info: KeyDataKeyInfo,
        result: u8,
        status: u8,
        data8: u8,
        data32: u32,
        bytes: SmcBytes,
    }

    impl Default for KeyData {
        fn default() -> Self {
            KeyData {
                key: 0,
                vers: KeyDataVers::default(),
                p_limit: KeyDataPLimit::default(),
                key_info: KeyDataKeyInfo::default(),
                result: 0,
                status: 0,
                data8: 0,
                data32: 0,
                bytes: [0u8; 32],
            }
        }
    }

    #[link(name = "IOKit", kind = "framework")]
    extern "C" {
        fn IOMasterPort(bootstrap_port: u32, master_port: *mut u32) -> i32;
        fn IOServiceMatching(name: *const libc::c_char) -> *mut libc::c_void;
        fn IOServiceGetMatchingServices(
            master_port: u32,
            matching: *mut libc::c_void,
            existing: *mut u32,
        ) -> i32;
        fn IOIteratorNext(iterator: u32) -> u32;
        fn IOObjectRelease(object: u32) -> i32;
        fn IOServiceOpen(service: u32, owning_task: u32, conn_type: u32, connect: *mut u32) -> i32;
        fn IOServiceClose(connect: u32) -> i32;
        fn IOConnectCallStructMethod(
            connection: u32,
            selector: u32,
            input: *const libc::c_void,
            input_size: usize,
            output: *mut libc::c_void,
            output_size: *mut usize,
        ) -> i32;
    }

    /// Connection to the AppleSMC kernel service. Closed on drop.
    pub struct SystemSmc {
        conn: u32,
    }

    impl SystemSmc {
        pub fn open() -> Result<Self, TransportError> {
            unsafe {
                let mut master_port: u32 = 0;
                IOMasterPort(0, &mut master_port);

                let matching = IOServiceMatching(SMC_SERVICE_NAME.as_ptr() as *const _);
                let mut iterator: u32 = 0;
                let result = IOServiceGetMatchingServices(master_port, matching, &mut iterator);
                if result != KERN_SUCCESS {
                    return Err(TransportError::ServiceUnavailable(format!(
                        "IOServiceGetMatchingServices() = {:#x}",
                        result
                    )));
                }

                let device = IOIteratorNext(iterator);
                IOObjectRelease(iterator);
                if device == 0 {
                    return Err(TransportError::ServiceUnavailable(
                        "no AppleSMC service found".to_string(),
                    ));
                }

                let mut conn: u32 = 0;
                let result = IOServiceOpen(device, libc::mach_task_self(), 0, &mut conn);
                IOObjectRelease(device);
                if result != KERN_SUCCESS {
                    return Err(TransportError::ServiceUnavailable(format!(
                        "IOServiceOpen() = {:#x}",
                        result
                    )));
                }
                Ok(SystemSmc { conn })
            }
        }

        fn call(&self, input: &KeyData) -> Result<KeyData, i32> {
            let mut output = KeyData::default();
            let mut output_size = std::mem::size_of::<KeyData>();
            let result = unsafe {
                IOConnectCallStructMethod(
                    self.conn,
                    KERNEL_INDEX_SMC,
                    input as *const KeyData as *const _,
                    std::mem::size_of::<KeyData>(),
                    &mut output as *mut KeyData as *mut _,
                    &mut output_size,
                )
            };
            if result != KERN_SUCCESS {
                return Err(result);
            }
            Ok(output)
        }
    }

    impl Drop for SystemSmc {
        fn drop(&mut self) {
            unsafe {
                IOServiceClose(self.conn);
            }
        }
    }

    impl Transport for SystemSmc {
        fn key_info(&self, key: SensorKey) -> Result<KeyInfo, TransportError> {
            let mut input = KeyData::default();
            input.key = key.to_u32();
            input.data8 = CMD_READ_KEY_INFO;
            let output = self
                .call(&input)
                .map_err(|code| TransportError::CallFailed { key, code })?;
            Ok(KeyInfo {
                size: output.key_info.data_size,
                data_type: TypeTag::from_u32(output.key_info.data_type),
            })
        }

        fn read_bytes(&self, key: SensorKey, info: KeyInfo) -> Result<SmcBytes, TransportError> {
            let mut input = KeyData::default();
            input.key = key.to_u32();
            input.key_info.data_size = info.size;
            input.data8 = CMD_READ_BYTES;
            let output = self
                .call(&input)
                .map_err(|code| TransportError::CallFailed { key, code })?;
            Ok(output.bytes)
        }

        fn key_by_index(&self, index: u32) -> Result<SensorKey, TransportError> {
            let mut input = KeyData::default();
            input.data8 = CMD_READ_INDEX;
            input.data32 = index;
            let output = self
                .call(&input)
                .map_err(|code| TransportError::IndexFailed { index, code })?;
            Ok(SensorKey::from_u32(output.key))
        }
    }
}

#[cfg(not(target_os = "macos"))]
pub struct SystemSmc {
    _private: (),
}

#[cfg(not(target_os = "macos"))]
impl SystemSmc {
    pub fn open() -> Result<Self, TransportError> {
        Err(TransportError::ServiceUnavailable(
            "the SMC is only reachable on macOS".to_string(),
        ))
    }
}

#[cfg(not(target_os = "macos"))]
impl Transport for SystemSmc {
    fn key_info(&self, key: SensorKey) -> Result<KeyInfo, TransportError> {
        Err(TransportError::CallFailed { key, code: -1 })
    }

    fn read_bytes(&self, key: SensorKey, _info: KeyInfo) -> Result<SmcBytes, TransportError> {
        Err(TransportError::CallFailed { key, code: -1 })
    }

    fn key_by_index(&self, index: u32) -> Result<SensorKey, TransportError> {
        Err(TransportError::IndexFailed { index, code: -1 })
    }
}
