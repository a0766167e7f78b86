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

//! Host identity: the CPU brand string that generation detection keys off.

use std::env;

/// Overrides the detected brand string; used by tests and useful for forcing
/// a specific catalog on unusual machines.
pub const BRAND_ENV: &str = "SMCTHERM_BRAND";

/// Best-effort CPU brand string; empty when the host exposes none.
pub fn cpu_brand_string() -> String {
    if let Ok(brand) = env::var(BRAND_ENV) {
        return brand;
    }
    native_brand_string().unwrap_or_default()
}

#[cfg(target_os = "macos")]
fn native_brand_string() -> Option<String> {
    use std::ptr;

    let name = b"machdep.cpu.brand_string\0";
    let mut len: libc::size_t = 0;
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr() as *const libc::c_char,
            ptr::null_mut(),
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if rc != 0 || len == 0 {
        return None;
    }
    let mut buf = vec![0u8; len];
    let rc = unsafe {
        libc::sysctlbyname(
            name.as_ptr() as *const libc::c_char,
            buf.as_mut_ptr() as *mut libc::c_void,
            &mut len,
            ptr::null_mut(),
            0,
        )
    };
    if rc != 0 {
        return None;
    }
    buf.truncate(len);
    while buf.last() == Some(&0) {
        buf.pop();
    }
    String::from_utf8(buf).ok().map(|s| s.trim().to_string())
}

#[cfg(not(target_os = "macos"))]
fn native_brand_string() -> Option<String> {
    None
}
