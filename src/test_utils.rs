/*
 * Test utilities and mock helpers for Smctherm
 *
 * This module provides common test utilities, mock objects, and helper functions
 * that can be used across different test modules.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::persist::LastValidStore;
    use crate::types::SmcBytes;
    use tempfile::TempDir;

    /// Pads a short payload out to the full 32-byte wire buffer.
    pub fn bytes_from(data: &[u8]) -> SmcBytes {
        let mut bytes = [0u8; 32];
        bytes[..data.len()].copy_from_slice(data);
        bytes
    }

    /// Encodes a temperature as an sp78 payload (signed, 256 counts per degree).
    pub fn sp78_reading(temp: f64) -> SmcBytes {
        let fixed = (temp * 256.0) as i16;
        bytes_from(&fixed.to_be_bytes())
    }

    /// Creates a store backed by a fresh temp dir. The dir handle must be kept
    /// alive for the duration of the test.
    pub fn store_in_temp_dir() -> (LastValidStore, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let store = LastValidStore::new(dir.path().join("state.json"));
        (store, dir)
    }
}
