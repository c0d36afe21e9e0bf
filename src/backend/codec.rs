//! Wire format of the sensor service
//!
//! The peripheral exposes two readable characteristics:
//!
//! - **channel count** (`0xFFE2`): a single unsigned byte, numPx
//! - **sensor data** (`0xFFE3`): consecutive 16-bit unsigned big-endian values
//!
//! A data payload may carry fewer values than channels (or an odd trailing
//! byte); decoding keeps `min(channel_count, len / 2)` values and drops the
//! remainder.

use crate::error::{Result, SensorViewError};
use uuid::Uuid;

/// Primary service advertised by the sensor array
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x0000ffe0_0000_1000_8000_00805f9b34fb);

/// Characteristic holding the channel count
pub const CHAR_CHANNEL_COUNT_UUID: Uuid = Uuid::from_u128(0x0000ffe2_0000_1000_8000_00805f9b34fb);

/// Characteristic holding the sensor values
pub const CHAR_DATA_UUID: Uuid = Uuid::from_u128(0x0000ffe3_0000_1000_8000_00805f9b34fb);

/// Decode the channel-count characteristic
pub fn decode_channel_count(bytes: &[u8]) -> Result<usize> {
    bytes
        .first()
        .map(|&b| b as usize)
        .ok_or_else(|| SensorViewError::Decode("empty channel count payload".to_string()))
}

/// Decode a sensor data payload into at most `channel_count` values
pub fn decode_values(bytes: &[u8], channel_count: usize) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .take(channel_count)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Encode values the way the peripheral does (used by the simulated array)
pub fn encode_values(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_be_bytes()).collect()
}
