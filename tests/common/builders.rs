//! Test data builders for creating test objects

use chrono::{DateTime, TimeZone, Utc};
use sensorview_rs::types::{DeviceIdentity, DeviceInfo, Reading};

/// Builder for creating test Readings
pub struct ReadingBuilder {
    timestamp: DateTime<Utc>,
    values: Vec<f64>,
}

impl ReadingBuilder {
    pub fn new() -> Self {
        Self {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            values: Vec::new(),
        }
    }

    pub fn at(mut self, year: i32, month: u32, day: u32, hour: u32, min: u32) -> Self {
        self.timestamp = Utc.with_ymd_and_hms(year, month, day, hour, min, 0).unwrap();
        self
    }

    pub fn values(mut self, values: &[f64]) -> Self {
        self.values = values.to_vec();
        self
    }

    pub fn build(self) -> Reading {
        Reading::at(self.timestamp, self.values)
    }
}

/// Builder for creating test DeviceInfo
pub struct DeviceInfoBuilder {
    name: String,
    id: String,
    channel_count: usize,
}

impl DeviceInfoBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: "AA:BB:CC:DD:EE:FF".to_string(),
            channel_count: 16,
        }
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn channels(mut self, channel_count: usize) -> Self {
        self.channel_count = channel_count;
        self
    }

    pub fn build(self) -> DeviceInfo {
        DeviceInfo {
            identity: DeviceIdentity::new(self.name, self.id),
            channel_count: self.channel_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_info_builder() {
        let info = DeviceInfoBuilder::new("PX").id("01").channels(4).build();

        assert_eq!(info.identity.name, "PX");
        assert_eq!(info.identity.id, "01");
        assert_eq!(info.channel_count, 4);
    }
}
