//! Per-connection session state
//!
//! A [`Session`] is created when a device connects and holds everything
//! that depends on the channel count read at connect time: the sample
//! store, the heat scale, the grid, the channel selection and the CSV
//! header. A new connection means a new session.
//!
//! # Features
//!
//! - Full log and rolling window ([`SampleStore`])
//! - Operator channel selection ([`ChannelSelection`])
//! - CSV export and filename derivation ([`export`])

pub mod export;
pub mod selection;
pub mod store;

pub use selection::ChannelSelection;
pub use store::SampleStore;

use chrono::{DateTime, TimeZone};

use crate::analysis::{time_series, GridRenderer, HeatScale, TimeSeriesFrame};
use crate::types::{DeviceInfo, Reading};

/// State of one connection
#[derive(Debug, Clone)]
pub struct Session {
    device: DeviceInfo,
    store: SampleStore,
    heat: HeatScale,
    grid: GridRenderer,
    selection: ChannelSelection,
    header: Vec<String>,
}

impl Session {
    /// Start a session for a freshly connected device
    pub fn new(device: DeviceInfo, window_size: usize) -> Self {
        let channel_count = device.channel_count;
        Self {
            device,
            store: SampleStore::new(window_size),
            heat: HeatScale::new(),
            grid: GridRenderer::new(channel_count),
            selection: ChannelSelection::new(),
            header: export::csv_header(channel_count),
        }
    }

    /// Feed one decoded reading to the heat scale, grid and store
    pub fn ingest(&mut self, reading: Reading) {
        let n = reading.len().min(self.channel_count());
        let values = &reading.values[..n];
        self.heat.observe(values);
        self.grid.render(values, &self.heat);
        self.store.append(reading);
    }

    pub fn device(&self) -> &DeviceInfo {
        &self.device
    }

    pub fn channel_count(&self) -> usize {
        self.device.channel_count
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SampleStore {
        &mut self.store
    }

    pub fn heat(&self) -> &HeatScale {
        &self.heat
    }

    pub fn grid(&self) -> &GridRenderer {
        &self.grid
    }

    pub fn selection(&self) -> &ChannelSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut ChannelSelection {
        &mut self.selection
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Plot frame for the current window and selection
    pub fn time_series(&self) -> Option<TimeSeriesFrame> {
        time_series::render(self.store.window(), &self.selection, self.channel_count())
    }

    /// Full log as CSV text
    pub fn csv(&self) -> String {
        export::to_delimited_text(&export::log_rows(self.store.log()), &self.header)
    }

    /// Suggested export filename
    pub fn export_filename<Tz: TimeZone>(&self, now: DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        let identity = &self.device.identity;
        export::derive_filename(
            identity.display_name(),
            &identity.id,
            self.store.log(),
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DeviceIdentity;
    use chrono::Utc;

    fn session(channels: usize) -> Session {
        Session::new(
            DeviceInfo {
                identity: DeviceIdentity::new("PX", "aa:bb"),
                channel_count: channels,
            },
            300,
        )
    }

    #[test]
    fn test_new_session_shape() {
        let s = session(4);
        assert_eq!(s.grid().len(), 4);
        assert_eq!(s.header().len(), 5);
        assert!(s.selection().is_selected(0));
        assert!(s.time_series().is_none());
    }

    #[test]
    fn test_ingest_feeds_everything() {
        let mut s = session(2);
        s.ingest(Reading::new(vec![10.0, 20.0]));
        s.ingest(Reading::new(vec![30.0]));
        assert_eq!(s.store().log_len(), 2);
        assert_eq!((s.heat().min(), s.heat().max()), (Some(10.0), Some(30.0)));
        assert_eq!(s.grid().cells()[0].label, "30");
        assert_eq!(s.grid().cells()[1].label, "20");
        assert!(s.time_series().is_some());
    }

    #[test]
    fn test_clear_keeps_window_and_heat() {
        let mut s = session(1);
        s.ingest(Reading::new(vec![1.0]));
        s.ingest(Reading::new(vec![9.0]));
        s.store_mut().clear();
        assert_eq!(s.store().log_len(), 0);
        assert_eq!(s.store().window_len(), 2);
        assert_eq!(s.heat().max(), Some(9.0));
        assert_eq!(s.csv(), "timestamp,sensor_0");
    }

    #[test]
    fn test_export_filename_uses_identity() {
        let s = session(1);
        let name = s.export_filename(Utc::now());
        assert!(name.starts_with("PX_aa-bb_sensor_log_"));
        assert!(name.ends_with(".csv"));
    }
}
