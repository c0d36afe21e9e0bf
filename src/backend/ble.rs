//! Bluetooth LE sensor array (btleplug)
//!
//! btleplug is async-only, so the device owns a small tokio runtime and
//! blocks on it from the backend worker thread. Discovery scans for the
//! sensor service for the configured timeout and takes the first matching
//! peripheral; there is no picker. A task on the runtime watches adapter
//! events so a dropped link is seen without a failed read.

use crate::backend::codec::{CHAR_CHANNEL_COUNT_UUID, CHAR_DATA_UUID, SERVICE_UUID};
use crate::config::DeviceConfig;
use crate::error::{Result, ResultExt, SensorViewError};
use crate::types::DeviceIdentity;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::device_trait::{DeviceStats, SensorDevice};

/// Extra time allowed on top of the scan window before giving up on a hung stack
const SCAN_GRACE: Duration = Duration::from_secs(10);

struct Link {
    peripheral: Peripheral,
    channel_count: Characteristic,
    data: Characteristic,
    /// Cleared by the event watcher on `DeviceDisconnected`
    up: Arc<AtomicBool>,
    watcher: tokio::task::JoinHandle<()>,
}

/// Sensor array reached over Bluetooth LE
pub struct BleSensorDevice {
    runtime: Runtime,
    scan_timeout: Duration,
    name_prefix: Option<String>,
    link: Option<Link>,
    stats: DeviceStats,
}

impl BleSensorDevice {
    /// Create an unconnected device; no radio traffic happens until connect
    pub fn new(config: &DeviceConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| SensorViewError::Io(e).with_context("Failed to start BLE runtime"))?;
        Ok(Self {
            runtime,
            scan_timeout: Duration::from_millis(config.scan_timeout_ms),
            name_prefix: config.name_prefix.clone(),
            link: None,
            stats: DeviceStats::default(),
        })
    }

    fn link(&self) -> Result<&Link> {
        self.link.as_ref().ok_or(SensorViewError::NotConnected)
    }

    fn read_characteristic(&self, characteristic: &Characteristic) -> Result<Vec<u8>> {
        let link = self.link()?;
        let bytes = self
            .runtime
            .block_on(link.peripheral.read(characteristic))?;
        Ok(bytes)
    }
}

async fn first_adapter() -> Result<Adapter> {
    let manager = Manager::new().await?;
    manager
        .adapters()
        .await
        .map_err(|_| SensorViewError::AdapterUnavailable)?
        .into_iter()
        .next()
        .ok_or(SensorViewError::AdapterUnavailable)
}

async fn discover(
    scan_timeout: Duration,
    name_prefix: Option<&str>,
) -> Result<(Adapter, Peripheral, Option<String>)> {
    let adapter = first_adapter().await?;
    adapter
        .start_scan(ScanFilter {
            services: vec![SERVICE_UUID],
        })
        .await?;
    tokio::time::sleep(scan_timeout).await;

    let mut found = None;
    for peripheral in adapter.peripherals().await? {
        let Some(props) = peripheral.properties().await? else {
            continue;
        };
        if !props.services.is_empty() && !props.services.contains(&SERVICE_UUID) {
            continue;
        }
        let name_matches = match (name_prefix, props.local_name.as_deref()) {
            (None, _) => true,
            (Some(prefix), Some(name)) => name.starts_with(prefix),
            (Some(_), None) => false,
        };
        if name_matches {
            found = Some((peripheral, props.local_name));
            break;
        }
    }
    let _ = adapter.stop_scan().await;
    let (peripheral, name) = found.ok_or(SensorViewError::DeviceNotFound)?;
    Ok((adapter, peripheral, name))
}

/// Connect and resolve both characteristics; disconnects again on failure
async fn open_link(peripheral: &Peripheral) -> Result<(Characteristic, Characteristic)> {
    peripheral.connect().await?;
    let resolved = async {
        peripheral.discover_services().await?;
        let channel_count = find_characteristic(peripheral, CHAR_CHANNEL_COUNT_UUID)?;
        let data = find_characteristic(peripheral, CHAR_DATA_UUID)?;
        Ok::<_, SensorViewError>((channel_count, data))
    }
    .await;
    if resolved.is_err() {
        if let Err(e) = peripheral.disconnect().await {
            tracing::warn!("BLE disconnect after failed setup: {}", e);
        }
    }
    resolved
}

/// Clear `up` when the adapter reports this peripheral gone
async fn watch_disconnect(adapter: Adapter, peripheral: Peripheral, up: Arc<AtomicBool>) {
    let mut events = match adapter.events().await {
        Ok(events) => events,
        Err(e) => {
            tracing::warn!("BLE event stream unavailable: {}", e);
            return;
        }
    };
    let id = peripheral.id();
    while let Some(event) = events.next().await {
        if let CentralEvent::DeviceDisconnected(gone) = event {
            if gone == id {
                tracing::info!("BLE peripheral {} disconnected", peripheral.address());
                up.store(false, Ordering::SeqCst);
                break;
            }
        }
    }
}

fn find_characteristic(peripheral: &Peripheral, uuid: Uuid) -> Result<Characteristic> {
    peripheral
        .characteristics()
        .into_iter()
        .find(|c| c.uuid == uuid)
        .ok_or_else(|| SensorViewError::Transport(format!("characteristic {} not found", uuid)))
}

impl SensorDevice for BleSensorDevice {
    fn connect(&mut self) -> Result<DeviceIdentity> {
        let prefix = self.name_prefix.clone();
        let scan_timeout = self.scan_timeout;
        let (adapter, peripheral, name) = self
            .runtime
            .block_on(async {
                tokio::time::timeout(
                    scan_timeout + SCAN_GRACE,
                    discover(scan_timeout, prefix.as_deref()),
                )
                .await
                .map_err(|_| SensorViewError::Transport("scan timed out".to_string()))?
            })
            .context("Discovery failed")?;

        let (channel_count, data) = self.runtime.block_on(open_link(&peripheral))?;

        let up = Arc::new(AtomicBool::new(true));
        let watcher = self
            .runtime
            .spawn(watch_disconnect(adapter, peripheral.clone(), up.clone()));

        let identity = DeviceIdentity::new(
            name.unwrap_or_default(),
            peripheral.address().to_string(),
        );
        tracing::info!("BLE peripheral {} connected", identity.id);
        self.stats.reset();

        self.link = Some(Link {
            peripheral,
            channel_count,
            data,
            up,
            watcher,
        });
        Ok(identity)
    }

    fn disconnect(&mut self) {
        if let Some(link) = self.link.take() {
            link.watcher.abort();
            if let Err(e) = self.runtime.block_on(link.peripheral.disconnect()) {
                tracing::warn!("BLE disconnect failed: {}", e);
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.link
            .as_ref()
            .is_some_and(|link| link.up.load(Ordering::SeqCst))
    }

    fn read_channel_count(&mut self) -> Result<Vec<u8>> {
        let characteristic = self.link()?.channel_count.clone();
        self.read_characteristic(&characteristic)
    }

    fn read_frame(&mut self) -> Result<Vec<u8>> {
        let characteristic = self.link()?.data.clone();
        let started = Instant::now();
        match self.read_characteristic(&characteristic) {
            Ok(bytes) => {
                self.stats
                    .record_success(started.elapsed().as_micros() as u64, bytes.len() as u64);
                Ok(bytes)
            }
            Err(e) => {
                self.stats.record_failure();
                Err(e)
            }
        }
    }

    fn stats(&self) -> &DeviceStats {
        &self.stats
    }
}
