//! Backend construction helpers

use std::sync::{Arc, Mutex};
use std::time::Instant;

use sensorview_rs::backend::{
    BackendMessage, DeviceFactory, FrontendReceiver, SensorBackend, SensorDevice,
    SimulatedSensorArray,
};
use sensorview_rs::config::{AppConfig, DeviceConfig, SimulatedPattern, TransportKind};
use sensorview_rs::SensorViewError;

use super::backend_deadline;

/// Noiseless ramp array: channel `c` of frame `f` reads `f * 10 + c`
pub fn ramp_array(channels: u8) -> SimulatedSensorArray {
    SimulatedSensorArray::new(channels, SimulatedPattern::Ramp { step: 10, max: 60_000 })
}

/// Factory that hands out the prepared devices in order, one per connect
pub fn queued_factory(devices: Vec<SimulatedSensorArray>) -> DeviceFactory {
    let queue = Arc::new(Mutex::new(devices.into_iter()));
    Box::new(move |_: TransportKind, _: &DeviceConfig| {
        let next = queue.lock().unwrap().next();
        match next {
            Some(device) => Ok(Box::new(device) as Box<dyn SensorDevice>),
            None => Err(SensorViewError::DeviceNotFound),
        }
    })
}

/// Spawn a backend on its own thread with the given devices
pub fn spawn_backend(
    devices: Vec<SimulatedSensorArray>,
) -> (FrontendReceiver, std::thread::JoinHandle<()>) {
    spawn_backend_with(AppConfig::default(), devices)
}

/// Spawn a backend with a custom configuration
pub fn spawn_backend_with(
    config: AppConfig,
    devices: Vec<SimulatedSensorArray>,
) -> (FrontendReceiver, std::thread::JoinHandle<()>) {
    let (backend, frontend) = SensorBackend::with_factory(config, queued_factory(devices));
    let handle = backend.spawn().expect("spawn backend");
    (frontend, handle)
}

/// Collect messages until `pred` matches one, or the deadline passes
pub fn wait_for(
    frontend: &FrontendReceiver,
    mut pred: impl FnMut(&BackendMessage) -> bool,
) -> (Vec<BackendMessage>, bool) {
    let deadline = Instant::now() + backend_deadline();
    let mut seen = Vec::new();
    while Instant::now() < deadline {
        match frontend.receiver.recv_timeout(super::test_timeout()) {
            Ok(msg) => {
                let hit = pred(&msg);
                seen.push(msg);
                if hit {
                    return (seen, true);
                }
            }
            Err(_) => continue,
        }
    }
    (seen, false)
}
