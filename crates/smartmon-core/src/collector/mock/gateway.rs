//! Scripted device gateway with read counters.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use crate::collector::config::Roots;
use crate::collector::traits::{DeviceGateway, GatewayError};

#[derive(Debug, Clone)]
enum Device {
    Frame(Vec<u8>),
    Failing(String),
}

/// Device gateway that serves fixed frames from memory.
///
/// Devices are enumerated in insertion order. Every `read_attribute_frame`
/// call is counted per device, including reads of unknown devices.
#[derive(Debug, Default)]
pub struct MockGateway {
    order: Vec<String>,
    devices: HashMap<String, Device>,
    enumerate_error: Option<String>,
    reads: Mutex<HashMap<String, usize>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device that returns `frame` when read.
    pub fn with_device(mut self, name: &str, frame: Vec<u8>) -> Self {
        self.insert(name, Device::Frame(frame));
        self
    }

    /// Adds a device whose reads fail with an I/O error carrying `message`.
    pub fn with_failing_device(mut self, name: &str, message: &str) -> Self {
        self.insert(name, Device::Failing(message.to_string()));
        self
    }

    /// Makes device enumeration fail.
    pub fn with_enumerate_error(mut self, message: &str) -> Self {
        self.enumerate_error = Some(message.to_string());
        self
    }

    fn insert(&mut self, name: &str, device: Device) {
        if !self.devices.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.devices.insert(name.to_string(), device);
    }

    /// Number of frame reads issued for `device`.
    pub fn reads(&self, device: &str) -> usize {
        self.reads.lock().unwrap().get(device).copied().unwrap_or(0)
    }

    /// Number of frame reads across all devices.
    pub fn total_reads(&self) -> usize {
        self.reads.lock().unwrap().values().sum()
    }
}

impl DeviceGateway for MockGateway {
    fn enumerate_devices(&self, _roots: &Roots) -> Result<Vec<String>, GatewayError> {
        match &self.enumerate_error {
            Some(message) => Err(GatewayError::Io(io::Error::other(message.clone()))),
            None => Ok(self.order.clone()),
        }
    }

    fn read_attribute_frame(&self, _roots: &Roots, device: &str) -> Result<Vec<u8>, GatewayError> {
        *self.reads.lock().unwrap().entry(device.to_string()).or_default() += 1;

        match self.devices.get(device) {
            Some(Device::Frame(frame)) => Ok(frame.clone()),
            Some(Device::Failing(message)) => Err(GatewayError::Io(io::Error::other(message.clone()))),
            None => Err(GatewayError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such device: {}", device),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumeration_order_and_read_counts() {
        let gateway = MockGateway::new()
            .with_device("sdb", vec![0; 512])
            .with_failing_device("sda", "boom");
        let roots = Roots::default();

        assert_eq!(gateway.enumerate_devices(&roots).unwrap(), vec!["sdb", "sda"]);
        assert!(gateway.read_attribute_frame(&roots, "sdb").is_ok());
        assert!(gateway.read_attribute_frame(&roots, "sda").is_err());
        assert!(gateway.read_attribute_frame(&roots, "sda").is_err());
        assert_eq!(gateway.reads("sdb"), 1);
        assert_eq!(gateway.reads("sda"), 2);
        assert_eq!(gateway.total_reads(), 3);
    }

    #[test]
    fn test_enumerate_error() {
        let gateway = MockGateway::new().with_enumerate_error("no proc");
        assert!(gateway.enumerate_devices(&Roots::default()).is_err());
    }
}
