//! Abstractions over the filesystem and the storage devices.
//!
//! The `FileSystem` trait lets the configuration gate and the device
//! enumerator work against the real filesystem or an in-memory mock.
//! The `DeviceGateway` trait hides device-control plumbing so the collection
//! engine can be tested without hardware.

use std::fmt;
use std::io;
use std::path::Path;

use crate::collector::config::Roots;

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Checks if a path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;
}

/// Real filesystem implementation that delegates to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Error talking to a storage device.
#[derive(Debug)]
pub enum GatewayError {
    /// I/O error opening the device or issuing the control request.
    Io(io::Error),
    /// The platform or device does not support SMART reads.
    Unsupported(String),
    /// Device listing could not be parsed.
    Parse(String),
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Io(e) => write!(f, "I/O error: {}", e),
            GatewayError::Unsupported(msg) => write!(f, "unsupported: {}", msg),
            GatewayError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<io::Error> for GatewayError {
    fn from(e: io::Error) -> Self {
        GatewayError::Io(e)
    }
}

/// Access to storage devices and their SMART data.
///
/// Implementations must be safe to call from several collection passes at
/// once; reads may block.
pub trait DeviceGateway: Send + Sync {
    /// Lists the devices that can be queried, in a stable order.
    fn enumerate_devices(&self, roots: &Roots) -> Result<Vec<String>, GatewayError>;

    /// Reads the raw SMART data table of `device`.
    ///
    /// A well-behaved device returns exactly 512 bytes.
    fn read_attribute_frame(&self, roots: &Roots, device: &str) -> Result<Vec<u8>, GatewayError>;
}
