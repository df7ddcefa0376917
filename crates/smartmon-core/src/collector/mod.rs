//! SMART metrics collector.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       SmartCollector                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────┐  │
//! │  │   ConfigGate   │  │ per-pass cache │  │  frame::decode │  │
//! │  │ proc/dev roots │  │ device → attrs │  │  512-byte table│  │
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────┘  │
//! │          │                   │                               │
//! │   ┌──────▼──────┐     ┌──────▼──────┐                        │
//! │   │  FileSystem │     │DeviceGateway│ (traits)               │
//! │   └──────┬──────┘     └──────┬──────┘                        │
//! └──────────┼───────────────────┼───────────────────────────────┘
//!            │                   │
//!     ┌──────┴──────┐     ┌──────┴──────┐
//!     │ RealFs      │     │ AtaGateway  │ (Linux, HDIO_DRIVE_CMD)
//!     │ MockFs      │     │ MockGateway │ (Testing)
//!     └─────────────┘     └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use smartmon_core::collector::{AtaGateway, MetricRequest, RealFs, SmartCollector};
//!
//! let collector = SmartCollector::new(AtaGateway::new(RealFs::new()), RealFs::new());
//! let name = "intel/disk/smart/*/temperature".parse().unwrap();
//! let collection = collector.collect(&[MetricRequest::new(name)]).unwrap();
//! ```
//!
//! ## Testing (with mocks)
//!
//! ```
//! use smartmon_core::collector::mock::{FrameBuilder, MockFs, MockGateway};
//! use smartmon_core::collector::{MetricRequest, SmartCollector};
//! use smartmon_core::namespace::Namespace;
//!
//! let frame = FrameBuilder::new().attribute(9, 98, 98, 1200).build();
//! let gateway = MockGateway::new().with_device("sda", frame);
//! let collector = SmartCollector::new(gateway, MockFs::typical_system());
//!
//! let request = MetricRequest::new(Namespace::join("*", "power_on_hours"));
//! let collection = collector.collect(&[request]).unwrap();
//! assert_eq!(collection.metrics.len(), 1);
//! assert_eq!(collector.gateway().reads("sda"), 1);
//! ```

pub mod ata;
pub mod attributes;
#[allow(clippy::module_inception)]
mod collector;
pub mod config;
pub mod frame;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use ata::AtaGateway;
pub use collector::{
    CollectError, CollectWarning, Collection, Metric, MetricRequest, MetricType, SmartCollector,
};
pub use config::{ConfigError, ConfigGate, PathConfig, Roots};
pub use frame::{AttributeValue, DecodeError, DeviceAttributes, decode};
pub use traits::{DeviceGateway, FileSystem, GatewayError, RealFs};
