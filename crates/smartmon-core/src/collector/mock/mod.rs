//! In-memory mocks for testing collectors without real devices.
//!
//! - `MockFs` simulates the filesystem (roots, `/proc/diskstats`)
//! - `MockGateway` simulates devices and counts SMART reads
//! - `FrameBuilder` assembles SMART data tables byte by byte

mod filesystem;
mod gateway;
mod scenarios;

pub use filesystem::MockFs;
pub use gateway::MockGateway;
pub use scenarios::FrameBuilder;
