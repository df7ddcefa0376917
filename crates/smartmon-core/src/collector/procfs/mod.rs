//! Device enumeration from the Linux `/proc` filesystem.

pub mod parser;

pub use parser::{DiskEntry, ParseError, is_disk_major, is_smart_capable_disk, parse_diskstats};
