//! Hierarchical metric names.
//!
//! Every metric exposed by the collector lives under a fixed three-segment
//! prefix followed by a device segment and one or more attribute segments:
//!
//! ```text
//! intel / disk / smart / sda / temperature / max
//! └──── prefix ──────┘  device └─ attribute path ─┘
//! ```
//!
//! The device segment is either a concrete device name or [`WILDCARD`],
//! which the collection engine expands to every enumerated device.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Vendor segment of every metric name.
pub const VENDOR: &str = "intel";
/// Class segment of every metric name.
pub const CLASS: &str = "disk";
/// Type segment of every metric name.
pub const TYPE: &str = "smart";
/// Device segment meaning "every enumerable device".
pub const WILDCARD: &str = "*";

const PREFIX: [&str; 3] = [VENDOR, CLASS, TYPE];
const DEVICE_INDEX: usize = PREFIX.len();
/// Prefix, device and at least one attribute segment.
const MIN_LEN: usize = DEVICE_INDEX + 2;

/// An ordered sequence of metric name segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(Vec<String>);

impl Namespace {
    /// Wraps raw segments without validating them.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Builds a metric name from a device and a `/`-separated attribute path.
    pub fn join(device: &str, attribute_path: &str) -> Self {
        let mut segments: Vec<String> = PREFIX.iter().map(|s| s.to_string()).collect();
        segments.push(device.to_string());
        segments.extend(attribute_path.split('/').map(str::to_string));
        Self(segments)
    }

    /// Returns the raw segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Checks the fixed prefix and that a device plus at least one attribute
    /// segment follow it. Never fails; callers decide how to react.
    pub fn is_valid(&self) -> bool {
        self.0.len() >= MIN_LEN && PREFIX.iter().zip(&self.0).all(|(want, got)| want == got)
    }

    /// Splits a valid name into `(device, attribute_path)`.
    ///
    /// Returns `None` when the name does not pass [`Namespace::is_valid`].
    pub fn split(&self) -> Option<(&str, String)> {
        if !self.is_valid() {
            return None;
        }
        let device = self.0[DEVICE_INDEX].as_str();
        let path = self.0[DEVICE_INDEX + 1..].join("/");
        Some((device, path))
    }

    /// Returns `true` when the device segment is the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        self.0.get(DEVICE_INDEX).is_some_and(|d| d == WILDCARD)
    }

    /// Returns a copy with the device segment replaced.
    ///
    /// Names too short to carry a device segment are returned unchanged.
    pub fn with_device(&self, device: &str) -> Self {
        let mut segments = self.0.clone();
        if let Some(slot) = segments.get_mut(DEVICE_INDEX) {
            *slot = device.to_string();
        }
        Self(segments)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

impl FromStr for Namespace {
    type Err = std::convert::Infallible;

    /// Parses `intel/disk/smart/sda/temperature` (a leading `/` is allowed).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s.split('/').filter(|s| !s.is_empty())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(segments: &[&str]) -> Namespace {
        Namespace::new(segments.iter().copied())
    }

    #[test]
    fn test_validate_accepts_single_and_multi_level_attributes() {
        assert!(ns(&["intel", "disk", "smart", "DEV", "abc"]).is_valid());
        assert!(ns(&["intel", "disk", "smart", "DEV", "abc", "def"]).is_valid());
    }

    #[test]
    fn test_validate_rejects_wrong_prefix() {
        assert!(!ns(&["intel", "cake", "smart", "DEV", "abc", "def"]).is_valid());
        assert!(!ns(&["intel", "disk", "dumb", "DEV", "abc", "def"]).is_valid());
        assert!(!ns(&["amd", "disk", "smart", "DEV", "abc"]).is_valid());
    }

    #[test]
    fn test_validate_rejects_short_names() {
        assert!(!ns(&[]).is_valid());
        assert!(!ns(&["cake"]).is_valid());
        assert!(!ns(&["intel", "disk", "smart"]).is_valid());
        assert!(!ns(&["intel", "disk", "smart", "DEV"]).is_valid());
    }

    #[test]
    fn test_split_single_level() {
        let name = ns(&["intel", "disk", "smart", "DEV", "abc"]);
        let (device, path) = name.split().unwrap();
        assert_eq!(device, "DEV");
        assert_eq!(path, "abc");
    }

    #[test]
    fn test_split_multi_level() {
        let name = ns(&["intel", "disk", "smart", "DEV", "abc", "def"]);
        let (device, path) = name.split().unwrap();
        assert_eq!(device, "DEV");
        assert_eq!(path, "abc/def");
    }

    #[test]
    fn test_split_invalid_is_none() {
        assert!(ns(&["intel", "disk", "smart", "DEV"]).split().is_none());
    }

    #[test]
    fn test_join_split_round_trip() {
        for (device, path) in [("sda", "temperature"), ("sdb", "temperature/max"), ("*", "a/b/c")] {
            let name = Namespace::join(device, path);
            assert!(name.is_valid());
            let (d, p) = name.split().unwrap();
            assert_eq!((d, p.as_str()), (device, path));
            assert_eq!(Namespace::join(d, &p), name);
        }
    }

    #[test]
    fn test_wildcard_and_device_substitution() {
        let name = Namespace::join(WILDCARD, "temperature");
        assert!(name.is_wildcard());

        let concrete = name.with_device("sdb");
        assert!(!concrete.is_wildcard());
        assert_eq!(concrete.to_string(), "/intel/disk/smart/sdb/temperature");
    }

    #[test]
    fn test_from_str() {
        let name: Namespace = "/intel/disk/smart/*/temperature/current".parse().unwrap();
        assert_eq!(name, Namespace::join("*", "temperature/current"));

        let bare: Namespace = "intel/disk/smart/sda/power_on_hours".parse().unwrap();
        assert_eq!(bare.split().unwrap(), ("sda", "power_on_hours".to_string()));
    }
}
