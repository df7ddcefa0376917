//! Decoder for the 512-byte ATA SMART READ DATA table.
//!
//! Layout (offsets in bytes):
//!
//! ```text
//! 0..2     table revision
//! 2..362   30 attribute records, 12 bytes each
//! 362..512 offline data collection status, checksum, vendor data
//! ```
//!
//! Each record:
//!
//! ```text
//! 0      attribute id (0 = unused slot, end of table)
//! 1..3   status flags (little-endian)
//! 3      current normalized value
//! 4      worst normalized value
//! 5..11  raw value, vendor specific
//! 11     reserved
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collector::attributes::{RawFormat, attribute_name, raw_format};

/// Size of a full SMART data table.
pub const FRAME_LEN: usize = 512;
/// Bytes preceding the first attribute record.
pub const HEADER_LEN: usize = 2;
/// Size of one attribute record.
pub const RECORD_LEN: usize = 12;
/// Maximum number of attribute records in a table.
pub const MAX_RECORDS: usize = 30;

/// Error decoding a SMART data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer shorter than the table header.
    Truncated { len: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Truncated { len } => write!(
                f,
                "SMART frame truncated: {} bytes, need at least {}",
                len, HEADER_LEN
            ),
        }
    }
}

impl std::error::Error for DecodeError {}

/// One attribute record as stored in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeRecord {
    pub id: u8,
    pub flags: u16,
    pub current: u8,
    pub worst: u8,
    pub raw: [u8; 6],
}

impl AttributeRecord {
    fn parse(bytes: &[u8]) -> Self {
        let mut raw = [0u8; 6];
        raw.copy_from_slice(&bytes[5..11]);
        Self {
            id: bytes[0],
            flags: u16::from_le_bytes([bytes[1], bytes[2]]),
            current: bytes[3],
            worst: bytes[4],
            raw,
        }
    }

    /// Raw bytes assembled little-endian into an unsigned integer.
    pub fn raw_value(&self) -> u64 {
        let r = self.raw;
        u64::from_le_bytes([r[0], r[1], r[2], r[3], r[4], r[5], 0, 0])
    }

    fn raw_u16_at(&self, offset: usize) -> u64 {
        u16::from_le_bytes([self.raw[offset], self.raw[offset + 1]]) as u64
    }

    /// Raw value interpreted according to `format`.
    pub fn interpret(&self, format: RawFormat) -> AttributeValue {
        match format {
            RawFormat::Counter48 => AttributeValue::Integer(self.raw_value()),
            RawFormat::Counter32 => AttributeValue::Integer(self.raw_value() & 0xFFFF_FFFF),
            RawFormat::Counter16 => AttributeValue::Integer(self.raw_u16_at(0)),
            RawFormat::Temperature => AttributeValue::Composite(
                format
                    .subfields()
                    .iter()
                    .map(|(name, offset)| (name.to_string(), self.raw[*offset] as u64))
                    .collect(),
            ),
        }
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(u64),
    RawBytes(Vec<u8>),
    Composite(BTreeMap<String, u64>),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(v) => write!(f, "{}", v),
            AttributeValue::RawBytes(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            AttributeValue::Composite(fields) => {
                let parts: Vec<String> = fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{}", parts.join(","))
            }
        }
    }
}

/// Decoded attribute values of one device, keyed by attribute path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceAttributes {
    values: HashMap<String, AttributeValue>,
}

impl DeviceAttributes {
    pub fn get(&self, path: &str) -> Option<&AttributeValue> {
        self.values.get(path)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Attribute paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.values.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    fn insert_record(&mut self, record: &AttributeRecord) {
        let name = attribute_name(record.id);
        let format = raw_format(record.id);
        let value = record.interpret(format);

        if let AttributeValue::Composite(fields) = &value {
            for (sub, v) in fields {
                self.values
                    .insert(format!("{}/{}", name, sub), AttributeValue::Integer(*v));
            }
        }
        self.values.insert(
            format!("{}/normalized", name),
            AttributeValue::Integer(record.current as u64),
        );
        self.values
            .insert(format!("{}/worst", name), AttributeValue::Integer(record.worst as u64));
        self.values
            .insert(format!("{}/raw", name), AttributeValue::RawBytes(record.raw.to_vec()));
        self.values.insert(name, value);
    }
}

/// Iterates over the populated attribute records of a table.
///
/// Stops at the first slot with identifier 0 or at the end of the buffer,
/// whichever comes first.
pub fn records(frame: &[u8]) -> Result<impl Iterator<Item = AttributeRecord> + '_, DecodeError> {
    if frame.len() < HEADER_LEN {
        return Err(DecodeError::Truncated { len: frame.len() });
    }
    Ok(frame[HEADER_LEN..]
        .chunks_exact(RECORD_LEN)
        .take(MAX_RECORDS)
        .map(AttributeRecord::parse)
        .take_while(|record| record.id != 0))
}

/// Decodes a SMART data table into per-path attribute values.
///
/// When an identifier appears more than once, the first record wins.
pub fn decode(frame: &[u8]) -> Result<DeviceAttributes, DecodeError> {
    let mut attributes = DeviceAttributes::default();
    let mut seen = [false; 256];

    for record in records(frame)? {
        if std::mem::replace(&mut seen[record.id as usize], true) {
            continue;
        }
        attributes.insert_record(&record);
    }

    Ok(attributes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::FrameBuilder;

    #[test]
    fn test_decode_single_counter() {
        let frame = FrameBuilder::new()
            .attribute(5, 100, 99, 12)
            .build();
        let attrs = decode(&frame).unwrap();

        assert_eq!(attrs.get("reallocated_sectors"), Some(&AttributeValue::Integer(12)));
        assert_eq!(
            attrs.get("reallocated_sectors/normalized"),
            Some(&AttributeValue::Integer(100))
        );
        assert_eq!(attrs.get("reallocated_sectors/worst"), Some(&AttributeValue::Integer(99)));
        assert_eq!(
            attrs.get("reallocated_sectors/raw"),
            Some(&AttributeValue::RawBytes(vec![12, 0, 0, 0, 0, 0]))
        );
        assert_eq!(attrs.len(), 4);
    }

    #[test]
    fn test_decode_empty_table() {
        let frame = [0u8; FRAME_LEN];
        let attrs = decode(&frame).unwrap();
        assert!(attrs.is_empty());
    }

    #[test]
    fn test_decode_stops_at_first_unused_slot() {
        let mut frame = FrameBuilder::new().attribute(1, 100, 100, 0).build();
        // Slot 2 is populated but slot 1 is empty.
        frame[HEADER_LEN + 2 * RECORD_LEN] = 12;

        let attrs = decode(&frame).unwrap();
        assert!(attrs.get("read_error_rate").is_some());
        assert!(attrs.get("power_cycle_count").is_none());
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(decode(&[]), Err(DecodeError::Truncated { len: 0 }));
        assert_eq!(decode(&[0x10]), Err(DecodeError::Truncated { len: 1 }));
    }

    #[test]
    fn test_decode_short_buffer_uses_complete_slots() {
        let full = FrameBuilder::new()
            .attribute(9, 90, 90, 1000)
            .attribute(12, 100, 100, 55)
            .build();
        // Header plus one and a half records.
        let attrs = decode(&full[..HEADER_LEN + RECORD_LEN + 6]).unwrap();
        assert_eq!(attrs.get("power_on_hours"), Some(&AttributeValue::Integer(1000)));
        assert!(attrs.get("power_cycle_count").is_none());
    }

    #[test]
    fn test_decode_full_table() {
        let mut builder = FrameBuilder::new();
        for id in 1..=MAX_RECORDS as u8 {
            builder = builder.attribute(id, 100, 100, id as u64);
        }
        let attrs = decode(&builder.build()).unwrap();
        assert_eq!(attrs.get("read_error_rate"), Some(&AttributeValue::Integer(1)));
        assert_eq!(attrs.get("attribute_30"), Some(&AttributeValue::Integer(30)));
    }

    #[test]
    fn test_decode_temperature_composite() {
        let frame = FrameBuilder::new()
            .raw_attribute(194, 64, 50, [36, 0, 18, 0, 47, 0])
            .build();
        let attrs = decode(&frame).unwrap();

        let expected: BTreeMap<String, u64> = [("current", 36), ("max", 47), ("min", 18)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(attrs.get("temperature"), Some(&AttributeValue::Composite(expected)));
        assert_eq!(attrs.get("temperature/current"), Some(&AttributeValue::Integer(36)));
        assert_eq!(attrs.get("temperature/min"), Some(&AttributeValue::Integer(18)));
        assert_eq!(attrs.get("temperature/max"), Some(&AttributeValue::Integer(47)));
    }

    #[test]
    fn test_decode_power_on_hours_ignores_upper_bytes() {
        let frame = FrameBuilder::new()
            .raw_attribute(9, 95, 95, [0x10, 0x27, 0, 0, 0xAB, 0xCD])
            .build();
        let attrs = decode(&frame).unwrap();
        assert_eq!(attrs.get("power_on_hours"), Some(&AttributeValue::Integer(10_000)));
    }

    #[test]
    fn test_decode_spin_up_time_low_word() {
        let frame = FrameBuilder::new()
            .raw_attribute(3, 97, 97, [0x2C, 0x01, 0x50, 0x02, 0, 0])
            .build();
        let attrs = decode(&frame).unwrap();
        assert_eq!(attrs.get("spin_up_time"), Some(&AttributeValue::Integer(300)));
    }

    #[test]
    fn test_decode_unknown_id_uses_synthetic_name() {
        let frame = FrameBuilder::new().attribute(99, 100, 100, 7).build();
        let attrs = decode(&frame).unwrap();
        assert_eq!(attrs.get("attribute_99"), Some(&AttributeValue::Integer(7)));
    }

    #[test]
    fn test_decode_duplicate_id_first_wins() {
        let frame = FrameBuilder::new()
            .attribute(5, 100, 100, 1)
            .attribute(5, 100, 100, 2)
            .build();
        let attrs = decode(&frame).unwrap();
        assert_eq!(attrs.get("reallocated_sectors"), Some(&AttributeValue::Integer(1)));
    }

    #[test]
    fn test_raw_value_little_endian_48bit() {
        let record = AttributeRecord::parse(&[
            241, 0x32, 0x00, 100, 100, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0,
        ]);
        assert_eq!(record.flags, 0x32);
        assert_eq!(record.raw_value(), 0x0605_0403_0201);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(AttributeValue::Integer(42).to_string(), "42");
        assert_eq!(AttributeValue::RawBytes(vec![0x0a, 0xff]).to_string(), "0aff");
        let composite = AttributeValue::Composite(
            [("current".to_string(), 30), ("max".to_string(), 40)].into_iter().collect(),
        );
        assert_eq!(composite.to_string(), "current=30,max=40");
    }
}
