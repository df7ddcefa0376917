//! Pre-built fixtures: a typical host filesystem and SMART frame builder.

use super::filesystem::MockFs;
use crate::collector::frame::{FRAME_LEN, HEADER_LEN, MAX_RECORDS, RECORD_LEN};

impl MockFs {
    /// Creates a typical host with `/proc`, `/dev` and two SATA disks.
    ///
    /// `/proc/diskstats` lists `sda` (with a partition), `sdb` and an NVMe
    /// namespace that is not SMART-capable through the ATA path.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();
        fs.add_dir("/dev");
        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
   8      16 sdb 2222 10 88888 700 1111 5 44444 300 0 900 1000 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
",
        );
        fs
    }
}

/// Builds a SMART data table one attribute record at a time.
///
/// Records are written to consecutive slots starting at slot 0.
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    frame: Vec<u8>,
    slot: usize,
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuilder {
    pub fn new() -> Self {
        let mut frame = vec![0u8; FRAME_LEN];
        // Table revision.
        frame[0] = 0x10;
        Self { frame, slot: 0 }
    }

    /// Appends a record whose raw value is `raw` (low 48 bits, little-endian).
    pub fn attribute(self, id: u8, current: u8, worst: u8, raw: u64) -> Self {
        let bytes = raw.to_le_bytes();
        let mut six = [0u8; 6];
        six.copy_from_slice(&bytes[..6]);
        self.raw_attribute(id, current, worst, six)
    }

    /// Appends a record with explicit raw bytes.
    ///
    /// # Panics
    /// Panics when all 30 slots are already used.
    pub fn raw_attribute(mut self, id: u8, current: u8, worst: u8, raw: [u8; 6]) -> Self {
        assert!(self.slot < MAX_RECORDS, "SMART table holds at most {} records", MAX_RECORDS);
        let offset = HEADER_LEN + self.slot * RECORD_LEN;
        let record = &mut self.frame[offset..offset + RECORD_LEN];
        record[0] = id;
        record[1] = 0x33;
        record[2] = 0x00;
        record[3] = current;
        record[4] = worst;
        record[5..11].copy_from_slice(&raw);
        self.slot += 1;
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.frame
    }
}
