//! Parsers for `/proc` filesystem files.
//!
//! Pure functions over file contents, testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// One block device line from `/proc/diskstats`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskEntry {
    /// Block device major number.
    pub major: u32,
    /// Device name (sda, sdb1, nvme0n1, etc.)
    pub device: String,
}

/// Parses `/proc/diskstats` content.
///
/// Format: major minor name reads r_merged r_sectors ... (only the major
/// number and the name are used). Lines with fewer than 14 columns are skipped.
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskEntry>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let major: u32 = parts[0]
            .parse()
            .map_err(|_| ParseError::new(format!("invalid major number '{}'", parts[0])))?;

        disks.push(DiskEntry {
            major,
            device: parts[2].to_string(),
        });
    }

    Ok(disks)
}

impl DiskEntry {
    /// Whole ATA/SCSI disk, judged by both its major number and its name.
    pub fn is_smart_capable(&self) -> bool {
        is_disk_major(self.major) && is_smart_capable_disk(&self.device)
    }
}

/// Returns `true` for block majors assigned to SCSI disks (`sd`) and IDE
/// disks (`hd`). NVMe (`259`, blkext), device mapper and loop devices are
/// excluded.
pub fn is_disk_major(major: u32) -> bool {
    matches!(
        major,
        8 | 65..=71 | 128..=135 // sd
            | 3 | 22 | 33 | 34 | 56 | 57 | 88..=91 // hd
    )
}

/// Returns `true` for whole ATA/SCSI disks (`sda`, `hdb`, `sdaa`), `false`
/// for partitions and other block devices.
pub fn is_smart_capable_disk(name: &str) -> bool {
    let suffix = match name.strip_prefix("sd").or_else(|| name.strip_prefix("hd")) {
        Some(s) => s,
        None => return false,
    };
    !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diskstats() {
        let content = "\
   8       0 sda 1234 0 56789 100 5678 0 98765 200 0 150 300 0 0 0 0
   8       1 sda1 1000 0 50000 80 5000 0 90000 180 0 130 260 0 0 0 0
 259       0 nvme0n1 9999 0 123456 500 8888 0 654321 400 5 1000 2000 0 0 0 0
";
        let disks = parse_diskstats(content).unwrap();

        assert_eq!(disks.len(), 3);
        assert_eq!(disks[0].major, 8);
        assert_eq!(disks[0].device, "sda");
        assert_eq!(disks[1].device, "sda1");
        assert_eq!(disks[2].major, 259);
        assert_eq!(disks[2].device, "nvme0n1");
    }

    #[test]
    fn test_parse_diskstats_skips_short_lines() {
        let content = "8 0 sda\n\n   8       16 sdb 1 0 1 0 1 0 1 0 0 1 1\n";
        let disks = parse_diskstats(content).unwrap();
        assert_eq!(disks.len(), 1);
        assert_eq!(disks[0].device, "sdb");
    }

    #[test]
    fn test_parse_diskstats_rejects_bad_numbers() {
        let content = "   x       0 sda 1 0 1 0 1 0 1 0 0 1 1\n";
        let err = parse_diskstats(content).unwrap_err();
        assert!(err.message.contains("major"));
    }

    #[test]
    fn test_is_disk_major() {
        for major in [8, 65, 71, 128, 135, 3, 22, 33, 34, 56, 57, 88, 91] {
            assert!(is_disk_major(major), "major {}", major);
        }
        for major in [0, 7, 9, 64, 72, 136, 252, 253, 259] {
            assert!(!is_disk_major(major), "major {}", major);
        }
    }

    #[test]
    fn test_disk_entry_is_smart_capable() {
        let entry = |major, device: &str| DiskEntry {
            major,
            device: device.to_string(),
        };
        assert!(entry(8, "sda").is_smart_capable());
        assert!(entry(65, "sdq").is_smart_capable());
        assert!(entry(3, "hda").is_smart_capable());
        assert!(!entry(8, "sda1").is_smart_capable());
        assert!(!entry(259, "nvme0n1").is_smart_capable());
        // Name alone is not enough.
        assert!(!entry(252, "sdz").is_smart_capable());
    }

    #[test]
    fn test_is_smart_capable_disk() {
        assert!(is_smart_capable_disk("sda"));
        assert!(is_smart_capable_disk("sdaa"));
        assert!(is_smart_capable_disk("hdb"));
        assert!(!is_smart_capable_disk("sda1"));
        assert!(!is_smart_capable_disk("sd"));
        assert!(!is_smart_capable_disk("nvme0n1"));
        assert!(!is_smart_capable_disk("loop0"));
        assert!(!is_smart_capable_disk("dm-0"));
    }
}
