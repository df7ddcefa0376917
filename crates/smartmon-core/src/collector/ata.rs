//! Device gateway for ATA/SATA disks on Linux.
//!
//! Devices are listed from `<proc>/diskstats`; SMART data is read with the
//! `HDIO_DRIVE_CMD` ioctl on `<dev>/<device>`.

use std::path::Path;

use tracing::debug;

use crate::collector::config::Roots;
use crate::collector::frame::FRAME_LEN;
use crate::collector::procfs::parse_diskstats;
use crate::collector::traits::{DeviceGateway, FileSystem, GatewayError};

/// ATA SMART command.
pub const ATA_SMART_CMD: u8 = 0xB0;
/// SMART READ DATA feature register value.
pub const SMART_READ_DATA: u8 = 0xD0;
/// Argument header preceding the data returned by `HDIO_DRIVE_CMD`.
const HDIO_ARGS_LEN: usize = 4;

/// Reads SMART data from ATA disks through the Linux IDE/SCSI ioctl layer.
#[derive(Debug, Clone, Default)]
pub struct AtaGateway<F: FileSystem> {
    fs: F,
}

impl<F: FileSystem> AtaGateway<F> {
    /// Creates a gateway that lists devices through `fs`.
    pub fn new(fs: F) -> Self {
        Self { fs }
    }
}

impl<F: FileSystem> DeviceGateway for AtaGateway<F> {
    fn enumerate_devices(&self, roots: &Roots) -> Result<Vec<String>, GatewayError> {
        let path = roots.proc_path.join("diskstats");
        let content = self.fs.read_to_string(&path)?;
        let disks = parse_diskstats(&content).map_err(|e| GatewayError::Parse(e.message))?;

        let mut devices: Vec<String> = Vec::new();
        for disk in disks {
            if disk.is_smart_capable() && !devices.contains(&disk.device) {
                devices.push(disk.device);
            }
        }
        debug!("Enumerated {} disks from {}", devices.len(), path.display());
        Ok(devices)
    }

    fn read_attribute_frame(&self, roots: &Roots, device: &str) -> Result<Vec<u8>, GatewayError> {
        read_smart_data(&roots.dev_path.join(device))
    }
}

/// Builds the `HDIO_DRIVE_CMD` argument buffer for SMART READ DATA.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn smart_read_request() -> [u8; HDIO_ARGS_LEN + FRAME_LEN] {
    let mut buf = [0u8; HDIO_ARGS_LEN + FRAME_LEN];
    buf[0] = ATA_SMART_CMD;
    buf[1] = 0;
    buf[2] = SMART_READ_DATA;
    buf[3] = 1;
    buf
}

#[cfg(target_os = "linux")]
fn read_smart_data(path: &Path) -> Result<Vec<u8>, GatewayError> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::OpenOptionsExt;
    use std::os::unix::io::AsRawFd;

    const HDIO_DRIVE_CMD: libc::c_ulong = 0x031f;

    let file = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)?;

    let mut buf = smart_read_request();
    // SAFETY: `buf` is a live, writable buffer of 4 + 512 bytes, which is the
    // size HDIO_DRIVE_CMD writes for a one-sector transfer.
    let rc = unsafe { libc::ioctl(file.as_raw_fd(), HDIO_DRIVE_CMD as _, buf.as_mut_ptr()) };
    if rc != 0 {
        return Err(GatewayError::Io(std::io::Error::last_os_error()));
    }

    Ok(buf[HDIO_ARGS_LEN..].to_vec())
}

#[cfg(not(target_os = "linux"))]
fn read_smart_data(path: &Path) -> Result<Vec<u8>, GatewayError> {
    Err(GatewayError::Unsupported(format!(
        "SMART reads are only implemented on Linux ({})",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn roots() -> Roots {
        Roots::default()
    }

    #[test]
    fn test_enumerate_whole_disks_in_order() {
        let fs = MockFs::typical_system();
        let gateway = AtaGateway::new(fs);
        let devices = gateway.enumerate_devices(&roots()).unwrap();
        assert_eq!(devices, vec!["sda", "sdb"]);
    }

    #[test]
    fn test_enumerate_respects_proc_root() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/host/proc/diskstats",
            "   8      32 sdc 1 0 1 0 1 0 1 0 0 1 1 0 0 0 0\n",
        );
        let gateway = AtaGateway::new(fs);
        let roots = Roots {
            proc_path: "/host/proc".into(),
            dev_path: "/host/dev".into(),
        };
        assert_eq!(gateway.enumerate_devices(&roots).unwrap(), vec!["sdc"]);
    }

    #[test]
    fn test_enumerate_filters_by_major_number() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/diskstats",
            "\
   3       0 hda 1 0 1 0 1 0 1 0 0 1 1 0 0 0 0
  65       0 sdq 1 0 1 0 1 0 1 0 0 1 1 0 0 0 0
 252       0 sdz 1 0 1 0 1 0 1 0 0 1 1 0 0 0 0
 259       0 nvme0n1 1 0 1 0 1 0 1 0 0 1 1 0 0 0 0
",
        );
        let gateway = AtaGateway::new(fs);
        assert_eq!(gateway.enumerate_devices(&roots()).unwrap(), vec!["hda", "sdq"]);
    }

    #[test]
    fn test_enumerate_rejects_bad_major_number() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/diskstats", "   x       0 sda 1 0 1 0 1 0 1 0 0 1 1\n");
        let gateway = AtaGateway::new(fs);
        let err = gateway.enumerate_devices(&roots()).unwrap_err();
        assert!(matches!(err, GatewayError::Parse(ref msg) if msg.contains("major")));
    }

    #[test]
    fn test_enumerate_missing_diskstats() {
        let gateway = AtaGateway::new(MockFs::new());
        let err = gateway.enumerate_devices(&roots()).unwrap_err();
        assert!(matches!(err, GatewayError::Io(_)));
    }

    #[test]
    fn test_smart_read_request_layout() {
        let buf = smart_read_request();
        assert_eq!(&buf[..HDIO_ARGS_LEN], &[0xB0u8, 0, 0xD0, 1]);
        assert_eq!(buf.len(), HDIO_ARGS_LEN + FRAME_LEN);
    }

    #[test]
    fn test_read_missing_device_fails() {
        let gateway = AtaGateway::new(MockFs::new());
        let roots = Roots {
            proc_path: "/proc".into(),
            dev_path: "/nonexistent/dev/12345".into(),
        };
        assert!(gateway.read_attribute_frame(&roots, "sda").is_err());
    }
}
