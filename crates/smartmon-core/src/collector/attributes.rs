//! Static catalogue of ATA SMART attribute identifiers.
//!
//! Maps the one-byte attribute identifier found in the SMART data table to
//! the attribute path exposed in metric names, a description, and the way
//! the six vendor-specific raw bytes should be interpreted.

/// How the six raw bytes of an attribute record are turned into a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// All six bytes as a little-endian counter.
    Counter48,
    /// Low four bytes; the upper bytes carry unrelated vendor data.
    Counter32,
    /// Low two bytes.
    Counter16,
    /// Current, lowest and highest temperature in bytes 0, 2 and 4.
    Temperature,
}

impl RawFormat {
    /// Subfield names and raw byte offsets for composite formats.
    pub fn subfields(self) -> &'static [(&'static str, usize)] {
        match self {
            RawFormat::Temperature => &[("current", 0), ("min", 2), ("max", 4)],
            _ => &[],
        }
    }
}

/// One known SMART attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeSpec {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub format: RawFormat,
}

const fn attr(
    id: u8,
    name: &'static str,
    description: &'static str,
    format: RawFormat,
) -> AttributeSpec {
    AttributeSpec {
        id,
        name,
        description,
        format,
    }
}

use RawFormat::{Counter16, Counter32, Counter48, Temperature};

/// Known attributes, sorted by identifier.
pub static ATTRIBUTES: &[AttributeSpec] = &[
    attr(1, "read_error_rate", "Raw read error rate", Counter48),
    attr(2, "throughput_performance", "Overall throughput performance", Counter48),
    attr(3, "spin_up_time", "Average spin-up time in milliseconds", Counter16),
    attr(4, "start_stop_count", "Spindle start/stop cycles", Counter48),
    attr(5, "reallocated_sectors", "Reallocated sector count", Counter48),
    attr(7, "seek_error_rate", "Seek error rate", Counter48),
    attr(8, "seek_time_performance", "Average seek performance", Counter48),
    attr(9, "power_on_hours", "Hours spent in power-on state", Counter32),
    attr(10, "spin_retry_count", "Spin-up retry attempts", Counter48),
    attr(11, "calibration_retry_count", "Recalibration retry attempts", Counter48),
    attr(12, "power_cycle_count", "Full power on/off cycles", Counter48),
    attr(13, "read_soft_error_rate", "Uncorrected read errors reported to the OS", Counter48),
    attr(170, "available_reserved_space", "Available reserved blocks", Counter48),
    attr(171, "program_fail_count", "Flash program failures", Counter48),
    attr(172, "erase_fail_count", "Flash erase failures", Counter48),
    attr(173, "wear_leveling_count", "Maximum erase count of any block", Counter48),
    attr(174, "unexpected_power_loss", "Unexpected power loss events", Counter48),
    attr(177, "wear_range_delta", "Wear difference between most and least worn blocks", Counter48),
    attr(179, "used_reserved_blocks", "Used reserved blocks", Counter48),
    attr(180, "unused_reserved_blocks", "Unused reserved blocks", Counter48),
    attr(181, "program_fail_count_total", "Total flash program failures", Counter48),
    attr(182, "erase_fail_count_total", "Total flash erase failures", Counter48),
    attr(183, "runtime_bad_blocks", "Blocks marked bad at runtime", Counter48),
    attr(184, "end_to_end_errors", "End-to-end parity errors", Counter48),
    attr(187, "reported_uncorrectable", "Errors not recoverable by hardware ECC", Counter48),
    attr(188, "command_timeout", "Aborted operations due to timeout", Counter48),
    attr(189, "high_fly_writes", "Writes with head flying outside normal range", Counter48),
    attr(190, "airflow_temperature", "Airflow temperature in degrees Celsius", Temperature),
    attr(191, "g_sense_error_rate", "Errors caused by externally induced shock", Counter48),
    attr(192, "power_off_retract_count", "Emergency head retract events", Counter48),
    attr(193, "load_cycle_count", "Head load/unload cycles", Counter48),
    attr(194, "temperature", "Drive temperature in degrees Celsius", Temperature),
    attr(195, "hardware_ecc_recovered", "Errors recovered by hardware ECC", Counter48),
    attr(196, "reallocation_events", "Remap operations", Counter48),
    attr(197, "pending_sectors", "Sectors waiting to be remapped", Counter48),
    attr(198, "offline_uncorrectable", "Uncorrectable errors found by offline scan", Counter48),
    attr(199, "udma_crc_errors", "Interface CRC errors during UDMA transfers", Counter48),
    attr(200, "multi_zone_error_rate", "Write error rate", Counter48),
    attr(201, "soft_read_error_rate", "Off-track read errors", Counter48),
    attr(220, "disk_shift", "Platter shift relative to the spindle", Counter48),
    attr(222, "loaded_hours", "Hours spent with heads loaded", Counter32),
    attr(223, "load_retry_count", "Head load retries", Counter48),
    attr(224, "load_friction", "Resistance caused by friction during loading", Counter48),
    attr(225, "load_unload_cycles", "Total load cycles", Counter48),
    attr(226, "load_in_time", "Total time heads spent loaded", Counter48),
    attr(230, "gmr_head_amplitude", "Head flying height amplitude", Counter48),
    attr(231, "ssd_life_left", "Remaining SSD life", Counter48),
    attr(232, "endurance_remaining", "Remaining rated endurance", Counter48),
    attr(233, "media_wearout_indicator", "Media wearout indicator", Counter48),
    attr(240, "head_flying_hours", "Hours spent positioning the heads", Counter32),
    attr(241, "total_lbas_written", "Total logical blocks written", Counter48),
    attr(242, "total_lbas_read", "Total logical blocks read", Counter48),
    attr(254, "free_fall_protection", "Free fall events detected", Counter48),
];

/// Looks up a known attribute by identifier.
pub fn lookup(id: u8) -> Option<&'static AttributeSpec> {
    ATTRIBUTES
        .binary_search_by_key(&id, |a| a.id)
        .ok()
        .map(|idx| &ATTRIBUTES[idx])
}

/// Attribute path for `id`: the catalogue name, or `attribute_<id>`.
pub fn attribute_name(id: u8) -> String {
    match lookup(id) {
        Some(spec) => spec.name.to_string(),
        None => format!("attribute_{}", id),
    }
}

/// Interpretation of the raw bytes for `id`.
pub fn raw_format(id: u8) -> RawFormat {
    lookup(id).map(|spec| spec.format).unwrap_or(RawFormat::Counter48)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted_and_unique() {
        for pair in ATTRIBUTES.windows(2) {
            assert!(pair[0].id < pair[1].id, "{} !< {}", pair[0].id, pair[1].id);
        }
    }

    #[test]
    fn test_names_are_single_segment() {
        for spec in ATTRIBUTES {
            assert!(!spec.name.is_empty());
            assert!(!spec.name.contains('/'), "{}", spec.name);
        }
    }

    #[test]
    fn test_lookup_known_and_unknown() {
        assert_eq!(attribute_name(194), "temperature");
        assert_eq!(attribute_name(5), "reallocated_sectors");
        assert_eq!(attribute_name(99), "attribute_99");
        assert_eq!(raw_format(194), RawFormat::Temperature);
        assert_eq!(raw_format(9), RawFormat::Counter32);
        assert_eq!(raw_format(99), RawFormat::Counter48);
    }
}
