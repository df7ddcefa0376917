//! smartmon-core — SMART disk health collection.
//!
//! Provides:
//! - `namespace` — hierarchical metric names (`intel/disk/smart/<device>/<attribute>`)
//! - `collector` — SMART table decoding, device access, configuration and
//!   the collection engine

pub mod collector;
pub mod namespace;
