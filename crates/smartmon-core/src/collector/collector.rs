//! Collection engine.
//!
//! `SmartCollector` turns a batch of requested metric names into concrete
//! device reads. Each call to [`SmartCollector::collect`] is one pass: it
//! shares one timestamp and one per-device cache, so every device is read
//! and decoded at most once however many requests reference it.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::collector::attributes::ATTRIBUTES;
use crate::collector::config::{ConfigError, ConfigGate, PathConfig, Roots};
use crate::collector::frame::{AttributeValue, DeviceAttributes, decode};
use crate::collector::traits::{DeviceGateway, FileSystem, GatewayError};
use crate::namespace::{Namespace, WILDCARD};

/// One requested metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRequest {
    pub namespace: Namespace,
    /// Only the first request of the first pass seeds the configuration.
    pub config: Option<PathConfig>,
}

impl MetricRequest {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            config: None,
        }
    }

    pub fn with_config(mut self, config: PathConfig) -> Self {
        self.config = Some(config);
        self
    }
}

/// A collected metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    /// Requested name with the device segment made concrete.
    pub namespace: Namespace,
    pub timestamp: DateTime<Utc>,
    pub value: AttributeValue,
}

/// An advertised metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricType {
    pub namespace: Namespace,
    pub description: String,
}

/// A request that could not be served. The rest of the pass carries on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CollectWarning {
    /// Name does not have the `intel/disk/smart/<device>/<attribute>` shape.
    InvalidNamespace(Namespace),
    /// Device is not among the enumerated devices.
    UnknownDevice(String),
    /// Device was read but does not report the attribute.
    UnknownAttribute { device: String, path: String },
    /// Reading or decoding the device's SMART data failed.
    DeviceRead { device: String, reason: String },
}

impl fmt::Display for CollectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectWarning::InvalidNamespace(ns) => write!(f, "{} is not a valid metric", ns),
            CollectWarning::UnknownDevice(device) => write!(f, "{} is not a valid disk", device),
            CollectWarning::UnknownAttribute { device, path } => {
                write!(f, "unknown attribute {} on {}", path, device)
            }
            CollectWarning::DeviceRead { device, reason } => {
                write!(f, "failed to read SMART data from {}: {}", device, reason)
            }
        }
    }
}

/// Error that aborts a whole pass.
#[derive(Debug)]
pub enum CollectError {
    /// Filesystem roots could not be resolved.
    Config(ConfigError),
    /// Device enumeration failed, so no request can be checked.
    Enumerate(GatewayError),
    /// The only device requested in the pass could not be read; carries
    /// every warning of the pass, ending with the read failure.
    DeviceRead {
        device: String,
        warnings: Vec<CollectWarning>,
    },
    /// No metric was collected; carries every warning of the pass.
    NothingCollected(Vec<CollectWarning>),
}

impl fmt::Display for CollectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectError::Config(e) => write!(f, "configuration error: {}", e),
            CollectError::Enumerate(e) => write!(f, "failed to list devices: {}", e),
            CollectError::DeviceRead { warnings, .. } => write_warnings(f, warnings),
            CollectError::NothingCollected(warnings) if warnings.is_empty() => {
                write!(f, "no metrics collected")
            }
            CollectError::NothingCollected(warnings) => write_warnings(f, warnings),
        }
    }
}

fn write_warnings(f: &mut fmt::Formatter<'_>, warnings: &[CollectWarning]) -> fmt::Result {
    let messages: Vec<String> = warnings.iter().map(|w| w.to_string()).collect();
    write!(f, "{}", messages.join("; "))
}

impl std::error::Error for CollectError {}

impl From<ConfigError> for CollectError {
    fn from(e: ConfigError) -> Self {
        CollectError::Config(e)
    }
}

/// Result of a pass with at least one collected metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Collected metrics in request order, wildcard requests expanded in
    /// enumeration order.
    pub metrics: Vec<Metric>,
    pub warnings: Vec<CollectWarning>,
}

/// A request resolved to one concrete device.
struct Target {
    namespace: Namespace,
    device: String,
    path: String,
}

/// SMART metrics collector.
///
/// Safe to share between threads; concurrent passes only share the lazily
/// resolved filesystem roots.
pub struct SmartCollector<G: DeviceGateway, F: FileSystem> {
    gateway: G,
    gate: ConfigGate<F>,
}

impl<G: DeviceGateway, F: FileSystem> SmartCollector<G, F> {
    /// Creates a collector.
    ///
    /// # Arguments
    /// * `gateway` - Device access (real or mock)
    /// * `fs` - Filesystem used to validate configured roots
    pub fn new(gateway: G, fs: F) -> Self {
        Self {
            gateway,
            gate: ConfigGate::new(fs),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Roots resolved by the first successful call, if any.
    pub fn roots(&self) -> Option<Roots> {
        self.gate.resolved()
    }

    /// Advertises every known attribute path under the wildcard device.
    ///
    /// Resolves the filesystem roots from `config` on first use; no device
    /// is touched.
    pub fn metric_types(&self, config: Option<&PathConfig>) -> Result<Vec<MetricType>, CollectError> {
        self.gate.resolve(config)?;

        let mut types = Vec::new();
        for spec in ATTRIBUTES {
            let mut push = |path: String, description: String| {
                types.push(MetricType {
                    namespace: Namespace::join(WILDCARD, &path),
                    description,
                });
            };
            push(spec.name.to_string(), spec.description.to_string());
            for (sub, _) in spec.format.subfields() {
                push(
                    format!("{}/{}", spec.name, sub),
                    format!("{} ({})", spec.description, sub),
                );
            }
            push(
                format!("{}/normalized", spec.name),
                format!("{} (normalized value)", spec.description),
            );
            push(
                format!("{}/worst", spec.name),
                format!("{} (worst normalized value)", spec.description),
            );
            push(
                format!("{}/raw", spec.name),
                format!("{} (raw bytes)", spec.description),
            );
        }
        Ok(types)
    }

    /// Runs one collection pass over `requests`.
    ///
    /// Individual failures become warnings. The pass fails only when the
    /// configuration is invalid, devices cannot be listed, the single
    /// requested device cannot be read, or nothing at all was collected.
    pub fn collect(&self, requests: &[MetricRequest]) -> Result<Collection, CollectError> {
        let roots = self
            .gate
            .resolve(requests.first().and_then(|r| r.config.as_ref()))?;
        let timestamp = Utc::now();
        let mut warnings = Vec::new();

        let targets = self.resolve_targets(&roots, requests, &mut warnings)?;

        let mut distinct: Vec<&str> = Vec::new();
        for target in &targets {
            if !distinct.contains(&target.device.as_str()) {
                distinct.push(&target.device);
            }
        }

        let mut cache: HashMap<&str, Option<Rc<DeviceAttributes>>> = HashMap::new();
        let mut metrics = Vec::new();

        for target in &targets {
            let attributes = match cache.get(target.device.as_str()) {
                Some(cached) => cached.clone(),
                None => {
                    let read = match self.read_device(&roots, &target.device) {
                        Ok(attributes) => Some(Rc::new(attributes)),
                        Err(reason) => {
                            warnings.push(CollectWarning::DeviceRead {
                                device: target.device.clone(),
                                reason,
                            });
                            if distinct.len() == 1 {
                                return Err(CollectError::DeviceRead {
                                    device: target.device.clone(),
                                    warnings,
                                });
                            }
                            None
                        }
                    };
                    cache.insert(&target.device, read.clone());
                    read
                }
            };

            let Some(attributes) = attributes else {
                continue;
            };

            match attributes.get(&target.path) {
                Some(value) => metrics.push(Metric {
                    namespace: target.namespace.clone(),
                    timestamp,
                    value: value.clone(),
                }),
                None => warnings.push(CollectWarning::UnknownAttribute {
                    device: target.device.clone(),
                    path: target.path.clone(),
                }),
            }
        }

        if metrics.is_empty() {
            return Err(CollectError::NothingCollected(warnings));
        }

        for warning in &warnings {
            warn!("{}", warning);
        }
        debug!(
            "Collected {} metrics from {} devices ({} warnings)",
            metrics.len(),
            cache.len(),
            warnings.len()
        );

        Ok(Collection { metrics, warnings })
    }

    /// Validates names and expands wildcards into per-device targets.
    ///
    /// Devices are enumerated lazily, once, when the first valid name is
    /// found.
    fn resolve_targets(
        &self,
        roots: &Roots,
        requests: &[MetricRequest],
        warnings: &mut Vec<CollectWarning>,
    ) -> Result<Vec<Target>, CollectError> {
        let mut devices: Option<Vec<String>> = None;
        let mut targets = Vec::new();

        for request in requests {
            let Some((device, path)) = request.namespace.split() else {
                warnings.push(CollectWarning::InvalidNamespace(request.namespace.clone()));
                continue;
            };

            if devices.is_none() {
                let listed = self
                    .gateway
                    .enumerate_devices(roots)
                    .map_err(CollectError::Enumerate)?;
                debug!("Known devices: {:?}", listed);
                devices = Some(listed);
            }
            let known = devices.as_deref().unwrap_or_default();

            if device == WILDCARD {
                for concrete in known.iter() {
                    targets.push(Target {
                        namespace: request.namespace.with_device(concrete),
                        device: concrete.clone(),
                        path: path.clone(),
                    });
                }
            } else if known.iter().any(|d| d == device) {
                targets.push(Target {
                    namespace: request.namespace.clone(),
                    device: device.to_string(),
                    path,
                });
            } else {
                warnings.push(CollectWarning::UnknownDevice(device.to_string()));
            }
        }

        Ok(targets)
    }

    fn read_device(&self, roots: &Roots, device: &str) -> Result<DeviceAttributes, String> {
        let frame = self
            .gateway
            .read_attribute_frame(roots, device)
            .map_err(|e| e.to_string())?;
        let attributes = decode(&frame).map_err(|e| e.to_string())?;
        debug!("Read {} SMART keys from {}", attributes.len(), device);
        Ok(attributes)
    }
}
