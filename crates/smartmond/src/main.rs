//! smartmond - SMART disk health collector daemon.
//!
//! Periodically reads SMART attributes of the requested disks and writes
//! every collected metric as one JSON line on stdout. Logs go to stderr.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use smartmon_core::collector::{
    AtaGateway, AttributeValue, Collection, MetricRequest, PathConfig, RealFs, SmartCollector,
};
use smartmon_core::namespace::Namespace;

/// Metrics requested when no `--metric` is given.
const DEFAULT_METRICS: &[&str] = &[
    "intel/disk/smart/*/temperature/current",
    "intel/disk/smart/*/reallocated_sectors",
    "intel/disk/smart/*/pending_sectors",
    "intel/disk/smart/*/power_on_hours",
];

/// SMART disk health collector daemon.
#[derive(Parser)]
#[command(name = "smartmond", about = "SMART disk health collector daemon", version)]
struct Args {
    /// Collection interval in seconds.
    #[arg(short, long, default_value = "60")]
    interval: u64,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Path to the device node directory.
    #[arg(long, default_value = "/dev")]
    dev_path: String,

    /// Metric to collect, e.g. "intel/disk/smart/*/temperature/max".
    /// May be repeated. Use "*" as device to collect from every disk.
    #[arg(short, long = "metric", value_name = "NAME")]
    metrics: Vec<String>,

    /// Run a single collection pass and exit.
    #[arg(long)]
    once: bool,

    /// Print the available metrics and configuration options, then exit.
    #[arg(long)]
    list_metrics: bool,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// One metric as written to stdout.
#[derive(Serialize)]
struct MetricLine<'a> {
    name: String,
    timestamp: DateTime<Utc>,
    value: &'a AttributeValue,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["smartmond", "smartmon_core"] {
        match format!("{}={}", target, level).parse() {
            Ok(directive) => filter = filter.add_directive(directive),
            Err(e) => eprintln!("invalid log directive for {}: {}", target, e),
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Builds the request batch for one pass.
fn build_requests(metrics: &[String], config: &PathConfig) -> Vec<MetricRequest> {
    let names: Vec<&str> = if metrics.is_empty() {
        DEFAULT_METRICS.to_vec()
    } else {
        metrics.iter().map(String::as_str).collect()
    };

    names
        .into_iter()
        .filter_map(|name| name.parse::<Namespace>().ok())
        .map(|ns| MetricRequest::new(ns).with_config(config.clone()))
        .collect()
}

/// Writes collected metrics as JSON lines.
fn write_metrics(out: &mut impl Write, collection: &Collection) -> io::Result<()> {
    for metric in &collection.metrics {
        let line = MetricLine {
            name: metric.namespace.to_string(),
            timestamp: metric.timestamp,
            value: &metric.value,
        };
        serde_json::to_writer(&mut *out, &line)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn list_metrics(collector: &SmartCollector<AtaGateway<RealFs>, RealFs>, config: &PathConfig) {
    println!("Configuration options:");
    for option in PathConfig::OPTIONS {
        println!("  {:<10} (default {:<6}) {}", option.name, option.default, option.description);
    }
    println!();

    match collector.metric_types(Some(config)) {
        Ok(types) => {
            println!("Metrics:");
            for metric_type in types {
                println!("  {:<55} {}", metric_type.namespace.to_string(), metric_type.description);
            }
        }
        Err(e) => error!("Failed to list metrics: {}", e),
    }
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    info!("smartmond {} starting", env!("CARGO_PKG_VERSION"));
    info!(
        "Config: interval={}s, proc={}, dev={}",
        args.interval, args.proc_path, args.dev_path
    );

    let config = PathConfig::new(&args.proc_path, &args.dev_path);
    let collector = SmartCollector::new(AtaGateway::new(RealFs::new()), RealFs::new());

    if args.list_metrics {
        list_metrics(&collector, &config);
        return;
    }

    let requests = build_requests(&args.metrics, &config);
    info!("Collecting {} metric names", requests.len());

    let interval = Duration::from_secs(args.interval);

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut pass_count: u64 = 0;
    let stdout = io::stdout();

    while running.load(Ordering::SeqCst) {
        let start = Instant::now();
        pass_count += 1;

        match collector.collect(&requests) {
            Ok(collection) => {
                info!(
                    "Pass #{}: {} metrics, {} warnings ({:?})",
                    pass_count,
                    collection.metrics.len(),
                    collection.warnings.len(),
                    start.elapsed()
                );
                if let Err(e) = write_metrics(&mut stdout.lock(), &collection) {
                    error!("Failed to write metrics: {}", e);
                }
            }
            Err(e) => {
                error!("Pass #{} failed: {}", pass_count, e);
            }
        }

        if args.once {
            break;
        }

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    debug!("Completed {} passes", pass_count);
    info!("Shutdown complete");
}
