//! Command-line interface of the `pmt-monitor` binary.
//!
//! ```bash
//! pmt-monitor list
//! pmt-monitor read telem0 "PKG::energy" --interval-ms 500
//! pmt-monitor dump /sys/class/intel_pmt/telem0 --json
//! pmt-monitor sample telem0 --offset 64 --size 32
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::discovery::{self, DiscoveredDevice, FamilyRegistry};
use crate::telemetry::{Catalog, Device, DeviceInstance, Reading, Sample, Unit};

type BoxError = Box<dyn std::error::Error>;

#[derive(Parser, Debug)]
#[command(
    name = "pmt-monitor",
    version,
    about = "Read Intel PMT telemetry counters",
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Directory holding PMT endpoints [env: PMT_SYSFS_ROOT] [default: /sys/class/intel_pmt]
    #[arg(long, global = true)]
    pub sysfs_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List discovered endpoints and their counters
    List {
        #[arg(long)]
        json: bool,
    },
    /// Poll one counter until interrupted
    Read {
        /// Endpoint name (e.g. telem0) or directory
        device: PathBuf,
        counter: String,
        /// Polling interval in milliseconds
        #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
        /// Stop after this many readings
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        count: Option<u64>,
        #[arg(long)]
        json: bool,
    },
    /// Read every counter of an endpoint from one snapshot
    Dump {
        device: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Read a raw bit field without a catalog
    Sample {
        device: PathBuf,
        /// Bit offset of the field
        #[arg(long)]
        offset: u64,
        /// Bit width of the field
        #[arg(long)]
        size: u64,
    },
}

#[derive(Debug, Serialize)]
struct DeviceListing {
    path: PathBuf,
    guid: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    family: Option<String>,
    counters: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CounterReading<'a> {
    counter: &'a str,
    /// UNIX epoch seconds
    timestamp: u64,
    #[serde(flatten)]
    reading: Reading,
}

/// Resolves a device argument: bare endpoint names are looked up below `root`.
pub fn resolve_device_path(root: &Path, device: &Path) -> PathBuf {
    if device.components().count() == 1 && !device.has_root() {
        root.join(device)
    } else {
        device.to_path_buf()
    }
}

pub fn list(
    root: &Path,
    families: &FamilyRegistry,
    json: bool,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    let listings: Vec<DeviceListing> = discovery::discover(root)?
        .into_iter()
        .map(|discovered| {
            let family = families.resolve(discovered.guid).map(|f| f.name().to_owned());
            let counters = match families.describe(&discovered) {
                Ok(device) => device
                    .counter_names()
                    .into_iter()
                    .map(str::to_owned)
                    .collect(),
                Err(err) => {
                    log::debug!("{err}");
                    Vec::new()
                }
            };
            DeviceListing {
                path: discovered.path,
                guid: format!("{:#x}", discovered.guid),
                family,
                counters,
            }
        })
        .collect();

    if json {
        serde_json::to_writer_pretty(&mut *out, &listings)?;
        writeln!(out)?;
        return Ok(());
    }

    for listing in &listings {
        writeln!(out, "{} ({}):", listing.path.display(), listing.guid)?;
        if listing.family.is_none() {
            writeln!(out, "\t<no catalog registered>")?;
        }
        for counter in &listing.counters {
            writeln!(out, "\t{counter}")?;
        }
    }
    Ok(())
}

pub async fn read(
    path: &Path,
    families: &FamilyRegistry,
    counter: &str,
    interval: Duration,
    count: Option<u64>,
    json: bool,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    if interval.is_zero() {
        return Err("polling interval must be non-zero".into());
    }

    let device = describe(path, families)?;
    let id = device.counter_id_by_name(counter)?;
    let instance = DeviceInstance::open(&*device)?;

    log::info!(
        "reading `{}` from {} every {:?} until interrupted",
        counter,
        path.display(),
        interval
    );

    let mut ticker = tokio::time::interval(interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut polled = 0u64;
    while count.is_none_or(|count| polled < count) {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                log::debug!("interrupted after {polled} readings");
                break;
            }
        }

        let reading = instance.read(id)?;
        if json {
            let record = CounterReading {
                counter,
                timestamp: unix_timestamp()?,
                reading,
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        } else {
            writeln!(out, "{reading}")?;
        }
        out.flush()?;

        polled += 1;
    }
    Ok(())
}

pub fn dump(
    path: &Path,
    families: &FamilyRegistry,
    json: bool,
    out: &mut impl Write,
) -> Result<(), BoxError> {
    let device = describe(path, families)?;
    let instance = DeviceInstance::open(&*device)?;
    let snapshot = instance.snapshot();
    let view = snapshot.view();
    let timestamp = unix_timestamp()?;

    let mut records = Vec::new();
    for name in device.counter_names() {
        let reading = view.read(device.counter_id_by_name(name)?)?;
        records.push(CounterReading {
            counter: name,
            timestamp,
            reading,
        });
    }

    if json {
        serde_json::to_writer_pretty(&mut *out, &records)?;
        writeln!(out)?;
    } else {
        for record in &records {
            writeln!(out, "{}: {}", record.counter, record.reading)?;
        }
    }
    Ok(())
}

pub fn sample(path: &Path, offset: u64, size: u64, out: &mut impl Write) -> Result<(), BoxError> {
    let guid = discovery::read_guid(path).unwrap_or_else(|err| {
        log::debug!("{err}");
        0
    });

    let mut builder = Catalog::builder(guid, path);
    let id = builder.add_raw("raw", Sample::new(offset, size), Unit::new("raw"));
    let catalog = builder.build()?;

    let instance = DeviceInstance::open(&catalog)?;
    let value = instance.read_sample(id)?;
    writeln!(out, "{value} ({value:#x})")?;
    Ok(())
}

fn describe(path: &Path, families: &FamilyRegistry) -> Result<Box<dyn Device>, BoxError> {
    let discovered = DiscoveredDevice {
        path: path.to_path_buf(),
        guid: discovery::read_guid(path)?,
    };
    Ok(families.describe(&discovered)?)
}

fn unix_timestamp() -> Result<u64, BoxError> {
    Ok(std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)?
        .as_secs())
}
