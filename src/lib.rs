//! PMT Monitor: reads hardware telemetry counters published by Intel PMT
//! endpoints through their memory-mapped telemetry regions.
//!
//! The library decodes bit-packed samples from the raw region, evaluates
//! catalog counters over them, and renders the results with their units.
//! Discovery of endpoints on the host and the `pmt-monitor` command-line tool
//! are thin layers over that core.

use std::path::PathBuf;
use std::time::Duration;

use cli::{Cli, Command};
use discovery::FamilyRegistry;

pub mod cli;
pub mod discovery;
pub mod error;
pub mod fsutil;
pub mod telemetry;

// Endpoint layout below /sys/class/intel_pmt:
//
//  telem<N>/guid   unique id of the catalog layout, hex
//  telem<N>/size   byte count of the telemetry region, decimal
//  telem<N>/telem  the region itself, mmap-able read-only
//
// Catalogs (sample offsets, transforms, units) are keyed by guid and have to
// be registered with a FamilyRegistry; nothing on the host describes them.

/// Environment variable overriding the PMT class directory.
pub const SYSFS_ROOT_ENV: &str = "PMT_SYSFS_ROOT";

/// Runs the `pmt-monitor` command described by `cli`.
///
/// `families` supplies the catalogs for the endpoint guids the caller knows
/// about; endpoints without a family can still be listed and sampled raw.
///
/// # Errors
///
/// Possible errors include:
/// - The PMT class directory cannot be read.
/// - The requested device has no registered family or no such counter.
/// - The telemetry region cannot be opened, sized or mapped.
/// - Writing to stdout fails.
pub async fn run(cli: Cli, families: &FamilyRegistry) -> Result<(), Box<dyn std::error::Error>> {
    let root = cli
        .sysfs_root
        .or_else(|| std::env::var_os(SYSFS_ROOT_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(discovery::DEFAULT_SYSFS_ROOT));
    log::debug!("PMT root: {}", root.display());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Command::List { json } => cli::list(&root, families, json, &mut out),
        Command::Read {
            device,
            counter,
            interval_ms,
            count,
            json,
        } => {
            let path = cli::resolve_device_path(&root, &device);
            cli::read(
                &path,
                families,
                &counter,
                Duration::from_millis(interval_ms),
                count,
                json,
                &mut out,
            )
            .await
        }
        Command::Dump { device, json } => {
            let path = cli::resolve_device_path(&root, &device);
            cli::dump(&path, families, json, &mut out)
        }
        Command::Sample {
            device,
            offset,
            size,
        } => {
            let path = cli::resolve_device_path(&root, &device);
            cli::sample(&path, offset, size, &mut out)
        }
    }
}
