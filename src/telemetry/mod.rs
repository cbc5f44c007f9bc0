//! Sample decoding and counter evaluation over PMT telemetry regions.
//!
//! A PMT endpoint publishes a raw byte buffer (`<device>/telem`) whose size is
//! declared in `<device>/size`. Counters are physical quantities computed from
//! one or two bit-packed fields of that buffer.
//!
//! # Key Components
//!
//! - [`Sample`]: Bit offset and width of a field; owns the extraction algorithm.
//! - [`Unit`]: Unit label and optional symbolic renderer of a counter.
//! - [`Counter`]: Compute closure plus up to two operand ids.
//! - [`Device`]: Read-only catalog of counters for one endpoint, with
//!   [`Catalog`] as the table-backed implementation.
//! - [`DeviceInstance`]: Owned read-only mapping of the endpoint's region.
//! - [`SampleView`]: Evaluates samples and counters against any byte slice.
//!
//! # Example
//!
//! ```no_run
//! use pmt_monitor::telemetry::{transform, Catalog, Device, DeviceInstance, Sample, Unit};
//!
//! let mut builder = Catalog::builder(0x1a2b_3c4d, "/sys/class/intel_pmt/telem0");
//! let raw = builder.add_raw("energy_raw", Sample::new(0, 32), Unit::new("raw"));
//! builder.add_counter(
//!     "energy",
//!     Sample::new(0, 32),
//!     Unit::new("J"),
//!     transform::fixed_point(14),
//!     [raw, pmt_monitor::telemetry::CounterId::UNDEFINED],
//! );
//! let catalog = builder.build()?;
//!
//! let instance = DeviceInstance::open(&catalog)?;
//! let id = catalog.counter_id_by_name("energy")?;
//! println!("{}", instance.read(id)?);
//! # Ok::<(), pmt_monitor::telemetry::Error>(())
//! ```

use std::fmt;

use serde::Serialize;

mod catalog;
mod counter;
mod device;
mod error;
mod instance;
mod sample;
pub mod transform;
mod unit;
mod view;

pub use catalog::{Catalog, CatalogBuilder};
pub use counter::{ComputeFn, Counter};
pub use device::Device;
pub use error::{Error, ErrorKind, Result};
pub use instance::{DeviceInstance, SIZE_FILE, Snapshot, TELEM_FILE, region_size};
pub use sample::Sample;
pub use unit::{ENUM_LABEL, Reading, RenderFn, Unit};
pub use view::SampleView;

/// Identifier of a catalog entry.
///
/// One id addresses a counter, its sample and its unit. Counter operands are
/// ids as well; the operand's sample is what gets read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CounterId(u64);

impl CounterId {
    /// Fills operand slots a counter does not use.
    pub const UNDEFINED: CounterId = CounterId(u64::MAX);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    pub const fn is_undefined(&self) -> bool {
        self.0 == u64::MAX
    }
}

impl fmt::Display for CounterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            f.write_str("undefined")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
