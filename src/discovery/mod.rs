//! Discovery of PMT telemetry endpoints on the host.
//!
//! Endpoints live below `/sys/class/intel_pmt` as `telem<N>` directories, each
//! carrying a `guid` that identifies its catalog layout. A [`FamilyRegistry`]
//! turns a [`DiscoveredDevice`] into a [`crate::telemetry::Device`] by looking
//! up the family registered for that guid. [`FamilyRegistry::builtin`] falls
//! back to [`RawWords`] for guids nobody registered.
mod builtin;
mod detect;
mod error;
mod family;

pub use builtin::RawWords;
pub use detect::{DEFAULT_SYSFS_ROOT, DiscoveredDevice, GUID_FILE, discover, read_guid};
pub use error::{Error, Result};
pub use family::{Family, FamilyRegistry, FnFamily};
