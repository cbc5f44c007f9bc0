use std::fmt;
use std::path::Path;

use super::{Counter, CounterId, Result, Sample, Unit};

/// Read-only catalog of the counters published by one PMT endpoint.
///
/// Device families share this contract and differ only in catalog contents.
/// Implementations are immutable once constructed: every id known to one
/// lookup is known to all of them, and ids obtained from
/// [`Device::counter_id_by_name`] are valid for every `*_by_id` lookup on the
/// same device.
pub trait Device: fmt::Debug + Send + Sync {
    /// Unique id (PMT guid) identifying the catalog layout.
    fn unique_id(&self) -> u64;

    /// Directory holding the endpoint's `telem` and `size` files.
    fn path(&self) -> &Path;

    /// Resolves a counter name by exact match.
    ///
    /// # Errors
    ///
    /// Returns [`super::Error::UnknownCounter`] if no counter has that name.
    fn counter_id_by_name(&self, name: &str) -> Result<CounterId>;

    /// # Errors
    ///
    /// Returns [`super::Error::UnknownId`] for ids outside the catalog.
    fn counter_by_id(&self, id: CounterId) -> Result<&Counter>;

    /// # Errors
    ///
    /// Returns [`super::Error::UnknownId`] for ids outside the catalog.
    fn sample_by_id(&self, id: CounterId) -> Result<&Sample>;

    /// # Errors
    ///
    /// Returns [`super::Error::UnknownId`] for ids outside the catalog.
    fn unit_by_id(&self, id: CounterId) -> Result<&Unit>;

    /// Names of all counters in catalog order.
    fn counter_names(&self) -> Vec<&str>;
}
