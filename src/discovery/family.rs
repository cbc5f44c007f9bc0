use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use crate::telemetry::{self, Device};

use super::{DiscoveredDevice, Error, RawWords, Result};

/// A catalog layout shared by all endpoints with the same unique id.
pub trait Family: fmt::Debug + Send + Sync {
    /// Unique id (guid) the family's catalog describes.
    fn unique_id(&self) -> u64;

    /// Human-readable family name.
    fn name(&self) -> &str;

    /// Builds the catalog of a discovered endpoint.
    ///
    /// # Errors
    ///
    /// Returns a [`telemetry::Error`] if the catalog is inconsistent or the
    /// endpoint cannot be inspected.
    fn describe(&self, device: &DiscoveredDevice) -> telemetry::Result<Box<dyn Device>>;
}

/// Family backed by a plain catalog constructor.
pub struct FnFamily<F> {
    unique_id: u64,
    name: String,
    build: F,
}

impl<F> FnFamily<F>
where
    F: Fn(&Path) -> telemetry::Result<telemetry::Catalog> + Send + Sync,
{
    pub fn new(unique_id: u64, name: impl Into<String>, build: F) -> Self {
        Self {
            unique_id,
            name: name.into(),
            build,
        }
    }
}

impl<F> fmt::Debug for FnFamily<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFamily")
            .field("unique_id", &format_args!("{:#x}", self.unique_id))
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Family for FnFamily<F>
where
    F: Fn(&Path) -> telemetry::Result<telemetry::Catalog> + Send + Sync,
{
    fn unique_id(&self) -> u64 {
        self.unique_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn describe(&self, device: &DiscoveredDevice) -> telemetry::Result<Box<dyn Device>> {
        Ok(Box::new((self.build)(&device.path)?))
    }
}

/// Maps endpoint unique ids to the families describing them.
///
/// Endpoints whose guid has no family fall back to the optional fallback
/// family, if one is installed.
#[derive(Debug, Default)]
pub struct FamilyRegistry {
    families: HashMap<u64, Box<dyn Family>>,
    fallback: Option<Box<dyn Family>>,
}

impl FamilyRegistry {
    /// Registry used by the `pmt-monitor` binary: no guid-specific families,
    /// with [`RawWords`] as the fallback.
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        registry.set_fallback(RawWords);
        registry
    }

    /// Registers `family`, replacing any family with the same unique id.
    pub fn register(&mut self, family: impl Family + 'static) -> &mut Self {
        let unique_id = family.unique_id();
        if let Some(old) = self.families.insert(unique_id, Box::new(family)) {
            log::warn!(
                target: "discovery",
                "replaced family `{}` registered for guid {:#x}",
                old.name(),
                unique_id
            );
        }
        self
    }

    /// Installs the family used for guids without a registered family.
    pub fn set_fallback(&mut self, family: impl Family + 'static) -> &mut Self {
        self.fallback = Some(Box::new(family));
        self
    }

    /// Family registered for exactly `unique_id`.
    pub fn get(&self, unique_id: u64) -> Option<&dyn Family> {
        self.families.get(&unique_id).map(|family| &**family)
    }

    /// Family describing endpoints with `unique_id`, the fallback included.
    pub fn resolve(&self, unique_id: u64) -> Option<&dyn Family> {
        self.get(unique_id).or(self.fallback.as_deref())
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Builds the catalog of a discovered endpoint.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownFamily`] if no family is registered for its guid and
    ///   there is no fallback.
    /// - [`Error::Describe`] if the family fails to build the catalog.
    pub fn describe(&self, device: &DiscoveredDevice) -> Result<Box<dyn Device>> {
        let family = self
            .resolve(device.guid)
            .ok_or_else(|| Error::UnknownFamily {
                guid: device.guid,
                path: device.path.clone(),
            })?;

        family
            .describe(device)
            .map_err(|source| Error::Describe {
                path: device.path.clone(),
                source,
            })
    }
}
