use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::path::{Path, PathBuf};

use super::{Counter, CounterId, Device, Error, Result, Sample, Unit, transform};

#[derive(Debug)]
struct Entry {
    name: String,
    sample: Sample,
    unit: Unit,
    counter: Counter,
}

/// Table-backed [`Device`] implementation.
///
/// Ids are dense and assigned in insertion order by [`CatalogBuilder`].
#[derive(Debug)]
pub struct Catalog {
    unique_id: u64,
    path: PathBuf,
    entries: Vec<Entry>,
    ids: HashMap<String, CounterId>,
}

impl Catalog {
    pub fn builder(unique_id: u64, path: impl Into<PathBuf>) -> CatalogBuilder {
        CatalogBuilder::new(unique_id, path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, id: CounterId) -> Result<&Entry> {
        usize::try_from(id.as_raw())
            .ok()
            .and_then(|idx| self.entries.get(idx))
            .ok_or(Error::UnknownId { id })
    }
}

impl Device for Catalog {
    fn unique_id(&self) -> u64 {
        self.unique_id
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn counter_id_by_name(&self, name: &str) -> Result<CounterId> {
        self.ids
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownCounter {
                name: name.to_owned(),
            })
    }

    fn counter_by_id(&self, id: CounterId) -> Result<&Counter> {
        self.entry(id).map(|entry| &entry.counter)
    }

    fn sample_by_id(&self, id: CounterId) -> Result<&Sample> {
        self.entry(id).map(|entry| &entry.sample)
    }

    fn unit_by_id(&self, id: CounterId) -> Result<&Unit> {
        self.entry(id).map(|entry| &entry.unit)
    }

    fn counter_names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.name.as_str()).collect()
    }
}

/// Assembles a [`Catalog`] entry by entry.
///
/// This is the construction contract for catalog loaders: each counter is
/// described by its name, its [`Sample`], its [`Unit`] and its [`Counter`].
/// Consistency is checked once, in [`CatalogBuilder::build`].
#[derive(Debug)]
pub struct CatalogBuilder {
    unique_id: u64,
    path: PathBuf,
    entries: Vec<Entry>,
}

impl CatalogBuilder {
    pub fn new(unique_id: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            unique_id,
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Id the next added entry will receive.
    pub fn next_id(&self) -> CounterId {
        CounterId::new(self.entries.len() as u64)
    }

    /// Adds a counter and returns its id.
    pub fn add(
        &mut self,
        name: impl Into<String>,
        sample: Sample,
        unit: Unit,
        counter: Counter,
    ) -> CounterId {
        let id = self.next_id();
        self.entries.push(Entry {
            name: name.into(),
            sample,
            unit,
            counter,
        });
        id
    }

    /// Adds a counter computed by `compute` from `operands`.
    pub fn add_counter(
        &mut self,
        name: impl Into<String>,
        sample: Sample,
        unit: Unit,
        compute: super::ComputeFn,
        operands: [CounterId; 2],
    ) -> CounterId {
        self.add(name, sample, unit, Counter::new(compute, operands))
    }

    /// Adds a plain field whose counter value is its own raw sample.
    pub fn add_raw(&mut self, name: impl Into<String>, sample: Sample, unit: Unit) -> CounterId {
        let id = self.next_id();
        self.add(name, sample, unit, Counter::unary(transform::raw(), id))
    }

    /// Validates the entries and freezes them into a [`Catalog`].
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateCounter`] if two entries share a name.
    /// - [`Error::InvalidSample`] if a sample is empty or crosses its 64-bit word.
    /// - [`Error::UnknownOperand`] if a counter refers to an id outside the catalog.
    pub fn build(self) -> Result<Catalog> {
        let count = self.entries.len() as u64;
        let mut ids = HashMap::with_capacity(self.entries.len());

        for (idx, entry) in self.entries.iter().enumerate() {
            match ids.entry(entry.name.clone()) {
                MapEntry::Occupied(_) => {
                    return Err(Error::DuplicateCounter {
                        name: entry.name.clone(),
                    });
                }
                MapEntry::Vacant(slot) => {
                    slot.insert(CounterId::new(idx as u64));
                }
            }

            if !entry.sample.is_valid() {
                return Err(Error::InvalidSample {
                    name: entry.name.clone(),
                    offset: entry.sample.offset,
                    size: entry.sample.size,
                });
            }

            if let Some(operand) = entry
                .counter
                .operands()
                .into_iter()
                .find(|op| !op.is_undefined() && op.as_raw() >= count)
            {
                return Err(Error::UnknownOperand {
                    name: entry.name.clone(),
                    operand,
                });
            }
        }

        log::debug!(
            target: "catalog",
            "built catalog: unique_id={:#x}, path={}, counters={}",
            self.unique_id,
            self.path.display(),
            self.entries.len()
        );

        Ok(Catalog {
            unique_id: self.unique_id,
            path: self.path,
            entries: self.entries,
            ids,
        })
    }
}
