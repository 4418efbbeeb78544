//! Flyweight storage interning.
//!
//! Equal field values of a flyweight type share one storage allocation. The
//! table holds weak handles only: storage lives exactly as long as some
//! instance uses it, and dead entries are pruned as the table grows.

use std::sync::{Arc, Weak};

use mould_types::Name;
use mould_value::Value;
use rustc_hash::FxHashMap;

use crate::instance::Storage;

/// Size at which the first prune runs.
const MIN_PRUNE_AT: usize = 64;

#[derive(Debug)]
enum WeakStorage {
    Map(Weak<FxHashMap<Name, Value>>),
    Slots(Weak<Vec<Value>>),
}

impl WeakStorage {
    fn new(storage: &Storage) -> Self {
        match storage {
            Storage::Map(map) => WeakStorage::Map(Arc::downgrade(map)),
            Storage::Slots(values) => WeakStorage::Slots(Arc::downgrade(values)),
        }
    }

    fn upgrade(&self) -> Option<Storage> {
        match self {
            WeakStorage::Map(map) => map.upgrade().map(Storage::Map),
            WeakStorage::Slots(values) => values.upgrade().map(Storage::Slots),
        }
    }

    fn is_live(&self) -> bool {
        match self {
            WeakStorage::Map(map) => map.strong_count() > 0,
            WeakStorage::Slots(values) => values.strong_count() > 0,
        }
    }
}

/// Storage of live flyweight instances, keyed by field values in declared
/// order.
#[derive(Debug)]
pub(crate) struct Interner {
    entries: FxHashMap<Vec<Value>, WeakStorage>,
    prune_at: usize,
}

impl Interner {
    pub(crate) fn new() -> Self {
        Interner {
            entries: FxHashMap::default(),
            prune_at: MIN_PRUNE_AT,
        }
    }

    /// The live storage for `values`, or the one `build` makes.
    pub(crate) fn intern(
        &mut self,
        values: Vec<Value>,
        build: impl FnOnce(Vec<Value>) -> Storage,
    ) -> Storage {
        if let Some(shared) = self.entries.get(&values).and_then(WeakStorage::upgrade) {
            return shared;
        }
        if self.entries.len() >= self.prune_at {
            self.entries.retain(|_, entry| entry.is_live());
            self.prune_at = (self.entries.len() * 2).max(MIN_PRUNE_AT);
            tracing::trace!(live = self.entries.len(), "pruned flyweight table");
        }
        let storage = build(values.clone());
        self.entries.insert(values, WeakStorage::new(&storage));
        storage
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
