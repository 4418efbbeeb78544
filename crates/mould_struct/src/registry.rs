//! Registry of defined record types.
//!
//! # Design
//!
//! - `BTreeMap` by name for deterministic iteration
//! - One lock per type name: the whole definition pipeline for a name runs
//!   under it, so two threads cannot both define the same name, while
//!   unrelated names define in parallel

use std::collections::BTreeMap;
use std::sync::Arc;

use mould_types::Name;
use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::{define, Declaration, DefineError, RecordType};

/// Defined record types, by name.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: RwLock<BTreeMap<Name, Arc<RecordType>>>,
    definitions: Mutex<FxHashMap<Name, Arc<Mutex<()>>>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define and register a type.
    ///
    /// Fails with [`DefineError::AlreadyDefined`] if the name is taken,
    /// including when another thread finished defining it first.
    pub fn define(&self, decl: Declaration) -> Result<Arc<RecordType>, DefineError> {
        let name = decl.name().clone();
        let lock = Arc::clone(self.definitions.lock().entry(name.clone()).or_default());
        let _serialized = lock.lock();

        if self.types.read().contains_key(&name) {
            return Err(DefineError::AlreadyDefined { record: name });
        }
        let ty = define(decl)?;
        self.types.write().insert(name, Arc::clone(&ty));
        Ok(ty)
    }

    pub fn get(&self, name: &str) -> Option<Arc<RecordType>> {
        self.types.read().get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.read().is_empty()
    }

    /// Registered types, sorted by name.
    pub fn types(&self) -> Vec<Arc<RecordType>> {
        self.types.read().values().cloned().collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code unwraps for clarity")]
mod tests {
    use super::*;
    use mould_types::TypeExpr;
    use pretty_assertions::assert_eq;
    use std::thread;

    #[test]
    fn define_and_lookup() {
        let registry = TypeRegistry::new();
        registry
            .define(Declaration::new("B").typed("x", TypeExpr::INT))
            .unwrap();
        registry.define(Declaration::new("A")).unwrap();

        assert!(registry.contains("A"));
        assert_eq!(registry.get("B").unwrap().fields().len(), 1);
        let names: Vec<_> = registry
            .types()
            .iter()
            .map(|t| t.name().as_str().to_owned())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn second_definition_is_refused() {
        let registry = TypeRegistry::new();
        registry.define(Declaration::new("Once")).unwrap();
        let err = registry.define(Declaration::new("Once")).unwrap_err();
        assert_eq!(
            err,
            DefineError::AlreadyDefined {
                record: Name::new("Once")
            }
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_definition_registers_nothing() {
        let registry = TypeRegistry::new();
        let bad = Declaration::new("Bad")
            .field(crate::FieldDecl::new("a", TypeExpr::INT).default(1))
            .typed("b", TypeExpr::INT);
        assert!(registry.define(bad).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn racing_threads_define_once() {
        let registry = Arc::new(TypeRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    registry
                        .define(Declaration::new("Shared").typed("x", TypeExpr::INT))
                        .is_ok()
                })
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(registry.len(), 1);
    }
}
