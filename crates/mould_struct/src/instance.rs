//! Record instances.
//!
//! An instance is its type plus storage. Storage is behind an `Arc`, so
//! cloning an instance is cheap and writes copy on demand. Frozen types
//! never write, which is what lets flyweight types share storage between
//! equal instances.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use mould_types::Name;
use mould_value::{RecordValue, Value};
use rustc_hash::{FxHashMap, FxHasher};

use crate::gate::Kwargs;
use crate::record::{Layout, StateForm};
use crate::{ConstructError, InstanceError, RecordType};

/// Field storage of one instance.
#[derive(Clone, Debug)]
pub(crate) enum Storage {
    /// Attribute map; may hold names beyond the declared fields.
    Map(Arc<FxHashMap<Name, Value>>),
    /// One value per field, in declared order.
    Slots(Arc<Vec<Value>>),
}

impl Storage {
    /// Lay out `values` (declared order) the way `ty` stores them.
    pub(crate) fn build(ty: &RecordType, values: Vec<Value>) -> Self {
        match ty.layout() {
            Layout::Map => Storage::Map(Arc::new(
                ty.fields()
                    .iter()
                    .map(|f| f.name.clone())
                    .zip(values)
                    .collect(),
            )),
            Layout::Slots(_) => Storage::Slots(Arc::new(values)),
        }
    }

    fn ptr_eq(&self, other: &Storage) -> bool {
        match (self, other) {
            (Storage::Map(a), Storage::Map(b)) => Arc::ptr_eq(a, b),
            (Storage::Slots(a), Storage::Slots(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Saved instance state, see [`Instance::state`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum State {
    /// Field values in declared order.
    Ordered(Vec<Value>),
    /// Every attribute by name.
    Attributes(BTreeMap<Name, Value>),
}

/// An instance of a record type.
#[derive(Clone)]
pub struct Instance {
    ty: Arc<RecordType>,
    storage: Storage,
}

impl Instance {
    pub(crate) fn new(ty: Arc<RecordType>, storage: Storage) -> Self {
        Instance { ty, storage }
    }

    #[inline]
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    // === Attribute access ===

    /// Read a field, a free attribute, or a class attribute.
    pub fn get(&self, name: &str) -> Result<&Value, InstanceError> {
        let found = match &self.storage {
            Storage::Map(map) => map.get(name),
            Storage::Slots(values) => self.ty.field_index(name).and_then(|i| values.get(i)),
        };
        found
            .or_else(|| self.ty.class_attr(name))
            .ok_or_else(|| InstanceError::NoAttribute {
                record: self.ty.name().clone(),
                name: Name::new(name),
            })
    }

    /// Write a field.
    ///
    /// Frozen instances reject every write. Dense storage rejects names that
    /// are not fields; map storage accepts them as free attributes.
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), InstanceError> {
        if self.ty.is_frozen() {
            return Err(InstanceError::Frozen {
                record: self.ty.name().clone(),
                field: Name::new(name),
            });
        }
        match &mut self.storage {
            Storage::Map(map) => {
                Arc::make_mut(map).insert(Name::new(name), value);
            }
            Storage::Slots(values) => {
                let Some(index) = self.ty.field_index(name) else {
                    return Err(InstanceError::NoSlot {
                        record: self.ty.name().clone(),
                        name: Name::new(name),
                    });
                };
                Arc::make_mut(values)[index] = value;
            }
        }
        Ok(())
    }

    /// Field values in declared order.
    pub fn fields(&self) -> Vec<(&Name, &Value)> {
        match &self.storage {
            Storage::Map(map) => self
                .ty
                .fields()
                .iter()
                .filter_map(|f| map.get(&f.name).map(|v| (&f.name, v)))
                .collect(),
            Storage::Slots(values) => self
                .ty
                .fields()
                .iter()
                .map(|f| &f.name)
                .zip(values.iter())
                .collect(),
        }
    }

    /// Attributes that are not declared fields, sorted by name.
    pub fn free_attributes(&self) -> Vec<(&Name, &Value)> {
        let Storage::Map(map) = &self.storage else {
            return Vec::new();
        };
        let mut out: Vec<_> = map
            .iter()
            .filter(|(name, _)| self.ty.field(name.as_str()).is_none())
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Field values in declared order, as a nested record value.
    pub fn to_value(&self) -> Value {
        Value::Record(RecordValue {
            type_name: self.ty.name().clone(),
            fields: self
                .fields()
                .into_iter()
                .map(|(n, v)| (n.clone(), v.clone()))
                .collect(),
        })
    }

    /// Whether two instances share one storage allocation.
    pub fn shares_storage(&self, other: &Instance) -> bool {
        self.storage.ptr_eq(&other.storage)
    }

    // === Derived instances ===

    /// Copy every field, replace those in `overrides`, and construct the
    /// result through the gate.
    pub fn derive(&self, overrides: Kwargs) -> Result<Instance, ConstructError> {
        let mut named: Kwargs = self
            .fields()
            .into_iter()
            .map(|(n, v)| (n.clone(), v.clone()))
            .collect();
        named.extend(overrides);
        self.ty.construct(named)
    }

    // === Comparison ===

    fn compare_values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.ty
            .fields()
            .iter()
            .zip(self.fields())
            .filter(|(spec, _)| spec.in_compare())
            .map(|(_, (_, v))| v)
    }

    fn same_type(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.ty, &other.ty)
    }

    /// Order two instances lexicographically over their compared fields.
    pub fn compare(&self, other: &Instance) -> Result<Ordering, InstanceError> {
        let unorderable = || InstanceError::Unorderable {
            record: self.ty.name().clone(),
        };
        if !self.ty.plan().ordering() || !self.same_type(other) {
            return Err(unorderable());
        }
        for (a, b) in self.compare_values().zip(other.compare_values()) {
            match a.partial_compare(b) {
                Some(Ordering::Equal) => {}
                Some(ord) => return Ok(ord),
                None if a == b => {}
                None => return Err(unorderable()),
            }
        }
        Ok(Ordering::Equal)
    }

    /// Hash of the compared fields.
    pub fn hash_code(&self) -> Result<u64, InstanceError> {
        if !self.ty.plan().hashable() {
            return Err(InstanceError::Unhashable {
                record: self.ty.name().clone(),
            });
        }
        let mut hasher = FxHasher::default();
        self.ty.name().hash(&mut hasher);
        for value in self.compare_values() {
            value.hash(&mut hasher);
        }
        Ok(hasher.finish())
    }

    // === State ===

    /// Save this instance in its type's state form.
    pub fn state(&self) -> State {
        match self.ty.state_form() {
            StateForm::Ordered => {
                State::Ordered(self.fields().into_iter().map(|(_, v)| v.clone()).collect())
            }
            StateForm::Attributes => State::Attributes(
                self.fields()
                    .into_iter()
                    .chain(self.free_attributes())
                    .map(|(n, v)| (n.clone(), v.clone()))
                    .collect(),
            ),
        }
    }
}

impl RecordType {
    /// Rebuild an instance from a saved state.
    ///
    /// Bypasses the gate and the frozen guard: the values are taken as they
    /// were saved.
    pub fn restore(self: &Arc<Self>, state: State) -> Result<Instance, InstanceError> {
        let storage = match (self.state_form(), state) {
            (StateForm::Ordered, State::Ordered(values)) => {
                if values.len() != self.fields().len() {
                    return Err(InstanceError::StateMismatch {
                        record: self.name().clone(),
                        expected: self.fields().len(),
                        found: values.len(),
                    });
                }
                Storage::build(self, values)
            }
            (StateForm::Attributes, State::Attributes(mut attrs)) => {
                let found = attrs.len();
                let mut values = Vec::with_capacity(self.fields().len());
                for field in self.fields() {
                    let Some(value) = attrs.remove(&field.name) else {
                        return Err(InstanceError::StateMismatch {
                            record: self.name().clone(),
                            expected: self.fields().len(),
                            found,
                        });
                    };
                    values.push(value);
                }
                match Storage::build(self, values) {
                    Storage::Map(mut map) => {
                        Arc::make_mut(&mut map).extend(attrs);
                        Storage::Map(map)
                    }
                    Storage::Slots(values) => {
                        if let Some((name, _)) = attrs.into_iter().next() {
                            return Err(InstanceError::NoSlot {
                                record: self.name().clone(),
                                name,
                            });
                        }
                        Storage::Slots(values)
                    }
                }
            }
            _ => {
                return Err(InstanceError::StateForm {
                    record: self.name().clone(),
                })
            }
        };
        Ok(Instance::new(Arc::clone(self), storage))
    }
}

/// Generated equality over compared fields; identity when `eq` is off.
impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        if !self.same_type(other) {
            return false;
        }
        if !self.ty.plan().equality() {
            return self.shares_storage(other);
        }
        self.compare_values().eq(other.compare_values())
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(repr) = &self.ty.repr {
            return f.write_str(&repr.call(self));
        }
        if !self.ty.plan().repr() {
            return write!(f, "<{} object>", self.ty.name());
        }
        write!(f, "{}(", self.ty.name())?;
        let shown = self
            .ty
            .fields()
            .iter()
            .zip(self.fields())
            .filter(|(spec, _)| spec.in_repr());
        for (i, (_, (name, value))) in shown.enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.ty.name().as_str());
        for (name, value) in self.fields() {
            s.field(name.as_str(), value);
        }
        s.finish()
    }
}
