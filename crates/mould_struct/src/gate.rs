//! Construction Gate.
//!
//! Every instantiation goes through [`RecordType::call`]:
//!
//! 1. reject positional arguments,
//! 2. run the pre-construction hook, if declared, and keep its output,
//! 3. run the generated constructor on the named values.
//!
//! The generated constructor fills defaults (calling factories once per
//! construction) and rejects missing or unknown names. Nothing is built
//! unless every step succeeds.

use std::collections::BTreeMap;
use std::sync::Arc;

use mould_types::Name;
use mould_value::Value;

use crate::instance::{Instance, Storage};
use crate::{ConstructError, RecordType};

/// Named construction values.
pub type Kwargs = BTreeMap<Name, Value>;

/// The arguments of one instantiation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Call {
    pub positional: Vec<Value>,
    pub named: Kwargs,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a positional argument. The gate rejects these.
    #[must_use]
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Add a named value.
    #[must_use]
    pub fn kw(mut self, name: impl Into<Name>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }
}

impl From<Kwargs> for Call {
    fn from(named: Kwargs) -> Self {
        Call {
            positional: Vec::new(),
            named,
        }
    }
}

impl RecordType {
    /// Instantiate through the gate.
    pub fn call(self: &Arc<Self>, call: Call) -> Result<Instance, ConstructError> {
        if !call.positional.is_empty() {
            return Err(ConstructError::Positional {
                record: self.name().clone(),
                count: call.positional.len(),
            });
        }

        let named = match &self.pre_init {
            Some(hook) => hook.call(self, call.named)?,
            None => call.named,
        };

        let values = self.init(named)?;
        let storage = self.store(values);
        tracing::trace!(record = %self.name(), "constructed instance");
        Ok(Instance::new(Arc::clone(self), storage))
    }

    /// Instantiate from named values only.
    pub fn construct(self: &Arc<Self>, kwargs: Kwargs) -> Result<Instance, ConstructError> {
        self.call(Call::from(kwargs))
    }

    /// The generated constructor: field values in declared order.
    fn init(&self, mut named: Kwargs) -> Result<Vec<Value>, ConstructError> {
        if !self.plan().init() {
            return Err(ConstructError::InitDisabled {
                record: self.name().clone(),
            });
        }

        let mut values = Vec::with_capacity(self.fields().len());
        for field in self.fields() {
            let value = match named.remove(&field.name) {
                Some(v) => v,
                None => match &field.default {
                    Some(default) => default.produce(),
                    None => {
                        return Err(ConstructError::Missing {
                            record: self.name().clone(),
                            field: field.name.clone(),
                        });
                    }
                },
            };
            values.push(value);
        }

        if let Some((extra, _)) = named.into_iter().next() {
            return Err(ConstructError::Unexpected {
                record: self.name().clone(),
                field: extra,
            });
        }
        Ok(values)
    }

    /// Place field values into this type's storage, sharing it with an
    /// equal instance when the type is a flyweight.
    pub(crate) fn store(&self, values: Vec<Value>) -> Storage {
        match &self.interned {
            Some(cache) => cache
                .lock()
                .intern(values, |values| Storage::build(self, values)),
            None => Storage::build(self, values),
        }
    }
}
