//! Field declarations and resolved field specs.
//!
//! A [`FieldDecl`] is what a declaration says about one field; every option
//! is optional. The Field Collector turns it into a [`FieldSpec`] with all
//! options resolved against the generation plan.

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use mould_types::{Name, TypeExpr};
use mould_value::Value;

/// Zero-argument default factory, called once per construction.
#[derive(Clone)]
pub struct Factory(Arc<dyn Fn() -> Value + Send + Sync>);

impl Factory {
    pub fn new(f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        Factory(Arc::new(f))
    }

    #[inline]
    pub fn call(&self) -> Value {
        (self.0)()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

/// Default of a field.
#[derive(Clone, Debug)]
pub enum FieldDefault {
    /// A literal value, cloned into every instance.
    Value(Value),
    /// A factory producing a fresh value per construction.
    Factory(Factory),
}

impl FieldDefault {
    /// Produce the default for one construction.
    pub fn produce(&self) -> Value {
        match self {
            FieldDefault::Value(v) => v.clone(),
            FieldDefault::Factory(f) => f.call(),
        }
    }
}

/// One field as written in a declaration.
#[derive(Clone, Debug)]
pub struct FieldDecl {
    pub name: Name,
    pub ty: TypeExpr,
    pub default: Option<FieldDefault>,
    pub repr: Option<bool>,
    pub compare: Option<bool>,
    pub kw_only: Option<bool>,
}

impl FieldDecl {
    /// A field with no default and all options inherited.
    pub fn new(name: impl Into<Name>, ty: TypeExpr) -> Self {
        FieldDecl {
            name: name.into(),
            ty,
            default: None,
            repr: None,
            compare: None,
            kw_only: None,
        }
    }

    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    #[must_use]
    pub fn factory(mut self, f: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.default = Some(FieldDefault::Factory(Factory::new(f)));
        self
    }

    #[must_use]
    pub fn repr(mut self, on: bool) -> Self {
        self.repr = Some(on);
        self
    }

    #[must_use]
    pub fn compare(mut self, on: bool) -> Self {
        self.compare = Some(on);
        self
    }

    #[must_use]
    pub fn kw_only(mut self, on: bool) -> Self {
        self.kw_only = Some(on);
        self
    }
}

bitflags! {
    /// Resolved per-field options.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct FieldFlags: u8 {
        /// Listed in the generated representation.
        const REPR = 1 << 0;
        /// Part of equality, ordering and hashing.
        const COMPARE = 1 << 1;
        /// Excluded from positional ordering.
        const KW_ONLY = 1 << 2;
    }
}

/// A collected field. Immutable once the type is defined.
#[derive(Clone, Debug)]
pub struct FieldSpec {
    pub name: Name,
    pub ty: TypeExpr,
    pub default: Option<FieldDefault>,
    pub flags: FieldFlags,
}

impl FieldSpec {
    #[inline]
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    #[inline]
    pub fn in_repr(&self) -> bool {
        self.flags.contains(FieldFlags::REPR)
    }

    #[inline]
    pub fn in_compare(&self) -> bool {
        self.flags.contains(FieldFlags::COMPARE)
    }

    #[inline]
    pub fn kw_only(&self) -> bool {
        self.flags.contains(FieldFlags::KW_ONLY)
    }
}

/// A class-scoped attribute: stored on the type, never on instances.
#[derive(Clone, Debug)]
pub struct ClassAttr {
    pub name: Name,
    pub ty: TypeExpr,
    pub value: Option<Value>,
}
