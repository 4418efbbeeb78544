//! Immutability classification of type expressions.
//!
//! A frozen record may only be defined if every field type is provably
//! immutable. The classification is a structural recursion over
//! [`TypeExpr`]:
//!
//! 1. Primitives and singleton values are immutable.
//! 2. Types in the extension set (or the built-in immutable nominal table)
//!    are immutable.
//! 3. `tuple`, `frozenset`, `union` and literal types are immutable iff every
//!    type argument is.
//! 4. A nested record is immutable iff every one of its field types is.
//! 5. Anything else is mutable.
//!
//! # Known Limitation
//!
//! A named subtype of an immutable container (`TypeExpr::Nominal` with a
//! `tuple` base) is classified mutable: it is not one of the recognized
//! constructors and has no fields to recurse into. Callers that need it add
//! the nominal type to their [`ImmutableTypes`].

use rustc_hash::FxHashSet;

use crate::{ensure_sufficient_stack, Constructor, Name, RecordShape, TypeExpr};

/// Nominal types that are immutable without being declared by the caller.
///
/// Read-only process-wide table; never extended at runtime.
pub const BUILTIN_IMMUTABLE_NOMINALS: &[&str] = &["date", "datetime", "time", "timedelta"];

/// Container constructors whose instances cannot be modified.
const IMMUTABLE_CONSTRUCTORS: &[Constructor] =
    &[Constructor::Tuple, Constructor::FrozenSet, Constructor::Union];

/// A record field whose declared type is not immutable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("attribute `{field}` of type `{ty}` is mutable")]
pub struct InvalidType {
    /// The offending field.
    pub field: Name,
    /// Its declared type.
    pub ty: TypeExpr,
}

/// Caller-supplied types to treat as immutable.
///
/// Passed explicitly per analysis call; there is no global registration.
#[derive(Clone, Debug, Default)]
pub struct ImmutableTypes {
    types: FxHashSet<TypeExpr>,
}

impl ImmutableTypes {
    /// Create an empty extension set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a type, builder style.
    #[must_use]
    pub fn with(mut self, ty: TypeExpr) -> Self {
        self.types.insert(ty);
        self
    }

    /// Add a type.
    pub fn insert(&mut self, ty: TypeExpr) {
        self.types.insert(ty);
    }

    /// Check membership.
    #[inline]
    pub fn contains(&self, ty: &TypeExpr) -> bool {
        self.types.contains(ty)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl FromIterator<TypeExpr> for ImmutableTypes {
    fn from_iter<I: IntoIterator<Item = TypeExpr>>(iter: I) -> Self {
        ImmutableTypes {
            types: iter.into_iter().collect(),
        }
    }
}

impl Extend<TypeExpr> for ImmutableTypes {
    fn extend<I: IntoIterator<Item = TypeExpr>>(&mut self, iter: I) {
        self.types.extend(iter);
    }
}

/// Classifier over type expressions, bound to one extension set.
#[derive(Copy, Clone, Debug)]
pub struct ImmutabilityAnalyzer<'a> {
    extra: &'a ImmutableTypes,
}

impl<'a> ImmutabilityAnalyzer<'a> {
    /// Create an analyzer that also accepts the types in `extra`.
    pub fn new(extra: &'a ImmutableTypes) -> Self {
        Self { extra }
    }

    /// Classify a type expression.
    pub fn is_immutable(&self, ty: &TypeExpr) -> bool {
        ensure_sufficient_stack(|| self.classify(ty))
    }

    /// Check every field of a record, failing on the first mutable one.
    pub fn verify(&self, shape: &RecordShape) -> Result<(), InvalidType> {
        for field in &shape.fields {
            if !self.is_immutable(&field.ty) {
                tracing::debug!(
                    record = %shape.name,
                    field = %field.name,
                    ty = %field.ty,
                    "mutable field in frozen record"
                );
                return Err(InvalidType {
                    field: field.name.clone(),
                    ty: field.ty.clone(),
                });
            }
        }
        Ok(())
    }

    fn classify(&self, ty: &TypeExpr) -> bool {
        match ty {
            TypeExpr::Primitive(_) | TypeExpr::Singleton(_) => true,
            _ if self.is_declared_immutable(ty) => true,
            // Literal arguments are scalar values.
            TypeExpr::Literal(_) => true,
            TypeExpr::Generic { ctor, args } if IMMUTABLE_CONSTRUCTORS.contains(ctor) => {
                args.iter().all(|arg| self.is_immutable(arg))
            }
            TypeExpr::Record(shape) => shape.fields.iter().all(|f| self.is_immutable(&f.ty)),
            TypeExpr::Generic { .. } | TypeExpr::Nominal { .. } | TypeExpr::ClassVar(_) => false,
        }
    }

    fn is_declared_immutable(&self, ty: &TypeExpr) -> bool {
        if !self.extra.is_empty() && self.extra.contains(ty) {
            return true;
        }
        match ty {
            TypeExpr::Nominal { name, base: None } => {
                BUILTIN_IMMUTABLE_NOMINALS.contains(&name.as_str())
            }
            _ => false,
        }
    }
}

/// Classify `ty` against the built-in tables plus `extra`.
pub fn is_immutable(ty: &TypeExpr, extra: &ImmutableTypes) -> bool {
    ImmutabilityAnalyzer::new(extra).is_immutable(ty)
}

/// Verify that every field of `shape` is immutable.
pub fn verify(shape: &RecordShape, extra: &ImmutableTypes) -> Result<(), InvalidType> {
    ImmutabilityAnalyzer::new(extra).verify(shape)
}
