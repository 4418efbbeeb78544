//! Error types for record definition, construction and instance access.
//!
//! Definition and construction are all-or-nothing: when any of these is
//! returned, no type or instance was produced.

use mould_types::{InvalidType, Name, TypeExpr};

/// A record type could not be defined.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    /// A field without a default follows one with a default while positional
    /// ordering is in effect.
    #[error("non-default field `{field}` follows a default field in `{record}`")]
    NonDefaultAfterDefault { record: Name, field: Name },

    /// The same field is declared twice in one declaration.
    #[error("field `{field}` is declared twice in `{record}`")]
    DuplicateField { record: Name, field: Name },

    /// A default value of an open container type would be shared by every instance.
    #[error("mutable default for field `{field}` in `{record}`; use a factory")]
    MutableDefault { record: Name, field: Name },

    /// Dense storage requested on a type that declares its own slots.
    #[error("`{record}` already declares its slots")]
    SlotsAlreadyDeclared { record: Name },

    /// A manually declared slot layout leaves a field without storage.
    #[error("field `{field}` of `{record}` has no slot")]
    UnslottedField { record: Name, field: Name },

    /// A weak-reference slot requires dense storage.
    #[error("`{record}` requests a weakref slot without slots")]
    WeakrefWithoutSlots { record: Name },

    /// `order` is on while `eq` is off.
    #[error("`{record}` requests ordering without equality")]
    OrderWithoutEq { record: Name },

    /// A frozen type inherits from a non-frozen one or the other way round.
    #[error("`{record}` and its base `{base}` disagree on frozen")]
    FrozenInheritance { record: Name, base: Name },

    /// The definition pipeline was re-entered for a type it is already building.
    #[error("definition of `{record}` re-entered itself")]
    RecursiveDefinition { record: Name },

    /// A registry already holds a type of this name.
    #[error("`{record}` is already defined")]
    AlreadyDefined { record: Name },

    /// A frozen type declares a field whose type is mutable.
    #[error(transparent)]
    InvalidType(#[from] InvalidType),
}

/// A raw value could not be turned into a field value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CoerceError {
    /// A required field is absent from the raw mapping.
    #[error("value `{field}` is not found")]
    ValueNotFound { field: Name },

    /// The raw value cannot be converted to the declared type.
    #[error("value `{field}` of type {found} cannot be coerced into `{ty}`")]
    TypeCoerce {
        field: Name,
        ty: TypeExpr,
        found: &'static str,
    },
}

/// Constructing an instance failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConstructError {
    /// Positional arguments were supplied; only named values are accepted.
    #[error("`{record}` takes keyword arguments only, got {count} positional")]
    Positional { record: Name, count: usize },

    /// A field without a default received no value.
    #[error("`{record}` is missing a value for `{field}`")]
    Missing { record: Name, field: Name },

    /// A named value matches no constructor field.
    #[error("`{record}` got an unexpected value `{field}`")]
    Unexpected { record: Name, field: Name },

    /// The type was declared without a generated constructor.
    #[error("`{record}` has no generated constructor")]
    InitDisabled { record: Name },

    #[error(transparent)]
    Coerce(#[from] CoerceError),

    /// The pre-construction hook rejected its input.
    #[error("pre-init hook of `{record}` failed: {message}")]
    Hook { record: Name, message: String },
}

/// An operation on an existing instance failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    /// Write to a frozen instance.
    #[error("cannot assign to field `{field}` of frozen `{record}`")]
    Frozen { record: Name, field: Name },

    /// Write to a name outside a dense-storage layout.
    #[error("`{record}` has no slot `{name}`")]
    NoSlot { record: Name, name: Name },

    #[error("`{record}` has no attribute `{name}`")]
    NoAttribute { record: Name, name: Name },

    /// Ordering is not generated, the operands differ in type, or a field
    /// pair has no order.
    #[error("instances of `{record}` are not orderable")]
    Unorderable { record: Name },

    #[error("instances of `{record}` are not hashable")]
    Unhashable { record: Name },

    /// A saved state does not fit the type it is restored into.
    #[error("state for `{record}` has {found} values, expected {expected}")]
    StateMismatch {
        record: Name,
        expected: usize,
        found: usize,
    },

    /// A saved state is in the other form than the type uses.
    #[error("state for `{record}` is not in the form the type saves")]
    StateForm { record: Name },
}
