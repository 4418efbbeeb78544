//! Type expressions for mould record types.
//!
//! A record declaration names a type for every field. Those types are
//! modelled as a tagged tree ([`TypeExpr`]): primitives, singleton values,
//! generic containers, literal-value types, nested record shapes, and nominal
//! types the crate knows nothing about beyond their name.
//!
//! The [`immutable`] module classifies such a tree as immutable or not. It is
//! run once per frozen record at definition time.
//!
//! # Shared State
//!
//! The only process-wide tables are the read-only built-in sets in
//! [`immutable`]. Caller extensions travel as an explicit
//! [`ImmutableTypes`] argument on every call.

mod expr;
pub mod immutable;
mod name;
mod stack;

pub use expr::{Constructor, FieldShape, LiteralValue, Primitive, RecordShape, Singleton, TypeExpr};
pub use immutable::{is_immutable, verify, ImmutabilityAnalyzer, ImmutableTypes, InvalidType};
pub use name::Name;
pub use stack::ensure_sufficient_stack;
