//! Runtime values stored in record instances.
//!
//! Values are immutable once built; containers share their contents through
//! `Arc`, so cloning a value is cheap and instances can be handed across
//! threads once their type is defined.

mod value;

pub use mould_types::Name;
pub use value::{RecordValue, Value};
