//! Configuration records for mould.
//!
//! [`read_source`] loads a delimited `key=value` file into a raw mapping with
//! inferred literal types. [`parse`] coerces that mapping to the field types
//! of a record derived from [`config_base`] and constructs it through the gate.
//!
//! ```text
//! # server.env
//! host="localhost"
//! port=8080
//! ```

mod config;
mod source;

pub use config::{config_base, parse};
pub use source::{parse_source, read_source, SourceError};
