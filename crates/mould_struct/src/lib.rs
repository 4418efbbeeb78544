//! Record type construction for mould.
//!
//! A [`Declaration`] lists fields and options; [`define`] turns it into a
//! [`RecordType`] by running the definition pipeline:
//!
//! ```text
//! Configuration Resolver -> Field Collector -> Type Generator
//!     -> Immutability Analyzer (frozen) -> Slot Compactor (slots)
//! ```
//!
//! Instances are created through the Construction Gate
//! ([`RecordType::call`]), which accepts named values only.
//!
//! # Tracing
//!
//! The pipeline logs through `tracing`. Call [`init_tracing`] and set
//! `RUST_LOG=mould_struct=debug` to see each pass.

mod coerce;
mod collect;
mod compact;
mod declare;
mod define;
mod error;
mod field;
mod gate;
mod generate;
mod instance;
mod intern;
mod plan;
mod record;
mod registry;
pub mod roots;
mod snapshot;

use std::sync::Once;

pub use coerce::{coerce, convert};
pub use compact::WEAKREF_SLOT;
pub use declare::{CustomRepr, Declaration, PreInit};
pub use define::define;
pub use error::{CoerceError, ConstructError, DefineError, InstanceError};
pub use field::{ClassAttr, Factory, FieldDecl, FieldDefault, FieldFlags, FieldSpec};
pub use gate::{Call, Kwargs};
pub use instance::{Instance, State};
pub use plan::{resolve, GenerationPlan, PlanFlags, PlanOverrides};
pub use record::{Layout, RecordType, StateForm};
pub use registry::TypeRegistry;
pub use snapshot::{pretty_repr, read_attributes, Attributes};

pub use mould_types::{ImmutableTypes, InvalidType, Name, TypeExpr};
pub use mould_value::Value;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
