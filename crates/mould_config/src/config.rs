//! The configuration-record root and typed parsing of raw mappings.

use std::sync::{Arc, OnceLock};

use mould_struct::roots::frozen_structure;
use mould_struct::{
    coerce, define, pretty_repr, ConstructError, Declaration, DefineError, Instance, Kwargs,
    RecordType,
};

static CONFIG_BASE: OnceLock<Result<Arc<RecordType>, DefineError>> = OnceLock::new();

/// Root for configuration records: keyword-only, frozen, dense storage,
/// shown with [`pretty_repr`].
pub fn config_base() -> Result<Arc<RecordType>, DefineError> {
    CONFIG_BASE
        .get_or_init(|| {
            define(
                Declaration::new("ConfigBase")
                    .base(&frozen_structure())
                    .repr(pretty_repr::<Instance>),
            )
        })
        .clone()
}

/// Coerce `raw` to the field types of `record` and construct an instance.
///
/// Keys of `raw` that are not fields are ignored.
pub fn parse(record: &Arc<RecordType>, raw: &Kwargs) -> Result<Instance, ConstructError> {
    let values = coerce(record, raw)?;
    tracing::debug!(record = %record.name(), fields = values.len(), "parsed configuration");
    record.construct(values)
}
