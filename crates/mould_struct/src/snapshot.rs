//! Attribute snapshots and the multi-line pretty representation.
//!
//! Names with the reserved prefix (`_`) are internal and never shown.

use std::fmt::Write;

use mould_types::Name;
use mould_value::Value;

use crate::gate::Kwargs;
use crate::Instance;

/// Something with named attributes.
pub trait Attributes {
    /// Name shown before the attribute list.
    fn label(&self) -> &str;

    /// All attributes: declared order for instances, key order for maps.
    fn attributes(&self) -> Vec<(&Name, &Value)>;
}

impl Attributes for Instance {
    fn label(&self) -> &str {
        self.record_type().name().as_str()
    }

    fn attributes(&self) -> Vec<(&Name, &Value)> {
        let mut out = self.fields();
        out.extend(self.free_attributes());
        out
    }
}

impl Attributes for Kwargs {
    fn label(&self) -> &str {
        "dict"
    }

    fn attributes(&self) -> Vec<(&Name, &Value)> {
        self.iter().collect()
    }
}

/// Public attributes of `source`.
pub fn read_attributes<A: Attributes + ?Sized>(source: &A) -> Vec<(Name, Value)> {
    source
        .attributes()
        .into_iter()
        .filter(|(name, _)| !name.is_reserved())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// One `\tname=value` line per public attribute.
///
/// ```text
/// Config(
///     host="localhost"
///     port=8080
/// )
/// ```
pub fn pretty_repr<A: Attributes + ?Sized>(source: &A) -> String {
    let mut out = format!("{}(\n", source.label());
    for (name, value) in read_attributes(source) {
        // Writing to a String cannot fail.
        let _ = writeln!(out, "\t{name}={value}");
    }
    out.push(')');
    out
}
