//! Field Collector.
//!
//! Inherited fields come first, gathered from the bases walked in reverse
//! declaration order. An own field that redeclares an inherited one replaces
//! it in place; new own fields are appended. Class-scoped annotations
//! (`TypeExpr::ClassVar`) become class attributes instead of fields.

use std::sync::Arc;

use mould_types::Name;
use mould_value::Value;

use crate::field::{ClassAttr, FieldDecl, FieldDefault, FieldFlags, FieldSpec};
use crate::plan::GenerationPlan;
use crate::{DefineError, RecordType};

/// Output of collection: instance fields and class attributes.
#[derive(Clone, Debug, Default)]
pub(crate) struct Collected {
    pub fields: Vec<FieldSpec>,
    pub class_attrs: Vec<ClassAttr>,
}

/// Collect the final field list of `record`.
pub(crate) fn collect(
    record: &Name,
    own: &[FieldDecl],
    bases: &[Arc<RecordType>],
    plan: &GenerationPlan,
) -> Result<Collected, DefineError> {
    let mut out = Collected::default();

    for base in bases.iter().rev() {
        for field in base.fields() {
            upsert_field(&mut out.fields, field.clone());
        }
        for attr in base.class_attrs() {
            upsert_attr(&mut out.class_attrs, attr.clone());
        }
    }

    let mut seen: Vec<&Name> = Vec::with_capacity(own.len());
    for decl in own {
        if seen.contains(&&decl.name) {
            return Err(DefineError::DuplicateField {
                record: record.clone(),
                field: decl.name.clone(),
            });
        }
        seen.push(&decl.name);

        if decl.ty.is_class_var() {
            // A class attribute shadows an inherited field of the same name.
            out.fields.retain(|f| f.name != decl.name);
            upsert_attr(
                &mut out.class_attrs,
                ClassAttr {
                    name: decl.name.clone(),
                    ty: decl.ty.clone(),
                    value: decl.default.as_ref().map(FieldDefault::produce),
                },
            );
            continue;
        }

        if let Some(FieldDefault::Value(v)) = &decl.default {
            if matches!(v, Value::List(_) | Value::Set(_) | Value::Map(_)) {
                return Err(DefineError::MutableDefault {
                    record: record.clone(),
                    field: decl.name.clone(),
                });
            }
        }

        upsert_field(&mut out.fields, resolve_field(decl, plan));
    }

    check_positional_order(record, &out.fields)?;

    tracing::debug!(
        record = %record,
        fields = out.fields.len(),
        class_attrs = out.class_attrs.len(),
        "collected fields"
    );
    Ok(out)
}

fn resolve_field(decl: &FieldDecl, plan: &GenerationPlan) -> FieldSpec {
    let mut flags = FieldFlags::empty();
    flags.set(FieldFlags::REPR, decl.repr.unwrap_or(true));
    flags.set(FieldFlags::COMPARE, decl.compare.unwrap_or(true));
    flags.set(FieldFlags::KW_ONLY, decl.kw_only.unwrap_or(plan.kw_only()));
    FieldSpec {
        name: decl.name.clone(),
        ty: decl.ty.clone(),
        default: decl.default.clone(),
        flags,
    }
}

fn upsert_field(fields: &mut Vec<FieldSpec>, field: FieldSpec) {
    match fields.iter_mut().find(|f| f.name == field.name) {
        Some(slot) => *slot = field,
        None => fields.push(field),
    }
}

fn upsert_attr(attrs: &mut Vec<ClassAttr>, attr: ClassAttr) {
    match attrs.iter_mut().find(|a| a.name == attr.name) {
        Some(slot) => *slot = attr,
        None => attrs.push(attr),
    }
}

/// Among fields that take part in positional ordering, no field without a
/// default may follow one with a default.
fn check_positional_order(record: &Name, fields: &[FieldSpec]) -> Result<(), DefineError> {
    let mut seen_default = false;
    for field in fields.iter().filter(|f| !f.kw_only()) {
        if field.has_default() {
            seen_default = true;
        } else if seen_default {
            return Err(DefineError::NonDefaultAfterDefault {
                record: record.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code unwraps for clarity")]
mod tests {
    use super::*;
    use crate::plan::PlanFlags;
    use mould_types::TypeExpr;
    use pretty_assertions::assert_eq;

    fn names(c: &Collected) -> Vec<&str> {
        c.fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn positional() -> GenerationPlan {
        GenerationPlan::default()
    }

    fn keyword_only() -> GenerationPlan {
        GenerationPlan::from_flags(PlanFlags::DEFAULT | PlanFlags::KW_ONLY)
    }

    #[test]
    fn own_fields_in_source_order() {
        let own = [
            FieldDecl::new("b", TypeExpr::INT),
            FieldDecl::new("a", TypeExpr::STR).default("x"),
        ];
        let c = collect(&Name::new("R"), &own, &[], &positional()).unwrap();
        assert_eq!(names(&c), vec!["b", "a"]);
        assert!(c.fields[1].has_default());
        assert!(c.fields[0].in_repr() && c.fields[0].in_compare());
    }

    #[test]
    fn default_before_non_default_is_rejected() {
        let own = [
            FieldDecl::new("age", TypeExpr::INT).default(15),
            FieldDecl::new("name", TypeExpr::STR),
        ];
        let err = collect(&Name::new("Base"), &own, &[], &positional()).unwrap_err();
        assert_eq!(
            err,
            DefineError::NonDefaultAfterDefault {
                record: Name::new("Base"),
                field: Name::new("name"),
            }
        );
    }

    #[test]
    fn keyword_only_lifts_ordering_rule() {
        let own = [
            FieldDecl::new("age", TypeExpr::INT).default(15),
            FieldDecl::new("name", TypeExpr::STR),
        ];
        let c = collect(&Name::new("Base"), &own, &[], &keyword_only()).unwrap();
        assert!(c.fields.iter().all(FieldSpec::kw_only));

        let own = [
            FieldDecl::new("age", TypeExpr::INT).default(15),
            FieldDecl::new("name", TypeExpr::STR).kw_only(true),
        ];
        assert!(collect(&Name::new("Mixed"), &own, &[], &positional()).is_ok());
    }

    #[test]
    fn duplicate_own_field() {
        let own = [FieldDecl::new("a", TypeExpr::INT), FieldDecl::new("a", TypeExpr::STR)];
        let err = collect(&Name::new("R"), &own, &[], &positional()).unwrap_err();
        assert!(matches!(err, DefineError::DuplicateField { .. }));
    }

    #[test]
    fn class_vars_are_not_fields() {
        let own = [
            FieldDecl::new("count", TypeExpr::class_var(TypeExpr::INT)).default(0),
            FieldDecl::new("name", TypeExpr::STR),
        ];
        let c = collect(&Name::new("R"), &own, &[], &positional()).unwrap();
        assert_eq!(names(&c), vec!["name"]);
        assert_eq!(c.class_attrs.len(), 1);
        assert_eq!(c.class_attrs[0].value, Some(Value::Int(0)));
    }

    #[test]
    fn list_default_needs_a_factory() {
        let own = [FieldDecl::new("tags", TypeExpr::list(TypeExpr::STR)).default(Value::list([]))];
        let err = collect(&Name::new("R"), &own, &[], &positional()).unwrap_err();
        assert!(matches!(err, DefineError::MutableDefault { .. }));

        let own = [FieldDecl::new("tags", TypeExpr::list(TypeExpr::STR)).factory(|| Value::list([]))];
        assert!(collect(&Name::new("R"), &own, &[], &positional()).is_ok());
    }
}
