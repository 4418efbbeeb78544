use pretty_assertions::assert_eq;

use super::*;
use crate::field::FieldDecl;
use crate::roots::{frozen_structure, structure};
use crate::{define, Declaration, DefineError, WEAKREF_SLOT};

fn field_names(ty: &RecordType) -> Vec<&str> {
    ty.fields().iter().map(|f| f.name.as_str()).collect()
}

// ── Inheritance ─────────────────────────────────────────────────

#[test]
fn redeclared_field_keeps_base_position() {
    let base = define(
        Declaration::new("Base")
            .typed("a", TypeExpr::INT)
            .typed("b", TypeExpr::INT)
            .typed("c", TypeExpr::INT),
    )
    .unwrap();
    let child = define(
        Declaration::new("Child")
            .base(&base)
            .typed("d", TypeExpr::INT)
            .typed("b", TypeExpr::STR),
    )
    .unwrap();

    assert_eq!(field_names(&child), vec!["a", "b", "c", "d"]);
    assert_eq!(child.field("b").map(|f| &f.ty), Some(&TypeExpr::STR));
    assert!(child.is_subtype_of(&base));
    assert!(!base.is_subtype_of(&child));
}

#[test]
fn later_base_fields_come_first() {
    let left = define(Declaration::new("Left").typed("l", TypeExpr::INT))
        .unwrap();
    let right = define(Declaration::new("Right").typed("r", TypeExpr::INT))
        .unwrap();
    let both = define(Declaration::new("Both").base(&left).base(&right))
        .unwrap();
    assert_eq!(field_names(&both), vec!["r", "l"]);
}

#[test]
fn plan_inherits_from_root() {
    let ty = define(Declaration::new("Kw").base(&structure()).typed("x", TypeExpr::INT))
        .unwrap();
    assert!(ty.plan().kw_only());
    assert!(ty.fields()[0].kw_only());
    assert_eq!(ty.layout(), &Layout::Map);
}

#[test]
fn frozen_inheritance_must_agree() {
    let frozen = define(
        Declaration::new("Frozen")
            .base(&frozen_structure())
            .typed("x", TypeExpr::INT),
    )
    .unwrap();
    let thawed = Declaration::new("Thawed")
        .base(&frozen)
        .option(PlanFlags::FROZEN, false)
        .option(PlanFlags::SLOTS, false);
    assert_eq!(
        define(thawed).err(),
        Some(DefineError::FrozenInheritance {
            record: Name::new("Thawed"),
            base: Name::new("Frozen"),
        })
    );
}

#[test]
fn class_attributes_are_inherited() {
    let base = define(
        Declaration::new("Counter")
            .field(FieldDecl::new("LIMIT", TypeExpr::class_var(TypeExpr::INT)).default(10))
            .typed("n", TypeExpr::INT),
    )
    .unwrap();
    let child = define(Declaration::new("Sub").base(&base)).unwrap();
    assert_eq!(child.class_attr("LIMIT"), Some(&Value::Int(10)));
    assert_eq!(field_names(&child), vec!["n"]);
}

// ── Generation checks ───────────────────────────────────────────

#[test]
fn order_without_eq_is_rejected() {
    let decl = Declaration::new("Odd")
        .config(PlanFlags::ORDER, true)
        .option(PlanFlags::EQ, false);
    assert_eq!(
        define(decl).err(),
        Some(DefineError::OrderWithoutEq {
            record: Name::new("Odd")
        })
    );
}

#[test]
fn weakref_slot_requires_slots() {
    let decl = Declaration::new("Weak").option(PlanFlags::WEAKREF_SLOT, true);
    assert!(matches!(
        define(decl),
        Err(DefineError::WeakrefWithoutSlots { .. })
    ));
}

#[test]
fn match_args_lists_positional_fields() {
    let ty = define(
        Declaration::new("Point")
            .typed("x", TypeExpr::INT)
            .field(FieldDecl::new("y", TypeExpr::INT).kw_only(true)),
    )
    .unwrap();
    assert_eq!(ty.match_args(), Some(vec![&Name::new("x")]));

    let off = define(Declaration::new("NoMatch").option(PlanFlags::MATCH_ARGS, false))
        .unwrap();
    assert_eq!(off.match_args(), None);
}

// ── Slot compaction ─────────────────────────────────────────────

#[test]
fn slots_exclude_inherited_names() {
    let base = define(
        Declaration::new("SlotBase")
            .option(PlanFlags::SLOTS, true)
            .option(PlanFlags::WEAKREF_SLOT, true)
            .typed("a", TypeExpr::INT),
    )
    .unwrap();
    assert_eq!(
        base.slots(),
        Some(&[Name::new("a"), Name::new(WEAKREF_SLOT)][..])
    );

    let child = define(
        Declaration::new("SlotChild")
            .base(&base)
            .typed("a", TypeExpr::STR)
            .typed("b", TypeExpr::INT),
    )
    .unwrap();
    assert!(child.plan().slots(), "inherited from base");
    assert_eq!(child.slots(), Some(&[Name::new("b")][..]));
}

#[test]
fn manual_slots_conflict_with_slots_option() {
    let decl = Declaration::new("Both")
        .slots(["a"])
        .option(PlanFlags::SLOTS, true)
        .typed("a", TypeExpr::INT);
    assert_eq!(
        define(decl).err(),
        Some(DefineError::SlotsAlreadyDeclared {
            record: Name::new("Both")
        })
    );
}

#[test]
fn manual_slots_must_cover_fields() {
    let ok = define(Declaration::new("Manual").slots(["a"]).typed("a", TypeExpr::INT))
        .unwrap();
    assert_eq!(ok.layout(), &Layout::Slots(vec![Name::new("a")]));

    let short = Declaration::new("Short")
        .slots(["a"])
        .typed("a", TypeExpr::INT)
        .typed("b", TypeExpr::INT);
    assert!(matches!(
        define(short),
        Err(DefineError::UnslottedField { field, .. }) if field == "b"
    ));
}

#[test]
fn only_frozen_slots_save_ordered_state() {
    let dense = define(
        Declaration::new("Dense")
            .option(PlanFlags::SLOTS, true)
            .typed("a", TypeExpr::INT),
    )
    .unwrap();
    assert_eq!(dense.state_form(), StateForm::Attributes);

    let frozen = define(
        Declaration::new("FrozenDense")
            .base(&frozen_structure())
            .typed("a", TypeExpr::INT),
    )
    .unwrap();
    assert_eq!(frozen.state_form(), StateForm::Ordered);
}

// ── Immutability ────────────────────────────────────────────────

#[test]
fn frozen_type_with_list_field_is_rejected() {
    let decl = Declaration::new("Leaky")
        .base(&frozen_structure())
        .typed("name", TypeExpr::STR)
        .typed("tags", TypeExpr::list(TypeExpr::STR));
    match define(decl) {
        Err(DefineError::InvalidType(err)) => {
            assert_eq!(err.field, Name::new("tags"));
            assert_eq!(err.ty, TypeExpr::list(TypeExpr::STR));
        }
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn nested_frozen_record_is_accepted() {
    let point = define(
        Declaration::new("Point")
            .base(&frozen_structure())
            .typed("x", TypeExpr::INT)
            .typed("y", TypeExpr::INT),
    )
    .unwrap();
    let line = Declaration::new("Line")
        .base(&frozen_structure())
        .typed("points", TypeExpr::variadic_tuple(point.as_type()));
    assert!(define(line).is_ok());
}

#[test]
fn extension_set_admits_declared_types() {
    let calendar = TypeExpr::nominal("Calendar");
    let rejected = Declaration::new("Plan")
        .base(&frozen_structure())
        .typed("calendar", calendar.clone());
    assert!(define(rejected).is_err());

    let accepted = Declaration::new("Plan")
        .base(&frozen_structure())
        .typed("calendar", calendar.clone())
        .immutable(calendar);
    assert!(define(accepted).is_ok());
}
