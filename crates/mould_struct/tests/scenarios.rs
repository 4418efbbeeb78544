//! End-to-end record scenarios: declare, construct, mutate, derive.

#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use std::sync::Arc;

use mould_struct::roots::{frozen_structure, structure};
use mould_struct::{
    define, Call, ConstructError, Declaration, DefineError, FieldDecl, InstanceError, Kwargs,
    Name, PlanFlags, RecordType, TypeExpr, Value,
};
use pretty_assertions::assert_eq;

fn base() -> Arc<RecordType> {
    define(
        Declaration::new("Base")
            .base(&structure())
            .field(FieldDecl::new("age", TypeExpr::INT).default(15))
            .typed("name", TypeExpr::STR),
    )
    .unwrap()
}

fn freeze() -> Arc<RecordType> {
    define(
        Declaration::new("Freeze")
            .base(&frozen_structure())
            .field(FieldDecl::new("name", TypeExpr::STR).default("freeze"))
            .typed("age", TypeExpr::INT),
    )
    .unwrap()
}

// ── Keyword-only records ────────────────────────────────────────

#[test]
fn base_fills_default_age() {
    let b = base().call(Call::new().kw("name", "x")).unwrap();
    assert_eq!(b.get("age").unwrap(), &Value::Int(15));
    assert_eq!(b.get("name").unwrap(), &Value::str("x"));
}

#[test]
fn subtype_adds_fields_after_base() {
    let base = base();
    let time = define(
        Declaration::new("Time")
            .base(&base)
            .field(FieldDecl::new("money", TypeExpr::INT).default(0))
            .typed("address", TypeExpr::STR),
    )
    .unwrap();

    let t = time
        .call(Call::new().kw("name", "t").kw("address", "a"))
        .unwrap();
    assert_eq!(t.get("money").unwrap(), &Value::Int(0));
    assert_eq!(t.get("age").unwrap(), &Value::Int(15));

    let names: Vec<&str> = time.fields().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["age", "name", "money", "address"]);
    assert!(time.is_subtype_of(&base));
}

#[test]
fn positional_argument_is_refused() {
    let err = base()
        .call(Call::new().arg("x").kw("age", 1))
        .unwrap_err();
    assert_eq!(
        err,
        ConstructError::Positional {
            record: Name::new("Base"),
            count: 1,
        }
    );
}

// ── Frozen records ──────────────────────────────────────────────

#[test]
fn frozen_write_fails_and_derive_succeeds() {
    let ty = freeze();
    let mut f = ty.call(Call::new().kw("age", 1)).unwrap();
    assert!(matches!(
        f.set("age", Value::Int(16)),
        Err(InstanceError::Frozen { .. })
    ));
    assert_eq!(f.get("age").unwrap(), &Value::Int(1));

    let x = ty.call(Call::new().kw("name", "x").kw("age", 1)).unwrap();
    let mut overrides = Kwargs::new();
    overrides.insert(Name::new("name"), Value::str("y"));
    let y = x.derive(overrides).unwrap();
    assert_eq!(y.get("name").unwrap(), &Value::str("y"));
    assert_eq!(y.get("age").unwrap(), &Value::Int(1));
    assert_eq!(x.get("name").unwrap(), &Value::str("x"));
}

#[test]
fn frozen_list_field_is_rejected_at_declaration() {
    let err = define(
        Declaration::new("Tags")
            .base(&frozen_structure())
            .typed("tags", TypeExpr::list(TypeExpr::STR)),
    )
    .unwrap_err();
    let DefineError::InvalidType(invalid) = err else {
        panic!("expected InvalidType, got {err:?}");
    };
    assert_eq!(invalid.field, Name::new("tags"));
}

#[test]
fn frozen_dense_record_round_trips_state() {
    let ty = freeze();
    let f = ty.call(Call::new().kw("age", 7)).unwrap();
    let g = ty.restore(f.state()).unwrap();
    assert_eq!(g, f);
    assert_eq!(g.to_string(), "Freeze(name=\"freeze\", age=7)");
}

// ── Configuration precedence ────────────────────────────────────

#[test]
fn explicit_options_beat_the_declared_block() {
    let ty = define(
        Declaration::new("Loose")
            .config(PlanFlags::FROZEN, true)
            .config(PlanFlags::ORDER, true)
            .option(PlanFlags::FROZEN, false)
            .typed("a", TypeExpr::INT),
    )
    .unwrap();
    assert!(!ty.plan().frozen());
    assert!(ty.plan().ordering(), "block keys without an override are kept");

    let mut l = ty.call(Call::new().kw("a", 1)).unwrap();
    l.set("a", Value::Int(2)).unwrap();
    assert_eq!(l.get("a").unwrap(), &Value::Int(2));
}

#[test]
fn declared_block_beats_bases() {
    let ty = define(
        Declaration::new("Positional")
            .base(&structure())
            .config(PlanFlags::KW_ONLY, false)
            .typed("a", TypeExpr::INT),
    )
    .unwrap();
    assert!(!ty.plan().kw_only());
    assert_eq!(ty.match_args(), Some(vec![&Name::new("a")]));
}

// ── Hooks ───────────────────────────────────────────────────────

#[test]
fn pre_init_hook_normalizes_input() {
    let ty = define(
        Declaration::new("Lower")
            .base(&structure())
            .typed("tag", TypeExpr::STR)
            .pre_init(|_, mut kwargs| {
                let tag = Name::new("tag");
                let lower = kwargs.get(&tag).and_then(Value::as_str).map(str::to_lowercase);
                if let Some(lower) = lower {
                    kwargs.insert(tag, Value::str(lower));
                }
                Ok(kwargs)
            }),
    )
    .unwrap();
    let l = ty.call(Call::new().kw("tag", "RUST")).unwrap();
    assert_eq!(l.get("tag").unwrap(), &Value::str("rust"));
}
