//! Value coercion: loosely typed raw values to declared field types.
//!
//! Raw values typically come from a text source, so strings are parsed into
//! numbers and booleans where the declared type asks for one. Containers are
//! converted element-wise. Records and nominal types pass through when the
//! raw value already fits.

use mould_types::{ensure_sufficient_stack, Constructor, LiteralValue, Primitive, Singleton, TypeExpr};
use mould_value::Value;

use crate::gate::Kwargs;
use crate::{CoerceError, RecordType};

/// Convert every field of `ty` found in `raw`.
///
/// Only instance fields are read; class-scoped attributes are not fields.
/// A field absent from `raw` is an error unless it has a default, which the
/// constructor then supplies.
/// Names in `raw` that are not fields are ignored.
pub fn coerce(ty: &RecordType, raw: &Kwargs) -> Result<Kwargs, CoerceError> {
    let mut out = Kwargs::new();
    for field in ty.fields() {
        let Some(value) = raw.get(&field.name) else {
            if field.has_default() {
                continue;
            }
            return Err(CoerceError::ValueNotFound {
                field: field.name.clone(),
            });
        };
        let converted = convert(&field.ty, value).ok_or_else(|| CoerceError::TypeCoerce {
            field: field.name.clone(),
            ty: field.ty.clone(),
            found: value.type_name(),
        })?;
        out.insert(field.name.clone(), converted);
    }
    Ok(out)
}

/// Convert one raw value, or `None` if it does not fit `ty`.
pub fn convert(ty: &TypeExpr, raw: &Value) -> Option<Value> {
    ensure_sufficient_stack(|| convert_inner(ty, raw))
}

fn convert_inner(ty: &TypeExpr, raw: &Value) -> Option<Value> {
    match ty {
        TypeExpr::Primitive(p) => convert_primitive(*p, raw),
        TypeExpr::Singleton(s) => convert_singleton(*s, raw),
        TypeExpr::Literal(values) => {
            let hit = values.iter().any(|lit| literal_matches(lit, raw));
            hit.then(|| raw.clone())
        }
        TypeExpr::Generic { ctor, args } => convert_generic(*ctor, args, raw),
        TypeExpr::Record(shape) => match raw {
            Value::Record(r) if r.type_name == shape.name => Some(raw.clone()),
            _ => None,
        },
        // Nothing is known about a nominal type beyond its name.
        TypeExpr::Nominal { .. } => Some(raw.clone()),
        TypeExpr::ClassVar(inner) => convert(inner, raw),
    }
}

fn convert_primitive(p: Primitive, raw: &Value) -> Option<Value> {
    match (p, raw) {
        (Primitive::Int, Value::Int(_))
        | (Primitive::Float, Value::Float(_))
        | (Primitive::Bool, Value::Bool(_))
        | (Primitive::Str, Value::Str(_))
        | (Primitive::Bytes, Value::Bytes(_)) => Some(raw.clone()),

        (Primitive::Int, Value::Str(s)) => s.trim().parse::<i64>().ok().map(Value::Int),
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_precision_loss,
            clippy::float_cmp,
            reason = "checked integral and in range"
        )]
        (Primitive::Int, Value::Float(f)) => {
            let in_range = f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64;
            in_range.then(|| Value::Int(*f as i64))
        }

        (Primitive::Float, Value::Str(s)) => s.trim().parse::<f64>().ok().map(Value::Float),
        #[allow(clippy::cast_precision_loss, reason = "int to float widening")]
        (Primitive::Float, Value::Int(n)) => Some(Value::Float(*n as f64)),

        (Primitive::Bool, Value::Str(s)) => parse_bool(s).map(Value::Bool),
        (Primitive::Bool, Value::Int(0)) => Some(Value::Bool(false)),
        (Primitive::Bool, Value::Int(1)) => Some(Value::Bool(true)),

        (Primitive::Str, Value::Int(_) | Value::Float(_) | Value::Bool(_)) => {
            Some(Value::str(raw.to_string()))
        }

        (Primitive::Bytes, Value::Str(s)) => Some(Value::bytes(s.as_bytes())),

        _ => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn convert_singleton(s: Singleton, raw: &Value) -> Option<Value> {
    match (s, raw) {
        (Singleton::None, Value::None)
        | (Singleton::True, Value::Bool(true))
        | (Singleton::False, Value::Bool(false)) => Some(raw.clone()),
        _ => None,
    }
}

fn literal_matches(lit: &LiteralValue, raw: &Value) -> bool {
    match (lit, raw) {
        (LiteralValue::Int(a), Value::Int(b)) => a == b,
        (LiteralValue::Str(a), Value::Str(b)) => a.as_str() == &**b,
        (LiteralValue::Bool(a), Value::Bool(b)) => a == b,
        (LiteralValue::Bytes(a), Value::Bytes(b)) => a.as_slice() == &**b,
        (LiteralValue::None, Value::None) => true,
        _ => false,
    }
}

fn convert_generic(ctor: Constructor, args: &[TypeExpr], raw: &Value) -> Option<Value> {
    match ctor {
        // An alternative that keeps the value as is beats one that converts it.
        Constructor::Union => args
            .iter()
            .filter_map(|alt| convert(alt, raw))
            .find(|value| value == raw)
            .or_else(|| args.iter().find_map(|alt| convert(alt, raw))),
        Constructor::Tuple => {
            let items = raw.as_seq()?;
            let converted = match args {
                [elem, TypeExpr::Singleton(Singleton::Ellipsis)] => convert_all(elem, items)?,
                fixed if fixed.len() == items.len() => fixed
                    .iter()
                    .zip(items)
                    .map(|(ty, item)| convert(ty, item))
                    .collect::<Option<Vec<_>>>()?,
                _ => return None,
            };
            Some(Value::tuple(converted))
        }
        Constructor::List => Some(Value::list(convert_all(args.first()?, raw.as_seq()?)?)),
        Constructor::FrozenSet | Constructor::Set => {
            Some(Value::set(convert_all(args.first()?, raw.as_seq()?)?))
        }
        Constructor::Dict => {
            let [key_ty, value_ty] = args else {
                return None;
            };
            let Value::Map(entries) = raw else {
                return None;
            };
            let converted = entries
                .iter()
                .map(|(k, v)| Some((convert(key_ty, k)?, convert(value_ty, v)?)))
                .collect::<Option<Vec<_>>>()?;
            Some(Value::map(converted))
        }
    }
}

fn convert_all(elem: &TypeExpr, items: &[Value]) -> Option<Vec<Value>> {
    items.iter().map(|item| convert(elem, item)).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "Test code unwraps for clarity")]
mod tests {
    use super::*;
    use crate::field::FieldDecl;
    use crate::{define, Declaration};
    use mould_types::Name;
    use pretty_assertions::assert_eq;

    fn raw(pairs: &[(&str, Value)]) -> Kwargs {
        pairs
            .iter()
            .map(|(k, v)| (Name::new(k), v.clone()))
            .collect()
    }

    #[test]
    fn strings_parse_into_primitives() {
        assert_eq!(convert(&TypeExpr::INT, &Value::str(" 42 ")), Some(Value::Int(42)));
        assert_eq!(convert(&TypeExpr::FLOAT, &Value::Int(2)), Some(Value::Float(2.0)));
        assert_eq!(convert(&TypeExpr::BOOL, &Value::str("False")), Some(Value::Bool(false)));
        assert_eq!(convert(&TypeExpr::STR, &Value::Int(7)), Some(Value::str("7")));
        assert_eq!(convert(&TypeExpr::INT, &Value::str("a")), None);
        assert_eq!(convert(&TypeExpr::INT, &Value::Float(1.5)), None);
    }

    #[test]
    fn containers_convert_element_wise() {
        let ty = TypeExpr::variadic_tuple(TypeExpr::INT);
        let got = convert(&ty, &Value::list([Value::str("1"), Value::Int(2)]));
        assert_eq!(got, Some(Value::tuple([Value::Int(1), Value::Int(2)])));

        let pair = TypeExpr::tuple([TypeExpr::STR, TypeExpr::INT]);
        assert_eq!(convert(&pair, &Value::tuple([Value::str("a")])), None);

        let either = TypeExpr::union([TypeExpr::STR, TypeExpr::INT]);
        assert_eq!(convert(&either, &Value::Int(5)), Some(Value::Int(5)));
        assert_eq!(convert(&either, &Value::str("5")), Some(Value::str("5")));
        let number = TypeExpr::union([TypeExpr::FLOAT, TypeExpr::INT]);
        assert_eq!(convert(&number, &Value::Int(2)), Some(Value::Int(2)));
        assert_eq!(convert(&number, &Value::str("2")), Some(Value::Float(2.0)));

        let opt = TypeExpr::optional(TypeExpr::INT);
        assert_eq!(convert(&opt, &Value::None), Some(Value::None));
        assert_eq!(convert(&opt, &Value::str("3")), Some(Value::Int(3)));
    }

    #[test]
    fn literals_check_membership() {
        let ty = TypeExpr::literal([
            LiteralValue::Str(Name::new("debug")),
            LiteralValue::Str(Name::new("info")),
        ]);
        assert_eq!(convert(&ty, &Value::str("info")), Some(Value::str("info")));
        assert_eq!(convert(&ty, &Value::str("trace")), None);
    }

    #[test]
    fn coerce_reports_missing_and_bad_values() {
        let ty = define(
            Declaration::new("Config")
                .typed("name", TypeExpr::STR)
                .typed("age", TypeExpr::INT)
                .field(FieldDecl::new("debug", TypeExpr::BOOL).default(false))
                .field(FieldDecl::new("VERSION", TypeExpr::class_var(TypeExpr::STR)).default("1")),
        )
        .unwrap();

        let err = coerce(&ty, &raw(&[("name", Value::str("n")), ("age", Value::str("a"))]))
            .unwrap_err();
        assert_eq!(
            err,
            CoerceError::TypeCoerce {
                field: Name::new("age"),
                ty: TypeExpr::INT,
                found: "str",
            }
        );

        let err = coerce(&ty, &raw(&[("name", Value::str("n"))])).unwrap_err();
        assert_eq!(err, CoerceError::ValueNotFound { field: Name::new("age") });

        let ok = coerce(
            &ty,
            &raw(&[("name", Value::str("n")), ("age", Value::str("3")), ("x", Value::None)]),
        )
        .unwrap();
        assert_eq!(ok, raw(&[("age", Value::Int(3)), ("name", Value::str("n"))]));
    }
}
