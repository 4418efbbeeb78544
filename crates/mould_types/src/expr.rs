//! The type-expression tree.

use std::fmt;
use std::sync::Arc;

use crate::Name;

/// Built-in scalar types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Primitive {
    /// 64-bit signed integer.
    Int,
    /// 64-bit IEEE 754 float.
    Float,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Str,
    /// Byte string.
    Bytes,
}

impl Primitive {
    /// Display name of the primitive.
    pub const fn name(self) -> &'static str {
        match self {
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::Bool => "bool",
            Primitive::Str => "str",
            Primitive::Bytes => "bytes",
        }
    }
}

/// Singleton values usable as types (`None` as the type of `None`).
///
/// `Ellipsis` marks the variadic tail of a fixed-length sequence:
/// `tuple[str, ...]` is `Tuple` applied to `[str, Ellipsis]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Singleton {
    True,
    False,
    None,
    Ellipsis,
}

impl Singleton {
    /// Display name of the singleton.
    pub const fn name(self) -> &'static str {
        match self {
            Singleton::True => "True",
            Singleton::False => "False",
            Singleton::None => "None",
            Singleton::Ellipsis => "...",
        }
    }
}

/// Generic container constructors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Constructor {
    /// Fixed-length sequence.
    Tuple,
    /// Frozen set.
    FrozenSet,
    /// Tagged union of alternatives.
    Union,
    /// Open-ended sequence.
    List,
    /// Mutable set.
    Set,
    /// Key/value map.
    Dict,
}

impl Constructor {
    /// Display name of the constructor.
    pub const fn name(self) -> &'static str {
        match self {
            Constructor::Tuple => "tuple",
            Constructor::FrozenSet => "frozenset",
            Constructor::Union => "union",
            Constructor::List => "list",
            Constructor::Set => "set",
            Constructor::Dict => "dict",
        }
    }
}

/// A value allowed inside a literal-value type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LiteralValue {
    Int(i64),
    Str(Name),
    Bool(bool),
    Bytes(Vec<u8>),
    None,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(n) => write!(f, "{n}"),
            LiteralValue::Str(s) => write!(f, "{:?}", s.as_str()),
            LiteralValue::Bool(true) => f.write_str("True"),
            LiteralValue::Bool(false) => f.write_str("False"),
            LiteralValue::Bytes(b) => write!(f, "b{:?}", String::from_utf8_lossy(b)),
            LiteralValue::None => f.write_str("None"),
        }
    }
}

/// A field of a record shape: name plus declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldShape {
    pub name: Name,
    pub ty: TypeExpr,
}

/// The annotated fields of a record type, in declared order.
///
/// This is the part of a record the immutability analyzer recurses into when
/// a record is used as the type of another record's field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecordShape {
    pub name: Name,
    pub fields: Vec<FieldShape>,
}

impl RecordShape {
    /// Create a shape from `(name, type)` pairs.
    pub fn new<N: Into<Name>>(name: impl Into<Name>, fields: impl IntoIterator<Item = (N, TypeExpr)>) -> Self {
        RecordShape {
            name: name.into(),
            fields: fields
                .into_iter()
                .map(|(name, ty)| FieldShape {
                    name: name.into(),
                    ty,
                })
                .collect(),
        }
    }

    /// Look up a field type by name.
    pub fn field(&self, name: &str) -> Option<&TypeExpr> {
        self.fields.iter().find(|f| f.name == name).map(|f| &f.ty)
    }
}

/// A declared field type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeExpr {
    /// Built-in scalar.
    Primitive(Primitive),

    /// A singleton value used as a type.
    Singleton(Singleton),

    /// Generic container applied to type arguments.
    Generic {
        ctor: Constructor,
        args: Vec<TypeExpr>,
    },

    /// Literal-value type: exactly one of the listed values.
    Literal(Vec<LiteralValue>),

    /// A nested record type.
    Record(Arc<RecordShape>),

    /// A named type known only by name.
    ///
    /// `base` records what the type inherits from, e.g. a named subtype of a
    /// fixed-length sequence. The analyzer does not look at it.
    Nominal {
        name: Name,
        base: Option<Box<TypeExpr>>,
    },

    /// A class-scoped attribute; not instance data.
    ClassVar(Box<TypeExpr>),
}

impl TypeExpr {
    pub const INT: TypeExpr = TypeExpr::Primitive(Primitive::Int);
    pub const FLOAT: TypeExpr = TypeExpr::Primitive(Primitive::Float);
    pub const BOOL: TypeExpr = TypeExpr::Primitive(Primitive::Bool);
    pub const STR: TypeExpr = TypeExpr::Primitive(Primitive::Str);
    pub const BYTES: TypeExpr = TypeExpr::Primitive(Primitive::Bytes);
    pub const NONE: TypeExpr = TypeExpr::Singleton(Singleton::None);
    pub const ELLIPSIS: TypeExpr = TypeExpr::Singleton(Singleton::Ellipsis);

    // === Constructors ===

    /// Apply a container constructor to arguments.
    pub fn generic(ctor: Constructor, args: impl IntoIterator<Item = TypeExpr>) -> Self {
        TypeExpr::Generic {
            ctor,
            args: args.into_iter().collect(),
        }
    }

    /// Fixed-length sequence with the given element types.
    pub fn tuple(elems: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::generic(Constructor::Tuple, elems)
    }

    /// Variable-length homogeneous `tuple[elem, ...]`.
    pub fn variadic_tuple(elem: TypeExpr) -> Self {
        Self::generic(Constructor::Tuple, [elem, Self::ELLIPSIS])
    }

    pub fn frozenset(elem: TypeExpr) -> Self {
        Self::generic(Constructor::FrozenSet, [elem])
    }

    pub fn union(alternatives: impl IntoIterator<Item = TypeExpr>) -> Self {
        Self::generic(Constructor::Union, alternatives)
    }

    /// `union[inner, None]`.
    pub fn optional(inner: TypeExpr) -> Self {
        Self::union([inner, Self::NONE])
    }

    pub fn list(elem: TypeExpr) -> Self {
        Self::generic(Constructor::List, [elem])
    }

    pub fn set(elem: TypeExpr) -> Self {
        Self::generic(Constructor::Set, [elem])
    }

    pub fn dict(key: TypeExpr, value: TypeExpr) -> Self {
        Self::generic(Constructor::Dict, [key, value])
    }

    pub fn literal(values: impl IntoIterator<Item = LiteralValue>) -> Self {
        TypeExpr::Literal(values.into_iter().collect())
    }

    pub fn record(shape: impl Into<Arc<RecordShape>>) -> Self {
        TypeExpr::Record(shape.into())
    }

    pub fn nominal(name: impl Into<Name>) -> Self {
        TypeExpr::Nominal {
            name: name.into(),
            base: None,
        }
    }

    /// A named type that inherits from `base`.
    pub fn nominal_subtype(name: impl Into<Name>, base: TypeExpr) -> Self {
        TypeExpr::Nominal {
            name: name.into(),
            base: Some(Box::new(base)),
        }
    }

    pub fn class_var(inner: TypeExpr) -> Self {
        TypeExpr::ClassVar(Box::new(inner))
    }

    // === Queries ===

    /// Check if this annotation declares a class-scoped attribute.
    #[inline]
    pub fn is_class_var(&self) -> bool {
        matches!(self, TypeExpr::ClassVar(_))
    }

    /// The type arguments of a generic, or an empty slice.
    pub fn args(&self) -> &[TypeExpr] {
        match self {
            TypeExpr::Generic { args, .. } => args,
            _ => &[],
        }
    }
}

impl From<Primitive> for TypeExpr {
    fn from(p: Primitive) -> Self {
        TypeExpr::Primitive(p)
    }
}

impl From<Singleton> for TypeExpr {
    fn from(s: Singleton) -> Self {
        TypeExpr::Singleton(s)
    }
}

impl From<RecordShape> for TypeExpr {
    fn from(shape: RecordShape) -> Self {
        TypeExpr::Record(Arc::new(shape))
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Primitive(p) => f.write_str(p.name()),
            TypeExpr::Singleton(s) => f.write_str(s.name()),
            TypeExpr::Generic { ctor, args } => {
                write!(f, "{}[", ctor.name())?;
                write_list(f, args)?;
                f.write_str("]")
            }
            TypeExpr::Literal(values) => {
                f.write_str("literal[")?;
                write_list(f, values)?;
                f.write_str("]")
            }
            TypeExpr::Record(shape) => write!(f, "{}", shape.name),
            TypeExpr::Nominal { name, .. } => write!(f, "{name}"),
            TypeExpr::ClassVar(inner) => write!(f, "classvar[{inner}]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_nested() {
        let ty = TypeExpr::dict(TypeExpr::STR, TypeExpr::variadic_tuple(TypeExpr::INT));
        assert_eq!(ty.to_string(), "dict[str, tuple[int, ...]]");

        let lit = TypeExpr::literal([LiteralValue::Str(Name::new("a")), LiteralValue::Int(1)]);
        assert_eq!(lit.to_string(), "literal[\"a\", 1]");

        assert_eq!(TypeExpr::optional(TypeExpr::BOOL).to_string(), "union[bool, None]");
    }

    #[test]
    fn record_shape_lookup() {
        let shape = RecordShape::new("Point", [("x", TypeExpr::INT), ("y", TypeExpr::FLOAT)]);
        assert_eq!(shape.field("y"), Some(&TypeExpr::FLOAT));
        assert_eq!(shape.field("z"), None);
        assert_eq!(TypeExpr::record(shape).to_string(), "Point");
    }
}
