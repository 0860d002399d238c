//! [`TypedValue`] – closed tagged union over the primitive kinds a settable
//! variable may hold.
//!
//! The kind set is fixed: `i32`, `f64`, `f32`, `bool` and `String`.  Generic
//! access goes through the sealed [`Primitive`] trait, so a caller can write
//! `value.set(3.5_f32)` and `value.get::<f32>()` without naming the enum
//! variant, while the compiler rejects any type outside the set.
//!
//! # Example
//!
//! ```
//! use aidk_types::value::{TypedValue, ValueKind};
//!
//! let mut v = TypedValue::empty();
//! v.set(String::from("world"));
//! assert!(v.is::<String>());
//! assert_eq!(v.get::<String>().unwrap(), "world");
//!
//! // Reading a different kind is a contract violation.
//! assert!(v.get::<i32>().is_err());
//!
//! v.set(2_i32);
//! assert_eq!(v.kind(), Some(ValueKind::Int));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AidkError;

// ────────────────────────────────────────────────────────────────────────────
// ValueKind
// ────────────────────────────────────────────────────────────────────────────

/// Discriminant of a non-empty [`TypedValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Double,
    Float,
    Bool,
    Text,
}

impl ValueKind {
    /// `true` for the three numeric kinds.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Double | ValueKind::Float)
    }

    /// Whether a value of kind `submitted` may be written to a variable
    /// declared as `self`.
    ///
    /// Identical kinds are always accepted.  The numeric kinds coerce into
    /// each other; text and boolean only accept themselves.
    pub fn accepts(self, submitted: ValueKind) -> bool {
        self == submitted || (self.is_numeric() && submitted.is_numeric())
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "int",
            ValueKind::Double => "double",
            ValueKind::Float => "float",
            ValueKind::Bool => "bool",
            ValueKind::Text => "text",
        };
        f.write_str(name)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TypedValue
// ────────────────────────────────────────────────────────────────────────────

/// A value holding at most one primitive kind at a time.
///
/// Assigning a new kind drops whatever was held before; `Clone` deep-copies
/// text; [`TypedValue::take`] moves the content out and leaves the source
/// empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TypedValue {
    #[default]
    Empty,
    Int(i32),
    Double(f64),
    Float(f32),
    Bool(bool),
    Text(String),
}

impl TypedValue {
    /// A value with no active kind.
    pub fn empty() -> Self {
        TypedValue::Empty
    }

    /// Build a value already holding `value`.
    pub fn of<T: Primitive>(value: T) -> Self {
        value.into_value()
    }

    /// Replace the current content with `value`.
    pub fn set<T: Primitive>(&mut self, value: T) {
        *self = value.into_value();
    }

    /// Whether `T` is the active kind.
    pub fn is<T: Primitive>(&self) -> bool {
        self.kind() == Some(T::KIND)
    }

    /// Borrow the active value as `T`.
    ///
    /// # Errors
    ///
    /// [`AidkError::TypeMismatch`] when `T` is not the active kind, including
    /// when the value is empty.
    pub fn get<T: Primitive>(&self) -> Result<&T, AidkError> {
        T::from_value(self).ok_or_else(|| self.mismatch(T::KIND))
    }

    /// Mutably borrow the active value as `T`.
    ///
    /// # Errors
    ///
    /// Same as [`TypedValue::get`].
    pub fn get_mut<T: Primitive>(&mut self) -> Result<&mut T, AidkError> {
        let err = self.mismatch(T::KIND);
        T::from_value_mut(self).ok_or(err)
    }

    /// Move the content out, leaving [`TypedValue::Empty`] behind.
    pub fn take(&mut self) -> TypedValue {
        std::mem::take(self)
    }

    /// The active kind, or `None` when empty.
    pub fn kind(&self) -> Option<ValueKind> {
        match self {
            TypedValue::Empty => None,
            TypedValue::Int(_) => Some(ValueKind::Int),
            TypedValue::Double(_) => Some(ValueKind::Double),
            TypedValue::Float(_) => Some(ValueKind::Float),
            TypedValue::Bool(_) => Some(ValueKind::Bool),
            TypedValue::Text(_) => Some(ValueKind::Text),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TypedValue::Empty)
    }

    /// Convert to `kind` when [`ValueKind::accepts`] allows it.
    ///
    /// Numeric values convert between the numeric kinds (rounding to the
    /// nearest integer for `Int`); text and boolean only convert to
    /// themselves.  Returns `None` for empty values, rejected kinds,
    /// non-finite numbers and numbers outside the target kind's range.
    pub fn coerced(&self, kind: ValueKind) -> Option<TypedValue> {
        let n = match *self {
            TypedValue::Int(v) => f64::from(v),
            TypedValue::Double(v) => v,
            TypedValue::Float(v) => f64::from(v),
            _ => return (self.kind() == Some(kind)).then(|| self.clone()),
        };
        if !n.is_finite() {
            return None;
        }
        match kind {
            ValueKind::Int => {
                let rounded = n.round();
                (f64::from(i32::MIN)..=f64::from(i32::MAX))
                    .contains(&rounded)
                    .then(|| TypedValue::Int(rounded as i32))
            }
            ValueKind::Double => Some(TypedValue::Double(n)),
            ValueKind::Float => {
                let f = n as f32;
                f.is_finite().then_some(TypedValue::Float(f))
            }
            ValueKind::Bool | ValueKind::Text => None,
        }
    }

    fn mismatch(&self, expected: ValueKind) -> AidkError {
        AidkError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Empty => f.write_str("<empty>"),
            TypedValue::Int(v) => write!(f, "{v}"),
            TypedValue::Double(v) => write!(f, "{v}"),
            TypedValue::Float(v) => write!(f, "{v}"),
            TypedValue::Bool(v) => write!(f, "{v}"),
            TypedValue::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for TypedValue {
                fn from(value: $ty) -> Self {
                    value.into_value()
                }
            }
        )*
    };
}

impl_from_primitive!(i32, f64, f32, bool, String);

impl From<&str> for TypedValue {
    fn from(value: &str) -> Self {
        TypedValue::Text(value.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Primitive
// ────────────────────────────────────────────────────────────────────────────

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for bool {}
    impl Sealed for String {}
}

/// One of the primitive types a [`TypedValue`] can hold.
///
/// Sealed: implemented for exactly `i32`, `f64`, `f32`, `bool` and `String`.
pub trait Primitive: sealed::Sealed + Sized {
    const KIND: ValueKind;

    fn into_value(self) -> TypedValue;
    fn from_value(value: &TypedValue) -> Option<&Self>;
    fn from_value_mut(value: &mut TypedValue) -> Option<&mut Self>;
}

macro_rules! impl_primitive {
    ($ty:ty, $variant:ident) => {
        impl Primitive for $ty {
            const KIND: ValueKind = ValueKind::$variant;

            fn into_value(self) -> TypedValue {
                TypedValue::$variant(self)
            }

            fn from_value(value: &TypedValue) -> Option<&Self> {
                match value {
                    TypedValue::$variant(v) => Some(v),
                    _ => None,
                }
            }

            fn from_value_mut(value: &mut TypedValue) -> Option<&mut Self> {
                match value {
                    TypedValue::$variant(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_primitive!(i32, Int);
impl_primitive!(f64, Double);
impl_primitive!(f32, Float);
impl_primitive!(bool, Bool);
impl_primitive!(String, Text);

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_value_is_empty() {
        let v = TypedValue::empty();
        assert!(v.is_empty());
        assert_eq!(v.kind(), None);
        assert!(!v.is::<i32>());
    }

    #[test]
    fn set_then_get_returns_same_value() {
        let mut v = TypedValue::empty();

        v.set(2_i32);
        assert_eq!(*v.get::<i32>().unwrap(), 2);

        v.set(3.141592653589793_f64);
        assert_eq!(*v.get::<f64>().unwrap(), 3.141592653589793);

        v.set(3.1415926_f32);
        assert_eq!(*v.get::<f32>().unwrap(), 3.1415926_f32);

        v.set(true);
        assert!(*v.get::<bool>().unwrap());

        v.set(String::from("world"));
        assert_eq!(v.get::<String>().unwrap(), "world");
    }

    #[test]
    fn get_other_kind_is_type_mismatch() {
        let v = TypedValue::of(3.5_f32);
        assert!(v.is::<f32>());
        assert!(!v.is::<f64>());

        match v.get::<f64>() {
            Err(AidkError::TypeMismatch { expected, found }) => {
                assert_eq!(expected, ValueKind::Double);
                assert_eq!(found, Some(ValueKind::Float));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
        assert!(v.get::<i32>().is_err());
        assert!(v.get::<bool>().is_err());
        assert!(v.get::<String>().is_err());
    }

    fn sample(kind: ValueKind) -> TypedValue {
        match kind {
            ValueKind::Int => TypedValue::of(2_i32),
            ValueKind::Double => TypedValue::of(3.141592653589793_f64),
            ValueKind::Float => TypedValue::of(3.1415926_f32),
            ValueKind::Bool => TypedValue::of(true),
            ValueKind::Text => TypedValue::from("world"),
        }
    }

    fn read_as(v: &TypedValue, kind: ValueKind) -> Result<(), AidkError> {
        match kind {
            ValueKind::Int => v.get::<i32>().map(drop),
            ValueKind::Double => v.get::<f64>().map(drop),
            ValueKind::Float => v.get::<f32>().map(drop),
            ValueKind::Bool => v.get::<bool>().map(drop),
            ValueKind::Text => v.get::<String>().map(drop),
        }
    }

    const KINDS: [ValueKind; 5] = [
        ValueKind::Int,
        ValueKind::Double,
        ValueKind::Float,
        ValueKind::Bool,
        ValueKind::Text,
    ];

    #[test]
    fn only_the_active_kind_is_readable() {
        for active in KINDS {
            let v = sample(active);
            assert_eq!(v.kind(), Some(active));
            for requested in KINDS {
                let outcome = read_as(&v, requested);
                if requested == active {
                    assert!(outcome.is_ok(), "{active} should read as itself");
                } else {
                    assert_eq!(
                        outcome,
                        Err(AidkError::TypeMismatch {
                            expected: requested,
                            found: Some(active),
                        }),
                        "{active} read as {requested}"
                    );
                }
            }
        }
    }

    #[test]
    fn empty_is_never_readable() {
        let v = TypedValue::empty();
        let err = v.get::<bool>().unwrap_err();
        assert!(matches!(err, AidkError::TypeMismatch { found: None, .. }));
    }

    #[test]
    fn set_replaces_previous_kind() {
        let mut v = TypedValue::of(String::from("abc"));
        v.set(7_i32);
        assert!(v.is::<i32>());
        assert!(!v.is::<String>());
    }

    #[test]
    fn clone_of_text_is_independent() {
        let original = TypedValue::of(String::from("hello"));
        let mut copy = original.clone();
        copy.get_mut::<String>().unwrap().push_str(" world");

        assert_eq!(original.get::<String>().unwrap(), "hello");
        assert_eq!(copy.get::<String>().unwrap(), "hello world");
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut source = TypedValue::of(String::from("moved"));
        let dest = source.take();
        assert!(source.is_empty());
        assert_eq!(dest.get::<String>().unwrap(), "moved");
    }

    #[test]
    fn get_mut_wrong_kind_fails() {
        let mut v = TypedValue::of(1_i32);
        assert!(v.get_mut::<f32>().is_err());
        *v.get_mut::<i32>().unwrap() += 1;
        assert_eq!(*v.get::<i32>().unwrap(), 2);
    }

    #[test]
    fn numeric_kinds_accept_each_other() {
        assert!(ValueKind::Float.accepts(ValueKind::Double));
        assert!(ValueKind::Double.accepts(ValueKind::Int));
        assert!(ValueKind::Int.accepts(ValueKind::Float));
        assert!(!ValueKind::Float.accepts(ValueKind::Text));
        assert!(!ValueKind::Float.accepts(ValueKind::Bool));
        assert!(!ValueKind::Text.accepts(ValueKind::Int));
        assert!(!ValueKind::Bool.accepts(ValueKind::Int));
    }

    #[test]
    fn coerced_converts_between_numeric_kinds() {
        let d = TypedValue::of(3.141592653589793_f64);
        assert_eq!(
            d.coerced(ValueKind::Float),
            Some(TypedValue::Float(3.141592653589793_f64 as f32))
        );
        assert_eq!(d.coerced(ValueKind::Int), Some(TypedValue::Int(3)));
        assert_eq!(
            TypedValue::of(2_i32).coerced(ValueKind::Double),
            Some(TypedValue::Double(2.0))
        );
        assert_eq!(d.coerced(ValueKind::Text), None);
    }

    #[test]
    fn coerced_rejects_values_the_target_cannot_hold() {
        let huge = TypedValue::of(1e20_f64);
        assert_eq!(huge.coerced(ValueKind::Int), None);
        assert_eq!(huge.coerced(ValueKind::Float), Some(TypedValue::Float(1e20_f32)));
        assert_eq!(TypedValue::of(1e300_f64).coerced(ValueKind::Float), None);
        assert_eq!(TypedValue::of(f64::NAN).coerced(ValueKind::Int), None);
        assert_eq!(TypedValue::of(f64::INFINITY).coerced(ValueKind::Double), None);
        assert_eq!(TypedValue::of(f32::NEG_INFINITY).coerced(ValueKind::Float), None);
    }

    #[test]
    fn coerced_int_bounds_are_inclusive() {
        let max = TypedValue::of(f64::from(i32::MAX));
        assert_eq!(max.coerced(ValueKind::Int), Some(TypedValue::Int(i32::MAX)));
        let min = TypedValue::of(f64::from(i32::MIN));
        assert_eq!(min.coerced(ValueKind::Int), Some(TypedValue::Int(i32::MIN)));
        let past = TypedValue::of(f64::from(i32::MAX) + 1.0);
        assert_eq!(past.coerced(ValueKind::Int), None);
    }

    #[test]
    fn coerced_keeps_text_and_bool_strict() {
        let t = TypedValue::from("abc");
        assert_eq!(t.coerced(ValueKind::Text), Some(t.clone()));
        assert_eq!(t.coerced(ValueKind::Float), None);
        assert_eq!(TypedValue::of(true).coerced(ValueKind::Int), None);
        assert_eq!(TypedValue::empty().coerced(ValueKind::Int), None);
    }

    #[test]
    fn serde_uses_kind_tag() {
        let json = serde_json::to_string(&TypedValue::of(2_i32)).unwrap();
        assert_eq!(json, r#"{"kind":"int","value":2}"#);

        let back: TypedValue = serde_json::from_str(r#"{"kind":"text","value":"world"}"#).unwrap();
        assert_eq!(back, TypedValue::from("world"));

        let empty: TypedValue = serde_json::from_str(r#"{"kind":"empty"}"#).unwrap();
        assert!(empty.is_empty());
    }
}
