//! Value model for representation building
//!
//! Every value handed to a builder is captured as a [`Value`] up front, but
//! rendering to text is deferred to build time so that cycle context, which
//! depends on the whole call chain, can be applied uniformly.

use std::fmt;
use std::rc::Rc;

use crate::repr::{Repr, Rendered};

/// Identity of an object, derived from its address. Used for cycle detection
/// and self-reference substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

impl ObjectId {
    /// The identity of the value behind the given reference.
    ///
    /// Stable for as long as the value does not move; heap-allocated subjects
    /// (e.g. behind `Rc`) keep one identity for their whole lifetime.
    #[must_use]
    pub fn of<T: ?Sized>(value: &T) -> Self {
        Self((value as *const T).cast::<()>() as usize)
    }
}

/// Implemented by types that can describe themselves as a [`Repr`].
///
/// The `Display` supertrait is the fallback: when [`Represent::repr`] returns
/// `None`, the formatter falls through to plain text conversion.
pub trait Represent: fmt::Display {
    /// Identity used for cycle detection. Defaults to the address of `self`.
    fn identity(&self) -> ObjectId {
        ObjectId::of(self)
    }

    /// The full type label, used to derive class and variable labels.
    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Build a [`Repr`] describing this object.
    ///
    /// Returning `None` signals that no structured representation is
    /// available; the formatter then renders the `Display` output instead.
    fn repr(&self) -> Option<Repr>;
}

/// An arbitrary value displayed best-effort through [`fmt::Display`].
///
/// The type path is captured at construction so that a failing `Display`
/// implementation can degrade to the `Type(!!!)` placeholder.
#[derive(Clone)]
pub struct Opaque {
    value: Rc<dyn fmt::Display>,
    type_path: Vec<String>,
}

impl Opaque {
    pub(crate) fn display(&self) -> &dyn fmt::Display {
        &*self.value
    }

    pub(crate) fn type_path(&self) -> &[String] {
        &self.type_path
    }

    fn id(&self) -> ObjectId {
        ObjectId::of(&*self.value)
    }
}

/// A value captured for rendering.
///
/// The formatter dispatches on the variant with a fixed precedence; see the
/// `format` module.
#[derive(Clone)]
pub enum Value {
    /// Text, quoted and escaped at render time.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean.
    Bool(bool),
    /// Absent value, rendered as `None`.
    None,
    /// Ordered sequence, rendered in square brackets.
    List(Vec<Value>),
    /// Fixed sequence, rendered in parentheses with a trailing comma when it
    /// holds exactly one element.
    Tuple(Vec<Value>),
    /// Keyed mapping, rendered in braces in insertion order.
    Dict(Vec<(Value, Value)>),
    /// Reference to a type itself, as a dotted qualifier path.
    Class(Vec<String>),
    /// Reference to a function or method.
    Function {
        /// Qualifier path, outer to inner; the last segment is the name.
        path: Vec<String>,
        /// Whether this callable wraps another callable.
        wrapped: bool,
    },
    /// Enumeration member, rendered as `Outer.Inner.MEMBER`.
    EnumMember {
        /// Qualifier path of the enumeration type.
        path: Vec<String>,
        /// The member name.
        member: String,
    },
    /// Text already rendered by another builder, re-renderable under the
    /// enclosing build's cycle context.
    Rendered(Rendered),
    /// An object that may expose a structured representation.
    Object(Rc<dyn Represent>),
    /// Sentinel substituted for values identical to the builder's subject.
    SelfRef,
    /// Fallback value displayed best-effort.
    Opaque(Opaque),
}

impl Value {
    /// An ordered sequence.
    pub fn list(items: impl IntoIterator<Item = Self>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// A fixed sequence.
    pub fn tuple(items: impl IntoIterator<Item = Self>) -> Self {
        Self::Tuple(items.into_iter().collect())
    }

    /// A keyed mapping; pairs keep their iteration order.
    pub fn dict(pairs: impl IntoIterator<Item = (Self, Self)>) -> Self {
        Self::Dict(pairs.into_iter().collect())
    }

    /// A type reference with the given qualifier path.
    pub fn class<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Self::Class(path.into_iter().map(Into::into).collect())
    }

    /// A function reference with the given qualifier path.
    pub fn function<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Self::Function {
            path: path.into_iter().map(Into::into).collect(),
            wrapped: false,
        }
    }

    /// A function reference that wraps another callable. Rendered with a
    /// `wrapped` comment in multi-line mode.
    pub fn function_wrapped<S: Into<String>>(path: impl IntoIterator<Item = S>) -> Self {
        Self::Function {
            path: path.into_iter().map(Into::into).collect(),
            wrapped: true,
        }
    }

    /// An enumeration member.
    pub fn enum_member<S: Into<String>>(
        path: impl IntoIterator<Item = S>,
        member: impl Into<String>,
    ) -> Self {
        Self::EnumMember {
            path: path.into_iter().map(Into::into).collect(),
            member: member.into(),
        }
    }

    /// An object exposing the representation hook.
    #[must_use]
    pub fn object(obj: Rc<dyn Represent>) -> Self {
        Self::Object(obj)
    }

    /// A fallback value rendered through its `Display` implementation.
    pub fn opaque<T: fmt::Display + 'static>(value: T) -> Self {
        Self::Opaque(Opaque {
            type_path: type_path(std::any::type_name::<T>()),
            value: Rc::new(value),
        })
    }

    /// The identity of the object this value refers to, if any.
    ///
    /// Only `Object` values carry an identity here; rendered handles are
    /// plain text as far as self-substitution is concerned, matching the
    /// cycle-detection rules which recover their source at format time.
    #[must_use]
    pub fn identity(&self) -> Option<ObjectId> {
        match self {
            Self::Object(obj) => Some(obj.identity()),
            _ => Option::None,
        }
    }
}

/// Split a `std::any::type_name` style label into qualifier segments,
/// ignoring any generic argument suffix.
pub(crate) fn type_path(label: &str) -> Vec<String> {
    let base = label.split('<').next().unwrap_or(label);
    base.split("::")
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// The last qualifier segment of a type label.
pub(crate) fn short_type_name(label: &str) -> String {
    type_path(label).pop().unwrap_or_default()
}

impl PartialEq for Value {
    #[allow(clippy::cast_precision_loss, clippy::float_cmp)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Str(a), Self::Rendered(b)) | (Self::Rendered(b), Self::Str(a)) => {
                a == b.as_str()
            }
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::None, Self::None) | (Self::SelfRef, Self::SelfRef) => true,
            (Self::List(a), Self::List(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Dict(a), Self::Dict(b)) => a == b,
            (Self::Class(a), Self::Class(b)) => a == b,
            (
                Self::Function { path: a, wrapped: aw },
                Self::Function { path: b, wrapped: bw },
            ) => a == b && aw == bw,
            (
                Self::EnumMember { path: a, member: am },
                Self::EnumMember { path: b, member: bm },
            ) => a == b && am == bm,
            (Self::Rendered(a), Self::Rendered(b)) => a.as_str() == b.as_str(),
            (Self::Object(a), Self::Object(b)) => a.identity() == b.identity(),
            (Self::Opaque(a), Self::Opaque(b)) => a.id() == b.id(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::None => write!(f, "None"),
            Self::List(v) => f.debug_tuple("List").field(v).finish(),
            Self::Tuple(v) => f.debug_tuple("Tuple").field(v).finish(),
            Self::Dict(v) => f.debug_tuple("Dict").field(v).finish(),
            Self::Class(v) => f.debug_tuple("Class").field(v).finish(),
            Self::Function { path, wrapped } => write!(f, "Function({path:?}, wrapped={wrapped})"),
            Self::EnumMember { path, member } => write!(f, "EnumMember({path:?}, {member})"),
            Self::Rendered(v) => write!(f, "Rendered({:?})", v.as_str()),
            Self::Object(obj) => write!(f, "Object({:?})", obj.identity()),
            Self::SelfRef => write!(f, "SelfRef"),
            Self::Opaque(v) => write!(f, "Opaque({})", v.type_path().join("::")),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::None, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl From<Rendered> for Value {
    fn from(v: Rendered) -> Self {
        Self::Rendered(v)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::None,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map_or_else(|| Self::Float(n.as_f64().unwrap_or(f64::NAN)), Self::Int),
            serde_json::Value::String(s) => Self::Str(s.clone()),
            serde_json::Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => Self::Dict(
                map.iter()
                    .map(|(k, v)| (Self::Str(k.clone()), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::from(&v)
    }
}
