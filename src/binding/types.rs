//! Type descriptors
//!
//! Every type that can appear as a handler parameter or return value
//! implements [`Typed`]. Its [`TypeShape`] is a constant of the type, so the
//! JSON-vs-scalar decision is taken once when a route is registered and cached
//! in a [`ParamType`], never re-inspected per request.

use super::convert;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;

/// Shape of a bindable type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// Numbers, booleans, characters and strings
    Scalar,
    /// Record-like values bound and rendered as one JSON document
    Structured,
    /// Lists and maps
    Collection,
}

impl TypeShape {
    pub const fn is_structured(self) -> bool {
        matches!(self, Self::Structured)
    }
}

/// A type the binding engine can produce from request data and render back
pub trait Typed: Sized + Send + 'static {
    const SHAPE: TypeShape;

    /// The value used whenever binding or coercion fails
    fn zero() -> Self;

    /// Fallible coercion from a query/form string or decoded JSON value
    fn from_value(value: &Value) -> Option<Self>;

    fn to_value(&self) -> Value;

    /// Deserialize a whole request body into one value
    fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice::<Value>(body)
            .ok()
            .and_then(|value| Self::from_value(&value))
    }
}

macro_rules! impl_signed {
    ($($t:ty),* $(,)?) => {
        $(
            impl Typed for $t {
                const SHAPE: TypeShape = TypeShape::Scalar;

                fn zero() -> Self {
                    0
                }

                fn from_value(value: &Value) -> Option<Self> {
                    convert::to_i64(value).and_then(|n| Self::try_from(n).ok())
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),* $(,)?) => {
        $(
            impl Typed for $t {
                const SHAPE: TypeShape = TypeShape::Scalar;

                fn zero() -> Self {
                    0
                }

                fn from_value(value: &Value) -> Option<Self> {
                    convert::to_u64(value).and_then(|n| Self::try_from(n).ok())
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Typed for f64 {
    const SHAPE: TypeShape = TypeShape::Scalar;

    fn zero() -> Self {
        0.0
    }

    fn from_value(value: &Value) -> Option<Self> {
        convert::to_f64(value)
    }

    fn to_value(&self) -> Value {
        convert::float_value(*self)
    }
}

impl Typed for f32 {
    const SHAPE: TypeShape = TypeShape::Scalar;

    fn zero() -> Self {
        0.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Option<Self> {
        convert::to_f64(value)
            .filter(|f| f.abs() <= Self::MAX.into())
            .map(|f| f as Self)
    }

    /// Widened through the shortest decimal form, so `0.1` stays `0.1`
    fn to_value(&self) -> Value {
        convert::float_value(self.to_string().parse().unwrap_or(f64::NAN))
    }
}

impl Typed for bool {
    const SHAPE: TypeShape = TypeShape::Scalar;

    fn zero() -> Self {
        false
    }

    fn from_value(value: &Value) -> Option<Self> {
        convert::to_bool(value)
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Typed for char {
    const SHAPE: TypeShape = TypeShape::Scalar;

    fn zero() -> Self {
        '\0'
    }

    fn from_value(value: &Value) -> Option<Self> {
        let text = convert::to_string_value(value)?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl Typed for String {
    const SHAPE: TypeShape = TypeShape::Scalar;

    fn zero() -> Self {
        Self::new()
    }

    fn from_value(value: &Value) -> Option<Self> {
        convert::to_string_value(value)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

/// Raw JSON passthrough, bound like a DTO
impl Typed for Value {
    const SHAPE: TypeShape = TypeShape::Structured;

    fn zero() -> Self {
        Self::Null
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_body(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }
}

impl<T: Typed> Typed for Option<T> {
    const SHAPE: TypeShape = T::SHAPE;

    fn zero() -> Self {
        None
    }

    fn from_value(value: &Value) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_value(value).map(Some)
    }

    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::to_value)
    }

    fn from_body(body: &[u8]) -> Option<Self> {
        T::from_body(body).map(Some)
    }
}

impl<T: Typed> Typed for Vec<T> {
    const SHAPE: TypeShape = TypeShape::Collection;

    fn zero() -> Self {
        Self::new()
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => items.iter().map(T::from_value).collect(),
            // Repeated query/form keys arrive joined with the multi-value separator
            Value::String(joined) if joined.is_empty() => Some(Self::new()),
            Value::String(joined) => joined
                .split(convert::MULTI_VALUE_SEPARATOR)
                .map(|part| T::from_value(&Value::String(part.to_string())))
                .collect(),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(T::to_value).collect())
    }
}

impl<T: Typed> Typed for HashMap<String, T> {
    const SHAPE: TypeShape = TypeShape::Collection;

    fn zero() -> Self {
        Self::new()
    }

    fn from_value(value: &Value) -> Option<Self> {
        let Value::Object(fields) = value else {
            return None;
        };
        fields
            .iter()
            .map(|(key, field)| T::from_value(field).map(|v| (key.clone(), v)))
            .collect()
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, v)| (key.clone(), v.to_value()))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// One bound argument, erased so a route can hold any parameter list
pub type Arg = Box<dyn Any + Send>;

/// Parameter type descriptor cached on a route at registration time
#[derive(Clone, Copy)]
pub struct ParamType {
    name: &'static str,
    shape: TypeShape,
    zero: fn() -> Arg,
    convert: fn(Option<&Value>) -> (Arg, bool),
    from_body: fn(&[u8]) -> (Arg, bool),
}

impl std::fmt::Debug for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParamType")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

fn erased_zero<T: Typed>() -> Arg {
    Box::new(T::zero())
}

fn erased_convert<T: Typed>(value: Option<&Value>) -> (Arg, bool) {
    let (value, ok) = convert::convert::<T>(value);
    (Box::new(value), ok)
}

fn erased_from_body<T: Typed>(body: &[u8]) -> (Arg, bool) {
    let (value, ok) = convert::convert_body::<T>(body);
    (Box::new(value), ok)
}

impl ParamType {
    pub fn of<T: Typed>() -> Self {
        Self {
            name: std::any::type_name::<T>(),
            shape: T::SHAPE,
            zero: erased_zero::<T>,
            convert: erased_convert::<T>,
            from_body: erased_from_body::<T>,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub const fn shape(&self) -> TypeShape {
        self.shape
    }

    pub fn zero(&self) -> Arg {
        (self.zero)()
    }

    /// Coerce a looked-up value; the returned argument is usable even when `ok` is false
    pub fn convert(&self, value: Option<&Value>) -> (Arg, bool) {
        (self.convert)(value)
    }

    pub fn from_body(&self, body: &[u8]) -> (Arg, bool) {
        (self.from_body)(body)
    }
}

/// Ordered, positionally aligned handler arguments
#[derive(Debug, Default)]
pub struct Arguments(Vec<Arg>);

impl Arguments {
    pub const fn new(values: Vec<Arg>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get<T: Typed>(&self, index: usize) -> Option<&T> {
        self.0.get(index)?.downcast_ref::<T>()
    }

    /// Move the argument at `index` out, leaving the zero value behind.
    ///
    /// A missing slot or a type mismatch yields `T::zero()`.
    pub fn take<T: Typed>(&mut self, index: usize) -> T {
        self.0
            .get_mut(index)
            .and_then(|slot| slot.downcast_mut::<T>())
            .map_or_else(T::zero, |slot| std::mem::replace(slot, T::zero()))
    }
}

/// One handler return value with its cached shape
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnValue {
    pub shape: TypeShape,
    pub value: Value,
}

impl ReturnValue {
    pub fn of<T: Typed>(value: &T) -> Self {
        Self {
            shape: T::SHAPE,
            value: value.to_value(),
        }
    }
}

pub type ReturnValues = Vec<ReturnValue>;
