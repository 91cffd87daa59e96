//! Handler adapter
//!
//! Any `Fn(A1, .., An) -> R` with `Typed` arguments (up to eight) and an
//! [`IntoReturnValues`] result is a [`Handler`]. Registration erases it into
//! a [`BoxedAction`] that is called with bound [`Arguments`].

use crate::binding::{Arguments, ParamType, ReturnValue, ReturnValues, TypeShape, Typed};
use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

/// Conversion of a handler result into its ordered return values
pub trait IntoReturnValues {
    /// Declared shapes, one per return value
    fn shapes() -> Vec<TypeShape>;

    fn into_return_values(self) -> ReturnValues;
}

impl IntoReturnValues for () {
    fn shapes() -> Vec<TypeShape> {
        Vec::new()
    }

    fn into_return_values(self) -> ReturnValues {
        Vec::new()
    }
}

impl<T: Typed> IntoReturnValues for T {
    fn shapes() -> Vec<TypeShape> {
        vec![T::SHAPE]
    }

    fn into_return_values(self) -> ReturnValues {
        vec![ReturnValue::of(&self)]
    }
}

impl<A: Typed, B: Typed> IntoReturnValues for (A, B) {
    fn shapes() -> Vec<TypeShape> {
        vec![A::SHAPE, B::SHAPE]
    }

    fn into_return_values(self) -> ReturnValues {
        vec![ReturnValue::of(&self.0), ReturnValue::of(&self.1)]
    }
}

impl<A: Typed, B: Typed, C: Typed> IntoReturnValues for (A, B, C) {
    fn shapes() -> Vec<TypeShape> {
        vec![A::SHAPE, B::SHAPE, C::SHAPE]
    }

    fn into_return_values(self) -> ReturnValues {
        vec![
            ReturnValue::of(&self.0),
            ReturnValue::of(&self.1),
            ReturnValue::of(&self.2),
        ]
    }
}

/// `Ok(v)` is `(v, null)`, `Err(e)` is `(zero, "e")`
impl<T: Typed, E: Display> IntoReturnValues for Result<T, E> {
    fn shapes() -> Vec<TypeShape> {
        vec![T::SHAPE, TypeShape::Scalar]
    }

    fn into_return_values(self) -> ReturnValues {
        let (value, error) = match self {
            Ok(value) => (value, None),
            Err(e) => (T::zero(), Some(e.to_string())),
        };
        vec![ReturnValue::of(&value), ReturnValue::of(&error)]
    }
}

/// A typed function usable as a route action
pub trait Handler<Args>: Send + Sync + 'static {
    fn param_types() -> Vec<ParamType>;

    fn return_shapes() -> Vec<TypeShape>;

    fn invoke(&self, args: Arguments) -> ReturnValues;
}

macro_rules! impl_handler {
    ($($ty:ident $idx:tt),*) => {
        #[allow(non_snake_case, unused_mut, unused_variables)]
        impl<F, R, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: Fn($($ty),*) -> R + Send + Sync + 'static,
            R: IntoReturnValues,
            $($ty: Typed,)*
        {
            fn param_types() -> Vec<ParamType> {
                vec![$(ParamType::of::<$ty>()),*]
            }

            fn return_shapes() -> Vec<TypeShape> {
                R::shapes()
            }

            fn invoke(&self, mut args: Arguments) -> ReturnValues {
                (self)($(args.take::<$ty>($idx)),*).into_return_values()
            }
        }
    };
}

impl_handler!();
impl_handler!(A1 0);
impl_handler!(A1 0, A2 1);
impl_handler!(A1 0, A2 1, A3 2);
impl_handler!(A1 0, A2 1, A3 2, A4 3);
impl_handler!(A1 0, A2 1, A3 2, A4 3, A5 4);
impl_handler!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5);
impl_handler!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5, A7 6);
impl_handler!(A1 0, A2 1, A3 2, A4 3, A5 4, A6 5, A7 6, A8 7);

/// Object-safe form of a [`Handler`]
pub trait ErasedAction: Send + Sync {
    fn call(&self, args: Arguments) -> ReturnValues;
}

pub type BoxedAction = Arc<dyn ErasedAction>;

/// Newtype bridging a typed handler to the trait-object world
struct FnAction<H, Args> {
    handler: H,
    _args: PhantomData<fn() -> Args>,
}

impl<H, Args> ErasedAction for FnAction<H, Args>
where
    H: Handler<Args>,
    Args: 'static,
{
    fn call(&self, args: Arguments) -> ReturnValues {
        self.handler.invoke(args)
    }
}

pub fn into_action<H, Args>(handler: H) -> BoxedAction
where
    H: Handler<Args>,
    Args: 'static,
{
    Arc::new(FnAction {
        handler,
        _args: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shapes_of<H: Handler<Args>, Args>(_: &H) -> (Vec<ParamType>, Vec<TypeShape>) {
        (H::param_types(), H::return_shapes())
    }

    #[test]
    fn test_declared_types() {
        let add = |a: i64, b: i64| a + b;
        let (params, returns) = shapes_of(&add);
        assert_eq!(params.len(), 2);
        assert!(params[0].name().contains("i64"));
        assert_eq!(returns, vec![TypeShape::Scalar]);

        let ping = || ();
        let (params, returns) = shapes_of(&ping);
        assert!(params.is_empty());
        assert!(returns.is_empty());
    }

    #[test]
    fn test_invoke_through_erased_action() {
        let greet = |name: String, times: u8| name.repeat(usize::from(times));
        let action = into_action(greet);
        let args = Arguments::new(vec![Box::new("ab".to_string()), Box::new(2_u8)]);

        let values = action.call(args);
        assert_eq!(values, vec![ReturnValue::of(&"abab".to_string())]);
    }

    #[test]
    fn test_missing_arguments_use_zero() {
        let action = into_action(|a: i32, b: String| format!("{a}:{b}"));
        let values = action.call(Arguments::default());
        assert_eq!(values[0].value, json!("0:"));
    }

    #[test]
    fn test_result_returns_two_values() {
        let ok: Result<u32, String> = Ok(5);
        let values = ok.into_return_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].value, json!(5));
        assert_eq!(values[1].value, json!(null));

        let err: Result<u32, String> = Err("missing".to_string());
        let values = err.into_return_values();
        assert_eq!(values[0].value, json!(0));
        assert_eq!(values[1].value, json!("missing"));
    }

    #[test]
    fn test_tuple_returns() {
        let values = (1_u8, "x".to_string(), false).into_return_values();
        assert_eq!(values.len(), 3);
        assert_eq!(<(u8, bool)>::shapes(), vec![TypeShape::Scalar, TypeShape::Scalar]);
    }
}
