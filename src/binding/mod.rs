//! Binding engine module
//!
//! Converts request data into typed handler arguments and handler results
//! back into response bodies:
//! - Type descriptors resolved once per route (`types`)
//! - Best-effort value coercion (`convert`)
//! - Content-type driven parameter binding (`binder`)
//! - Return value serialization (`encoder`)

pub mod binder;
pub mod convert;
pub mod encoder;
pub mod types;

pub use binder::bind;
pub use encoder::{encode, ResponseBody};
pub use serde_json::Value;
pub use types::{Arguments, ParamType, ReturnValue, ReturnValues, TypeShape, Typed};

/// Implement [`Typed`] for application DTOs.
///
/// The type is bound and rendered as one JSON document, so it must be
/// `Default + Serialize + DeserializeOwned`.
///
/// ```
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// webbind::typed_dto!(User);
///
/// use webbind::binding::{TypeShape, Typed};
/// assert_eq!(<User as Typed>::SHAPE, TypeShape::Structured);
/// ```
#[macro_export]
macro_rules! typed_dto {
    ($($t:ty),+ $(,)?) => {
        $(
            impl $crate::binding::Typed for $t {
                const SHAPE: $crate::binding::TypeShape = $crate::binding::TypeShape::Structured;

                fn zero() -> Self {
                    <$t as ::core::default::Default>::default()
                }

                fn from_value(value: &$crate::binding::Value) -> ::core::option::Option<Self> {
                    $crate::binding::convert::structured_from_value(value)
                }

                fn to_value(&self) -> $crate::binding::Value {
                    $crate::binding::convert::structured_to_value(self)
                }

                fn from_body(body: &[u8]) -> ::core::option::Option<Self> {
                    $crate::binding::convert::structured_from_body(body)
                }
            }
        )+
    };
}
