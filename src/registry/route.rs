// Route entry
// Everything the dispatcher needs about one registered action, resolved once

use super::handler::{into_action, BoxedAction, Handler};
use crate::binding::{ParamType, ReturnValues, TypeShape};
use crate::context::HttpContext;
use hyper::Method;

/// One registered action with its cached parameter and return shapes
#[derive(Clone)]
pub struct HttpRoute {
    pub route_url: String,
    pub method: Method,
    pub param_types: Vec<ParamType>,
    pub param_names: Vec<String>,
    pub return_shapes: Vec<TypeShape>,
    /// Exactly one parameter and it is a DTO
    pub request_param_is_model: bool,
    /// First return value is a DTO
    pub response_body_is_model: bool,
    /// First return value is a scalar
    pub is_basic_type: bool,
    action: BoxedAction,
}

impl HttpRoute {
    pub(crate) fn new<H, Args>(
        route_url: String,
        method: Method,
        handler: H,
        param_names: Vec<String>,
    ) -> Self
    where
        H: Handler<Args>,
        Args: 'static,
    {
        let param_types = H::param_types();
        let return_shapes = H::return_shapes();
        let request_param_is_model =
            matches!(param_types.as_slice(), [single] if single.shape().is_structured());
        let response_body_is_model = return_shapes.first().is_some_and(|s| s.is_structured());
        let is_basic_type = return_shapes.first() == Some(&TypeShape::Scalar);

        Self {
            route_url,
            method,
            param_types,
            param_names,
            return_shapes,
            request_param_is_model,
            response_body_is_model,
            is_basic_type,
            action: into_action(handler),
        }
    }

    /// Bind arguments from the context, run the action and fill the response slot
    pub fn handle(&self, ctx: &mut HttpContext) -> ReturnValues {
        let args = ctx.get_request_param(&self.param_types, &self.param_names);
        let values = self.action.call(args);
        ctx.init_response(&values);
        values
    }
}

impl std::fmt::Debug for HttpRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRoute")
            .field("route_url", &self.route_url)
            .field("method", &self.method)
            .field("param_types", &self.param_types)
            .field("param_names", &self.param_names)
            .field("return_shapes", &self.return_shapes)
            .finish_non_exhaustive()
    }
}
