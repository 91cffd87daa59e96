//! HTTP protocol layer module
//!
//! Response builders used by the dispatcher, decoupled from binding logic.

pub mod response;

// Re-export commonly used types
pub use response::{
    apply_cors, build_404_response, build_405_response, build_413_response, build_body_response,
    build_options_response,
};
