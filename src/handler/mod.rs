//! Request handler module
//!
//! Dispatches requests to registered actions.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
