//! Request handler module
//!
//! Responsible for request routing dispatch and the items endpoint.

pub mod items;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
