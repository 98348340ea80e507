//! Common types module for the order desk.
//!
//! This module defines the data shapes exchanged with the orders backend
//! and the client-side validation rules applied before anything is sent.
//! It provides a centralized location for shared types so that the API
//! client, the workflow layer and the binary agree on one representation.

/// Activity log entries recorded by the backend.
pub mod activity;
/// Order records and their creation payload.
pub mod order;
/// Registry trait for self-registering API implementations.
pub mod registry;
/// Upload payload types for the PDF ingest endpoint.
pub mod upload;
/// Utility functions for display formatting.
pub mod utils;
/// Client-side field validation.
pub mod validation;

// Re-export all types for convenient access
pub use activity::*;
pub use order::*;
pub use registry::*;
pub use upload::*;
pub use utils::{format_order_details, format_patient_name};
pub use validation::*;
