//! Utility functions for display formatting shared by the workflow layer
//! and the binary.

pub mod formatting;

pub use formatting::{format_order_details, format_patient_name};
