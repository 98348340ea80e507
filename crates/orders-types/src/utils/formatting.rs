//! String formatting utilities.

use crate::Order;

/// Formats the patient name column as `first last`.
pub fn format_patient_name(order: &Order) -> String {
	format!("{} {}", order.patient_first_name, order.patient_last_name)
}

/// Formats the details shown by the view action.
///
/// The layout is one field per line, headed by `Order details:`.
pub fn format_order_details(order: &Order) -> String {
	format!(
		"Order details:\nID: {}\nName: {}\nDOB: {}",
		order.id,
		format_patient_name(order),
		order.patient_dob
	)
}
