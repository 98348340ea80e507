//! Order forms.
//!
//! Both forms hold three free-text fields and share the same submit rules:
//! trim every field, check the date of birth shape, and only then hand the
//! values to the caller. A rejected submit leaves the form open with its
//! values intact and a message on the date-of-birth field.

pub mod create;
pub mod edit;

pub use create::CreateOrderForm;
pub use edit::EditOrderForm;

use orders_types::{validate_dob, NewOrder, Order, ValidationError};
use thiserror::Error;

/// Errors returned when a form refuses to submit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// The edit form has no order to save.
	#[error("No order selected")]
	NoOrder,
}

/// The three editable fields of an order, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFields {
	pub first_name: String,
	pub last_name: String,
	pub dob: String,
}

impl OrderFields {
	/// Fields pre-filled from an existing order.
	pub fn from_order(order: &Order) -> Self {
		Self {
			first_name: order.patient_first_name.clone(),
			last_name: order.patient_last_name.clone(),
			dob: order.patient_dob.clone(),
		}
	}

	pub fn clear(&mut self) {
		*self = Self::default();
	}

	/// Trims every field and validates the date of birth.
	pub(crate) fn validated(&self) -> Result<NewOrder, ValidationError> {
		let dob = self.dob.trim();
		validate_dob(dob)?;
		Ok(NewOrder {
			patient_first_name: self.first_name.trim().to_string(),
			patient_last_name: self.last_name.trim().to_string(),
			patient_dob: dob.to_string(),
		})
	}
}
