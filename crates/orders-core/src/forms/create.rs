//! Create-order form.

use super::{FormError, OrderFields};
use orders_types::NewOrder;

/// Form collecting the fields of a new order.
///
/// The form knows nothing about what happens to a submitted order; the
/// caller performs the request and any refresh.
#[derive(Debug, Clone, Default)]
pub struct CreateOrderForm {
	fields: OrderFields,
	dob_error: Option<String>,
	opened: bool,
}

impl CreateOrderForm {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn title(&self) -> &'static str {
		"Create Order"
	}

	pub fn open(&mut self) {
		self.opened = true;
	}

	/// Closes the form. Typed values are kept for the next open.
	pub fn close(&mut self) {
		self.opened = false;
	}

	pub fn is_open(&self) -> bool {
		self.opened
	}

	pub fn fields(&self) -> &OrderFields {
		&self.fields
	}

	pub fn set_first_name(&mut self, value: impl Into<String>) {
		self.fields.first_name = value.into();
	}

	pub fn set_last_name(&mut self, value: impl Into<String>) {
		self.fields.last_name = value.into();
	}

	pub fn set_dob(&mut self, value: impl Into<String>) {
		self.fields.dob = value.into();
	}

	/// Message currently shown on the date-of-birth field.
	pub fn dob_error(&self) -> Option<&str> {
		self.dob_error.as_deref()
	}

	/// Trims and validates the fields.
	///
	/// On success the error is cleared, the fields are reset to empty, the
	/// form closes, and the trimmed order is returned for the caller to send.
	/// On failure the form stays open with its values and a field error.
	pub fn submit(&mut self) -> Result<NewOrder, FormError> {
		let order = self.fields.validated().inspect_err(|e| {
			self.dob_error = Some(e.to_string());
		})?;

		self.dob_error = None;
		self.fields.clear();
		self.close();
		Ok(order)
	}
}
