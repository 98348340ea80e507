//! Edit-order form.

use super::{FormError, OrderFields};
use orders_types::Order;

/// Form editing an existing order.
///
/// Renders nothing when no order is set. Supplying an order always
/// resynchronises the fields to it, even while the form is open, so edits
/// made against a previous selection are never shown.
#[derive(Debug, Clone, Default)]
pub struct EditOrderForm {
	order: Option<Order>,
	fields: OrderFields,
	dob_error: Option<String>,
	opened: bool,
}

impl EditOrderForm {
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the order being edited and opens the form.
	pub fn open(&mut self, order: Order) {
		self.set_order(Some(order));
		self.opened = true;
	}

	pub fn close(&mut self) {
		self.opened = false;
	}

	/// Supplies a new order (or none) and resets the fields from it.
	pub fn set_order(&mut self, order: Option<Order>) {
		self.fields = order.as_ref().map(OrderFields::from_order).unwrap_or_default();
		self.dob_error = None;
		self.order = order;
	}

	pub fn order(&self) -> Option<&Order> {
		self.order.as_ref()
	}

	/// True when the form is open and has an order to show.
	pub fn is_visible(&self) -> bool {
		self.opened && self.order.is_some()
	}

	/// `Edit Order #<id>`, or `None` when there is no order.
	pub fn title(&self) -> Option<String> {
		self.order
			.as_ref()
			.map(|order| format!("Edit Order #{}", order.id))
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

	pub fn dob_error(&self) -> Option<&str> {
		self.dob_error.as_deref()
	}

	/// Trims and validates the fields and returns the full order to save.
	///
	/// The id always comes from the order being edited. On success the form
	/// closes; on failure it stays open with a field error.
	pub fn submit(&mut self) -> Result<Order, FormError> {
		let id = self.order.as_ref().ok_or(FormError::NoOrder)?.id;
		let fields = self.fields.validated().inspect_err(|e| {
			self.dob_error = Some(e.to_string());
		})?;

		self.dob_error = None;
		self.close();
		Ok(Order::from_fields(id, fields))
	}
}
