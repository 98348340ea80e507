//! Order types for the order desk.
//!
//! An order is a patient record tracked by the backend. The server assigns
//! the `id`; the three patient fields are the only mutable part and are
//! replaced wholesale on update.

use serde::{Deserialize, Serialize};

/// Server-assigned order identifier.
pub type OrderId = i64;

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Server-assigned identifier, immutable once created.
	pub id: OrderId,
	/// Patient first name.
	pub patient_first_name: String,
	/// Patient last name.
	pub patient_last_name: String,
	/// Patient date of birth, kept as the `YYYY-MM-DD` string the form produced.
	pub patient_dob: String,
}

impl Order {
	/// Returns the mutable fields of this order as a creation payload.
	pub fn fields(&self) -> NewOrder {
		NewOrder {
			patient_first_name: self.patient_first_name.clone(),
			patient_last_name: self.patient_last_name.clone(),
			patient_dob: self.patient_dob.clone(),
		}
	}

	/// Builds an order from an id and a set of fields.
	pub fn from_fields(id: OrderId, fields: NewOrder) -> Self {
		Self {
			id,
			patient_first_name: fields.patient_first_name,
			patient_last_name: fields.patient_last_name,
			patient_dob: fields.patient_dob,
		}
	}
}

/// Request body for `POST /orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
	pub patient_first_name: String,
	pub patient_last_name: String,
	pub patient_dob: String,
}
