//! In-memory order API implementation.
//!
//! Behaves like the REST service from the front end's point of view: ids are
//! assigned on creation, missing orders answer 404, non-PDF uploads answer
//! 400, and every served action appends an activity log entry. Useful for
//! tests and for running the front end without a backend.

use crate::{OrderApiError, OrderApiFactory, OrderApiInterface, OrderApiRegistry};
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use once_cell::sync::Lazy;
use orders_config::ApiConfig;
use orders_types::{
	ActivityLog, ImplementationRegistry, NewOrder, Order, OrderId, PdfFile,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

const ANONYMOUS_USER: &str = "anonymous_user";

/// ISO-8601 local time with microseconds, without an offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

static DOB_LINE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?i)(DOB|Birth)[^0-9]*([0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{2}/[0-9]{2}/[0-9]{4})")
		.expect("date of birth line pattern is a valid regex")
});

static NAME_LINE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(Patient|Name)[^A-Za-z]*([A-Z][a-z]+)\s([A-Z][a-z]+)")
		.expect("patient name line pattern is a valid regex")
});

static BARE_NAME_LINE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^([A-Z][a-z]+)\s([A-Z][a-z]+)$").expect("bare name line pattern is a valid regex")
});

static EXCLUDED_LINE: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"(?i)(Provider|Doctor|Generated|Report|Prescriber)")
		.expect("excluded line pattern is a valid regex")
});

#[derive(Default)]
struct MemoryState {
	orders: BTreeMap<OrderId, Order>,
	logs: Vec<ActivityLog>,
	next_order_id: OrderId,
}

impl MemoryState {
	fn log(&mut self, action: impl Into<String>) {
		let timestamp = Local::now()
			.naive_local()
			.format(TIMESTAMP_FORMAT)
			.to_string();
		let id = self.logs.len() as i64 + 1;
		self.logs.push(ActivityLog {
			id,
			user_id: ANONYMOUS_USER.to_string(),
			action: action.into(),
			timestamp,
		});
	}

	fn insert(&mut self, fields: NewOrder) -> Order {
		self.next_order_id += 1;
		let order = Order::from_fields(self.next_order_id, fields);
		self.orders.insert(order.id, order.clone());
		order
	}
}

fn not_found() -> OrderApiError {
	OrderApiError::Status {
		status: 404,
		message: "Order not found".to_string(),
	}
}

fn bad_request(message: &str) -> OrderApiError {
	OrderApiError::Status {
		status: 400,
		message: message.to_string(),
	}
}

/// Number of leading lines searched for an unlabelled patient name.
const BARE_NAME_SEARCH_LINES: usize = 10;

/// Parses `YYYY-MM-DD` or `MM/DD/YYYY` into a calendar date.
///
/// Returns `None` for strings of the right shape that are not real dates.
fn parse_dob(value: &str) -> Option<NaiveDate> {
	let format = if value.contains('-') { "%Y-%m-%d" } else { "%m/%d/%Y" };
	NaiveDate::parse_from_str(value, format).ok()
}

/// Pulls a patient name and date of birth out of a document's text.
///
/// Only lines mentioning the patient, a name, or a birth date are
/// considered. A birth date that is not a real calendar date is skipped in
/// favour of the next candidate. Lines naming a provider are skipped for the
/// name; when no labelled name is found, a bare `First Last` line near the
/// top of the document is used.
fn extract_patient(text: &str) -> Option<NewOrder> {
	let candidates: Vec<&str> = text
		.lines()
		.filter(|line| {
			let lower = line.to_lowercase();
			["patient", "name", "dob", "birth"]
				.iter()
				.any(|keyword| lower.contains(keyword))
		})
		.collect();

	let dob = candidates
		.iter()
		.filter_map(|line| DOB_LINE.captures(line))
		.filter_map(|cap| cap.get(2).and_then(|m| parse_dob(m.as_str())))
		.next()?;

	let (first, last) = candidates
		.iter()
		.filter(|line| !EXCLUDED_LINE.is_match(line))
		.find_map(|line| NAME_LINE.captures(line))
		.and_then(|cap| Some((cap.get(2)?.as_str(), cap.get(3)?.as_str())))
		.or_else(|| {
			text.lines()
				.take(BARE_NAME_SEARCH_LINES)
				.find_map(|line| BARE_NAME_LINE.captures(line.trim()))
				.and_then(|cap| Some((cap.get(1)?.as_str(), cap.get(2)?.as_str())))
		})?;

	Some(NewOrder {
		patient_first_name: first.to_string(),
		patient_last_name: last.to_string(),
		patient_dob: dob.format("%Y-%m-%d").to_string(),
	})
}

/// In-memory order API.
///
/// Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryOrderApi {
	state: Arc<RwLock<MemoryState>>,
}

impl MemoryOrderApi {
	/// Creates an empty in-memory backend.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a backend pre-populated with `orders`, assigning ids in order.
	pub fn with_orders(orders: impl IntoIterator<Item = NewOrder>) -> Self {
		let mut state = MemoryState::default();
		for fields in orders {
			state.insert(fields);
		}
		Self {
			state: Arc::new(RwLock::new(state)),
		}
	}

	/// Number of orders currently held.
	pub async fn len(&self) -> usize {
		self.state.read().await.orders.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.len().await == 0
	}
}

#[async_trait]
impl OrderApiInterface for MemoryOrderApi {
	async fn list_orders(&self) -> Result<Vec<Order>, OrderApiError> {
		let mut state = self.state.write().await;
		state.log("Read all orders");
		Ok(state.orders.values().cloned().collect())
	}

	async fn get_order(&self, id: OrderId) -> Result<Order, OrderApiError> {
		let mut state = self.state.write().await;
		let order = state.orders.get(&id).cloned().ok_or_else(not_found)?;
		state.log(format!("Read order with ID: {}", id));
		Ok(order)
	}

	async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, OrderApiError> {
		let mut state = self.state.write().await;
		let created = state.insert(order.clone());
		state.log(format!(
			"Created order for patient: {} {}",
			order.patient_first_name, order.patient_last_name
		));
		Ok(Some(created))
	}

	async fn update_order(&self, order: &Order) -> Result<(), OrderApiError> {
		let mut state = self.state.write().await;
		let existing = state.orders.get_mut(&order.id).ok_or_else(not_found)?;
		*existing = order.clone();
		state.log(format!("Updated order with ID: {}", order.id));
		Ok(())
	}

	async fn delete_order(&self, id: OrderId) -> Result<(), OrderApiError> {
		let mut state = self.state.write().await;
		state.orders.remove(&id).ok_or_else(not_found)?;
		state.log(format!("Deleted order with ID: {}", id));
		Ok(())
	}

	async fn upload_pdf(&self, file: &PdfFile) -> Result<Option<Order>, OrderApiError> {
		if !file.is_pdf() {
			return Err(bad_request(
				"Invalid file type. Only PDF files are supported.",
			));
		}

		let text = String::from_utf8_lossy(&file.bytes);
		let fields = extract_patient(&text).ok_or_else(|| {
			bad_request("Could not robustly extract patient name and date of birth from the PDF.")
		})?;

		let mut state = self.state.write().await;
		let created = state.insert(fields);
		state.log(format!(
			"Uploaded and created order from PDF for patient: {} {}",
			created.patient_first_name, created.patient_last_name
		));
		Ok(Some(created))
	}

	async fn list_activity(&self) -> Result<Vec<ActivityLog>, OrderApiError> {
		let state = self.state.read().await;
		Ok(state.logs.clone())
	}
}

/// Factory function to create an in-memory order API from configuration.
///
/// Configuration parameters:
/// - None required for the memory implementation
pub fn create_order_api(_config: &ApiConfig) -> Result<Box<dyn OrderApiInterface>, OrderApiError> {
	Ok(Box::new(MemoryOrderApi::new()))
}

/// Registry for the in-memory order API implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = OrderApiFactory;

	fn factory() -> Self::Factory {
		create_order_api
	}
}

impl OrderApiRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn fields(first: &str, last: &str, dob: &str) -> NewOrder {
		NewOrder {
			patient_first_name: first.to_string(),
			patient_last_name: last.to_string(),
			patient_dob: dob.to_string(),
		}
	}

	#[tokio::test]
	async fn test_basic_operations() {
		let api = MemoryOrderApi::new();

		let created = api
			.create_order(&fields("Jane", "Doe", "1990-05-01"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(created.id, 1);

		let fetched = api.get_order(1).await.unwrap();
		assert_eq!(fetched, created);

		let mut updated = fetched.clone();
		updated.patient_last_name = "Roe".to_string();
		api.update_order(&updated).await.unwrap();
		assert_eq!(api.list_orders().await.unwrap(), vec![updated]);

		api.delete_order(1).await.unwrap();
		assert!(api.is_empty().await);

		let result = api.get_order(1).await;
		assert!(matches!(result, Err(ref e) if e.is_not_found()));
	}

	#[tokio::test]
	async fn test_ids_are_not_reused() {
		let api = MemoryOrderApi::with_orders(vec![
			fields("A", "A", "2000-01-01"),
			fields("B", "B", "2000-01-02"),
		]);
		api.delete_order(2).await.unwrap();

		let created = api
			.create_order(&fields("C", "C", "2000-01-03"))
			.await
			.unwrap()
			.unwrap();
		assert_eq!(created.id, 3);
	}

	#[tokio::test]
	async fn test_missing_order_operations() {
		let api = MemoryOrderApi::new();
		let ghost = Order::from_fields(7, fields("G", "G", "2000-01-01"));

		assert!(api.update_order(&ghost).await.unwrap_err().is_not_found());
		assert!(api.delete_order(7).await.unwrap_err().is_not_found());
	}

	#[tokio::test]
	async fn test_upload_rejects_non_pdf() {
		let api = MemoryOrderApi::new();
		let file = PdfFile::new("photo.png", "image/png", b"Patient: Jane Doe".to_vec());

		let err = api.upload_pdf(&file).await.unwrap_err();
		assert_eq!(err.status(), Some(400));
		assert!(api.is_empty().await);
	}

	#[tokio::test]
	async fn test_upload_extracts_patient() {
		let api = MemoryOrderApi::new();
		let text = "Clinic Intake\nProvider Name: Gregory House\nPatient Name: Jane Doe\nDOB: 05/01/1990\n";
		let file = PdfFile::pdf("intake.pdf", text.as_bytes().to_vec());

		let created = api.upload_pdf(&file).await.unwrap().unwrap();
		assert_eq!(created.patient_first_name, "Jane");
		assert_eq!(created.patient_last_name, "Doe");
		assert_eq!(created.patient_dob, "1990-05-01");
	}

	#[tokio::test]
	async fn test_upload_without_patient_data() {
		let api = MemoryOrderApi::new();
		let file = PdfFile::pdf("blank.pdf", b"%PDF-1.4 nothing here".to_vec());

		let err = api.upload_pdf(&file).await.unwrap_err();
		assert!(err.detail().unwrap().contains("Could not robustly extract"));
	}

	#[tokio::test]
	async fn test_activity_log_records_actions() {
		let api = MemoryOrderApi::new();
		api.create_order(&fields("Jane", "Doe", "1990-05-01"))
			.await
			.unwrap();
		api.list_orders().await.unwrap();
		api.delete_order(1).await.unwrap();

		let actions: Vec<String> = api
			.list_activity()
			.await
			.unwrap()
			.into_iter()
			.map(|log| log.action)
			.collect();
		assert_eq!(
			actions,
			vec![
				"Created order for patient: Jane Doe",
				"Read all orders",
				"Deleted order with ID: 1",
			]
		);
	}

	#[test]
	fn test_parse_dob() {
		assert_eq!(parse_dob("05/01/1990"), NaiveDate::from_ymd_opt(1990, 5, 1));
		assert_eq!(parse_dob("1990-05-01"), NaiveDate::from_ymd_opt(1990, 5, 1));
		assert_eq!(parse_dob("1990-02-30"), None);
		assert_eq!(parse_dob("13/01/1990"), None);
	}

	#[test]
	fn test_extract_skips_impossible_birth_date() {
		let text = "Patient Name: Jane Doe\nDOB: 1990-02-30\nDate of Birth: 02/28/1990\n";

		let fields = extract_patient(text).unwrap();
		assert_eq!(fields.patient_dob, "1990-02-28");
	}

	#[test]
	fn test_extract_falls_back_to_bare_name_line() {
		let text = "INTAKE FORM\n  Jane Doe  \nDOB: 1990-05-01\n";

		let fields = extract_patient(text).unwrap();
		assert_eq!(fields.patient_first_name, "Jane");
		assert_eq!(fields.patient_last_name, "Doe");
	}

	#[test]
	fn test_bare_name_only_searched_near_top() {
		let mut text = "DOB: 1990-05-01\n".to_string();
		for i in 0..10 {
			text.push_str(&format!("filler line {}\n", i));
		}
		text.push_str("Jane Doe\n");

		assert!(extract_patient(&text).is_none());
	}

	#[tokio::test]
	async fn test_activity_timestamp_is_iso_8601() {
		let api = MemoryOrderApi::new();
		api.list_orders().await.unwrap();

		let logs = api.list_activity().await.unwrap();
		let parsed =
			chrono::NaiveDateTime::parse_from_str(&logs[0].timestamp, "%Y-%m-%dT%H:%M:%S%.f");
		assert!(parsed.is_ok(), "unexpected timestamp {}", logs[0].timestamp);
	}
}
