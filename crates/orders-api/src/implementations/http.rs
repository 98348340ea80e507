//! HTTP implementation of the order API.
//!
//! Talks to the orders REST service with a shared reqwest client. Bodies are
//! JSON except for the PDF upload, which is sent as a multipart form with a
//! single `file` part.

use crate::{OrderApiError, OrderApiFactory, OrderApiInterface, OrderApiRegistry};
use async_trait::async_trait;
use orders_config::ApiConfig;
use orders_types::{ActivityLog, ImplementationRegistry, NewOrder, Order, OrderId, PdfFile};
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// Order API backed by the REST service.
pub struct HttpOrderApi {
	client: Client,
	base_url: String,
}

impl HttpOrderApi {
	/// Creates a client for the service at `base_url`.
	///
	/// Requests have no timeout unless `timeout` is given.
	pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, OrderApiError> {
		let mut builder = Client::builder()
			.pool_idle_timeout(Duration::from_secs(90))
			.pool_max_idle_per_host(10);
		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}
		let client = builder
			.build()
			.map_err(|e| OrderApiError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

		let base_url = base_url.into().trim_end_matches('/').to_string();
		Ok(Self { client, base_url })
	}

	fn url(&self, path: &str) -> String {
		format!("{}{}", self.base_url, path)
	}

	async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, OrderApiError> {
		let response = request
			.send()
			.await
			.map_err(|e| OrderApiError::Network(e.to_string()))?;
		ensure_success(response).await
	}

	async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, OrderApiError> {
		let bytes = response
			.bytes()
			.await
			.map_err(|e| OrderApiError::Network(e.to_string()))?;
		serde_json::from_slice(&bytes).map_err(|e| OrderApiError::Serialization(e.to_string()))
	}

	/// Reads an optional echoed order. Empty or unexpected bodies yield `None`.
	async fn read_optional_order(response: Response) -> Result<Option<Order>, OrderApiError> {
		let bytes = response
			.bytes()
			.await
			.map_err(|e| OrderApiError::Network(e.to_string()))?;
		if bytes.is_empty() {
			return Ok(None);
		}
		match serde_json::from_slice::<Order>(&bytes) {
			Ok(order) => Ok(Some(order)),
			Err(e) => {
				tracing::debug!("Response body is not an order: {}", e);
				Ok(None)
			},
		}
	}
}

/// Turns a non-2xx response into [`OrderApiError::Status`].
async fn ensure_success(response: Response) -> Result<Response, OrderApiError> {
	let status = response.status();
	if status.is_success() {
		return Ok(response);
	}

	let body = response.text().await.unwrap_or_default();
	let message = extract_detail(&body).unwrap_or_else(|| {
		status
			.canonical_reason()
			.map(str::to_string)
			.unwrap_or_else(|| body.trim().to_string())
	});

	Err(OrderApiError::Status {
		status: status.as_u16(),
		message,
	})
}

/// Pulls a human-readable message out of a `{"detail": ...}` error body.
///
/// `detail` may be a string, an object carrying a `message`, or a list of
/// validation entries carrying `msg`.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
	let value: Value = serde_json::from_str(body).ok()?;
	match value.get("detail")? {
		Value::String(message) => Some(message.clone()),
		Value::Object(map) => map
			.get("message")
			.and_then(Value::as_str)
			.map(str::to_string),
		Value::Array(entries) => {
			let messages: Vec<&str> = entries
				.iter()
				.filter_map(|entry| entry.get("msg").and_then(Value::as_str))
				.collect();
			if messages.is_empty() {
				None
			} else {
				Some(messages.join("; "))
			}
		},
		_ => None,
	}
}

#[async_trait]
impl OrderApiInterface for HttpOrderApi {
	async fn list_orders(&self) -> Result<Vec<Order>, OrderApiError> {
		let response = self.send(self.client.get(self.url("/orders"))).await?;
		Self::read_json(response).await
	}

	async fn get_order(&self, id: OrderId) -> Result<Order, OrderApiError> {
		let response = self
			.send(self.client.get(self.url(&format!("/orders/{}", id))))
			.await?;
		Self::read_json(response).await
	}

	async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, OrderApiError> {
		let response = self
			.send(self.client.post(self.url("/orders/")).json(order))
			.await?;
		Self::read_optional_order(response).await
	}

	async fn update_order(&self, order: &Order) -> Result<(), OrderApiError> {
		self.send(
			self.client
				.put(self.url(&format!("/orders/{}", order.id)))
				.json(order),
		)
		.await?;
		Ok(())
	}

	async fn delete_order(&self, id: OrderId) -> Result<(), OrderApiError> {
		self.send(self.client.delete(self.url(&format!("/orders/{}", id))))
			.await?;
		Ok(())
	}

	async fn upload_pdf(&self, file: &PdfFile) -> Result<Option<Order>, OrderApiError> {
		let part = multipart::Part::bytes(file.bytes.clone())
			.file_name(file.file_name.clone())
			.mime_str(&file.content_type)
			.map_err(|e| OrderApiError::Serialization(format!("Invalid content type: {}", e)))?;
		let form = multipart::Form::new().part("file", part);

		let response = self
			.send(
				self.client
					.post(self.url("/orders/upload_pdf"))
					.multipart(form),
			)
			.await?;
		Self::read_optional_order(response).await
	}

	async fn list_activity(&self) -> Result<Vec<ActivityLog>, OrderApiError> {
		let response = self.send(self.client.get(self.url("/logs/"))).await?;
		Self::read_json(response).await
	}
}

/// Factory function to create an HTTP order API from configuration.
///
/// Configuration parameters:
/// - `base_url`: service root, e.g. `http://localhost:8000`
/// - `timeout_seconds` (optional): per-request timeout
pub fn create_order_api(config: &ApiConfig) -> Result<Box<dyn OrderApiInterface>, OrderApiError> {
	let timeout = config.timeout_seconds.map(Duration::from_secs);
	Ok(Box::new(HttpOrderApi::new(config.base_url.clone(), timeout)?))
}

/// Registry for the HTTP order API implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = OrderApiFactory;

	fn factory() -> Self::Factory {
		create_order_api
	}
}

impl OrderApiRegistry for Registry {}
