//! Order API module for the order desk.
//!
//! This module provides the narrow interface through which every backend
//! call is made: read the collection, read one order, create, update,
//! delete, upload a PDF and read the activity log. Implementations are
//! selected by name from configuration, so the workflow layer can run
//! against the real REST service or an in-memory stand-in.

use async_trait::async_trait;
use orders_config::{ApiConfig, Config};
use orders_types::{ActivityLog, ImplementationRegistry, NewOrder, Order, OrderId, PdfFile};
use std::sync::Arc;
use thiserror::Error;
use tracing::instrument;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur during order API operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderApiError {
	/// The request did not reach the server or no response was read.
	#[error("Network error: {0}")]
	Network(String),
	/// The server answered with a non-2xx status.
	#[error("Request failed with status {status}: {message}")]
	Status { status: u16, message: String },
	/// A response body could not be decoded.
	#[error("Serialization error: {0}")]
	Serialization(String),
	/// The implementation could not be built from configuration.
	#[error("Configuration error: {0}")]
	Configuration(String),
}

impl OrderApiError {
	/// Returns the HTTP status carried by this error, if any.
	pub fn status(&self) -> Option<u16> {
		match self {
			OrderApiError::Status { status, .. } => Some(*status),
			_ => None,
		}
	}

	/// Returns true when the server reported the resource as missing.
	pub fn is_not_found(&self) -> bool {
		self.status() == Some(404)
	}

	/// Returns the server-provided detail for status errors.
	pub fn detail(&self) -> Option<&str> {
		match self {
			OrderApiError::Status { message, .. } if !message.is_empty() => Some(message),
			_ => None,
		}
	}
}

/// Trait defining the interface to the orders backend.
///
/// Every network call made by the front end goes through this trait.
/// Implementations report any non-2xx answer as [`OrderApiError::Status`]
/// and never retry.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait OrderApiInterface: Send + Sync {
	/// `GET /orders`: returns the whole collection.
	async fn list_orders(&self) -> Result<Vec<Order>, OrderApiError>;

	/// `GET /orders/{id}`: returns a single order.
	async fn get_order(&self, id: OrderId) -> Result<Order, OrderApiError>;

	/// `POST /orders/`: creates an order.
	///
	/// Returns the created order when the server echoes it back.
	async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, OrderApiError>;

	/// `PUT /orders/{id}`: replaces the mutable fields of an order.
	async fn update_order(&self, order: &Order) -> Result<(), OrderApiError>;

	/// `DELETE /orders/{id}`: removes an order.
	async fn delete_order(&self, id: OrderId) -> Result<(), OrderApiError>;

	/// `POST /orders/upload_pdf`: sends a PDF for server-side extraction.
	///
	/// Returns the order created from the document when the server echoes it.
	async fn upload_pdf(&self, file: &PdfFile) -> Result<Option<Order>, OrderApiError>;

	/// `GET /logs/`: returns the backend activity log.
	async fn list_activity(&self) -> Result<Vec<ActivityLog>, OrderApiError>;
}

/// Type alias for order API factory functions.
pub type OrderApiFactory = fn(&ApiConfig) -> Result<Box<dyn OrderApiInterface>, OrderApiError>;

/// Registry trait for order API implementations.
pub trait OrderApiRegistry: ImplementationRegistry<Factory = OrderApiFactory> {}

/// Get all registered order API implementations.
///
/// Returns a vector of (name, factory) tuples for all available implementations.
pub fn get_all_implementations() -> Vec<(&'static str, OrderApiFactory)> {
	use implementations::{http, memory};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// High-level order API service.
///
/// Wraps an implementation of [`OrderApiInterface`] and adds tracing around
/// each call. Cloning is cheap; clones share the implementation.
#[derive(Clone)]
pub struct OrderApiService {
	backend: Arc<dyn OrderApiInterface>,
}

impl OrderApiService {
	/// Creates a new OrderApiService with the specified backend.
	pub fn new(backend: Arc<dyn OrderApiInterface>) -> Self {
		Self { backend }
	}

	/// Builds the service selected by `api.implementation` in `config`.
	pub fn from_config(config: &Config) -> Result<Self, OrderApiError> {
		let name = config.api.implementation.as_str();
		let factory = get_all_implementations()
			.into_iter()
			.find(|(registered, _)| *registered == name)
			.map(|(_, factory)| factory)
			.ok_or_else(|| {
				OrderApiError::Configuration(format!("Unknown API implementation '{}'", name))
			})?;

		let backend = factory(&config.api)?;
		tracing::info!(implementation = name, base_url = %config.api.base_url, "Order API ready");
		Ok(Self::new(Arc::from(backend)))
	}

	#[instrument(skip(self))]
	pub async fn list_orders(&self) -> Result<Vec<Order>, OrderApiError> {
		let orders = self.backend.list_orders().await.inspect_err(|e| {
			tracing::warn!("Fetching orders failed: {}", e);
		})?;
		tracing::debug!(count = orders.len(), "Fetched orders");
		Ok(orders)
	}

	#[instrument(skip(self))]
	pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderApiError> {
		self.backend.get_order(id).await.inspect_err(|e| {
			tracing::warn!("Fetching order {} failed: {}", id, e);
		})
	}

	#[instrument(skip_all)]
	pub async fn create_order(&self, order: &NewOrder) -> Result<Option<Order>, OrderApiError> {
		let created = self.backend.create_order(order).await.inspect_err(|e| {
			tracing::warn!("Creating order failed: {}", e);
		})?;
		match &created {
			Some(order) => tracing::info!(order_id = order.id, "Created order"),
			None => tracing::info!("Created order"),
		}
		Ok(created)
	}

	#[instrument(skip_all, fields(order_id = order.id))]
	pub async fn update_order(&self, order: &Order) -> Result<(), OrderApiError> {
		self.backend.update_order(order).await.inspect_err(|e| {
			tracing::warn!("Updating order failed: {}", e);
		})?;
		tracing::info!("Updated order");
		Ok(())
	}

	#[instrument(skip(self))]
	pub async fn delete_order(&self, id: OrderId) -> Result<(), OrderApiError> {
		self.backend.delete_order(id).await.inspect_err(|e| {
			tracing::warn!("Deleting order failed: {}", e);
		})?;
		tracing::info!("Deleted order");
		Ok(())
	}

	#[instrument(skip_all, fields(file = %file.file_name, bytes = file.len()))]
	pub async fn upload_pdf(&self, file: &PdfFile) -> Result<Option<Order>, OrderApiError> {
		let created = self.backend.upload_pdf(file).await.inspect_err(|e| {
			tracing::warn!("Uploading PDF failed: {}", e);
		})?;
		tracing::info!("Uploaded PDF");
		Ok(created)
	}

	#[instrument(skip(self))]
	pub async fn list_activity(&self) -> Result<Vec<ActivityLog>, OrderApiError> {
		self.backend.list_activity().await.inspect_err(|e| {
			tracing::warn!("Fetching activity log failed: {}", e);
		})
	}
}
