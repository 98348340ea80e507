//! Remote order store.
//!
//! Caches the order collection fetched from the backend and exposes the
//! loading and error state of the last fetch. The cached collection is only
//! ever replaced wholesale by a successful fetch; mutations never touch it.
//! Overlapping fetches all run to completion and the last one to resolve
//! wins.

use orders_api::{OrderApiError, OrderApiService};
use orders_types::Order;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct StoreState {
	data: Vec<Order>,
	error: Option<OrderApiError>,
	settled_once: bool,
}

/// Counts a fetch as in flight until dropped, including when the fetch
/// future itself is dropped before completing.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
	fn start(counter: &Arc<AtomicUsize>) -> Self {
		counter.fetch_add(1, Ordering::SeqCst);
		Self(Arc::clone(counter))
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		self.0.fetch_sub(1, Ordering::SeqCst);
	}
}

/// Point-in-time view of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
	/// Last-known collection; empty before the first successful fetch.
	pub data: Vec<Order>,
	/// True until the first fetch has settled.
	pub is_loading: bool,
	/// True while any fetch is in flight.
	pub is_fetching: bool,
	/// Error of the most recently settled fetch, if it failed.
	pub error: Option<OrderApiError>,
}

/// Client-side cache of the orders collection.
///
/// Clones share the same cache.
#[derive(Clone)]
pub struct OrderStore {
	api: OrderApiService,
	state: Arc<RwLock<StoreState>>,
	in_flight: Arc<AtomicUsize>,
}

impl OrderStore {
	pub fn new(api: OrderApiService) -> Self {
		Self {
			api,
			state: Arc::new(RwLock::new(StoreState::default())),
			in_flight: Arc::new(AtomicUsize::new(0)),
		}
	}

	/// Fetches the collection and records the outcome.
	///
	/// On success the cached collection is replaced and any previous error
	/// is cleared. On failure the previous collection is kept and the error
	/// is recorded. No retry is attempted. A fetch dropped before it
	/// resolves records nothing.
	pub async fn refetch(&self) -> Result<(), OrderApiError> {
		let _in_flight = InFlight::start(&self.in_flight);

		let result = self.api.list_orders().await;

		let mut state = self.state.write().await;
		state.settled_once = true;
		match result {
			Ok(orders) => {
				state.data = orders;
				state.error = None;
				Ok(())
			},
			Err(e) => {
				state.error = Some(e.clone());
				Err(e)
			},
		}
	}

	pub async fn snapshot(&self) -> StoreSnapshot {
		let state = self.state.read().await;
		StoreSnapshot {
			data: state.data.clone(),
			is_loading: !state.settled_once,
			is_fetching: self.in_flight.load(Ordering::SeqCst) > 0,
			error: state.error.clone(),
		}
	}

	pub async fn data(&self) -> Vec<Order> {
		self.state.read().await.data.clone()
	}

	pub async fn is_loading(&self) -> bool {
		!self.state.read().await.settled_once
	}

	pub async fn error(&self) -> Option<OrderApiError> {
		self.state.read().await.error.clone()
	}
}
