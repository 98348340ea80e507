//! Order list view.
//!
//! Composes the remote order store, the two forms and the upload control,
//! and turns user actions into API calls. Every mutation follows the same
//! path: `idle -> in-flight -> success (refetch) | failure (notify) -> idle`.
//! There is no coordination between mutations and no optimistic update of
//! the cached collection.
//!
//! All actions take `&self`. Form and upload state sit behind short-lived
//! locks that are never held across a request, so a view can be shared and
//! its in-flight state observed while requests run.

use crate::forms::{CreateOrderForm, EditOrderForm, FormError};
use crate::notify::{Confirmer, Notification, Notifier};
use crate::render::{render_orders, ListState};
use crate::store::{OrderStore, StoreSnapshot};
use crate::upload::{UploadControl, UploadError};
use orders_api::{OrderApiError, OrderApiService};
use orders_config::UiConfig;
use orders_types::{format_order_details, ActivityLog, Order, OrderId, PdfFile};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::instrument;

pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this order?";

/// How a user action ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
	/// The request succeeded and the collection was refetched.
	Succeeded,
	/// The request failed; the user was notified.
	Failed(OrderApiError),
	/// Local validation blocked the action; no request was made.
	Rejected(FormError),
	/// The upload control refused to submit; no request was made.
	NotSubmitted(UploadError),
	/// The user declined the confirmation; no request was made.
	Declined,
}

impl MutationOutcome {
	pub fn is_success(&self) -> bool {
		matches!(self, MutationOutcome::Succeeded)
	}
}

/// Appends the server detail to `prefix` when the error carries one.
fn failure_message(prefix: &str, error: &OrderApiError) -> String {
	match error.detail() {
		Some(detail) => format!("{}: {}", prefix, detail),
		None => prefix.to_string(),
	}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
	mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The order list screen.
pub struct OrderListView {
	api: OrderApiService,
	store: OrderStore,
	notifier: Arc<dyn Notifier>,
	confirmer: Arc<dyn Confirmer>,
	create_form: Mutex<CreateOrderForm>,
	edit_form: Mutex<EditOrderForm>,
	upload: Mutex<UploadControl>,
	confirm_deletes: bool,
}

impl OrderListView {
	pub fn new(
		api: OrderApiService,
		notifier: Arc<dyn Notifier>,
		confirmer: Arc<dyn Confirmer>,
	) -> Self {
		Self {
			store: OrderStore::new(api.clone()),
			api,
			notifier,
			confirmer,
			create_form: Mutex::new(CreateOrderForm::new()),
			edit_form: Mutex::new(EditOrderForm::new()),
			upload: Mutex::new(UploadControl::new()),
			confirm_deletes: true,
		}
	}

	/// Builds a view honouring the `[ui]` configuration section.
	pub fn with_config(
		api: OrderApiService,
		ui: &UiConfig,
		notifier: Arc<dyn Notifier>,
		confirmer: Arc<dyn Confirmer>,
	) -> Self {
		let mut view = Self::new(api, notifier, confirmer);
		view.confirm_deletes = ui.confirm_deletes;
		view
	}

	pub fn api(&self) -> &OrderApiService {
		&self.api
	}

	pub fn store(&self) -> &OrderStore {
		&self.store
	}

	/// Loads the collection, as done when the view is first shown.
	///
	/// A failure only shows up in the list state; no notification is sent.
	pub async fn load(&self) {
		if let Err(e) = self.store.refetch().await {
			tracing::debug!("Order list failed to load: {}", e);
		}
	}

	pub async fn snapshot(&self) -> StoreSnapshot {
		self.store.snapshot().await
	}

	pub async fn list_state(&self) -> ListState {
		ListState::from(&self.store.snapshot().await)
	}

	/// Renders the list area as text.
	pub async fn render(&self) -> String {
		render_orders(&self.list_state().await)
	}

	/// Finds a row in the cached collection.
	pub async fn row(&self, id: OrderId) -> Option<Order> {
		self.store.data().await.into_iter().find(|order| order.id == id)
	}

	/// Refetches after a successful mutation. A failed refetch is left to
	/// the list state.
	async fn refresh(&self) {
		self.load().await;
	}

	/// Row action: fetch one order and show its details.
	#[instrument(skip(self))]
	pub async fn view_order(&self, id: OrderId) -> Result<Order, OrderApiError> {
		match self.api.get_order(id).await {
			Ok(order) => {
				self.notifier
					.notify(Notification::info(format_order_details(&order)));
				Ok(order)
			},
			Err(e) => {
				self.notifier
					.notify(Notification::error(failure_message("Failed to load order", &e)));
				Err(e)
			},
		}
	}

	// Create

	pub fn open_create(&self) {
		self.create_form().open();
	}

	pub fn close_create(&self) {
		self.create_form().close();
	}

	/// Locks the create form. Release the guard before submitting.
	pub fn create_form(&self) -> MutexGuard<'_, CreateOrderForm> {
		lock(&self.create_form)
	}

	/// Submits the create form and, if it validates, POSTs the new order.
	#[instrument(skip(self))]
	pub async fn submit_create(&self) -> MutationOutcome {
		let submitted = self.create_form().submit();
		let order = match submitted {
			Ok(order) => order,
			Err(e) => return MutationOutcome::Rejected(e),
		};

		match self.api.create_order(&order).await {
			Ok(_) => {
				self.refresh().await;
				MutationOutcome::Succeeded
			},
			Err(e) => {
				self.notifier
					.notify(Notification::error(failure_message("Failed to create order", &e)));
				MutationOutcome::Failed(e)
			},
		}
	}

	// Edit

	/// Row action: open the edit form pre-filled with `order`.
	pub fn open_edit(&self, order: Order) {
		self.edit_form().open(order);
	}

	pub fn close_edit(&self) {
		self.edit_form().close();
	}

	/// Locks the edit form. Release the guard before submitting.
	pub fn edit_form(&self) -> MutexGuard<'_, EditOrderForm> {
		lock(&self.edit_form)
	}

	/// Submits the edit form and, if it validates, PUTs the full order.
	#[instrument(skip(self))]
	pub async fn submit_edit(&self) -> MutationOutcome {
		let submitted = self.edit_form().submit();
		let order = match submitted {
			Ok(order) => order,
			Err(e) => return MutationOutcome::Rejected(e),
		};

		match self.api.update_order(&order).await {
			Ok(()) => {
				self.refresh().await;
				MutationOutcome::Succeeded
			},
			Err(e) => {
				self.notifier
					.notify(Notification::error(failure_message("Failed to save order", &e)));
				MutationOutcome::Failed(e)
			},
		}
	}

	// Delete

	/// Row action: delete an order after explicit confirmation.
	#[instrument(skip(self))]
	pub async fn delete_order(&self, id: OrderId) -> MutationOutcome {
		if self.confirm_deletes && !self.confirmer.confirm(DELETE_CONFIRMATION).await {
			tracing::debug!("Delete declined");
			return MutationOutcome::Declined;
		}

		match self.api.delete_order(id).await {
			Ok(()) => {
				self.notifier.notify(Notification::info("Order deleted!"));
				self.refresh().await;
				MutationOutcome::Succeeded
			},
			Err(e) => {
				self.notifier
					.notify(Notification::error(failure_message("Failed to delete order", &e)));
				MutationOutcome::Failed(e)
			},
		}
	}

	// Upload

	/// Locks the upload control, e.g. to read `is_uploading` mid-request.
	pub fn upload(&self) -> MutexGuard<'_, UploadControl> {
		lock(&self.upload)
	}

	/// Picks a file for upload, or clears the selection with `None`.
	pub fn select_file(&self, file: Option<PdfFile>) -> Result<(), UploadError> {
		self.upload().select(file)
	}

	/// Sends the selected PDF. The control reports `uploading` while the
	/// request runs, and the selection is cleared once it settles, whatever
	/// the outcome.
	#[instrument(skip(self))]
	pub async fn submit_upload(&self) -> MutationOutcome {
		let begun = self.upload().begin();
		let file = match begun {
			Ok(file) => file,
			Err(e) => return MutationOutcome::NotSubmitted(e),
		};

		let result = self.api.upload_pdf(&file).await;
		self.upload().finish();

		match result {
			Ok(_) => {
				self.notifier
					.notify(Notification::info("PDF uploaded and processed!"));
				self.refresh().await;
				MutationOutcome::Succeeded
			},
			Err(e) => {
				self.notifier
					.notify(Notification::error(failure_message("Failed to upload PDF", &e)));
				MutationOutcome::Failed(e)
			},
		}
	}

	// Activity

	/// Fetches the backend activity log.
	pub async fn activity(&self) -> Result<Vec<ActivityLog>, OrderApiError> {
		self.api.list_activity().await.inspect_err(|e| {
			self.notifier
				.notify(Notification::error(failure_message("Failed to load activity log", e)));
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::notify::{CollectingNotifier, MockConfirmer, StaticConfirmer};
	use orders_api::implementations::memory::MemoryOrderApi;
	use orders_api::{MockOrderApiInterface, OrderApiInterface};
	use async_trait::async_trait;
	use orders_types::{NewOrder, ValidationError, DOB_FORMAT_MESSAGE};
	use std::time::Duration;
	use tokio::sync::oneshot;

	fn new_order(first: &str, last: &str, dob: &str) -> NewOrder {
		NewOrder {
			patient_first_name: first.to_string(),
			patient_last_name: last.to_string(),
			patient_dob: dob.to_string(),
		}
	}

	fn server_error() -> OrderApiError {
		OrderApiError::Status {
			status: 500,
			message: "Internal Server Error".to_string(),
		}
	}

	struct Harness {
		view: OrderListView,
		backend: MemoryOrderApi,
		notifier: Arc<CollectingNotifier>,
	}

	fn harness(orders: Vec<NewOrder>, confirm: bool) -> Harness {
		let backend = MemoryOrderApi::with_orders(orders);
		let notifier = Arc::new(CollectingNotifier::new());
		let view = OrderListView::new(
			OrderApiService::new(Arc::new(backend.clone())),
			notifier.clone(),
			Arc::new(StaticConfirmer::new(confirm)),
		);
		Harness {
			view,
			backend,
			notifier,
		}
	}

	fn mock_view(
		mock: MockOrderApiInterface,
		confirmer: Arc<dyn Confirmer>,
	) -> (OrderListView, Arc<CollectingNotifier>) {
		let notifier = Arc::new(CollectingNotifier::new());
		let view = OrderListView::new(
			OrderApiService::new(Arc::new(mock)),
			notifier.clone(),
			confirmer,
		);
		(view, notifier)
	}

	#[tokio::test]
	async fn test_load_renders_table() {
		let h = harness(vec![new_order("Jane", "Doe", "1990-05-01")], true);
		assert_eq!(h.view.list_state().await, ListState::Loading);

		h.view.load().await;
		let out = h.view.render().await;
		assert!(out.contains("Patient Name"));
		assert!(out.contains("Jane Doe"));
	}

	#[tokio::test]
	async fn test_load_failure_shows_banner() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_list_orders().returning(|| Err(server_error()));
		let (view, notifier) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		view.load().await;
		assert_eq!(view.list_state().await, ListState::Error);
		assert_eq!(view.render().await, "Error loading orders.");
		assert!(notifier.messages().is_empty());
	}

	#[tokio::test]
	async fn test_create_posts_trimmed_order_and_refetches() {
		let mut mock = MockOrderApiInterface::new();
		let mut seq = mockall::Sequence::new();
		mock.expect_create_order()
			.withf(|order| *order == new_order("Jane", "Doe", "1990-05-01"))
			.times(1)
			.in_sequence(&mut seq)
			.returning(|order| Ok(Some(Order::from_fields(1, order.clone()))));
		mock.expect_list_orders()
			.times(1)
			.in_sequence(&mut seq)
			.returning(|| Ok(vec![Order::from_fields(1, new_order("Jane", "Doe", "1990-05-01"))]));
		let (view, _) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		view.open_create();
		{
			let mut form = view.create_form();
			form.set_first_name("  Jane ");
			form.set_last_name("Doe ");
			form.set_dob(" 1990-05-01");
		}

		assert!(view.submit_create().await.is_success());
		assert!(!view.create_form().is_open());
		assert_eq!(view.store().data().await.len(), 1);
	}

	#[tokio::test]
	async fn test_create_invalid_dob_makes_no_request() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_create_order().never();
		mock.expect_list_orders().never();
		let (view, _) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		view.open_create();
		view.create_form().set_first_name("Jane");
		view.create_form().set_last_name("Doe");
		view.create_form().set_dob("05/01/1990");

		let outcome = view.submit_create().await;
		assert_eq!(
			outcome,
			MutationOutcome::Rejected(FormError::Validation(ValidationError::DobFormat))
		);
		assert!(view.create_form().is_open());
		assert_eq!(view.create_form().dob_error(), Some(DOB_FORMAT_MESSAGE));
	}

	#[tokio::test]
	async fn test_create_failure_notifies() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_create_order().returning(|_| Err(server_error()));
		mock.expect_list_orders().never();
		let (view, notifier) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		view.create_form().set_dob("1990-05-01");
		let outcome = view.submit_create().await;
		assert!(matches!(outcome, MutationOutcome::Failed(_)));
		assert_eq!(
			notifier.messages(),
			vec!["Failed to create order: Internal Server Error"]
		);
	}

	#[tokio::test]
	async fn test_edit_saves_and_refetches() {
		let h = harness(vec![new_order("Jane", "Doe", "1990-05-01")], true);
		h.view.load().await;

		let row = h.view.row(1).await.unwrap();
		h.view.open_edit(row);
		h.view.edit_form().set_last_name("  Smith ");

		assert!(h.view.submit_edit().await.is_success());
		assert_eq!(h.backend.get_order(1).await.unwrap().patient_last_name, "Smith");
		assert_eq!(h.view.row(1).await.unwrap().patient_last_name, "Smith");
		assert!(!h.view.edit_form().is_visible());
	}

	#[tokio::test]
	async fn test_edit_invalid_dob_makes_no_request() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_update_order().never();
		let (view, _) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		view.open_edit(Order::from_fields(3, new_order("Jane", "Doe", "1990-05-01")));
		view.edit_form().set_dob("1990-05");

		let outcome = view.submit_edit().await;
		assert!(matches!(outcome, MutationOutcome::Rejected(FormError::Validation(_))));
		assert!(view.edit_form().is_visible());
	}

	#[tokio::test]
	async fn test_edit_switching_rows_resyncs_form() {
		let h = harness(
			vec![
				new_order("Jane", "Doe", "1990-05-01"),
				new_order("John", "Roe", "1985-01-02"),
			],
			true,
		);
		h.view.load().await;

		let first = h.view.row(1).await.unwrap();
		let second = h.view.row(2).await.unwrap();
		h.view.open_edit(first);
		h.view.edit_form().set_first_name("Typed");
		h.view.open_edit(second);

		assert_eq!(h.view.edit_form().fields().first_name, "John");
		assert_eq!(h.view.edit_form().title().as_deref(), Some("Edit Order #2"));
	}

	#[tokio::test]
	async fn test_delete_declined_issues_no_request() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_delete_order().never();
		let mut confirmer = MockConfirmer::new();
		confirmer
			.expect_confirm()
			.times(1)
			.returning(|_| false);
		let (view, notifier) = mock_view(mock, Arc::new(confirmer));

		assert_eq!(view.delete_order(1).await, MutationOutcome::Declined);
		assert!(notifier.messages().is_empty());
	}

	#[tokio::test]
	async fn test_delete_confirmed_removes_and_refetches() {
		let h = harness(
			vec![
				new_order("Jane", "Doe", "1990-05-01"),
				new_order("John", "Roe", "1985-01-02"),
			],
			true,
		);
		h.view.load().await;

		assert!(h.view.delete_order(1).await.is_success());
		assert_eq!(h.notifier.messages(), vec!["Order deleted!"]);
		assert!(h.view.row(1).await.is_none());
		assert_eq!(h.view.store().data().await.len(), 1);
	}

	#[tokio::test]
	async fn test_delete_failure_notifies() {
		let h = harness(vec![], true);
		let outcome = h.view.delete_order(42).await;

		assert!(matches!(outcome, MutationOutcome::Failed(ref e) if e.is_not_found()));
		assert_eq!(
			h.notifier.messages(),
			vec!["Failed to delete order: Order not found"]
		);
	}

	#[tokio::test]
	async fn test_delete_without_confirmation_when_disabled() {
		let backend = MemoryOrderApi::with_orders(vec![new_order("Jane", "Doe", "1990-05-01")]);
		let mut confirmer = MockConfirmer::new();
		confirmer.expect_confirm().never();
		let view = OrderListView::with_config(
			OrderApiService::new(Arc::new(backend.clone())),
			&UiConfig {
				confirm_deletes: false,
			},
			Arc::new(CollectingNotifier::new()),
			Arc::new(confirmer),
		);

		assert!(view.delete_order(1).await.is_success());
		assert!(backend.is_empty().await);
	}

	#[tokio::test]
	async fn test_view_order_notifies_details() {
		let h = harness(vec![new_order("Jane", "Doe", "1990-05-01")], true);

		let order = h.view.view_order(1).await.unwrap();
		assert_eq!(order.id, 1);
		assert_eq!(
			h.notifier.messages(),
			vec!["Order details:\nID: 1\nName: Jane Doe\nDOB: 1990-05-01"]
		);
	}

	#[tokio::test]
	async fn test_view_missing_order_notifies_error() {
		let h = harness(vec![], true);

		assert!(h.view.view_order(5).await.is_err());
		let notifications = h.notifier.take();
		assert_eq!(notifications.len(), 1);
		assert!(notifications[0].is_error());
	}

	#[tokio::test]
	async fn test_upload_without_file_is_not_submitted() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_upload_pdf().never();
		let (view, _) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		assert!(!view.upload().can_submit());
		assert_eq!(
			view.submit_upload().await,
			MutationOutcome::NotSubmitted(UploadError::NoFile)
		);
	}

	#[tokio::test]
	async fn test_upload_success_clears_and_refetches() {
		let h = harness(vec![], true);
		h.view.load().await;

		let text = "Patient Name: Jane Doe\nDOB: 1990-05-01\n";
		h.view
			.select_file(Some(PdfFile::pdf("intake.pdf", text.as_bytes().to_vec())))
			.unwrap();
		assert!(h.view.upload().can_submit());

		assert!(h.view.submit_upload().await.is_success());
		assert!(!h.view.upload().can_submit());
		assert!(!h.view.upload().is_uploading());
		assert_eq!(h.notifier.messages(), vec!["PDF uploaded and processed!"]);
		assert_eq!(h.view.store().data().await.len(), 1);
	}

	#[tokio::test]
	async fn test_upload_failure_clears_selection() {
		let mut mock = MockOrderApiInterface::new();
		mock.expect_upload_pdf().times(1).returning(|_| {
			Err(OrderApiError::Status {
				status: 400,
				message: String::new(),
			})
		});
		mock.expect_list_orders().never();
		let (view, notifier) = mock_view(mock, Arc::new(StaticConfirmer::new(true)));

		view.select_file(Some(PdfFile::pdf("scan.pdf", vec![1])))
			.unwrap();
		let outcome = view.submit_upload().await;

		assert!(matches!(outcome, MutationOutcome::Failed(_)));
		assert!(view.upload().file().is_none());
		assert!(!view.upload().is_uploading());
		assert_eq!(notifier.messages(), vec!["Failed to upload PDF"]);
	}

	#[tokio::test]
	async fn test_activity_log() {
		let h = harness(vec![], true);
		h.view.load().await;

		let logs = h.view.activity().await.unwrap();
		assert_eq!(logs.len(), 1);
		assert_eq!(logs[0].action, "Read all orders");
	}

	/// Backend whose upload and update requests are held until the test
	/// releases them. Deletes and list reads answer immediately.
	struct GatedApi {
		upload_gate: Mutex<Option<oneshot::Receiver<()>>>,
		update_gate: Mutex<Option<oneshot::Receiver<()>>>,
	}

	impl GatedApi {
		fn take(gate: &Mutex<Option<oneshot::Receiver<()>>>) -> oneshot::Receiver<()> {
			gate.lock().unwrap().take().unwrap()
		}
	}

	#[async_trait]
	impl OrderApiInterface for GatedApi {
		async fn list_orders(&self) -> Result<Vec<Order>, OrderApiError> {
			Ok(vec![])
		}
		async fn get_order(&self, _id: OrderId) -> Result<Order, OrderApiError> {
			unimplemented!()
		}
		async fn create_order(&self, _order: &NewOrder) -> Result<Option<Order>, OrderApiError> {
			unimplemented!()
		}
		async fn update_order(&self, _order: &Order) -> Result<(), OrderApiError> {
			let gate = Self::take(&self.update_gate);
			gate.await.map_err(|e| OrderApiError::Network(e.to_string()))
		}
		async fn delete_order(&self, _id: OrderId) -> Result<(), OrderApiError> {
			Ok(())
		}
		async fn upload_pdf(&self, _file: &PdfFile) -> Result<Option<Order>, OrderApiError> {
			let gate = Self::take(&self.upload_gate);
			gate.await
				.map(|_| None)
				.map_err(|e| OrderApiError::Network(e.to_string()))
		}
		async fn list_activity(&self) -> Result<Vec<ActivityLog>, OrderApiError> {
			unimplemented!()
		}
	}

	fn gated_view() -> (Arc<OrderListView>, oneshot::Sender<()>, oneshot::Sender<()>) {
		let (upload_tx, upload_rx) = oneshot::channel();
		let (update_tx, update_rx) = oneshot::channel();
		let api = GatedApi {
			upload_gate: Mutex::new(Some(upload_rx)),
			update_gate: Mutex::new(Some(update_rx)),
		};
		let view = OrderListView::new(
			OrderApiService::new(Arc::new(api)),
			Arc::new(CollectingNotifier::new()),
			Arc::new(StaticConfirmer::new(true)),
		);
		(Arc::new(view), upload_tx, update_tx)
	}

	#[tokio::test]
	async fn test_uploading_state_visible_while_request_runs() {
		let (view, upload_tx, _update_tx) = gated_view();
		view.select_file(Some(PdfFile::pdf("scan.pdf", vec![1])))
			.unwrap();

		let upload = tokio::spawn({
			let view = view.clone();
			async move { view.submit_upload().await }
		});
		tokio::time::sleep(Duration::from_millis(20)).await;

		assert!(view.upload().is_uploading());
		assert_eq!(
			view.upload().actions(),
			vec![
				"Upload PDF (uploading...)",
				"Submit PDF [scan.pdf] (uploading...)"
			]
		);
		assert_eq!(
			view.submit_upload().await,
			MutationOutcome::NotSubmitted(UploadError::InProgress)
		);

		upload_tx.send(()).unwrap();
		assert!(upload.await.unwrap().is_success());
		assert!(!view.upload().is_uploading());
		assert!(view.upload().file().is_none());
		assert_eq!(view.upload().actions(), vec!["Upload PDF"]);
	}

	#[tokio::test]
	async fn test_delete_runs_while_edit_is_in_flight() {
		let (view, _upload_tx, update_tx) = gated_view();
		view.open_edit(Order::from_fields(1, new_order("Jane", "Doe", "1990-05-01")));

		let edit = tokio::spawn({
			let view = view.clone();
			async move { view.submit_edit().await }
		});
		tokio::time::sleep(Duration::from_millis(20)).await;

		assert!(view.delete_order(2).await.is_success());
		assert!(!edit.is_finished());

		update_tx.send(()).unwrap();
		assert!(edit.await.unwrap().is_success());
	}
}
