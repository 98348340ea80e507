//! Front-end workflow for the order desk.
//!
//! This crate holds everything between the order API and whatever draws the
//! screen: the remote order store that caches the collection, the create and
//! edit forms, the PDF upload control, and the order list view that wires
//! row actions to API calls and refreshes the collection after mutations.
//!
//! Nothing here performs I/O directly. Network calls go through
//! [`orders_api::OrderApiService`]; user-facing messages go through a
//! [`Notifier`] and confirmations through a [`Confirmer`], so the whole
//! workflow can be driven by a terminal, a test, or any other surface.

pub mod forms;
pub mod notify;
pub mod render;
pub mod store;
pub mod upload;
pub mod view;

pub use forms::{CreateOrderForm, EditOrderForm, FormError, OrderFields};
pub use notify::{CollectingNotifier, Confirmer, Notification, NotificationLevel, Notifier, StaticConfirmer};
pub use render::{render_activity, render_orders, ListState};
pub use store::{OrderStore, StoreSnapshot};
pub use upload::{UploadControl, UploadError};
pub use view::{MutationOutcome, OrderListView};
