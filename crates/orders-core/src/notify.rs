//! User-facing notifications and confirmations.
//!
//! The list view reports outcomes through a [`Notifier`] and asks before
//! destructive actions through a [`Confirmer`]. Neither is expected to fail;
//! whatever surface implements them decides how the message is shown.

use async_trait::async_trait;
use std::fmt;
use std::sync::Mutex;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
	Info,
	Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
	pub level: NotificationLevel,
	pub message: String,
}

impl Notification {
	pub fn info(message: impl Into<String>) -> Self {
		Self {
			level: NotificationLevel::Info,
			message: message.into(),
		}
	}

	pub fn error(message: impl Into<String>) -> Self {
		Self {
			level: NotificationLevel::Error,
			message: message.into(),
		}
	}

	pub fn is_error(&self) -> bool {
		self.level == NotificationLevel::Error
	}
}

impl fmt::Display for Notification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.message)
	}
}

/// Shows notifications to the user.
pub trait Notifier: Send + Sync {
	fn notify(&self, notification: Notification);
}

/// Asks the user to confirm an action.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Confirmer: Send + Sync {
	/// Returns true when the user accepts `message`.
	async fn confirm(&self, message: &str) -> bool;
}

/// Notifier that keeps every notification in memory.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
	entries: Mutex<Vec<Notification>>,
}

impl CollectingNotifier {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns and clears the collected notifications.
	pub fn take(&self) -> Vec<Notification> {
		self.entries
			.lock()
			.map(|mut entries| std::mem::take(&mut *entries))
			.unwrap_or_default()
	}

	/// Messages collected so far, oldest first.
	pub fn messages(&self) -> Vec<String> {
		self.entries
			.lock()
			.map(|entries| entries.iter().map(|n| n.message.clone()).collect())
			.unwrap_or_default()
	}
}

impl Notifier for CollectingNotifier {
	fn notify(&self, notification: Notification) {
		if let Ok(mut entries) = self.entries.lock() {
			entries.push(notification);
		}
	}
}

/// Confirmer that always gives the same answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticConfirmer {
	answer: bool,
}

impl StaticConfirmer {
	pub fn new(answer: bool) -> Self {
		Self { answer }
	}
}

#[async_trait]
impl Confirmer for StaticConfirmer {
	async fn confirm(&self, message: &str) -> bool {
		tracing::debug!(answer = self.answer, "Auto-answered confirmation: {}", message);
		self.answer
	}
}
