//! Activity log types.
//!
//! The backend records one entry per order action it serves. The front end
//! only reads them.

use serde::{Deserialize, Serialize};

/// A single activity log entry as returned by `GET /logs/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLog {
	pub id: i64,
	/// Identifier of the user that performed the action.
	pub user_id: String,
	/// Free-form description of the action.
	pub action: String,
	/// ISO-8601 timestamp as produced by the server.
	pub timestamp: String,
}
