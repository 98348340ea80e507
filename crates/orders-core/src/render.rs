//! Plain-text rendering of the order list and the activity log.

use crate::store::StoreSnapshot;
use orders_types::{format_patient_name, ActivityLog, Order};

/// Banner shown instead of the table when the collection failed to load.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading orders.";

const ORDER_HEADERS: [&str; 4] = ["ID", "Patient Name", "Date of Birth", "Actions"];
const ROW_ACTIONS: &str = "view | edit | delete";

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
	Loading,
	Error,
	Table(Vec<Order>),
}

impl From<&StoreSnapshot> for ListState {
	fn from(snapshot: &StoreSnapshot) -> Self {
		if snapshot.is_loading {
			ListState::Loading
		} else if snapshot.error.is_some() {
			ListState::Error
		} else {
			ListState::Table(snapshot.data.clone())
		}
	}
}

fn line<S: AsRef<str>>(cells: &[S], widths: &[usize]) -> String {
	cells
		.iter()
		.zip(widths)
		.map(|(cell, width)| format!("{:<width$}", cell.as_ref(), width = *width))
		.collect::<Vec<_>>()
		.join("  ")
		.trim_end()
		.to_string()
}

/// Lays out rows as left-aligned columns separated by two spaces.
fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
	let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
	for row in rows {
		for (width, cell) in widths.iter_mut().zip(row) {
			*width = (*width).max(cell.chars().count());
		}
	}
	let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

	let mut out = Vec::with_capacity(rows.len() + 2);
	out.push(line(headers, &widths));
	out.push(line(&separator, &widths));
	for row in rows {
		out.push(line(row, &widths));
	}
	out.join("\n")
}

/// Renders the list area for `state`.
pub fn render_orders(state: &ListState) -> String {
	match state {
		ListState::Loading => "Loading...".to_string(),
		ListState::Error => LOAD_ERROR_MESSAGE.to_string(),
		ListState::Table(orders) => {
			let rows: Vec<Vec<String>> = orders
				.iter()
				.map(|order| {
					vec![
						order.id.to_string(),
						format_patient_name(order),
						order.patient_dob.clone(),
						ROW_ACTIONS.to_string(),
					]
				})
				.collect();
			table(&ORDER_HEADERS, &rows)
		},
	}
}

/// Renders activity log entries, oldest first.
pub fn render_activity(logs: &[ActivityLog]) -> String {
	if logs.is_empty() {
		return "No activity recorded.".to_string();
	}
	let rows: Vec<Vec<String>> = logs
		.iter()
		.map(|log| vec![log.timestamp.clone(), log.user_id.clone(), log.action.clone()])
		.collect();
	table(&["Timestamp", "User", "Action"], &rows)
}
