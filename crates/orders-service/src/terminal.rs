//! Terminal surface for notifications and confirmations.

use async_trait::async_trait;
use orders_core::{Confirmer, Notification, Notifier};
use std::io::{self, BufRead, Write};

/// Prints info notifications to stdout and errors to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
	fn notify(&self, notification: Notification) {
		if notification.is_error() {
			eprintln!("{}", notification);
		} else {
			println!("{}", notification);
		}
	}
}

/// Asks on stdin. Anything other than `y` or `yes` declines.
pub struct TerminalConfirmer;

/// Interprets a confirmation answer.
pub(crate) fn is_affirmative(answer: &str) -> bool {
	matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
	async fn confirm(&self, message: &str) -> bool {
		let prompt = format!("{} [y/N] ", message);
		let answer = tokio::task::spawn_blocking(move || -> io::Result<String> {
			let mut stdout = io::stdout();
			stdout.write_all(prompt.as_bytes())?;
			stdout.flush()?;
			let mut line = String::new();
			io::stdin().lock().read_line(&mut line)?;
			Ok(line)
		})
		.await;

		match answer {
			Ok(Ok(line)) => is_affirmative(&line),
			Ok(Err(e)) => {
				tracing::warn!("Failed to read confirmation: {}", e);
				false
			},
			Err(e) => {
				tracing::warn!("Confirmation prompt aborted: {}", e);
				false
			},
		}
	}
}
