//! PDF upload control.
//!
//! Holds at most one pending file. The submit action only exists while a
//! file is selected, and the selection is dropped once the upload settles,
//! whatever its outcome.

use orders_types::PdfFile;
use thiserror::Error;

/// Errors raised when picking or submitting a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
	/// The picked file is not declared as a PDF.
	#[error("Only PDF files can be uploaded (got {0})")]
	NotPdf(String),
	/// Submit was requested with no file selected.
	#[error("No file selected")]
	NoFile,
	/// An upload is already running.
	#[error("Upload already in progress")]
	InProgress,
}

/// State of the upload control.
#[derive(Debug, Default)]
pub struct UploadControl {
	file: Option<PdfFile>,
	uploading: bool,
}

impl UploadControl {
	pub fn new() -> Self {
		Self::default()
	}

	/// Picks a file, or clears the selection with `None`.
	///
	/// Files not declared as PDF are refused and the current selection is
	/// left as it was.
	pub fn select(&mut self, file: Option<PdfFile>) -> Result<(), UploadError> {
		match file {
			Some(file) if !file.is_pdf() => Err(UploadError::NotPdf(file.content_type)),
			file => {
				self.file = file;
				Ok(())
			},
		}
	}

	pub fn file(&self) -> Option<&PdfFile> {
		self.file.as_ref()
	}

	pub fn is_uploading(&self) -> bool {
		self.uploading
	}

	/// Whether the submit action is offered. Only true with a file selected.
	pub fn can_submit(&self) -> bool {
		self.file.is_some()
	}

	/// Marks the upload as started and returns the file to send.
	pub(crate) fn begin(&mut self) -> Result<PdfFile, UploadError> {
		if self.uploading {
			return Err(UploadError::InProgress);
		}
		let file = self.file.clone().ok_or(UploadError::NoFile)?;
		self.uploading = true;
		Ok(file)
	}

	/// Clears the selection and the uploading flag once the request settles.
	pub(crate) fn finish(&mut self) {
		self.uploading = false;
		self.file = None;
	}

	/// Labels of the controls currently offered.
	pub fn actions(&self) -> Vec<String> {
		let suffix = if self.uploading { " (uploading...)" } else { "" };
		let mut actions = vec![format!("Upload PDF{}", suffix)];
		if let Some(file) = &self.file {
			actions.push(format!("Submit PDF [{}]{}", file.file_name, suffix));
		}
		actions
	}
}
