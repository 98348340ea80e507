//! Upload payload types.

use std::fmt;

/// Content type accepted by the PDF ingest endpoint.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfFile {
	/// File name sent with the multipart part.
	pub file_name: String,
	/// Declared content type of the file.
	pub content_type: String,
	/// Raw file contents.
	pub bytes: Vec<u8>,
}

impl PdfFile {
	/// Creates a file with an explicit content type.
	pub fn new(
		file_name: impl Into<String>,
		content_type: impl Into<String>,
		bytes: Vec<u8>,
	) -> Self {
		Self {
			file_name: file_name.into(),
			content_type: content_type.into(),
			bytes,
		}
	}

	/// Creates a file declared as `application/pdf`.
	pub fn pdf(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
		Self::new(file_name, PDF_CONTENT_TYPE, bytes)
	}

	/// Returns true when the declared content type is PDF.
	pub fn is_pdf(&self) -> bool {
		self.content_type
			.split(';')
			.next()
			.map(|mime| mime.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
			.unwrap_or(false)
	}

	/// Size of the file in bytes.
	pub fn len(&self) -> usize {
		self.bytes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bytes.is_empty()
	}
}

// File contents are left out so logs stay readable.
impl fmt::Debug for PdfFile {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PdfFile")
			.field("file_name", &self.file_name)
			.field("content_type", &self.content_type)
			.field("len", &self.bytes.len())
			.finish()
	}
}
