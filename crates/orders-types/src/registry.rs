//! Registry trait for self-registering implementations.
//!
//! Every order API implementation provides a Registry struct that declares
//! the name it is selected by in configuration together with its factory.

/// Base trait for implementation registries.
pub trait ImplementationRegistry {
	/// The name used in configuration files to reference this implementation.
	///
	/// This should match the value of `api.implementation`, for example
	/// "http" or "memory".
	const NAME: &'static str;

	/// The factory function type this implementation provides.
	type Factory;

	/// Get the factory function for this implementation.
	fn factory() -> Self::Factory;
}
