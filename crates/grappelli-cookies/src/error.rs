use thiserror::Error;

/// Result type for cookie operations
pub type Result<T> = std::result::Result<T, Error>;

/// Validation and configuration failures.
///
/// All variants are programmer-error class: bad input or missing setup.
/// Nothing here is transient and nothing is retried. A signature that fails
/// verification is not an error at all — the jar reports it as "no value".
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
	/// A `name` or `value` argument failed the field-content grammar.
	#[error("argument {0} is invalid")]
	InvalidArgument(&'static str),
	/// A cookie attribute failed validation; carries the attribute name.
	#[error("option {0} is invalid")]
	InvalidOption(&'static str),
	/// Signing was requested but the jar holds no keys.
	#[error("keys required for signed cookies")]
	KeysRequired,
}
