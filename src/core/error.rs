//! Error type shared by every handler.
//!
//! Each variant maps to exactly one HTTP status code. Handlers return
//! [`Result`] and the conversion into a [`Response`] happens in one place,
//! [`Error::into_response`].

use std::collections::BTreeMap;

use hyper::header::{ALLOW, HeaderValue, WWW_AUTHENTICATE};
use hyper::{Method, StatusCode};
use serde::Serialize;
use serde_json::json;

use super::http::Response;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when a required field is absent.
pub const REQUIRED: &str = "This field is required.";

/// Message used when a string field is empty after trimming.
pub const BLANK: &str = "This field may not be blank.";

/// Message used when a field is explicitly `null`.
pub const NULL: &str = "This field may not be null.";

/// Message used when a string field holds a boolean, list or object.
pub const INVALID_STRING: &str = "Not a valid string.";

/// Key for errors that are not bound to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// Validation messages keyed by field name.
///
/// Serializes as `{"field": ["message", ...]}`.
///
/// # Examples
///
/// ```
/// use profiles_rest_api::core::FieldErrors;
///
/// let mut errors = FieldErrors::new();
/// errors.add("email", "Enter a valid email address.");
/// assert!(errors.contains("email"));
/// assert!(errors.into_result().is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a message to the given field.
	pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
		self.0.entry(field.into()).or_default().push(message.into());
	}

	pub fn contains(&self, field: &str) -> bool {
		self.0.contains_key(field)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, field: &str) -> Option<&[String]> {
		self.0.get(field).map(Vec::as_slice)
	}

	/// Merges errors reported by the `validator` crate.
	///
	/// Fields that already carry a message are skipped so that a blank value
	/// does not also report, say, an invalid email.
	pub fn merge_validator(&mut self, errors: &validator::ValidationErrors) {
		for (field, field_errors) in errors.field_errors() {
			let field = field.to_string();
			if self.contains(&field) {
				continue;
			}
			for error in field_errors.iter() {
				let message = error
					.message
					.as_ref()
					.map(|m| m.to_string())
					.unwrap_or_else(|| error.code.to_string());
				self.add(field.clone(), message);
			}
		}
	}

	/// `Ok(())` when no errors were collected, otherwise [`Error::Validation`].
	pub fn into_result(self) -> Result<()> {
		if self.is_empty() {
			Ok(())
		} else {
			Err(Error::Validation(self))
		}
	}
}

/// Request-terminating errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// One or more input fields are missing or malformed.
	#[error("validation failed: {0:?}")]
	Validation(FieldErrors),

	/// The request body could not be parsed.
	#[error("JSON parse error - {0}")]
	ParseError(String),

	/// The view requires an identity and none was presented.
	#[error("Authentication credentials were not provided.")]
	NotAuthenticated,

	/// Credentials were presented but are invalid.
	#[error("{0}")]
	AuthenticationFailed(String),

	/// The caller is known but not allowed to perform the action.
	#[error("You do not have permission to perform this action.")]
	PermissionDenied,

	#[error("Not found.")]
	NotFound,

	#[error("Method \"{method}\" not allowed.")]
	MethodNotAllowed { method: Method, allowed: Vec<Method> },

	/// Anything else; the message is logged, never sent to the client.
	#[error("internal error: {0}")]
	Internal(String),
}

impl Error {
	/// Shorthand for a validation error on a single field.
	pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
		let mut errors = FieldErrors::new();
		errors.add(field, message);
		Self::Validation(errors)
	}

	pub fn status(&self) -> StatusCode {
		match self {
			Error::Validation(_) | Error::ParseError(_) => StatusCode::BAD_REQUEST,
			Error::NotAuthenticated | Error::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
			Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Renders the error as a JSON response.
	pub fn into_response(self) -> Response {
		let status = self.status();
		let body = match &self {
			Error::Validation(errors) => serde_json::to_value(errors).unwrap_or_default(),
			Error::Internal(message) => {
				tracing::error!(error = %message, "internal server error");
				json!({ "detail": "A server error occurred." })
			}
			other => json!({ "detail": other.to_string() }),
		};

		let mut response = Response::new(status).with_json_value(&body);

		match &self {
			Error::NotAuthenticated | Error::AuthenticationFailed(_) => {
				response
					.headers
					.insert(WWW_AUTHENTICATE, HeaderValue::from_static("Token"));
			}
			Error::MethodNotAllowed { allowed, .. } => {
				let allow = allowed
					.iter()
					.map(Method::as_str)
					.collect::<Vec<_>>()
					.join(", ");
				if let Ok(value) = HeaderValue::from_str(&allow) {
					response.headers.insert(ALLOW, value);
				}
			}
			_ => {}
		}

		response
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Error::ParseError(err.to_string())
	}
}
