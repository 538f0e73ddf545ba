//! Request and response types passed between the server, middleware and
//! views.

use std::collections::HashMap;

use bytes::Bytes;
use http::Extensions;
use http_body_util::Full;
use hyper::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use hyper::{HeaderMap, Method, StatusCode, Uri, Version};
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::{Error, Result};
use crate::auth::AuthState;

/// HTTP request representation.
pub struct Request {
	pub method: Method,
	pub uri: Uri,
	pub version: Version,
	pub headers: HeaderMap,
	pub body: Bytes,
	/// Parameters captured from the matched route, e.g. `pk`.
	pub path_params: HashMap<String, String>,
	pub extensions: Extensions,
}

impl Request {
	/// Start building a request.
	///
	/// # Examples
	///
	/// ```
	/// use profiles_rest_api::core::Request;
	/// use hyper::Method;
	///
	/// let request = Request::builder()
	///     .method(Method::POST)
	///     .uri("/profile/?search=ada")
	///     .json(&serde_json::json!({ "name": "Ada" }))
	///     .build()
	///     .unwrap();
	///
	/// assert_eq!(request.path(), "/profile/");
	/// assert_eq!(request.query_param("search").as_deref(), Some("ada"));
	/// ```
	pub fn builder() -> RequestBuilder {
		RequestBuilder::default()
	}

	pub fn path(&self) -> &str {
		self.uri.path()
	}

	/// Decoded query string parameters. Later duplicates win.
	pub fn query_params(&self) -> HashMap<String, String> {
		self.uri
			.query()
			.and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
			.map(|pairs| pairs.into_iter().collect())
			.unwrap_or_default()
	}

	pub fn query_param(&self, name: &str) -> Option<String> {
		self.query_params().remove(name)
	}

	pub fn path_param(&self, name: &str) -> Option<&str> {
		self.path_params.get(name).map(String::as_str)
	}

	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).and_then(|value| value.to_str().ok())
	}

	/// Authentication state recorded by the view's authenticators.
	///
	/// Anonymous until authentication has run.
	pub fn auth(&self) -> AuthState {
		self.extensions
			.get::<AuthState>()
			.cloned()
			.unwrap_or_else(AuthState::anonymous)
	}

	/// Parses the body into a JSON object.
	///
	/// JSON is the default; `application/x-www-form-urlencoded` bodies are
	/// accepted as string-valued objects. An empty body yields an empty object.
	pub fn data(&self) -> Result<Map<String, Value>> {
		if self.body.iter().all(u8::is_ascii_whitespace) {
			return Ok(Map::new());
		}

		let content_type = self.header(CONTENT_TYPE.as_str()).unwrap_or_default();
		if content_type.starts_with("application/x-www-form-urlencoded") {
			let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&self.body)
				.map_err(|e| Error::ParseError(e.to_string()))?;
			return Ok(pairs
				.into_iter()
				.map(|(key, value)| (key, Value::String(value)))
				.collect());
		}

		match serde_json::from_slice::<Value>(&self.body)? {
			Value::Object(map) => Ok(map),
			other => Err(Error::field(
				super::error::NON_FIELD_ERRORS,
				format!("Invalid data. Expected a dictionary, but got {}.", type_name(&other)),
			)),
		}
	}
}

/// Whether the method cannot modify server state.
pub fn is_safe_method(method: &Method) -> bool {
	matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "bool",
		Value::Number(_) => "number",
		Value::String(_) => "str",
		Value::Array(_) => "list",
		Value::Object(_) => "dict",
	}
}

/// Builder for [`Request`], mostly used by the server and by tests.
#[derive(Default)]
pub struct RequestBuilder {
	method: Method,
	uri: Option<String>,
	headers: HeaderMap,
	body: Bytes,
}

impl RequestBuilder {
	pub fn method(mut self, method: Method) -> Self {
		self.method = method;
		self
	}

	pub fn uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn headers(mut self, headers: HeaderMap) -> Self {
		self.headers = headers;
		self
	}

	/// Adds a header; invalid names or values are ignored.
	pub fn header(mut self, name: &str, value: &str) -> Self {
		if let (Ok(name), Ok(value)) = (
			HeaderName::from_bytes(name.as_bytes()),
			HeaderValue::from_str(value),
		) {
			self.headers.insert(name, value);
		}
		self
	}

	pub fn body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Serializes `data` as the body and sets the JSON content type.
	pub fn json<T: Serialize>(self, data: &T) -> Self {
		let body = serde_json::to_vec(data).unwrap_or_default();
		self.header(CONTENT_TYPE.as_str(), "application/json")
			.body(body)
	}

	pub fn build(self) -> std::result::Result<Request, http::uri::InvalidUri> {
		let uri = self.uri.as_deref().unwrap_or("/").parse::<Uri>()?;
		Ok(Request {
			method: self.method,
			uri,
			version: Version::HTTP_11,
			headers: self.headers,
			body: self.body,
			path_params: HashMap::new(),
			extensions: Extensions::new(),
		})
	}
}

/// HTTP Response representation.
#[derive(Debug)]
pub struct Response {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Bytes,
}

impl Response {
	pub fn new(status: StatusCode) -> Self {
		Self {
			status,
			headers: HeaderMap::new(),
			body: Bytes::new(),
		}
	}

	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	pub fn created() -> Self {
		Self::new(StatusCode::CREATED)
	}

	pub fn no_content() -> Self {
		Self::new(StatusCode::NO_CONTENT)
	}

	/// Serializes `data` as a JSON body.
	///
	/// # Examples
	///
	/// ```
	/// use profiles_rest_api::core::Response;
	///
	/// let response = Response::ok().with_json(&serde_json::json!({ "ok": true })).unwrap();
	/// assert_eq!(response.headers.get("content-type").unwrap(), "application/json");
	/// ```
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self> {
		let body = serde_json::to_vec(data).map_err(|e| Error::Internal(e.to_string()))?;
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = Bytes::from(body);
		Ok(self)
	}

	/// Like [`Response::with_json`] for an already-built value, which cannot fail.
	pub fn with_json_value(mut self, value: &Value) -> Self {
		self.headers
			.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		self.body = Bytes::from(value.to_string());
		self
	}

	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);
		self
	}

	/// Converts into the hyper response type written to the connection.
	pub fn into_hyper(self) -> hyper::Response<Full<Bytes>> {
		let mut response = hyper::Response::new(Full::new(self.body));
		*response.status_mut() = self.status;
		*response.headers_mut() = self.headers;
		response
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	fn post(content_type: &str, body: &'static str) -> Request {
		Request::builder()
			.method(Method::POST)
			.uri("/login/")
			.header("content-type", content_type)
			.body(body)
			.build()
			.unwrap()
	}

	#[rstest]
	fn test_json_body_is_parsed() {
		let request = post("application/json", r#"{"username": "a@b.io", "password": "pw"}"#);
		let data = request.data().unwrap();

		assert_eq!(data["username"], json!("a@b.io"));
		assert_eq!(data["password"], json!("pw"));
	}

	#[rstest]
	fn test_form_body_is_parsed() {
		let request = post(
			"application/x-www-form-urlencoded",
			"username=a%40b.io&password=pw",
		);
		let data = request.data().unwrap();

		assert_eq!(data["username"], json!("a@b.io"));
	}

	#[rstest]
	#[case("")]
	#[case("  \n")]
	fn test_empty_body_is_empty_object(#[case] body: &'static str) {
		assert!(post("application/json", body).data().unwrap().is_empty());
	}

	#[rstest]
	fn test_malformed_json_is_parse_error() {
		let err = post("application/json", "{not json").data().unwrap_err();
		assert!(matches!(err, Error::ParseError(_)));
	}

	#[rstest]
	fn test_non_object_json_is_validation_error() {
		let err = post("application/json", "[1, 2]").data().unwrap_err();
		let Error::Validation(errors) = err else {
			panic!("expected validation error");
		};
		assert_eq!(
			errors.get(super::super::error::NON_FIELD_ERRORS).unwrap()[0],
			"Invalid data. Expected a dictionary, but got list."
		);
	}

	#[rstest]
	fn test_auth_defaults_to_anonymous() {
		let request = Request::builder().uri("/").build().unwrap();
		assert!(!request.auth().is_authenticated());
	}

	#[rstest]
	#[case(Method::GET, true)]
	#[case(Method::HEAD, true)]
	#[case(Method::OPTIONS, true)]
	#[case(Method::POST, false)]
	#[case(Method::PUT, false)]
	#[case(Method::PATCH, false)]
	#[case(Method::DELETE, false)]
	fn test_safe_methods(#[case] method: Method, #[case] expected: bool) {
		assert_eq!(is_safe_method(&method), expected);
	}

	#[rstest]
	fn test_into_hyper_preserves_status_and_headers() {
		let response = Response::created()
			.with_json(&json!({ "id": 1 }))
			.unwrap()
			.into_hyper();

		assert_eq!(response.status(), StatusCode::CREATED);
		assert_eq!(
			response.headers().get(CONTENT_TYPE).unwrap(),
			"application/json"
		);
	}
}
