//! HTTP boundary types
//!
//! The serialization pipeline only needs a narrow slice of the host
//! framework's request/response surface: the incoming Accept header, the
//! already-decoded request payload, and write access to the outgoing
//! status, content type, headers and body. These types carry exactly that.

use bytes::Bytes;
use hyper::StatusCode;
use hyper::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use serde::Serialize;
use serde_json::Value;

/// The request surface the dispatcher reads
///
/// Decoding the body bytes into a structured payload is the transport
/// layer's job; the payload arrives here already decoded.
#[derive(Debug, Clone)]
pub struct Request {
	pub headers: HeaderMap,
	pub payload: Value,
}

impl Request {
	pub fn new(headers: HeaderMap, payload: Value) -> Self {
		Self { headers, payload }
	}

	/// Builds a request carrying only an Accept header
	///
	/// # Examples
	///
	/// ```
	/// use mediatypes_render::Request;
	/// use serde_json::json;
	///
	/// let request = Request::with_accept("text/html", json!({"title": "t"}));
	/// assert_eq!(request.accept(), Some("text/html"));
	/// ```
	pub fn with_accept(accept: &str, payload: Value) -> Self {
		let mut headers = HeaderMap::new();
		if let Ok(value) = accept.parse() {
			headers.insert(ACCEPT, value);
		}
		Self { headers, payload }
	}

	/// The raw Accept header, when present and readable as a string
	pub fn accept(&self) -> Option<&str> {
		self.headers.get(ACCEPT).and_then(|value| value.to_str().ok())
	}
}

/// The response surface the dispatcher writes
///
/// # Examples
///
/// ```
/// use hyper::StatusCode;
/// use mediatypes_render::Response;
///
/// let response = Response::ok()
///     .with_content_type("text/html")
///     .with_body("<p>hi</p>");
/// assert_eq!(response.status, StatusCode::OK);
/// assert_eq!(response.content_type(), Some("text/html"));
/// ```
#[derive(Debug, Clone)]
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

	/// Create a Response with HTTP 200 OK status
	pub fn ok() -> Self {
		Self::new(StatusCode::OK)
	}

	/// Create a Response with HTTP 400 Bad Request status
	pub fn bad_request() -> Self {
		Self::new(StatusCode::BAD_REQUEST)
	}

	/// Create a Response with HTTP 404 Not Found status
	pub fn not_found() -> Self {
		Self::new(StatusCode::NOT_FOUND)
	}

	/// Create a Response with HTTP 406 Not Acceptable status
	pub fn not_acceptable() -> Self {
		Self::new(StatusCode::NOT_ACCEPTABLE)
	}

	/// Create a Response with HTTP 500 Internal Server Error status
	pub fn internal_server_error() -> Self {
		Self::new(StatusCode::INTERNAL_SERVER_ERROR)
	}

	/// Set the response body
	pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
		self.body = body.into();
		self
	}

	/// Set the Content-Type header
	pub fn with_content_type(mut self, content_type: &str) -> Self {
		if let Ok(value) = hyper::header::HeaderValue::from_str(content_type) {
			self.headers.insert(CONTENT_TYPE, value);
		}
		self
	}

	/// Add a custom header to the response
	pub fn with_header(mut self, name: &str, value: &str) -> Self {
		if let Ok(header_name) = hyper::header::HeaderName::from_bytes(name.as_bytes())
			&& let Ok(header_value) = hyper::header::HeaderValue::from_str(value)
		{
			self.headers.insert(header_name, header_value);
		}
		self
	}

	/// Set the response body to JSON and the matching Content-Type header
	pub fn with_json<T: Serialize>(mut self, data: &T) -> Result<Self, serde_json::Error> {
		let body = serde_json::to_vec(data)?;
		self.body = Bytes::from(body);
		self.headers.insert(
			CONTENT_TYPE,
			hyper::header::HeaderValue::from_static("application/json"),
		);
		Ok(self)
	}

	pub fn content_type(&self) -> Option<&str> {
		self.headers
			.get(CONTENT_TYPE)
			.and_then(|value| value.to_str().ok())
	}

	/// The Link header value, when one was written
	pub fn link(&self) -> Option<&str> {
		self.headers
			.get(hyper::header::LINK)
			.and_then(|value| value.to_str().ok())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_request_without_accept_header() {
		let request = Request::new(HeaderMap::new(), json!({}));
		assert_eq!(request.accept(), None);
	}

	#[test]
	fn test_response_headers() {
		let response = Response::ok()
			.with_content_type("application/vnd.mydomain.my_resource.v1+json")
			.with_header("Link", "<https://google.com>; rel=google");
		assert_eq!(
			response.content_type(),
			Some("application/vnd.mydomain.my_resource.v1+json")
		);
		assert_eq!(response.link(), Some("<https://google.com>; rel=google"));
	}

	#[test]
	fn test_with_json_sets_content_type() {
		let response = Response::ok().with_json(&json!({"ok": true})).unwrap();
		assert_eq!(response.content_type(), Some("application/json"));
		assert_eq!(response.body, Bytes::from(r#"{"ok":true}"#));
	}
}
