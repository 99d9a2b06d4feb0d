//! Per-request dispatch
//!
//! The dispatcher walks one request through the pipeline: parse the Accept
//! header, negotiate a representation against the endpoint's registration,
//! invoke the matching serializer or the HTML fallback, and write the
//! response. Rejections keep the four failure kinds apart so the boundary
//! can tell "the client wants something this service never produces" from
//! "the client wants HTML but this endpoint forgot to implement it".

use crate::http::{Request, Response};
use crate::links::link_header_value;
use crate::registry::EndpointRegistration;
use crate::serializer::RenderError;
use hyper::StatusCode;
use mediatypes_negotiation::{
	AcceptHeader, MalformedAcceptHeader, Negotiated, NegotiationError, Negotiator,
};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Terminal rejection states of one dispatch
#[derive(Debug, Error)]
pub enum DispatchError {
	/// The Accept header was not even minimally well-formed
	#[error(transparent)]
	MalformedAccept(#[from] MalformedAcceptHeader),

	/// Nothing the client accepts overlaps with the endpoint's serializers
	#[error(transparent)]
	NotAcceptable(#[from] NegotiationError),

	/// Negotiation chose the HTML wrapper but this endpoint implements none
	#[error("the HTML wrapper was negotiated but this endpoint does not implement one")]
	MissingFallback,

	/// Serialization failed on the server side (schema/output mismatch or
	/// encoding failure)
	#[error(transparent)]
	Render(#[from] RenderError),
}

impl DispatchError {
	/// The response status this rejection maps to
	pub fn status(&self) -> StatusCode {
		match self {
			Self::MalformedAccept(_) => StatusCode::BAD_REQUEST,
			Self::NotAcceptable(_) => StatusCode::NOT_ACCEPTABLE,
			Self::MissingFallback => StatusCode::NOT_FOUND,
			Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Converts the rejection into a plain-text response
	pub fn into_response(self) -> Response {
		Response::new(self.status())
			.with_content_type("text/plain")
			.with_body(self.to_string())
	}
}

/// Orchestrates negotiation and serialization for one endpoint
///
/// # Examples
///
/// ```
/// use mediatypes_core::{MediaTypeSchema, ObjectSchema, TypeConstraint};
/// use mediatypes_render::{
///     EndpointRegistration, MediaDispatcher, OutputBuilder, Request, SerializerBinding,
/// };
/// use serde_json::json;
/// use std::sync::Arc;
///
/// # tokio_test::block_on(async {
/// let schema = Arc::new(
///     MediaTypeSchema::new("mydomain", "my_resource")
///         .version(1, ObjectSchema::new().attribute("name", TypeConstraint::Any))
///         .unwrap(),
/// );
/// let binding = SerializerBinding::new(schema)
///     .output(1, |object| {
///         OutputBuilder::new().attribute("name", object["title"].clone()).build()
///     })
///     .unwrap();
/// let dispatcher = MediaDispatcher::new(Arc::new(
///     EndpointRegistration::new().with_serializer(binding),
/// ));
///
/// let request = Request::with_accept(
///     "application/vnd.mydomain.my_resource.v1+json",
///     json!({"title": "t"}),
/// );
/// let response = dispatcher.dispatch(&request).await.unwrap();
/// assert_eq!(
///     response.content_type(),
///     Some("application/vnd.mydomain.my_resource.v1+json")
/// );
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MediaDispatcher {
	registration: Arc<EndpointRegistration>,
}

impl MediaDispatcher {
	pub fn new(registration: Arc<EndpointRegistration>) -> Self {
		Self { registration }
	}

	pub fn registration(&self) -> &Arc<EndpointRegistration> {
		&self.registration
	}

	/// Runs the full pipeline for one request
	pub async fn dispatch(&self, request: &Request) -> Result<Response, DispatchError> {
		let accept = match request.accept() {
			Some(raw) => AcceptHeader::parse(raw)?,
			None => AcceptHeader::any(),
		};
		// a present but empty header also expresses no preference
		let accept = if accept.is_empty() {
			AcceptHeader::any()
		} else {
			accept
		};
		debug!(entries = accept.entries().len(), "accept header parsed");

		let negotiator = Negotiator::new(self.registration.representations());
		match negotiator.negotiate(&accept)? {
			Negotiated::MediaType(identifier) => {
				let (binding, version) = self
					.registration
					.binding_for(&identifier)
					.ok_or_else(|| RenderError::UnboundVersion {
						resource: identifier.resource().to_string(),
						version: identifier.version(),
					})?;
				let rendered = binding.render(&request.payload, version)?;
				let mut response = Response::ok()
					.with_content_type(&rendered.identifier.to_string())
					.with_body(rendered.body);
				if let Some(value) = link_header_value(&rendered.links) {
					response = response.with_header("Link", &value);
				}
				debug!(
					content_type = %rendered.identifier,
					status = %response.status,
					"response written"
				);
				Ok(response)
			}
			Negotiated::Fallback => {
				let Some(renderer) = self.registration.fallback() else {
					return Err(DispatchError::MissingFallback);
				};
				let document = self.fallback_document(&request.payload)?;
				let html = renderer.render_html(&document).await?;
				let response = Response::ok()
					.with_content_type("text/html")
					.with_body(html);
				debug!(content_type = "text/html", status = %response.status, "response written");
				Ok(response)
			}
		}
	}

	/// The value handed to the HTML wrapper: the first serializer's latest
	/// version, serialized and validated, or the raw payload for an
	/// endpoint with no serializers
	fn fallback_document(&self, payload: &Value) -> Result<Value, DispatchError> {
		for binding in self.registration.serializers() {
			if let Some(version) = binding.latest_version() {
				return Ok(binding.serialize(payload, version)?.into_value());
			}
		}
		Ok(payload.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::serializer::{FallbackRenderer, OutputBuilder, SerializerBinding};
	use async_trait::async_trait;
	use mediatypes_core::{MediaTypeIdentifier, MediaTypeSchema, ObjectSchema, TypeConstraint};
	use serde_json::json;

	struct CodeWrapper;

	#[async_trait]
	impl FallbackRenderer for CodeWrapper {
		async fn render_html(&self, object: &Value) -> Result<String, RenderError> {
			let encoded = serde_json::to_string(object)
				.map_err(|err| RenderError::Fallback(err.to_string()))?;
			Ok(format!("<code>{}</code>", encoded))
		}
	}

	fn binding() -> SerializerBinding {
		let schema = Arc::new(
			MediaTypeSchema::new("mydomain", "my_resource")
				.version(
					1,
					ObjectSchema::new()
						.attribute("name", TypeConstraint::Any)
						.attribute("number", TypeConstraint::Number)
						.collection_allowing_empty(
							"items",
							ObjectSchema::new()
								.attribute("label", TypeConstraint::Any)
								.attribute("data", TypeConstraint::Structured),
						),
				)
				.unwrap(),
		);
		SerializerBinding::new(schema)
			.output(1, |object| {
				let items: Vec<Value> = object["data"]
					.as_object()
					.map(|map| {
						map.iter()
							.map(|(key, value)| json!({"label": key, "data": value}))
							.collect()
					})
					.unwrap_or_default();
				OutputBuilder::new()
					.attribute("name", object["title"].clone())
					.attribute("number", object["count"].clone())
					.attribute("items", items)
					.build()
			})
			.unwrap()
	}

	fn payload() -> Value {
		json!({"title": "test serialization", "count": 1, "data": {}})
	}

	#[tokio::test]
	async fn test_media_type_path_writes_canonical_content_type() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new().with_serializer(binding()),
		));
		let request = Request::with_accept(
			"application/vnd.mydomain.my_resource.v1+json, text/html; q=0.1",
			payload(),
		);
		let response = dispatcher.dispatch(&request).await.unwrap();
		assert_eq!(response.status, StatusCode::OK);
		assert_eq!(
			response.content_type(),
			Some("application/vnd.mydomain.my_resource.v1+json")
		);
	}

	#[tokio::test]
	async fn test_fallback_path_receives_unwrapped_document() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new()
				.with_serializer(binding())
				.with_fallback(Arc::new(CodeWrapper)),
		));
		let request =
			Request::with_accept("application/vnd.mydomain.nope, text/html; q=0.1", payload());
		let response = dispatcher.dispatch(&request).await.unwrap();
		assert_eq!(response.content_type(), Some("text/html"));
		assert_eq!(
			response.body,
			bytes::Bytes::from(
				r#"<code>{"name":"test serialization","number":1,"items":[]}</code>"#
			)
		);
	}

	#[tokio::test]
	async fn test_missing_fallback_is_distinct_from_not_acceptable() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new().with_serializer(binding()),
		));

		let wants_html =
			Request::with_accept("application/vnd.mydomain.nope, text/html; q=0.1", payload());
		let err = dispatcher.dispatch(&wants_html).await.unwrap_err();
		assert!(matches!(err, DispatchError::MissingFallback));
		assert_eq!(err.status(), StatusCode::NOT_FOUND);

		let wants_nothing_we_have =
			Request::with_accept("application/vnd.mydomain.nope", payload());
		let err = dispatcher.dispatch(&wants_nothing_we_have).await.unwrap_err();
		assert!(matches!(err, DispatchError::NotAcceptable(_)));
		assert_eq!(err.status(), StatusCode::NOT_ACCEPTABLE);
	}

	#[tokio::test]
	async fn test_absent_accept_header_serializes_first_representation() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new().with_serializer(binding()),
		));
		let request = Request::new(hyper::header::HeaderMap::new(), payload());
		let response = dispatcher.dispatch(&request).await.unwrap();
		assert_eq!(
			response.content_type(),
			Some("application/vnd.mydomain.my_resource.v1+json")
		);
	}

	#[tokio::test]
	async fn test_malformed_accept_header_is_a_client_error() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new().with_serializer(binding()),
		));
		let request = Request::with_accept("gibberish", payload());
		let err = dispatcher.dispatch(&request).await.unwrap_err();
		assert!(matches!(err, DispatchError::MalformedAccept(_)));
		assert_eq!(err.status(), StatusCode::BAD_REQUEST);
	}

	#[tokio::test]
	async fn test_api_viewer_routes_to_fallback() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new()
				.with_serializer(binding())
				.with_api_viewer(MediaTypeIdentifier::new("xpbytes", "api-viewer", 1))
				.with_fallback(Arc::new(CodeWrapper)),
		));
		let request = Request::with_accept("application/vnd.xpbytes.api-viewer.v1", payload());
		let response = dispatcher.dispatch(&request).await.unwrap();
		assert_eq!(response.content_type(), Some("text/html"));
	}

	#[tokio::test]
	async fn test_rejection_responses_keep_failure_kinds_apart() {
		let dispatcher = MediaDispatcher::new(Arc::new(
			EndpointRegistration::new().with_serializer(binding()),
		));
		let request = Request::with_accept("application/vnd.mydomain.nope", payload());
		let response = dispatcher
			.dispatch(&request)
			.await
			.unwrap_err()
			.into_response();
		assert_eq!(response.status, StatusCode::NOT_ACCEPTABLE);
		assert_eq!(response.content_type(), Some("text/plain"));
	}
}
