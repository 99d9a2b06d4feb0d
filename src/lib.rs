//! # Mediatypes Serialization
//!
//! Content negotiation and response serialization for versioned,
//! organization-scoped media types
//! (`application/vnd.<organization>.<resource>.v<version>+json`).
//!
//! Given a domain object, a set of registered serializers and the client's
//! ranked `Accept` preferences, this crate selects the correct
//! serializer/version, validates the would-be output against its declared
//! schema, renders the negotiated format (or the endpoint's HTML wrapper)
//! and attaches hypermedia `Link` response metadata.
//!
//! ## Components
//!
//! - [`mediatypes_core`]: identifiers, per-version schemas and the
//!   structural validator
//! - [`mediatypes_negotiation`]: Accept-header parsing and negotiation
//! - [`mediatypes_render`]: serializer bindings, endpoint registration,
//!   dispatch and Link extraction
//!
//! ## Example
//!
//! ```
//! use mediatypes::{
//!     EndpointRegistration, MediaDispatcher, MediaTypeSchema, ObjectSchema, OutputBuilder,
//!     Request, SerializerBinding, TypeConstraint,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let schema = Arc::new(
//!     MediaTypeSchema::new("mydomain", "my_resource")
//!         .version(
//!             1,
//!             ObjectSchema::new()
//!                 .attribute("name", TypeConstraint::Any)
//!                 .attribute("number", TypeConstraint::Number),
//!         )
//!         .unwrap(),
//! );
//!
//! let binding = SerializerBinding::new(schema)
//!     .output(1, |object| {
//!         OutputBuilder::new()
//!             .attribute("name", object["title"].clone())
//!             .attribute("number", object["count"].clone())
//!             .build()
//!     })
//!     .unwrap();
//!
//! let dispatcher = MediaDispatcher::new(Arc::new(
//!     EndpointRegistration::new().with_serializer(binding),
//! ));
//!
//! let request = Request::with_accept(
//!     "application/vnd.mydomain.my_resource.v1+json",
//!     json!({"title": "t", "count": 1}),
//! );
//! let response = dispatcher.dispatch(&request).await.unwrap();
//! assert_eq!(
//!     response.content_type(),
//!     Some("application/vnd.mydomain.my_resource.v1+json")
//! );
//! # });
//! ```

pub use mediatypes_core as core;
pub use mediatypes_negotiation as negotiation;
pub use mediatypes_render as render;

// Common types at the crate root
pub use mediatypes_core::{
	IdentifierPattern, MalformedIdentifier, MediaTypeIdentifier, MediaTypeSchema, ObjectSchema,
	SchemaError, SchemaRegistry, Suffix, TypeConstraint, ValidationError,
};
pub use mediatypes_negotiation::{
	AcceptEntry, AcceptHeader, MalformedAcceptHeader, MediaRange, Negotiated, NegotiationError,
	Negotiator, Representation,
};
pub use mediatypes_render::{
	BindingError, DispatchError, DuplicateEndpoint, EndpointRegistration, FallbackRenderer,
	InputError, Link, MediaDispatcher, OutputBuilder, OutputDocument, RenderError, Rendered,
	Request, Response, SerializerBinding, SerializerRegistry, link_header_value,
};
