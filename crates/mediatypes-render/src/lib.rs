//! # Mediatypes Render
//!
//! Serializer bindings, per-request dispatch and Link-header extraction
//! for versioned media types.
//!
//! A [`SerializerBinding`] pairs a media type schema with per-version
//! output functions; an [`EndpointRegistration`] collects the bindings an
//! endpoint may answer with, plus an optional HTML fallback renderer; the
//! [`MediaDispatcher`] runs one request through
//! parse → negotiate → serialize/fallback → respond, keeping the failure
//! kinds (malformed header, nothing acceptable, missing fallback, server
//! defect) distinguishable at the boundary.

pub mod dispatcher;
pub mod http;
pub mod links;
pub mod registry;
pub mod serializer;

pub use dispatcher::{DispatchError, MediaDispatcher};
pub use http::{Request, Response};
pub use links::{Link, link_header_value};
pub use registry::{DuplicateEndpoint, EndpointRegistration, SerializerRegistry};
pub use serializer::{
	BindingError, FallbackRenderer, InputError, OutputBuilder, OutputDocument, RenderError,
	Rendered, SerializerBinding,
};
