//! Endpoint serializer registration
//!
//! Each endpoint declares, at startup, the serializers it may answer with,
//! an optional HTML fallback renderer, and an optional API-viewer
//! identifier that routes to the fallback. The process-wide
//! [`SerializerRegistry`] maps endpoint names to these registrations; it
//! is populated once before traffic is accepted and read-only afterwards.

use crate::serializer::{FallbackRenderer, SerializerBinding};
use mediatypes_core::MediaTypeIdentifier;
use mediatypes_negotiation::Representation;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Raised when one endpoint is registered twice
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("endpoint '{0}' already has a serializer registration")]
pub struct DuplicateEndpoint(pub String);

/// Everything one endpoint can answer with
#[derive(Clone, Default)]
pub struct EndpointRegistration {
	serializers: Vec<Arc<SerializerBinding>>,
	fallback: Option<Arc<dyn FallbackRenderer>>,
	api_viewer: Option<MediaTypeIdentifier>,
}

impl fmt::Debug for EndpointRegistration {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EndpointRegistration")
			.field("serializers", &self.serializers)
			.field("has_fallback", &self.fallback.is_some())
			.field("api_viewer", &self.api_viewer)
			.finish()
	}
}

impl EndpointRegistration {
	pub fn new() -> Self {
		Self::default()
	}

	/// Allows a serializer for this endpoint; order is negotiation priority
	pub fn with_serializer(mut self, binding: SerializerBinding) -> Self {
		self.serializers.push(Arc::new(binding));
		self
	}

	/// Implements the HTML wrapper for this endpoint
	pub fn with_fallback(mut self, renderer: Arc<dyn FallbackRenderer>) -> Self {
		self.fallback = Some(renderer);
		self
	}

	/// Recognizes an interactive API-viewer identifier, served through the
	/// HTML wrapper
	pub fn with_api_viewer(mut self, identifier: MediaTypeIdentifier) -> Self {
		self.api_viewer = Some(identifier);
		self
	}

	pub fn serializers(&self) -> &[Arc<SerializerBinding>] {
		&self.serializers
	}

	pub fn fallback(&self) -> Option<&Arc<dyn FallbackRenderer>> {
		self.fallback.as_ref()
	}

	pub fn has_fallback(&self) -> bool {
		self.fallback.is_some()
	}

	pub fn api_viewer(&self) -> Option<&MediaTypeIdentifier> {
		self.api_viewer.as_ref()
	}

	/// The representations this endpoint supports, in negotiation priority
	/// order: serializer versions first, then the viewer, then the HTML
	/// capability
	///
	/// The HTML capability is always present: negotiation may select the
	/// fallback path even when no renderer is implemented, so the
	/// dispatcher can report that case distinctly from "nothing
	/// acceptable".
	pub fn representations(&self) -> Vec<Representation> {
		let mut representations: Vec<Representation> = self
			.serializers
			.iter()
			.flat_map(|binding| binding.identifiers())
			.map(Representation::MediaType)
			.collect();
		if let Some(viewer) = &self.api_viewer {
			representations.push(Representation::Viewer(viewer.clone()));
		}
		representations.push(Representation::Html);
		representations
	}

	/// The binding and version behind a negotiated identifier
	pub fn binding_for(
		&self,
		identifier: &MediaTypeIdentifier,
	) -> Option<(&Arc<SerializerBinding>, u32)> {
		self.serializers.iter().find_map(|binding| {
			binding
				.versions()
				.find(|&version| binding.schema().identifier(version) == *identifier)
				.map(|version| (binding, version))
		})
	}
}

/// Process-wide endpoint → registration map
#[derive(Debug, Default)]
pub struct SerializerRegistry {
	endpoints: HashMap<String, Arc<EndpointRegistration>>,
}

impl SerializerRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(
		&mut self,
		endpoint: impl Into<String>,
		registration: EndpointRegistration,
	) -> Result<Arc<EndpointRegistration>, DuplicateEndpoint> {
		let endpoint = endpoint.into();
		if self.endpoints.contains_key(&endpoint) {
			return Err(DuplicateEndpoint(endpoint));
		}
		debug!(
			endpoint = %endpoint,
			serializers = registration.serializers.len(),
			has_fallback = registration.has_fallback(),
			"registered endpoint serializers"
		);
		let shared = Arc::new(registration);
		self.endpoints.insert(endpoint, Arc::clone(&shared));
		Ok(shared)
	}

	pub fn get(&self, endpoint: &str) -> Option<Arc<EndpointRegistration>> {
		self.endpoints.get(endpoint).cloned()
	}

	pub fn len(&self) -> usize {
		self.endpoints.len()
	}

	pub fn is_empty(&self) -> bool {
		self.endpoints.is_empty()
	}
}
