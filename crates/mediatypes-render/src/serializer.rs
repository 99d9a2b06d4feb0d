//! Serializer bindings
//!
//! A [`SerializerBinding`] associates one media type schema with the
//! per-version functions that turn a domain object into an output
//! document. Rendering builds the document, validates it against the
//! declared schema version, wraps it under the resource name and encodes
//! it. A validation failure at that point means the declared schema and
//! the actual output disagree: a server-side defect, logged with the
//! offending path and surfaced as an internal error, never retried.

use crate::links::Link;
use async_trait::async_trait;
use bytes::Bytes;
use mediatypes_core::{MediaTypeIdentifier, MediaTypeSchema, ValidationError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

/// Configuration errors raised while declaring a binding
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
	/// An output function was declared for a version with no schema
	#[error("version {version} of '{resource}' has an output function but no declared schema")]
	UndeclaredOutputVersion { resource: String, version: u32 },

	/// An input function was declared for a version with no schema
	#[error("version {version} of '{resource}' has an input function but no declared schema")]
	UndeclaredInputVersion { resource: String, version: u32 },
}

/// Failures while rendering a negotiated representation
#[derive(Debug, Error)]
pub enum RenderError {
	/// The negotiated version has no bound output function
	#[error("no output function is bound for version {version} of '{resource}'")]
	UnboundVersion { resource: String, version: u32 },

	/// The built output does not match the declared schema, a defect in
	/// the serializer rather than in the request
	#[error(
		"serialized output for version {version} of '{resource}' does not match its schema: {source}"
	)]
	SchemaMismatch {
		resource: String,
		version: u32,
		#[source]
		source: ValidationError,
	},

	/// Encoding the validated document to bytes failed
	#[error("failed to encode the serialized output: {0}")]
	Encoding(String),

	/// The HTML fallback renderer reported a failure
	#[error("the HTML fallback failed: {0}")]
	Fallback(String),
}

/// Failures while mapping an inbound payload through an input function
#[derive(Debug, Error)]
pub enum InputError {
	/// The requested version has no bound input function
	#[error("no input function is bound for version {version} of '{resource}'")]
	UnboundVersion { resource: String, version: u32 },

	/// The payload does not match the declared schema, a client error
	#[error("request payload does not match version {version} of '{resource}': {source}")]
	Invalid {
		resource: String,
		version: u32,
		#[source]
		source: ValidationError,
	},
}

/// An output function's result: the candidate value plus declared links
#[derive(Debug, Clone, Default)]
pub struct OutputDocument {
	value: Value,
	links: Vec<Link>,
}

impl OutputDocument {
	pub fn value(&self) -> &Value {
		&self.value
	}

	pub fn links(&self) -> &[Link] {
		&self.links
	}

	pub fn into_value(self) -> Value {
		self.value
	}
}

/// Builds an [`OutputDocument`] attribute by attribute
///
/// # Examples
///
/// ```
/// use mediatypes_render::OutputBuilder;
/// use serde_json::json;
///
/// let document = OutputBuilder::new()
///     .attribute("name", json!("test serialization"))
///     .attribute("number", json!(1))
///     .link("google", "https://google.com")
///     .build();
/// assert_eq!(document.value()["name"], json!("test serialization"));
/// assert_eq!(document.links().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct OutputBuilder {
	attributes: Map<String, Value>,
	links: Vec<Link>,
}

impl OutputBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
		self.attributes.insert(name.into(), value.into());
		self
	}

	pub fn link(mut self, rel: impl Into<String>, href: impl Into<String>) -> Self {
		self.links.push(Link::new(rel, href));
		self
	}

	pub fn link_entry(mut self, link: Link) -> Self {
		self.links.push(link);
		self
	}

	pub fn build(self) -> OutputDocument {
		OutputDocument {
			value: Value::Object(self.attributes),
			links: self.links,
		}
	}
}

/// Per-version function mapping a domain object to an output document
pub type OutputFn = Arc<dyn Fn(&Value) -> OutputDocument + Send + Sync>;

/// Per-version function mapping a validated payload to a domain object
pub type InputFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// The encoded result of rendering one negotiated version
#[derive(Debug, Clone)]
pub struct Rendered {
	pub identifier: MediaTypeIdentifier,
	pub body: Bytes,
	pub links: Vec<Link>,
}

/// Associates a media type schema with per-version output functions
///
/// Every bound version must have a corresponding schema version; binding a
/// function to an undeclared version is a configuration error.
#[derive(Clone)]
pub struct SerializerBinding {
	schema: Arc<MediaTypeSchema>,
	outputs: BTreeMap<u32, OutputFn>,
	inputs: BTreeMap<u32, InputFn>,
}

impl fmt::Debug for SerializerBinding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SerializerBinding")
			.field("resource", &self.schema.resource())
			.field("output_versions", &self.outputs.keys().collect::<Vec<_>>())
			.field("input_versions", &self.inputs.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl SerializerBinding {
	pub fn new(schema: Arc<MediaTypeSchema>) -> Self {
		Self {
			schema,
			outputs: BTreeMap::new(),
			inputs: BTreeMap::new(),
		}
	}

	/// Binds the output function for one version
	pub fn output<F>(mut self, version: u32, function: F) -> Result<Self, BindingError>
	where
		F: Fn(&Value) -> OutputDocument + Send + Sync + 'static,
	{
		if !self.schema.has_version(version) {
			return Err(BindingError::UndeclaredOutputVersion {
				resource: self.schema.resource().to_string(),
				version,
			});
		}
		self.outputs.insert(version, Arc::new(function));
		Ok(self)
	}

	/// Binds the input function for one version
	pub fn input<F>(mut self, version: u32, function: F) -> Result<Self, BindingError>
	where
		F: Fn(&Value) -> Value + Send + Sync + 'static,
	{
		if !self.schema.has_version(version) {
			return Err(BindingError::UndeclaredInputVersion {
				resource: self.schema.resource().to_string(),
				version,
			});
		}
		self.inputs.insert(version, Arc::new(function));
		Ok(self)
	}

	pub fn schema(&self) -> &Arc<MediaTypeSchema> {
		&self.schema
	}

	/// Versions with a bound output function, ascending
	pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
		self.outputs.keys().copied()
	}

	pub fn latest_version(&self) -> Option<u32> {
		self.outputs.keys().next_back().copied()
	}

	/// One canonical identifier per bound output version, ascending
	pub fn identifiers(&self) -> Vec<MediaTypeIdentifier> {
		self.versions()
			.map(|version| self.schema.identifier(version))
			.collect()
	}

	/// Builds and validates the output document for one version
	pub fn serialize(&self, object: &Value, version: u32) -> Result<OutputDocument, RenderError> {
		let function = self
			.outputs
			.get(&version)
			.ok_or_else(|| RenderError::UnboundVersion {
				resource: self.schema.resource().to_string(),
				version,
			})?;
		let document = function(object);
		if let Err(source) = self.schema.validate(version, document.value()) {
			error!(
				resource = self.schema.resource(),
				version,
				path = source.path().unwrap_or("$"),
				"serialized output does not match its declared schema"
			);
			return Err(RenderError::SchemaMismatch {
				resource: self.schema.resource().to_string(),
				version,
				source,
			});
		}
		Ok(document)
	}

	/// Renders one version: serialize, wrap under the resource name, encode
	pub fn render(&self, object: &Value, version: u32) -> Result<Rendered, RenderError> {
		let document = self.serialize(object, version)?;
		let mut wrapped = Map::new();
		wrapped.insert(
			self.schema.resource().to_string(),
			document.value().clone(),
		);
		let body = serde_json::to_vec(&Value::Object(wrapped))
			.map_err(|err| RenderError::Encoding(err.to_string()))?;
		Ok(Rendered {
			identifier: self.schema.identifier(version),
			body: Bytes::from(body),
			links: document.links().to_vec(),
		})
	}

	/// Validates an inbound payload and maps it to a domain object
	pub fn deserialize(&self, payload: &Value, version: u32) -> Result<Value, InputError> {
		let function = self
			.inputs
			.get(&version)
			.ok_or_else(|| InputError::UnboundVersion {
				resource: self.schema.resource().to_string(),
				version,
			})?;
		self.schema
			.validate(version, payload)
			.map_err(|source| InputError::Invalid {
				resource: self.schema.resource().to_string(),
				version,
				source,
			})?;
		Ok(function(payload))
	}
}

/// The optional HTML wrapper an endpoint may implement
///
/// Either an endpoint has one or it doesn't; the dispatcher checks with a
/// plain existence test. The renderer receives the serialized, validated,
/// unwrapped output value of the endpoint's first serializer.
#[async_trait]
pub trait FallbackRenderer: Send + Sync {
	async fn render_html(&self, object: &Value) -> Result<String, RenderError>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use mediatypes_core::{ObjectSchema, TypeConstraint};
	use serde_json::json;

	fn schema() -> Arc<MediaTypeSchema> {
		Arc::new(
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
		)
	}

	fn binding() -> SerializerBinding {
		SerializerBinding::new(schema())
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

	#[test]
	fn test_render_wraps_under_resource_name() {
		let rendered = binding()
			.render(&json!({"title": "test serialization", "count": 1, "data": {}}), 1)
			.unwrap();
		let decoded: Value = serde_json::from_slice(&rendered.body).unwrap();
		assert_eq!(
			decoded,
			json!({"my_resource": {"name": "test serialization", "number": 1, "items": []}})
		);
		assert_eq!(
			rendered.identifier.to_string(),
			"application/vnd.mydomain.my_resource.v1+json"
		);
	}

	#[test]
	fn test_output_for_undeclared_version_is_a_configuration_error() {
		let result = SerializerBinding::new(schema()).output(2, |_| OutputBuilder::new().build());
		assert_eq!(
			result.unwrap_err(),
			BindingError::UndeclaredOutputVersion {
				resource: "my_resource".to_string(),
				version: 2,
			}
		);
	}

	#[test]
	fn test_schema_mismatch_is_surfaced_not_swallowed() {
		let broken = SerializerBinding::new(schema())
			.output(1, |_| {
				// "number" disagrees with the declared constraint
				OutputBuilder::new()
					.attribute("name", json!("n"))
					.attribute("number", json!("not a number"))
					.attribute("items", json!([]))
					.build()
			})
			.unwrap();
		let err = broken.render(&json!({}), 1).unwrap_err();
		assert!(matches!(err, RenderError::SchemaMismatch { version: 1, .. }));
	}

	#[test]
	fn test_render_unbound_version() {
		let err = binding().render(&json!({}), 9).unwrap_err();
		assert!(matches!(err, RenderError::UnboundVersion { version: 9, .. }));
	}

	#[test]
	fn test_deserialize_validates_the_payload() {
		let binding = SerializerBinding::new(schema())
			.input(1, |payload| json!({"title": payload["name"]}))
			.unwrap();

		let valid = json!({"name": "n", "number": 3, "items": []});
		assert_eq!(
			binding.deserialize(&valid, 1).unwrap(),
			json!({"title": "n"})
		);

		let invalid = json!({"name": "n", "number": "three", "items": []});
		assert!(matches!(
			binding.deserialize(&invalid, 1),
			Err(InputError::Invalid { .. })
		));
	}

	#[test]
	fn test_identifiers_follow_bound_versions() {
		let two_versions = Arc::new(
			MediaTypeSchema::new("mydomain", "my_resource")
				.version(1, ObjectSchema::new())
				.unwrap()
				.version(2, ObjectSchema::new())
				.unwrap(),
		);
		let binding = SerializerBinding::new(two_versions)
			.output(1, |_| OutputBuilder::new().build())
			.unwrap()
			.output(2, |_| OutputBuilder::new().build())
			.unwrap();
		let identifiers = binding.identifiers();
		assert_eq!(identifiers.len(), 2);
		assert_eq!(
			identifiers[1].to_string(),
			"application/vnd.mydomain.my_resource.v2+json"
		);
	}
}
