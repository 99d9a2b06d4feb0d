//! Per-version schema declarations
//!
//! A [`MediaTypeSchema`] groups the versioned validation rules for one
//! resource: each version owns an [`ObjectSchema`], an ordered list of
//! attribute and collection declarations. Versions are self-contained:
//! there is no inheritance between them, shared attributes are redeclared.
//!
//! Schemas are declared at startup through builder calls and shared
//! read-only behind [`Arc`] afterwards:
//!
//! ```
//! use mediatypes_core::{MediaTypeSchema, ObjectSchema, TypeConstraint};
//!
//! let schema = MediaTypeSchema::new("mydomain", "my_resource")
//!     .version(
//!         1,
//!         ObjectSchema::new()
//!             .attribute("name", TypeConstraint::Any)
//!             .attribute("number", TypeConstraint::Number)
//!             .collection_allowing_empty(
//!                 "items",
//!                 ObjectSchema::new()
//!                     .attribute("label", TypeConstraint::Any)
//!                     .attribute("data", TypeConstraint::Structured),
//!             )
//!             .optional_attribute("source", TypeConstraint::Any),
//!     )
//!     .unwrap();
//!
//! assert_eq!(
//!     schema.identifier(1).to_string(),
//!     "application/vnd.mydomain.my_resource.v1+json"
//! );
//! ```

use crate::identifier::{MediaTypeIdentifier, Suffix};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors raised while declaring or registering schemas
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
	/// Two members of one version share a name
	#[error("attribute or collection '{name}' is declared twice in version {version}")]
	DuplicateMember { name: String, version: u32 },

	/// The same version was declared twice for one media type
	#[error("version {version} is already declared for '{resource}'")]
	DuplicateVersion { resource: String, version: u32 },

	/// Two schemas were registered under the same (organization, resource)
	#[error("a schema for '{organization}.{resource}' is already registered")]
	DuplicateRegistration {
		organization: String,
		resource: String,
	},
}

/// The closed set of type constraints an attribute may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeConstraint {
	/// Any value, including null
	Any,
	String,
	Number,
	Boolean,
	/// Any structurally valid object; no further recursion
	Structured,
}

impl TypeConstraint {
	pub fn satisfied_by(&self, value: &Value) -> bool {
		match self {
			Self::Any => true,
			Self::String => value.is_string(),
			Self::Number => value.is_number(),
			Self::Boolean => value.is_boolean(),
			Self::Structured => value.is_object(),
		}
	}

	/// Human-readable name used in validation error messages
	pub fn expected_name(&self) -> &'static str {
		match self {
			Self::Any => "any value",
			Self::String => "string",
			Self::Number => "number",
			Self::Boolean => "boolean",
			Self::Structured => "object",
		}
	}
}

/// A single named attribute declaration
#[derive(Debug, Clone)]
pub struct AttributeNode {
	pub name: String,
	pub constraint: TypeConstraint,
	pub optional: bool,
}

/// A named collection declaration; each element is validated against the
/// child schema
#[derive(Debug, Clone)]
pub struct CollectionNode {
	pub name: String,
	pub element: ObjectSchema,
	pub allow_empty: bool,
}

/// One declared member of an [`ObjectSchema`]
#[derive(Debug, Clone)]
pub enum SchemaMember {
	Attribute(AttributeNode),
	Collection(CollectionNode),
}

impl SchemaMember {
	pub fn name(&self) -> &str {
		match self {
			Self::Attribute(attribute) => &attribute.name,
			Self::Collection(collection) => &collection.name,
		}
	}
}

/// An ordered set of attribute and collection declarations
///
/// Declaration order is preserved: validation walks members in this order,
/// so the first error surfaced for an invalid candidate is stable.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
	members: Vec<SchemaMember>,
}

impl ObjectSchema {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a required attribute
	pub fn attribute(mut self, name: impl Into<String>, constraint: TypeConstraint) -> Self {
		self.members.push(SchemaMember::Attribute(AttributeNode {
			name: name.into(),
			constraint,
			optional: false,
		}));
		self
	}

	/// Declares an attribute the candidate may omit
	pub fn optional_attribute(
		mut self,
		name: impl Into<String>,
		constraint: TypeConstraint,
	) -> Self {
		self.members.push(SchemaMember::Attribute(AttributeNode {
			name: name.into(),
			constraint,
			optional: true,
		}));
		self
	}

	/// Declares a collection that must hold at least one element
	pub fn collection(mut self, name: impl Into<String>, element: ObjectSchema) -> Self {
		self.members.push(SchemaMember::Collection(CollectionNode {
			name: name.into(),
			element,
			allow_empty: false,
		}));
		self
	}

	/// Declares a collection that may be empty
	pub fn collection_allowing_empty(
		mut self,
		name: impl Into<String>,
		element: ObjectSchema,
	) -> Self {
		self.members.push(SchemaMember::Collection(CollectionNode {
			name: name.into(),
			element,
			allow_empty: true,
		}));
		self
	}

	pub fn members(&self) -> &[SchemaMember] {
		&self.members
	}

	/// First duplicated member name at any nesting level, if any
	fn duplicate_member(&self) -> Option<&str> {
		let mut seen = HashSet::new();
		for member in &self.members {
			if !seen.insert(member.name()) {
				return Some(member.name());
			}
			if let SchemaMember::Collection(collection) = member
				&& let Some(name) = collection.element.duplicate_member()
			{
				return Some(name);
			}
		}
		None
	}
}

/// The versioned validation rules for one resource representation
#[derive(Debug, Clone)]
pub struct MediaTypeSchema {
	organization: String,
	resource: String,
	suffix: Option<Suffix>,
	versions: BTreeMap<u32, ObjectSchema>,
}

impl MediaTypeSchema {
	/// Creates a schema with the default `+json` suffix
	pub fn new(organization: impl Into<String>, resource: impl Into<String>) -> Self {
		Self {
			organization: organization.into(),
			resource: resource.into(),
			suffix: Some(Suffix::Json),
			versions: BTreeMap::new(),
		}
	}

	pub fn with_suffix(mut self, suffix: Suffix) -> Self {
		self.suffix = Some(suffix);
		self
	}

	/// Drops the suffix from derived identifiers
	pub fn without_suffix(mut self) -> Self {
		self.suffix = None;
		self
	}

	/// Declares the schema for one version
	///
	/// Fails when the version is already declared or when a member name is
	/// duplicated within the version.
	pub fn version(mut self, version: u32, schema: ObjectSchema) -> Result<Self, SchemaError> {
		if let Some(name) = schema.duplicate_member() {
			return Err(SchemaError::DuplicateMember {
				name: name.to_string(),
				version,
			});
		}
		if self.versions.contains_key(&version) {
			return Err(SchemaError::DuplicateVersion {
				resource: self.resource.clone(),
				version,
			});
		}
		self.versions.insert(version, schema);
		Ok(self)
	}

	pub fn organization(&self) -> &str {
		&self.organization
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}

	pub fn suffix(&self) -> Option<Suffix> {
		self.suffix
	}

	/// Declared versions in ascending order
	pub fn versions(&self) -> impl Iterator<Item = u32> + '_ {
		self.versions.keys().copied()
	}

	pub fn has_version(&self, version: u32) -> bool {
		self.versions.contains_key(&version)
	}

	pub fn latest_version(&self) -> Option<u32> {
		self.versions.keys().next_back().copied()
	}

	pub(crate) fn object_schema(&self, version: u32) -> Option<&ObjectSchema> {
		self.versions.get(&version)
	}

	/// The canonical identifier of one version of this resource
	pub fn identifier(&self, version: u32) -> MediaTypeIdentifier {
		let identifier = MediaTypeIdentifier::new(&self.organization, &self.resource, version);
		match self.suffix {
			Some(suffix) => identifier.with_suffix(suffix),
			None => identifier,
		}
	}
}

/// Process-wide schema registry
///
/// Populated once during startup registration, before traffic is accepted,
/// and read-only afterwards; concurrent requests share it without locking.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
	entries: HashMap<(String, String), Arc<MediaTypeSchema>>,
}

impl SchemaRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a schema, handing back the shared handle bindings hold on to
	pub fn register(
		&mut self,
		schema: MediaTypeSchema,
	) -> Result<Arc<MediaTypeSchema>, SchemaError> {
		let key = (schema.organization.clone(), schema.resource.clone());
		if self.entries.contains_key(&key) {
			return Err(SchemaError::DuplicateRegistration {
				organization: schema.organization,
				resource: schema.resource,
			});
		}
		debug!(
			organization = %key.0,
			resource = %key.1,
			versions = schema.versions.len(),
			"registered media type schema"
		);
		let shared = Arc::new(schema);
		self.entries.insert(key, Arc::clone(&shared));
		Ok(shared)
	}

	pub fn get(&self, organization: &str, resource: &str) -> Option<Arc<MediaTypeSchema>> {
		self.entries
			.get(&(organization.to_string(), resource.to_string()))
			.cloned()
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn item_schema() -> ObjectSchema {
		ObjectSchema::new()
			.attribute("label", TypeConstraint::Any)
			.attribute("data", TypeConstraint::Structured)
	}

	#[test]
	fn test_identifier_uses_default_json_suffix() {
		let schema = MediaTypeSchema::new("mydomain", "my_resource")
			.version(1, ObjectSchema::new())
			.unwrap();
		assert_eq!(
			schema.identifier(1).to_string(),
			"application/vnd.mydomain.my_resource.v1+json"
		);
	}

	#[test]
	fn test_identifier_without_suffix() {
		let schema = MediaTypeSchema::new("xpbytes", "api-viewer")
			.without_suffix()
			.version(1, ObjectSchema::new())
			.unwrap();
		assert_eq!(
			schema.identifier(1).to_string(),
			"application/vnd.xpbytes.api-viewer.v1"
		);
	}

	#[test]
	fn test_duplicate_version_is_rejected() {
		let result = MediaTypeSchema::new("mydomain", "my_resource")
			.version(1, ObjectSchema::new())
			.unwrap()
			.version(1, ObjectSchema::new());
		assert_eq!(
			result.unwrap_err(),
			SchemaError::DuplicateVersion {
				resource: "my_resource".to_string(),
				version: 1,
			}
		);
	}

	#[test]
	fn test_duplicate_member_is_rejected() {
		let result = MediaTypeSchema::new("mydomain", "my_resource").version(
			1,
			ObjectSchema::new()
				.attribute("name", TypeConstraint::Any)
				.attribute("name", TypeConstraint::String),
		);
		assert_eq!(
			result.unwrap_err(),
			SchemaError::DuplicateMember {
				name: "name".to_string(),
				version: 1,
			}
		);
	}

	#[test]
	fn test_duplicate_member_inside_collection_is_rejected() {
		let result = MediaTypeSchema::new("mydomain", "my_resource").version(
			1,
			ObjectSchema::new().collection(
				"items",
				ObjectSchema::new()
					.attribute("label", TypeConstraint::Any)
					.attribute("label", TypeConstraint::Any),
			),
		);
		assert!(matches!(
			result,
			Err(SchemaError::DuplicateMember { ref name, .. }) if name == "label"
		));
	}

	#[test]
	fn test_versions_are_independent() {
		let schema = MediaTypeSchema::new("mydomain", "my_resource")
			.version(1, ObjectSchema::new().attribute("name", TypeConstraint::Any))
			.unwrap()
			.version(2, ObjectSchema::new().collection("items", item_schema()))
			.unwrap();
		assert_eq!(schema.versions().collect::<Vec<_>>(), vec![1, 2]);
		assert_eq!(schema.latest_version(), Some(2));
	}

	#[test]
	fn test_registry_rejects_duplicates() {
		let mut registry = SchemaRegistry::new();
		registry
			.register(MediaTypeSchema::new("mydomain", "my_resource"))
			.unwrap();
		let result = registry.register(MediaTypeSchema::new("mydomain", "my_resource"));
		assert!(matches!(
			result,
			Err(SchemaError::DuplicateRegistration { .. })
		));
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_registry_lookup() {
		let mut registry = SchemaRegistry::new();
		registry
			.register(MediaTypeSchema::new("mydomain", "my_resource"))
			.unwrap();
		assert!(registry.get("mydomain", "my_resource").is_some());
		assert!(registry.get("mydomain", "nope").is_none());
	}
}
