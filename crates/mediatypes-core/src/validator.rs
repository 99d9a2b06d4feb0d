//! Structural validation of candidate values against a schema version
//!
//! Validation is a pure function: it terminates on every input, returns
//! either `Ok` or exactly one [`ValidationError`], and walks declarations
//! in schema order so the error surfaced for an invalid candidate is the
//! same on every run. Error paths are rooted at `$`, with collection
//! elements addressed by index (`$.items[2].label`).

use crate::schema::{MediaTypeSchema, ObjectSchema, SchemaMember};
use serde_json::Value;
use thiserror::Error;

/// A mismatch between a candidate value and a declared schema
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
	/// The requested version has no declared schema
	#[error("no schema is declared for version {0}")]
	UnknownVersion(u32),

	/// A value that should carry attributes is not an object
	#[error("value at '{path}' is not an object, found {actual}")]
	NotAnObject { path: String, actual: &'static str },

	/// A required attribute or collection key is absent
	#[error("missing attribute '{path}'")]
	MissingAttribute { path: String },

	/// An attribute value does not satisfy its declared type constraint
	#[error("attribute '{path}' expected {expected}, found {actual}")]
	TypeMismatch {
		path: String,
		expected: &'static str,
		actual: &'static str,
	},

	/// A collection key holds something other than an ordered sequence
	#[error("expected '{path}' to be a sequence, found {actual}")]
	NotASequence { path: String, actual: &'static str },

	/// A collection declared without `allow_empty` holds no elements
	#[error("collection '{path}' may not be empty")]
	EmptySequence { path: String },
}

impl ValidationError {
	/// The path of the offending value, where applicable
	pub fn path(&self) -> Option<&str> {
		match self {
			Self::UnknownVersion(_) => None,
			Self::NotAnObject { path, .. }
			| Self::MissingAttribute { path }
			| Self::TypeMismatch { path, .. }
			| Self::NotASequence { path, .. }
			| Self::EmptySequence { path } => Some(path),
		}
	}
}

impl MediaTypeSchema {
	/// Checks `candidate` against the schema declared for `version`
	///
	/// # Examples
	///
	/// ```
	/// use mediatypes_core::{MediaTypeSchema, ObjectSchema, TypeConstraint};
	/// use serde_json::json;
	///
	/// let schema = MediaTypeSchema::new("mydomain", "my_resource")
	///     .version(
	///         1,
	///         ObjectSchema::new()
	///             .attribute("name", TypeConstraint::Any)
	///             .attribute("number", TypeConstraint::Number),
	///     )
	///     .unwrap();
	///
	/// assert!(schema.validate(1, &json!({"name": "a", "number": 1})).is_ok());
	/// assert!(schema.validate(1, &json!({"name": "a", "number": "1"})).is_err());
	/// ```
	pub fn validate(&self, version: u32, candidate: &Value) -> Result<(), ValidationError> {
		let schema = self
			.object_schema(version)
			.ok_or(ValidationError::UnknownVersion(version))?;
		validate_object(schema, candidate, "$")
	}
}

fn validate_object(schema: &ObjectSchema, value: &Value, path: &str) -> Result<(), ValidationError> {
	let map = value.as_object().ok_or_else(|| ValidationError::NotAnObject {
		path: path.to_string(),
		actual: json_type_name(value),
	})?;

	for member in schema.members() {
		let member_path = format!("{path}.{}", member.name());
		match member {
			SchemaMember::Attribute(attribute) => match map.get(&attribute.name) {
				None if attribute.optional => {}
				None => {
					return Err(ValidationError::MissingAttribute { path: member_path });
				}
				Some(found) => {
					if !attribute.constraint.satisfied_by(found) {
						return Err(ValidationError::TypeMismatch {
							path: member_path,
							expected: attribute.constraint.expected_name(),
							actual: json_type_name(found),
						});
					}
				}
			},
			SchemaMember::Collection(collection) => match map.get(&collection.name) {
				None => {
					return Err(ValidationError::MissingAttribute { path: member_path });
				}
				Some(Value::Array(elements)) => {
					if elements.is_empty() && !collection.allow_empty {
						return Err(ValidationError::EmptySequence { path: member_path });
					}
					for (index, element) in elements.iter().enumerate() {
						validate_object(
							&collection.element,
							element,
							&format!("{member_path}[{index}]"),
						)?;
					}
				}
				Some(other) => {
					return Err(ValidationError::NotASequence {
						path: member_path,
						actual: json_type_name(other),
					});
				}
			},
		}
	}
	Ok(())
}

/// The JSON type name used in error messages
pub fn json_type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
