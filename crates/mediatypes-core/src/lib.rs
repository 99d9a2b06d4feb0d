//! # Mediatypes Core
//!
//! Value model for versioned, organization-scoped media types:
//! identifiers of the form `application/vnd.<organization>.<resource>.v<version>[+suffix]`,
//! per-version output schemas, and the structural validator that checks a
//! candidate output value against a declared schema version.
//!
//! Everything in this crate is pure and transport-agnostic: identifiers are
//! immutable value types, schemas are built once at startup and shared
//! read-only, and validation is a deterministic function of its inputs.

pub mod identifier;
pub mod schema;
pub mod validator;

pub use identifier::{IdentifierPattern, MalformedIdentifier, MediaTypeIdentifier, Suffix};
pub use schema::{
	AttributeNode, CollectionNode, MediaTypeSchema, ObjectSchema, SchemaError, SchemaMember,
	SchemaRegistry, TypeConstraint,
};
pub use validator::ValidationError;
