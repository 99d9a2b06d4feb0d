//! Versioned media type identifiers
//!
//! An identifier names one version of one resource representation inside an
//! organization's vendor tree, e.g.
//! `application/vnd.mydomain.my_resource.v1+json`. Identifiers are immutable
//! value types with structural equality and a canonical string form that
//! round-trips through [`MediaTypeIdentifier::parse`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised when an identifier string cannot be parsed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MalformedIdentifier {
	/// The string does not start with `application/vnd.`
	#[error("media type '{0}' is missing the 'application/vnd.' prefix")]
	MissingVendorPrefix(String),

	/// No `.v<number>` segment was found
	#[error("media type '{0}' is missing a '.v<number>' version segment")]
	MissingVersion(String),

	/// The version segment is present but not a positive integer
	#[error("media type '{0}' has an invalid version segment '{1}'")]
	InvalidVersion(String, String),

	/// The organization token is empty or not a lowercase token
	#[error("media type '{0}' has an invalid organization token '{1}'")]
	InvalidOrganization(String, String),

	/// Nothing is left between the organization and the version segment
	#[error("media type '{0}' has an empty resource name")]
	EmptyResourceName(String),

	/// The structured syntax suffix is not a registered one
	#[error("media type '{0}' has an unknown suffix '{1}'")]
	UnknownSuffix(String, String),
}

/// Structured syntax suffix of a media type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suffix {
	Json,
	Xml,
}

impl Suffix {
	/// Parses a suffix token, returning `None` for unregistered suffixes
	pub fn parse(token: &str) -> Option<Self> {
		match token {
			"json" => Some(Self::Json),
			"xml" => Some(Self::Xml),
			_ => None,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Json => "json",
			Self::Xml => "xml",
		}
	}
}

impl fmt::Display for Suffix {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A versioned, organization-scoped media type
///
/// # Examples
///
/// ```
/// use mediatypes_core::{MediaTypeIdentifier, Suffix};
///
/// let id = MediaTypeIdentifier::new("mydomain", "my_resource", 1).with_suffix(Suffix::Json);
/// assert_eq!(id.to_string(), "application/vnd.mydomain.my_resource.v1+json");
///
/// let parsed = MediaTypeIdentifier::parse("application/vnd.mydomain.my_resource.v1+json").unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaTypeIdentifier {
	organization: String,
	resource: String,
	version: u32,
	suffix: Option<Suffix>,
}

impl MediaTypeIdentifier {
	/// Creates an identifier without a suffix
	///
	/// Suffix-less identifiers are legal (interactive viewer types carry
	/// none); use [`with_suffix`](Self::with_suffix) for the common
	/// `+json` form.
	pub fn new(
		organization: impl Into<String>,
		resource: impl Into<String>,
		version: u32,
	) -> Self {
		Self {
			organization: organization.into(),
			resource: resource.into(),
			version,
			suffix: None,
		}
	}

	pub fn with_suffix(mut self, suffix: Suffix) -> Self {
		self.suffix = Some(suffix);
		self
	}

	/// Parses the canonical form
	/// `application/vnd.<organization>.<resource>.v<version>[+suffix]`
	///
	/// # Examples
	///
	/// ```
	/// use mediatypes_core::MediaTypeIdentifier;
	///
	/// let id = MediaTypeIdentifier::parse("application/vnd.acme.orders.v3+json").unwrap();
	/// assert_eq!(id.organization(), "acme");
	/// assert_eq!(id.resource(), "orders");
	/// assert_eq!(id.version(), 3);
	///
	/// assert!(MediaTypeIdentifier::parse("text/html").is_err());
	/// assert!(MediaTypeIdentifier::parse("application/vnd.acme.orders").is_err());
	/// ```
	pub fn parse(input: &str) -> Result<Self, MalformedIdentifier> {
		let rest = input
			.strip_prefix("application/vnd.")
			.ok_or_else(|| MalformedIdentifier::MissingVendorPrefix(input.to_string()))?;

		let (rest, suffix) = split_suffix(input, rest)?;

		let (head, version_segment) = rest
			.rsplit_once('.')
			.ok_or_else(|| MalformedIdentifier::MissingVersion(input.to_string()))?;
		let version = parse_version(input, version_segment)?
			.ok_or_else(|| MalformedIdentifier::MissingVersion(input.to_string()))?;

		let (organization, resource) = split_name(input, head)?;

		Ok(Self {
			organization,
			resource,
			version,
			suffix,
		})
	}

	pub fn organization(&self) -> &str {
		&self.organization
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}

	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn suffix(&self) -> Option<Suffix> {
		self.suffix
	}

	/// The canonical string form
	pub fn canonical(&self) -> String {
		self.to_string()
	}

	/// Whether this identifier is covered by `pattern`
	///
	/// A pattern with an omitted version or suffix matches any value in
	/// that position.
	///
	/// # Examples
	///
	/// ```
	/// use mediatypes_core::{IdentifierPattern, MediaTypeIdentifier, Suffix};
	///
	/// let id = MediaTypeIdentifier::new("mydomain", "my_resource", 2).with_suffix(Suffix::Json);
	/// let any_version = IdentifierPattern::parse("application/vnd.mydomain.my_resource").unwrap();
	/// let v1_only = IdentifierPattern::parse("application/vnd.mydomain.my_resource.v1").unwrap();
	///
	/// assert!(id.matches(&any_version));
	/// assert!(!id.matches(&v1_only));
	/// ```
	pub fn matches(&self, pattern: &IdentifierPattern) -> bool {
		self.organization == pattern.organization
			&& self.resource == pattern.resource
			&& pattern.version.is_none_or(|v| v == self.version)
			&& pattern.suffix.is_none_or(|s| Some(s) == self.suffix)
	}
}

impl fmt::Display for MediaTypeIdentifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"application/vnd.{}.{}.v{}",
			self.organization, self.resource, self.version
		)?;
		if let Some(suffix) = self.suffix {
			write!(f, "+{}", suffix)?;
		}
		Ok(())
	}
}

impl FromStr for MediaTypeIdentifier {
	type Err = MalformedIdentifier;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// A lenient identifier form that may omit the version and/or suffix
///
/// Accept-header entries use patterns to express "any version of this
/// resource"; [`MediaTypeIdentifier::matches`] checks coverage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierPattern {
	organization: String,
	resource: String,
	version: Option<u32>,
	suffix: Option<Suffix>,
}

impl IdentifierPattern {
	/// Parses a vendor media type pattern, tolerating an omitted version
	///
	/// # Examples
	///
	/// ```
	/// use mediatypes_core::IdentifierPattern;
	///
	/// let pattern = IdentifierPattern::parse("application/vnd.mydomain.my_resource").unwrap();
	/// assert_eq!(pattern.version(), None);
	///
	/// let exact = IdentifierPattern::parse("application/vnd.mydomain.my_resource.v1").unwrap();
	/// assert_eq!(exact.version(), Some(1));
	/// ```
	pub fn parse(input: &str) -> Result<Self, MalformedIdentifier> {
		let rest = input
			.strip_prefix("application/vnd.")
			.ok_or_else(|| MalformedIdentifier::MissingVendorPrefix(input.to_string()))?;

		let (rest, suffix) = split_suffix(input, rest)?;

		let (head, version) = match rest.rsplit_once('.') {
			Some((head, segment)) => match parse_version(input, segment)? {
				Some(version) => (head, Some(version)),
				None => (rest, None),
			},
			None => (rest, None),
		};

		let (organization, resource) = split_name(input, head)?;

		Ok(Self {
			organization,
			resource,
			version,
			suffix,
		})
	}

	pub fn organization(&self) -> &str {
		&self.organization
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}

	pub fn version(&self) -> Option<u32> {
		self.version
	}

	pub fn suffix(&self) -> Option<Suffix> {
		self.suffix
	}

	/// Whether the pattern pins an exact version
	pub fn is_exact(&self) -> bool {
		self.version.is_some()
	}
}

fn split_suffix<'a>(
	input: &str,
	rest: &'a str,
) -> Result<(&'a str, Option<Suffix>), MalformedIdentifier> {
	match rest.split_once('+') {
		Some((head, token)) => {
			let suffix = Suffix::parse(token).ok_or_else(|| {
				MalformedIdentifier::UnknownSuffix(input.to_string(), token.to_string())
			})?;
			Ok((head, Some(suffix)))
		}
		None => Ok((rest, None)),
	}
}

/// Parses a `v<digits>` segment; `Ok(None)` when the segment is not
/// version-shaped at all (pattern parsing treats it as part of the name)
fn parse_version(input: &str, segment: &str) -> Result<Option<u32>, MalformedIdentifier> {
	let Some(digits) = segment.strip_prefix('v') else {
		return Ok(None);
	};
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return Ok(None);
	}
	let version: u32 = digits
		.parse()
		.map_err(|_| MalformedIdentifier::InvalidVersion(input.to_string(), segment.to_string()))?;
	if version == 0 {
		return Err(MalformedIdentifier::InvalidVersion(
			input.to_string(),
			segment.to_string(),
		));
	}
	Ok(Some(version))
}

fn split_name(input: &str, head: &str) -> Result<(String, String), MalformedIdentifier> {
	let (organization, resource) = head
		.split_once('.')
		.ok_or_else(|| MalformedIdentifier::EmptyResourceName(input.to_string()))?;
	if organization.is_empty()
		|| !organization
			.bytes()
			.all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_')
	{
		return Err(MalformedIdentifier::InvalidOrganization(
			input.to_string(),
			organization.to_string(),
		));
	}
	if resource.is_empty() {
		return Err(MalformedIdentifier::EmptyResourceName(input.to_string()));
	}
	Ok((organization.to_string(), resource.to_string()))
}
