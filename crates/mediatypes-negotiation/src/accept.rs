//! Accept header parsing
//!
//! Parsing keeps entries in header order: negotiation uses the position as
//! a tie-break key, so no pre-sorting happens here. Unknown subtypes are
//! retained as opaque patterns; whether an entry is applicable is the
//! negotiator's decision, not the parser's.

use std::fmt;
use thiserror::Error;

/// Raised for a header term that is not even minimally well-formed
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("accept header term '{term}' is missing a type/subtype separator")]
pub struct MalformedAcceptHeader {
	/// The offending term as it appeared in the header
	pub term: String,
}

/// A `type/subtype` media range; either position may be `*`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRange {
	pub type_: String,
	pub subtype: String,
}

impl MediaRange {
	pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
		Self {
			type_: type_.into(),
			subtype: subtype.into(),
		}
	}

	/// Parses a bare media range, returning `None` when the `/` separator
	/// is absent
	pub fn parse(term: &str) -> Option<Self> {
		let (type_, subtype) = term.split_once('/')?;
		let type_ = type_.trim();
		let subtype = subtype.trim();
		if type_.is_empty() || subtype.is_empty() {
			return None;
		}
		Some(Self::new(type_, subtype))
	}

	/// The full wildcard `*/*`
	pub fn is_any(&self) -> bool {
		self.type_ == "*" && self.subtype == "*"
	}

	/// A `type/*` range (not the full wildcard)
	pub fn is_subtype_wildcard(&self) -> bool {
		self.subtype == "*" && self.type_ != "*"
	}

	pub fn is_html(&self) -> bool {
		self.type_ == "text" && self.subtype == "html"
	}
}

impl fmt::Display for MediaRange {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.type_, self.subtype)
	}
}

/// One parsed Accept entry
///
/// Entries exist only for the duration of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptEntry {
	pub range: MediaRange,
	/// Client preference weight in `[0, 1]`; 1.0 when unspecified
	pub quality: f32,
	/// Extension parameters, excluding `q`, in declaration order
	pub params: Vec<(String, String)>,
	/// Zero-based position within the header, the negotiation tie-break key
	pub position: usize,
}

impl AcceptEntry {
	pub fn param(&self, name: &str) -> Option<&str> {
		self.params
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}
}

/// An ordered list of Accept entries, in the order the client sent them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptHeader {
	entries: Vec<AcceptEntry>,
}

impl AcceptHeader {
	/// Parses a raw Accept header
	///
	/// # Examples
	///
	/// ```
	/// use mediatypes_negotiation::AcceptHeader;
	///
	/// let accept =
	///     AcceptHeader::parse("application/vnd.org.res.v1+json, text/html; q=0.1").unwrap();
	/// assert_eq!(accept.entries().len(), 2);
	/// assert_eq!(accept.entries()[0].quality, 1.0);
	/// assert_eq!(accept.entries()[1].quality, 0.1);
	/// assert_eq!(accept.entries()[1].range.to_string(), "text/html");
	///
	/// assert!(AcceptHeader::parse("no-separator").is_err());
	/// ```
	pub fn parse(header: &str) -> Result<Self, MalformedAcceptHeader> {
		let mut entries = Vec::new();
		for term in header.split(',') {
			let term = term.trim();
			if term.is_empty() {
				continue;
			}
			entries.push(parse_term(term, entries.len())?);
		}
		Ok(Self { entries })
	}

	/// An empty header: the client expressed no preference
	pub fn empty() -> Self {
		Self::default()
	}

	/// The accept-anything header, used when a request carries no Accept
	pub fn any() -> Self {
		Self {
			entries: vec![AcceptEntry {
				range: MediaRange::new("*", "*"),
				quality: 1.0,
				params: Vec::new(),
				position: 0,
			}],
		}
	}

	pub fn entries(&self) -> &[AcceptEntry] {
		&self.entries
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

fn parse_term(term: &str, position: usize) -> Result<AcceptEntry, MalformedAcceptHeader> {
	let mut parts = term.split(';');
	let range_part = parts.next().unwrap_or_default().trim();
	let range = MediaRange::parse(range_part).ok_or_else(|| MalformedAcceptHeader {
		term: term.to_string(),
	})?;

	let mut quality = 1.0_f32;
	let mut params = Vec::new();
	for param in parts {
		let Some((key, value)) = param.split_once('=') else {
			// a bare parameter token carries no information; drop it
			continue;
		};
		let key = key.trim();
		let value = value.trim().trim_matches('"');
		if key == "q" {
			// an unparsable weight keeps the default rather than failing
			// the whole entry
			if let Ok(parsed) = value.parse::<f32>() {
				quality = parsed.clamp(0.0, 1.0);
			}
		} else {
			params.push((key.to_string(), value.to_string()));
		}
	}

	Ok(AcceptEntry {
		range,
		quality,
		params,
		position,
	})
}
