//! Content negotiation over an endpoint's supported representations
//!
//! The negotiator scans the Accept entries in header order, finds the first
//! supported representation each entry matches, and elects the winner by
//! highest quality, then earliest header position, then most specific
//! match. The HTML fallback token participates like any other
//! representation: a winning fallback token yields [`Negotiated::Fallback`]
//! and the caller decides whether a renderer actually exists for it.

use crate::accept::{AcceptEntry, AcceptHeader};
use mediatypes_core::{IdentifierPattern, MediaTypeIdentifier};
use thiserror::Error;
use tracing::debug;

/// Errors raised when negotiation cannot elect a representation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NegotiationError {
	/// Nothing the client accepts overlaps with what the endpoint produces
	#[error("no representation offered by this endpoint is acceptable to the client")]
	NoAcceptableRepresentation,
}

/// One representation an endpoint can produce, in priority order
#[derive(Debug, Clone, PartialEq)]
pub enum Representation {
	/// A versioned media type backed by a serializer
	MediaType(MediaTypeIdentifier),
	/// An interactive viewer identifier, rendered through the HTML fallback
	Viewer(MediaTypeIdentifier),
	/// The HTML fallback wrapper
	Html,
}

/// The outcome of a successful negotiation
#[derive(Debug, Clone, PartialEq)]
pub enum Negotiated {
	/// Serialize with the serializer registered for this identifier
	MediaType(MediaTypeIdentifier),
	/// Render through the endpoint's HTML fallback
	Fallback,
}

// Specificity ranks for the tie-break: an exact identifier or exact range
// beats a version wildcard, which beats `type/*`, which beats `*/*`.
const SPECIFICITY_EXACT: u8 = 3;
const SPECIFICITY_VERSION_WILDCARD: u8 = 2;
const SPECIFICITY_SUBTYPE_WILDCARD: u8 = 1;
const SPECIFICITY_ANY: u8 = 0;

/// Ranks parsed Accept entries against a supported representation set
///
/// # Examples
///
/// ```
/// use mediatypes_core::{MediaTypeIdentifier, Suffix};
/// use mediatypes_negotiation::{AcceptHeader, Negotiated, Negotiator, Representation};
///
/// let v1 = MediaTypeIdentifier::new("mydomain", "my_resource", 1).with_suffix(Suffix::Json);
/// let negotiator = Negotiator::new(vec![
///     Representation::MediaType(v1.clone()),
///     Representation::Html,
/// ]);
///
/// let accept =
///     AcceptHeader::parse("application/vnd.mydomain.my_resource.v1+json, text/html; q=0.1")
///         .unwrap();
/// assert_eq!(
///     negotiator.negotiate(&accept).unwrap(),
///     Negotiated::MediaType(v1)
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Negotiator {
	supported: Vec<Representation>,
}

struct Candidate<'a> {
	quality: f32,
	position: usize,
	specificity: u8,
	representation: &'a Representation,
}

impl Negotiator {
	pub fn new(supported: Vec<Representation>) -> Self {
		Self { supported }
	}

	pub fn supported(&self) -> &[Representation] {
		&self.supported
	}

	/// Elects the best representation for the given Accept entries
	pub fn negotiate(&self, accept: &AcceptHeader) -> Result<Negotiated, NegotiationError> {
		let mut best: Option<Candidate<'_>> = None;

		for entry in accept.entries() {
			// first supported representation this entry matches
			for representation in &self.supported {
				let Some(specificity) = match_entry(entry, representation) else {
					continue;
				};
				let candidate = Candidate {
					quality: entry.quality,
					position: entry.position,
					specificity,
					representation,
				};
				if best.as_ref().is_none_or(|current| beats(&candidate, current)) {
					best = Some(candidate);
				}
				break;
			}
		}

		let winner = best.ok_or(NegotiationError::NoAcceptableRepresentation)?;
		let negotiated = match winner.representation {
			Representation::MediaType(identifier) => Negotiated::MediaType(identifier.clone()),
			Representation::Viewer(_) | Representation::Html => Negotiated::Fallback,
		};
		debug!(
			quality = winner.quality,
			position = winner.position,
			choice = ?negotiated,
			"negotiated representation"
		);
		Ok(negotiated)
	}
}

/// Whether `challenger` wins over the `current` best candidate
fn beats(challenger: &Candidate<'_>, current: &Candidate<'_>) -> bool {
	if challenger.quality != current.quality {
		return challenger.quality > current.quality;
	}
	if challenger.position != current.position {
		return challenger.position < current.position;
	}
	challenger.specificity > current.specificity
}

/// Specificity of the match between one Accept entry and one supported
/// representation, or `None` when the entry does not cover it
fn match_entry(entry: &AcceptEntry, representation: &Representation) -> Option<u8> {
	let range = &entry.range;
	match representation {
		Representation::MediaType(identifier) => {
			if range.is_any() {
				return Some(SPECIFICITY_ANY);
			}
			if range.type_ != "application" {
				return None;
			}
			if range.subtype == "*" {
				return Some(SPECIFICITY_SUBTYPE_WILDCARD);
			}
			let pattern =
				IdentifierPattern::parse(&format!("{}/{}", range.type_, range.subtype)).ok()?;
			if identifier.matches(&pattern) {
				Some(if pattern.is_exact() {
					SPECIFICITY_EXACT
				} else {
					SPECIFICITY_VERSION_WILDCARD
				})
			} else {
				None
			}
		}
		Representation::Viewer(identifier) => {
			// the viewer is only ever chosen by name, never via wildcards
			if range.type_ != "application" || range.subtype == "*" {
				return None;
			}
			let pattern =
				IdentifierPattern::parse(&format!("{}/{}", range.type_, range.subtype)).ok()?;
			identifier.matches(&pattern).then_some(SPECIFICITY_EXACT)
		}
		Representation::Html => {
			if range.is_any() {
				Some(SPECIFICITY_ANY)
			} else if range.type_ == "text" && range.subtype == "*" {
				Some(SPECIFICITY_SUBTYPE_WILDCARD)
			} else if range.is_html() {
				Some(SPECIFICITY_EXACT)
			} else {
				None
			}
		}
	}
}
