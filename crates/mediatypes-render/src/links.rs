//! Link header extraction
//!
//! Serializers may declare hypermedia links alongside their output; the
//! dispatcher joins them into a single `Link` header value, preserving
//! declaration order. Beyond presence, URIs are not validated here.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One declared link: target URI, relation, and extra parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
	pub rel: String,
	pub href: String,
	pub params: Vec<(String, String)>,
}

impl Link {
	pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
		Self {
			rel: rel.into(),
			href: href.into(),
			params: Vec::new(),
		}
	}

	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.params.push((key.into(), value.into()));
		self
	}
}

impl fmt::Display for Link {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<{}>; rel={}", self.href, self.rel)?;
		for (key, value) in &self.params {
			write!(f, "; {}={}", key, value)?;
		}
		Ok(())
	}
}

/// Joins declared links into a `Link` header value
///
/// Returns `None` when no links were declared, so callers skip the header
/// entirely.
///
/// # Examples
///
/// ```
/// use mediatypes_render::links::{Link, link_header_value};
///
/// let links = vec![Link::new("google", "https://google.com").with_param("foo", "bar")];
/// assert_eq!(
///     link_header_value(&links),
///     Some("<https://google.com>; rel=google; foo=bar".to_string())
/// );
/// ```
pub fn link_header_value(links: &[Link]) -> Option<String> {
	if links.is_empty() {
		return None;
	}
	Some(
		links
			.iter()
			.map(Link::to_string)
			.collect::<Vec<_>>()
			.join(", "),
	)
}
