use mediatypes_core::{MediaTypeIdentifier, Suffix};
use mediatypes_negotiation::{
	AcceptHeader, Negotiated, NegotiationError, Negotiator, Representation,
};

fn orders(version: u32) -> MediaTypeIdentifier {
	MediaTypeIdentifier::new("acme", "orders", version).with_suffix(Suffix::Json)
}

fn endpoint() -> Negotiator {
	Negotiator::new(vec![
		Representation::MediaType(orders(1)),
		Representation::MediaType(orders(2)),
		Representation::MediaType(orders(3)),
		Representation::Html,
	])
}

#[test]
fn test_client_pins_a_version() {
	let accept = AcceptHeader::parse("application/vnd.acme.orders.v2+json").unwrap();
	assert_eq!(
		endpoint().negotiate(&accept).unwrap(),
		Negotiated::MediaType(orders(2))
	);
}

#[test]
fn test_quality_ranking_across_versions() {
	// Both versions are acceptable; v3 carries the higher weight
	let accept = AcceptHeader::parse(
		"application/vnd.acme.orders.v1+json; q=0.4, application/vnd.acme.orders.v3+json; q=0.9",
	)
	.unwrap();
	assert_eq!(
		endpoint().negotiate(&accept).unwrap(),
		Negotiated::MediaType(orders(3))
	);
}

#[test]
fn test_browser_style_header_reaches_fallback() {
	// A typical browser header: html first, wildcards at low weight
	let accept =
		AcceptHeader::parse("text/html, application/xhtml+xml, */*; q=0.8").unwrap();
	assert_eq!(endpoint().negotiate(&accept).unwrap(), Negotiated::Fallback);
}

#[test]
fn test_application_wildcard_takes_first_registered() {
	let accept = AcceptHeader::parse("application/*").unwrap();
	assert_eq!(
		endpoint().negotiate(&accept).unwrap(),
		Negotiated::MediaType(orders(1))
	);
}

#[test]
fn test_position_breaks_ties_before_exactness() {
	// Equal quality: the earlier pattern entry wins over the later exact
	// one, and the pattern takes the first registered version
	let accept = AcceptHeader::parse(
		"application/vnd.acme.orders, application/vnd.acme.orders.v2+json",
	)
	.unwrap();
	assert_eq!(
		endpoint().negotiate(&accept).unwrap(),
		Negotiated::MediaType(orders(1))
	);
}

#[test]
fn test_nothing_acceptable() {
	let no_fallback = Negotiator::new(vec![Representation::MediaType(orders(1))]);
	let accept = AcceptHeader::parse("text/plain, image/png").unwrap();
	assert_eq!(
		no_fallback.negotiate(&accept),
		Err(NegotiationError::NoAcceptableRepresentation)
	);
}

#[test]
fn test_malformed_header_is_reported_before_negotiation() {
	assert!(AcceptHeader::parse("application/vnd.acme.orders.v1+json, broken").is_err());
}
