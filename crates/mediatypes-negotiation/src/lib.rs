//! # Mediatypes Negotiation
//!
//! Accept-header parsing and content negotiation for versioned media types.
//!
//! The parser turns a raw `Accept` header into an ordered list of entries
//! (media range, quality, extension parameters); the negotiator ranks those
//! entries against the representations an endpoint can produce and picks
//! the winner, or determines that no acceptable representation exists.
//!
//! Both steps are pure, per-request computations: repeated negotiation on
//! identical inputs returns the identical choice.

pub mod accept;
pub mod negotiator;

pub use accept::{AcceptEntry, AcceptHeader, MalformedAcceptHeader, MediaRange};
pub use negotiator::{Negotiated, NegotiationError, Negotiator, Representation};
