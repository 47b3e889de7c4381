//! # Grappelli
//!
//! Signed, attribute-exact HTTP cookie handling for server-side exchanges.
//!
//! Grappelli reads values out of an inbound `Cookie` header and queues
//! outbound `Set-Cookie` headers with a fixed, wire-compatible attribute
//! order. Optionally every cookie travels with a `.sig` sibling — a keyed
//! hash of `name=value` — so tampering is detected on the way back in, and
//! signing keys can rotate without invalidating cookies already in the
//! wild.
//!
//! ## Crates
//!
//! - [`cookies`] (`grappelli-cookies`) - the [`Cookie`] attribute value and
//!   the [`Cookies`] jar bound to one request/response exchange
//! - [`keys`] (`grappelli-keys`) - the rotation-ordered [`KeyRing`] signer
//!
//! ## Quick Example
//!
//! ```
//! use std::sync::Arc;
//! use hyper::HeaderMap;
//! use grappelli::prelude::*;
//!
//! let ring = Arc::new(KeyRing::new(["keyboard cat"])?);
//!
//! let request = HeaderMap::new();
//! let mut response = HeaderMap::new();
//!
//! let mut cookies = Cookies::with_options(&request, &mut response, JarOptions::with_keys(ring));
//! cookies.set("session", Some("opaque-id"), &SetOptions::default())?;
//!
//! let queued: Vec<_> = response.get_all("set-cookie").iter().collect();
//! assert_eq!(queued.len(), 2); // the cookie and its .sig sibling
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cookies;
pub mod keys;

pub use grappelli_cookies::{
	Cookie, CookieAttributes, Cookies, Error, InboundCookies, JarOptions, OutboundCookies,
	Priority, Result, SameSite, SetOptions,
};
pub use grappelli_keys::{Algorithm, KeyRing, KeyRingError};

/// Common imports for cookie handling.
pub mod prelude {
	pub use grappelli_cookies::{
		Cookie, CookieAttributes, Cookies, Error, InboundCookies, JarOptions, OutboundCookies,
		Priority, SameSite, SetOptions,
	};
	pub use grappelli_keys::{Algorithm, KeyRing};
}
