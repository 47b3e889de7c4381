//! Collaborator traits binding a jar to one request/response exchange.
//!
//! The jar never sees the host's request or response types directly; it
//! reads the raw `Cookie` header and the connection's encryption signal
//! through [`InboundCookies`], and edits the accumulated `Set-Cookie` list
//! through [`OutboundCookies`]. Both traits are implemented for
//! [`hyper::HeaderMap`] so any hyper-based host works out of the box.

use hyper::HeaderMap;
use hyper::header::{COOKIE, HeaderValue, SET_COOKIE};

/// Read access to the inbound side of an exchange.
pub trait InboundCookies {
	/// The raw `Cookie` header value, verbatim (e.g. `"foo=bar; fizz=buzz"`).
	fn cookie_header(&self) -> Option<&str>;

	/// Whether the underlying connection is encrypted. Feeds the jar's
	/// send-time `secure` resolution; hosts with a real TLS signal should
	/// override this.
	fn is_encrypted(&self) -> bool {
		false
	}
}

/// Read/write access to the accumulated `Set-Cookie` list of a response.
///
/// `Set-Cookie` stays multi-valued: one list entry per header, never a
/// comma-joined value.
pub trait OutboundCookies {
	/// Snapshot of the accumulated `Set-Cookie` values, in insertion order.
	fn set_cookie_headers(&self) -> Vec<String>;

	/// Replaces the accumulated `Set-Cookie` values wholesale.
	fn replace_set_cookie_headers(&mut self, headers: Vec<String>);
}

impl InboundCookies for HeaderMap {
	fn cookie_header(&self) -> Option<&str> {
		self.get(COOKIE).and_then(|value| value.to_str().ok())
	}

	/// A bare header map has no TLS handle; honor the forwarded-protocol
	/// hint a terminating proxy leaves behind.
	fn is_encrypted(&self) -> bool {
		self.get("x-forwarded-proto")
			.and_then(|value| value.to_str().ok())
			.is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
	}
}

impl OutboundCookies for HeaderMap {
	fn set_cookie_headers(&self) -> Vec<String> {
		self.get_all(SET_COOKIE)
			.iter()
			.filter_map(|value| value.to_str().ok())
			.map(str::to_owned)
			.collect()
	}

	fn replace_set_cookie_headers(&mut self, headers: Vec<String>) {
		self.remove(SET_COOKIE);
		for header in headers {
			match HeaderValue::from_str(&header) {
				Ok(value) => {
					self.append(SET_COOKIE, value);
				}
				Err(_) => {
					// Only reachable for obs-text values; everything the
					// jar renders is already field-content validated.
					tracing::warn!(header = %header, "dropping unrepresentable Set-Cookie value");
				}
			}
		}
	}
}
