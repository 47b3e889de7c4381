//! The cookie jar: reads the inbound `Cookie` header, accumulates outbound
//! `Set-Cookie` headers, and handles signature verification with rotation.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use grappelli_keys::KeyRing;
use regex::Regex;

use crate::cookie::{Cookie, CookieAttributes};
use crate::error::{Error, Result};
use crate::exchange::{InboundCookies, OutboundCookies};

/// Process-wide cache of per-name value-extraction patterns.
///
/// Cookie names are a small, low-cardinality set in practice, so the cache
/// grows once per distinct name and is never evicted. Compilation is pure,
/// so a racing double-compute is harmless.
static PATTERNS: LazyLock<DashMap<String, Regex>> = LazyLock::new(DashMap::new);

/// Matches `name=value` at header start or after a `;`, capturing the value
/// up to the next `;`. The name is matched literally, metacharacters and all.
fn value_pattern(name: &str) -> Regex {
	PATTERNS
		.entry(name.to_owned())
		.or_insert_with(|| {
			Regex::new(&format!("(?:^|;) *{}=([^;]*)", regex::escape(name)))
				.expect("escaped cookie name always compiles")
		})
		.clone()
}

/// A quoted capture is unwrapped only when the quotes actually pair up;
/// a stray quote is somebody else's bug and passes through verbatim.
fn unquote(value: &str) -> &str {
	value
		.strip_prefix('"')
		.and_then(|inner| inner.strip_suffix('"'))
		.unwrap_or(value)
}

/// Jar construction options.
#[derive(Debug, Clone, Default)]
pub struct JarOptions {
	/// Rotation-ordered signing keys. Presence makes `get`/`set` signed by
	/// default.
	pub keys: Option<Arc<KeyRing>>,
	/// Overrides the connection's encryption signal for send-time `secure`
	/// resolution.
	pub secure: Option<bool>,
}

impl JarOptions {
	/// Options carrying a shared key ring.
	pub fn with_keys(keys: Arc<KeyRing>) -> Self {
		Self {
			keys: Some(keys),
			secure: None,
		}
	}
}

/// Per-`set` options: the cookie attributes plus the signing override.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
	/// Explicitly sign (or not). Absent means "signed iff the jar holds
	/// keys".
	pub signed: Option<bool>,
	pub attrs: CookieAttributes,
}

/// Cookie access bound to one request/response exchange.
///
/// A jar lives exactly as long as the exchange it was built for; the only
/// state it accumulates is the outbound `Set-Cookie` list on the response
/// collaborator. One jar per exchange — concurrent exchanges each get their
/// own.
///
/// # Examples
///
/// ```
/// use hyper::HeaderMap;
/// use grappelli_cookies::{Cookies, SetOptions};
///
/// let request = HeaderMap::new();
/// let mut response = HeaderMap::new();
///
/// let mut cookies = Cookies::new(&request, &mut response);
/// cookies.set("foo", Some("bar"), &SetOptions::default())?;
///
/// assert_eq!(response["set-cookie"], "foo=bar; path=/; httponly");
/// # Ok::<(), grappelli_cookies::Error>(())
/// ```
///
/// With keys, `set` also emits the `.sig` sibling and `get` verifies it:
///
/// ```
/// use std::sync::Arc;
/// use hyper::HeaderMap;
/// use grappelli_cookies::{Cookies, JarOptions, SetOptions};
/// use grappelli_keys::KeyRing;
///
/// let keys = Arc::new(KeyRing::new(["keyboard cat"])?);
/// let request = HeaderMap::new();
/// let mut response = HeaderMap::new();
///
/// let mut cookies = Cookies::with_options(&request, &mut response, JarOptions::with_keys(keys));
/// cookies.set("foo", Some("bar"), &SetOptions::default())?;
///
/// let headers: Vec<_> = response.get_all("set-cookie").iter().collect();
/// assert_eq!(headers.len(), 2);
/// assert_eq!(headers[1], "foo.sig=iW2fuCIzk9Cg_rqLT1CAqrtdWs8; path=/; httponly");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Cookies<'e> {
	request: &'e dyn InboundCookies,
	response: &'e mut dyn OutboundCookies,
	keys: Option<Arc<KeyRing>>,
	secure: Option<bool>,
}

impl std::fmt::Debug for Cookies<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Cookies")
			.field("keys", &self.keys)
			.field("secure", &self.secure)
			.finish_non_exhaustive()
	}
}

impl<'e> Cookies<'e> {
	/// Binds a jar to an exchange with no keys and no secure override.
	pub fn new(request: &'e dyn InboundCookies, response: &'e mut dyn OutboundCookies) -> Self {
		Self::with_options(request, response, JarOptions::default())
	}

	/// Binds a jar to an exchange.
	pub fn with_options(
		request: &'e dyn InboundCookies,
		response: &'e mut dyn OutboundCookies,
		options: JarOptions,
	) -> Self {
		Self {
			request,
			response,
			keys: options.keys,
			secure: options.secure,
		}
	}

	/// Returns the inbound cookie's value under the default signing rule:
	/// signed when the jar holds keys, unsigned otherwise.
	///
	/// # Examples
	///
	/// ```
	/// use hyper::HeaderMap;
	/// use hyper::header::COOKIE;
	/// use grappelli_cookies::Cookies;
	///
	/// let mut request = HeaderMap::new();
	/// request.insert(COOKIE, "foo=bar; fizz=buzz".parse().unwrap());
	/// let mut response = HeaderMap::new();
	///
	/// let mut cookies = Cookies::new(&request, &mut response);
	/// assert_eq!(cookies.get("foo")?, Some("bar".to_owned()));
	/// assert_eq!(cookies.get("missing")?, None);
	/// # Ok::<(), grappelli_cookies::Error>(())
	/// ```
	pub fn get(&mut self, name: &str) -> Result<Option<String>> {
		if self.keys.is_some() {
			self.get_signed(name)
		} else {
			Ok(self.get_unsigned(name))
		}
	}

	/// Returns the raw inbound value without signature verification.
	///
	/// A value wrapped in a matching pair of double quotes is unquoted.
	pub fn get_unsigned(&self, name: &str) -> Option<String> {
		let header = self.request.cookie_header()?;
		let pattern = value_pattern(name);
		let captures = pattern.captures(header)?;
		Some(unquote(captures.get(1).map_or("", |m| m.as_str())).to_owned())
	}

	/// Returns the inbound value only if its `.sig` sibling verifies
	/// against some key in the ring.
	///
	/// Verification outcomes:
	/// - no cookie, or no `.sig` sibling: `Ok(None)`, no side effect;
	/// - signature matches no key: `Ok(None)` and a `.sig` deletion is
	///   queued on the response;
	/// - signature matches the current key: the value, no side effect;
	/// - signature matches a rotated key: the value, and a best-effort
	///   `.sig` refresh under the current key is queued.
	///
	/// Fails with [`Error::KeysRequired`] when the jar holds no keys and
	/// both cookies are present.
	pub fn get_signed(&mut self, name: &str) -> Result<Option<String>> {
		let Some(value) = self.get_unsigned(name) else {
			return Ok(None);
		};

		let sig_name = format!("{name}.sig");
		let Some(remote) = self.get_unsigned(&sig_name) else {
			return Ok(None);
		};

		let keys = self.keys.clone().ok_or(Error::KeysRequired)?;
		let data = format!("{name}={value}");

		match keys.index(&data, &remote) {
			None => {
				tracing::debug!(cookie = name, "signature matched no key, dropping it");
				self.set(
					&sig_name,
					None,
					&SetOptions {
						signed: Some(false),
						attrs: CookieAttributes {
							path: Some("/".to_owned()),
							..CookieAttributes::default()
						},
					},
				)?;
				Ok(None)
			}
			Some(0) => Ok(Some(value)),
			Some(position) => {
				tracing::debug!(cookie = name, position, "refreshing stale signature");
				let fresh = keys.sign(&data);
				self.set(
					&sig_name,
					Some(&fresh),
					&SetOptions {
						signed: Some(false),
						attrs: CookieAttributes::default(),
					},
				)?;
				Ok(Some(value))
			}
		}
	}

	/// Queues one `Set-Cookie` header for the cookie (and one for its
	/// `.sig` sibling when signing applies). Returns the jar for chaining.
	///
	/// `None` or an empty value queues a deletion instead. The `secure`
	/// attribute resolves in order: explicit attribute, jar-level override,
	/// the collaborator's encryption signal.
	pub fn set(&mut self, name: &str, value: Option<&str>, options: &SetOptions) -> Result<&mut Self> {
		let signed = options.signed.unwrap_or(self.keys.is_some());

		let mut attrs = options.attrs.clone();
		if attrs.secure.is_none() {
			attrs.secure = Some(self.secure.unwrap_or_else(|| self.request.is_encrypted()));
		}
		let cookie = Cookie::new(name, value, &attrs)?;

		let mut headers = self.response.set_cookie_headers();
		push_cookie(&mut headers, &cookie);

		if signed {
			let keys = self.keys.as_ref().ok_or(Error::KeysRequired)?;
			// Sign the canonical pair, not the rendered header.
			let sibling = cookie.signature_sibling(keys.sign(&cookie.to_string()));
			push_cookie(&mut headers, &sibling);
		}

		self.response.replace_set_cookie_headers(headers);
		Ok(self)
	}
}

/// Overwrite policy: a cookie flagged `overwrite` evicts every queued
/// header for the same name (exact-name prefix match, order preserved)
/// before being appended; otherwise same-name cookies coexist and the
/// client sorts them out.
fn push_cookie(headers: &mut Vec<String>, cookie: &Cookie) {
	if cookie.overwrite() {
		let prefix = format!("{}=", cookie.name());
		headers.retain(|header| !header.starts_with(&prefix));
	}
	headers.push(cookie.to_header());
}
