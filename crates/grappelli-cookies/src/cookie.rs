//! Outbound cookie representation and `Set-Cookie` rendering.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use std::time::{Duration, SystemTime};

use regex::Regex;

use crate::error::{Error, Result};

/// RFC 7230 field-content: visible ASCII, space, horizontal tab, obs-text.
static FIELD_CONTENT: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[\x09\x20-\x7e\x80-\xff]+$").expect("valid regex"));

fn is_field_content(value: &str) -> bool {
	FIELD_CONTENT.is_match(value)
}

/// `SameSite` cookie attribute value.
///
/// Rendered lowercase (`samesite=strict` and so on). Absent means the
/// attribute is not emitted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
	/// Cookie only sent in first-party context
	Strict,
	/// Cookie sent with top-level navigation
	Lax,
	/// Cookie sent in all contexts (requires Secure)
	None,
}

impl SameSite {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Strict => "strict",
			Self::Lax => "lax",
			Self::None => "none",
		}
	}
}

impl FromStr for SameSite {
	type Err = Error;

	/// Case-insensitive: `"Lax"`, `"LAX"` and `"lax"` all parse.
	fn from_str(s: &str) -> Result<Self> {
		if s.eq_ignore_ascii_case("strict") {
			Ok(Self::Strict)
		} else if s.eq_ignore_ascii_case("lax") {
			Ok(Self::Lax)
		} else if s.eq_ignore_ascii_case("none") {
			Ok(Self::None)
		} else {
			Err(Error::InvalidOption("same_site"))
		}
	}
}

/// `Priority` cookie attribute value, rendered lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
	Low,
	Medium,
	High,
}

impl Priority {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Medium => "medium",
			Self::High => "high",
		}
	}
}

impl FromStr for Priority {
	type Err = Error;

	/// Case-insensitive: `"HIGH"` parses to [`Priority::High`].
	fn from_str(s: &str) -> Result<Self> {
		if s.eq_ignore_ascii_case("low") {
			Ok(Self::Low)
		} else if s.eq_ignore_ascii_case("medium") {
			Ok(Self::Medium)
		} else if s.eq_ignore_ascii_case("high") {
			Ok(Self::High)
		} else {
			Err(Error::InvalidOption("priority"))
		}
	}
}

/// Caller-supplied cookie attributes.
///
/// Every field is optional; an absent field keeps the built-in default
/// (`path = "/"`, `http_only = true`, everything else off). [`Cookie::new`]
/// merges these over the defaults and validates the result.
#[derive(Debug, Clone, Default)]
pub struct CookieAttributes {
	/// Cookie path; empty string suppresses the attribute entirely.
	pub path: Option<String>,
	/// Cookie domain (no default).
	pub domain: Option<String>,
	/// Absolute expiry. Ignored at render time when a positive `max_age`
	/// is present.
	pub expires: Option<SystemTime>,
	/// Lifetime in milliseconds from render time. Must be finite.
	pub max_age: Option<f64>,
	/// Only send over HTTPS. When absent the jar resolves it from its own
	/// default or the connection's encryption signal.
	pub secure: Option<bool>,
	/// Hide from client-side script. Defaults to true.
	pub http_only: Option<bool>,
	pub same_site: Option<SameSite>,
	pub partitioned: Option<bool>,
	pub priority: Option<Priority>,
	/// Replace previously queued cookies of the same name.
	pub overwrite: Option<bool>,
}

/// One outbound cookie: a validated name/value pair plus attributes.
///
/// Valid upon construction and immutable thereafter. Rendering with
/// [`Cookie::to_header`] produces exactly one `Set-Cookie` header value.
///
/// # Examples
///
/// ```
/// use grappelli_cookies::{Cookie, CookieAttributes};
///
/// let cookie = Cookie::new("foo", Some("bar"), &CookieAttributes::default())?;
/// assert_eq!(cookie.to_header(), "foo=bar; path=/; httponly");
/// # Ok::<(), grappelli_cookies::Error>(())
/// ```
///
/// An absent or empty value is a deletion request: the value renders empty
/// and the expiry is pinned to the Unix epoch regardless of other options.
///
/// ```
/// use grappelli_cookies::{Cookie, CookieAttributes};
///
/// let cookie = Cookie::new("foo", None, &CookieAttributes::default())?;
/// assert_eq!(
///     cookie.to_header(),
///     "foo=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT; httponly",
/// );
/// # Ok::<(), grappelli_cookies::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Cookie {
	name: String,
	value: String,
	path: String,
	domain: Option<String>,
	expires: Option<SystemTime>,
	max_age: Option<f64>,
	secure: bool,
	http_only: bool,
	same_site: Option<SameSite>,
	partitioned: bool,
	priority: Option<Priority>,
	overwrite: bool,
}

impl Cookie {
	/// Validates and builds a cookie.
	///
	/// The name must match field-content and contain neither `;` nor `=`;
	/// a non-empty value must match field-content and contain no `;`.
	/// Attribute validation failures name the offending attribute.
	pub fn new(name: impl Into<String>, value: Option<&str>, attrs: &CookieAttributes) -> Result<Self> {
		let name = name.into();
		if !is_field_content(&name) || name.contains(';') || name.contains('=') {
			return Err(Error::InvalidArgument("name"));
		}

		let value = value.unwrap_or("");
		if !value.is_empty() && (!is_field_content(value) || value.contains(';')) {
			return Err(Error::InvalidArgument("value"));
		}
		let deleting = value.is_empty();

		let mut cookie = Self {
			name,
			value: value.to_owned(),
			path: "/".to_owned(),
			domain: None,
			expires: None,
			max_age: None,
			secure: false,
			http_only: true,
			same_site: None,
			partitioned: false,
			priority: None,
			overwrite: false,
		};
		cookie.merge(attrs);

		// Deletion wins over whatever expiry the caller supplied.
		if deleting {
			cookie.expires = Some(SystemTime::UNIX_EPOCH);
			cookie.max_age = None;
		}

		if !cookie.path.is_empty() && !is_field_content(&cookie.path) {
			return Err(Error::InvalidOption("path"));
		}
		if let Some(domain) = &cookie.domain
			&& !is_field_content(domain)
		{
			return Err(Error::InvalidOption("domain"));
		}
		if let Some(max_age) = cookie.max_age
			&& !max_age.is_finite()
		{
			return Err(Error::InvalidOption("max_age"));
		}

		Ok(cookie)
	}

	// Merge caller attributes over the defaults, skipping absent fields.
	fn merge(&mut self, attrs: &CookieAttributes) {
		if let Some(path) = &attrs.path {
			self.path = path.clone();
		}
		if let Some(domain) = &attrs.domain {
			self.domain = Some(domain.clone());
		}
		if let Some(expires) = attrs.expires {
			self.expires = Some(expires);
		}
		if let Some(max_age) = attrs.max_age {
			self.max_age = Some(max_age);
		}
		if let Some(secure) = attrs.secure {
			self.secure = secure;
		}
		if let Some(http_only) = attrs.http_only {
			self.http_only = http_only;
		}
		if let Some(same_site) = attrs.same_site {
			self.same_site = Some(same_site);
		}
		if let Some(partitioned) = attrs.partitioned {
			self.partitioned = partitioned;
		}
		if let Some(priority) = attrs.priority {
			self.priority = Some(priority);
		}
		if let Some(overwrite) = attrs.overwrite {
			self.overwrite = overwrite;
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn value(&self) -> &str {
		&self.value
	}

	/// Empty value marks a deletion cookie.
	pub fn is_deletion(&self) -> bool {
		self.value.is_empty()
	}

	pub fn path(&self) -> &str {
		&self.path
	}

	pub fn domain(&self) -> Option<&str> {
		self.domain.as_deref()
	}

	pub fn expires(&self) -> Option<SystemTime> {
		self.expires
	}

	pub fn max_age(&self) -> Option<f64> {
		self.max_age
	}

	pub fn secure(&self) -> bool {
		self.secure
	}

	pub fn http_only(&self) -> bool {
		self.http_only
	}

	pub fn same_site(&self) -> Option<SameSite> {
		self.same_site
	}

	pub fn partitioned(&self) -> bool {
		self.partitioned
	}

	pub fn priority(&self) -> Option<Priority> {
		self.priority
	}

	pub fn overwrite(&self) -> bool {
		self.overwrite
	}

	/// Renders the `Set-Cookie` header value.
	///
	/// Attribute order is fixed for wire compatibility: path, expires,
	/// domain, priority, samesite, secure, httponly, partitioned. A positive
	/// `max_age` recomputes the rendered expiry from the current clock, so
	/// it always wins over a stored `expires`. No `Max-Age` attribute is
	/// ever emitted.
	pub fn to_header(&self) -> String {
		let mut header = self.to_string();

		let expires = match self.max_age {
			Some(ms) if ms > 0.0 => Some(SystemTime::now() + Duration::from_millis(ms as u64)),
			_ => self.expires,
		};

		if !self.path.is_empty() {
			header.push_str("; path=");
			header.push_str(&self.path);
		}
		if let Some(expires) = expires {
			header.push_str("; expires=");
			header.push_str(&httpdate::fmt_http_date(expires));
		}
		if let Some(domain) = &self.domain {
			header.push_str("; domain=");
			header.push_str(domain);
		}
		if let Some(priority) = self.priority {
			header.push_str("; priority=");
			header.push_str(priority.as_str());
		}
		if let Some(same_site) = self.same_site {
			header.push_str("; samesite=");
			header.push_str(same_site.as_str());
		}
		if self.secure {
			header.push_str("; secure");
		}
		if self.http_only {
			header.push_str("; httponly");
		}
		if self.partitioned {
			header.push_str("; partitioned");
		}

		header
	}

	/// The signature sibling: same attributes, `.sig`-suffixed name, the
	/// signature as value. A new instance; `self` is untouched. The value
	/// needs no re-validation since digests are url-safe base64.
	pub(crate) fn signature_sibling(&self, signature: String) -> Self {
		let mut sibling = self.clone();
		sibling.name = format!("{}.sig", self.name);
		sibling.value = signature;
		sibling
	}
}

impl fmt::Display for Cookie {
	/// The canonical `name=value` pair — also the signed payload.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}={}", self.name, self.value)
	}
}
