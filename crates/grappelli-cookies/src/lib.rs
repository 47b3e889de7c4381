//! # Grappelli Cookies
//!
//! Server-side cookie handling for one request/response exchange: parse the
//! inbound `Cookie` header, build outbound `Set-Cookie` headers with exact
//! attribute ordering, and keep values tamper-evident with signature
//! cookies verified against a rotating key ring.
//!
//! ## Overview
//!
//! - [`Cookie`] is one validated outbound cookie; [`CookieAttributes`]
//!   carries the caller's attribute choices over the defaults.
//! - [`Cookies`] is the jar bound to one exchange through the
//!   [`InboundCookies`]/[`OutboundCookies`] collaborator traits (implemented
//!   for `hyper::HeaderMap`).
//! - Signing uses a [`grappelli_keys::KeyRing`]; values signed under a
//!   rotated-out key still verify and get their signature cookie refreshed.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use hyper::HeaderMap;
//! use grappelli_cookies::{Cookies, JarOptions, SetOptions};
//! use grappelli_keys::KeyRing;
//!
//! let keys = Arc::new(KeyRing::new(["current", "previous"])?);
//!
//! let request = HeaderMap::new();
//! let mut response = HeaderMap::new();
//! let mut cookies = Cookies::with_options(&request, &mut response, JarOptions::with_keys(keys));
//!
//! cookies
//!     .set("session", Some("opaque-id"), &SetOptions::default())?
//!     .set("theme", Some("dark"), &SetOptions { signed: Some(false), ..Default::default() })?;
//!
//! assert_eq!(response.get_all("set-cookie").iter().count(), 3);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cookie;
pub mod error;
pub mod exchange;
pub mod jar;

pub use cookie::{Cookie, CookieAttributes, Priority, SameSite};
pub use error::{Error, Result};
pub use exchange::{InboundCookies, OutboundCookies};
pub use jar::{Cookies, JarOptions, SetOptions};
