//! Signature cookies end to end: emission, verification, tamper handling,
//! and key-rotation freshening.

use std::sync::Arc;

use hyper::HeaderMap;
use hyper::header::COOKIE;

use grappelli_cookies::{Cookies, CookieAttributes, Error, JarOptions, OutboundCookies, SetOptions};
use grappelli_keys::KeyRing;

fn keys(secrets: &[&str]) -> JarOptions {
	JarOptions::with_keys(Arc::new(KeyRing::new(secrets).unwrap()))
}

fn request_with(header: &str) -> HeaderMap {
	let mut request = HeaderMap::new();
	request.insert(COOKIE, header.parse().unwrap());
	request
}

#[test]
fn set_emits_the_signature_sibling() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	cookies.set("foo", Some("bar"), &SetOptions::default()).unwrap();

	assert_eq!(
		response.set_cookie_headers(),
		vec![
			"foo=bar; path=/; httponly",
			"foo.sig=iW2fuCIzk9Cg_rqLT1CAqrtdWs8; path=/; httponly",
		]
	);
}

#[test]
fn set_signs_with_the_first_key() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(
		&request,
		&mut response,
		keys(&["keyboard cat a", "keyboard cat b"]),
	);

	cookies.set("foo", Some("bar"), &SetOptions::default()).unwrap();

	let headers = response.set_cookie_headers();
	assert_eq!(headers[1], "foo.sig=tecF04p5ua6TnfYxUTDskgWSKJE; path=/; httponly");
}

#[test]
fn set_without_keys_fails_when_signing_requested() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::new(&request, &mut response);

	let options = SetOptions {
		signed: Some(true),
		..Default::default()
	};
	let err = cookies.set("foo", Some("bar"), &options).unwrap_err();

	assert_eq!(err, Error::KeysRequired);
}

#[test]
fn explicit_unsigned_set_skips_the_sibling() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	let options = SetOptions {
		signed: Some(false),
		..Default::default()
	};
	cookies.set("foo", Some("bar"), &options).unwrap();

	assert_eq!(response.set_cookie_headers(), vec!["foo=bar; path=/; httponly"]);
}

#[test]
fn signature_sibling_follows_the_cookie_attributes() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	let options = SetOptions {
		attrs: CookieAttributes {
			path: Some("/admin".to_owned()),
			..Default::default()
		},
		..Default::default()
	};
	cookies.set("foo", Some("bar"), &options).unwrap();

	let headers = response.set_cookie_headers();
	assert_eq!(headers.len(), 2);
	assert!(headers[0].contains("; path=/admin"));
	assert!(headers[1].starts_with("foo.sig="));
	assert!(headers[1].contains("; path=/admin"));
}

#[test]
fn signed_deletion_deletes_both_cookies() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	cookies.set("foo", None, &SetOptions::default()).unwrap();

	let headers = response.set_cookie_headers();
	assert_eq!(headers.len(), 2);
	assert!(headers[0].starts_with("foo=;"));
	assert!(headers[0].contains("expires=Thu, 01 Jan 1970 00:00:00 GMT"));
	assert!(headers[1].starts_with("foo.sig="));
	assert!(headers[1].contains("expires=Thu, 01 Jan 1970 00:00:00 GMT"));
}

#[test]
fn overwrite_applies_to_both_cookies() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	cookies.set("foo", Some("bar"), &SetOptions::default()).unwrap();
	let options = SetOptions {
		attrs: CookieAttributes {
			overwrite: Some(true),
			..Default::default()
		},
		..Default::default()
	};
	cookies.set("foo", Some("baz"), &options).unwrap();

	assert_eq!(
		response.set_cookie_headers(),
		vec![
			"foo=baz; path=/; httponly",
			"foo.sig=ptOkbbiPiGfLWRzz1yXP3XqaW4E; path=/; httponly",
		]
	);
}

#[test]
fn get_verifies_a_current_signature() {
	let request = request_with("foo=bar; foo.sig=iW2fuCIzk9Cg_rqLT1CAqrtdWs8");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	assert_eq!(cookies.get("foo").unwrap(), Some("bar".to_owned()));
	// verified against the current key: nothing queued
	assert!(response.set_cookie_headers().is_empty());
}

#[test]
fn get_without_signature_cookie_returns_none() {
	let request = request_with("foo=bar");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	assert_eq!(cookies.get("foo").unwrap(), None);
	assert!(response.set_cookie_headers().is_empty());
}

#[test]
fn get_unsigned_still_reads_the_raw_value() {
	let request = request_with("foo=bar");
	let mut response = HeaderMap::new();
	let cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	assert_eq!(cookies.get_unsigned("foo"), Some("bar".to_owned()));
}

#[test]
fn get_signed_without_keys_is_a_configuration_error() {
	let request = request_with("foo=bar; foo.sig=iW2fuCIzk9Cg_rqLT1CAqrtdWs8");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::new(&request, &mut response);

	assert_eq!(cookies.get_signed("foo").unwrap_err(), Error::KeysRequired);
}

#[test]
fn tampered_signature_yields_none_and_drops_the_sibling() {
	let request = request_with("foo=bar; foo.sig=v5f380JakwVgx2H9B9nA6kJaZNg");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	assert_eq!(cookies.get("foo").unwrap(), None);

	assert_eq!(
		response.set_cookie_headers(),
		vec!["foo.sig=; path=/; expires=Thu, 01 Jan 1970 00:00:00 GMT; httponly"]
	);
}

#[test]
fn tampered_value_yields_none() {
	// signature is valid for foo=bar, not for foo=evil
	let request = request_with("foo=evil; foo.sig=iW2fuCIzk9Cg_rqLT1CAqrtdWs8");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	assert_eq!(cookies.get("foo").unwrap(), None);
	assert_eq!(response.set_cookie_headers().len(), 1);
}

#[test]
fn rotated_key_still_verifies_and_freshens_the_signature() {
	let request = request_with("foo=bar; foo.sig=NzdRHeORj7MtAMhSsILYRsyVNI8");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(
		&request,
		&mut response,
		keys(&["keyboard cat a", "keyboard cat b"]),
	);

	assert_eq!(cookies.get("foo").unwrap(), Some("bar".to_owned()));

	assert_eq!(
		response.set_cookie_headers(),
		vec!["foo.sig=tecF04p5ua6TnfYxUTDskgWSKJE; path=/; httponly"]
	);
}

#[test]
fn quoted_values_verify_against_the_unquoted_payload() {
	// the signature covers foo=bar, the header carries foo="bar"
	let request = request_with("foo=\"bar\"; foo.sig=iW2fuCIzk9Cg_rqLT1CAqrtdWs8");
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));

	assert_eq!(cookies.get("foo").unwrap(), Some("bar".to_owned()));
}

#[test]
fn round_trip_set_then_get() {
	let request = HeaderMap::new();
	let mut response = HeaderMap::new();
	let mut cookies = Cookies::with_options(&request, &mut response, keys(&["keyboard cat"]));
	cookies.set("foo", Some("bar"), &SetOptions::default()).unwrap();

	// replay the queued pair as the next request's Cookie header
	let pairs: Vec<String> = response
		.set_cookie_headers()
		.iter()
		.map(|header| header.split(';').next().unwrap().to_owned())
		.collect();
	let next_request = request_with(&pairs.join("; "));
	let mut next_response = HeaderMap::new();
	let mut next_cookies =
		Cookies::with_options(&next_request, &mut next_response, keys(&["keyboard cat"]));

	assert_eq!(next_cookies.get("foo").unwrap(), Some("bar".to_owned()));
}
