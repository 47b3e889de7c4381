//! # Grappelli Keys
//!
//! Rotation-ordered keyed-hash signing.
//!
//! A [`KeyRing`] holds an ordered list of secrets. The first secret is the
//! current one and produces every new signature; older secrets remain in the
//! ring so signatures minted before a rotation still verify. [`KeyRing::index`]
//! reports which secret matched, letting callers detect stale signatures and
//! re-sign with the current secret.
//!
//! Digests are HMAC over the payload, encoded as url-safe base64 without
//! padding (27 characters for SHA-1, 43 for SHA-256).
//!
//! ## Example
//!
//! ```
//! use grappelli_keys::KeyRing;
//!
//! let ring = KeyRing::new(["keyboard cat"])?;
//! assert_eq!(ring.sign("foo=bar"), "iW2fuCIzk9Cg_rqLT1CAqrtdWs8");
//! assert!(ring.verify("foo=bar", "iW2fuCIzk9Cg_rqLT1CAqrtdWs8"));
//! # Ok::<(), grappelli_keys::KeyRingError>(())
//! ```

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Digest algorithm used for signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
	/// HMAC-SHA1. The default; wire-compatible with existing 27-character
	/// signature cookies.
	#[default]
	Sha1,
	/// HMAC-SHA256. Stronger digests for deployments without legacy
	/// signatures in the wild.
	Sha256,
}

/// Key ring construction error.
#[derive(Debug, Error)]
pub enum KeyRingError {
	/// The secret list was empty.
	#[error("keys must be provided and non-empty")]
	EmptyKeys,
}

/// An ordered ring of signing secrets.
///
/// Index 0 is the current secret. Rotation is prepending a new secret and
/// keeping the old ones around until their signatures have aged out.
#[derive(Clone)]
pub struct KeyRing {
	keys: Vec<Vec<u8>>,
	algorithm: Algorithm,
}

impl KeyRing {
	/// Builds a ring from rotation-ordered secrets using the default
	/// algorithm.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_keys::KeyRing;
	///
	/// let ring = KeyRing::new(["current secret", "previous secret"])?;
	/// assert_eq!(ring.len(), 2);
	/// # Ok::<(), grappelli_keys::KeyRingError>(())
	/// ```
	pub fn new<I, K>(secrets: I) -> Result<Self, KeyRingError>
	where
		I: IntoIterator<Item = K>,
		K: AsRef<[u8]>,
	{
		Self::with_algorithm(secrets, Algorithm::default())
	}

	/// Builds a ring with an explicit digest algorithm.
	pub fn with_algorithm<I, K>(secrets: I, algorithm: Algorithm) -> Result<Self, KeyRingError>
	where
		I: IntoIterator<Item = K>,
		K: AsRef<[u8]>,
	{
		let keys: Vec<Vec<u8>> = secrets.into_iter().map(|k| k.as_ref().to_vec()).collect();
		if keys.is_empty() {
			return Err(KeyRingError::EmptyKeys);
		}
		Ok(Self { keys, algorithm })
	}

	/// Number of secrets in the ring.
	pub fn len(&self) -> usize {
		self.keys.len()
	}

	/// Always false; construction rejects empty rings.
	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	/// Signs `data` with the current (first) secret.
	pub fn sign(&self, data: &str) -> String {
		self.sign_with(&self.keys[0], data.as_bytes())
	}

	/// Returns the rotation position of the first secret whose signature
	/// over `data` matches `digest`, or `None` when no secret matches.
	///
	/// Position 0 means the signature is current; anything above 0 means it
	/// was minted under a rotated-out secret and should be refreshed.
	///
	/// # Examples
	///
	/// ```
	/// use grappelli_keys::KeyRing;
	///
	/// let old = KeyRing::new(["keyboard cat b"])?;
	/// let ring = KeyRing::new(["keyboard cat a", "keyboard cat b"])?;
	///
	/// let stale = old.sign("foo=bar");
	/// assert_eq!(ring.index("foo=bar", &stale), Some(1));
	/// assert_eq!(ring.index("foo=bar", &ring.sign("foo=bar")), Some(0));
	/// assert_eq!(ring.index("foo=bar", "bogus"), None);
	/// # Ok::<(), grappelli_keys::KeyRingError>(())
	/// ```
	pub fn index(&self, data: &str, digest: &str) -> Option<usize> {
		self.keys
			.iter()
			.position(|key| constant_time_eq(&self.sign_with(key, data.as_bytes()), digest))
	}

	/// True when any secret in the ring produced `digest` for `data`.
	pub fn verify(&self, data: &str, digest: &str) -> bool {
		self.index(data, digest).is_some()
	}

	fn sign_with(&self, key: &[u8], data: &[u8]) -> String {
		let digest = match self.algorithm {
			Algorithm::Sha1 => {
				let mut mac =
					Hmac::<Sha1>::new_from_slice(key).expect("hmac accepts keys of any length");
				mac.update(data);
				mac.finalize().into_bytes().to_vec()
			}
			Algorithm::Sha256 => {
				let mut mac =
					Hmac::<Sha256>::new_from_slice(key).expect("hmac accepts keys of any length");
				mac.update(data);
				mac.finalize().into_bytes().to_vec()
			}
		};
		URL_SAFE_NO_PAD.encode(digest)
	}
}

impl std::fmt::Debug for KeyRing {
	// Secrets stay out of logs and panic messages.
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("KeyRing")
			.field("keys", &self.keys.len())
			.field("algorithm", &self.algorithm)
			.finish()
	}
}

fn constant_time_eq(a: &str, b: &str) -> bool {
	a.as_bytes().ct_eq(b.as_bytes()).into()
}
