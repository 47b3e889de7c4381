//! Rotation-ordered keyed-hash signing.

pub use grappelli_keys::*;
