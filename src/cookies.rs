//! Cookie attribute values, the exchange-bound jar, and the collaborator
//! traits.

pub use grappelli_cookies::*;
