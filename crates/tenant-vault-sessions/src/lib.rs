//! # tenant-vault-sessions
//!
//! Stateless bearer tokens proving a single tenant identity.
//!
//! Tokens are HMAC-signed JWTs carrying `{sub, iss, iat, exp, exp_ms}`. Nothing is
//! persisted: a token is valid exactly when its signature verifies under the
//! configured key and algorithm and the injected clock has not passed `exp_ms`.

#![warn(clippy::all)]

pub mod clock;
mod codec;
pub mod errors;
pub mod types;


pub use clock::{Clock, ManualClock, SystemClock};
pub use codec::{TokenCodec, MIN_KEY_LENGTH};
pub use jsonwebtoken::Algorithm;
pub use errors::*;
pub use types::*;
