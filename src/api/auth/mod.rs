//! Digest authentication subsystem.
//!
//! `nonce` owns the only shared mutable state, `parser` and `verifier` are
//! pure, and `gate` wires them into the per-request decision.

pub mod gate;
pub mod nonce;
pub mod parser;
pub mod users;
pub mod verifier;

pub use self::gate::{require_digest_auth, AuthGate, AuthIdentity, AuthOutcome, DenyReason};
pub use self::nonce::{Clock, NonceStore, SystemClock};
pub use self::parser::{DigestCredential, ParseError};
pub use self::users::{StaticUserStore, UserLookup, UserRecord};
