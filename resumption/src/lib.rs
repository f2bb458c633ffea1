//! # tls-resumption
//!
//! TLS session resumption via session tickets: serializing a connection's
//! resumption state, sealing it into an opaque ticket under a rotating
//! named key, and later authenticating, opening and parsing tickets that
//! come back from the peer.
//!
//! ## Overview
//!
//! A server issues a ticket like this:
//!
//! ```text
//! connection secrets -> serialize_resumption_state -> TicketKeyStore (seal) -> ticket bytes
//! ```
//!
//! and resumes from one like this:
//!
//! ```text
//! ticket bytes -> TicketKeyStore (open) -> server_deserialize -> connection secrets / PskList
//! ```
//!
//! Tickets carry one of two layouts.  TLS1.2 tickets hold the 48-byte
//! master secret; TLS1.3 tickets hold a length-prefixed session secret and
//! an age obfuscator, and become a resumption [`Psk`] when accepted.
//!
//! Everything a peer can influence is parsed through a bounds-checked
//! reader.  A malformed, forged, stale or mismatched ticket is refused
//! with [`Resumption::FullHandshake`]; it never ends the connection.
//!
//! ## Getting started
//!
//! ```
//! use std::sync::Arc;
//! use tls_resumption::{cipher_suite, Config, Connection, ProtocolVersion, Resumption, Side};
//!
//! let mut config = Config::new();
//! config.session_tickets = true;
//! config
//!     .ticket_keys
//!     .add_key(b"2016.07.26.15", b"a very secret ticket key", 0)
//!     .unwrap();
//! let config = Arc::new(config);
//!
//! let mut issuer = Connection::new(Side::Server, Arc::clone(&config));
//! issuer.actual_protocol_version = ProtocolVersion::TLSv1_2;
//! issuer.secure.cipher_suite = Some(cipher_suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256);
//! let ticket = issuer.issue_session_ticket(None).unwrap().unwrap();
//!
//! let mut resumer = Connection::new(Side::Server, config);
//! resumer.actual_protocol_version = ProtocolVersion::TLSv1_2;
//! resumer.secure.cipher_suite = Some(cipher_suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256);
//! assert_eq!(resumer.try_resume(&ticket).unwrap(), Resumption::Resumed);
//! ```
//!
//! ## Crate features
//!
//! - `logging`: this makes the crate depend on the `log` crate.
//!   Ticket rejections are logged at debug level and key store
//!   maintenance at trace level.  No secret is ever logged.
//!   This feature is in the default set.

// Require docs for public APIs, deny unsafe code, etc.
#![forbid(unsafe_code, unused_must_use)]
#![deny(
    clippy::clone_on_ref_ptr,
    clippy::use_self,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_extern_crates
)]
#![warn(missing_docs, unreachable_pub, unused_qualifications)]
// Relax these clippy lints:
// - new_without_default: for internal constructors, the indirection is not
//   helpful
// - single_component_path_imports: our top-level `use log` import causes
//   a false positive, https://github.com/rust-lang/rust-clippy/issues/5210
#![allow(clippy::new_without_default, clippy::single_component_path_imports)]
// Enable documentation for all features on docs.rs
#![cfg_attr(docsrs, feature(doc_cfg))]

// log for logging (optional).
#[cfg(feature = "logging")]
use log;

#[cfg(not(feature = "logging"))]
mod log {
    macro_rules! trace    ( ($($tt:tt)*) => {{}} );
    macro_rules! debug    ( ($($tt:tt)*) => {{}} );
    macro_rules! warn     ( ($($tt:tt)*) => {{}} );
    pub(crate) use {debug, trace, warn};
}

#[macro_use]
mod msgs;
mod config;
mod conn;
mod enums;
mod error;
mod psk;
mod rand;
mod resume;
mod session_ticket;
mod suites;
mod ticketer;
mod time_provider;

/// Internal classes which may be useful outside the library.
/// The contents of this section DO NOT form part of the stable interface.
#[doc(hidden)]
pub mod internal {
    /// Low-level resumption state parsing and encoding functions.
    pub mod msgs {
        pub use crate::msgs::*;
    }
}

pub use crate::config::{Config, DEFAULT_SESSION_STATE_LIFETIME};
pub use crate::conn::{Connection, Resumption, SecureState, SessionTicketStatus, Side};
pub use crate::enums::{CipherSuite, HashAlgorithm, ProtocolVersion, SerializedFormatVersion};
pub use crate::error::{
    Error, InvalidMessage, InvalidPsk, InvalidSessionState, InvalidTicketKey, SafetyViolation,
};
pub use crate::msgs::persist::{
    MASTER_SECRET_LEN, TLS12_STATE_LEN, TLS13_MAX_STATE_LEN, TLS13_STATE_LEN_WITHOUT_SECRET,
};
pub use crate::psk::{Psk, PskList, PskType};
pub use crate::rand::GetRandomFailed;
pub use crate::resume::{
    client_deserialize_session_state, decrypt_session_ticket, encrypt_session_ticket,
    serialize_resumption_state, tls12_serialize_resumption_state,
    tls13_serialize_resumption_state, TicketFields,
};
pub use crate::session_ticket::{SessionTicket, SessionTicketCallback};
pub use crate::suites::{
    CipherSuiteCommon, SupportedCipherSuite, Tls12CipherSuite, Tls13CipherSuite,
    ALL_CIPHER_SUITES,
};
pub use crate::ticketer::{
    TicketKeyState, TicketKeyStore, DEFAULT_DECRYPT_KEY_LIFETIME,
    DEFAULT_ENCRYPT_DECRYPT_KEY_LIFETIME, MAX_TICKET_KEYS, TICKET_IV_LEN, TICKET_KEY_NAME_LEN,
    TICKET_TAG_LEN, TLS12_TICKET_LEN, TLS13_MAX_TICKET_LEN,
};
pub use crate::time_provider::{DefaultTimeProvider, TimeProvider, UnixTime};

/// All defined ciphersuites appear in this module.
///
/// [`ALL_CIPHER_SUITES`] is provided as an array of all of these values.
pub mod cipher_suite {
    pub use crate::suites::TLS13_AES_128_GCM_SHA256;
    pub use crate::suites::TLS13_AES_256_GCM_SHA384;
    pub use crate::suites::TLS13_CHACHA20_POLY1305_SHA256;
    pub use crate::suites::TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256;
    pub use crate::suites::TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384;
    pub use crate::suites::TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256;
    pub use crate::suites::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256;
    pub use crate::suites::TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384;
    pub use crate::suites::TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256;
    pub use crate::suites::TLS_RSA_WITH_AES_128_GCM_SHA256;
    pub use crate::suites::TLS_RSA_WITH_AES_256_GCM_SHA384;
}

/// Entry points for fuzzing the attacker-reachable parsers.
#[doc(hidden)]
pub mod fuzzing {
    use crate::msgs::codec::Codec;
    use crate::msgs::persist::ResumptionState;

    /// Parse `data` as resumption state, and re-encode anything that parses.
    pub fn fuzz_resumption_state(data: &[u8]) {
        if let Ok(state) = ResumptionState::decode(data) {
            assert_eq!(state.get_encoding(), data);
        }
    }
}
