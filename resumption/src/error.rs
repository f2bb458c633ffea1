use core::fmt;
use std::error::Error as StdError;
use std::time::SystemTimeError;

use crate::enums::{CipherSuite, ProtocolVersion};
use crate::rand;

/// This crate reports all failures using this type.
///
/// Nothing here is ever raised as a panic: every failure path returns
/// one of these, and no connection state is updated when one is returned.
#[non_exhaustive]
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
    /// A required argument was absent.  This is a bug in the caller.
    MissingArgument(&'static str),

    /// An internal invariant would have been violated.  This signals a
    /// local construction bug, never attacker-supplied data.
    SafetyViolation(SafetyViolation),

    /// Resumption state could not be parsed.
    InvalidMessage(InvalidMessage),

    /// Resumption state parsed, but may not be used on this connection.
    InvalidSessionState(InvalidSessionState),

    /// A ticket failed authentication.
    DecryptError,

    /// A ticket names a key we do not hold (or no longer hold).
    NoMatchingTicketKey,

    /// No ticket key is currently valid for encryption.
    NoTicketEncryptionKey,

    /// A ticket could not be sealed.
    EncryptError,

    /// A counter would have overflowed.
    IntegerOverflow,

    /// The caller's buffer is smaller than the serialized session data.
    SerializedSessionStateTooLong {
        /// How many bytes the data needs.
        needed: usize,
        /// How many bytes the caller offered.
        available: usize,
    },

    /// A ticket encryption key was rejected by the key store.
    InvalidTicketKey(InvalidTicketKey),

    /// A pre-shared key was rejected.
    InvalidPsk(InvalidPsk),

    /// We failed to figure out what time it currently is.
    FailedToGetCurrentTime,

    /// We failed to acquire random bytes from the system.
    FailedToGetRandomBytes,

    /// A catch-all error for unlikely errors.
    General(String),
}

impl Error {
    /// Returns true if this error means "do not resume, perform a full
    /// handshake instead".
    ///
    /// Malformed tickets, tickets that fail authentication, tickets under
    /// unknown keys and tickets describing incompatible sessions all fall
    /// into this class.  They are attacker-reachable and must never end
    /// the connection.
    pub fn is_ticket_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidMessage(_)
                | Self::InvalidSessionState(_)
                | Self::DecryptError
                | Self::NoMatchingTicketKey
        )
    }
}

/// A corrupt resumption state payload.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidMessage {
    /// Message is shorter than the expected length
    MessageTooShort,
    /// Missing data for the named payload value
    MissingData(&'static str),
    /// Trailing data found for the named payload value
    TrailingData(&'static str),
    /// The leading format version byte is not one we understand.
    UnknownFormatVersion(u8),
    /// The encoded cipher suite is not one we support.
    UnknownCipherSuite(CipherSuite),
}

impl From<InvalidMessage> for Error {
    #[inline]
    fn from(e: InvalidMessage) -> Self {
        Self::InvalidMessage(e)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
/// Invariants whose violation indicates a bug on the issuing side.
pub enum SafetyViolation {
    /// A session secret does not fit its one-byte length prefix.
    SecretTooLong {
        /// The offending length.
        len: usize,
    },
    /// Serialized state is longer than any ticket the key store will open.
    StateTooLong {
        /// The offending length.
        len: usize,
    },
}

impl From<SafetyViolation> for Error {
    #[inline]
    fn from(e: SafetyViolation) -> Self {
        Self::SafetyViolation(e)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
/// Reasons a well-formed ticket is still refused by a server.
pub enum InvalidSessionState {
    /// The ticket was issued for another protocol version.
    ProtocolVersionMismatch {
        /// What the ticket says.
        ticket: ProtocolVersion,
        /// What this connection negotiated.
        connection: ProtocolVersion,
    },
    /// The ticket was issued under another cipher suite.
    CipherSuiteMismatch {
        /// What the ticket says.
        ticket: CipherSuite,
        /// What this connection negotiated, if anything.
        connection: Option<CipherSuite>,
    },
    /// The cipher suite cannot be used with the ticket's protocol version.
    CipherSuiteVersionMismatch(CipherSuite),
    /// The ticket is older than the session state lifetime.
    Expired,
    /// The ticket claims to have been issued in the future.
    IssuedInFuture,
}

impl From<InvalidSessionState> for Error {
    #[inline]
    fn from(e: InvalidSessionState) -> Self {
        Self::InvalidSessionState(e)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
/// Reasons a ticket encryption key is refused by a [`crate::TicketKeyStore`].
pub enum InvalidTicketKey {
    /// The key name was empty.
    EmptyName,
    /// The key name exceeds the fixed key name length.
    NameTooLong,
    /// The key material was empty.
    EmptySecret,
    /// A key with this name is already held.
    DuplicateName,
    /// The store already holds the maximum number of keys.
    TooManyKeys,
    /// The key would already have expired.
    AlreadyExpired,
    /// Deriving the AEAD key failed.
    KeyDerivationFailed,
    /// The key store lock was poisoned by a panicking writer.
    StorePoisoned,
}

impl From<InvalidTicketKey> for Error {
    #[inline]
    fn from(e: InvalidTicketKey) -> Self {
        Self::InvalidTicketKey(e)
    }
}

#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
/// Reasons a pre-shared key is refused.
pub enum InvalidPsk {
    /// The identity was empty.
    EmptyIdentity,
    /// The secret was empty.
    EmptySecret,
    /// Another PSK in the list has the same identity.
    DuplicateIdentity,
    /// The list already holds a resumption PSK.
    DuplicateResumption,
    /// An external PSK was offered where a resumption PSK is required.
    NotResumption,
}

impl From<InvalidPsk> for Error {
    #[inline]
    fn from(e: InvalidPsk) -> Self {
        Self::InvalidPsk(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::MissingArgument(what) => write!(f, "missing required argument: {}", what),
            Self::SafetyViolation(ref why) => write!(f, "safety check failed: {:?}", why),
            Self::InvalidMessage(ref typ) => {
                write!(f, "received corrupt resumption state: {:?}", typ)
            }
            Self::InvalidSessionState(ref why) => {
                write!(f, "resumption state not usable: {:?}", why)
            }
            Self::DecryptError => write!(f, "cannot decrypt session ticket"),
            Self::NoMatchingTicketKey => write!(f, "session ticket key not found"),
            Self::NoTicketEncryptionKey => write!(f, "no valid session ticket encryption key"),
            Self::EncryptError => write!(f, "cannot encrypt session ticket"),
            Self::IntegerOverflow => write!(f, "integer overflow"),
            Self::SerializedSessionStateTooLong { needed, available } => write!(
                f,
                "serialized session state too long: need {} bytes, have {}",
                needed, available
            ),
            Self::InvalidTicketKey(ref why) => write!(f, "invalid ticket key: {:?}", why),
            Self::InvalidPsk(ref why) => write!(f, "invalid psk: {:?}", why),
            Self::FailedToGetCurrentTime => write!(f, "failed to get current time"),
            Self::FailedToGetRandomBytes => write!(f, "failed to get random bytes"),
            Self::General(ref err) => write!(f, "unexpected error: {}", err),
        }
    }
}

impl From<SystemTimeError> for Error {
    #[inline]
    fn from(_: SystemTimeError) -> Self {
        Self::FailedToGetCurrentTime
    }
}

impl StdError for Error {}

impl From<rand::GetRandomFailed> for Error {
    fn from(_: rand::GetRandomFailed) -> Self {
        Self::FailedToGetRandomBytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        let all = vec![
            Error::MissingArgument("ticket_fields"),
            SafetyViolation::SecretTooLong { len: 256 }.into(),
            InvalidMessage::UnknownFormatVersion(9).into(),
            InvalidSessionState::Expired.into(),
            Error::DecryptError,
            Error::NoMatchingTicketKey,
            Error::NoTicketEncryptionKey,
            Error::EncryptError,
            Error::IntegerOverflow,
            Error::SerializedSessionStateTooLong {
                needed: 20,
                available: 19,
            },
            InvalidTicketKey::DuplicateName.into(),
            InvalidPsk::EmptyIdentity.into(),
            Error::FailedToGetCurrentTime,
            Error::FailedToGetRandomBytes,
            Error::General("undocumented error".to_string()),
        ];

        for err in all {
            println!("{:?}:", err);
            println!("  fmt '{}'", err);
        }
    }

    #[test]
    fn ticket_rejections_are_classified() {
        assert!(Error::DecryptError.is_ticket_rejection());
        assert!(Error::NoMatchingTicketKey.is_ticket_rejection());
        assert!(Error::from(InvalidMessage::MessageTooShort).is_ticket_rejection());
        assert!(Error::from(InvalidSessionState::Expired).is_ticket_rejection());

        assert!(!Error::MissingArgument("x").is_ticket_rejection());
        assert!(!Error::from(SafetyViolation::SecretTooLong { len: 300 }).is_ticket_rejection());
        assert!(!Error::IntegerOverflow.is_ticket_rejection());
        assert!(!Error::FailedToGetCurrentTime.is_ticket_rejection());
    }

    #[test]
    fn rand_error_mapping() {
        let err: Error = rand::GetRandomFailed.into();
        assert_eq!(err, Error::FailedToGetRandomBytes);
    }

    #[test]
    fn time_error_mapping() {
        use std::time::SystemTime;

        let time_error = SystemTime::UNIX_EPOCH
            .duration_since(SystemTime::now())
            .unwrap_err();
        let err: Error = time_error.into();
        assert_eq!(err, Error::FailedToGetCurrentTime);
    }
}
