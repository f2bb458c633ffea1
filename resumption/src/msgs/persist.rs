//! Resumption state: the plaintext carried inside a session ticket.
//!
//! Two layouts exist, selected by a leading format version byte.  All
//! integers are big-endian.
//!
//! ```text
//! TLS1.2: [1: format=1][1: version][2: suite][8: issue_time_ns][48: master_secret]
//! TLS1.3: [1: format=2][1: version][2: suite][8: issue_time_ns][4: ticket_age_add]
//!         [1: secret_len][secret_len: session_secret]
//! ```

use core::fmt;

use zeroize::Zeroizing;

use crate::enums::{CipherSuite, ProtocolVersion, SerializedFormatVersion};
use crate::error::{Error, InvalidMessage, SafetyViolation};
use crate::msgs::base::PayloadU8;
use crate::msgs::codec::{Codec, Reader};
use crate::suites::{self, SupportedCipherSuite};
use crate::time_provider::UnixTime;

/// Length of a TLS1.2 master secret.
pub const MASTER_SECRET_LEN: usize = 48;

/// Bytes shared by both layouts: format, version, suite and issue time.
const COMMON_LEN: usize = 1 + 1 + 2 + 8;

/// Encoded length of TLS1.2 resumption state.
pub const TLS12_STATE_LEN: usize = COMMON_LEN + MASTER_SECRET_LEN;

/// Encoded length of TLS1.3 resumption state, excluding the secret bytes.
pub const TLS13_STATE_LEN_WITHOUT_SECRET: usize = COMMON_LEN + 4 + 1;

/// Largest encoded length of TLS1.3 resumption state for any supported suite.
///
/// Buffers sized for tickets must use this bound rather than the length
/// of any particular secret.
pub const TLS13_MAX_STATE_LEN: usize = TLS13_STATE_LEN_WITHOUT_SECRET + MASTER_SECRET_LEN;

/// Resumption state, as serialized into a session ticket.
#[non_exhaustive]
#[derive(Debug)]
pub enum ResumptionState {
    Tls12(Tls12ResumptionState),
    Tls13(Tls13ResumptionState),
}

impl ResumptionState {
    /// Decode exactly one state from `bytes`.
    ///
    /// Anything following the state is an error.
    pub fn decode(bytes: &[u8]) -> Result<Self, InvalidMessage> {
        let mut rd = Reader::init(bytes);
        let state = Self::read(&mut rd)?;
        rd.expect_empty("ResumptionState")?;
        Ok(state)
    }

    pub fn common(&self) -> &CommonResumptionState {
        match self {
            Self::Tls12(inner) => &inner.common,
            Self::Tls13(inner) => &inner.common,
        }
    }

    /// Number of bytes `encode` will produce.
    pub fn encoded_len(&self) -> usize {
        match self {
            Self::Tls12(_) => TLS12_STATE_LEN,
            Self::Tls13(inner) => TLS13_STATE_LEN_WITHOUT_SECRET + inner.secret().len(),
        }
    }
}

impl Codec<'_> for ResumptionState {
    fn encode(&self, bytes: &mut Vec<u8>) {
        match self {
            Self::Tls12(value) => {
                SerializedFormatVersion::Tls12.encode(bytes);
                value.encode(bytes);
            }
            Self::Tls13(value) => {
                SerializedFormatVersion::Tls13.encode(bytes);
                value.encode(bytes);
            }
        }
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        match SerializedFormatVersion::read(r)? {
            SerializedFormatVersion::Tls12 => Ok(Self::Tls12(Tls12ResumptionState::read(r)?)),
            SerializedFormatVersion::Tls13 => Ok(Self::Tls13(Tls13ResumptionState::read(r)?)),
            SerializedFormatVersion::Unknown(v) => Err(InvalidMessage::UnknownFormatVersion(v)),
        }
    }
}

impl From<Tls12ResumptionState> for ResumptionState {
    fn from(value: Tls12ResumptionState) -> Self {
        Self::Tls12(value)
    }
}

impl From<Tls13ResumptionState> for ResumptionState {
    fn from(value: Tls13ResumptionState) -> Self {
        Self::Tls13(value)
    }
}

/// Fields present in both layouts.
#[derive(Debug, Clone, PartialEq)]
pub struct CommonResumptionState {
    pub protocol_version: ProtocolVersion,
    pub cipher_suite: SupportedCipherSuite,
    pub issue_time: UnixTime,
}

impl CommonResumptionState {
    pub fn new(
        protocol_version: ProtocolVersion,
        cipher_suite: SupportedCipherSuite,
        issue_time: UnixTime,
    ) -> Self {
        Self {
            protocol_version,
            cipher_suite,
            issue_time,
        }
    }
}

impl Codec<'_> for CommonResumptionState {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.protocol_version.encode(bytes);
        self.cipher_suite.suite().encode(bytes);
        self.issue_time.as_nanos().encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        let protocol_version = ProtocolVersion::read(r)?;
        let suite = CipherSuite::read(r)?;
        let cipher_suite = suites::lookup(suite).ok_or(InvalidMessage::UnknownCipherSuite(suite))?;
        let issue_time = UnixTime::from_nanos(u64::read(r)?);

        Ok(Self {
            protocol_version,
            cipher_suite,
            issue_time,
        })
    }
}

pub struct Tls12ResumptionState {
    pub common: CommonResumptionState,
    master_secret: Zeroizing<[u8; MASTER_SECRET_LEN]>,
}

impl Tls12ResumptionState {
    pub fn new(common: CommonResumptionState, master_secret: &[u8; MASTER_SECRET_LEN]) -> Self {
        Self {
            common,
            master_secret: Zeroizing::new(*master_secret),
        }
    }

    pub fn master_secret(&self) -> &[u8; MASTER_SECRET_LEN] {
        &self.master_secret
    }
}

impl Codec<'_> for Tls12ResumptionState {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.common.encode(bytes);
        bytes.extend_from_slice(&self.master_secret[..]);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            common: CommonResumptionState::read(r)?,
            master_secret: Zeroizing::new(r.take_array("master_secret")?),
        })
    }
}

impl fmt::Debug for Tls12ResumptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tls12ResumptionState")
            .field("common", &self.common)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct Tls13ResumptionState {
    pub common: CommonResumptionState,
    pub ticket_age_add: u32,
    secret: Zeroizing<PayloadU8>,
}

impl Tls13ResumptionState {
    /// Fails if `secret` cannot be represented by the one-byte length prefix.
    pub fn new(
        common: CommonResumptionState,
        ticket_age_add: u32,
        secret: &[u8],
    ) -> Result<Self, Error> {
        let secret = PayloadU8::new(secret.to_vec())
            .ok_or(SafetyViolation::SecretTooLong { len: secret.len() })?;

        Ok(Self {
            common,
            ticket_age_add,
            secret: Zeroizing::new(secret),
        })
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.bytes()
    }
}

impl Codec<'_> for Tls13ResumptionState {
    fn encode(&self, bytes: &mut Vec<u8>) {
        self.common.encode(bytes);
        self.ticket_age_add.encode(bytes);
        self.secret.encode(bytes);
    }

    fn read(r: &mut Reader<'_>) -> Result<Self, InvalidMessage> {
        Ok(Self {
            common: CommonResumptionState::read(r)?,
            ticket_age_add: u32::read(r)?,
            secret: Zeroizing::new(PayloadU8::read(r)?),
        })
    }
}
