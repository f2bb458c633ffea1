//! Session resumption: turning a connection's secrets into ticket bytes,
//! and ticket bytes back into secrets.
//!
//! The issuing path is [`serialize_resumption_state`] inside
//! [`encrypt_session_ticket`].  The receiving path is
//! [`decrypt_session_ticket`] on a server, or
//! [`client_deserialize_session_state`] on a client that kept its own
//! copy of the state.

use core::fmt;

use zeroize::Zeroizing;

use crate::conn::{Connection, SessionTicketStatus};
use crate::enums::ProtocolVersion;
use crate::error::{Error, InvalidSessionState, SafetyViolation};
use crate::log::{debug, trace};
use crate::msgs::codec::Codec;
use crate::msgs::persist::{
    CommonResumptionState, ResumptionState, Tls12ResumptionState, Tls13ResumptionState,
    TLS13_MAX_STATE_LEN,
};
use crate::psk::Psk;
use crate::rand;
use crate::ticketer::TicketKeyState;
use crate::time_provider::UnixTime;

/// TLS1.3 values a server puts in a ticket along with the connection's state.
///
/// Borrowed for the duration of one call; nothing here is retained.
pub struct TicketFields<'a> {
    /// Added to the ticket age a client reports, to hide it from observers.
    pub ticket_age_add: u32,
    /// The PSK the ticket will resume with.
    pub session_secret: &'a [u8],
}

impl<'a> TicketFields<'a> {
    /// Pair `session_secret` with a freshly generated `ticket_age_add`.
    pub fn new(session_secret: &'a [u8]) -> Result<Self, Error> {
        Ok(Self {
            ticket_age_add: rand::random_u32()?,
            session_secret,
        })
    }
}

impl fmt::Debug for TicketFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TicketFields")
            .field("session_secret_len", &self.session_secret.len())
            .finish_non_exhaustive()
    }
}

/// Serialize `conn`'s resumption state onto the end of `out`.
///
/// The layout follows `conn.actual_protocol_version`: TLS1.3 state
/// needs `ticket_fields`, while older versions ignore them.  Nothing is
/// written on failure.
pub fn serialize_resumption_state(
    conn: &Connection,
    ticket_fields: Option<&TicketFields<'_>>,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    let state: ResumptionState = if uses_tls13_layout(conn.actual_protocol_version) {
        let ticket_fields = ticket_fields.ok_or(Error::MissingArgument("ticket_fields"))?;
        tls13_resumption_state(conn, ticket_fields)?.into()
    } else {
        tls12_resumption_state(conn)?.into()
    };

    state.encode(out);
    Ok(())
}

/// Serialize `conn`'s state in the TLS1.2 layout.
pub fn tls12_serialize_resumption_state(conn: &Connection, out: &mut Vec<u8>) -> Result<(), Error> {
    ResumptionState::from(tls12_resumption_state(conn)?).encode(out);
    Ok(())
}

/// Serialize `conn`'s state in the TLS1.3 layout.
///
/// Fails with a safety violation if the session secret is longer than
/// its one-byte length prefix allows.
pub fn tls13_serialize_resumption_state(
    conn: &Connection,
    ticket_fields: &TicketFields<'_>,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    ResumptionState::from(tls13_resumption_state(conn, ticket_fields)?).encode(out);
    Ok(())
}

fn uses_tls13_layout(version: ProtocolVersion) -> bool {
    u8::from(version) >= u8::from(ProtocolVersion::TLSv1_3)
}

fn common_state(conn: &Connection) -> Result<CommonResumptionState, Error> {
    let cipher_suite = conn
        .secure
        .cipher_suite
        .ok_or(Error::MissingArgument("cipher_suite"))?;

    Ok(CommonResumptionState::new(
        conn.actual_protocol_version,
        cipher_suite,
        conn.now()?,
    ))
}

fn tls12_resumption_state(conn: &Connection) -> Result<Tls12ResumptionState, Error> {
    Ok(Tls12ResumptionState::new(
        common_state(conn)?,
        &conn.secure.master_secret,
    ))
}

fn tls13_resumption_state(
    conn: &Connection,
    ticket_fields: &TicketFields<'_>,
) -> Result<Tls13ResumptionState, Error> {
    Tls13ResumptionState::new(
        common_state(conn)?,
        ticket_fields.ticket_age_add,
        ticket_fields.session_secret,
    )
}

/// Serialize `conn`'s resumption state and seal it into a ticket, appended
/// to `out`.
///
/// The ticket is `key_name || iv || ciphertext || tag`, under the newest
/// key in the config's store able to issue tickets.  State longer than the
/// TLS1.3 worst case is refused, since no server would open the ticket.
/// Nothing is written on failure.
pub fn encrypt_session_ticket(
    conn: &Connection,
    ticket_fields: Option<&TicketFields<'_>>,
    out: &mut Vec<u8>,
) -> Result<(), Error> {
    let mut plaintext = Zeroizing::new(Vec::with_capacity(TLS13_MAX_STATE_LEN));
    serialize_resumption_state(conn, ticket_fields, &mut plaintext)?;
    if plaintext.len() > TLS13_MAX_STATE_LEN {
        return Err(SafetyViolation::StateTooLong {
            len: plaintext.len(),
        }
        .into());
    }

    let ticket = conn
        .config()
        .ticket_keys
        .encrypt(&plaintext)?;
    out.extend_from_slice(&ticket);
    Ok(())
}

/// Open `conn.client_ticket_to_decrypt` and resume from its contents.
///
/// This is the server's receive path.  Every check is made before
/// anything in `conn` changes.  A ticket opened by a key that no longer
/// issues tickets marks the connection to send a replacement.
pub fn decrypt_session_ticket(conn: &mut Connection) -> Result<(), Error> {
    let decrypted = conn
        .config()
        .ticket_keys
        .decrypt(&conn.client_ticket_to_decrypt)?;

    server_deserialize_session_state(conn, &decrypted.plaintext)?;

    conn.session_ticket_status = match decrypted.key_state {
        TicketKeyState::DecryptOnly => SessionTicketStatus::NewTicket,
        _ => SessionTicketStatus::DecryptTicket,
    };
    Ok(())
}

/// Restore resumption state on a client from serialized `state`.
///
/// TLS1.2 state sets the connection's protocol version, cipher suite and
/// master secret.  TLS1.3 state becomes the connection's resumption PSK,
/// identified by `conn.client_ticket`.  Nothing changes on failure.
pub fn client_deserialize_session_state(conn: &mut Connection, state: &[u8]) -> Result<(), Error> {
    match ResumptionState::decode(state)? {
        ResumptionState::Tls12(state) => {
            conn.actual_protocol_version = state.common.protocol_version;
            conn.secure.cipher_suite = Some(state.common.cipher_suite);
            *conn.secure.master_secret = *state.master_secret();
        }
        ResumptionState::Tls13(state) => {
            let psk = resumption_psk(&conn.client_ticket, &state)?;
            conn.psk_params
                .insert_resumption_psk(psk)?;
        }
    }
    Ok(())
}

fn server_deserialize_session_state(conn: &mut Connection, state: &[u8]) -> Result<(), Error> {
    let state = ResumptionState::decode(state)?;
    let common = state.common();

    if common.protocol_version != conn.actual_protocol_version {
        return Err(InvalidSessionState::ProtocolVersionMismatch {
            ticket: common.protocol_version,
            connection: conn.actual_protocol_version,
        }
        .into());
    }
    check_ticket_age(conn, common.issue_time)?;

    match state {
        ResumptionState::Tls12(state) => {
            let negotiated = conn.secure.cipher_suite;
            if negotiated != Some(state.common.cipher_suite) {
                return Err(InvalidSessionState::CipherSuiteMismatch {
                    ticket: state.common.cipher_suite.suite(),
                    connection: negotiated.map(|scs| scs.suite()),
                }
                .into());
            }

            trace!("resuming TLS1.2 session under {:?}", state.common.cipher_suite);
            *conn.secure.master_secret = *state.master_secret();
        }
        ResumptionState::Tls13(state) => {
            if state.common.cipher_suite.tls13().is_none() {
                return Err(InvalidSessionState::CipherSuiteVersionMismatch(
                    state.common.cipher_suite.suite(),
                )
                .into());
            }

            let psk = resumption_psk(&conn.client_ticket_to_decrypt, &state)?;
            trace!("resuming TLS1.3 session under {:?}", state.common.cipher_suite);
            conn.psk_params
                .insert_resumption_psk(psk)?;
        }
    }
    Ok(())
}

fn resumption_psk(identity: &[u8], state: &Tls13ResumptionState) -> Result<Psk, Error> {
    Psk::resumption(
        identity,
        state.secret(),
        state
            .common
            .cipher_suite
            .hash_algorithm(),
        state.ticket_age_add,
        state.common.issue_time,
    )
}

fn check_ticket_age(conn: &Connection, issue_time: UnixTime) -> Result<(), Error> {
    let now = conn.now()?;
    let Some(age) = now
        .as_nanos()
        .checked_sub(issue_time.as_nanos())
    else {
        debug!("ticket issued in the future");
        return Err(InvalidSessionState::IssuedInFuture.into());
    };

    if u128::from(age) > conn.config().session_state_lifetime.as_nanos() {
        debug!("ticket expired");
        return Err(InvalidSessionState::Expired.into());
    }
    Ok(())
}
