use core::{fmt, mem};
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::config::Config;
use crate::enums::ProtocolVersion;
use crate::error::Error;
use crate::log::debug;
use crate::msgs::persist::MASTER_SECRET_LEN;
use crate::psk::PskList;
use crate::resume::{self, TicketFields};
use crate::session_ticket::SessionTicket;
use crate::suites::SupportedCipherSuite;
use crate::ticketer::TLS13_MAX_TICKET_LEN;
use crate::time_provider::UnixTime;

/// Which end of a connection we are.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// The end that receives tickets.
    Client,
    /// The end that issues and decrypts tickets.
    Server,
}

/// The negotiated secrets of a connection.
pub struct SecureState {
    /// The negotiated cipher suite, once there is one.
    pub cipher_suite: Option<SupportedCipherSuite>,
    /// The TLS1.2 master secret.
    pub master_secret: Zeroizing<[u8; MASTER_SECRET_LEN]>,
}

impl Default for SecureState {
    fn default() -> Self {
        Self {
            cipher_suite: None,
            master_secret: Zeroizing::new([0u8; MASTER_SECRET_LEN]),
        }
    }
}

impl fmt::Debug for SecureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureState")
            .field("cipher_suite", &self.cipher_suite)
            .finish_non_exhaustive()
    }
}

/// Whether a server owes the client a TLS1.2 ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionTicketStatus {
    /// No ticket is to be sent.
    NoTicket,
    /// The session was resumed from a ticket that remains good.
    DecryptTicket,
    /// A fresh ticket should be sent.
    NewTicket,
}

/// The outcome of [`Connection::try_resume`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resumption {
    /// The ticket was accepted and the session state restored.
    Resumed,
    /// The ticket was refused; carry on with a full handshake.
    FullHandshake,
}

/// The resumption-related state of one connection.
///
/// A connection is driven by one thread at a time; only the [`Config`] it
/// was made from is shared.
#[derive(Debug)]
pub struct Connection {
    side: Side,

    /// The protocol version in use.
    pub actual_protocol_version: ProtocolVersion,

    /// The negotiated cipher suite and secrets.
    pub secure: SecureState,

    /// PSKs this connection may offer or accept.
    pub psk_params: PskList,

    /// The ticket a client last received, exactly as the server sent it.
    pub client_ticket: Vec<u8>,

    /// The ticket a server has been asked to resume from.
    pub client_ticket_to_decrypt: Vec<u8>,

    tickets_to_send: u16,
    tickets_sent: u16,
    pub(crate) session_ticket_status: SessionTicketStatus,
    config: Arc<Config>,
}

impl Connection {
    /// Make a connection for `side` using `config`.
    pub fn new(side: Side, config: Arc<Config>) -> Self {
        let session_ticket_status = match side {
            Side::Server if config.session_tickets => SessionTicketStatus::NewTicket,
            _ => SessionTicketStatus::NoTicket,
        };

        Self {
            side,
            actual_protocol_version: ProtocolVersion::TLSv1_3,
            secure: SecureState::default(),
            psk_params: PskList::new(),
            client_ticket: Vec::new(),
            client_ticket_to_decrypt: Vec::new(),
            tickets_to_send: u16::from(config.initial_ticket_count),
            tickets_sent: 0,
            session_ticket_status,
            config,
        }
    }

    /// Which end this is.
    pub fn side(&self) -> Side {
        self.side
    }

    /// The config this connection was made from.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// How many TLS1.3 tickets this connection will issue in total.
    pub fn tickets_to_send(&self) -> u16 {
        self.tickets_to_send
    }

    /// How many tickets this connection has issued.
    pub fn tickets_sent(&self) -> u16 {
        self.tickets_sent
    }

    /// Whether a TLS1.2 ticket is owed.
    pub fn session_ticket_status(&self) -> SessionTicketStatus {
        self.session_ticket_status
    }

    /// Arrange for `num` more TLS1.3 tickets to be issued.
    ///
    /// Fails, changing nothing, if the total would overflow.
    pub fn add_new_tickets_to_send(&mut self, num: u8) -> Result<(), Error> {
        self.tickets_to_send = self
            .tickets_to_send
            .checked_add(u16::from(num))
            .ok_or(Error::IntegerOverflow)?;
        Ok(())
    }

    /// Issue the next session ticket, if one is due.
    ///
    /// TLS1.3 connections issue until `tickets_to_send` is reached, and
    /// need `ticket_fields`.  TLS1.2 connections issue one ticket when
    /// their status is [`SessionTicketStatus::NewTicket`].  Returns `None`
    /// when nothing is due or tickets are disabled.
    pub fn issue_session_ticket(
        &mut self,
        ticket_fields: Option<&TicketFields<'_>>,
    ) -> Result<Option<Vec<u8>>, Error> {
        if !self.config.session_tickets {
            return Ok(None);
        }

        let tls13 = self.actual_protocol_version == ProtocolVersion::TLSv1_3;
        let due = match tls13 {
            true => self.tickets_sent < self.tickets_to_send,
            false => self.session_ticket_status == SessionTicketStatus::NewTicket,
        };
        if !due {
            return Ok(None);
        }

        let tickets_sent = self
            .tickets_sent
            .checked_add(1)
            .ok_or(Error::IntegerOverflow)?;

        let mut ticket = Vec::with_capacity(TLS13_MAX_TICKET_LEN);
        resume::encrypt_session_ticket(self, ticket_fields, &mut ticket)?;

        self.tickets_sent = tickets_sent;
        if !tls13 {
            self.session_ticket_status = SessionTicketStatus::NoTicket;
        }
        Ok(Some(ticket))
    }

    /// Try to resume the session described by `ticket`.
    ///
    /// Tickets that are malformed, fail authentication, name an unknown
    /// key, or describe a session this connection cannot continue are
    /// refused with [`Resumption::FullHandshake`].  The reason is logged
    /// but never reported to the peer.  Other failures are errors, and
    /// leave the connection as it was.
    pub fn try_resume(&mut self, ticket: &[u8]) -> Result<Resumption, Error> {
        if self.side != Side::Server {
            return Err(Error::General("only servers decrypt session tickets".into()));
        }
        if !self.config.session_tickets {
            return Ok(Resumption::FullHandshake);
        }

        let previous_ticket = mem::replace(&mut self.client_ticket_to_decrypt, ticket.to_vec());
        let previous_status = self.session_ticket_status;

        match resume::decrypt_session_ticket(self) {
            Ok(()) => Ok(Resumption::Resumed),
            Err(err) if err.is_ticket_rejection() => {
                debug!("session ticket refused: {}", err);
                self.session_ticket_status = SessionTicketStatus::NewTicket;
                Ok(Resumption::FullHandshake)
            }
            Err(err) => {
                self.client_ticket_to_decrypt = previous_ticket;
                self.session_ticket_status = previous_status;
                Err(err)
            }
        }
    }

    /// Keep a ticket received from the server, and pass it to the
    /// config's [`crate::SessionTicketCallback`].
    ///
    /// Ignored when tickets are disabled.
    pub fn receive_session_ticket(&mut self, ticket: &[u8], lifetime: u32) -> Result<(), Error> {
        if !self.config.session_tickets {
            return Ok(());
        }

        self.client_ticket.clear();
        self.client_ticket
            .extend_from_slice(ticket);

        if let Some(callback) = &self.config.session_ticket_callback {
            callback.on_session_ticket(&SessionTicket::new(&self.client_ticket, lifetime))?;
        }
        Ok(())
    }

    pub(crate) fn now(&self) -> Result<UnixTime, Error> {
        self.config
            .time_provider
            .current_time()
            .ok_or(Error::FailedToGetCurrentTime)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::ticketer::TLS12_TICKET_LEN;
    use crate::time_provider::TimeProvider;

    fn config_with_tickets(initial_ticket_count: u8) -> Arc<Config> {
        let mut config = Config::new();
        config.session_tickets = true;
        config.initial_ticket_count = initial_ticket_count;
        Arc::new(config)
    }

    #[test]
    fn initial_ticket_count() {
        let conn = Connection::new(Side::Client, Arc::new(Config::new()));
        assert_eq!(conn.tickets_to_send(), 0);

        let conn = Connection::new(Side::Client, config_with_tickets(1));
        assert_eq!(conn.tickets_to_send(), 1);
    }

    #[test]
    fn add_new_tickets_to_send() {
        let mut conn = Connection::new(Side::Client, config_with_tickets(1));
        conn.add_new_tickets_to_send(10).unwrap();
        assert_eq!(conn.tickets_to_send(), 11);
    }

    #[test]
    fn add_new_tickets_to_send_overflow() {
        let mut conn = Connection::new(Side::Client, config_with_tickets(0));
        conn.tickets_to_send = u16::MAX;
        assert_eq!(conn.add_new_tickets_to_send(1), Err(Error::IntegerOverflow));
        assert_eq!(conn.tickets_to_send(), u16::MAX);
    }

    #[test]
    fn initial_status() {
        let server = Connection::new(Side::Server, config_with_tickets(0));
        assert_eq!(server.session_ticket_status(), SessionTicketStatus::NewTicket);

        let client = Connection::new(Side::Client, config_with_tickets(0));
        assert_eq!(client.session_ticket_status(), SessionTicketStatus::NoTicket);

        let server = Connection::new(Side::Server, Arc::new(Config::new()));
        assert_eq!(server.session_ticket_status(), SessionTicketStatus::NoTicket);
    }

    #[test]
    fn client_cannot_resume_from_ticket() {
        let mut client = Connection::new(Side::Client, config_with_tickets(0));
        assert!(client.try_resume(b"ticket").is_err());
    }

    #[test]
    fn nothing_issued_when_tickets_disabled() {
        let mut server = Connection::new(Side::Server, Arc::new(Config::new()));
        assert_eq!(server.issue_session_ticket(None), Ok(None));
        assert_eq!(server.try_resume(b"ticket"), Ok(Resumption::FullHandshake));
    }

    /// Answers once, then never again.
    #[derive(Debug, Default)]
    struct StoppedClock(AtomicBool);

    impl TimeProvider for StoppedClock {
        fn current_time(&self) -> Option<UnixTime> {
            match self.0.swap(true, Ordering::SeqCst) {
                false => Some(UnixTime::from_nanos(1_600_000_000_000_000_000)),
                true => None,
            }
        }
    }

    #[test]
    fn clock_failure_leaves_connection_unchanged() {
        let mut config = Config::with_time_provider(Arc::new(StoppedClock::default()));
        config.session_tickets = true;
        config
            .ticket_keys
            .add_key(b"key", b"secret", 0)
            .unwrap();

        let mut server = Connection::new(Side::Server, Arc::new(config));
        server.actual_protocol_version = ProtocolVersion::TLSv1_2;
        server.client_ticket_to_decrypt = b"previous".to_vec();
        assert_eq!(server.session_ticket_status(), SessionTicketStatus::NewTicket);

        assert_eq!(
            server.try_resume(&[0u8; TLS12_TICKET_LEN]),
            Err(Error::FailedToGetCurrentTime)
        );
        assert_eq!(server.session_ticket_status(), SessionTicketStatus::NewTicket);
        assert_eq!(server.client_ticket_to_decrypt, b"previous");
    }

    #[test]
    fn debug_omits_master_secret() {
        let mut conn = Connection::new(Side::Server, Arc::new(Config::new()));
        *conn.secure.master_secret = [0x5a; MASTER_SECRET_LEN];
        assert!(!format!("{:?}", conn).contains("90"));
    }
}
