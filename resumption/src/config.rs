use core::time::Duration;
use std::sync::Arc;

use crate::session_ticket::SessionTicketCallback;
use crate::ticketer::TicketKeyStore;
use crate::time_provider::{DefaultTimeProvider, TimeProvider};

/// How long after issue a ticket's session may still be resumed.
pub const DEFAULT_SESSION_STATE_LIFETIME: Duration = Duration::from_secs(15 * 60 * 60);

/// Resumption settings shared by many connections.
///
/// Wrap in an [`Arc`] and hand to [`crate::Connection::new`].  The ticket key
/// store synchronizes itself, so keys may be added and removed while
/// connections are using it.
#[derive(Debug)]
pub struct Config {
    /// The wall clock used for issue times, ticket ages and key rotation.
    ///
    /// This must be the same clock `ticket_keys` was built with.
    pub time_provider: Arc<dyn TimeProvider>,

    /// Whether tickets are issued and accepted at all.  Off by default.
    pub session_tickets: bool,

    /// How many TLS1.3 tickets each new connection issues.
    pub initial_ticket_count: u8,

    /// Told about every ticket a client receives.
    pub session_ticket_callback: Option<Arc<dyn SessionTicketCallback>>,

    /// Tickets older than this are refused.
    pub session_state_lifetime: Duration,

    /// Keys used to seal and open tickets.
    pub ticket_keys: Arc<TicketKeyStore>,
}

impl Config {
    /// Make a config using the system clock.
    pub fn new() -> Self {
        Self::with_time_provider(Arc::new(DefaultTimeProvider))
    }

    /// Make a config whose every time decision is made by `time_provider`.
    pub fn with_time_provider(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            ticket_keys: Arc::new(TicketKeyStore::new(Arc::clone(&time_provider))),
            time_provider,
            session_tickets: false,
            initial_ticket_count: 0,
            session_ticket_callback: None,
            session_state_lifetime: DEFAULT_SESSION_STATE_LIFETIME,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert!(!config.session_tickets);
        assert_eq!(config.initial_ticket_count, 0);
        assert!(config.session_ticket_callback.is_none());
        assert_eq!(config.session_state_lifetime, Duration::from_secs(54_000));
        assert!(config.ticket_keys.is_empty());
    }
}
