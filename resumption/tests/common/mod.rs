#![allow(dead_code)]

pub use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tls_resumption::{
    Config, Connection, Error, ProtocolVersion, SessionTicket, SessionTicketCallback, Side,
    SupportedCipherSuite, TimeProvider, UnixTime,
};

pub const NANOS_PER_SEC: u64 = 1_000_000_000;

/// 2016-07-26 15:00:00 UTC.
pub const START_SECS: u64 = 1_469_545_200;

pub const KEY_NAME: &[u8] = b"2016.07.26.15";
pub const KEY_SECRET: &[u8] = b"\x07\x77\x09\x36\x2c\x2e\x32\xdf\x0d\xdc\x3f\x0d\xc4\x7b\xba\x63\x90\xb6\xc7\x3b\xb5\x0f\x9c\x31\x22\xec\x84\x4a\xd7\xc2\xb3\xe5";

pub const MASTER_SECRET: [u8; 48] = [0x5a; 48];
pub const SESSION_SECRET: &[u8] = b"a tls1.3 resumption secret";

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock(AtomicU64);

impl FixedClock {
    pub fn at_secs(secs: u64) -> Arc<Self> {
        Arc::new(Self(AtomicU64::new(secs * NANOS_PER_SEC)))
    }

    pub fn advance_secs(&self, secs: u64) {
        self.0
            .fetch_add(secs * NANOS_PER_SEC, Ordering::SeqCst);
    }

    pub fn set_nanos(&self, nanos: u64) {
        self.0.store(nanos, Ordering::SeqCst);
    }
}

impl TimeProvider for FixedClock {
    fn current_time(&self) -> Option<UnixTime> {
        Some(UnixTime::from_nanos(self.0.load(Ordering::SeqCst)))
    }
}

/// Remembers every ticket it is handed.
#[derive(Debug, Default)]
pub struct TicketCollector {
    pub tickets: Mutex<Vec<(Vec<u8>, u32)>>,
}

impl SessionTicketCallback for TicketCollector {
    fn on_session_ticket(&self, ticket: &SessionTicket<'_>) -> Result<(), Error> {
        let mut data = vec![0u8; ticket.data_len()];
        ticket.data(&mut data)?;
        self.tickets
            .lock()
            .unwrap()
            .push((data, ticket.lifetime()));
        Ok(())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder()
        .is_test(true)
        .try_init();
}

/// A ticket-enabled config on `clock`, holding one fresh key.
pub fn make_config(clock: &Arc<FixedClock>) -> Config {
    init_logging();
    let mut config = Config::with_time_provider(Arc::<FixedClock>::clone(clock));
    config.session_tickets = true;
    config
        .ticket_keys
        .add_key(KEY_NAME, KEY_SECRET, 0)
        .unwrap();
    config
}

pub fn make_server(
    config: &Arc<Config>,
    version: ProtocolVersion,
    suite: SupportedCipherSuite,
) -> Connection {
    let mut conn = Connection::new(Side::Server, Arc::clone(config));
    conn.actual_protocol_version = version;
    conn.secure.cipher_suite = Some(suite);
    conn
}

pub fn make_tls12_server(config: &Arc<Config>) -> Connection {
    let mut conn = make_server(
        config,
        ProtocolVersion::TLSv1_2,
        tls_resumption::cipher_suite::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
    );
    *conn.secure.master_secret = MASTER_SECRET;
    conn
}

pub fn make_tls13_server(config: &Arc<Config>) -> Connection {
    make_server(
        config,
        ProtocolVersion::TLSv1_3,
        tls_resumption::cipher_suite::TLS13_AES_128_GCM_SHA256,
    )
}
