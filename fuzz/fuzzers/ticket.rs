#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate tls_resumption;

use std::sync::{Arc, OnceLock};

use tls_resumption::{cipher_suite, Config, Connection, ProtocolVersion, Resumption, Side};

fn config() -> Arc<Config> {
    static CONFIG: OnceLock<Arc<Config>> = OnceLock::new();
    Arc::clone(CONFIG.get_or_init(|| {
        let _ = env_logger::try_init();
        let mut config = Config::new();
        config.session_tickets = true;
        config
            .ticket_keys
            .add_key(b"fuzz", b"fuzzing ticket key", 0)
            .unwrap();
        Arc::new(config)
    }))
}

fuzz_target!(|data: &[u8]| {
    let mut server = Connection::new(Side::Server, config());
    server.actual_protocol_version = ProtocolVersion::TLSv1_3;
    server.secure.cipher_suite = Some(cipher_suite::TLS13_AES_128_GCM_SHA256);
    // no forged ticket may ever resume, or end the connection
    assert_eq!(server.try_resume(data).unwrap(), Resumption::FullHandshake);
});
