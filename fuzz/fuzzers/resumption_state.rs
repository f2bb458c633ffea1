#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate tls_resumption;

use tls_resumption::fuzzing::fuzz_resumption_state;

fuzz_target!(|data: &[u8]| fuzz_resumption_state(data));
