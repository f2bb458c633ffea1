use criterion::criterion_group;
use criterion::criterion_main;
/// Microbenchmarks of ticket issue and resumption.
use criterion::Criterion;

#[path = "../tests/common/mod.rs"]
mod test_utils;
use test_utils::*;

use tls_resumption::{serialize_resumption_state, TicketFields, TLS13_MAX_STATE_LEN};

fn bench_serialize(c: &mut Criterion) {
    let clock = FixedClock::at_secs(START_SECS);
    let config = Arc::new(make_config(&clock));
    let server = make_tls13_server(&config);
    let fields = TicketFields {
        ticket_age_add: 1,
        session_secret: SESSION_SECRET,
    };
    let mut out = Vec::with_capacity(TLS13_MAX_STATE_LEN);

    c.bench_function("serialize tls1.3 state", |b| {
        b.iter(|| {
            out.clear();
            serialize_resumption_state(&server, Some(&fields), &mut out)
        })
    });
}

fn bench_issue_and_resume(c: &mut Criterion) {
    let clock = FixedClock::at_secs(START_SECS);
    let config = Arc::new(make_config(&clock));

    c.bench_function("issue tls1.2 ticket", |b| {
        b.iter(|| make_tls12_server(&config).issue_session_ticket(None))
    });

    let ticket = make_tls12_server(&config)
        .issue_session_ticket(None)
        .unwrap()
        .unwrap();
    c.bench_function("resume tls1.2 ticket", |b| {
        b.iter(|| make_tls12_server(&config).try_resume(&ticket))
    });

    let mut bad = ticket.clone();
    bad[0] ^= 1;
    c.bench_function("refuse ticket with unknown key", |b| {
        b.iter(|| make_tls12_server(&config).try_resume(&bad))
    });
}

criterion_group!(benches, bench_serialize, bench_issue_and_resume);
criterion_main!(benches);
