use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use minicat_core::bayes;
use minicat_core::config::EngineConfig;
use minicat_core::controller::{self, FisherInfoSelector};
use minicat_core::irt;
use minicat_core::item_bank::ITEM_BANK;
use minicat_core::session::SessionState;

fn bench_irt_kernel(c: &mut Criterion) {
    let item = &ITEM_BANK[0];
    c.bench_function("category_probabilities", |b| {
        b.iter(|| irt::category_probabilities(0.3, item.alpha, &item.beta))
    });
    c.bench_function("item_fisher_information", |b| {
        b.iter(|| irt::item_fisher_information(item, 0.3))
    });
}

fn bench_posterior_update(c: &mut Criterion) {
    let config = EngineConfig::default();
    let posterior = bayes::initial_posterior(&config);
    let item = &ITEM_BANK[0];
    c.bench_function("bayes_update_with", |b| {
        b.iter(|| bayes::update_with(&posterior, item, 5, &config))
    });
}

fn bench_full_session(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("full_session");
    group.bench_with_input(BenchmarkId::new("fisher_info_selector", 0), &config, |b, config| {
        b.iter(|| {
            let mut session = SessionState::new(config);
            loop {
                match controller::decide(&session, &FisherInfoSelector, config) {
                    minicat_core::session::Action::Complete { .. } => break,
                    minicat_core::session::Action::PresentItem { item_id, .. } => {
                        controller::process_response(&mut session, item_id, 5, config).unwrap();
                    }
                }
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_irt_kernel, bench_posterior_update, bench_full_session);
criterion_main!(benches);
