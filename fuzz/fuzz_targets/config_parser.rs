#![no_main]
use libfuzzer_sys::fuzz_target;
use minicat_core::config::EngineConfig;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes should either fail to parse or produce a config the
    // engine can run against without panicking.
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(config) = serde_json::from_str::<EngineConfig>(s) {
            if config.theta_grid.points >= 2
                && config.theta_grid.min < config.theta_grid.max
                && config.theta_grid.points < 100_000
            {
                let _ = minicat_core::bayes::initial_posterior(&config);
            }
        }
    }
});
