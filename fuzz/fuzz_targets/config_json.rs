#![no_main]

use libfuzzer_sys::fuzz_target;
use limitprobe::config::TestConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<TestConfig>(data) {
        debug_assert!(config.worker_count() >= 1);
        debug_assert!(config.attempt_total() >= 1);
        debug_assert!(config.burst() >= 1);
        let _validation = config.validate();
    }
});
