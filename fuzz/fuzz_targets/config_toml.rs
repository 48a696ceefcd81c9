#![no_main]

use libfuzzer_sys::fuzz_target;
use limitprobe::config::ConfigFile;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let _parsed: Result<ConfigFile, _> = toml::from_str(input);
    }
});
