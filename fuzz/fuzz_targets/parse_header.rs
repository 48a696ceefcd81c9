#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        if let Ok((name, value)) = limitprobe::args::parse_header(input) {
            debug_assert_eq!(name, name.trim());
            debug_assert_eq!(value, value.trim());
            debug_assert!(!name.is_empty());
        }
    }
});
