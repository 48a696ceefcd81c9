#![no_main]

use libfuzzer_sys::fuzz_target;
use limitprobe::trace::{MAX_BODY_BYTES, TRUNCATION_MARKER, truncate_with_marker};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let rendered = truncate_with_marker(input);
        debug_assert!(rendered.len() <= MAX_BODY_BYTES + TRUNCATION_MARKER.len());
        if input.len() > MAX_BODY_BYTES {
            debug_assert!(rendered.ends_with(TRUNCATION_MARKER));
        } else {
            debug_assert_eq!(rendered, input);
        }
    }
});
