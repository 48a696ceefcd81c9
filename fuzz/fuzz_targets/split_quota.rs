#![no_main]

use libfuzzer_sys::fuzz_target;
use limitprobe::engine::split_quota;

fuzz_target!(|data: &[u8]| {
    if data.len() < 16 {
        return;
    }
    let mut total_bytes = [0u8; 8];
    let mut client_bytes = [0u8; 8];
    total_bytes.copy_from_slice(&data[..8]);
    client_bytes.copy_from_slice(&data[8..16]);

    let total = u64::from_le_bytes(total_bytes);
    // Bound the worker count so the quota vector stays allocatable.
    let clients = u64::from_le_bytes(client_bytes) % 10_000;

    let quotas = split_quota(total, clients);
    let expected_total = total.max(1);
    let expected_clients = clients.max(1);
    debug_assert_eq!(quotas.len() as u64, expected_clients);
    debug_assert_eq!(quotas.iter().sum::<u64>(), expected_total);
});
