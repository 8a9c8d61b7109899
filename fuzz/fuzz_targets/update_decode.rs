//! Fuzz target for feed line decoding.
//!
//! Malformed feed lines must be reported as errors, never panic: a single
//! bad payload is dropped by the receiver while the session keeps running.

#![no_main]

use laneframe_proto::decode_update;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes as a feed line: Err for invalid, never a panic.
    let _ = decode_update(data);
});
