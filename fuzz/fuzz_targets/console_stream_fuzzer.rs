//! Fuzz target for the console byte protocol parser.
//!
//! The parser must tolerate arbitrary line noise: no panics, and every
//! emitted scan must respect the 8-cell display shape.

#![no_main]

use laneframe_proto::{CHANNEL_WIDTH, ConsoleParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut parser = ConsoleParser::new();

    for &byte in data {
        if let Some(partial) = parser.push(byte) {
            assert_eq!(partial.data.len(), CHANNEL_WIDTH);
            assert_eq!(partial.format.len(), CHANNEL_WIDTH);
        }
    }

    if let Some(partial) = parser.finish() {
        assert_eq!(partial.data.len(), CHANNEL_WIDTH);
        assert_eq!(partial.format.len(), CHANNEL_WIDTH);
    }
});
