//! Fuzz target for the merge engine's invariants.
//!
//! Whatever sequence of updates arrives, the snapshot must stay sorted by
//! channel number and a repeated merge must be a no-op.

#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use laneframe_core::ChannelStore;
use laneframe_proto::{FrameUpdate, PartialChannel};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct RawUpdate {
    value: u64,
    partials: Vec<(u32, Vec<u8>, Vec<u8>)>,
}

fuzz_target!(|raw: Vec<RawUpdate>| {
    let mut store = ChannelStore::new();

    for raw_update in raw {
        let mut channels = BTreeMap::new();
        for (number, data, format) in raw_update.partials {
            channels.insert(number, PartialChannel { number, data, format });
        }
        let update = FrameUpdate { value: raw_update.value, channels };

        store.merge(&update);
        assert!(store.merge(&update).is_noop());

        let numbers: Vec<u32> = store.channels().iter().map(|c| c.number).collect();
        assert!(numbers.windows(2).all(|w| w[0] < w[1]));
    }
});
