//! Channel snapshot and the incremental merge engine.
//!
//! The store is an arena of [`Channel`] records kept sorted ascending by
//! number, so consumers can iterate it directly for display. Channels appear
//! the first time an update carries cells for them and are never removed;
//! [`merge`](ChannelStore::merge) is the only mutation path for cell data.
//!
//! Writes follow a minimal-diff policy: a cell (and the frame value) is
//! written only when the incoming value differs from what the snapshot
//! already holds. This is a contract, not an optimization - observers use
//! the [`MergeOutcome`] to decide whether anything needs re-rendering, so a
//! no-op update must report as one.

use laneframe_proto::{CHANNEL_WIDTH, FrameUpdate, PartialChannel};

use crate::channel::Channel;

/// Change report for one [`ChannelStore::merge`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The frame value differed and was written.
    pub value_changed: bool,
    /// Channels created by this merge.
    pub channels_added: usize,
    /// Data/format cells whose value actually changed.
    pub cells_changed: usize,
}

impl MergeOutcome {
    /// True if the merge left the snapshot byte-for-byte unchanged.
    pub fn is_noop(&self) -> bool {
        !self.value_changed && self.channels_added == 0 && self.cells_changed == 0
    }
}

/// In-memory snapshot of every channel seen on the feed.
///
/// Created empty at process start, mutated exclusively by
/// [`merge`](Self::merge), discarded on teardown. Never persisted: restarts
/// rebuild it from the live feed (only display preferences survive, and they
/// live elsewhere).
#[derive(Debug, Clone, Default)]
pub struct ChannelStore {
    frame_value: u64,
    channels: Vec<Channel>,
}

impl ChannelStore {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identifier of the most recently merged update.
    pub fn frame_value(&self) -> u64 {
        self.frame_value
    }

    /// All channels, sorted ascending by number.
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Channel by number. `None` until an update first carries cells for it.
    pub fn channel(&self, number: u32) -> Option<&Channel> {
        self.index_of(number).ok().map(|i| &self.channels[i])
    }

    /// Attach or clear an upstream-rendered string on a channel.
    ///
    /// Returns `false` if the channel does not exist yet. The merge path
    /// never touches this annotation.
    pub fn annotate_preformatted(&mut self, number: u32, text: Option<String>) -> bool {
        match self.index_of(number) {
            Ok(i) => {
                self.channels[i].preformatted = text;
                true
            },
            Err(_) => false,
        }
    }

    /// Fold one update into the snapshot.
    ///
    /// Infallible on well-formed input: unknown channels are created in
    /// sorted position, cells are compare-and-set, and a partial with no
    /// cell entries is a no-op that does not even create its channel.
    /// Cell indices at or beyond [`CHANNEL_WIDTH`] are never consumed.
    pub fn merge(&mut self, update: &FrameUpdate) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        if update.value != self.frame_value {
            self.frame_value = update.value;
            outcome.value_changed = true;
        }

        for (&number, partial) in &update.channels {
            self.merge_partial(number, partial, &mut outcome);
        }

        outcome
    }

    fn merge_partial(&mut self, number: u32, partial: &PartialChannel, outcome: &mut MergeOutcome) {
        // data and format share index space; walk the union of the two
        // prefixes, clamped to the display width.
        let span = partial.data.len().max(partial.format.len()).min(CHANNEL_WIDTH);
        if span == 0 {
            return;
        }

        let index = match self.index_of(number) {
            Ok(i) => i,
            Err(i) => {
                self.channels.insert(i, Channel::new(number));
                outcome.channels_added += 1;
                i
            },
        };
        let channel = &mut self.channels[index];

        for cell in 0..span {
            if let Some(&incoming) = partial.data.get(cell) {
                if channel.data[cell] != incoming {
                    channel.data[cell] = incoming;
                    outcome.cells_changed += 1;
                }
            }
            if let Some(&incoming) = partial.format.get(cell) {
                if channel.format[cell] != incoming {
                    channel.format[cell] = incoming;
                    outcome.cells_changed += 1;
                }
            }
        }
    }

    /// Build a full-snapshot update for broadcast, stamped with `value`.
    ///
    /// Every known channel is included with complete cell images; receivers
    /// merge it like any other update.
    pub fn snapshot_update(&self, value: u64) -> FrameUpdate {
        let mut update = FrameUpdate { value, ..FrameUpdate::default() };
        for channel in &self.channels {
            update.channels.insert(
                channel.number,
                PartialChannel::full(channel.number, channel.data, channel.format),
            );
        }
        update
    }

    fn index_of(&self, number: u32) -> Result<usize, usize> {
        self.channels.binary_search_by_key(&number, |c| c.number)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::*;

    fn update_with(value: u64, partials: Vec<PartialChannel>) -> FrameUpdate {
        let mut channels = BTreeMap::new();
        for partial in partials {
            channels.insert(partial.number, partial);
        }
        FrameUpdate { value, channels }
    }

    fn partial(number: u32, data: &[u8], format: &[u8]) -> PartialChannel {
        PartialChannel { number, data: data.to_vec(), format: format.to_vec() }
    }

    #[test]
    fn merge_creates_channel_zero_initialized() {
        let mut store = ChannelStore::new();
        let outcome = store.merge(&update_with(1, vec![partial(2, &[49, 50], &[])]));

        assert!(outcome.value_changed);
        assert_eq!(outcome.channels_added, 1);
        assert_eq!(outcome.cells_changed, 2);

        let channel = store.channel(2).unwrap();
        assert_eq!(channel.data, [49, 50, 0, 0, 0, 0, 0, 0]);
        assert_eq!(channel.format, [0; CHANNEL_WIDTH]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut store = ChannelStore::new();
        let update = update_with(5, vec![partial(1, &[1, 2, 3], &[9, 9])]);

        let first = store.merge(&update);
        assert!(!first.is_noop());

        let before = store.clone();
        let second = store.merge(&update);
        assert!(second.is_noop());
        assert_eq!(store.channels(), before.channels());
        assert_eq!(store.frame_value(), before.frame_value());
    }

    #[test]
    fn out_of_order_channels_stay_sorted() {
        let mut store = ChannelStore::new();
        for number in [9u32, 3, 7, 0, 5] {
            store.merge(&update_with(1, vec![partial(number, &[1], &[])]));
        }

        let numbers: Vec<u32> = store.channels().iter().map(|c| c.number).collect();
        assert_eq!(numbers, vec![0, 3, 5, 7, 9]);
    }

    #[test]
    fn partial_update_leaves_untouched_cells() {
        let mut store = ChannelStore::new();
        store.merge(&update_with(1, vec![partial(2, &[10, 11, 12, 13, 14, 15, 16, 17], &[])]));

        // Touch cells 3 and 4 only: the prefix carries the existing values
        // for 0..3, so compare-and-set leaves them alone.
        let outcome = store.merge(&update_with(2, vec![partial(2, &[10, 11, 12, 90, 91], &[])]));
        assert_eq!(outcome.cells_changed, 2);

        let channel = store.channel(2).unwrap();
        assert_eq!(channel.data, [10, 11, 12, 90, 91, 15, 16, 17]);
    }

    #[test]
    fn value_write_is_suppressed_when_unchanged() {
        let mut store = ChannelStore::new();
        store.merge(&update_with(7, vec![partial(1, &[1], &[])]));

        let outcome = store.merge(&update_with(7, vec![partial(1, &[2], &[])]));
        assert!(!outcome.value_changed);
        assert_eq!(store.frame_value(), 7);
    }

    #[test]
    fn empty_partial_is_a_no_op() {
        let mut store = ChannelStore::new();
        let outcome = store.merge(&update_with(1, vec![partial(6, &[], &[])]));

        assert!(store.channel(6).is_none());
        assert_eq!(outcome.channels_added, 0);
        assert_eq!(outcome.cells_changed, 0);
    }

    #[test]
    fn format_cells_merge_with_same_discipline() {
        let mut store = ChannelStore::new();
        store.merge(&update_with(1, vec![partial(3, &[], &[5, 6])]));

        let channel = store.channel(3).unwrap();
        assert_eq!(channel.format, [5, 6, 0, 0, 0, 0, 0, 0]);
        assert_eq!(channel.data, [0; CHANNEL_WIDTH]);

        let outcome = store.merge(&update_with(2, vec![partial(3, &[], &[5, 7])]));
        assert_eq!(outcome.cells_changed, 1);
        assert_eq!(store.channel(3).unwrap().format[1], 7);
    }

    #[test]
    fn cells_beyond_display_width_are_ignored() {
        let mut store = ChannelStore::new();
        let long: Vec<u8> = (1..=12).collect();
        store.merge(&update_with(1, vec![partial(4, &long, &[])]));

        let channel = store.channel(4).unwrap();
        assert_eq!(channel.data, [1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn merge_never_touches_preformatted() {
        let mut store = ChannelStore::new();
        store.merge(&update_with(1, vec![partial(2, &[1], &[])]));
        assert!(store.annotate_preformatted(2, Some("12:03.4".into())));

        store.merge(&update_with(2, vec![partial(2, &[9, 9, 9], &[])]));
        assert_eq!(store.channel(2).unwrap().preformatted.as_deref(), Some("12:03.4"));
    }

    #[test]
    fn annotate_unknown_channel_is_rejected() {
        let mut store = ChannelStore::new();
        assert!(!store.annotate_preformatted(99, Some("x".into())));
    }

    #[test]
    fn snapshot_update_round_trips_through_merge() {
        let mut store = ChannelStore::new();
        store.merge(&update_with(3, vec![partial(1, &[49, 50, 51], &[1]), partial(8, &[52], &[])]));

        let snapshot = store.snapshot_update(4);
        let mut replica = ChannelStore::new();
        replica.merge(&snapshot);

        assert_eq!(replica.channels(), store.channels());
        assert_eq!(replica.frame_value(), 4);
    }

    fn arb_partial() -> impl Strategy<Value = PartialChannel> {
        (
            0u32..16,
            proptest::collection::vec(any::<u8>(), 0..=8),
            proptest::collection::vec(any::<u8>(), 0..=8),
        )
            .prop_map(|(number, data, format)| PartialChannel { number, data, format })
    }

    fn arb_update() -> impl Strategy<Value = FrameUpdate> {
        (any::<u64>(), proptest::collection::vec(arb_partial(), 0..6)).prop_map(
            |(value, partials)| {
                let mut channels = BTreeMap::new();
                for partial in partials {
                    channels.insert(partial.number, partial);
                }
                FrameUpdate { value, channels }
            },
        )
    }

    proptest! {
        #[test]
        fn channels_always_sorted_after_any_merge_sequence(
            updates in proptest::collection::vec(arb_update(), 0..12)
        ) {
            let mut store = ChannelStore::new();
            for update in &updates {
                store.merge(update);

                let numbers: Vec<u32> =
                    store.channels().iter().map(|c| c.number).collect();
                let mut sorted = numbers.clone();
                sorted.sort_unstable();
                sorted.dedup();
                prop_assert_eq!(&numbers, &sorted);
            }
        }

        #[test]
        fn repeat_merge_is_always_a_noop(update in arb_update()) {
            let mut store = ChannelStore::new();
            store.merge(&update);
            let outcome = store.merge(&update);
            prop_assert!(outcome.is_noop());
        }
    }
}
