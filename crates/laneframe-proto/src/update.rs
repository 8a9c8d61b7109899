//! Frame update data model.
//!
//! A [`FrameUpdate`] is a partial, possibly sparse description of changes to
//! one or more display channels, tagged with a frame value. The JSON shape is
//! the external contract shared with non-Rust consumers:
//!
//! ```json
//! {"value": 7, "channels": {"2": {"number": 2, "data": [49, ...], "format": [0, ...]}}}
//! ```
//!
//! Byte values are integers in `[0, 255]`; anything else fails
//! deserialization and the line is dropped by the receiver.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of digit positions on a display channel.
///
/// Every channel is an 8-digit physical display; cell indices at or beyond
/// this width are never produced or consumed.
pub const CHANNEL_WIDTH: usize = 8;

/// Byte code for an unlit digit position (ASCII space).
pub const BLANK_BYTE: u8 = 0x20;

/// A partial description of one channel's cells.
///
/// `data` and `format` are prefixes of the channel's 8 cells: an update may
/// carry fewer than 8 entries and receivers must not treat it as a
/// full-channel refresh. The two sequences share index space.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialChannel {
    /// Channel number (stable identity).
    pub number: u32,

    /// Raw digit/segment codes for cells `0..data.len()`.
    #[serde(default)]
    pub data: Vec<u8>,

    /// Pre-rendered digit codes for cells `0..format.len()`. Kept separate
    /// from `data`; used for fallback rendering, never decoded by the
    /// display formatters.
    #[serde(default)]
    pub format: Vec<u8>,
}

impl PartialChannel {
    /// Create a full-width partial from complete cell images.
    pub fn full(number: u32, data: [u8; CHANNEL_WIDTH], format: [u8; CHANNEL_WIDTH]) -> Self {
        Self { number, data: data.to_vec(), format: format.to_vec() }
    }

    /// True if the partial carries no cell entries at all.
    ///
    /// Such a partial is a no-op for receivers: it must not even create the
    /// channel it names.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty() && self.format.is_empty()
    }
}

/// A frame update: one tagged batch of partial channel changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameUpdate {
    /// Monotonic identifier of the broadcast this update belongs to.
    pub value: u64,

    /// Channel number to partial cells. Keyed redundantly with
    /// [`PartialChannel::number`] to match the wire contract; the map key is
    /// authoritative for routing.
    pub channels: BTreeMap<u32, PartialChannel>,
}

impl FrameUpdate {
    /// Create an update carrying a single partial channel.
    pub fn single(value: u64, partial: PartialChannel) -> Self {
        let mut channels = BTreeMap::new();
        channels.insert(partial.number, partial);
        Self { value, channels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_shape_field_names() {
        let update = FrameUpdate::single(
            1,
            PartialChannel { number: 2, data: vec![49, 50], format: vec![0] },
        );

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": 1,
                "channels": {
                    "2": {"number": 2, "data": [49, 50], "format": [0]}
                }
            })
        );
    }

    #[test]
    fn missing_cell_arrays_default_to_empty() {
        let raw = r#"{"value": 3, "channels": {"5": {"number": 5}}}"#;
        let update: FrameUpdate = serde_json::from_str(raw).unwrap();

        let partial = &update.channels[&5];
        assert!(partial.is_empty());
    }

    #[test]
    fn byte_range_is_enforced() {
        let raw = r#"{"value": 0, "channels": {"1": {"number": 1, "data": [256]}}}"#;
        assert!(serde_json::from_str::<FrameUpdate>(raw).is_err());
    }

    #[test]
    fn channels_iterate_in_number_order() {
        let mut update = FrameUpdate::default();
        for number in [7u32, 1, 4] {
            update
                .channels
                .insert(number, PartialChannel { number, data: vec![0], format: vec![] });
        }

        let keys: Vec<u32> = update.channels.keys().copied().collect();
        assert_eq!(keys, vec![1, 4, 7]);
    }
}
