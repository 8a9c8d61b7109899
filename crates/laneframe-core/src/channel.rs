//! Channel record: one numbered 8-digit display unit.

use laneframe_proto::CHANNEL_WIDTH;

/// State of one display channel.
///
/// `data` holds the raw digit/segment codes the display formatters decode;
/// `format` holds the pre-rendered digit codes the console supplies
/// alongside them, kept separate for fallback rendering. Both are always
/// exactly [`CHANNEL_WIDTH`] cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    /// Channel number. Stable identity, never reassigned.
    pub number: u32,

    /// Raw digit/segment codes, most recently merged values.
    pub data: [u8; CHANNEL_WIDTH],

    /// Pre-rendered digit codes supplied alongside `data`.
    pub format: [u8; CHANNEL_WIDTH],

    /// Upstream-rendered string, passed through verbatim when present.
    /// Never written by the merge path; purely an external annotation.
    pub preformatted: Option<String>,
}

impl Channel {
    /// Create a channel with all cells zeroed and no annotation.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            data: [0; CHANNEL_WIDTH],
            format: [0; CHANNEL_WIDTH],
            preformatted: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_channel_is_zeroed() {
        let channel = Channel::new(4);
        assert_eq!(channel.number, 4);
        assert_eq!(channel.data, [0; CHANNEL_WIDTH]);
        assert_eq!(channel.format, [0; CHANNEL_WIDTH]);
        assert!(channel.preformatted.is_none());
    }
}
