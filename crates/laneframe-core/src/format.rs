//! Display decoding schemes.
//!
//! Four schemes interpret a channel's 8 data bytes. RAW is the literal
//! transcription; CLOCK reads cells 2-7 as a race clock; LANE and EVENT
//! build on the same clock-digit projection with their own output shapes.
//! Dispatch is a fixed table indexed by [`Kind`] ordinal - the enum is
//! closed, so an out-of-range lookup is unreachable by construction and
//! ordinal validation happens at deserialization boundaries instead.
//!
//! The ordinals are an external contract shared with preference files and
//! non-Rust consumers: `RAW=0, CLOCK=1, LANE=2, EVENT=3`. Never renumber.

use serde::{Deserialize, Serialize};

use crate::{channel::Channel, glyph::Glyph};

/// Decoding scheme for a display channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Kind {
    /// Literal byte-to-character transcription of all 8 cells.
    Raw = 0,
    /// Race clock, `MM:SS.dc` from cells 2-7.
    Clock = 1,
    /// Lane and place prefix followed by the clock.
    Lane = 2,
    /// Event and heat numbers, underscores stripped.
    Event = 3,
}

impl Kind {
    /// All schemes in ordinal order.
    pub const ALL: [Self; 4] = [Self::Raw, Self::Clock, Self::Lane, Self::Event];

    /// Wire/persistence ordinal of this scheme.
    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Scheme for an ordinal, `None` if out of range.
    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(usize::from(ordinal)).copied()
    }
}

impl From<Kind> for u8 {
    fn from(kind: Kind) -> Self {
        kind.ordinal()
    }
}

impl TryFrom<u8> for Kind {
    type Error = String;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        Self::from_ordinal(ordinal).ok_or_else(|| format!("unknown display kind ordinal {ordinal}"))
    }
}

/// A decoding function for one scheme.
pub type Formatter = fn(&Channel) -> String;

/// Fixed table of decoders, indexed by [`Kind`] ordinal.
const FORMATTERS: [Formatter; 4] = [decode_raw, decode_clock, decode_lane, decode_event];

/// Resolve a scheme selection to its decoder. Absent selects RAW.
pub fn resolve(kind: Option<Kind>) -> Formatter {
    FORMATTERS[usize::from(kind.unwrap_or(Kind::Raw).ordinal())]
}

/// Decode a channel's data cells under the selected scheme.
pub fn decode(kind: Option<Kind>, channel: &Channel) -> String {
    resolve(kind)(channel)
}

/// Display string for a channel: the upstream-rendered `preformatted`
/// passthrough when present, otherwise the decoded data cells.
pub fn display(kind: Option<Kind>, channel: &Channel) -> String {
    match &channel.preformatted {
        Some(text) => text.clone(),
        None => decode(kind, channel),
    }
}

/// Cell projection shared by the clock-style schemes: blanks become `'_'`.
fn cell(channel: &Channel, index: usize) -> char {
    Glyph::classify(channel.data[index]).or_placeholder()
}

/// Literal transcription; never substitutes, blank bytes render as their
/// own characters.
fn decode_raw(channel: &Channel) -> String {
    channel.data.iter().map(|&b| char::from(b)).collect()
}

/// Cells 2-7 as `MM:SS.dc`.
///
/// When cells 5 and 6 both project to the literal `'0'` the clock is not
/// running and the output is the fixed sentinel. Otherwise blanked digits
/// display as zero.
fn decode_clock(channel: &Channel) -> String {
    if cell(channel, 5) == '0' && cell(channel, 6) == '0' {
        return "--:--.-".to_string();
    }

    let digits: String = [
        cell(channel, 2),
        cell(channel, 3),
        ':',
        cell(channel, 4),
        cell(channel, 5),
        '.',
        cell(channel, 6),
        cell(channel, 7),
    ]
    .into_iter()
    .collect();

    digits.replace('_', "0")
}

/// Lane number and place (cells 0 and 1, blanks kept as `'_'`), then the
/// clock.
fn decode_lane(channel: &Channel) -> String {
    format!("{} {} {}", cell(channel, 0), cell(channel, 1), decode_clock(channel))
}

/// Event (cells 0-2) and heat (cells 5-7), with every `'_'` stripped from
/// the combined output rather than replaced.
fn decode_event(channel: &Channel) -> String {
    let event: String = (0..3).map(|i| cell(channel, i)).collect();
    let heat: String = (5..8).map(|i| cell(channel, i)).collect();

    format!("{event}, {heat}").replace('_', "")
}
