//! Channel snapshot and display decoding for laneframe.
//!
//! This crate holds the two engines at the center of the system:
//!
//! - [`ChannelStore`]: folds sparse [`FrameUpdate`]s into an ordered,
//!   fixed-shape snapshot of every display channel seen so far, writing only
//!   cells that actually changed.
//! - [`format`]: decodes a channel's 8 raw bytes into a human-readable
//!   string under one of four interpretation schemes ([`Kind`]), each with
//!   its own blanking rules.
//!
//! [`DisplayPreferences`] selects the scheme per channel and is the only
//! state that survives a restart; the snapshot itself is always rebuilt from
//! the live feed.
//!
//! Everything here is synchronous and I/O-free apart from preference
//! persistence. Transport lives in `laneframe-client` and
//! `laneframe-server`.
//!
//! [`FrameUpdate`]: laneframe_proto::FrameUpdate

#![forbid(unsafe_code)]

mod channel;
pub mod format;
mod glyph;
mod prefs;
mod store;

pub use channel::Channel;
pub use format::{Formatter, Kind, decode, display, resolve};
pub use glyph::Glyph;
pub use prefs::{DisplayPreferences, PreferenceUpdate, PrefsError};
pub use store::{ChannelStore, MergeOutcome};
