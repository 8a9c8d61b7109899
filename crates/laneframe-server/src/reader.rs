//! Console reader task.
//!
//! Pulls bytes from a [`ByteSource`], runs them through the console parser,
//! and merges each completed channel scan into the shared store. The reader
//! stamps merges with the store's current frame value - broadcast ticks own
//! the value sequence, so internal merges never advance it.

use std::sync::Arc;

use laneframe_core::ChannelStore;
use laneframe_proto::{ConsoleParser, FrameUpdate, PartialChannel};
use tokio::sync::Mutex;

use crate::{error::ServerError, source::ByteSource};

/// Read the console input to completion, merging scans into `store`.
///
/// # Errors
///
/// - [`ServerError::Input`] if the source fails mid-stream.
pub async fn run_reader(
    mut source: ByteSource,
    store: Arc<Mutex<ChannelStore>>,
) -> Result<(), ServerError> {
    let mut parser = ConsoleParser::new();
    let mut buf = [0u8; 512];

    loop {
        let Some(read) = source.read_chunk(&mut buf).await? else {
            break;
        };

        let mut scans = Vec::new();
        for &byte in &buf[..read] {
            if let Some(partial) = parser.push(byte) {
                scans.push(partial);
            }
        }

        if !scans.is_empty() {
            apply_scans(&store, scans).await;
        }
    }

    if let Some(partial) = parser.finish() {
        apply_scans(&store, vec![partial]).await;
    }

    tracing::info!("console input finished");
    Ok(())
}

async fn apply_scans(store: &Mutex<ChannelStore>, scans: Vec<PartialChannel>) {
    let mut store = store.lock().await;
    let value = store.frame_value();

    for partial in scans {
        let number = partial.number;
        let outcome = store.merge(&FrameUpdate::single(value, partial));
        if !outcome.is_noop() {
            tracing::trace!(channel = number, cells = outcome.cells_changed, "scan merged");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{io::Write, time::Duration};

    use super::*;

    /// Control byte selecting `channel` on the data bank.
    fn control(channel: u8) -> u8 {
        0x80 | ((channel ^ 0x1F) << 1)
    }

    /// Segment byte writing digit `digit` to `cell` (inverted BCD).
    fn segment(cell: u8, digit: u8) -> u8 {
        (cell << 4) | ((digit - b'0') ^ 0x0F)
    }

    fn capture(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn capture_file_ends_up_in_the_store() {
        // Scan channel 2 with "12" in cells 0-1, then move to channel 3 to
        // flush it, writing "7" there.
        let bytes = vec![
            control(2),
            segment(0, b'1'),
            segment(1, b'2'),
            control(3),
            segment(0, b'7'),
        ];
        let file = capture(&bytes);

        let store = Arc::new(Mutex::new(ChannelStore::new()));
        let source =
            ByteSource::open(file.path(), false, Duration::ZERO).await.unwrap();
        run_reader(source, Arc::clone(&store)).await.unwrap();

        let store = store.lock().await;
        let two = store.channel(2).unwrap();
        assert_eq!(&two.data[..2], b"12");

        // Channel 3 was still in progress at EOF; finish() flushed it.
        let three = store.channel(3).unwrap();
        assert_eq!(three.data[0], b'7');
    }

    #[tokio::test]
    async fn reader_does_not_advance_the_frame_value() {
        let bytes = vec![control(2), segment(0, b'5'), control(3)];
        let file = capture(&bytes);

        let store = Arc::new(Mutex::new(ChannelStore::new()));
        let source =
            ByteSource::open(file.path(), false, Duration::ZERO).await.unwrap();
        run_reader(source, Arc::clone(&store)).await.unwrap();

        assert_eq!(store.lock().await.frame_value(), 0);
    }
}
