//! Console input sources.
//!
//! The console byte stream arrives either from a serial device node (the
//! port is expected to be configured by the OS; we read it as a plain byte
//! stream) or from a capture file for development. A capture can be replayed
//! in a loop: on end-of-file the source seeks back to the start, with a
//! pacing delay between reads so a file does not replay at disk speed.

use std::{io::SeekFrom, path::Path, time::Duration};

use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt},
    time::sleep,
};

use crate::error::ServerError;

/// A paced, optionally looping byte source for the console reader.
#[derive(Debug)]
pub struct ByteSource {
    file: File,
    replay: bool,
    pace: Duration,
}

impl ByteSource {
    /// Open a device node or capture file.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Input`] if the path cannot be opened.
    pub async fn open(path: &Path, replay: bool, pace: Duration) -> Result<Self, ServerError> {
        let file = File::open(path)
            .await
            .map_err(|e| ServerError::Input(format!("open {}: {e}", path.display())))?;

        Ok(Self { file, replay, pace })
    }

    /// Read the next chunk into `buf`.
    ///
    /// Returns `Ok(None)` when the input is exhausted and replay is off.
    /// With replay on, end-of-file seeks back to the start and reading
    /// continues.
    ///
    /// # Errors
    ///
    /// - [`ServerError::Input`] on read or seek failure.
    pub async fn read_chunk(&mut self, buf: &mut [u8]) -> Result<Option<usize>, ServerError> {
        loop {
            if !self.pace.is_zero() {
                sleep(self.pace).await;
            }

            let read = self
                .file
                .read(buf)
                .await
                .map_err(|e| ServerError::Input(format!("read failed: {e}")))?;

            if read > 0 {
                return Ok(Some(read));
            }

            if !self.replay {
                return Ok(None);
            }

            tracing::debug!("input exhausted, replaying from start");
            self.file
                .seek(SeekFrom::Start(0))
                .await
                .map_err(|e| ServerError::Input(format!("replay seek failed: {e}")))?;
        }
    }
}
