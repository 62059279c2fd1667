//! Decoding of newline-delimited JSON event streams.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

use crate::errors::{Result, TwelveLabsError};
use crate::models::StreamEvent;
use crate::poll::ObserverResult;

/// Read `reader` line by line and hand every decoded event to `on_event`.
///
/// Blank lines and lines that are not a JSON event are skipped: the service
/// interleaves keep-alive noise with events. Decoding stops right after a
/// `stream_end` event without reading further, or at EOF. The reader is
/// consumed and dropped on every exit path.
///
/// Returns the number of events delivered.
///
/// # Errors
///
/// - [`TwelveLabsError::Stream`] if reading fails, including a closed or
///   cancelled connection.
/// - [`TwelveLabsError::Callback`] if `on_event` returns an error; nothing
///   more is read.
pub async fn decode_events<R, F>(reader: R, mut on_event: F) -> Result<usize>
where
    R: AsyncRead + Unpin,
    F: FnMut(&StreamEvent) -> ObserverResult,
{
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut delivered = 0;

    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .await
            .map_err(TwelveLabsError::Stream)?;
        if n == 0 {
            return Ok(delivered);
        }

        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }

        let event: StreamEvent = match serde_json::from_slice(trimmed) {
            Ok(event) => event,
            Err(err) => {
                tracing::trace!(error = %err, "skipping non-event line");
                continue;
            }
        };

        on_event(&event).map_err(TwelveLabsError::Callback)?;
        delivered += 1;

        if event.is_end() {
            return Ok(delivered);
        }
    }
}
