//! send-all: one message per input line.

use chrono::Utc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::codec::decode_outgoing;
use crate::error::{Error, Result};
use crate::queue::{QueueMode, QueueUrl};
use crate::sqs::{OutgoingMessage, QueueService};

/// A `MessageDeduplicationId` made from the current UTC time, down to the
/// microsecond. Two sends within the same microsecond get the same token.
pub fn deduplication_token() -> String {
    Utc::now().format("%Y%m%d%H%M%S%6f").to_string()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FillSummary {
    pub sent: usize,
    /// Lines dropped with a warning.
    pub skipped: usize,
}

/// Enqueues lines read from an input stream.
///
/// FIFO mode is decided once from the queue URL. In FIFO mode every line must
/// be `<group-id>\t<body>`; lines without the separator are skipped with a
/// warning. A failed send stops the run.
pub struct Filler<'a, Q: ?Sized> {
    queue: &'a Q,
    url: QueueUrl,
    mode: QueueMode,
}

impl<'a, Q: QueueService + ?Sized> Filler<'a, Q> {
    pub fn new(queue: &'a Q, url: QueueUrl) -> Self {
        let mode = url.mode();
        Self { queue, url, mode }
    }

    pub fn mode(&self) -> QueueMode {
        self.mode
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&self, input: R) -> Result<FillSummary> {
        let mut summary = FillSummary::default();
        // strips `\n` or `\r\n`, nothing else
        let mut lines = input.lines();

        while let Some(line) = lines.next_line().await? {
            if self.send_line(&line).await? {
                summary.sent += 1;
            } else {
                summary.skipped += 1;
            }
        }

        log::debug!("reached end of input");
        Ok(summary)
    }

    /// Returns false when the line was skipped.
    async fn send_line(&self, line: &str) -> Result<bool> {
        let decoded = match decode_outgoing(line, self.mode) {
            Ok(decoded) => decoded,
            Err(e @ Error::MalformedLine { .. }) => {
                log::warn!("{e}. Skipping.");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if decoded.body.is_empty() {
            log::warn!("Line `{line}` has an empty body. Skipping.");
            return Ok(false);
        }

        let message = OutgoingMessage {
            body: decoded.body,
            group_id: decoded.group_id,
            deduplication_id: self.mode.is_fifo().then(deduplication_token),
        };
        log::debug!("sending {message:?}");
        self.queue.send(self.url.as_str(), message).await?;

        Ok(true)
    }
}
