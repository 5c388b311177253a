//! receive-all: print every available message, then delete it.

use std::collections::HashSet;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::codec::encode_received;
use crate::error::{Error, Result};
use crate::queue::{QueueMode, QueueUrl};
use crate::sqs::{QueueService, Receipt, ReceiveRequest};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrainOptions {
    /// Long-poll wait per receive call.
    pub wait_time_seconds: i32,
    /// Upper bound on messages returned by one receive call.
    pub max_number_of_messages: i32,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            wait_time_seconds: 1,
            max_number_of_messages: 10,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainSummary {
    /// Receive calls made, including the final empty one.
    pub polls: usize,
    pub emitted: usize,
    /// Redeliveries of messages already printed in this run.
    pub skipped_duplicates: usize,
}

/// Empties a queue into a writer.
///
/// Polls until a receive call comes back empty. Every message is printed at
/// most once per run and deleted only after it was printed. Messages printed
/// before a failed delete stay printed, so a later run may print them again.
pub struct Drainer<'a, Q: ?Sized> {
    queue: &'a Q,
    url: QueueUrl,
    options: DrainOptions,
}

impl<'a, Q: QueueService + ?Sized> Drainer<'a, Q> {
    pub fn new(queue: &'a Q, url: QueueUrl, options: DrainOptions) -> Self {
        Self {
            queue,
            url,
            options,
        }
    }

    pub async fn run<W: AsyncWrite + Unpin>(&self, out: &mut W) -> Result<DrainSummary> {
        let mut seen = HashSet::new();
        let mut summary = DrainSummary::default();
        let request = ReceiveRequest {
            wait_time_seconds: self.options.wait_time_seconds,
            max_number_of_messages: self.options.max_number_of_messages,
            with_group_id: true,
        };

        loop {
            let messages = self.queue.receive(self.url.as_str(), request).await?;
            summary.polls += 1;
            log::debug!("poll {} returned {} message(s)", summary.polls, messages.len());

            // an empty poll means the queue has been drained
            if messages.is_empty() {
                return Ok(summary);
            }

            let mut receipts = Vec::with_capacity(messages.len());

            for message in messages {
                if !seen.insert(message.message_id.clone()) {
                    log::debug!("skipping redelivered message {}", message.message_id);
                    summary.skipped_duplicates += 1;
                    continue;
                }

                let mode = if message.group_id.is_some() {
                    QueueMode::Fifo
                } else {
                    QueueMode::Standard
                };
                let mut line = encode_received(&message, mode);
                line.push('\n');
                out.write_all(line.as_bytes()).await?;
                out.flush().await?;
                summary.emitted += 1;

                receipts.push(Receipt {
                    message_id: message.message_id,
                    receipt_handle: message.receipt_handle,
                });
            }

            self.acknowledge(&receipts).await?;
        }
    }

    async fn acknowledge(&self, receipts: &[Receipt]) -> Result<()> {
        // nothing new in this poll
        if receipts.is_empty() {
            return Ok(());
        }

        let failed = match self.queue.delete_batch(self.url.as_str(), receipts).await {
            Ok(failed) => failed,
            Err(e) => {
                return Err(Error::Acknowledgment {
                    failed: receipts.iter().map(|r| r.message_id.clone()).collect(),
                    source: Some(Box::new(e)),
                })
            }
        };

        if failed.is_empty() {
            return Ok(());
        }

        for id in &failed {
            log::error!("message {id} was printed but could not be deleted");
        }
        Err(Error::Acknowledgment {
            failed,
            source: None,
        })
    }
}
