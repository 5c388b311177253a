//! The queue service seam and its AWS SQS implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs as sqs;
use sqs::error::ProvideErrorMetadata;
use sqs::types::{DeleteMessageBatchRequestEntry, MessageSystemAttributeName};

use crate::error::{Error, Result};

/// SQS refuses batch requests with more entries than this.
pub const MAX_BATCH_ENTRIES: usize = 10;

/// Error code older endpoints (and LocalStack) use for a missing queue.
const NON_EXISTENT_QUEUE: &str = "AWS.SimpleQueueService.NonExistentQueue";

/// A message as handed out by the queue service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Unique identifier assigned by the service, used for local deduplication.
    pub message_id: String,
    /// Single-use token required to delete the message.
    pub receipt_handle: String,
    pub body: String,
    /// Only present for messages of a FIFO queue.
    pub group_id: Option<String>,
}

impl Message {
    /// Converts an AWS SDK message into a [`Message`].
    ///
    /// A message without id or receipt handle cannot be deduplicated or
    /// acknowledged, so it is rejected. A missing body is read as empty.
    pub fn from_aws_message(message: sqs::types::Message) -> Result<Self> {
        let sqs::types::Message {
            message_id,
            receipt_handle,
            body,
            mut attributes,
            ..
        } = message;

        let message_id =
            message_id.ok_or_else(|| Error::InvalidResponse("message without MessageId".into()))?;
        let receipt_handle = receipt_handle.ok_or_else(|| {
            Error::InvalidResponse(format!("message {message_id} without ReceiptHandle"))
        })?;
        let group_id = attributes
            .as_mut()
            .and_then(|a| a.remove(&MessageSystemAttributeName::MessageGroupId));

        Ok(Self {
            message_id,
            receipt_handle,
            body: body.unwrap_or_default(),
            group_id,
        })
    }
}

/// Parameters of one long-poll receive call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub wait_time_seconds: i32,
    pub max_number_of_messages: i32,
    /// Ask the service to return the `MessageGroupId` attribute.
    pub with_group_id: bool,
}

/// What [`QueueService::delete_batch`] needs to acknowledge one message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub message_id: String,
    pub receipt_handle: String,
}

/// One message to enqueue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingMessage<'a> {
    pub body: &'a str,
    pub group_id: Option<&'a str>,
    pub deduplication_id: Option<String>,
}

/// The four queue operations the drainer, filler and resolver rely on.
///
/// Retries, backoff and authentication are the implementation's business.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Translates a queue name into its URL.
    async fn lookup(&self, name: &str) -> Result<String>;

    /// Long-polls for messages. An empty vector means nothing is currently available.
    async fn receive(&self, queue_url: &str, request: ReceiveRequest) -> Result<Vec<Message>>;

    /// Deletes the given messages, returning the ids of entries the service
    /// refused. An `Err` means the call as a whole failed.
    async fn delete_batch(&self, queue_url: &str, receipts: &[Receipt]) -> Result<Vec<String>>;

    async fn send(&self, queue_url: &str, message: OutgoingMessage<'_>) -> Result<()>;
}

/// [`QueueService`] backed by the AWS SDK.
///
/// # Example
///
/// ```no_run
/// use sqsall::{QueueService, SqsQueue};
///
/// # async fn example() -> sqsall::Result<()> {
/// let config = aws_config::from_env().load().await;
/// let queue = SqsQueue::from_config(config);
///
/// let url = queue.lookup("my-dlq").await?;
/// println!("{url}");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SqsQueue {
    /// The AWS SDK configuration used for SQS operations
    pub config: SdkConfig,
    /// The SQS client instance
    pub client: sqs::Client,
}

impl SqsQueue {
    /// Creates an SqsQueue from a pre-built AWS SDK config.
    ///
    /// The caller decides on credentials, region and endpoint (e.g. the
    /// `--local` flag for LocalStack).
    pub fn from_config(config: SdkConfig) -> Self {
        let client = sqs::Client::new(&config);
        Self { config, client }
    }
}

#[async_trait]
impl QueueService for SqsQueue {
    async fn lookup(&self, name: &str) -> Result<String> {
        match self.client.get_queue_url().queue_name(name).send().await {
            Ok(output) => output
                .queue_url
                .ok_or_else(|| Error::InvalidResponse(format!("no QueueUrl for `{name}`"))),
            Err(e) if e.as_service_error().is_some_and(is_missing_queue) => {
                Err(Error::NotFound {
                    name: name.to_string(),
                    source: Some(Box::new(e)),
                })
            }
            Err(e) => Err(Error::transport("GetQueueUrl", e)),
        }
    }

    async fn receive(&self, queue_url: &str, request: ReceiveRequest) -> Result<Vec<Message>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .wait_time_seconds(request.wait_time_seconds)
            .max_number_of_messages(request.max_number_of_messages)
            .set_message_system_attribute_names(
                request
                    .with_group_id
                    .then(|| vec![MessageSystemAttributeName::MessageGroupId]),
            )
            .send()
            .await
            .map_err(|e| Error::transport("ReceiveMessage", e))?;

        output
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(Message::from_aws_message)
            .collect()
    }

    async fn delete_batch(&self, queue_url: &str, receipts: &[Receipt]) -> Result<Vec<String>> {
        let mut failed = Vec::new();

        for chunk in receipts.chunks(MAX_BATCH_ENTRIES) {
            let mut by_entry_id = HashMap::with_capacity(chunk.len());
            let mut entries = Vec::with_capacity(chunk.len());

            for (i, receipt) in chunk.iter().enumerate() {
                let id = BatchId::for_message(i, &receipt.message_id);
                entries.push(
                    DeleteMessageBatchRequestEntry::builder()
                        .id(id.as_ref())
                        .receipt_handle(&receipt.receipt_handle)
                        .build()
                        .map_err(|e| Error::transport("DeleteMessageBatch", e))?,
                );
                by_entry_id.insert(id.0, receipt.message_id.as_str());
            }

            let output = self
                .client
                .delete_message_batch()
                .queue_url(queue_url)
                .set_entries(Some(entries))
                .send()
                .await
                .map_err(|e| Error::transport("DeleteMessageBatch", e))?;

            for entry in output.failed() {
                log::error!(
                    "SQS refused to delete entry {}: {} {}",
                    entry.id(),
                    entry.code(),
                    entry.message().unwrap_or_default()
                );
                let message_id = by_entry_id.get(entry.id()).copied().unwrap_or(entry.id());
                failed.push(message_id.to_string());
            }
        }

        Ok(failed)
    }

    async fn send(&self, queue_url: &str, message: OutgoingMessage<'_>) -> Result<()> {
        self.client
            .send_message()
            .queue_url(queue_url)
            .message_body(message.body)
            .set_message_group_id(message.group_id.map(str::to_string))
            .set_message_deduplication_id(message.deduplication_id)
            .send()
            .await
            .map_err(|e| Error::transport("SendMessage", e))?;

        Ok(())
    }
}

fn is_missing_queue(e: &sqs::operation::get_queue_url::GetQueueUrlError) -> bool {
    e.is_queue_does_not_exist() || e.code() == Some(NON_EXISTENT_QUEUE)
}

/// Id of one entry within a batch request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchId(String);

impl BatchId {
    pub fn new<S: Into<String>>(id: S) -> Result<Self, String> {
        let id_str = id.into();
        if id_str.is_empty() {
            return Err("Batch ID cannot be empty".to_string());
        }
        if id_str.len() > 80 {
            return Err(format!(
                "Batch ID exceeds maximum length: {} > 80 characters",
                id_str.len()
            ));
        }
        for c in id_str.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
                return Err(format!(
                    "Invalid character in Batch ID: '{}'. Allowed: alphanumeric, '-', '_'",
                    c
                ));
            }
        }
        Ok(Self(id_str))
    }

    /// Uses the message id when the service would accept it, the entry's
    /// position otherwise.
    pub fn for_message(position: usize, message_id: &str) -> Self {
        Self::new(message_id).unwrap_or_else(|_| Self(format!("entry-{position}")))
    }
}

impl AsRef<str> for BatchId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
