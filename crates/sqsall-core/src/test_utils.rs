use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::sqs::{Message, OutgoingMessage, QueueService, Receipt, ReceiveRequest};

/// A message as recorded by [`FakeQueue::send`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sent {
    pub queue_url: String,
    pub body: String,
    pub group_id: Option<String>,
    pub deduplication_id: Option<String>,
}

#[derive(Default)]
struct State {
    calls: Vec<String>,
    polls: VecDeque<Vec<Message>>,
    receive_requests: Vec<ReceiveRequest>,
    deletes: Vec<Vec<Receipt>>,
    sent: Vec<Sent>,
}

/// In-memory [`QueueService`] that replays scripted polls and records every call.
#[derive(Default)]
pub struct FakeQueue {
    queues: HashMap<String, String>,
    refused_deletes: HashSet<String>,
    fail_delete_call: bool,
    fail_send_body: Option<String>,
    state: Mutex<State>,
}

impl FakeQueue {
    pub fn with_queue(mut self, name: &str, url: &str) -> Self {
        self.queues.insert(name.to_string(), url.to_string());
        self
    }

    /// Each call to `receive` pops the next batch; once exhausted the queue is empty.
    pub fn with_polls(self, polls: Vec<Vec<Message>>) -> Self {
        self.state.lock().unwrap().polls = polls.into();
        self
    }

    /// The service reports these message ids as failed entries.
    pub fn refusing_delete_of(mut self, message_id: &str) -> Self {
        self.refused_deletes.insert(message_id.to_string());
        self
    }

    /// The whole delete call fails.
    pub fn failing_deletes(mut self) -> Self {
        self.fail_delete_call = true;
        self
    }

    pub fn failing_send_of(mut self, body: &str) -> Self {
        self.fail_send_body = Some(body.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn receive_requests(&self) -> Vec<ReceiveRequest> {
        self.state.lock().unwrap().receive_requests.clone()
    }

    pub fn deletes(&self) -> Vec<Vec<Receipt>> {
        self.state.lock().unwrap().deletes.clone()
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.state.lock().unwrap().sent.clone()
    }
}

#[async_trait]
impl QueueService for FakeQueue {
    async fn lookup(&self, name: &str) -> Result<String> {
        self.state.lock().unwrap().calls.push(format!("lookup {name}"));
        self.queues.get(name).cloned().ok_or_else(|| Error::NotFound {
            name: name.to_string(),
            source: None,
        })
    }

    async fn receive(&self, queue_url: &str, request: ReceiveRequest) -> Result<Vec<Message>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("receive {queue_url}"));
        state.receive_requests.push(request);
        Ok(state.polls.pop_front().unwrap_or_default())
    }

    async fn delete_batch(&self, queue_url: &str, receipts: &[Receipt]) -> Result<Vec<String>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("delete {queue_url}"));
        state.deletes.push(receipts.to_vec());

        if self.fail_delete_call {
            return Err(Error::transport(
                "DeleteMessageBatch",
                std::io::Error::new(std::io::ErrorKind::Other, "connection reset"),
            ));
        }

        Ok(receipts
            .iter()
            .filter(|r| self.refused_deletes.contains(&r.message_id))
            .map(|r| r.message_id.clone())
            .collect())
    }

    async fn send(&self, queue_url: &str, message: OutgoingMessage<'_>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("send {queue_url}"));

        if self.fail_send_body.as_deref() == Some(message.body) {
            return Err(Error::transport(
                "SendMessage",
                std::io::Error::new(std::io::ErrorKind::Other, "access denied"),
            ));
        }

        state.sent.push(Sent {
            queue_url: queue_url.to_string(),
            body: message.body.to_string(),
            group_id: message.group_id.map(str::to_string),
            deduplication_id: message.deduplication_id,
        });
        Ok(())
    }
}

pub fn message(id: &str, body: &str, group_id: Option<&str>) -> Message {
    Message {
        message_id: id.to_string(),
        receipt_handle: format!("rh-{id}"),
        body: body.to_string(),
        group_id: group_id.map(str::to_string),
    }
}
