//! # sqsall-core
//!
//! Treat an AWS SQS queue like a file: drain it to a line stream, or fill it
//! from one.
//!
//! ## Features
//!
//! - **receive-all**: poll until the queue is empty, print each message once,
//!   delete what was printed ([`Drainer`])
//! - **send-all**: send one message per input line ([`Filler`])
//! - **FIFO queues**: lines are framed as `<group-id>\t<body>`, and outgoing
//!   messages get a timestamp `MessageDeduplicationId`
//!
//! ## Example
//!
//! ```no_run
//! use sqsall::{DrainOptions, Drainer, QueueRef, SqsQueue};
//!
//! # async fn example() -> sqsall::Result<()> {
//! let queue = SqsQueue::from_config(aws_config::from_env().load().await);
//! let url = QueueRef::new(Some("my-dlq"), None)?.resolve(&queue).await?;
//!
//! let mut stdout = tokio::io::stdout();
//! Drainer::new(&queue, url, DrainOptions::default())
//!     .run(&mut stdout)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod codec;
mod drain;
mod error;
mod queue;
mod send;
mod sqs;

#[cfg(test)]
mod test_utils;

pub use codec::*;
pub use drain::*;
pub use error::*;
pub use queue::*;
pub use send::*;
pub use sqs::*;
