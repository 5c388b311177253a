//! Line encoding of messages: `<body>`, or `<group-id>\t<body>` for FIFO queues.
//!
//! Bodies are never escaped. A body containing a tab or a newline comes out
//! verbatim and is ambiguous downstream; that is the caller's problem.

use crate::error::{Error, Result};
use crate::queue::QueueMode;
use crate::sqs::Message;

/// Separates the message group id from the body.
pub const SEPARATOR: char = '\t';

/// Renders a received message as one output line (without terminator).
///
/// An absent or empty group id means no prefix at all, never a leading tab.
pub fn encode_received(message: &Message, mode: QueueMode) -> String {
    match (mode, message.group_id.as_deref()) {
        (QueueMode::Fifo, Some(group_id)) if !group_id.is_empty() => {
            format!("{group_id}{SEPARATOR}{}", message.body)
        }
        _ => message.body.clone(),
    }
}

/// A line split into what gets sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoded<'a> {
    pub group_id: Option<&'a str>,
    pub body: &'a str,
}

/// Splits an input line. In FIFO mode only the first tab separates; the
/// rest belongs to the body.
pub fn decode_outgoing(line: &str, mode: QueueMode) -> Result<Decoded<'_>> {
    match mode {
        QueueMode::Standard => Ok(Decoded {
            group_id: None,
            body: line,
        }),
        QueueMode::Fifo => match line.split_once(SEPARATOR) {
            Some((group_id, body)) => Ok(Decoded {
                group_id: Some(group_id),
                body,
            }),
            None => Err(Error::MalformedLine {
                line: line.to_string(),
                separator: SEPARATOR,
            }),
        },
    }
}
