//! Deciding which queue to operate on.

use std::fmt;

use crate::error::{Error, Result};
use crate::sqs::QueueService;

/// FIFO queue URLs (and names) carry this suffix.
pub const FIFO_SUFFIX: &str = ".fifo";

/// The caller's choice of queue: a name to look up, or a URL to use as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueueRef {
    Name(String),
    Url(String),
}

impl QueueRef {
    /// Accepts exactly one of `name` and `url`. Never touches the network.
    pub fn new(name: Option<&str>, url: Option<&str>) -> Result<Self> {
        match (name, url) {
            (Some(_), Some(_)) => Err(Error::Configuration(
                "Don't provide both queue and queue-url, that's ambiguous. Refusing to operate."
                    .into(),
            )),
            (None, None) => Err(Error::Configuration(
                "Provide either queue or queue-url.".into(),
            )),
            (Some(name), None) => Ok(Self::Name(name.to_string())),
            (None, Some(url)) => Ok(Self::Url(url.to_string())),
        }
    }

    /// Produces the canonical queue URL. Names are looked up; URLs are
    /// returned unchanged without checking that the queue exists.
    pub async fn resolve<Q: QueueService + ?Sized>(&self, service: &Q) -> Result<QueueUrl> {
        match self {
            Self::Name(name) => {
                let url = service.lookup(name).await?;
                log::debug!("resolved queue {name} to {url}");
                Ok(QueueUrl(url))
            }
            Self::Url(url) => Ok(QueueUrl(url.clone())),
        }
    }
}

/// Shortcut for [`QueueRef::new`] followed by [`QueueRef::resolve`].
pub async fn resolve<Q: QueueService + ?Sized>(
    service: &Q,
    name: Option<&str>,
    url: Option<&str>,
) -> Result<QueueUrl> {
    QueueRef::new(name, url)?.resolve(service).await
}

/// A resolved queue endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueueUrl(String);

impl QueueUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn mode(&self) -> QueueMode {
        QueueMode::from_url(&self.0)
    }
}

impl AsRef<str> for QueueUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether lines carry a group id prefix.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QueueMode {
    #[default]
    Standard,
    Fifo,
}

impl QueueMode {
    pub fn from_url(url: &str) -> Self {
        if url.ends_with(FIFO_SUFFIX) {
            Self::Fifo
        } else {
            Self::Standard
        }
    }

    pub fn is_fifo(self) -> bool {
        self == Self::Fifo
    }
}
