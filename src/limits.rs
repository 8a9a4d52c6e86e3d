use serde::{Deserialize, Serialize};

/// Various limits on incoming data
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Limits {
    /// Max number of bytes buffered at once, unlimited when `None`
    pub stream_size: Option<u64>,
}

impl Limits {
    /// Max number of buffered bytes
    #[must_use]
    pub fn stream_size(mut self, max: u64) -> Self {
        self.stream_size.replace(max);
        self
    }

    /// Check stream size
    #[must_use]
    pub fn checked_stream_size(&self, rhs: u64) -> Option<u64> {
        self.stream_size.filter(|max| rhs > *max)
    }
}
