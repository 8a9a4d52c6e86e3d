use std::fmt;

use bytes::Bytes;
use rand::Rng;

pub const LIMITED: usize = 64;

/// Splits a body into chunks of at most `limit` bytes.
///
/// When `random`, each chunk gets its own size in `1..=limit`.
pub struct Limited {
    bytes: Bytes,
    limit: usize,
    length: u64,
    random: bool,
}

#[allow(dead_code)]
impl Limited {
    pub fn new(bytes: impl Into<Bytes>, limit: usize) -> Self {
        tracing::info!("Limited stream by {}", limit);

        Self {
            bytes: bytes.into(),
            limit: limit.max(1),
            length: 0,
            random: false,
        }
    }

    pub fn random(bytes: impl Into<Bytes>) -> Self {
        Self::random_with(bytes, LIMITED)
    }

    pub fn random_with(bytes: impl Into<Bytes>, max: usize) -> Self {
        Self {
            random: true,
            ..Self::new(bytes, max)
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl fmt::Debug for Limited {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Limited")
            .field("limit", &self.limit)
            .field("length", &self.length)
            .field("random", &self.random)
            .finish()
    }
}

impl Iterator for Limited {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.bytes.is_empty() {
            return None;
        }

        let limit = if self.random {
            rand::thread_rng().gen_range(1..=self.limit)
        } else {
            self.limit
        };
        let n = limit.min(self.bytes.len());
        self.length += n as u64;

        Some(self.bytes.split_to(n))
    }
}
