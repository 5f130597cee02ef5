use chrono::DateTime;
use chrono::Utc;
use common::DEFAULT_IN_CHUNK_SIZE;

/// Per-evaluation parameters. Only records created strictly after `anchor` are counted.
#[derive(Clone, Debug)]
pub struct Context {
    pub website_id: String,
    pub anchor: DateTime<Utc>,
    pub in_chunk_size: usize,
}

impl Context {
    pub fn new(website_id: impl Into<String>, anchor: DateTime<Utc>) -> Self {
        Self {
            website_id: website_id.into(),
            anchor,
            in_chunk_size: DEFAULT_IN_CHUNK_SIZE,
        }
    }

    pub fn with_in_chunk_size(self, in_chunk_size: usize) -> Self {
        Self {
            in_chunk_size: in_chunk_size.max(1),
            ..self
        }
    }
}
