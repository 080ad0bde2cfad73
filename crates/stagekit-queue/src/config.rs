use serde::{Deserialize, Serialize};

/// Configuration for a [`WorkQueue`](crate::WorkQueue).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Maximum number of pending items. `None` means unbounded.
    pub capacity: Option<usize>,
}

impl QueueConfig {
    /// A configuration bounded to `capacity` pending items.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
        }
    }
}
