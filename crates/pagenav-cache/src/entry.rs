//! Cache entry lifecycle.

use tokio::time::Instant;

/// A stored value paired with its absolute expiry time.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub(crate) value: V,
    pub(crate) expires_at: Instant,
    /// Insertion stamp. Overwriting a key keeps the original stamp, so
    /// capacity trimming evicts by first insertion rather than last write.
    pub(crate) seq: u64,
}

impl<V> Entry<V> {
    pub(crate) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_at_deadline() {
        let entry = Entry {
            value: "v",
            expires_at: Instant::now() + Duration::from_millis(10),
            seq: 0,
        };
        assert!(!entry.is_expired(Instant::now()));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(entry.is_expired(Instant::now()));
    }
}
