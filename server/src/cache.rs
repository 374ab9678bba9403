use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

struct Entry<V> {
    value: Arc<V>,
    computed_at: Instant,
}

/// Single-entry-per-key memoization with a fixed validity window.
///
/// Entries are swapped in whole under the write lock, so a reader sees either
/// the previous value or the new one. Failed computations are not stored.
pub struct TtlCache<K, V> {
    ttl: Duration,
    capacity: Option<usize>,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(ttl: Duration, capacity: Option<usize>) -> Self {
        TtlCache {
            ttl,
            capacity: capacity.filter(|c| *c > 0),
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &K) -> Option<Arc<V>> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.computed_at.elapsed() < self.ttl)
            .map(|entry| entry.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().await;

        let now = Instant::now();
        entries.retain(|_, entry| now.duration_since(entry.computed_at) < self.ttl);

        if let Some(capacity) = self.capacity {
            while entries.len() >= capacity && !entries.contains_key(&key) {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.computed_at)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        entries.remove(&k);
                    }
                    None => break,
                }
            }
        }

        entries.insert(
            key,
            Entry {
                value: value.clone(),
                computed_at: now,
            },
        );
        value
    }

    /// Returns the live entry for `key`, or runs `compute` and stores its
    /// result. The lock is not held while computing.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }
        let value = compute().await?;
        Ok(self.insert(key, value).await)
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
