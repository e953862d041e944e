//! A fixed watcher pool.

use async_trait::async_trait;
use correlation::{Watcher, WatcherRegistry};

/// Watchers known up front, e.g. from a configuration file.
#[derive(Debug, Clone, Default)]
pub struct StaticWatcherRegistry {
    watchers: Vec<Watcher>,
}

impl StaticWatcherRegistry {
    pub fn new(watchers: Vec<Watcher>) -> Self {
        Self { watchers }
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

#[async_trait]
impl WatcherRegistry for StaticWatcherRegistry {
    async fn watchers(&self) -> Vec<Watcher> {
        self.watchers.clone()
    }
}
