use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

/// Per-event mutual exclusion. Every mutation of an event's queue or status
/// runs under the lock for that event id, so two concurrent removals can
/// never promote the same waiting-list entry and reminder flags are
/// check-then-set atomically with the dispatch they guard.
#[derive(Default)]
pub struct EventLocks {
    locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_event(&self, event_id: &str) -> Arc<Mutex<()>> {
        let mut map = self.locks.lock().expect("event lock map poisoned");
        map.entry(event_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
