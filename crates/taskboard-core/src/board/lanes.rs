/*
[INPUT]:  Task ids targeted by mutations
[OUTPUT]: FIFO per-id locks serializing mutations on the same task
[POS]:    State layer - ordering guarantee for in-flight requests
[UPDATE]: When the per-task ordering contract changes
*/

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::board::lock;

/// One FIFO lock per task id with a mutation queued or in flight.
///
/// Tokio's mutex grants the lock in request order, so mutations on one id
/// reach the store in call order. Distinct ids never wait on each other.
#[derive(Debug, Default)]
pub(crate) struct Lanes {
    lanes: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Lanes {
    /// Wait until every earlier mutation on `id` has settled
    pub(crate) async fn acquire(&self, id: &str) -> LaneGuard<'_> {
        let lane = Arc::clone(lock(&self.lanes).entry(id.to_string()).or_default());
        let guard = Arc::clone(&lane).lock_owned().await;
        LaneGuard {
            lanes: self,
            id: id.to_string(),
            lane,
            guard: Some(guard),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        lock(&self.lanes).len()
    }
}

pub(crate) struct LaneGuard<'a> {
    lanes: &'a Lanes,
    id: String,
    lane: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut lanes = lock(&self.lanes.lanes);
        // Only the map and this guard still reference the lane: nobody is queued.
        if Arc::strong_count(&self.lane) == 2 {
            lanes.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn lane_is_dropped_when_idle() {
        let lanes = Lanes::default();
        {
            let _guard = lanes.acquire("T1").await;
            assert_eq!(lanes.len(), 1);
        }
        assert_eq!(lanes.len(), 0);
    }

    #[tokio::test]
    async fn distinct_ids_do_not_block() {
        let lanes = Lanes::default();
        let _t1 = lanes.acquire("T1").await;
        let t2 = tokio::time::timeout(Duration::from_millis(100), lanes.acquire("T2")).await;
        assert!(t2.is_ok());
    }

    #[tokio::test]
    async fn same_id_waits_for_release() {
        let lanes = Lanes::default();
        let first = lanes.acquire("T1").await;
        let blocked = tokio::time::timeout(Duration::from_millis(50), lanes.acquire("T1")).await;
        assert!(blocked.is_err());

        drop(first);
        let second = tokio::time::timeout(Duration::from_millis(100), lanes.acquire("T1")).await;
        assert!(second.is_ok());
    }
}
