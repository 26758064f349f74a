/*
[INPUT]:  Board snapshots produced by each state change
[OUTPUT]: Ordered synchronous delivery to registered listeners
[POS]:    State layer - observer registry behind `TaskBoard::subscribe`
[UPDATE]: When delivery ordering or subscription lifetime rules change
*/

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::board::lock;
use crate::board::snapshot::BoardSnapshot;

/// Callback invoked with every new board snapshot
pub type Listener = dyn Fn(&BoardSnapshot) + Send + Sync;

/// Listener registry.
///
/// Snapshots are queued in the order the state changed and delivered to
/// every listener in registration order. A change made from inside a
/// listener is queued and delivered once the current round finishes.
#[derive(Default)]
pub(crate) struct Notifier {
    listeners: std::sync::Mutex<Vec<(u64, Arc<Listener>)>>,
    next_id: AtomicU64,
    queue: std::sync::Mutex<VecDeque<Arc<BoardSnapshot>>>,
    delivering: AtomicBool,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("listeners", &lock(&self.listeners).len())
            .field("queued", &lock(&self.queue).len())
            .finish()
    }
}

struct DeliveryGuard<'a>(&'a AtomicBool);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Notifier {
    pub(crate) fn register(self: &Arc<Self>, listener: Arc<Listener>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((id, listener));
        Subscription {
            id,
            notifier: Arc::downgrade(self),
        }
    }

    fn unregister(&self, id: u64) {
        lock(&self.listeners).retain(|(listener_id, _)| *listener_id != id);
    }

    pub(crate) fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// Queue a snapshot. Call while still holding the state lock so queue order matches change order.
    pub(crate) fn enqueue(&self, snapshot: BoardSnapshot) {
        lock(&self.queue).push_back(Arc::new(snapshot));
    }

    /// Deliver queued snapshots unless another caller is already delivering
    pub(crate) fn flush(&self) {
        loop {
            if self
                .delivering
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            {
                let _guard = DeliveryGuard(&self.delivering);
                loop {
                    let next = lock(&self.queue).pop_front();
                    let Some(snapshot) = next else {
                        break;
                    };
                    let listeners: Vec<Arc<Listener>> = lock(&self.listeners)
                        .iter()
                        .map(|(_, listener)| Arc::clone(listener))
                        .collect();
                    for listener in listeners {
                        listener(&snapshot);
                    }
                }
            }

            // A snapshot queued between the last pop and releasing the flag would otherwise wait.
            if lock(&self.queue).is_empty() {
                return;
            }
        }
    }
}

/// Handle returned by `TaskBoard::subscribe`.
///
/// The listener stays registered until this handle is dropped or
/// [`unsubscribe`](Self::unsubscribe) is called.
#[must_use = "dropping a Subscription unregisters its listener"]
pub struct Subscription {
    id: u64,
    notifier: Weak<Notifier>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn unsubscribe(self) {}
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(notifier) = self.notifier.upgrade() {
            notifier.unregister(self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn snapshot(revision: u64) -> BoardSnapshot {
        BoardSnapshot {
            revision,
            ..BoardSnapshot::default()
        }
    }

    #[test]
    fn listeners_run_in_registration_order() {
        let notifier = Arc::new(Notifier::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let seen = Arc::clone(&seen);
            notifier.register(Arc::new(move |s: &BoardSnapshot| {
                seen.lock().unwrap().push(("first", s.revision))
            }))
        };
        let second = {
            let seen = Arc::clone(&seen);
            notifier.register(Arc::new(move |s: &BoardSnapshot| {
                seen.lock().unwrap().push(("second", s.revision))
            }))
        };

        notifier.enqueue(snapshot(1));
        notifier.enqueue(snapshot(2));
        notifier.flush();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
        drop((first, second));
    }

    #[test]
    fn dropping_subscription_unregisters() {
        let notifier = Arc::new(Notifier::default());
        let calls = Arc::new(AtomicU64::new(0));

        let subscription = {
            let calls = Arc::clone(&calls);
            notifier.register(Arc::new(move |_: &BoardSnapshot| {
                calls.fetch_add(1, Ordering::SeqCst);
            }))
        };
        assert_eq!(notifier.listener_count(), 1);

        subscription.unsubscribe();
        assert_eq!(notifier.listener_count(), 0);

        notifier.enqueue(snapshot(1));
        notifier.flush();
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn nested_changes_are_delivered_after_the_current_round() {
        let notifier = Arc::new(Notifier::default());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let _outer = {
            let seen = Arc::clone(&seen);
            let weak = Arc::downgrade(&notifier);
            notifier.register(Arc::new(move |s: &BoardSnapshot| {
                seen.lock().unwrap().push(s.revision);
                if s.revision == 1 {
                    if let Some(notifier) = weak.upgrade() {
                        notifier.enqueue(snapshot(2));
                        notifier.flush();
                    }
                }
            }))
        };

        notifier.enqueue(snapshot(1));
        notifier.flush();
        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }
}
