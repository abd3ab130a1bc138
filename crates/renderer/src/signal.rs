//! One-shot "animation complete" broadcast owned by the renderer.
//!
//! Subscribers receive the event through a `crossbeam-channel` receiver. The
//! subscription only holds a weak reference back to the signal, so it can be
//! dropped after the renderer (and its signal) are gone.

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

/// Emitted once when every wave layer has finished fading in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationComplete {
    /// Frame timestamp of the tick that completed the fade-in.
    pub completed_at: Duration,
}

#[derive(Default)]
struct SignalInner {
    next_id: u64,
    subscribers: Vec<(u64, Sender<AnimationComplete>)>,
    fired: Option<AnimationComplete>,
}

fn lock(inner: &Mutex<SignalInner>) -> MutexGuard<'_, SignalInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone, Default)]
pub struct CompletionSignal {
    inner: Arc<Mutex<SignalInner>>,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber. If the signal already fired, the stored event
    /// is delivered right away.
    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = unbounded();
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        let fired = inner.fired;
        match fired {
            Some(event) => {
                let _ = sender.send(event);
            }
            None => inner.subscribers.push((id, sender)),
        }
        Subscription {
            id,
            receiver,
            signal: Arc::downgrade(&self.inner),
        }
    }

    /// Delivers `event` to every subscriber. Only the first call has an effect.
    pub(crate) fn fire(&self, event: AnimationComplete) -> bool {
        let mut inner = lock(&self.inner);
        if inner.fired.is_some() {
            return false;
        }
        inner.fired = Some(event);
        for (_, sender) in inner.subscribers.drain(..) {
            let _ = sender.send(event);
        }
        true
    }

    pub fn fired(&self) -> Option<AnimationComplete> {
        lock(&self.inner).fired
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }
}

impl std::fmt::Debug for CompletionSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("CompletionSignal")
            .field("subscribers", &inner.subscribers.len())
            .field("fired", &inner.fired)
            .finish()
    }
}

/// Receiving end of a [`CompletionSignal`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: Receiver<AnimationComplete>,
    signal: Weak<Mutex<SignalInner>>,
}

impl Subscription {
    /// Non-blocking check for the completion event.
    pub fn try_recv(&self) -> Option<AnimationComplete> {
        self.receiver.try_recv().ok()
    }

    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.signal.upgrade() {
            lock(&inner).subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ms: u64) -> AnimationComplete {
        AnimationComplete {
            completed_at: Duration::from_millis(ms),
        }
    }

    #[test]
    fn delivers_to_every_subscriber_once() {
        let signal = CompletionSignal::new();
        let first = signal.subscribe();
        let second = signal.subscribe();
        assert!(signal.fire(event(3500)));
        assert!(!signal.fire(event(4000)));
        assert_eq!(first.try_recv(), Some(event(3500)));
        assert_eq!(first.try_recv(), None);
        assert_eq!(second.try_recv(), Some(event(3500)));
    }

    #[test]
    fn late_subscribers_see_stored_event() {
        let signal = CompletionSignal::new();
        signal.fire(event(3600));
        let late = signal.subscribe();
        assert_eq!(late.try_recv(), Some(event(3600)));
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn dropping_subscription_removes_it() {
        let signal = CompletionSignal::new();
        let subscription = signal.subscribe();
        let other = signal.subscribe();
        assert_eq!(signal.subscriber_count(), 2);
        subscription.unsubscribe();
        assert_eq!(signal.subscriber_count(), 1);
        drop(other);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn subscription_outlives_signal() {
        let signal = CompletionSignal::new();
        let subscription = signal.subscribe();
        drop(signal);
        assert_eq!(subscription.try_recv(), None);
        drop(subscription);
    }
}
