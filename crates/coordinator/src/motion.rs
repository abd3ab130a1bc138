use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crossbeam_channel::{unbounded, Receiver, Sender};

#[derive(Default)]
struct PreferenceInner {
    reduced: bool,
    next_id: u64,
    watchers: Vec<(u64, Sender<bool>)>,
}

fn lock(inner: &Mutex<PreferenceInner>) -> MutexGuard<'_, PreferenceInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Live "prefers reduced motion" setting.
///
/// The host owns the preference and flips it; each consumer holds a
/// [`MotionWatch`] that sees the initial value plus every later change.
#[derive(Clone, Default)]
pub struct MotionPreference {
    inner: Arc<Mutex<PreferenceInner>>,
}

impl MotionPreference {
    pub fn new(reduced: bool) -> Self {
        let preference = Self::default();
        lock(&preference.inner).reduced = reduced;
        preference
    }

    pub fn is_reduced(&self) -> bool {
        lock(&self.inner).reduced
    }

    /// Updates the preference. Returns `true` if the value changed.
    pub fn set_reduced(&self, reduced: bool) -> bool {
        let mut inner = lock(&self.inner);
        if inner.reduced == reduced {
            return false;
        }
        inner.reduced = reduced;
        inner
            .watchers
            .retain(|(_, sender)| sender.send(reduced).is_ok());
        true
    }

    pub fn toggle(&self) -> bool {
        let next = !self.is_reduced();
        self.set_reduced(next);
        next
    }

    pub fn watch(&self) -> MotionWatch {
        let (sender, receiver) = unbounded();
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.watchers.push((id, sender));
        MotionWatch {
            id,
            current: inner.reduced,
            receiver,
            preference: Arc::downgrade(&self.inner),
        }
    }

    pub fn watcher_count(&self) -> usize {
        lock(&self.inner).watchers.len()
    }
}

impl std::fmt::Debug for MotionPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("MotionPreference")
            .field("reduced", &inner.reduced)
            .field("watchers", &inner.watchers.len())
            .finish()
    }
}

/// Receiving side of a [`MotionPreference`]. Dropping it stops the updates.
#[derive(Debug)]
pub struct MotionWatch {
    id: u64,
    current: bool,
    receiver: Receiver<bool>,
    preference: Weak<Mutex<PreferenceInner>>,
}

impl MotionWatch {
    /// A watch that never changes, for hosts without a live preference.
    pub fn fixed(reduced: bool) -> Self {
        let (_, receiver) = unbounded();
        Self {
            id: 0,
            current: reduced,
            receiver,
            preference: Weak::new(),
        }
    }

    pub fn is_reduced(&self) -> bool {
        self.current
    }

    /// Drains pending updates. Returns the latest value if it differs from
    /// what this watch last reported.
    pub fn poll_change(&mut self) -> Option<bool> {
        let latest = self.receiver.try_iter().last()?;
        if latest == self.current {
            return None;
        }
        self.current = latest;
        Some(latest)
    }
}

impl Drop for MotionWatch {
    fn drop(&mut self) {
        if let Some(inner) = self.preference.upgrade() {
            lock(&inner).watchers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_sees_initial_value_and_changes() {
        let preference = MotionPreference::new(true);
        let mut watch = preference.watch();
        assert!(watch.is_reduced());
        assert_eq!(watch.poll_change(), None);

        assert!(preference.set_reduced(false));
        assert!(!preference.set_reduced(false));
        assert_eq!(watch.poll_change(), Some(false));
        assert_eq!(watch.poll_change(), None);
    }

    #[test]
    fn flapping_collapses_to_latest() {
        let preference = MotionPreference::new(false);
        let mut watch = preference.watch();
        preference.toggle();
        preference.toggle();
        assert_eq!(watch.poll_change(), None);
        preference.toggle();
        assert_eq!(watch.poll_change(), Some(true));
    }

    #[test]
    fn dropping_watch_unregisters() {
        let preference = MotionPreference::new(false);
        let first = preference.watch();
        let second = preference.watch();
        assert_eq!(preference.watcher_count(), 2);
        drop(first);
        assert_eq!(preference.watcher_count(), 1);
        drop(second);
        assert_eq!(preference.watcher_count(), 0);
    }

    #[test]
    fn fixed_watch_never_changes() {
        let mut watch = MotionWatch::fixed(true);
        assert!(watch.is_reduced());
        assert_eq!(watch.poll_change(), None);
    }
}
