use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Unregisters whatever was registered when it was handed out. Calling it
/// after the owner is gone is a no-op.
pub type RemoveFn = Box<dyn FnOnce() + Send + Sync>;

struct CallbackList<T> {
    next_id: u64,
    entries: Vec<(u64, T)>,
}

/// Ordered registration list shared by guards, hooks and listeners.
pub struct Callbacks<T> {
    inner: Arc<Mutex<CallbackList<T>>>,
}

impl<T> Default for Callbacks<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CallbackList {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T: Clone + Send + 'static> Callbacks<T> {
    pub fn add(&self, item: T) -> RemoveFn {
        let id = {
            let mut list = self.inner.lock();
            let id = list.next_id;
            list.next_id += 1;
            list.entries.push((id, item));
            id
        };

        let weak: Weak<Mutex<CallbackList<T>>> = Arc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.lock().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Snapshot in registration order; callers never run user code while
    /// the list is locked.
    pub fn list(&self) -> Vec<T> {
        self.inner
            .lock()
            .entries
            .iter()
            .map(|(_, item)| item.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn reset(&self) {
        self.inner.lock().entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remover_only_drops_its_own_entry() {
        let callbacks: Callbacks<&'static str> = Callbacks::default();
        let remove_first = callbacks.add("first");
        let _keep = callbacks.add("second");

        remove_first();
        assert_eq!(callbacks.list(), vec!["second"]);
    }

    #[test]
    fn remover_outliving_list_is_noop() {
        let callbacks: Callbacks<u8> = Callbacks::default();
        let remove = callbacks.add(1);
        drop(callbacks);
        remove();
    }
}
