use parking_lot::Mutex;

use super::{HistoryChange, HistoryListener, LocationSource, normalize_base};
use crate::enums::{NavigationDirection, NavigationType};
use crate::router::{Callbacks, RemoveFn};
use crate::types::HistoryState;

const START: &str = "/";

#[derive(Debug)]
struct Entries {
    queue: Vec<(String, Option<HistoryState>)>,
    position: usize,
}

impl Entries {
    fn new() -> Self {
        Self {
            queue: vec![(START.to_string(), None)],
            position: 0,
        }
    }

    fn set_location(&mut self, location: &str, state: Option<HistoryState>) {
        self.position += 1;
        self.queue.truncate(self.position);
        self.queue.push((location.to_string(), state));
    }

    fn current(&self) -> &(String, Option<HistoryState>) {
        &self.queue[self.position]
    }
}

/// In-process history stack for tests and non-browser hosts.
pub struct MemoryHistory {
    base: String,
    entries: Mutex<Entries>,
    listeners: Callbacks<HistoryListener>,
}

impl MemoryHistory {
    pub fn new(base: &str) -> Self {
        Self {
            base: normalize_base(base),
            entries: Mutex::new(Entries::new()),
            listeners: Callbacks::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().queue.is_empty()
    }

    pub fn position(&self) -> usize {
        self.entries.lock().position
    }

    /// Drops listeners and entries.
    pub fn destroy(&self) {
        self.listeners.reset();
        *self.entries.lock() = Entries::new();
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("")
    }
}

impl LocationSource for MemoryHistory {
    fn base(&self) -> &str {
        &self.base
    }

    fn location(&self) -> String {
        self.entries.lock().current().0.clone()
    }

    fn state(&self) -> Option<HistoryState> {
        self.entries.lock().current().1.clone()
    }

    fn push(&self, to: &str, state: Option<HistoryState>) {
        self.entries.lock().set_location(to, state);
    }

    fn replace(&self, to: &str, state: Option<HistoryState>) {
        // replacing also drops the forward entries
        let mut entries = self.entries.lock();
        let position = entries.position;
        entries.queue.truncate(position);
        entries.queue.push((to.to_string(), state));
    }

    fn go(&self, delta: i64, trigger_listeners: bool) {
        let (from, to) = {
            let mut entries = self.entries.lock();
            let from = entries.current().0.clone();
            let last = entries.queue.len().saturating_sub(1) as i64;
            entries.position = (entries.position as i64)
                .saturating_add(delta)
                .clamp(0, last) as usize;
            (from, entries.current().0.clone())
        };

        if !trigger_listeners {
            return;
        }
        let change = HistoryChange {
            delta,
            kind: NavigationType::Pop,
            direction: match delta {
                d if d < 0 => NavigationDirection::Back,
                d if d > 0 => NavigationDirection::Forward,
                _ => NavigationDirection::Unknown,
            },
        };
        for listener in self.listeners.list() {
            listener(&to, &from, &change);
        }
    }

    fn listen(&self, listener: HistoryListener) -> RemoveFn {
        self.listeners.add(listener)
    }
}
