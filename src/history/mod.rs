mod memory;

pub use memory::MemoryHistory;

use std::sync::Arc;

use crate::enums::{NavigationDirection, NavigationType};
use crate::router::RemoveFn;
use crate::types::HistoryState;

/// Describes a location change the router did not initiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryChange {
    pub delta: i64,
    pub kind: NavigationType,
    pub direction: NavigationDirection,
}

/// Called with `(to, from, change)` where locations are full paths.
pub type HistoryListener = Arc<dyn Fn(&str, &str, &HistoryChange) + Send + Sync>;

/// Where the router reads and writes the current location.
pub trait LocationSource: Send + Sync {
    /// Normalized base: starts with `/` or `#`, no trailing slash, may be empty.
    fn base(&self) -> &str;

    /// Current full path, without the base.
    fn location(&self) -> String;

    fn state(&self) -> Option<HistoryState> {
        None
    }

    fn push(&self, to: &str, state: Option<HistoryState>);

    fn replace(&self, to: &str, state: Option<HistoryState>);

    /// Moves through the history. Listeners run only when `trigger_listeners` is set.
    fn go(&self, delta: i64, trigger_listeners: bool);

    fn listen(&self, listener: HistoryListener) -> RemoveFn;

    fn create_href(&self, location: &str) -> String {
        let base = self.base();
        match base.find('#') {
            Some(hash) => format!("{}#{location}", &base[..hash]),
            None => format!("{base}{location}"),
        }
    }
}

pub fn normalize_base(base: &str) -> String {
    let mut base = if base.is_empty() {
        "/".to_string()
    } else if !base.starts_with('/') && !base.starts_with('#') {
        format!("/{base}")
    } else {
        base.to_string()
    };
    if base.ends_with('/') {
        base.pop();
    }
    base
}
