mod component;
mod raw;

pub use component::{ComponentInstance, ComponentLoader, RouteComponent, RouteView};
pub use raw::{DEFAULT_VIEW, RouteRecordRaw, RouteRedirect};

use hashbrown::HashMap as FastHashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::pattern::PathParserOptions;
use crate::router::{Callbacks, EnterCallback, NavigationGuard, RemoveFn};
use crate::types::{RouteMeta, RouteName};

#[derive(Default)]
struct PendingEnterCallbacks {
    navigation: u64,
    by_view: FastHashMap<String, Vec<EnterCallback>>,
}

/// State an alias shares with the record it aliases.
#[derive(Default)]
struct RecordState {
    views: RwLock<BTreeMap<String, RouteView>>,
    leave_guards: Callbacks<NavigationGuard>,
    update_guards: Callbacks<NavigationGuard>,
    instances: RwLock<FastHashMap<String, ComponentInstance>>,
    enter_callbacks: Mutex<PendingEnterCallbacks>,
}

/// A normalized route record as stored by the matcher.
pub struct RouteRecord {
    path: String,
    name: Option<RouteName>,
    redirect: Option<RouteRedirect>,
    meta: RouteMeta,
    before_enter: Vec<NavigationGuard>,
    options: PathParserOptions,
    alias_of: Option<Arc<RouteRecord>>,
    state: Arc<RecordState>,
}

impl RouteRecord {
    pub(crate) fn new(
        raw: &RouteRecordRaw,
        path: String,
        options: PathParserOptions,
        alias_of: Option<Arc<RouteRecord>>,
    ) -> Self {
        let state = match &alias_of {
            Some(original) => Arc::clone(&original.state),
            None => Arc::new(RecordState {
                views: RwLock::new(raw.views.clone()),
                ..RecordState::default()
            }),
        };

        Self {
            path,
            name: raw.name.clone(),
            redirect: raw.redirect.clone(),
            meta: raw.meta.clone(),
            before_enter: raw.before_enter.clone(),
            options,
            alias_of,
            state,
        }
    }

    /// Full path pattern, parents included.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&RouteName> {
        self.name.as_ref()
    }

    pub fn redirect(&self) -> Option<&RouteRedirect> {
        self.redirect.as_ref()
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    pub fn before_enter(&self) -> &[NavigationGuard] {
        &self.before_enter
    }

    pub fn options(&self) -> PathParserOptions {
        self.options
    }

    pub fn alias_of(&self) -> Option<&Arc<RouteRecord>> {
        self.alias_of.as_ref()
    }

    pub fn is_alias(&self) -> bool {
        self.alias_of.is_some()
    }

    /// The aliased record for aliases, `self` otherwise.
    pub fn original(&self) -> &RouteRecord {
        self.alias_of.as_deref().unwrap_or(self)
    }

    /// Identity that treats an alias and its original as one record.
    pub fn is_same_record(&self, other: &RouteRecord) -> bool {
        std::ptr::eq(self.original(), other.original())
    }

    pub fn views(&self) -> BTreeMap<String, RouteView> {
        self.state.views.read().clone()
    }

    pub fn view(&self, name: &str) -> Option<RouteView> {
        self.state.views.read().get(name).cloned()
    }

    pub fn has_views(&self) -> bool {
        !self.state.views.read().is_empty()
    }

    pub fn shares_views_with(&self, other: &RouteRecord) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    pub(crate) fn lazy_views(&self) -> Vec<(String, ComponentLoader)> {
        self.state
            .views
            .read()
            .iter()
            .filter_map(|(name, view)| match view {
                RouteView::Lazy(loader) => Some((name.clone(), Arc::clone(loader))),
                RouteView::Resolved(_) => None,
            })
            .collect()
    }

    /// Replaces a lazy view by what it loaded so later navigations reuse it.
    pub(crate) fn resolve_view(&self, name: &str, component: Arc<dyn RouteComponent>) {
        self.state
            .views
            .write()
            .insert(name.to_string(), RouteView::Resolved(component));
    }

    /// Registers a leave guard scoped to this record, normally from a
    /// mounted component.
    pub fn add_leave_guard(&self, guard: NavigationGuard) -> RemoveFn {
        self.state.leave_guards.add(guard)
    }

    pub fn add_update_guard(&self, guard: NavigationGuard) -> RemoveFn {
        self.state.update_guards.add(guard)
    }

    pub(crate) fn leave_guards(&self) -> Vec<NavigationGuard> {
        self.state.leave_guards.list()
    }

    pub(crate) fn update_guards(&self) -> Vec<NavigationGuard> {
        self.state.update_guards.list()
    }

    pub fn instance(&self, view: &str) -> Option<ComponentInstance> {
        self.state.instances.read().get(view).cloned()
    }

    /// Records the mounted instance of `view` and runs the enter callbacks
    /// queued for it by the last navigation.
    pub fn mount_instance(&self, view: &str, instance: ComponentInstance) {
        self.state
            .instances
            .write()
            .insert(view.to_string(), Arc::clone(&instance));

        let pending = self.state.enter_callbacks.lock().by_view.remove(view);
        if let Some(callbacks) = pending {
            tracing::trace!(path = %self.path, view, count = callbacks.len(), "running enter callbacks");
            for callback in callbacks {
                callback(&instance);
            }
        }
    }

    pub fn unmount_instance(&self, view: &str) -> Option<ComponentInstance> {
        self.state.instances.write().remove(view)
    }

    pub(crate) fn reset_enter_callbacks(&self, navigation: u64) {
        let mut pending = self.state.enter_callbacks.lock();
        pending.navigation = navigation;
        pending.by_view.clear();
    }

    /// Queues a callback for `view`. Callbacks from a navigation other than
    /// the one that last reset the queue are dropped.
    pub(crate) fn queue_enter_callback(&self, navigation: u64, view: &str, callback: EnterCallback) {
        let mut pending = self.state.enter_callbacks.lock();
        if pending.navigation != navigation {
            tracing::trace!(path = %self.path, view, "dropping enter callback of a stale navigation");
            return;
        }
        pending
            .by_view
            .entry(view.to_string())
            .or_default()
            .push(callback);
    }
}

impl fmt::Debug for RouteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRecord")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("redirect", &self.redirect)
            .field("alias_of", &self.alias_of.as_ref().map(|record| record.path()))
            .field("views", &self.views())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(path: &str) -> Arc<RouteRecord> {
        Arc::new(RouteRecord::new(
            &RouteRecordRaw::new(path),
            path.to_string(),
            PathParserOptions::default(),
            None,
        ))
    }

    #[test]
    fn alias_shares_identity_and_views() {
        let original = record("/users");
        let alias = RouteRecord::new(
            &RouteRecordRaw::new("/people"),
            "/people".to_string(),
            PathParserOptions::default(),
            Some(Arc::clone(&original)),
        );

        assert!(alias.is_same_record(&original));
        assert!(alias.shares_views_with(&original));
        assert!(!record("/users").is_same_record(&original));
    }

    #[test]
    fn stale_enter_callbacks_are_dropped() {
        let record = record("/a");
        let calls = Arc::new(AtomicUsize::new(0));

        record.reset_enter_callbacks(2);
        let counter = Arc::clone(&calls);
        record.queue_enter_callback(1, DEFAULT_VIEW, Arc::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        let counter = Arc::clone(&calls);
        record.queue_enter_callback(2, DEFAULT_VIEW, Arc::new(move |_| {
            counter.fetch_add(10, Ordering::SeqCst);
        }));

        record.mount_instance(DEFAULT_VIEW, Arc::new(()));
        assert_eq!(calls.load(Ordering::SeqCst), 10);

        // callbacks run once
        record.mount_instance(DEFAULT_VIEW, Arc::new(()));
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }
}
