use futures::StreamExt;
use futures::channel::mpsc;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::callbacks::{Callbacks, RemoveFn};
use super::errors::{NavigationError, NavigationFailureType, NavigationResult, is_navigation_failure};
use super::guards::{AfterEachHook, ErrorHandler, NavigationGuard};
use super::options::{RouterConfigError, RouterOptions};
use crate::history::{HistoryChange, LocationSource};
use crate::location::{LocationTarget, RouteLocation, RouteLocationRaw};
use crate::matcher::{
    MatcherError, MatcherLocation, MatcherLocationRaw, MatcherResult, RouterMatcher,
};
use crate::path::{decode, encode_param, parse_url, stringify_url};
use crate::record::{RouteRecord, RouteRecordRaw};
use crate::types::{ParamValue, RouteName, RouteParams};

pub(crate) struct RouterState {
    options: RouterOptions,
    history: Arc<dyn LocationSource>,
    matcher: RwLock<RouterMatcher>,
    start: Arc<RouteLocation>,
    current: RwLock<Arc<RouteLocation>>,
    /// Id of the latest navigation attempt. Older attempts never commit.
    pub(super) epoch: AtomicU64,
    pub(super) before_guards: Callbacks<NavigationGuard>,
    pub(super) before_resolve_guards: Callbacks<NavigationGuard>,
    after_hooks: Callbacks<AfterEachHook>,
    error_handlers: Callbacks<ErrorHandler>,
}

/// Whether the backend already moved to the target.
#[derive(Debug, Clone, Copy)]
enum NavigationSource {
    Api,
    History(HistoryChange),
}

/// Cheap handle to one router; clones share the same state.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterState>,
}

impl Router {
    pub fn new(
        options: RouterOptions,
        history: Arc<dyn LocationSource>,
    ) -> Result<Self, RouterConfigError> {
        options.validate()?;
        let start = Arc::new(RouteLocation::start());
        Ok(Self {
            inner: Arc::new(RouterState {
                options,
                history,
                matcher: RwLock::new(RouterMatcher::new(options.path_options())),
                current: RwLock::new(Arc::clone(&start)),
                start,
                epoch: AtomicU64::new(0),
                before_guards: Callbacks::default(),
                before_resolve_guards: Callbacks::default(),
                after_hooks: Callbacks::default(),
                error_handlers: Callbacks::default(),
            }),
        })
    }

    pub(crate) fn state(&self) -> &RouterState {
        &self.inner
    }

    pub fn options(&self) -> &RouterOptions {
        &self.inner.options
    }

    pub fn history(&self) -> &Arc<dyn LocationSource> {
        &self.inner.history
    }

    pub fn add_route(&self, route: RouteRecordRaw) -> MatcherResult<RemoveFn> {
        let id = self.inner.matcher.write().add_route(&route, None)?;
        Ok(self.remover(id))
    }

    pub fn add_routes<I>(&self, routes: I) -> MatcherResult<Vec<RemoveFn>>
    where
        I: IntoIterator<Item = RouteRecordRaw>,
    {
        routes.into_iter().map(|route| self.add_route(route)).collect()
    }

    /// Adds `route` under the route named `parent`.
    pub fn add_child_route<N: Into<RouteName>>(
        &self,
        parent: N,
        route: RouteRecordRaw,
    ) -> MatcherResult<RemoveFn> {
        let parent = parent.into();
        let mut matcher = self.inner.matcher.write();
        let parent_id = matcher
            .get_record_matcher(&parent)
            .map(|parent| parent.id())
            .ok_or_else(|| MatcherError::ParentNotFound {
                name: parent.to_string(),
            })?;
        let id = matcher.add_route(&route, Some(parent_id))?;
        drop(matcher);
        Ok(self.remover(id))
    }

    fn remover(&self, id: crate::matcher::MatcherId) -> RemoveFn {
        let weak: Weak<RouterState> = Arc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(state) = weak.upgrade() {
                state.matcher.write().remove_route(id);
            }
        })
    }

    pub fn remove_route<N: Into<RouteName>>(&self, name: N) -> bool {
        let name = name.into();
        let removed = self.inner.matcher.write().remove_by_name(&name);
        if !removed {
            tracing::warn!(route = %name, "cannot remove non-existent route");
        }
        removed
    }

    pub fn has_route<N: Into<RouteName>>(&self, name: N) -> bool {
        self.inner.matcher.read().has_route(&name.into())
    }

    /// Navigable records, most specific first.
    pub fn get_routes(&self) -> Vec<Arc<RouteRecord>> {
        self.inner
            .matcher
            .read()
            .get_routes()
            .map(|matcher| Arc::clone(matcher.record()))
            .collect()
    }

    pub fn clear_routes(&self) {
        self.inner.matcher.write().clear_routes();
    }

    pub fn current_route(&self) -> Arc<RouteLocation> {
        Arc::clone(&self.inner.current.read())
    }

    /// Resolves `to` against the current route.
    pub fn resolve<L: Into<RouteLocationRaw>>(&self, to: L) -> MatcherResult<RouteLocation> {
        let current = self.current_route();
        self.resolve_from(&to.into(), &current)
    }

    #[tracing::instrument(level = "trace", skip(self, raw, current), fields(current = %current.full_path))]
    pub fn resolve_from(
        &self,
        raw: &RouteLocationRaw,
        current: &RouteLocation,
    ) -> MatcherResult<RouteLocation> {
        let current_match = MatcherLocation {
            name: current.name.clone(),
            path: current.path.clone(),
            params: encode_params(&current.params),
            matched: current.matched.clone(),
            meta: current.meta.clone(),
        };
        let matcher = self.inner.matcher.read();

        let (matched, full_path, query, hash) = match &raw.target {
            LocationTarget::Url(url) => {
                let parsed = parse_url(url, &current.path);
                let matched =
                    matcher.resolve(&MatcherLocationRaw::Path(parsed.path.clone()), &current_match)?;
                if raw.query.is_none() && raw.hash.is_none() {
                    (matched, parsed.full_path, parsed.query, parsed.hash)
                } else {
                    let mut query = parsed.query;
                    query.extend(raw.query.clone().unwrap_or_default());
                    let hash = raw.hash.clone().unwrap_or(parsed.hash);
                    let full_path = stringify_url(&matched.path, &query, &hash);
                    (matched, full_path, query, hash)
                }
            }
            target => {
                let location = match target {
                    LocationTarget::Path(path) => {
                        MatcherLocationRaw::Path(parse_url(path, &current.path).path)
                    }
                    LocationTarget::Name(name) => MatcherLocationRaw::Name {
                        name: name.clone(),
                        params: encode_params(&raw.params),
                    },
                    _ => MatcherLocationRaw::Relative {
                        params: encode_params(&raw.params),
                    },
                };
                let matched = matcher.resolve(&location, &current_match)?;
                let query = raw.query.clone().unwrap_or_default();
                let hash = raw.hash.clone().unwrap_or_default();
                let full_path = stringify_url(&matched.path, &query, &hash);
                (matched, full_path, query, hash)
            }
        };
        drop(matcher);

        Ok(RouteLocation {
            name: matched.name,
            href: self.inner.history.create_href(&full_path),
            path: matched.path,
            full_path,
            params: decode_params(matched.params),
            query,
            hash,
            matched: matched.matched,
            meta: matched.meta,
            redirected_from: None,
        })
    }

    pub async fn push<L: Into<RouteLocationRaw>>(&self, to: L) -> NavigationResult<Arc<RouteLocation>> {
        self.navigate(to.into(), NavigationSource::Api).await
    }

    pub async fn replace<L: Into<RouteLocationRaw>>(
        &self,
        to: L,
    ) -> NavigationResult<Arc<RouteLocation>> {
        self.navigate(to.into().with_replace(true), NavigationSource::Api)
            .await
    }

    /// Navigates to the backend's current location, replacing its entry.
    pub async fn initial_navigation(&self) -> NavigationResult<Arc<RouteLocation>> {
        let location = self.inner.history.location();
        let state = self.inner.history.state();
        let mut raw = RouteLocationRaw::url(location).with_replace(true);
        raw.state = state;
        self.navigate(raw, NavigationSource::Api).await
    }

    pub fn go(&self, delta: i64) {
        self.inner.history.go(delta, true);
    }

    pub fn back(&self) {
        self.go(-1);
    }

    pub fn forward(&self) {
        self.go(1);
    }

    pub fn before_each(&self, guard: NavigationGuard) -> RemoveFn {
        self.inner.before_guards.add(guard)
    }

    pub fn before_resolve(&self, guard: NavigationGuard) -> RemoveFn {
        self.inner.before_resolve_guards.add(guard)
    }

    pub fn after_each<F>(&self, hook: F) -> RemoveFn
    where
        F: Fn(&RouteLocation, &RouteLocation, Option<&NavigationError>) + Send + Sync + 'static,
    {
        self.inner.after_hooks.add(Arc::new(hook))
    }

    pub fn on_error<F>(&self, handler: F) -> RemoveFn
    where
        F: Fn(&NavigationError, &RouteLocation, &RouteLocation) + Send + Sync + 'static,
    {
        self.inner.error_handlers.add(Arc::new(handler))
    }

    /// Runs navigations for location changes reported by the backend until
    /// the backend drops its listeners.
    pub async fn listen_history(&self) {
        let (tx, rx) = mpsc::unbounded::<(String, HistoryChange)>();
        let remove = self.inner.history.listen(Arc::new(move |to, _from, change| {
            // closed once the listening future is dropped
            let _ = tx.unbounded_send((to.to_string(), *change));
        }));

        rx.for_each_concurrent(None, |(to, change)| async move {
            tracing::debug!(to = %to, delta = change.delta, "history changed");
            let _ = self
                .navigate(RouteLocationRaw::url(to), NavigationSource::History(change))
                .await;
        })
        .await;
        remove();
    }

    #[tracing::instrument(level = "debug", skip(self, raw, source), fields(target = ?raw.target))]
    async fn navigate(
        &self,
        mut raw: RouteLocationRaw,
        mut source: NavigationSource,
    ) -> NavigationResult<Arc<RouteLocation>> {
        let mut redirected_from: Option<Arc<RouteLocation>> = None;
        let mut redirects = 0usize;
        let mut claimed: Option<u64> = None;

        loop {
            let from = self.current_route();
            let mut target = match self.resolve_from(&raw, &from) {
                Ok(target) => target,
                Err(err) => {
                    let err = NavigationError::from(err);
                    return Err(match &redirected_from {
                        Some(origin) => self.fail(err, origin, &from, source),
                        None => err,
                    });
                }
            };
            let id = match claimed.take() {
                Some(id) => id,
                None => self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1,
            };

            let redirect = match self.record_redirect(&target) {
                Ok(Some(redirect)) => self
                    .count_redirect(&mut redirects, &redirected_from, &target)
                    .map(|()| Some(redirect)),
                other => other,
            };
            match redirect {
                Err(err) => return Err(self.fail(err, &target, &from, source)),
                Ok(Some(redirect)) => {
                    tracing::debug!(from = %target.full_path, "following route redirect");
                    let target = Arc::new(target);
                    match self.claim_redirect(id, &target, &from) {
                        Ok(next) => claimed = Some(next),
                        Err(err) => return Err(self.fail(err, &target, &from, source)),
                    }
                    redirected_from.get_or_insert(target);
                    raw = carry_options(redirect, &raw);
                    if matches!(source, NavigationSource::History(_)) {
                        raw.replace = true;
                        raw.force = true;
                        source = NavigationSource::Api;
                    }
                    continue;
                }
                Ok(None) => {}
            }

            target.redirected_from = redirected_from.clone();
            let to = Arc::new(target);
            tracing::debug!(id, to = %to.full_path, from = %from.full_path, "navigation started");

            let duplicated = matches!(source, NavigationSource::Api) && !raw.force;
            let outcome = if duplicated && from.is_same_location(&to) {
                Err(NavigationError::failed(
                    NavigationFailureType::DUPLICATED,
                    &from,
                    &to,
                ))
            } else {
                self.run_navigation(id, &to, &from).await
            };

            let outcome = match outcome {
                Err(NavigationError::Failure(failure))
                    if failure.kind == NavigationFailureType::REDIRECTED =>
                {
                    let followed = self
                        .count_redirect(&mut redirects, &redirected_from, &to)
                        .and_then(|()| self.claim_redirect(id, &to, &from));
                    match followed {
                        Err(err) => Err(err),
                        Ok(next) => {
                            claimed = Some(next);
                            redirected_from.get_or_insert_with(|| Arc::clone(&to));
                            let redirect = failure.redirect_to.unwrap_or_else(|| raw.clone());
                            raw = carry_options(redirect, &raw);
                            if matches!(source, NavigationSource::History(_)) {
                                raw.replace = true;
                                raw.force = true;
                                source = NavigationSource::Api;
                            }
                            continue;
                        }
                    }
                }
                Ok(()) => self.finalize_navigation(id, &to, &from, &raw, source),
                Err(err) => Err(err),
            };

            return match outcome {
                Ok(()) => {
                    tracing::debug!(id, to = %to.full_path, "navigation committed");
                    self.trigger_after_each(&to, &from, None);
                    Ok(to)
                }
                Err(err) => Err(self.fail(err, &to, &from, source)),
            };
        }
    }

    /// Settles a failed attempt: restores the history position for backend
    /// driven navigations and notifies the hooks.
    fn fail(
        &self,
        err: NavigationError,
        to: &RouteLocation,
        from: &RouteLocation,
        source: NavigationSource,
    ) -> NavigationError {
        if let NavigationSource::History(change) = source
            && change.delta != 0
            && !is_navigation_failure(&err, NavigationFailureType::CANCELLED)
        {
            self.inner.history.go(-change.delta, false);
        }
        if is_navigation_failure(&err, NavigationFailureType::empty()) {
            self.trigger_after_each(to, from, Some(&err));
        }
        self.trigger_error(&err, to, from);
        err
    }

    fn count_redirect(
        &self,
        redirects: &mut usize,
        redirected_from: &Option<Arc<RouteLocation>>,
        target: &RouteLocation,
    ) -> NavigationResult<()> {
        *redirects += 1;
        if *redirects <= self.inner.options.max_redirects {
            return Ok(());
        }
        let from = redirected_from
            .as_ref()
            .map_or_else(|| target.full_path.clone(), |from| from.full_path.clone());
        tracing::warn!(from = %from, to = %target.full_path, "detected an infinite redirection chain");
        Err(NavigationError::InfiniteRedirect {
            from,
            to: target.full_path.clone(),
        })
    }

    /// The redirect of the matched leaf record, with query and hash of the
    /// target carried over unless the redirect sets its own.
    fn record_redirect(&self, target: &RouteLocation) -> NavigationResult<Option<RouteLocationRaw>> {
        let Some(redirect) = target.leaf().and_then(|record| record.redirect()) else {
            return Ok(None);
        };
        let mut raw = redirect.resolve(target);

        match &raw.target {
            LocationTarget::Relative => {
                return Err(NavigationError::InvalidRedirect {
                    from: target.full_path.clone(),
                    reason: "a redirect must name a route or give a path".to_string(),
                });
            }
            LocationTarget::Url(url) if url.contains('?') || url.contains('#') => {}
            LocationTarget::Name(_) if raw.params.is_empty() => {
                raw.params = target.params.clone();
                inherit_query_and_hash(&mut raw, target);
            }
            _ => inherit_query_and_hash(&mut raw, target),
        }
        Ok(Some(raw))
    }

    fn finalize_navigation(
        &self,
        id: u64,
        to: &Arc<RouteLocation>,
        from: &Arc<RouteLocation>,
        raw: &RouteLocationRaw,
        source: NavigationSource,
    ) -> NavigationResult<()> {
        self.check_cancelled(id, to, from)?;

        if let NavigationSource::Api = source {
            let history = &self.inner.history;
            if raw.replace || Arc::ptr_eq(from, &self.inner.start) {
                history.replace(&to.full_path, raw.state.clone());
            } else {
                history.push(&to.full_path, raw.state.clone());
            }
        }
        *self.inner.current.write() = Arc::clone(to);
        Ok(())
    }

    fn trigger_after_each(
        &self,
        to: &RouteLocation,
        from: &RouteLocation,
        failure: Option<&NavigationError>,
    ) {
        for hook in self.inner.after_hooks.list() {
            hook(to, from, failure);
        }
    }

    fn trigger_error(&self, err: &NavigationError, to: &RouteLocation, from: &RouteLocation) {
        let handlers = self.inner.error_handlers.list();
        if handlers.is_empty() {
            if is_navigation_failure(err, NavigationFailureType::empty()) {
                tracing::debug!(error = %err, "navigation failed");
            } else {
                tracing::error!(error = %err, to = %to.full_path, "uncaught error during route navigation");
            }
            return;
        }
        for handler in handlers {
            handler(err, to, from);
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("options", &self.inner.options)
            .field("current", &self.current_route().full_path)
            .finish()
    }
}

/// Keeps the navigation options of the original request on a redirect.
fn carry_options(mut redirect: RouteLocationRaw, original: &RouteLocationRaw) -> RouteLocationRaw {
    redirect.replace |= original.replace;
    redirect.force = original.force;
    if redirect.state.is_none() {
        redirect.state = original.state.clone();
    }
    redirect
}

fn inherit_query_and_hash(raw: &mut RouteLocationRaw, target: &RouteLocation) {
    if raw.query.is_none() {
        raw.query = Some(target.query.clone());
    }
    if raw.hash.is_none() {
        raw.hash = Some(target.hash.clone());
    }
}

fn encode_params(params: &RouteParams) -> RouteParams {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                ParamValue::Single(value) => ParamValue::Single(encode_param(value)),
                ParamValue::List(values) => {
                    ParamValue::List(values.iter().map(|value| encode_param(value)).collect())
                }
            };
            (key.clone(), value)
        })
        .collect()
}

fn decode_params(params: RouteParams) -> RouteParams {
    params
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                ParamValue::Single(value) => ParamValue::Single(decode(&value)),
                ParamValue::List(values) => {
                    ParamValue::List(values.iter().map(|value| decode(value)).collect())
                }
            };
            (key, value)
        })
        .collect()
}
