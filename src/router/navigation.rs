use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use super::errors::{NavigationError, NavigationFailureType, NavigationResult};
use super::guards::{GuardOutcome, NavigationGuard};
use super::service::Router;
use crate::location::RouteLocation;
use crate::record::RouteRecord;

/// Records that change between two locations, compared by depth.
#[derive(Debug, Default)]
pub(crate) struct ChangingRecords {
    pub leaving: Vec<Arc<RouteRecord>>,
    pub updating: Vec<Arc<RouteRecord>>,
    pub entering: Vec<Arc<RouteRecord>>,
}

pub(crate) fn extract_changing_records(to: &RouteLocation, from: &RouteLocation) -> ChangingRecords {
    let mut changing = ChangingRecords::default();
    let params_changed = to.params != from.params || to.query != from.query;

    for depth in 0..to.matched.len().max(from.matched.len()) {
        let record_from = from.matched.get(depth);
        let record_to = to.matched.get(depth);
        let kept = matches!(
            (record_from, record_to),
            (Some(left), Some(right)) if left.is_same_record(right)
        );

        if let Some(record) = record_from {
            if !kept {
                changing.leaving.push(Arc::clone(record));
            } else if params_changed {
                changing.updating.push(Arc::clone(record));
            }
        }
        if let Some(record) = record_to
            && !kept
        {
            changing.entering.push(Arc::clone(record));
        }
    }

    changing
}

/// One guard invocation. Enter guards remember which view they belong to
/// so their callbacks can wait for the instance.
struct GuardCall {
    guard: NavigationGuard,
    enter_target: Option<(Arc<RouteRecord>, String)>,
}

impl GuardCall {
    fn plain(guard: NavigationGuard) -> Self {
        Self {
            guard,
            enter_target: None,
        }
    }
}

/// Guards of one group run joined; groups run one after another.
type GuardQueue = Vec<Vec<GuardCall>>;

fn singles<I: IntoIterator<Item = NavigationGuard>>(guards: I) -> GuardQueue {
    guards
        .into_iter()
        .map(|guard| vec![GuardCall::plain(guard)])
        .collect()
}

impl Router {
    /// Runs every guard phase for one attempt. Returns `Ok` when the
    /// navigation may commit.
    pub(crate) async fn run_navigation(
        &self,
        id: u64,
        to: &Arc<RouteLocation>,
        from: &Arc<RouteLocation>,
    ) -> NavigationResult<()> {
        let changing = extract_changing_records(to, from);
        tracing::trace!(
            id,
            leaving = changing.leaving.len(),
            updating = changing.updating.len(),
            entering = changing.entering.len(),
            "navigation phases starting"
        );

        let mut leave: GuardQueue = Vec::new();
        for record in changing.leaving.iter().rev() {
            leave.extend(singles(mounted_component_guards(record, |component| {
                component.before_route_leave()
            })));
            leave.extend(singles(record.leave_guards()));
        }
        self.run_phase(id, "leave", leave, to, from).await?;

        let before_each = singles(self.state().before_guards.list());
        self.run_phase(id, "before_each", before_each, to, from).await?;

        let before_enter: GuardQueue = changing
            .entering
            .iter()
            .filter(|record| !record.before_enter().is_empty())
            .map(|record| {
                record
                    .before_enter()
                    .iter()
                    .cloned()
                    .map(GuardCall::plain)
                    .collect()
            })
            .collect();
        self.run_phase(id, "before_enter", before_enter, to, from).await?;

        let mut update: GuardQueue = Vec::new();
        for record in &changing.updating {
            update.extend(singles(mounted_component_guards(record, |component| {
                component.before_route_update()
            })));
            update.extend(singles(record.update_guards()));
        }
        self.run_phase(id, "update", update, to, from).await?;

        for record in &to.matched {
            record.reset_enter_callbacks(id);
        }
        for record in &changing.entering {
            load_lazy_views(record).await?;
        }
        self.check_cancelled(id, to, from)?;

        let mut enter: GuardQueue = Vec::new();
        for record in &changing.entering {
            for (view_name, view) in record.views() {
                if let Some(guard) = view.resolved().and_then(|component| component.before_route_enter()) {
                    enter.push(vec![GuardCall {
                        guard,
                        enter_target: Some((Arc::clone(record), view_name)),
                    }]);
                }
            }
        }
        self.run_phase(id, "enter", enter, to, from).await?;

        let before_resolve = singles(self.state().before_resolve_guards.list());
        self.run_phase(id, "before_resolve", before_resolve, to, from).await
    }

    async fn run_phase(
        &self,
        id: u64,
        phase: &'static str,
        queue: GuardQueue,
        to: &Arc<RouteLocation>,
        from: &Arc<RouteLocation>,
    ) -> NavigationResult<()> {
        tracing::trace!(id, phase, groups = queue.len(), "running guard phase");
        for group in queue {
            let outcomes = if group.len() == 1 {
                vec![group[0].guard.run(to, from).await]
            } else {
                join_all(group.iter().map(|call| call.guard.run(to, from))).await
            };
            self.check_cancelled(id, to, from)?;

            for (call, outcome) in group.iter().zip(outcomes) {
                match outcome? {
                    GuardOutcome::Continue => {}
                    GuardOutcome::ContinueWith(callback) => match &call.enter_target {
                        Some((record, view)) => record.queue_enter_callback(id, view, callback),
                        None => {
                            tracing::trace!(phase, "ignoring callback from a guard that is not an enter guard")
                        }
                    },
                    GuardOutcome::Abort => {
                        return Err(NavigationError::failed(NavigationFailureType::ABORTED, from, to));
                    }
                    GuardOutcome::Redirect(raw) => {
                        return Err(NavigationError::redirected(from, to, raw));
                    }
                    GuardOutcome::Fail(fault) => return Err(NavigationError::Guard(fault)),
                }
            }
        }
        self.check_cancelled(id, to, from)
    }

    /// Fails with a cancelled failure once a newer navigation started.
    pub(crate) fn check_cancelled(
        &self,
        id: u64,
        to: &Arc<RouteLocation>,
        from: &Arc<RouteLocation>,
    ) -> NavigationResult<()> {
        if self.state().epoch.load(Ordering::SeqCst) == id {
            return Ok(());
        }
        tracing::debug!(id, to = %to.full_path, "navigation superseded");
        Err(NavigationError::failed(
            NavigationFailureType::CANCELLED,
            from,
            to,
        ))
    }

    /// Hands the epoch of attempt `id` to the attempt that follows its
    /// redirect. Fails as cancelled when a newer navigation took over.
    pub(crate) fn claim_redirect(
        &self,
        id: u64,
        to: &Arc<RouteLocation>,
        from: &Arc<RouteLocation>,
    ) -> NavigationResult<u64> {
        self.state()
            .epoch
            .compare_exchange(id, id + 1, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| id + 1)
            .map_err(|latest| {
                tracing::debug!(id, latest, to = %to.full_path, "redirect of a superseded navigation dropped");
                NavigationError::failed(NavigationFailureType::CANCELLED, from, to)
            })
    }
}

/// Guards of resolved components that currently have a mounted instance.
fn mounted_component_guards<F>(record: &RouteRecord, extract: F) -> Vec<NavigationGuard>
where
    F: Fn(&dyn crate::record::RouteComponent) -> Option<NavigationGuard>,
{
    record
        .views()
        .iter()
        .filter(|(name, _)| record.instance(name).is_some())
        .filter_map(|(_, view)| view.resolved().and_then(|component| extract(component.as_ref())))
        .collect()
}

async fn load_lazy_views(record: &Arc<RouteRecord>) -> NavigationResult<()> {
    let lazy = record.lazy_views();
    if lazy.is_empty() {
        return Ok(());
    }

    tracing::trace!(path = %record.path(), views = lazy.len(), "loading lazy views");
    let loaded = join_all(lazy.iter().map(|(_, loader)| loader())).await;
    for ((view, _), result) in lazy.into_iter().zip(loaded) {
        let component = result.map_err(|cause| NavigationError::ComponentLoad {
            record: record.path().to_string(),
            view: view.clone(),
            cause,
        })?;
        record.resolve_view(&view, component);
    }
    Ok(())
}
