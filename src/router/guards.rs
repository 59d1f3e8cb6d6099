use futures::channel::oneshot;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::Arc;

use super::errors::NavigationError;
use crate::location::{RouteLocation, RouteLocationRaw};
use crate::record::ComponentInstance;

/// Error raised from inside a guard or a component loader.
pub type GuardFault = Arc<dyn std::error::Error + Send + Sync>;

/// Runs against the component instance once it mounts.
pub type EnterCallback = Arc<dyn Fn(&ComponentInstance) + Send + Sync>;

/// Decision taken by a navigation guard.
#[derive(Clone)]
pub enum GuardOutcome {
    Continue,
    Abort,
    Redirect(RouteLocationRaw),
    Fail(GuardFault),
    /// Continue, and call back once the entered component mounts. Only
    /// enter guards honor the callback.
    ContinueWith(EnterCallback),
}

impl GuardOutcome {
    pub fn redirect<L: Into<RouteLocationRaw>>(to: L) -> Self {
        GuardOutcome::Redirect(to.into())
    }

    pub fn fail<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        GuardOutcome::Fail(Arc::new(err))
    }

    pub fn continue_with<F>(callback: F) -> Self
    where
        F: Fn(&ComponentInstance) + Send + Sync + 'static,
    {
        GuardOutcome::ContinueWith(Arc::new(callback))
    }
}

impl From<bool> for GuardOutcome {
    fn from(value: bool) -> Self {
        if value {
            GuardOutcome::Continue
        } else {
            GuardOutcome::Abort
        }
    }
}

impl fmt::Debug for GuardOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GuardOutcome::Continue => f.write_str("Continue"),
            GuardOutcome::Abort => f.write_str("Abort"),
            GuardOutcome::Redirect(to) => f.debug_tuple("Redirect").field(to).finish(),
            GuardOutcome::Fail(err) => f.debug_tuple("Fail").field(&err.to_string()).finish(),
            GuardOutcome::ContinueWith(_) => f.write_str("ContinueWith(..)"),
        }
    }
}

/// Continuation handed to guards registered with [`NavigationGuard::with_next`].
/// Each method consumes it, so a guard decides at most once. Dropping it
/// without deciding fails the navigation.
pub struct Next {
    tx: oneshot::Sender<GuardOutcome>,
}

impl Next {
    pub fn call(self, outcome: GuardOutcome) {
        // receiver is gone once the navigation was superseded
        let _ = self.tx.send(outcome);
    }

    pub fn proceed(self) {
        self.call(GuardOutcome::Continue);
    }

    pub fn abort(self) {
        self.call(GuardOutcome::Abort);
    }

    pub fn redirect<L: Into<RouteLocationRaw>>(self, to: L) {
        self.call(GuardOutcome::redirect(to));
    }

    pub fn fail<E>(self, err: E)
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.call(GuardOutcome::fail(err));
    }

    pub fn proceed_with<F>(self, callback: F)
    where
        F: Fn(&ComponentInstance) + Send + Sync + 'static,
    {
        self.call(GuardOutcome::continue_with(callback));
    }
}

type SyncGuardFn = dyn Fn(&RouteLocation, &RouteLocation) -> GuardOutcome + Send + Sync;
type AsyncGuardFn =
    dyn Fn(Arc<RouteLocation>, Arc<RouteLocation>) -> BoxFuture<'static, GuardOutcome> + Send + Sync;
type NextGuardFn = dyn Fn(&RouteLocation, &RouteLocation, Next) + Send + Sync;

enum GuardKind {
    Sync(Box<SyncGuardFn>),
    Async(Box<AsyncGuardFn>),
    WithNext(Box<NextGuardFn>),
}

/// A guard callable with `(to, from)`.
#[derive(Clone)]
pub struct NavigationGuard {
    inner: Arc<GuardKind>,
}

impl NavigationGuard {
    pub fn new<F, O>(guard: F) -> Self
    where
        F: Fn(&RouteLocation, &RouteLocation) -> O + Send + Sync + 'static,
        O: Into<GuardOutcome>,
    {
        Self {
            inner: Arc::new(GuardKind::Sync(Box::new(move |to, from| {
                guard(to, from).into()
            }))),
        }
    }

    pub fn new_async<F, Fut>(guard: F) -> Self
    where
        F: Fn(Arc<RouteLocation>, Arc<RouteLocation>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = GuardOutcome> + Send + 'static,
    {
        Self {
            inner: Arc::new(GuardKind::Async(Box::new(move |to, from| {
                Box::pin(guard(to, from))
            }))),
        }
    }

    pub fn with_next<F>(guard: F) -> Self
    where
        F: Fn(&RouteLocation, &RouteLocation, Next) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(GuardKind::WithNext(Box::new(guard))),
        }
    }

    pub fn ptr_eq(&self, other: &NavigationGuard) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) async fn run(
        &self,
        to: &Arc<RouteLocation>,
        from: &Arc<RouteLocation>,
    ) -> Result<GuardOutcome, NavigationError> {
        match &*self.inner {
            GuardKind::Sync(guard) => Ok(guard(to, from)),
            GuardKind::Async(guard) => Ok(guard(Arc::clone(to), Arc::clone(from)).await),
            GuardKind::WithNext(guard) => {
                let (tx, rx) = oneshot::channel();
                guard(to, from, Next { tx });
                rx.await.map_err(|_| {
                    tracing::warn!(
                        to = %to.full_path,
                        from = %from.full_path,
                        "navigation guard dropped its continuation without deciding"
                    );
                    NavigationError::InvalidGuard {
                        to: to.full_path.clone(),
                    }
                })
            }
        }
    }
}

impl fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &*self.inner {
            GuardKind::Sync(_) => "sync",
            GuardKind::Async(_) => "async",
            GuardKind::WithNext(_) => "with_next",
        };
        f.debug_struct("NavigationGuard").field("kind", &kind).finish()
    }
}

/// Hook run after every navigation, with the failure when there was one.
pub type AfterEachHook =
    Arc<dyn Fn(&RouteLocation, &RouteLocation, Option<&NavigationError>) + Send + Sync>;

/// Receives errors no caller is waiting for.
pub type ErrorHandler = Arc<dyn Fn(&NavigationError, &RouteLocation, &RouteLocation) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn locations() -> (Arc<RouteLocation>, Arc<RouteLocation>) {
        (
            Arc::new(RouteLocation::start()),
            Arc::new(RouteLocation::start()),
        )
    }

    #[test]
    fn bool_results_map_to_continue_and_abort() {
        let (to, from) = locations();
        let guard = NavigationGuard::new(|_, _| false);
        let outcome = block_on(guard.run(&to, &from)).expect("guard should run");
        assert!(matches!(outcome, GuardOutcome::Abort));
    }

    #[test]
    fn next_style_guard_reports_its_decision() {
        let (to, from) = locations();
        let guard = NavigationGuard::with_next(|_, _, next| next.redirect("/login"));
        let outcome = block_on(guard.run(&to, &from)).expect("guard should run");
        match outcome {
            GuardOutcome::Redirect(raw) => {
                assert_eq!(raw.target, crate::location::LocationTarget::Url("/login".into()))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn dropped_continuation_is_an_invalid_guard() {
        let (to, from) = locations();
        let guard = NavigationGuard::with_next(|_, _, next| drop(next));
        let err = block_on(guard.run(&to, &from)).unwrap_err();
        assert!(matches!(err, NavigationError::InvalidGuard { .. }));
    }
}
