use futures::future::BoxFuture;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::router::{GuardFault, NavigationGuard};

/// A view rendered for a route. Components may carry their own guards.
pub trait RouteComponent: Send + Sync {
    fn name(&self) -> &str {
        "anonymous"
    }

    fn before_route_enter(&self) -> Option<NavigationGuard> {
        None
    }

    fn before_route_update(&self) -> Option<NavigationGuard> {
        None
    }

    fn before_route_leave(&self) -> Option<NavigationGuard> {
        None
    }
}

/// A mounted component. Whatever the host renders.
pub type ComponentInstance = Arc<dyn Any + Send + Sync>;

pub type ComponentLoader = Arc<
    dyn Fn() -> BoxFuture<'static, Result<Arc<dyn RouteComponent>, GuardFault>> + Send + Sync,
>;

/// A component, either at hand or loaded on first navigation.
#[derive(Clone)]
pub enum RouteView {
    Resolved(Arc<dyn RouteComponent>),
    Lazy(ComponentLoader),
}

impl RouteView {
    pub fn component<C: RouteComponent + 'static>(component: C) -> Self {
        RouteView::Resolved(Arc::new(component))
    }

    pub fn lazy<F, Fut>(loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Arc<dyn RouteComponent>, GuardFault>> + Send + 'static,
    {
        RouteView::Lazy(Arc::new(move || Box::pin(loader())))
    }

    pub fn resolved(&self) -> Option<&Arc<dyn RouteComponent>> {
        match self {
            RouteView::Resolved(component) => Some(component),
            RouteView::Lazy(_) => None,
        }
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self, RouteView::Lazy(_))
    }
}

impl From<Arc<dyn RouteComponent>> for RouteView {
    fn from(value: Arc<dyn RouteComponent>) -> Self {
        RouteView::Resolved(value)
    }
}

impl fmt::Debug for RouteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteView::Resolved(component) => {
                f.debug_tuple("Resolved").field(&component.name()).finish()
            }
            RouteView::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}
