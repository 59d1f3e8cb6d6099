use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::component::{RouteComponent, RouteView};
use crate::location::{RouteLocation, RouteLocationRaw};
use crate::router::NavigationGuard;
use crate::types::{RouteMeta, RouteName};

pub const DEFAULT_VIEW: &str = "default";

/// Where a redirect record sends its navigations.
#[derive(Clone)]
pub enum RouteRedirect {
    To(RouteLocationRaw),
    /// Computed from the location that hit the record.
    With(Arc<dyn Fn(&RouteLocation) -> RouteLocationRaw + Send + Sync>),
}

impl RouteRedirect {
    pub fn resolve(&self, to: &RouteLocation) -> RouteLocationRaw {
        match self {
            RouteRedirect::To(raw) => raw.clone(),
            RouteRedirect::With(redirect) => redirect(to),
        }
    }
}

impl From<RouteLocationRaw> for RouteRedirect {
    fn from(value: RouteLocationRaw) -> Self {
        RouteRedirect::To(value)
    }
}

impl From<&str> for RouteRedirect {
    fn from(value: &str) -> Self {
        RouteRedirect::To(RouteLocationRaw::url(value))
    }
}

impl From<String> for RouteRedirect {
    fn from(value: String) -> Self {
        RouteRedirect::To(RouteLocationRaw::url(value))
    }
}

impl fmt::Debug for RouteRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteRedirect::To(raw) => f.debug_tuple("To").field(raw).finish(),
            RouteRedirect::With(_) => f.write_str("With(..)"),
        }
    }
}

/// A route as declared by the application.
#[derive(Debug, Clone, Default)]
pub struct RouteRecordRaw {
    pub path: String,
    pub name: Option<RouteName>,
    pub views: BTreeMap<String, RouteView>,
    pub redirect: Option<RouteRedirect>,
    pub aliases: Vec<String>,
    pub children: Vec<RouteRecordRaw>,
    pub before_enter: Vec<NavigationGuard>,
    pub meta: RouteMeta,
    /// Overrides the router-wide trailing slash setting.
    pub strict: Option<bool>,
    /// Overrides the router-wide case sensitivity.
    pub sensitive: Option<bool>,
}

impl RouteRecordRaw {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn name<N: Into<RouteName>>(mut self, name: N) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn component<C: RouteComponent + 'static>(self, component: C) -> Self {
        self.view(DEFAULT_VIEW, RouteView::component(component))
    }

    pub fn view<S: Into<String>>(mut self, name: S, view: RouteView) -> Self {
        self.views.insert(name.into(), view);
        self
    }

    pub fn redirect<R: Into<RouteRedirect>>(mut self, redirect: R) -> Self {
        self.redirect = Some(redirect.into());
        self
    }

    pub fn redirect_with<F>(mut self, redirect: F) -> Self
    where
        F: Fn(&RouteLocation) -> RouteLocationRaw + Send + Sync + 'static,
    {
        self.redirect = Some(RouteRedirect::With(Arc::new(redirect)));
        self
    }

    pub fn alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.aliases.push(alias.into());
        self
    }

    pub fn child(mut self, child: RouteRecordRaw) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = RouteRecordRaw>,
    {
        self.children.extend(children);
        self
    }

    pub fn before_enter(mut self, guard: NavigationGuard) -> Self {
        self.before_enter.push(guard);
        self
    }

    pub fn meta<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<serde_json::Value>,
    {
        self.meta.insert(key.into(), value.into());
        self
    }

    pub fn strict(mut self, value: bool) -> Self {
        self.strict = Some(value);
        self
    }

    pub fn sensitive(mut self, value: bool) -> Self {
        self.sensitive = Some(value);
        self
    }
}
