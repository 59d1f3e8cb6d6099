use std::sync::Arc;

use crate::record::RouteRecord;
use crate::types::{HistoryState, LocationQuery, ParamValue, RouteMeta, RouteName, RouteParams};

/// What a raw location points at.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationTarget {
    /// A string such as `/users/1?tab=info#top`, possibly relative.
    Url(String),
    /// A path without query or hash; query and hash come from the raw location.
    Path(String),
    Name(RouteName),
    /// Re-resolve the current route with different params, query or hash.
    Relative,
}

/// A navigation target as written by the caller.
#[derive(Debug, Clone)]
pub struct RouteLocationRaw {
    pub target: LocationTarget,
    pub params: RouteParams,
    pub query: Option<LocationQuery>,
    pub hash: Option<String>,
    pub replace: bool,
    pub force: bool,
    pub state: Option<HistoryState>,
}

impl RouteLocationRaw {
    fn with_target(target: LocationTarget) -> Self {
        Self {
            target,
            params: RouteParams::new(),
            query: None,
            hash: None,
            replace: false,
            force: false,
            state: None,
        }
    }

    pub fn url<S: Into<String>>(url: S) -> Self {
        Self::with_target(LocationTarget::Url(url.into()))
    }

    pub fn path<S: Into<String>>(path: S) -> Self {
        Self::with_target(LocationTarget::Path(path.into()))
    }

    pub fn named<N: Into<RouteName>>(name: N) -> Self {
        Self::with_target(LocationTarget::Name(name.into()))
    }

    pub fn relative() -> Self {
        Self::with_target(LocationTarget::Relative)
    }

    pub fn param<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    pub fn query_param<K: Into<String>, V: Into<ParamValue>>(mut self, key: K, value: V) -> Self {
        self.query
            .get_or_insert_with(LocationQuery::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, query: LocationQuery) -> Self {
        self.query = Some(query);
        self
    }

    /// Sets the hash; a missing leading `#` is added.
    pub fn with_hash<S: Into<String>>(mut self, hash: S) -> Self {
        let hash = hash.into();
        self.hash = Some(if hash.is_empty() || hash.starts_with('#') {
            hash
        } else {
            format!("#{hash}")
        });
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    pub fn with_state(mut self, state: HistoryState) -> Self {
        self.state = Some(state);
        self
    }
}

impl From<&str> for RouteLocationRaw {
    fn from(value: &str) -> Self {
        RouteLocationRaw::url(value)
    }
}

impl From<String> for RouteLocationRaw {
    fn from(value: String) -> Self {
        RouteLocationRaw::url(value)
    }
}

impl From<&RouteLocation> for RouteLocationRaw {
    fn from(value: &RouteLocation) -> Self {
        RouteLocationRaw::url(value.full_path.clone())
    }
}

/// A fully resolved location with its matched record chain.
#[derive(Debug, Clone)]
pub struct RouteLocation {
    pub name: Option<RouteName>,
    pub path: String,
    pub full_path: String,
    pub href: String,
    pub params: RouteParams,
    pub query: LocationQuery,
    pub hash: String,
    /// Records from the root to the leaf.
    pub matched: Vec<Arc<RouteRecord>>,
    pub meta: RouteMeta,
    pub redirected_from: Option<Arc<RouteLocation>>,
}

impl RouteLocation {
    /// The location a router holds before its first navigation.
    pub fn start() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            full_path: "/".to_string(),
            href: "/".to_string(),
            params: RouteParams::new(),
            query: LocationQuery::new(),
            hash: String::new(),
            matched: Vec::new(),
            meta: RouteMeta::new(),
            redirected_from: None,
        }
    }

    pub fn leaf(&self) -> Option<&Arc<RouteRecord>> {
        self.matched.last()
    }

    /// Same leaf record (aliases included), params, query and hash.
    /// Unmatched locations are never the same as anything.
    pub fn is_same_location(&self, other: &RouteLocation) -> bool {
        let (Some(left), Some(right)) = (self.leaf(), other.leaf()) else {
            return false;
        };

        self.matched.len() == other.matched.len()
            && left.is_same_record(right)
            && self.params == other.params
            && self.query == other.query
            && self.hash == other.hash
    }
}
