use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type RouteParams = HashMap<String, ParamValue>;
pub type RouteMeta = HashMap<String, serde_json::Value>;
pub type LocationQuery = BTreeMap<String, ParamValue>;
pub type HistoryState = serde_json::Value;

static NEXT_SYMBOL: AtomicU64 = AtomicU64::new(1);

/// Identifier of a named route.
///
/// Names are either plain strings or symbols: values minted by
/// [`RouteName::symbol`] that only compare equal to themselves, so two
/// libraries can register routes without colliding on a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteName {
    Named(Arc<str>),
    Symbol { id: u64, description: Arc<str> },
}

impl RouteName {
    pub fn symbol(description: &str) -> Self {
        RouteName::Symbol {
            id: NEXT_SYMBOL.fetch_add(1, Ordering::Relaxed),
            description: Arc::from(description),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RouteName::Named(name) => name,
            RouteName::Symbol { description, .. } => description,
        }
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteName::Named(name) => f.write_str(name),
            RouteName::Symbol { id, description } => write!(f, "Symbol({description}#{id})"),
        }
    }
}

impl From<&str> for RouteName {
    fn from(value: &str) -> Self {
        RouteName::Named(Arc::from(value))
    }
}

impl From<String> for RouteName {
    fn from(value: String) -> Self {
        RouteName::Named(Arc::from(value))
    }
}

impl From<&RouteName> for RouteName {
    fn from(value: &RouteName) -> Self {
        value.clone()
    }
}

/// A captured path parameter. Repeatable parameters produce lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    List(Vec<String>),
}

impl ParamValue {
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Single(value) => value.is_empty(),
            ParamValue::List(values) => values.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(value) => Some(value),
            ParamValue::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            ParamValue::Single(_) => None,
            ParamValue::List(values) => Some(values),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Single(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Single(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(value: Vec<String>) -> Self {
        ParamValue::List(value)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(value: Vec<&str>) -> Self {
        ParamValue::List(value.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ParamValue {
    fn from(value: [&str; N]) -> Self {
        ParamValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}
