use std::sync::Arc;

use super::tree::RouterMatcher;
use super::{MatcherError, MatcherResult};
use crate::record::RouteRecord;
use crate::types::{RouteMeta, RouteName, RouteParams};

/// Target of a matcher lookup. Paths carry no query or hash.
#[derive(Debug, Clone, PartialEq)]
pub enum MatcherLocationRaw {
    Name { name: RouteName, params: RouteParams },
    Path(String),
    /// The current route with some params replaced.
    Relative { params: RouteParams },
}

/// The outcome of a lookup. An empty `matched` chain means nothing matched.
#[derive(Debug, Clone)]
pub struct MatcherLocation {
    pub name: Option<RouteName>,
    pub path: String,
    pub params: RouteParams,
    pub matched: Vec<Arc<RouteRecord>>,
    pub meta: RouteMeta,
}

impl MatcherLocation {
    pub fn start() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            params: RouteParams::new(),
            matched: Vec::new(),
            meta: RouteMeta::new(),
        }
    }
}

impl RouterMatcher {
    #[tracing::instrument(level = "trace", skip(self, current), fields(current = %current.path))]
    pub fn resolve(
        &self,
        location: &MatcherLocationRaw,
        current: &MatcherLocation,
    ) -> MatcherResult<MatcherLocation> {
        let (matcher, path, params) = match location {
            MatcherLocationRaw::Name { name, params } => {
                let matcher =
                    self.get_record_matcher(name)
                        .ok_or_else(|| MatcherError::MatcherNotFound {
                            location: format!("route named \"{name}\""),
                        })?;
                let keys = matcher.pattern().keys();
                let declares = |key: &str| keys.iter().any(|declared| declared.name == key);

                let mut merged: RouteParams = current
                    .params
                    .iter()
                    .filter(|(key, _)| declares(key))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                for (key, value) in params {
                    if declares(key) {
                        merged.insert(key.clone(), value.clone());
                    } else {
                        tracing::warn!(route = %name, param = %key, "discarding param the route does not declare");
                    }
                }

                let path = matcher.pattern().stringify(&merged)?;
                (Some(matcher), path, merged)
            }
            MatcherLocationRaw::Path(path) => match self.find_by_path(path) {
                Some(matcher) => {
                    let params = matcher.pattern().parse(path).unwrap_or_default();
                    (Some(matcher), path.clone(), params)
                }
                None => (None, path.clone(), RouteParams::new()),
            },
            MatcherLocationRaw::Relative { params } => {
                let matcher = match &current.name {
                    Some(name) => self.get_record_matcher(name),
                    None => self.find_by_path(&current.path),
                }
                .ok_or_else(|| MatcherError::MatcherNotFound {
                    location: format!("params relative to \"{}\"", current.path),
                })?;

                let mut merged = current.params.clone();
                merged.extend(params.iter().map(|(key, value)| (key.clone(), value.clone())));
                let path = matcher.pattern().stringify(&merged)?;
                (Some(matcher), path, merged)
            }
        };

        let Some(matcher) = matcher else {
            tracing::trace!(path = %path, "no route matched");
            return Ok(MatcherLocation {
                name: None,
                path,
                params,
                matched: Vec::new(),
                meta: RouteMeta::new(),
            });
        };

        let matched = self.matched_chain(matcher.id());
        let mut meta = RouteMeta::new();
        for record in &matched {
            meta.extend(record.meta().iter().map(|(key, value)| (key.clone(), value.clone())));
        }

        Ok(MatcherLocation {
            name: matcher.record().name().cloned(),
            path,
            params,
            matched,
            meta,
        })
    }
}
