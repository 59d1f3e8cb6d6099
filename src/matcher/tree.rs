use hashbrown::HashMap as FastHashMap;
use std::cmp::Ordering;
use std::sync::Arc;

use super::{MatcherError, MatcherResult};
use crate::location::LocationTarget;
use crate::pattern::{CompiledPattern, PathParserOptions, compare_path_score, parse_path};
use crate::record::{RouteRecord, RouteRecordRaw, RouteRedirect};
use crate::types::RouteName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(u64);

/// A compiled pattern bound to one record, linked into the route tree.
#[derive(Debug)]
pub struct RouteMatcher {
    id: MatcherId,
    record: Arc<RouteRecord>,
    pattern: CompiledPattern,
    parent: Option<MatcherId>,
    children: Vec<MatcherId>,
    aliases: Vec<MatcherId>,
}

impl RouteMatcher {
    pub fn id(&self) -> MatcherId {
        self.id
    }

    pub fn record(&self) -> &Arc<RouteRecord> {
        &self.record
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn parent(&self) -> Option<MatcherId> {
        self.parent
    }

    pub fn children(&self) -> &[MatcherId] {
        &self.children
    }

    pub fn aliases(&self) -> &[MatcherId] {
        &self.aliases
    }

    /// Only named records, records with views and redirects can be
    /// navigated to. Others exist to group children.
    fn is_matchable(&self) -> bool {
        self.record.name().is_some() || self.record.has_views() || self.record.redirect().is_some()
    }
}

/// Arena of matchers plus the score-sorted list used for path lookup.
#[derive(Debug, Default)]
pub struct RouterMatcher {
    options: PathParserOptions,
    matchers: FastHashMap<MatcherId, RouteMatcher>,
    ordered: Vec<MatcherId>,
    names: FastHashMap<RouteName, MatcherId>,
    next_id: u64,
}

impl RouterMatcher {
    pub fn new(options: PathParserOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Adds `raw`, its aliases and its children. Returns the id of the
    /// original matcher; removing it removes everything added here.
    #[tracing::instrument(level = "trace", skip(self, raw), fields(path = %raw.path))]
    pub fn add_route(
        &mut self,
        raw: &RouteRecordRaw,
        parent: Option<MatcherId>,
    ) -> MatcherResult<MatcherId> {
        let parent_path = parent
            .and_then(|parent| self.matchers.get(&parent))
            .map(|parent| parent.record.path().to_string());
        // nothing is inserted or evicted unless the whole subtree compiles
        self.check_record(raw, parent_path.as_deref())?;
        self.add_record(raw, parent, None)
    }

    fn record_options(&self, raw: &RouteRecordRaw) -> PathParserOptions {
        PathParserOptions {
            strict: raw.strict.unwrap_or(self.options.strict),
            sensitive: raw.sensitive.unwrap_or(self.options.sensitive),
        }
    }

    fn check_record(&self, raw: &RouteRecordRaw, parent_path: Option<&str>) -> MatcherResult<()> {
        if let Some(RouteRedirect::To(to)) = &raw.redirect
            && to.target == LocationTarget::Relative
        {
            return Err(MatcherError::InvalidRedirect {
                path: raw.path.clone(),
            });
        }

        let options = self.record_options(raw);
        let paths = std::iter::once(raw.path.as_str()).chain(raw.aliases.iter().map(String::as_str));
        for path in paths {
            let full_path = join_paths(parent_path, path);
            if full_path == "*" {
                return Err(MatcherError::BareCatchAll { path: full_path });
            }
            parse_path(&full_path, options)?;
            for child in &raw.children {
                self.check_record(child, Some(&full_path))?;
            }
        }
        Ok(())
    }

    fn add_record(
        &mut self,
        raw: &RouteRecordRaw,
        parent: Option<MatcherId>,
        mut original: Option<MatcherId>,
    ) -> MatcherResult<MatcherId> {
        let is_root_add = original.is_none();
        let options = self.record_options(raw);

        let paths = std::iter::once(raw.path.as_str()).chain(raw.aliases.iter().map(String::as_str));
        let mut main: Option<MatcherId> = None;

        for path in paths {
            let full_path = self.join_parent_path(parent, path);
            if full_path == "*" {
                return Err(MatcherError::BareCatchAll { path: full_path });
            }
            let pattern = parse_path(&full_path, options)?;

            // the main record aliases the anchor it was given, if any;
            // alias paths alias the anchor or the main record
            let alias_of = original
                .and_then(|anchor| self.matchers.get(&anchor))
                .map(|anchor| Arc::clone(&anchor.record));
            let record = Arc::new(RouteRecord::new(raw, full_path, options, alias_of));

            let id = MatcherId(self.next_id);
            self.next_id += 1;
            let matcher = RouteMatcher {
                id,
                record,
                pattern,
                parent,
                children: Vec::new(),
                aliases: Vec::new(),
            };
            let is_alias = self.is_alias_matcher(&matcher);

            if let Some(parent_matcher) = parent.and_then(|parent| self.matchers.get_mut(&parent))
                && matcher.record.is_alias() == parent_matcher.record.is_alias()
            {
                parent_matcher.children.push(id);
            }

            if let Some(anchor) = original.and_then(|anchor| self.matchers.get_mut(&anchor)) {
                anchor.aliases.push(id);
            } else if is_root_add
                && !is_alias
                && let Some(name) = raw.name.as_ref()
            {
                // re-adding a name replaces the old route and its subtree
                self.remove_by_name(name);
            }

            let matchable = matcher.is_matchable();
            self.matchers.insert(id, matcher);
            if matchable {
                self.insert_ordered(id, is_alias);
            }

            for (index, child) in raw.children.iter().enumerate() {
                let child_original = original
                    .and_then(|anchor| self.matchers.get(&anchor))
                    .and_then(|anchor| anchor.children.get(index).copied());
                self.add_record(child, Some(id), child_original)?;
            }

            main.get_or_insert(id);
            original = original.or(Some(id));
        }

        main.ok_or_else(|| MatcherError::MatcherNotFound {
            location: raw.path.clone(),
        })
    }

    fn join_parent_path(&self, parent: Option<MatcherId>, path: &str) -> String {
        let parent_path = parent
            .and_then(|id| self.matchers.get(&id))
            .map(|parent| parent.record.path());
        join_paths(parent_path, path)
    }

    /// An alias, or anything nested under one.
    fn is_alias_matcher(&self, matcher: &RouteMatcher) -> bool {
        if matcher.record.is_alias() {
            return true;
        }
        let mut current = matcher.parent;
        while let Some(id) = current {
            let Some(ancestor) = self.matchers.get(&id) else {
                break;
            };
            if ancestor.record.is_alias() {
                return true;
            }
            current = ancestor.parent;
        }
        false
    }

    fn insert_ordered(&mut self, id: MatcherId, is_alias: bool) {
        let Some(matcher) = self.matchers.get(&id) else {
            return;
        };
        let score = matcher.pattern.score();

        let mut lower = 0usize;
        let mut upper = self.ordered.len();
        while lower != upper {
            let mid = (lower + upper) / 2;
            let order = self
                .matchers
                .get(&self.ordered[mid])
                .map_or(Ordering::Greater, |other| {
                    compare_path_score(score, other.pattern.score())
                });
            if order == Ordering::Less {
                upper = mid;
            } else {
                lower = mid + 1;
            }
        }

        // a child that scores like its ancestor must come before it
        if let Some(ancestor) = self.insertion_ancestor(matcher)
            && let Some(position) = self.ordered[..upper].iter().rposition(|other| *other == ancestor)
        {
            upper = position;
        }

        self.ordered.insert(upper, id);
        if !is_alias && let Some(name) = matcher.record.name() {
            self.names.insert(name.clone(), id);
        }
    }

    fn insertion_ancestor(&self, matcher: &RouteMatcher) -> Option<MatcherId> {
        let mut current = matcher.parent;
        while let Some(id) = current {
            let ancestor = self.matchers.get(&id)?;
            if ancestor.is_matchable()
                && compare_path_score(matcher.pattern.score(), ancestor.pattern.score())
                    == Ordering::Equal
            {
                return Some(id);
            }
            current = ancestor.parent;
        }
        None
    }

    /// Removes the matcher, its descendants and all of their aliases.
    pub fn remove_route(&mut self, id: MatcherId) -> bool {
        let Some(matcher) = self.matchers.remove(&id) else {
            return false;
        };

        self.ordered.retain(|other| *other != id);
        if let Some(name) = matcher.record.name()
            && self.names.get(name) == Some(&id)
        {
            self.names.remove(name);
        }
        if let Some(parent) = matcher.parent.and_then(|parent| self.matchers.get_mut(&parent)) {
            parent.children.retain(|child| *child != id);
        }

        for child in matcher.children {
            self.remove_route(child);
        }
        for alias in matcher.aliases {
            self.remove_route(alias);
        }
        tracing::trace!(path = %matcher.record.path(), "removed route matcher");
        true
    }

    pub fn remove_by_name(&mut self, name: &RouteName) -> bool {
        match self.names.get(name).copied() {
            Some(id) => self.remove_route(id),
            None => false,
        }
    }

    pub fn clear_routes(&mut self) {
        self.matchers.clear();
        self.ordered.clear();
        self.names.clear();
    }

    /// Navigable matchers, most specific first.
    pub fn get_routes(&self) -> impl Iterator<Item = &RouteMatcher> {
        self.ordered.iter().filter_map(|id| self.matchers.get(id))
    }

    pub fn get_record_matcher(&self, name: &RouteName) -> Option<&RouteMatcher> {
        self.names.get(name).and_then(|id| self.matchers.get(id))
    }

    pub fn get_matcher(&self, id: MatcherId) -> Option<&RouteMatcher> {
        self.matchers.get(&id)
    }

    pub fn has_route(&self, name: &RouteName) -> bool {
        self.names.contains_key(name)
    }

    pub(super) fn find_by_path(&self, path: &str) -> Option<&RouteMatcher> {
        self.get_routes().find(|matcher| matcher.pattern.is_match(path))
    }

    /// Records from the root down to `id`.
    pub(super) fn matched_chain(&self, id: MatcherId) -> Vec<Arc<RouteRecord>> {
        let mut matched = Vec::new();
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(matcher) = self.matchers.get(&id) else {
                break;
            };
            matched.push(Arc::clone(&matcher.record));
            current = matcher.parent;
        }
        matched.reverse();
        matched
    }
}

/// Joins a child path onto its parent's; absolute child paths stand alone.
fn join_paths(parent_path: Option<&str>, path: &str) -> String {
    match parent_path {
        Some(parent_path) if !path.starts_with('/') => {
            if path.is_empty() {
                parent_path.to_string()
            } else if parent_path.ends_with('/') {
                format!("{parent_path}{path}")
            } else {
                format!("{parent_path}/{path}")
            }
        }
        _ => path.to_string(),
    }
}
