use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::guards::GuardFault;
use crate::location::{RouteLocation, RouteLocationRaw};
use crate::matcher::MatcherError;

bitflags! {
    /// Kinds of navigation failure. Values are stable so callers can test
    /// several kinds at once.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct NavigationFailureType: u8 {
        const MATCHER_NOT_FOUND = 1;
        const REDIRECTED = 1 << 1;
        const ABORTED = 1 << 2;
        const CANCELLED = 1 << 3;
        const DUPLICATED = 1 << 4;
    }
}

/// A navigation that did not complete, as opposed to one that errored.
#[derive(Debug, Clone)]
pub struct NavigationFailure {
    pub kind: NavigationFailureType,
    pub from: Arc<RouteLocation>,
    pub to: Arc<RouteLocation>,
    /// Set for [`NavigationFailureType::REDIRECTED`].
    pub redirect_to: Option<RouteLocationRaw>,
}

impl fmt::Display for NavigationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let from = &self.from.full_path;
        let to = &self.to.full_path;
        if self.kind.contains(NavigationFailureType::REDIRECTED) {
            write!(f, "redirected from \"{from}\" to \"{to}\" via a navigation guard")
        } else if self.kind.contains(NavigationFailureType::ABORTED) {
            write!(f, "navigation aborted from \"{from}\" to \"{to}\" via a navigation guard")
        } else if self.kind.contains(NavigationFailureType::CANCELLED) {
            write!(f, "navigation cancelled from \"{from}\" to \"{to}\" with a new navigation")
        } else if self.kind.contains(NavigationFailureType::DUPLICATED) {
            write!(f, "avoided redundant navigation to current location: \"{from}\"")
        } else {
            write!(f, "no match for \"{to}\"")
        }
    }
}

#[derive(Debug, Error, Clone)]
pub enum NavigationError {
    #[error("{0}")]
    Failure(NavigationFailure),
    #[error(transparent)]
    Matcher(#[from] MatcherError),
    #[error("invalid redirect from \"{from}\": {reason}")]
    InvalidRedirect { from: String, reason: String },
    #[error("navigation guard for \"{to}\" finished without deciding")]
    InvalidGuard { to: String },
    #[error("failed to load view '{view}' of route \"{record}\": {cause}")]
    ComponentLoad {
        record: String,
        view: String,
        cause: GuardFault,
    },
    #[error("detected an infinite redirection chain from \"{from}\" to \"{to}\"")]
    InfiniteRedirect { from: String, to: String },
    #[error("navigation guard failed: {0}")]
    Guard(GuardFault),
}

impl NavigationError {
    pub fn failure(&self) -> Option<&NavigationFailure> {
        match self {
            NavigationError::Failure(failure) => Some(failure),
            _ => None,
        }
    }

    pub(crate) fn failed(
        kind: NavigationFailureType,
        from: &Arc<RouteLocation>,
        to: &Arc<RouteLocation>,
    ) -> Self {
        NavigationError::Failure(NavigationFailure {
            kind,
            from: Arc::clone(from),
            to: Arc::clone(to),
            redirect_to: None,
        })
    }

    pub(crate) fn redirected(
        from: &Arc<RouteLocation>,
        to: &Arc<RouteLocation>,
        redirect_to: RouteLocationRaw,
    ) -> Self {
        NavigationError::Failure(NavigationFailure {
            kind: NavigationFailureType::REDIRECTED,
            from: Arc::clone(from),
            to: Arc::clone(to),
            redirect_to: Some(redirect_to),
        })
    }
}

pub type NavigationResult<T> = Result<T, NavigationError>;

/// Whether `err` is a navigation failure of any kind in `kinds`. An empty
/// mask accepts every kind.
pub fn is_navigation_failure(err: &NavigationError, kinds: NavigationFailureType) -> bool {
    let kind = match err {
        NavigationError::Failure(failure) => failure.kind,
        NavigationError::Matcher(MatcherError::MatcherNotFound { .. }) => {
            NavigationFailureType::MATCHER_NOT_FOUND
        }
        _ => return false,
    };
    kinds.is_empty() || kinds.intersects(kind)
}
