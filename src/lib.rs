pub mod enums;
pub mod history;
pub mod location;
pub mod matcher;
pub mod path;
pub mod pattern;
pub mod record;
pub mod router;
pub mod types;

pub use enums::{NavigationDirection, NavigationType};
pub use history::{HistoryChange, LocationSource, MemoryHistory};
pub use location::{LocationTarget, RouteLocation, RouteLocationRaw};
pub use matcher::{MatcherError, MatcherResult};
pub use pattern::{PathParserOptions, PatternError, PatternResult};
pub use record::{ComponentInstance, RouteComponent, RouteRecord, RouteRecordRaw, RouteView};
pub use router::{
    GuardOutcome, NavigationError, NavigationFailure, NavigationFailureType, NavigationGuard,
    NavigationResult, Next, RemoveFn, Router, RouterConfigError, RouterOptions,
    is_navigation_failure,
};
pub use types::{HistoryState, LocationQuery, ParamValue, RouteMeta, RouteName, RouteParams};
