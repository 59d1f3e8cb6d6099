use thiserror::Error;

use crate::pattern::PatternError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatcherError {
    #[error("no match for {location}")]
    MatcherNotFound { location: String },
    #[error(
        "catch all routes (\"{path}\") must be defined using a param with a custom pattern, e.g. \"/:path(.*)\""
    )]
    BareCatchAll { path: String },
    #[error("invalid redirect on route \"{path}\": a redirect must name a route or give a path")]
    InvalidRedirect { path: String },
    #[error("parent route \"{name}\" does not exist")]
    ParentNotFound { name: String },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

pub type MatcherResult<T> = Result<T, MatcherError>;
