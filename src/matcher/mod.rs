mod error;
mod resolver;
mod tree;

pub use error::{MatcherError, MatcherResult};
pub use resolver::{MatcherLocation, MatcherLocationRaw};
pub use tree::{MatcherId, RouteMatcher, RouterMatcher};
