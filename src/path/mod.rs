mod query;
mod url;

pub use query::{decode, encode_param, parse_query, stringify_query};
pub use url::{ParsedUrl, parse_url, resolve_relative_path, stringify_url};
