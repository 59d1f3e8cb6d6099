use memchr::memchr;

use super::query::{decode, parse_query, stringify_query};
use crate::types::LocationQuery;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUrl {
    pub full_path: String,
    pub path: String,
    pub query: LocationQuery,
    /// Includes the leading `#` when present.
    pub hash: String,
}

/// Splits `location` into path, query and hash, resolving a relative path
/// against `current_location`.
pub fn parse_url(location: &str, current_location: &str) -> ParsedUrl {
    let bytes = location.as_bytes();
    let hash_pos = memchr(b'#', bytes);
    let mut search_pos = memchr(b'?', bytes);

    // a `?` inside the hash is part of the hash
    if let (Some(hash), Some(search)) = (hash_pos, search_pos)
        && hash < search
    {
        search_pos = None;
    }

    let mut path: Option<&str> = None;
    let mut search = "";
    let mut query = LocationQuery::new();
    let mut hash = "";

    if let Some(search_at) = search_pos {
        path = Some(&location[..search_at]);
        search = &location[search_at + 1..hash_pos.unwrap_or(location.len())];
        query = parse_query(search);
    }

    if let Some(hash_at) = hash_pos {
        path = path.or(Some(&location[..hash_at]));
        hash = &location[hash_at..];
    }

    let path = resolve_relative_path(path.unwrap_or(location), current_location);
    let mut full_path = path.clone();
    if !search.is_empty() {
        full_path.push('?');
        full_path.push_str(search);
    }
    full_path.push_str(hash);

    ParsedUrl {
        full_path,
        path,
        query,
        hash: decode(hash),
    }
}

pub fn stringify_url(path: &str, query: &LocationQuery, hash: &str) -> String {
    let search = stringify_query(query);
    let mut out = String::with_capacity(path.len() + search.len() + hash.len() + 1);
    out.push_str(path);
    if !search.is_empty() {
        out.push('?');
        out.push_str(&search);
    }
    out.push_str(hash);
    out
}

/// Resolves `to` against `from` the way a browser resolves relative links:
/// `.` stays in the current directory and `..` moves up, never above `/`.
pub fn resolve_relative_path(to: &str, from: &str) -> String {
    if to.starts_with('/') {
        return to.to_string();
    }
    if to.is_empty() {
        return from.to_string();
    }

    let from_segments: Vec<&str> = from.split('/').collect();
    let mut to_segments: Vec<&str> = to.split('/').collect();
    if matches!(to_segments.last(), Some(&"..") | Some(&".")) {
        to_segments.push("");
    }

    let mut position = from_segments.len() - 1;
    let mut to_position = 0usize;
    while to_position < to_segments.len() {
        match to_segments[to_position] {
            "." => {}
            ".." => {
                if position > 1 {
                    position -= 1;
                }
            }
            _ => break,
        }
        to_position += 1;
    }

    format!(
        "{}/{}",
        from_segments[..position].join("/"),
        to_segments[to_position..].join("/")
    )
}
