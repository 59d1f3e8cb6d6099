use crate::types::{LocationQuery, ParamValue};

/// Parses `a=1&b=2&a=3` (with or without the leading `?`). Repeated keys
/// become lists, `+` is read as a space and percent escapes are decoded.
pub fn parse_query(search: &str) -> LocationQuery {
    let mut query = LocationQuery::new();
    let search = search.strip_prefix('?').unwrap_or(search);
    if search.is_empty() {
        return query;
    }

    for pair in search.split('&').filter(|pair| !pair.is_empty()) {
        let pair = pair.replace('+', " ");
        let (raw_key, raw_value) = match pair.split_once('=') {
            Some((key, value)) => (key, value),
            None => (pair.as_str(), ""),
        };
        let key = decode(raw_key);
        let value = decode(raw_value);

        match query.get_mut(&key) {
            Some(ParamValue::List(values)) => values.push(value),
            Some(existing @ ParamValue::Single(_)) => {
                let first = match std::mem::replace(existing, ParamValue::List(Vec::new())) {
                    ParamValue::Single(first) => first,
                    ParamValue::List(_) => String::new(),
                };
                *existing = ParamValue::List(vec![first, value]);
            }
            None => {
                query.insert(key, ParamValue::Single(value));
            }
        }
    }

    query
}

/// Serializes a query without the leading `?`.
pub fn stringify_query(query: &LocationQuery) -> String {
    let mut out = String::new();
    for (key, value) in query {
        let key = encode_query_component(key);
        let values: &[String] = match value {
            ParamValue::Single(single) => std::slice::from_ref(single),
            ParamValue::List(list) => list,
        };
        for value in values {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(&key);
            out.push('=');
            out.push_str(&encode_query_component(value));
        }
    }
    out
}

/// Percent-decodes `input`. Malformed escapes leave the input untouched.
pub fn decode(input: &str) -> String {
    if memchr::memchr(b'%', input.as_bytes()).is_none() {
        return input.to_string();
    }

    let bytes = input.as_bytes();
    let mut output = Vec::with_capacity(bytes.len());
    let mut idx = 0usize;
    while idx < bytes.len() {
        if bytes[idx] == b'%' {
            let decoded = bytes
                .get(idx + 1)
                .zip(bytes.get(idx + 2))
                .and_then(|(hi, lo)| decode_hex_pair(*hi, *lo));
            match decoded {
                Some(value) => {
                    output.push(value);
                    idx += 3;
                    continue;
                }
                None => {
                    tracing::warn!(input, index = idx, "malformed percent escape left as is");
                    return input.to_string();
                }
            }
        }
        output.push(bytes[idx]);
        idx += 1;
    }

    String::from_utf8(output).unwrap_or_else(|_| input.to_string())
}

fn encode_query_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'a'..=b'z'
            | b'A'..=b'Z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'$'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b','
            | b';'
            | b':'
            | b'@'
            | b'/'
            | b'?' => out.push(byte as char),
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

/// Percent-encodes a path parameter, `/` included, so it stays in one segment.
pub fn encode_param(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'a'..=b'z'
            | b'A'..=b'Z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'='
            | b':'
            | b'@' => out.push(byte as char),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn decode_hex_pair(hi: u8, lo: u8) -> Option<u8> {
    fn val(byte: u8) -> Option<u8> {
        match byte {
            b'0'..=b'9' => Some(byte - b'0'),
            b'a'..=b'f' => Some(byte - b'a' + 10),
            b'A'..=b'F' => Some(byte - b'A' + 10),
            _ => None,
        }
    }

    Some(val(hi)? << 4 | val(lo)?)
}
