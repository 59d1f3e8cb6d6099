use hashbrown::HashSet as FastHashSet;
use regex::{Regex, escape};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::ast::{Token, TokenSegment};
use super::scoring::{
    BONUS_CASE_SENSITIVE, BONUS_CUSTOM_REGEXP, BONUS_OPTIONAL, BONUS_REPEATABLE, BONUS_STRICT,
    BONUS_WILDCARD, PathScore, SCORE_DYNAMIC, SCORE_ROOT, SCORE_SEGMENT, SCORE_STATIC,
};
use super::{PatternError, PatternResult};
use crate::types::{ParamValue, RouteParams};

pub const DEFAULT_PARAM_PATTERN: &str = "[^/]+?";
const CATCH_ALL_PATTERN: &str = ".*";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathParserOptions {
    /// Reject a trailing slash that the pattern does not spell out.
    pub strict: bool,
    /// Match letter case exactly.
    pub sensitive: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamKey {
    pub name: String,
    pub optional: bool,
    pub repeatable: bool,
}

/// A route path turned into a matcher, a parser, a stringifier and a score.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    keys: Vec<ParamKey>,
    score: PathScore,
    segments: Vec<TokenSegment>,
}

fn capture_name(index: usize) -> String {
    format!("k{index}")
}

#[tracing::instrument(level = "trace", skip(segments), fields(segments=segments.len() as u64))]
pub fn compile_pattern(
    segments: Vec<TokenSegment>,
    options: PathParserOptions,
) -> PatternResult<CompiledPattern> {
    let mut score: PathScore = Vec::with_capacity(segments.len());
    let mut source = String::from("^");
    let mut keys: Vec<ParamKey> = Vec::new();
    let mut seen: FastHashSet<String> = FastHashSet::new();

    for segment in &segments {
        let mut segment_scores: SmallVec<[i32; 4]> = SmallVec::new();
        if segment.is_empty() {
            segment_scores.push(SCORE_ROOT);
            if options.strict {
                source.push('/');
            }
        }

        for (token_index, token) in segment.iter().enumerate() {
            let mut sub_score = SCORE_SEGMENT
                + if options.sensitive {
                    BONUS_CASE_SENSITIVE
                } else {
                    0
                };

            match token {
                Token::Static { value } => {
                    if token_index == 0 {
                        source.push('/');
                    }
                    source.push_str(&escape(value));
                    sub_score += SCORE_STATIC;
                }
                Token::Param(param) => {
                    if !seen.insert(param.name.clone()) {
                        return Err(PatternError::DuplicateParamName {
                            param: param.name.clone(),
                            pattern: render_segments(&segments),
                        });
                    }

                    let re = param
                        .custom_pattern
                        .as_deref()
                        .unwrap_or(DEFAULT_PARAM_PATTERN);

                    if re != DEFAULT_PARAM_PATTERN {
                        sub_score += BONUS_CUSTOM_REGEXP;
                        if let Err(err) = Regex::new(&format!("^(?:{re})$")) {
                            return Err(PatternError::RegexConstraintInvalid {
                                pattern: render_segments(&segments),
                                name: param.name.clone(),
                                error: err.to_string(),
                            });
                        }
                    }

                    let group = capture_name(keys.len());
                    let mut sub_pattern = if param.repeatable {
                        format!("(?P<{group}>(?:{re})(?:/(?:{re}))*)")
                    } else {
                        format!("(?P<{group}>{re})")
                    };

                    if token_index == 0 {
                        sub_pattern = if param.optional {
                            format!("(?:/{sub_pattern})")
                        } else {
                            format!("/{sub_pattern}")
                        };
                    }
                    if param.optional {
                        sub_pattern.push('?');
                    }
                    source.push_str(&sub_pattern);

                    sub_score += SCORE_DYNAMIC;
                    if param.optional {
                        sub_score += BONUS_OPTIONAL;
                    }
                    if param.repeatable {
                        sub_score += BONUS_REPEATABLE;
                    }
                    if re == CATCH_ALL_PATTERN {
                        sub_score += BONUS_WILDCARD;
                    }

                    keys.push(ParamKey {
                        name: param.name.clone(),
                        optional: param.optional,
                        repeatable: param.repeatable,
                    });
                }
            }

            segment_scores.push(sub_score);
        }

        score.push(segment_scores);
    }

    if options.strict
        && let Some(last) = score.last_mut().and_then(|segment| segment.last_mut())
    {
        *last += BONUS_STRICT;
    }

    if !options.strict {
        source.push_str("/?");
    }
    source.push('$');

    if !options.sensitive {
        source.insert_str(0, "(?i)");
    }

    let regex = Regex::new(&source).map_err(|err| PatternError::RegexConstraintInvalid {
        pattern: render_segments(&segments),
        name: String::new(),
        error: err.to_string(),
    })?;

    Ok(CompiledPattern {
        regex,
        keys,
        score,
        segments,
    })
}

impl CompiledPattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn keys(&self) -> &[ParamKey] {
        &self.keys
    }

    pub fn score(&self) -> &PathScore {
        &self.score
    }

    pub fn segments(&self) -> &[TokenSegment] {
        &self.segments
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extracts the parameters of `path`, or `None` when it does not match.
    pub fn parse(&self, path: &str) -> Option<RouteParams> {
        let captures = self.regex.captures(path)?;
        let mut params = RouteParams::with_capacity(self.keys.len());

        for (index, key) in self.keys.iter().enumerate() {
            let value = captures
                .name(&capture_name(index))
                .map(|m| m.as_str())
                .unwrap_or("");
            let param = if !value.is_empty() && key.repeatable {
                ParamValue::List(value.split('/').map(str::to_string).collect())
            } else {
                ParamValue::Single(value.to_string())
            };
            params.insert(key.name.clone(), param);
        }

        Some(params)
    }

    /// Builds a path from `params`. Fails when a required parameter is
    /// absent or a list is given to a parameter that is not repeatable.
    pub fn stringify(&self, params: &RouteParams) -> PatternResult<String> {
        let mut path = String::new();
        let mut avoid_duplicated_slash = false;

        for segment in &self.segments {
            if !avoid_duplicated_slash || !path.ends_with('/') {
                path.push('/');
            }
            avoid_duplicated_slash = false;

            for token in segment {
                match token {
                    Token::Static { value } => path.push_str(value),
                    Token::Param(param) => {
                        let text = match params.get(&param.name) {
                            Some(ParamValue::List(values)) => {
                                if !param.repeatable {
                                    return Err(PatternError::ParamNotRepeatable {
                                        name: param.name.clone(),
                                    });
                                }
                                values.join("/")
                            }
                            Some(ParamValue::Single(value)) => value.clone(),
                            None => String::new(),
                        };

                        if text.is_empty() {
                            if !param.optional {
                                return Err(PatternError::MissingRequiredParam {
                                    name: param.name.clone(),
                                });
                            }
                            if segment.len() < 2 {
                                if path.ends_with('/') {
                                    path.pop();
                                } else {
                                    avoid_duplicated_slash = true;
                                }
                            }
                        }

                        path.push_str(&text);
                    }
                }
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

fn render_segments(segments: &[TokenSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        for token in segment {
            match token {
                Token::Static { value } => out.push_str(value),
                Token::Param(param) => {
                    out.push(':');
                    out.push_str(&param.name);
                    if let Some(custom) = &param.custom_pattern {
                        out.push('(');
                        out.push_str(custom);
                        out.push(')');
                    }
                    match (param.optional, param.repeatable) {
                        (true, true) => out.push('*'),
                        (true, false) => out.push('?'),
                        (false, true) => out.push('+'),
                        (false, false) => {}
                    }
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::tokenize_path;

    fn compile(path: &str) -> CompiledPattern {
        compile_pattern(tokenize_path(path).unwrap(), PathParserOptions::default()).unwrap()
    }

    #[test]
    fn optional_param_captures_empty_value() {
        let pattern = compile("/users/:id?");
        let params = pattern.parse("/users").unwrap();
        assert_eq!(params.get("id"), Some(&ParamValue::Single(String::new())));
        assert_eq!(pattern.stringify(&params).unwrap(), "/users");
    }

    #[test]
    fn non_strict_accepts_trailing_slash_and_ignores_case() {
        let pattern = compile("/About");
        assert!(pattern.is_match("/about/"));
        assert!(pattern.is_match("/ABOUT"));
        assert!(!pattern.is_match("/about/more"));
    }

    #[test]
    fn strict_and_sensitive_options_apply() {
        let options = PathParserOptions {
            strict: true,
            sensitive: true,
        };
        let pattern = compile_pattern(tokenize_path("/About").unwrap(), options).unwrap();
        assert!(pattern.is_match("/About"));
        assert!(!pattern.is_match("/About/"));
        assert!(!pattern.is_match("/about"));
    }

    #[test]
    fn invalid_custom_pattern_is_rejected() {
        let err = compile_pattern(
            tokenize_path("/:id([)").unwrap(),
            PathParserOptions::default(),
        )
        .unwrap_err();
        match err {
            PatternError::RegexConstraintInvalid { name, .. } => assert_eq!(name, "id"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_param_names_are_rejected() {
        let err =
            compile_pattern(tokenize_path("/:id/:id").unwrap(), PathParserOptions::default())
                .unwrap_err();
        assert!(matches!(err, PatternError::DuplicateParamName { .. }));
    }

    #[test]
    fn stringify_rejects_list_for_single_param() {
        let pattern = compile("/:id");
        let mut params = RouteParams::new();
        params.insert("id".to_string(), ParamValue::from(vec!["a", "b"]));
        assert_eq!(
            pattern.stringify(&params).unwrap_err(),
            PatternError::ParamNotRepeatable {
                name: "id".to_string()
            }
        );
    }
}
