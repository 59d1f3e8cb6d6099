use bunner_navigator::ParamValue;
use bunner_navigator::pattern::{
    CompiledPattern, PathParserOptions, PatternError, Token, compare_path_score, parse_path,
    tokenize_path,
};
use std::cmp::Ordering;

fn compile(path: &str) -> CompiledPattern {
    parse_path(path, PathParserOptions::default()).expect("pattern should compile")
}

fn params(pairs: &[(&str, ParamValue)]) -> bunner_navigator::RouteParams {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn parses_static_and_parameter_segments() {
    let segments = tokenize_path("/users/:id").expect("pattern should tokenize");
    assert_eq!(segments.len(), 2);
    match &segments[0][0] {
        Token::Static { value } => assert_eq!(value, "users"),
        other => panic!("expected static token, got {other:?}"),
    }
    match &segments[1][0] {
        Token::Param(param) => {
            assert_eq!(param.name, "id");
            assert!(!param.optional && !param.repeatable);
            assert!(param.custom_pattern.is_none());
        }
        other => panic!("expected param token, got {other:?}"),
    }
}

#[test]
fn rejects_path_without_leading_slash() {
    let err = tokenize_path("users/:id").expect_err("relative pattern should be rejected");
    match err {
        PatternError::MissingLeadingSlash { pattern } => assert_eq!(pattern, "users/:id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_unterminated_custom_pattern() {
    let err = tokenize_path("/:id(\\d+").expect_err("unterminated pattern should fail");
    match err {
        PatternError::UnterminatedParameterConstraint { name, .. } => assert_eq!(name, "id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_parameter_without_name() {
    let err = tokenize_path("/users/:/edit").expect_err("nameless param should fail");
    match err {
        PatternError::ParameterMissingName { index, .. } => assert_eq!(index, 7),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_trailing_escape() {
    let err = tokenize_path("/files\\").expect_err("lone escape should fail");
    match err {
        PatternError::LoneEscapeCharacter { .. } => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_repeatable_param_sharing_its_segment() {
    let err = tokenize_path("/files-:rest+").expect_err("repeatable in mixed segment should fail");
    match err {
        PatternError::RepeatableParamNotAlone { name, .. } => assert_eq!(name, "rest"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_optional_param_sharing_its_segment() {
    let err = tokenize_path("/v-:version?").expect_err("optional in mixed segment should fail");
    match err {
        PatternError::OptionalParamNotAlone { name, .. } => assert_eq!(name, "version"),
        other => panic!("unexpected error: {other:?}"),
    }
    tokenize_path("/v/:version?").expect("optional alone in its segment is fine");
}

#[test]
fn validates_custom_regex_syntax() {
    let err = parse_path("/users/:id([)", PathParserOptions::default())
        .expect_err("invalid regex should fail");
    match err {
        PatternError::RegexConstraintInvalid { name, .. } => assert_eq!(name, "id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_duplicate_param_names() {
    let err = parse_path("/:id/items/:id", PathParserOptions::default())
        .expect_err("duplicate param should fail");
    match err {
        PatternError::DuplicateParamName { param, .. } => assert_eq!(param, "id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn matches_case_insensitively_and_with_trailing_slash_by_default() {
    let pattern = compile("/users/:id");
    assert!(pattern.is_match("/users/42"));
    assert!(pattern.is_match("/USERS/42/"));
    assert!(!pattern.is_match("/users"));
    assert!(!pattern.is_match("/users/42/posts"));
}

#[test]
fn strict_and_sensitive_options_tighten_matching() {
    let pattern = parse_path(
        "/users",
        PathParserOptions {
            strict: true,
            sensitive: true,
        },
    )
    .expect("pattern should compile");
    assert!(pattern.is_match("/users"));
    assert!(!pattern.is_match("/users/"));
    assert!(!pattern.is_match("/Users"));
}

#[test]
fn optional_param_matches_with_and_without_value() {
    let pattern = compile("/users/:id?");
    assert!(pattern.is_match("/users"));
    let parsed = pattern.parse("/users/7").expect("path should match");
    assert_eq!(parsed.get("id"), Some(&ParamValue::from("7")));
    let empty = pattern.parse("/users").expect("path should match");
    assert_eq!(empty.get("id"), Some(&ParamValue::from("")));
}

#[test]
fn repeatable_param_parses_into_list_and_stringifies_back() {
    let pattern = compile("/a/:p+");
    let parsed = pattern.parse("/a/b/c").expect("path should match");
    assert_eq!(parsed.get("p"), Some(&ParamValue::from(["b", "c"])));

    let path = pattern.stringify(&parsed).expect("params should stringify");
    assert_eq!(path, "/a/b/c");
}

#[test]
fn stringify_drops_missing_optional_segment() {
    let pattern = compile("/users/:id?/posts");
    let path = pattern.stringify(&params(&[])).expect("optional param may be absent");
    assert_eq!(path, "/users/posts");
}

#[test]
fn stringify_requires_mandatory_params() {
    let err = compile("/users/:id")
        .stringify(&params(&[]))
        .expect_err("missing param should fail");
    match err {
        PatternError::MissingRequiredParam { name } => assert_eq!(name, "id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn stringify_rejects_list_for_single_param() {
    let err = compile("/users/:id")
        .stringify(&params(&[("id", ParamValue::from(["1", "2"]))]))
        .expect_err("list for single param should fail");
    match err {
        PatternError::ParamNotRepeatable { name } => assert_eq!(name, "id"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn custom_pattern_restricts_values() {
    let pattern = compile("/orders/:id(\\d+)");
    assert!(pattern.is_match("/orders/12"));
    assert!(!pattern.is_match("/orders/abc"));
}

#[test]
fn mixed_segment_round_trips() {
    let pattern = compile("/file-:name.:ext");
    let parsed = pattern.parse("/file-report.pdf").expect("path should match");
    assert_eq!(parsed.get("name"), Some(&ParamValue::from("report")));
    assert_eq!(parsed.get("ext"), Some(&ParamValue::from("pdf")));
    assert_eq!(
        pattern.stringify(&parsed).expect("params should stringify"),
        "/file-report.pdf"
    );
}

#[test]
fn scores_rank_by_specificity() {
    let ordered = [
        "/users",
        "/:id(\\d+)",
        "/:id",
        "/:id?",
        "/:id+",
        "/:id*",
        "/:path(.*)",
    ];
    for pair in ordered.windows(2) {
        let left = compile(pair[0]);
        let right = compile(pair[1]);
        assert_eq!(
            compare_path_score(left.score(), right.score()),
            Ordering::Less,
            "{} should rank before {}",
            pair[0],
            pair[1]
        );
    }
}

#[test]
fn trailing_slash_and_catch_all_rank_before_bare_prefix() {
    let slash = compile("/a/");
    let catch_all = compile("/a/:w(.*)");
    let bare = compile("/a");
    assert_eq!(compare_path_score(slash.score(), catch_all.score()), Ordering::Less);
    assert_eq!(compare_path_score(catch_all.score(), bare.score()), Ordering::Less);
    assert_eq!(compare_path_score(slash.score(), bare.score()), Ordering::Less);
}

fn assert_ranked(ordered: &[&str], options: &[PathParserOptions]) {
    for (pair, opts) in ordered.windows(2).zip(options.windows(2)) {
        let left = parse_path(pair[0], opts[0]).expect("pattern should compile");
        let right = parse_path(pair[1], opts[1]).expect("pattern should compile");
        assert_eq!(
            compare_path_score(left.score(), right.score()),
            Ordering::Less,
            "{} ({:?}) should rank before {} ({:?})",
            pair[0],
            opts[0],
            pair[1],
            opts[1]
        );
    }
}

#[test]
fn mixed_segments_compare_token_by_token() {
    let defaults = [PathParserOptions::default(); 3];
    assert_ranked(&["/a-:b", "/:a-b", "/:a"], &defaults);
    assert_ranked(&["/:a-:b", "/:a"], &defaults[..2]);
    assert_ranked(&["/a-:b", "/:a-:b"], &defaults[..2]);
}

#[test]
fn strict_and_sensitive_break_structural_ties() {
    let loose = PathParserOptions::default();
    let strict = PathParserOptions {
        strict: true,
        ..loose
    };
    let sensitive = PathParserOptions {
        sensitive: true,
        ..loose
    };
    let both = PathParserOptions {
        strict: true,
        sensitive: true,
    };

    assert_ranked(&["/a", "/a"], &[strict, loose]);
    assert_ranked(&["/a", "/a"], &[sensitive, loose]);
    assert_ranked(&["/a", "/a", "/a"], &[both, strict, sensitive]);
    assert_ranked(&["/:id", "/:id"], &[strict, loose]);
    // a bonus never lifts a parameter above a static segment
    assert_ranked(&["/users", "/:id"], &[loose, both]);
}
