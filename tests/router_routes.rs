use bunner_navigator::{
    MatcherError, MemoryHistory, ParamValue, RouteComponent, RouteLocationRaw, RouteName,
    RouteRecordRaw, Router, RouterConfigError, RouterOptions,
};
use futures::executor::block_on;
use std::sync::Arc;

struct Page(&'static str);

impl RouteComponent for Page {
    fn name(&self) -> &str {
        self.0
    }
}

fn router_with(history: Arc<MemoryHistory>) -> Router {
    let router = Router::new(RouterOptions::default(), history).expect("router should build");
    router
        .add_routes([
            RouteRecordRaw::new("/").name("home").component(Page("home")),
            RouteRecordRaw::new("/users/:id")
                .name("user")
                .component(Page("user")),
        ])
        .expect("routes should register");
    router
}

fn router() -> Router {
    router_with(Arc::new(MemoryHistory::default()))
}

#[test]
fn router_when_options_invalid_then_construction_fails() {
    let options = RouterOptions {
        max_redirects: 0,
        ..RouterOptions::default()
    };
    let err = Router::new(options, Arc::new(MemoryHistory::default()))
        .expect_err("zero redirects should be rejected");
    assert_eq!(err, RouterConfigError::MaxRedirectsInvalid { provided: 0 });
}

#[test]
fn options_builder_when_valid_then_applies_values() {
    let options = RouterOptions::builder()
        .case_sensitive(true)
        .strict_trailing_slash(true)
        .max_redirects(5)
        .build()
        .expect("builder should succeed");
    assert!(options.case_sensitive);
    assert!(options.strict_trailing_slash);
    assert_eq!(options.max_redirects, 5);

    let err = RouterOptions::builder()
        .max_redirects(0)
        .build()
        .expect_err("zero redirects should be rejected");
    match err {
        RouterConfigError::MaxRedirectsInvalid { provided } => assert_eq!(provided, 0),
    }
}

#[test]
fn router_when_strict_and_sensitive_then_routes_inherit_options() {
    let options = RouterOptions::builder()
        .case_sensitive(true)
        .strict_trailing_slash(true)
        .build()
        .expect("builder should succeed");
    let router =
        Router::new(options, Arc::new(MemoryHistory::default())).expect("router should build");
    router
        .add_route(RouteRecordRaw::new("/about").name("about"))
        .expect("route should register");
    router
        .add_route(RouteRecordRaw::new("/loose").name("loose").strict(false))
        .expect("route should register");

    assert_eq!(router.resolve("/about").expect("resolve").matched.len(), 1);
    assert!(router.resolve("/about/").expect("resolve").matched.is_empty());
    assert!(router.resolve("/About").expect("resolve").matched.is_empty());
    assert_eq!(router.resolve("/loose/").expect("resolve").matched.len(), 1);
}

#[test]
fn resolve_when_url_given_then_query_and_hash_are_split() {
    let router = router();
    let location = router
        .resolve("/users/7?tab=info&tag=a&tag=b#top")
        .expect("url should resolve");

    assert_eq!(location.path, "/users/7");
    assert_eq!(location.name, Some(RouteName::from("user")));
    assert_eq!(location.params.get("id"), Some(&ParamValue::from("7")));
    assert_eq!(location.query.get("tab"), Some(&ParamValue::from("info")));
    assert_eq!(location.query.get("tag"), Some(&ParamValue::from(["a", "b"])));
    assert_eq!(location.hash, "#top");
    assert_eq!(location.full_path, "/users/7?tab=info&tag=a&tag=b#top");
    assert_eq!(location.href, "/users/7?tab=info&tag=a&tag=b#top");
}

#[test]
fn resolve_when_named_then_params_are_encoded_in_path() {
    let router = router();
    let location = router
        .resolve(
            RouteLocationRaw::named("user")
                .param("id", "a b/c")
                .query_param("q", "x y")
                .with_hash("section"),
        )
        .expect("named location should resolve");

    assert_eq!(location.path, "/users/a%20b%2Fc");
    assert_eq!(location.params.get("id"), Some(&ParamValue::from("a b/c")));
    assert_eq!(location.full_path, "/users/a%20b%2Fc?q=x+y#section");
}

#[test]
fn resolve_when_url_has_explicit_query_then_both_are_merged() {
    let router = router();
    let location = router
        .resolve(RouteLocationRaw::url("/users/1?a=1").query_param("b", "2"))
        .expect("url should resolve");
    assert_eq!(location.full_path, "/users/1?a=1&b=2");
}

#[test]
fn resolve_when_history_has_base_then_href_is_prefixed() {
    let router = router_with(Arc::new(MemoryHistory::new("/app/")));
    let location = router.resolve("/users/1").expect("url should resolve");
    assert_eq!(location.full_path, "/users/1");
    assert_eq!(location.href, "/app/users/1");

    let hashed = router_with(Arc::new(MemoryHistory::new("#")));
    let location = hashed.resolve("/users/1").expect("url should resolve");
    assert_eq!(location.href, "#/users/1");
}

#[test]
fn resolve_when_path_unknown_then_location_has_no_match() {
    let router = router();
    let location = router.resolve("/nowhere").expect("unknown path is not an error");
    assert!(location.matched.is_empty());
    assert!(location.name.is_none());
    assert_eq!(location.path, "/nowhere");
}

#[test]
fn resolve_when_name_unknown_then_matcher_not_found() {
    let router = router();
    let err = router
        .resolve(RouteLocationRaw::named("ghost"))
        .expect_err("unknown name should fail");
    match err {
        MatcherError::MatcherNotFound { .. } => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn resolve_when_relative_then_current_route_is_the_anchor() {
    let router = router();
    block_on(router.push("/users/1?tab=posts")).expect("navigation should succeed");

    let sibling = router.resolve("2").expect("relative url should resolve");
    assert_eq!(sibling.path, "/users/2");

    let location = router
        .resolve(RouteLocationRaw::relative().param("id", "3"))
        .expect("relative params should resolve");
    assert_eq!(location.path, "/users/3");
    assert_eq!(location.name, Some(RouteName::from("user")));
    assert!(location.query.is_empty());
}

#[test]
fn routes_when_removed_through_handle_then_gone() {
    let router = router();
    let remove = router
        .add_route(RouteRecordRaw::new("/temp").name("temp"))
        .expect("route should register");
    assert!(router.has_route("temp"));

    remove();
    assert!(!router.has_route("temp"));
    assert!(router.resolve("/temp").expect("resolve").matched.is_empty());
}

#[test]
fn routes_when_removed_by_name_then_reported() {
    let router = router();
    assert!(router.remove_route("user"));
    assert!(!router.remove_route("user"));
    assert_eq!(router.get_routes().len(), 1);
}

#[test]
fn child_route_when_added_by_parent_name_then_nested() {
    let router = router();
    router
        .add_child_route(
            "user",
            RouteRecordRaw::new("settings")
                .name("user.settings")
                .component(Page("settings")),
        )
        .expect("child should register");

    let location = router
        .resolve("/users/9/settings")
        .expect("nested url should resolve");
    assert_eq!(location.matched.len(), 2);
    assert_eq!(location.matched[0].path(), "/users/:id");
    assert_eq!(location.name, Some(RouteName::from("user.settings")));

    match router.add_child_route("ghost", RouteRecordRaw::new("x")) {
        Err(MatcherError::ParentNotFound { name }) => assert_eq!(name, "ghost"),
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("unknown parent should fail"),
    }
}

#[test]
fn symbol_names_when_equal_descriptions_then_still_distinct() {
    let router = router();
    let first = RouteName::symbol("dashboard");
    let second = RouteName::symbol("dashboard");
    router
        .add_route(RouteRecordRaw::new("/one").name(first.clone()))
        .expect("route should register");
    router
        .add_route(RouteRecordRaw::new("/two").name(second.clone()))
        .expect("route should register");

    let one = router.resolve(RouteLocationRaw::named(&first)).expect("resolve");
    let two = router.resolve(RouteLocationRaw::named(&second)).expect("resolve");
    assert_eq!(one.path, "/one");
    assert_eq!(two.path, "/two");
}

#[test]
fn clear_routes_then_nothing_matches() {
    let router = router();
    router.clear_routes();
    assert!(router.get_routes().is_empty());
    assert!(!router.has_route("home"));
}
