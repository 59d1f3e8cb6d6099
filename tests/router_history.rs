use bunner_navigator::{
    GuardOutcome, LocationSource, MemoryHistory, NavigationGuard, ParamValue, RouteComponent,
    RouteRecordRaw, Router, RouterOptions,
};
use futures::executor::{LocalPool, block_on};
use futures::task::LocalSpawnExt;
use std::sync::Arc;

struct Page;

impl RouteComponent for Page {}

fn setup(history: Arc<MemoryHistory>) -> Router {
    let router =
        Router::new(RouterOptions::default(), history).expect("router should build");
    router
        .add_routes(
            ["/", "/a", "/b", "/c"]
                .into_iter()
                .map(|path| RouteRecordRaw::new(path).name(path).component(Page)),
        )
        .expect("routes should register");
    router
        .add_route(RouteRecordRaw::new("/legacy").redirect("/c"))
        .expect("route should register");
    router
}

fn listening_pool(router: &Router) -> LocalPool {
    let pool = LocalPool::new();
    let listener = router.clone();
    pool.spawner()
        .spawn_local(async move { listener.listen_history().await })
        .expect("listener should spawn");
    pool
}

#[test]
fn initial_navigation_when_history_has_location_then_router_adopts_it() {
    let history = Arc::new(MemoryHistory::default());
    history.replace("/a?lang=en#intro", Some(serde_json::json!({"restored": true})));
    let router = setup(history.clone());

    let route = block_on(router.initial_navigation()).expect("navigation should succeed");
    assert_eq!(route.path, "/a");
    assert_eq!(route.query.get("lang"), Some(&ParamValue::from("en")));
    assert_eq!(route.hash, "#intro");
    assert_eq!(history.len(), 1);
    assert_eq!(history.state(), Some(serde_json::json!({"restored": true})));
}

#[test]
fn history_when_going_back_then_router_follows() {
    let history = Arc::new(MemoryHistory::default());
    let router = setup(history.clone());
    let mut pool = listening_pool(&router);
    pool.run_until_stalled();

    pool.run_until(router.push("/a")).expect("navigation should succeed");
    pool.run_until(router.push("/b")).expect("navigation should succeed");
    assert_eq!(history.len(), 2);

    router.back();
    pool.run_until_stalled();
    assert_eq!(router.current_route().path, "/a");
    assert_eq!(history.location(), "/a");
    assert_eq!(history.len(), 2);

    router.forward();
    pool.run_until_stalled();
    assert_eq!(router.current_route().path, "/b");
}

#[test]
fn history_when_guard_aborts_then_position_is_restored() {
    let history = Arc::new(MemoryHistory::default());
    let router = setup(history.clone());
    let mut pool = listening_pool(&router);
    pool.run_until_stalled();

    pool.run_until(router.push("/a")).expect("navigation should succeed");
    pool.run_until(router.push("/b")).expect("navigation should succeed");
    let _remove = router.before_each(NavigationGuard::new(|to, _| to.path != "/a"));

    history.go(-1, true);
    pool.run_until_stalled();

    assert_eq!(router.current_route().path, "/b");
    assert_eq!(history.location(), "/b");
    assert_eq!(history.position(), 1);
}

#[test]
fn history_when_guard_redirects_then_entry_is_replaced() {
    let history = Arc::new(MemoryHistory::default());
    let router = setup(history.clone());
    let mut pool = listening_pool(&router);
    pool.run_until_stalled();

    pool.run_until(router.push("/a")).expect("navigation should succeed");
    pool.run_until(router.push("/b")).expect("navigation should succeed");
    let _remove = router.before_each(NavigationGuard::new(|to, _| {
        if to.path == "/a" {
            GuardOutcome::redirect("/c")
        } else {
            GuardOutcome::Continue
        }
    }));

    router.back();
    pool.run_until_stalled();

    assert_eq!(router.current_route().path, "/c");
    assert_eq!(history.location(), "/c");
    assert_eq!(history.position(), 0);
    assert_eq!(history.len(), 1);
}

#[test]
fn history_when_landing_on_redirect_record_then_target_replaces_entry() {
    let history = Arc::new(MemoryHistory::default());
    history.push("/legacy", None);
    history.push("/b", None);
    let router = setup(history.clone());
    let mut pool = listening_pool(&router);
    pool.run_until_stalled();

    pool.run_until(router.initial_navigation())
        .expect("navigation should succeed");
    router.back();
    pool.run_until_stalled();

    let current = router.current_route();
    assert_eq!(current.path, "/c");
    assert_eq!(
        current.redirected_from.as_ref().map(|from| from.path.as_str()),
        Some("/legacy")
    );
    assert_eq!(history.location(), "/c");
}

#[test]
fn history_when_destroyed_then_listener_finishes() {
    let history = Arc::new(MemoryHistory::default());
    let router = setup(history.clone());
    let mut pool = LocalPool::new();
    let listener = router.clone();
    let finished = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = Arc::clone(&finished);
    pool.spawner()
        .spawn_local(async move {
            listener.listen_history().await;
            flag.store(true, std::sync::atomic::Ordering::SeqCst);
        })
        .expect("listener should spawn");
    pool.run_until_stalled();
    assert!(!finished.load(std::sync::atomic::Ordering::SeqCst));

    history.destroy();
    pool.run_until_stalled();
    assert!(finished.load(std::sync::atomic::Ordering::SeqCst));
}
