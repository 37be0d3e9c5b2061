use std::path::PathBuf;
use std::sync::{Arc, Once};

use anyhow::anyhow;
use kinboard::{
    cached_query, invalidate_table, query_cache_key, Dashboard, DashboardConfig, FileStore,
    KeyValueStore, LoadFuture, OverrideRecord, SqliteStore, WidgetDescriptor, WidgetLoader,
};

static INIT: Once = Once::new();

fn init() {
    INIT.call_once(kinboard::init_logging);
}

fn temp_dir(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("kinboard-it-{tag}-{}", std::process::id()))
}

fn eager(implementation: &'static str) -> WidgetLoader<&'static str> {
    WidgetLoader::Eager(Arc::new(implementation))
}

fn deferred(implementation: &'static str) -> WidgetLoader<&'static str> {
    WidgetLoader::lazy(move || -> LoadFuture<&'static str> {
        Box::pin(async move { Ok(Arc::new(implementation)) })
    })
}

fn stock_catalog() -> Vec<WidgetDescriptor<&'static str>> {
    vec![
        WidgetDescriptor::new("daily-reflection", "Daily Reflection", eager("reflection"), 100),
        WidgetDescriptor::new("daily-quiz", "Daily Quiz", eager("quiz"), 80),
        WidgetDescriptor::new("media-wall", "Media Wall", deferred("media-wall"), 70),
        WidgetDescriptor::new("scenario-prompts", "Scenario Prompts", deferred("scenarios"), 60),
        WidgetDescriptor::new("age-simulator", "Age Simulator", deferred("age-sim"), 40),
    ]
}

fn dashboard(store: Arc<dyn KeyValueStore>) -> Dashboard<&'static str> {
    Dashboard::new(stock_catalog(), Vec::new(), store, DashboardConfig::default())
}

#[test]
fn engagement_reorders_and_survives_restart_with_file_store() {
    init();
    let dir = temp_dir("file-flow");

    {
        let store = Arc::new(FileStore::new(dir.clone()).unwrap());
        let dash = dashboard(store);

        // Untouched dashboard orders by static priority
        let order: Vec<String> = dash.registry.get_sorted().iter().map(|w| w.id.clone()).collect();
        assert_eq!(order[0], "daily-reflection");
        assert_eq!(order[1], "daily-quiz");

        // Heavy use of the media wall lifts it to the top:
        // 70 + 4 views * 10 + 1 interaction * 50 = 160 > 100
        for _ in 0..4 {
            dash.registry.record_view("media-wall");
        }
        dash.registry.record_interaction("media-wall");

        assert_eq!(dash.registry.get_sorted()[0].id, "media-wall");

        // Pinning beats any score
        dash.registry.update_preference(
            "age-simulator",
            OverrideRecord {
                pinned: Some(true),
                ..Default::default()
            },
        );
        let sorted = dash.registry.get_sorted();
        assert_eq!(sorted[0].id, "age-simulator");
        assert_eq!(sorted[1].id, "media-wall");
    }

    // A fresh dashboard over the same store sees the persisted overrides
    let store = Arc::new(FileStore::new(dir.clone()).unwrap());
    let dash = dashboard(store);
    let all = dash.registry.get_all();
    let wall = all.iter().find(|w| w.id == "media-wall").unwrap();
    assert_eq!(wall.view_count, 4);
    assert_eq!(wall.interaction_count, 1);
    assert_eq!(dash.registry.get_sorted()[0].id, "age-simulator");

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn engagement_survives_restart_with_sqlite_store() {
    init();
    let dir = temp_dir("sqlite-flow");
    let db_path = dir.join("kinboard.sqlite3");

    {
        let store = Arc::new(SqliteStore::new(db_path.clone()).unwrap());
        let dash = dashboard(store);
        dash.registry.record_view("daily-quiz");
        dash.registry.record_view("daily-quiz");
        // Dropping the dashboard drains the write queue before shutdown
    }

    let store = Arc::new(SqliteStore::new(db_path).unwrap());
    let dash = dashboard(store);
    let all = dash.registry.get_all();
    let quiz = all.iter().find(|w| w.id == "daily-quiz").unwrap();
    assert_eq!(quiz.view_count, 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn classifier_partitions_the_stock_layout() {
    init();
    let dash = dashboard(Arc::new(kinboard::MemoryStore::new()));

    assert!(dash.loading.is_anchor("daily-reflection"));
    assert!(dash.loading.is_anchor("daily-quiz"));
    assert!(dash.loading.is_quiet("media-wall"));
    assert!(dash.loading.is_quiet("age-simulator"));
    assert!(!dash.loading.is_anchor("media-wall"));
    assert!(!dash.loading.is_quiet("daily-reflection"));
}

#[tokio::test]
async fn quiet_widgets_resolve_through_their_lazy_loader() {
    init();
    let dash = dashboard(Arc::new(kinboard::MemoryStore::new()));

    let all = dash.registry.get_all();
    let wall = all.iter().find(|w| w.id == "media-wall").unwrap();
    assert!(dash.loading.is_quiet(&wall.id));

    // What the UI layer does on first scroll-into-view
    let implementation = match &wall.loader {
        WidgetLoader::Lazy(load) => load().await.unwrap(),
        WidgetLoader::Eager(_) => panic!("media-wall should be deferred"),
    };
    assert_eq!(*implementation, "media-wall");
}

#[tokio::test]
async fn query_cache_serves_repeat_reads_and_invalidates_per_table() {
    init();
    let dash = dashboard(Arc::new(kinboard::MemoryStore::new()));
    let key = query_cache_key("reflections", &[("profile", "p1"), ("day", "2026-08-08")]);
    assert_eq!(key, "reflections?day:2026-08-08|profile:p1");

    let fetched = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    for _ in 0..3 {
        let fetched = fetched.clone();
        let rows = cached_query(&dash.query_cache, &key, None, move || async move {
            fetched.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(serde_json::json!([{ "id": "r1", "mood": "grateful" }]))
        })
        .await
        .unwrap();
        assert_eq!(rows[0]["id"], "r1");
    }
    assert_eq!(fetched.load(std::sync::atomic::Ordering::SeqCst), 1);

    // Writing a reflection invalidates that table's cached queries only
    dash.query_cache.set("profiles", serde_json::json!([]));
    invalidate_table(&dash.query_cache, "reflections");
    assert_eq!(dash.query_cache.get(&key), None);
    assert!(dash.query_cache.get("profiles").is_some());

    // A failed refetch is surfaced and leaves nothing cached
    let result = cached_query(&dash.query_cache, &key, None, || async {
        Err::<serde_json::Value, _>(anyhow!("store unreachable"))
    })
    .await;
    assert!(result.is_err());
    assert_eq!(dash.query_cache.get(&key), None);
}
