//! End-to-end checks of the HTTP surface over a scratch data directory.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::{Json, Router};
use ruleboard::{create_router, AppState};
use ruleboard_core::{defaults, FlatFileStore};
use ruleboard_relay::{OllamaClient, Relay};
use serde_json::{json, Value};
use tempfile::TempDir;

struct TestApp {
    base: String,
    http: reqwest::Client,
    dir: TempDir,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }
}

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_app_with(ollama_base: &str, static_dir: Option<std::path::PathBuf>) -> TestApp {
    let dir = TempDir::new().unwrap();
    let store = FlatFileStore::new(dir.path().join("data"));
    let relay = Relay::new(
        OllamaClient::new(ollama_base, "qwen3-vl:8b"),
        store.clone(),
        dir.path().join("Cargo.toml"),
    );
    let state = Arc::new(AppState { store, relay, static_dir });
    let base = serve(create_router(state)).await;
    TestApp { base, http: reqwest::Client::new(), dir }
}

async fn spawn_app() -> TestApp {
    // nothing listens on port 9 of the loopback in test environments
    spawn_app_with("http://127.0.0.1:9", None).await
}

fn graph_ab() -> Value {
    json!({
        "nodes": [
            {"id": "A", "type": "custom", "position": {"x": 0.0, "y": 0.0},
             "data": {"label": "A", "isEditMode": true}},
            {"id": "B", "type": "customGroup", "position": {"x": 200.0, "y": 0.0},
             "data": {"label": "B", "isEditMode": true}}
        ],
        "edges": [{"id": "e1", "source": "A", "target": "B"}]
    })
}

#[tokio::test]
async fn health_is_ok() {
    let app = spawn_app().await;
    let resp = app.http.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn absent_root_is_not_found_but_absent_subview_is_empty() {
    let app = spawn_app().await;

    let root = app.http.get(app.url("/api/architecture")).send().await.unwrap();
    assert_eq!(root.status(), 404);
    assert_eq!(root.json::<Value>().await.unwrap(), json!({"nodes": [], "edges": []}));

    let sub = app
        .http
        .get(app.url("/api/architecture?viewId=svc-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(sub.status(), 200);
    assert_eq!(sub.json::<Value>().await.unwrap(), json!({"nodes": [], "edges": []}));
}

#[tokio::test]
async fn saved_graph_reads_back_without_transient_fields() {
    let app = spawn_app().await;
    let resp = app
        .http
        .post(app.url("/api/architecture?viewId=root"))
        .json(&graph_ab())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.json::<Value>().await.unwrap(), json!({"success": true}));

    let got: Value = app
        .http
        .get(app.url("/api/architecture"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["nodes"].as_array().unwrap().len(), 2);
    assert_eq!(got["nodes"][1]["type"], "customGroup");
    assert_eq!(got["edges"][0]["source"], "A");
    assert_eq!(got["edges"][0]["target"], "B");
    assert!(!got.to_string().contains("isEditMode"));
}

#[tokio::test]
async fn view_ids_are_sanitized_into_file_names() {
    let app = spawn_app().await;
    let resp = app
        .http
        .put(app.url("/api/architecture?viewId=..%2F..%2Fsvc-1"))
        .json(&graph_ab())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(app.dir.path().join("data/architecture_svc-1.json").exists());

    let same: Value = app
        .http
        .get(app.url("/api/architecture?viewId=svc-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(same["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn view_id_of_only_separators_never_overwrites_root() {
    let app = spawn_app().await;
    let resp = app
        .http
        .put(app.url("/api/architecture"))
        .json(&graph_ab())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .http
        .put(app.url("/api/architecture?viewId=%2F%2F%2F"))
        .json(&json!({"nodes": [], "edges": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(app.dir.path().join("data/architecture_.json").exists());

    let root: Value = app
        .http
        .get(app.url("/api/architecture?viewId="))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(root["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_saves_of_one_view_all_succeed() {
    let app = spawn_app().await;
    let saves = (0..8).map(|_| {
        app.http
            .post(app.url("/api/architecture?viewId=svc-1"))
            .json(&graph_ab())
            .send()
    });
    for resp in futures_util::future::join_all(saves).await {
        assert_eq!(resp.unwrap().status(), 200);
    }

    let got: Value = app
        .http
        .get(app.url("/api/architecture?viewId=svc-1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(got["nodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn malformed_document_is_a_read_failure() {
    let app = spawn_app().await;
    let data = app.dir.path().join("data");
    std::fs::create_dir_all(&data).unwrap();
    std::fs::write(data.join("architecture.json"), "{ nope").unwrap();

    let resp = app.http.get(app.url("/api/architecture")).send().await.unwrap();
    assert_eq!(resp.status(), 500);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"error": "Failed to read data"})
    );
}

#[tokio::test]
async fn rules_are_seeded_and_filtered() {
    let app = spawn_app().await;
    let all: Vec<Value> = app
        .http
        .get(app.url("/api/rules"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.len(), defaults::rules().len());

    let credit_hard: Vec<Value> = app
        .http
        .get(app.url("/api/rules"))
        .query(&[("section", "Credit"), ("type", "Hard Logic")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(!credit_hard.is_empty());
    assert!(credit_hard
        .iter()
        .all(|r| r["section"] == "Credit" && r["type"] == "Hard Logic"));

    let everything: Vec<Value> = app
        .http
        .get(app.url("/api/rules"))
        .query(&[("section", "All"), ("type", "All")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(everything.len(), all.len());
}

#[tokio::test]
async fn stats_match_the_catalog() {
    let app = spawn_app().await;
    let stats: Value = app
        .http
        .get(app.url("/api/rules/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rules = defaults::rules();
    assert_eq!(stats["total"], rules.len());
    assert_eq!(stats["sections"].as_array().unwrap().len(), 4);
    let by_section: u64 = stats["sections"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["total"].as_u64().unwrap())
        .sum();
    assert_eq!(by_section as usize, rules.len());
}

#[tokio::test]
async fn single_rule_update_and_unknown_id() {
    let app = spawn_app().await;
    let mut rule = serde_json::to_value(&defaults::rules()[0]).unwrap();
    rule["risk"] = json!("Low");

    let resp = app
        .http
        .put(app.url("/api/rules/GE-001"))
        .json(&rule)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let all: Vec<Value> = app
        .http
        .get(app.url("/api/rules"))
        .query(&[("search", "ge-001")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all[0]["risk"], "Low");

    let missing = app
        .http
        .put(app.url("/api/rules/XX-404"))
        .json(&rule)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn timeline_round_trips() {
    let app = spawn_app().await;
    let mut phases: Vec<Value> = app
        .http
        .get(app.url("/api/timeline"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(phases.len(), defaults::timeline().len());

    phases.swap(0, 1);
    phases[0]["status"] = json!("completed");
    let resp = app
        .http
        .post(app.url("/api/timeline"))
        .json(&phases)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let back: Vec<Value> = app
        .http
        .get(app.url("/api/timeline"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(back[0]["id"], "phase-2");
    assert_eq!(back[0]["status"], "completed");
}

#[tokio::test]
async fn timeline_stats_count_phases_by_status() {
    let app = spawn_app().await;
    let stats: Value = app
        .http
        .get(app.url("/api/timeline/stats"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let total = defaults::timeline().len() as u64;
    assert_eq!(stats["inProgress"], 1);
    let sum = ["planned", "inProgress", "completed"]
        .iter()
        .map(|k| stats[*k].as_u64().unwrap())
        .sum::<u64>();
    assert_eq!(sum, total);
}

#[tokio::test]
async fn timeline_move_persists_and_rejects_bad_indices() {
    let app = spawn_app().await;
    let moved: Vec<Value> = app
        .http
        .post(app.url("/api/timeline/move"))
        .json(&json!({"from": 0, "to": 2}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(moved[2]["id"], "phase-1");

    let back: Vec<Value> = app
        .http
        .get(app.url("/api/timeline"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(back, moved);

    let resp = app
        .http
        .post(app.url("/api/timeline/move"))
        .json(&json!({"from": 0, "to": 99}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"error": "Invalid phase move"})
    );
}

#[tokio::test]
async fn chat_without_ollama_is_service_unavailable() {
    let app = spawn_app().await;
    let body = json!({
        "messages": [{"role": "user", "content": "hi"}],
        "context": defaults::rules()[0],
    });
    let resp = app.http.post(app.url("/api/chat")).json(&body).send().await.unwrap();
    assert_eq!(resp.status(), 503);
    assert_eq!(
        resp.json::<Value>().await.unwrap(),
        json!({"error": "Ollama service not available. Make sure Ollama is running locally."})
    );

    let status = app.http.get(app.url("/api/ollama-status")).send().await.unwrap();
    assert_eq!(status.status(), 503);
    let status: Value = status.json().await.unwrap();
    assert_eq!(status["status"], "error");
    assert_eq!(status["message"], "Connection failed");
}

#[tokio::test]
async fn chat_streams_upstream_body_unmodified() {
    const REPLY: &str = "{\"message\":{\"content\":\"Hi\"},\"done\":false}\n{\"done\":true}\n";
    let ollama = serve(
        Router::new()
            .route("/", get(|| async { "Ollama is running" }))
            .route(
                "/api/tags",
                get(|| async { Json(json!({"models": [{"name": "mistral:7b"}]})) }),
            )
            .route("/api/chat", post(|| async { REPLY })),
    )
    .await;
    let app = spawn_app_with(&ollama, None).await;

    let body = json!({
        "messages": [{"role": "user", "content": "hi"}],
        "context": defaults::rules()[1],
        "model": "mistral",
    });
    let resp = app.http.post(app.url("/api/chat")).json(&body).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-type"], "text/event-stream");
    assert_eq!(resp.text().await.unwrap(), REPLY);

    let status: Value = app
        .http
        .get(app.url("/api/ollama-status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status, json!({"status": "ok", "model": "mistral:7b"}));
}

#[tokio::test]
async fn static_assets_are_served_as_fallback() {
    let assets = TempDir::new().unwrap();
    std::fs::write(assets.path().join("index.html"), "<h1>ruleboard</h1>").unwrap();
    let app = spawn_app_with("http://127.0.0.1:9", Some(assets.path().to_path_buf())).await;

    let page = app.http.get(app.url("/index.html")).send().await.unwrap();
    assert_eq!(page.status(), 200);
    assert_eq!(page.text().await.unwrap(), "<h1>ruleboard</h1>");

    let health = app.http.get(app.url("/health")).send().await.unwrap();
    assert_eq!(health.text().await.unwrap(), "OK");
}
