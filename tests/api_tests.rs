use std::future::IntoFuture;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use movie_recs_api::{
    api::{create_router, AppState},
    config::ArtifactPaths,
    services::{load_recommender, Recommender},
};

fn fixture_recommender() -> Recommender {
    let paths = ArtifactPaths::in_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"));
    load_recommender(&paths).unwrap()
}

fn create_test_server() -> (TestServer, AppState) {
    let state = AppState::with_recommender(fixture_recommender());
    let server = TestServer::new(create_router(state.clone())).unwrap();
    (server, state)
}

fn movie_ids(body: &Value) -> Vec<i64> {
    body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["movieId"].as_i64().unwrap())
        .collect()
}

fn similarities(body: &Value) -> Vec<f64> {
    body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["similarity"].as_f64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["models_loaded"], true);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_banner() {
    let (server, _) = create_test_server();
    let response = server.get("/").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "running");
    assert_eq!(body["models_loaded"], true);
    assert_eq!(body["endpoints"]["recommend"], "/recommend");
    assert_eq!(body["model_info"]["total_movies"], 8);
}

#[tokio::test]
async fn test_model_info() {
    let (server, _) = create_test_server();
    let response = server.get("/model-info").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "loaded");
    assert_eq!(body["total_movies"], 8);
    assert_eq!(body["vocabulary_size"], 27);
    assert_eq!(body["model_files"].as_array().unwrap().len(), 3);
    assert!(body["total_size_bytes"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_recommend_horror_profile() {
    let (server, _) = create_test_server();

    let response = server
        .post("/recommend")
        .json(&json!({
            "genres": ["Horror"],
            "favorites": [],
            "top_n": 3
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["total_results"], 3);
    assert_eq!(movie_ids(&body), vec![1214, 1200, 2288]);
    assert!(body["processing_time_ms"].as_f64().unwrap() >= 0.0);
    assert_eq!(body["model_info"]["loaded"], true);

    let first = &body["recommendations"][0];
    assert_eq!(first["title"], "Alien (1979)");
    assert_eq!(first["genres"], "Horror|Sci-Fi");
}

#[tokio::test]
async fn test_recommend_orders_by_similarity_then_catalog() {
    let (server, _) = create_test_server();

    let response = server
        .post("/recommend")
        .json(&json!({
            "genres": ["Comedy"],
            "favorites": ["Toy Story"],
            "top_n": 8
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    let scores = similarities(&body);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    assert!(scores.iter().all(|s| (-1.0..=1.0).contains(s)));
    // the remaining zero-score movies keep catalog order
    assert_eq!(movie_ids(&body), vec![1, 3114, 2, 6, 1214, 1200, 16, 2288]);
}

#[tokio::test]
async fn test_recommend_defaults_and_clamping() {
    let (server, _) = create_test_server();

    let response = server
        .post("/recommend")
        .json(&json!({ "favorites": ["Aliens"] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_results"], 5);
    assert_eq!(movie_ids(&body)[0], 1200);

    let response = server
        .post("/recommend")
        .json(&json!({ "genres": ["Drama"], "top_n": 50 }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["total_results"], 8);
    let mut ids = movie_ids(&body);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 8);
}

#[tokio::test]
async fn test_recommend_is_deterministic() {
    let (server, _) = create_test_server();
    let request = json!({
        "genres": ["Sci-Fi", "Action"],
        "favorites": ["Heat", "The Thing"],
        "top_n": 6
    });

    let first: Value = server.post("/recommend").json(&request).await.json();
    let second: Value = server.post("/recommend").json(&request).await.json();

    assert_eq!(first["recommendations"], second["recommendations"]);
}

#[tokio::test]
async fn test_recommend_validation() {
    let (server, _) = create_test_server();

    let invalid = vec![
        json!({ "genres": [], "favorites": [] }),
        json!({ "genres": ["Horror"], "top_n": 0 }),
        json!({ "genres": ["Horror"], "top_n": 51 }),
        json!({ "genres": vec!["Drama"; 11] }),
        json!({ "favorites": vec!["Heat"; 21] }),
        json!({ "genres": ["Horror"], "top_n": -1 }),
        json!({ "genres": ["Horror"], "top_n": "5" }),
        json!({ "genres": ["Horror"], "top_n": 2.5 }),
        json!({ "genres": null, "favorites": ["Heat"] }),
    ];

    for request in invalid {
        let response = server.post("/recommend").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_not_ready_until_models_load() {
    let state = AppState::new();
    let server = TestServer::new(create_router(state.clone())).unwrap();

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["status"], "loading");
    let info: Value = server.get("/model-info").await.json();
    assert_eq!(info["status"], "not_loaded");

    let request = json!({ "genres": ["Horror"], "top_n": 2 });
    let response = server.post("/recommend").json(&request).await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.header("retry-after"), "1");

    state.install(fixture_recommender()).unwrap();

    let response = server.post("/recommend").json(&request).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(movie_ids(&body), vec![1214, 1200]);
}

#[tokio::test]
async fn test_concurrent_first_requests_compute_features_once() {
    let (server, state) = create_test_server();
    let request = json!({ "genres": ["Crime"], "top_n": 2 });

    let (a, b, c, d) = tokio::join!(
        server.post("/recommend").json(&request).into_future(),
        server.post("/recommend").json(&request).into_future(),
        server.post("/recommend").json(&request).into_future(),
        server.post("/recommend").json(&request).into_future(),
    );
    for response in [a, b, c, d] {
        response.assert_status_ok();
    }

    let recommender = state.recommender().unwrap();
    assert_eq!(recommender.feature_cache().computations(), 1);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let (server, _) = create_test_server();
    let id = "6f9619ff-8b86-d011-b42d-00cf4fc964ff";

    let response = server
        .get("/health")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(id),
        )
        .await;
    assert_eq!(response.header("x-request-id"), id);

    let response = server.get("/health").await;
    assert!(!response.header("x-request-id").is_empty());
}
