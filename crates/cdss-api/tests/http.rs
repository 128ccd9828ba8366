//! End-to-end route tests over the real SQLite data access and baseline
//! engines, driven through the router with tower's `oneshot`.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use rusqlite::{Connection, params};
use tokio::sync::Mutex;
use tower::ServiceExt;

use cdss_api::config::Settings;
use cdss_api::state::AppState;
use cdss_data::schema::SCHEMA;
use cdss_data::sqlite::SqliteDataAccess;
use cdss_engines::ppf::{LoadingsMapper, NormalizedDeficit};
use cdss_engines::schedule::DiversityScheduler;
use cdss_engines::scoring::WeightedScoring;
use cdss_store::PpfStore;

struct TestApp {
    dir: tempfile::TempDir,
    app: Router,
}

fn attributes_json() -> serde_json::Value {
    serde_json::json!({
        "subscales": ["motor_arm", "cognition"],
        "protocols": [
            { "protocol_id": 9, "loadings": [1.0, 1.0] },
            { "protocol_id": 11, "loadings": [2.0, 0.0] }
        ]
    })
}

fn similarity_json() -> serde_json::Value {
    serde_json::json!({
        "protocol_ids": [9, 11],
        "matrix": [[1.0, 0.2], [0.2, 1.0]]
    })
}

fn test_app(seed: impl FnOnce(&Connection)) -> TestApp {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("rgs.sqlite");
    let attributes_path = dir.path().join("protocol_attributes.json");
    let similarity_path = dir.path().join("protocol_similarity.json");

    std::fs::write(
        &attributes_path,
        serde_json::to_vec(&attributes_json()).expect("encode"),
    )
    .expect("write attributes");
    std::fs::write(
        &similarity_path,
        serde_json::to_vec(&similarity_json()).expect("encode"),
    )
    .expect("write similarity");

    let conn = Connection::open(&db_path).expect("open seed connection");
    conn.execute_batch(SCHEMA).expect("apply schema");
    seed(&conn);
    drop(conn);

    let settings = Settings {
        database_path: db_path.clone(),
        ppf_store_path: dir.path().join("ppf.json"),
        protocol_attributes_path: attributes_path.clone(),
        protocol_similarity_path: similarity_path.clone(),
        ..Settings::default()
    };

    let data =
        SqliteDataAccess::open(&db_path, &attributes_path, &similarity_path).expect("open data");
    let state = AppState {
        data: Arc::new(data),
        scoring: Arc::new(WeightedScoring),
        scheduler: Arc::new(DiversityScheduler),
        deficit: Arc::new(NormalizedDeficit),
        mapper: Arc::new(LoadingsMapper),
        ppf_store: Arc::new(Mutex::new(PpfStore::new(dir.path().join("ppf.json")))),
        settings: Arc::new(settings),
    };

    TestApp {
        dir,
        app: cdss_api::app(state),
    }
}

fn seed_cohort(conn: &Connection) {
    for (study, patient) in [(12, 101), (12, 102)] {
        conn.execute(
            "INSERT INTO study_patients (study_id, patient_id) VALUES (?, ?)",
            params![study, patient],
        )
        .expect("seed study_patients");
    }
    for (patient, protocol, index, adherence) in [
        (101, 9, 0, 0.8),
        (101, 11, 0, 0.6),
        (102, 9, 0, 0.5),
    ] {
        conn.execute(
            "INSERT INTO sessions (patient_id, protocol_id, mode, session_index, adherence) \
             VALUES (?, ?, 'plus', ?, ?)",
            params![patient, protocol, index, adherence],
        )
        .expect("seed sessions");
    }
}

fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

#[tokio::test]
async fn liveness_stub_answers_ok() {
    let t = test_app(|_| {});
    let response = t.app.oneshot(get("/")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn health_is_ok_when_database_and_files_are_present() {
    let t = test_app(|_| {});
    let response = t.app.oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["checks"]["database"], "ok");
    assert_eq!(body["checks"]["files"]["protocol_attributes"]["exists"], true);
    assert_eq!(body["checks"]["files"]["protocol_similarity"]["exists"], true);
}

#[tokio::test]
async fn health_degrades_when_a_reference_file_disappears() {
    let t = test_app(|_| {});
    std::fs::remove_file(t.dir.path().join("protocol_similarity.json")).expect("remove");

    let response = t.app.oneshot(get("/health")).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["checks"]["files"]["protocol_similarity"]["exists"], false);
}

#[tokio::test]
async fn recommend_rejects_an_empty_study_list() {
    let t = test_app(seed_cohort);
    let response = t
        .app
        .oneshot(post_json("/recommend", serde_json::json!({"study_id": []})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn recommend_rejects_an_unknown_mode() {
    let t = test_app(seed_cohort);
    let response = t
        .app
        .oneshot(post_json(
            "/recommend/classic",
            serde_json::json!({"study_id": [12]}),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn recommend_returns_not_found_for_an_empty_cohort() {
    let t = test_app(seed_cohort);
    let response = t
        .app
        .oneshot(post_json("/recommend", serde_json::json!({"study_id": [99]})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn recommend_writes_correlated_rows_for_every_patient() {
    let t = test_app(seed_cohort);
    let response = t
        .app
        .oneshot(post_json("/recommend", serde_json::json!({"study_id": [12]})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["patients"], 2);
    let recommendation_id = body["recommendation_id"]
        .as_str()
        .expect("recommendation_id")
        .to_string();

    let conn = Connection::open(t.dir.path().join("rgs.sqlite")).expect("reopen");
    for patient in [101, 102] {
        let n: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM prescription_staging \
                 WHERE patient_id = ? AND recommendation_id = ?",
                params![patient, recommendation_id],
                |row| row.get(0),
            )
            .expect("count");
        assert!(n > 0, "patient {patient} has no prescriptions");

        let m: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM recsys_metrics \
                 WHERE patient_id = ? AND recommendation_id = ?",
                params![patient, recommendation_id],
                |row| row.get(0),
            )
            .expect("count");
        assert_eq!(m % 3, 0);
        assert!(m > 0, "patient {patient} has no metrics");
    }
}

#[tokio::test]
async fn compute_metrics_is_not_found_without_subscale_rows() {
    let t = test_app(|_| {});
    let response = t
        .app
        .oneshot(post_json("/compute_metrics/7", serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn compute_metrics_reports_the_subscales_it_used() {
    let t = test_app(|conn| {
        for (subscale, value) in [("motor_arm", 2.0), ("cognition", 4.0)] {
            conn.execute(
                "INSERT INTO clinical_scores (patient_id, subscale, value, max_value) \
                 VALUES (5, ?, ?, 5.0)",
                params![subscale, value],
            )
            .expect("seed clinical_scores");
        }
    });

    let response = t
        .app
        .oneshot(post_json("/compute_metrics/5", serde_json::json!({})))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["patient_id"], 5);
    assert_eq!(
        body["subscales_used"],
        serde_json::json!(["motor_arm", "cognition"])
    );

    let table = PpfStore::new(t.dir.path().join("ppf.json"))
        .load()
        .expect("load")
        .expect("table");
    assert_eq!(table.rows.len(), 2);
}
