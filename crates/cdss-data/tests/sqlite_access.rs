//! Integration tests for the SQLite data-access implementation, run against
//! a throwaway database seeded through a raw connection.

use jiff::Timestamp;
use rusqlite::{Connection, params};
use uuid::Uuid;

use cdss_core::models::{MetricKey, MetricRow, PrescriptionRow, RgsMode};
use cdss_data::DataAccess;
use cdss_data::schema::SCHEMA;
use cdss_data::sqlite::SqliteDataAccess;

struct Fixture {
    _dir: tempfile::TempDir,
    access: SqliteDataAccess,
    db_path: std::path::PathBuf,
}

fn fixture(seed: impl FnOnce(&Connection)) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("rgs.sqlite");

    let conn = Connection::open(&db_path).expect("open seed connection");
    conn.execute_batch(SCHEMA).expect("apply schema");
    seed(&conn);
    drop(conn);

    let access = SqliteDataAccess::open(
        &db_path,
        dir.path().join("protocol_attributes.json"),
        dir.path().join("protocol_similarity.json"),
    )
    .expect("open data access");

    Fixture {
        _dir: dir,
        access,
        db_path,
    }
}

#[tokio::test]
async fn ping_succeeds_on_open_database() {
    let f = fixture(|_| {});
    f.access.ping().await.expect("ping");
}

#[tokio::test]
async fn patients_are_deduplicated_in_first_seen_order() {
    let f = fixture(|conn| {
        for (study, patient) in [(12, 101), (12, 102), (12, 101), (13, 102), (13, 103)] {
            conn.execute(
                "INSERT INTO study_patients (study_id, patient_id) VALUES (?, ?)",
                params![study, patient],
            )
            .expect("seed study_patients");
        }
    });

    let patients = f
        .access
        .fetch_patients_by_study(&[12, 13])
        .await
        .expect("fetch patients");
    assert_eq!(patients, vec![101, 102, 103]);
}

#[tokio::test]
async fn unknown_study_resolves_to_no_patients() {
    let f = fixture(|_| {});
    let patients = f
        .access
        .fetch_patients_by_study(&[99])
        .await
        .expect("fetch patients");
    assert!(patients.is_empty());
}

#[tokio::test]
async fn session_data_is_filtered_by_mode_and_patient() {
    let f = fixture(|conn| {
        for (patient, protocol, mode, index, adherence) in [
            (101, 9, "plus", 0, 0.9),
            (101, 9, "plus", 1, 0.7),
            (101, 9, "app", 0, 0.1),
            (999, 9, "plus", 0, 0.5),
        ] {
            conn.execute(
                "INSERT INTO sessions (patient_id, protocol_id, mode, session_index, adherence) \
                 VALUES (?, ?, ?, ?, ?)",
                params![patient, protocol, mode, index, adherence],
            )
            .expect("seed sessions");
        }
    });

    let sessions = f
        .access
        .load_session_data(&[101], RgsMode::Plus)
        .await
        .expect("load sessions");
    assert_eq!(sessions.len(), 2);
    assert!(sessions.iter().all(|s| s.patient_id == 101));
    assert_eq!(sessions[0].session_index, 0);
    assert_eq!(sessions[1].session_index, 1);
}

#[tokio::test]
async fn clinical_scores_are_empty_for_unknown_patient() {
    let f = fixture(|conn| {
        conn.execute(
            "INSERT INTO clinical_scores (patient_id, subscale, value, max_value) \
             VALUES (?, ?, ?, ?)",
            params![101, "motor_arm", 3.0, 5.0],
        )
        .expect("seed clinical_scores");
    });

    assert!(f.access.load_clinical_scores(7).await.expect("load").is_empty());
    assert_eq!(f.access.load_clinical_scores(101).await.expect("load").len(), 1);
}

#[tokio::test]
async fn written_rows_round_trip_through_the_staging_tables() {
    let f = fixture(|_| {});
    let recommendation_id = Uuid::new_v4();
    let created_at = Timestamp::UNIX_EPOCH;

    let prescriptions = vec![
        PrescriptionRow {
            patient_id: 101,
            protocol_id: 9,
            weekday: 0,
            recommendation_id,
            study_ids: vec![12],
            created_at,
        },
        PrescriptionRow {
            patient_id: 101,
            protocol_id: 9,
            weekday: 3,
            recommendation_id,
            study_ids: vec![12],
            created_at,
        },
    ];
    let metrics = vec![MetricRow {
        patient_id: 101,
        protocol_id: 9,
        key: MetricKey::Ppf,
        value: 0.8,
        recommendation_id,
        study_ids: vec![12],
        created_at,
    }];

    f.access
        .write_prescriptions(&prescriptions)
        .await
        .expect("write prescriptions");
    f.access.write_metrics(&metrics).await.expect("write metrics");

    let conn = Connection::open(&f.db_path).expect("reopen");
    let n_presc: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM prescription_staging WHERE recommendation_id = ?",
            params![recommendation_id.to_string()],
            |row| row.get(0),
        )
        .expect("count prescriptions");
    let (key, value): (String, f64) = conn
        .query_row(
            "SELECT key, value FROM recsys_metrics WHERE recommendation_id = ?",
            params![recommendation_id.to_string()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .expect("read metric");

    assert_eq!(n_presc, 2);
    assert_eq!(key, "PPF");
    assert_eq!(value, 0.8);
}

#[tokio::test]
async fn missing_reference_files_are_reported_as_missing() {
    let f = fixture(|_| {});
    let err = f.access.load_protocol_attributes().await.unwrap_err();
    assert!(matches!(err, cdss_data::error::DataError::ReferenceMissing { .. }));
    let err = f.access.load_protocol_similarity().await.unwrap_err();
    assert!(matches!(err, cdss_data::error::DataError::ReferenceMissing { .. }));
}
