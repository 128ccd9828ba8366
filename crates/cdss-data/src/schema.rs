//! SQLite schema for the relational system of record.
//!
//! Kept deliberately minimal: cohort membership, usage history, previously
//! computed fit values, clinical scores, and the two staging tables the
//! recommendation run writes into.

pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS study_patients (
    study_id      INTEGER NOT NULL,
    patient_id    INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    patient_id    INTEGER NOT NULL,
    protocol_id   INTEGER NOT NULL,
    mode          TEXT    NOT NULL,
    session_index INTEGER NOT NULL,
    adherence     REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS timeseries (
    patient_id    INTEGER NOT NULL,
    protocol_id   INTEGER NOT NULL,
    mode          TEXT    NOT NULL,
    session_index INTEGER NOT NULL,
    dm_value      REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS patient_ppf (
    patient_id    INTEGER NOT NULL,
    protocol_id   INTEGER NOT NULL,
    ppf           REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS clinical_scores (
    patient_id    INTEGER NOT NULL,
    subscale      TEXT    NOT NULL,
    value         REAL    NOT NULL,
    max_value     REAL    NOT NULL
);

CREATE TABLE IF NOT EXISTS prescription_staging (
    patient_id        INTEGER NOT NULL,
    protocol_id       INTEGER NOT NULL,
    weekday           INTEGER NOT NULL,
    recommendation_id TEXT    NOT NULL,
    study_ids         TEXT    NOT NULL,
    created_at        TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS recsys_metrics (
    patient_id        INTEGER NOT NULL,
    protocol_id       INTEGER NOT NULL,
    key               TEXT    NOT NULL,
    value             REAL    NOT NULL,
    recommendation_id TEXT    NOT NULL,
    study_ids         TEXT    NOT NULL,
    created_at        TEXT    NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_study_patients_study ON study_patients(study_id);
CREATE INDEX IF NOT EXISTS idx_sessions_patient ON sessions(patient_id);
CREATE INDEX IF NOT EXISTS idx_timeseries_patient ON timeseries(patient_id);
CREATE INDEX IF NOT EXISTS idx_patient_ppf_patient ON patient_ppf(patient_id);
CREATE INDEX IF NOT EXISTS idx_clinical_scores_patient ON clinical_scores(patient_id);
CREATE INDEX IF NOT EXISTS idx_prescription_recommendation ON prescription_staging(recommendation_id);
CREATE INDEX IF NOT EXISTS idx_metrics_recommendation ON recsys_metrics(recommendation_id);
"#;
