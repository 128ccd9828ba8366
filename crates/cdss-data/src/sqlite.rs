//! SQLite-backed [`DataAccess`] implementation.
//!
//! Reads the relational system of record from a local database file and the
//! two reference tables from configured JSON files. The connection sits
//! behind a mutex so one handle can serve concurrent request tasks.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{Connection, params, params_from_iter};
use tracing::debug;

use cdss_core::models::{MetricRow, PatientId, PrescriptionRow, RgsMode};

use crate::DataAccess;
use crate::error::DataError;
use crate::records::{FitRecord, SessionRecord, SubscaleScore, TimeseriesRecord};
use crate::reference::{self, ProtocolAttributeTable, SimilarityMatrix};

pub struct SqliteDataAccess {
    conn: Mutex<Connection>,
    attributes_path: PathBuf,
    similarity_path: PathBuf,
}

impl SqliteDataAccess {
    /// Open (or create) the database and apply the schema.
    pub fn open(
        db_path: &Path,
        attributes_path: impl Into<PathBuf>,
        similarity_path: impl Into<PathBuf>,
    ) -> Result<Self, DataError> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(crate::schema::SCHEMA)?;
        debug!(path = %db_path.display(), "opened system-of-record database");

        Ok(Self {
            conn: Mutex::new(conn),
            attributes_path: attributes_path.into(),
            similarity_path: similarity_path.into(),
        })
    }

    pub fn attributes_path(&self) -> &Path {
        &self.attributes_path
    }

    pub fn similarity_path(&self) -> &Path {
        &self.similarity_path
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn in_clause(len: usize) -> String {
    vec!["?"; len].join(", ")
}

fn id_values(ids: &[i64], mode: Option<RgsMode>) -> Vec<rusqlite::types::Value> {
    let mut values: Vec<rusqlite::types::Value> = ids.iter().map(|&id| id.into()).collect();
    if let Some(mode) = mode {
        values.push(mode.as_str().to_string().into());
    }
    values
}

#[async_trait]
impl DataAccess for SqliteDataAccess {
    async fn ping(&self) -> Result<(), DataError> {
        self.conn()
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    async fn fetch_patients_by_study(&self, study_ids: &[i64]) -> Result<Vec<PatientId>, DataError> {
        if study_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT patient_id FROM study_patients WHERE study_id IN ({}) ORDER BY rowid",
            in_clause(study_ids.len())
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let ids = stmt.query_map(params_from_iter(id_values(study_ids, None)), |row| {
            row.get::<_, i64>(0)
        })?;

        let mut seen = HashSet::new();
        let mut patients = Vec::new();
        for id in ids {
            let id = id?;
            if seen.insert(id) {
                patients.push(id);
            }
        }
        Ok(patients)
    }

    async fn load_session_data(
        &self,
        patients: &[PatientId],
        mode: RgsMode,
    ) -> Result<Vec<SessionRecord>, DataError> {
        if patients.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT patient_id, protocol_id, session_index, adherence FROM sessions \
             WHERE patient_id IN ({}) AND mode = ? \
             ORDER BY patient_id, protocol_id, session_index",
            in_clause(patients.len())
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(id_values(patients, Some(mode))), |row| {
            Ok(SessionRecord {
                patient_id: row.get(0)?,
                protocol_id: row.get(1)?,
                session_index: row.get(2)?,
                adherence: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    async fn load_timeseries_data(
        &self,
        patients: &[PatientId],
        mode: RgsMode,
    ) -> Result<Vec<TimeseriesRecord>, DataError> {
        if patients.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT patient_id, protocol_id, session_index, dm_value FROM timeseries \
             WHERE patient_id IN ({}) AND mode = ? \
             ORDER BY patient_id, protocol_id, session_index",
            in_clause(patients.len())
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(id_values(patients, Some(mode))), |row| {
            Ok(TimeseriesRecord {
                patient_id: row.get(0)?,
                protocol_id: row.get(1)?,
                session_index: row.get(2)?,
                dm_value: row.get(3)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    async fn load_ppf_data(&self, patients: &[PatientId]) -> Result<Vec<FitRecord>, DataError> {
        if patients.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT patient_id, protocol_id, ppf FROM patient_ppf WHERE patient_id IN ({}) \
             ORDER BY patient_id, protocol_id",
            in_clause(patients.len())
        );
        let conn = self.conn();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(id_values(patients, None)), |row| {
            Ok(FitRecord {
                patient_id: row.get(0)?,
                protocol_id: row.get(1)?,
                ppf: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    async fn load_protocol_similarity(&self) -> Result<SimilarityMatrix, DataError> {
        reference::load_similarity(&self.similarity_path)
    }

    async fn load_clinical_scores(
        &self,
        patient: PatientId,
    ) -> Result<Vec<SubscaleScore>, DataError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT subscale, value, max_value FROM clinical_scores \
             WHERE patient_id = ? ORDER BY subscale",
        )?;
        let rows = stmt.query_map(params![patient], |row| {
            Ok(SubscaleScore {
                subscale: row.get(0)?,
                value: row.get(1)?,
                max_value: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    async fn load_protocol_attributes(&self) -> Result<ProtocolAttributeTable, DataError> {
        reference::load_protocol_attributes(&self.attributes_path)
    }

    async fn write_prescriptions(&self, rows: &[PrescriptionRow]) -> Result<(), DataError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO prescription_staging \
                 (patient_id, protocol_id, weekday, recommendation_id, study_ids, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.patient_id,
                    row.protocol_id,
                    row.weekday,
                    row.recommendation_id.to_string(),
                    serde_json::to_string(&row.study_ids)?,
                    row.created_at.to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    async fn write_metrics(&self, rows: &[MetricRow]) -> Result<(), DataError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO recsys_metrics \
                 (patient_id, protocol_id, key, value, recommendation_id, study_ids, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.patient_id,
                    row.protocol_id,
                    row.key.as_str(),
                    row.value,
                    row.recommendation_id.to_string(),
                    serde_json::to_string(&row.study_ids)?,
                    row.created_at.to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
