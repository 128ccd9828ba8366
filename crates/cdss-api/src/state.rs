use std::sync::Arc;

use tokio::sync::Mutex;

use cdss_data::DataAccess;
use cdss_engines::{DeficitEngine, ProtocolMapper, ScheduleEngine, ScoringAdapter};
use cdss_store::PpfStore;

use crate::config::Settings;

/// Shared application state, injected into all route handlers via Axum
/// state. Collaborator handles are built once at startup and reused across
/// requests; the PPF store sits behind a mutex so its whole-file
/// read-modify-write cycles cannot interleave.
#[derive(Clone)]
pub struct AppState {
    pub data: Arc<dyn DataAccess>,
    pub scoring: Arc<dyn ScoringAdapter>,
    pub scheduler: Arc<dyn ScheduleEngine>,
    pub deficit: Arc<dyn DeficitEngine>,
    pub mapper: Arc<dyn ProtocolMapper>,
    pub ppf_store: Arc<Mutex<PpfStore>>,
    pub settings: Arc<Settings>,
}
