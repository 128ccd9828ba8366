//! Process-wide settings, read once from the environment at startup.

use std::env;
use std::path::PathBuf;

use cdss_core::models::CohortRequest;

/// Defaults match the original deployment profile: equal metric weights,
/// a 7-day horizon with 5 protocols per day, and up to 12 distinct
/// protocols per patient.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub database_path: PathBuf,
    pub ppf_store_path: PathBuf,
    pub protocol_attributes_path: PathBuf,
    pub protocol_similarity_path: PathBuf,
    pub weights: Vec<i64>,
    pub alpha: f64,
    pub n: usize,
    pub days: usize,
    pub protocols_per_day: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8000".to_string(),
            database_path: PathBuf::from("data/rgs.sqlite"),
            ppf_store_path: PathBuf::from("data/ppf.json"),
            protocol_attributes_path: PathBuf::from("data/protocol_attributes.json"),
            protocol_similarity_path: PathBuf::from("data/protocol_similarity.json"),
            weights: vec![1, 1, 1],
            alpha: 0.5,
            n: 12,
            days: 7,
            protocols_per_day: 5,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Settings::default();
        Self {
            bind: env::var("CDSS_BIND").unwrap_or(defaults.bind),
            database_path: path_var("CDSS_DB_PATH", defaults.database_path),
            ppf_store_path: path_var("CDSS_PPF_PATH", defaults.ppf_store_path),
            protocol_attributes_path: path_var(
                "CDSS_PROTOCOL_ATTRIBUTES_PATH",
                defaults.protocol_attributes_path,
            ),
            protocol_similarity_path: path_var(
                "CDSS_PROTOCOL_SIMILARITY_PATH",
                defaults.protocol_similarity_path,
            ),
            weights: match env::var("CDSS_WEIGHTS") {
                Ok(raw) => raw
                    .split(',')
                    .map(|w| w.trim().parse::<i64>().ok())
                    .collect::<Option<Vec<_>>>()
                    .unwrap_or_else(|| {
                        tracing::warn!(value = %raw, "unparsable CDSS_WEIGHTS, using default");
                        defaults.weights
                    }),
                Err(_) => defaults.weights,
            },
            alpha: parsed_var("CDSS_ALPHA", defaults.alpha),
            n: parsed_var("CDSS_N", defaults.n),
            days: parsed_var("CDSS_DAYS", defaults.days),
            protocols_per_day: parsed_var("CDSS_PROTOCOLS_PER_DAY", defaults.protocols_per_day),
        }
    }

    /// Resolve a validated request's unset tuning parameters against the
    /// process defaults. This happens exactly once per run, here — never in
    /// the validator or deeper layers. An empty weight list counts as unset.
    pub fn resolve(&self, request: &CohortRequest) -> EffectiveParams {
        EffectiveParams {
            weights: request
                .weights
                .as_ref()
                .filter(|w| !w.is_empty())
                .cloned()
                .unwrap_or_else(|| self.weights.clone()),
            alpha: request.alpha.unwrap_or(self.alpha),
            n: request.n.map(|v| v as usize).unwrap_or(self.n),
            days: request.days.map(|v| v as usize).unwrap_or(self.days),
            protocols_per_day: request
                .protocols_per_day
                .map(|v| v as usize)
                .unwrap_or(self.protocols_per_day),
        }
    }
}

/// Tuning parameters with every field resolved to a concrete value.
#[derive(Debug, Clone)]
pub struct EffectiveParams {
    pub weights: Vec<i64>,
    pub alpha: f64,
    pub n: usize,
    pub days: usize,
    pub protocols_per_day: usize,
}

fn path_var(name: &str, default: PathBuf) -> PathBuf {
    env::var(name).map(PathBuf::from).unwrap_or(default)
}

fn parsed_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(name, value = %raw, "unparsable setting override, using default");
                default
            }
        },
        Err(_) => default,
    }
}
