use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// RGS application family a recommendation run targets. Selects which
/// session and timeseries datasets the data-access layer reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RgsMode {
    App,
    #[default]
    Plus,
}

impl RgsMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RgsMode::App => "app",
            RgsMode::Plus => "plus",
        }
    }
}

impl FromStr for RgsMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "app" => Ok(RgsMode::App),
            "plus" => Ok(RgsMode::Plus),
            other => Err(ValidationError::UnknownMode(other.to_string())),
        }
    }
}

/// A recommendation request for one or more studies.
///
/// Optional tuning parameters left as `None` are "unset": they are resolved
/// against process-wide defaults once, at the orchestrator boundary. The
/// validator never fills them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortRequest {
    pub study_id: Vec<i64>,

    /// Relative weights of the three tracked metrics.
    #[serde(default)]
    pub weights: Option<Vec<i64>>,

    /// Recency smoothing factor in [0, 1].
    #[serde(default)]
    pub alpha: Option<f64>,

    /// Diversity: maximum number of distinct protocols per patient.
    #[serde(default)]
    pub n: Option<i64>,

    /// Schedule horizon in days.
    #[serde(default)]
    pub days: Option<i64>,

    /// Intensity: protocols prescribed per day.
    #[serde(default)]
    pub protocols_per_day: Option<i64>,
}

impl CohortRequest {
    /// Check field ranges. No defaulting and no side effects.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.study_id.is_empty() {
            return Err(ValidationError::EmptyStudyList);
        }

        if let Some(weights) = &self.weights {
            for &w in weights {
                if w <= 0 {
                    return Err(ValidationError::NonPositiveWeight(w));
                }
            }
        }

        if let Some(alpha) = self.alpha
            && !(0.0..=1.0).contains(&alpha)
        {
            return Err(ValidationError::AlphaOutOfRange(alpha));
        }

        for (field, value) in [
            ("n", self.n),
            ("days", self.days),
            ("protocols_per_day", self.protocols_per_day),
        ] {
            if let Some(v) = value
                && v <= 0
            {
                return Err(ValidationError::NonPositiveParam { field, value: v });
            }
        }

        Ok(())
    }
}
