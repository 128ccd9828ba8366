//! Patient-protocol-fit computation: a normalized deficiency engine, a
//! loading-based protocol mapper, and the merge that joins fit scores with
//! their per-subscale contribution breakdowns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cdss_core::models::{PatientId, PpfRecord, PpfTable, ProtocolId};
use cdss_data::records::SubscaleScore;
use cdss_data::reference::ProtocolAttributeTable;

use crate::error::EngineError;
use crate::{DeficitEngine, ProtocolMapper};

/// A patient's deficiency on one clinical subscale, in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscaleDeficit {
    pub subscale: String,
    pub deficiency: f64,
}

/// Protocol-to-clinical feature mapping: per-protocol weights aligned by
/// index with `subscales`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolClinicalMap {
    pub subscales: Vec<String>,
    pub protocols: Vec<(ProtocolId, Vec<f64>)>,
}

/// Baseline deficiency: distance from the subscale maximum, normalized to
/// the scale.
pub struct NormalizedDeficit;

#[async_trait]
impl DeficitEngine for NormalizedDeficit {
    async fn deficiency(&self, scores: &[SubscaleScore]) -> Result<Vec<SubscaleDeficit>, EngineError> {
        scores
            .iter()
            .map(|s| {
                if s.max_value <= 0.0 {
                    return Err(EngineError::InvalidScale {
                        subscale: s.subscale.clone(),
                        max_value: s.max_value,
                    });
                }
                Ok(SubscaleDeficit {
                    subscale: s.subscale.clone(),
                    deficiency: ((s.max_value - s.value) / s.max_value).clamp(0.0, 1.0),
                })
            })
            .collect()
    }
}

/// Baseline mapper: L1-normalizes each protocol's loadings so its weights
/// over the subscales sum to one.
pub struct LoadingsMapper;

#[async_trait]
impl ProtocolMapper for LoadingsMapper {
    async fn map(&self, attributes: &ProtocolAttributeTable) -> Result<ProtocolClinicalMap, EngineError> {
        let protocols = attributes
            .protocols
            .iter()
            .map(|p| {
                let total: f64 = p.loadings.iter().copied().filter(|l| *l > 0.0).sum();
                let weights = p
                    .loadings
                    .iter()
                    .map(|&l| if total > 0.0 && l > 0.0 { l / total } else { 0.0 })
                    .collect();
                (p.protocol_id, weights)
            })
            .collect();

        Ok(ProtocolClinicalMap {
            subscales: attributes.subscales.clone(),
            protocols,
        })
    }
}

/// Join one patient's deficiencies with the protocol mapping into the PPF
/// record set: `contribution[s] = deficiency[s] * weight[p][s]`, and the fit
/// score is the sum of contributions. Subscales the patient has no score
/// for contribute zero.
pub fn merge_ppf(
    patient: PatientId,
    deficits: &[SubscaleDeficit],
    map: &ProtocolClinicalMap,
) -> PpfTable {
    let deficiency_of = |name: &str| -> f64 {
        deficits
            .iter()
            .find(|d| d.subscale == name)
            .map(|d| d.deficiency)
            .unwrap_or(0.0)
    };

    let rows = map
        .protocols
        .iter()
        .map(|(protocol_id, weights)| {
            let contributions: Vec<f64> = map
                .subscales
                .iter()
                .zip(weights)
                .map(|(subscale, weight)| weight * deficiency_of(subscale))
                .collect();
            PpfRecord {
                patient_id: patient,
                protocol_id: *protocol_id,
                ppf: contributions.iter().sum(),
                contributions,
            }
        })
        .collect();

    PpfTable {
        subscale_columns: map.subscales.clone(),
        rows,
    }
}
