use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use crate::data::{ResultSet, Status};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Flat record of one prediction, the shape a web session stores.
///
/// Confidences are averages expressed as percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSummary {
    pub id: String,
    pub timestamp: String,
    pub status: String,
    pub healthy_count: usize,
    pub infected_leaf_count: usize,
    pub disease_part_count: usize,
    pub healthy_confidence: f32,
    pub infected_leaf_confidence: f32,
    pub disease_part_confidence: f32,
}

impl PredictionSummary {
    pub fn new(id: &str, results: &ResultSet, status: Status, at: DateTime<Local>) -> Self {
        Self {
            id: id.to_string(),
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            status: status.label().to_string(),
            healthy_count: results.healthy.count,
            infected_leaf_count: results.infected_leaf.count,
            disease_part_count: results.disease_part.count,
            healthy_confidence: results.healthy.avg_confidence_percent(),
            infected_leaf_confidence: results.infected_leaf.avg_confidence_percent(),
            disease_part_confidence: results.disease_part.avg_confidence_percent(),
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
