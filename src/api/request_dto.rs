use serde::{Deserialize, Serialize};

/// Batch input of a planning run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningInputDto {
    #[serde(default)]
    pub path_requests: Vec<PathRequestDto>,
    #[serde(default)]
    pub disjunctions: Vec<DisjunctionDto>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathRequestDto {
    pub request_id: String,
    pub source: String,
    pub destination: String,

    /// Elements the path must traverse, in this order.
    #[serde(default)]
    pub include: Vec<String>,

    /// Elements the path must avoid.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Channel spacing in Hz.
    #[serde(default)]
    pub spacing: Option<f64>,

    #[serde(default)]
    pub nb_channel: Option<u32>,

    /// Center n-value requested by the operator.
    #[serde(default)]
    pub requested_n: Option<i64>,

    /// Half-width requested by the operator, in grid cells.
    #[serde(default)]
    pub requested_m: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisjunctionDto {
    pub disjunction_id: String,

    /// `link` or `node`.
    #[serde(default = "default_disjunction_type")]
    pub disjunction_type: String,

    /// Accepted for compatibility. Groups are never relaxed.
    #[serde(default)]
    pub relaxable: bool,

    pub request_ids: Vec<String>,
}

fn default_disjunction_type() -> String {
    "link".to_string()
}
