use serde::{Deserialize, Serialize};

/// Planning parameters as read from JSON. Every field has a default so an empty
/// object `{}` is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanningConfigDto {
    pub spectrum: SpectrumConfigDto,
    pub routing: RoutingConfigDto,
}

/// Usable optical band shared by every OMS at the start of a run.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpectrumConfigDto {
    /// Lower edge of the usable band in Hz.
    pub f_min: f64,
    /// Upper edge of the usable band in Hz.
    pub f_max: f64,
    /// Grid step in Hz.
    pub grid: f64,
    /// Width of the reserved margin on each side of the band in Hz.
    pub guardband: f64,
}

impl Default for SpectrumConfigDto {
    fn default() -> Self {
        Self { f_min: 191.3e12, f_max: 196.1e12, grid: 6.25e9, guardband: 0.15e12 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfigDto {
    /// Number of candidate paths computed per request.
    pub k_paths: usize,
    /// Upper bound on the partial paths explored by one candidate search.
    pub max_explored_paths: usize,
}

impl Default for RoutingConfigDto {
    fn default() -> Self {
        Self { k_paths: 10, max_explored_paths: 100_000 }
    }
}
