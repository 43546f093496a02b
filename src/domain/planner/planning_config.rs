use crate::api::config_dto::{PlanningConfigDto, RoutingConfigDto, SpectrumConfigDto};
use crate::domain::spectrum::bitmap::Bitmap;
use crate::domain::spectrum::grid::{GRID, is_fixed_grid};
use crate::error::{Error, Result};

/// Validated planning parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanningConfig {
    pub spectrum: SpectrumConfig,
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumConfig {
    pub f_min: f64,
    pub f_max: f64,
    pub grid: f64,
    pub guardband: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutingConfig {
    pub k_paths: usize,
    pub max_explored_paths: usize,
}

impl SpectrumConfig {
    /// Empty bitmap covering the configured band. Every OMS starts from a copy of it.
    pub fn empty_bitmap(&self) -> Result<Bitmap> {
        Bitmap::new(self.f_min, self.f_max, self.grid, self.guardband)
    }
}

impl Default for PlanningConfig {
    fn default() -> Self {
        let spectrum = SpectrumConfigDto::default();
        let routing = RoutingConfigDto::default();

        Self {
            spectrum: SpectrumConfig { f_min: spectrum.f_min, f_max: spectrum.f_max, grid: spectrum.grid, guardband: spectrum.guardband },
            routing: RoutingConfig { k_paths: routing.k_paths, max_explored_paths: routing.max_explored_paths },
        }
    }
}

impl PlanningConfig {
    pub fn from_dto(dto: PlanningConfigDto) -> Result<Self> {
        Ok(Self { spectrum: SpectrumConfig::from_dto(dto.spectrum)?, routing: RoutingConfig::from_dto(dto.routing)? })
    }
}

impl SpectrumConfig {
    fn from_dto(dto: SpectrumConfigDto) -> Result<Self> {
        // n-values, slot widths and reported frequencies all assume the 6.25 GHz grid
        if !is_fixed_grid(dto.grid) {
            return Err(Error::InvalidConfiguration(format!("grid must be {} Hz, got {}", GRID, dto.grid)));
        }

        if !(dto.guardband.is_finite() && dto.guardband >= 0.0) {
            return Err(Error::InvalidConfiguration(format!("guardband must not be negative, got {}", dto.guardband)));
        }

        if !(dto.f_min.is_finite() && dto.f_max.is_finite()) || dto.f_max <= dto.f_min {
            return Err(Error::InvalidConfiguration(format!("fMax ({}) must be above fMin ({})", dto.f_max, dto.f_min)));
        }

        Ok(Self { f_min: dto.f_min, f_max: dto.f_max, grid: dto.grid, guardband: dto.guardband })
    }
}

impl RoutingConfig {
    fn from_dto(dto: RoutingConfigDto) -> Result<Self> {
        if dto.k_paths == 0 {
            return Err(Error::InvalidConfiguration("kPaths must be at least 1".to_string()));
        }

        if dto.max_explored_paths == 0 {
            return Err(Error::InvalidConfiguration("maxExploredPaths must be at least 1".to_string()));
        }

        Ok(Self { k_paths: dto.k_paths, max_explored_paths: dto.max_explored_paths })
    }
}
