use tokio_util::sync::CancellationToken;

use crate::api::config_dto::PlanningConfigDto;
use crate::api::request_dto::PlanningInputDto;
use crate::api::topology_dto::TopologyDto;
use crate::domain::planner::planner::Planner;
use crate::domain::report::path_result::PlanningReport;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Plans the requests of `input_file` on the network of `topology_file`.
///
/// Without `config_file` the default C-band configuration is used.
pub fn plan_from_files(topology_file: &str, input_file: &str, config_file: Option<&str>) -> Result<PlanningReport> {
    logger::init();

    let topology_dto: TopologyDto = parse_json_file::<TopologyDto>(topology_file)?;
    log::info!("Topology file {} parsed successfully.", topology_file);

    let config_dto = match config_file {
        Some(path) => parse_json_file::<PlanningConfigDto>(path)?,
        None => PlanningConfigDto::default(),
    };

    let input_dto: PlanningInputDto = parse_json_file::<PlanningInputDto>(input_file)?;
    log::info!("{} path requests and {} disjunctions parsed.", input_dto.path_requests.len(), input_dto.disjunctions.len());

    let mut planner = Planner::from_dto(&topology_dto, config_dto)?;
    planner.plan_dto(input_dto, &CancellationToken::new())
}
