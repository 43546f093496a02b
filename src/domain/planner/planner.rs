use std::collections::{BTreeMap, BTreeSet, HashSet};
use tokio_util::sync::CancellationToken;

use crate::api::config_dto::PlanningConfigDto;
use crate::api::request_dto::PlanningInputDto;
use crate::api::topology_dto::TopologyDto;
use crate::domain::assignment::orchestrator::{SlotDemand, SpectrumOrchestrator, path_oms_ids};
use crate::domain::oms::oms::Oms;
use crate::domain::oms::partitioner::{OmsLinkIndex, align_grids, build_oms_list, oms_link_index};
use crate::domain::planner::planning_config::PlanningConfig;
use crate::domain::report::path_result::{OmsUtilization, PathResult, PlanningReport};
use crate::domain::routing::disjunction::{CandidateMap, correct_disjunctions, resolve};
use crate::domain::routing::request::{DisjunctionGroup, PathRequest};
use crate::domain::routing::reverse::find_reversed_path;
use crate::domain::routing::router::PathRouter;
use crate::domain::spectrum::bitmap::Bitmap;
use crate::domain::topology::graph::TopologyGraph;
use crate::domain::utils::id::RequestId;
use crate::error::{BlockingReason, Result};

pub const DUPLICATE_REQUEST_REASON: &str = "duplicate request id";

/// Batch driver of a planning run.
///
/// Owns the topology and the OMS list. The OMS bitmaps keep their occupancy across
/// calls to [`Planner::plan`], so several batches can be planned on the same network.
#[derive(Debug)]
pub struct Planner {
    topology: TopologyGraph,

    config: PlanningConfig,

    oms_list: Vec<Oms>,

    oms_index: OmsLinkIndex,

    /// Empty bitmap of the configured band.
    band: Bitmap,
}

impl Planner {
    /// Partitions `topology` into OMSes and aligns their grids.
    ///
    /// # Returns
    /// `TopologyError` if the partition fails; the topology is then unusable.
    pub fn new(mut topology: TopologyGraph, config: PlanningConfig) -> Result<Self> {
        let mut oms_list = build_oms_list(&mut topology, &config.spectrum)?;
        align_grids(&mut oms_list)?;

        let oms_index = oms_link_index(&oms_list);
        let band = config.spectrum.empty_bitmap()?;

        log::info!("Planner ready: {} elements, {} OMS.", topology.element_count(), oms_list.len());

        Ok(Self { topology, config, oms_list, oms_index, band })
    }

    pub fn from_dto(topology: &TopologyDto, config: PlanningConfigDto) -> Result<Self> {
        let topology = TopologyGraph::from_dto(topology)?;
        let config = PlanningConfig::from_dto(config)?;

        Planner::new(topology, config)
    }

    pub fn topology(&self) -> &TopologyGraph {
        &self.topology
    }

    pub fn config(&self) -> &PlanningConfig {
        &self.config
    }

    pub fn oms_list(&self) -> &[Oms] {
        &self.oms_list
    }

    /// Converts the input records and plans them. An unknown disjunction type is fatal.
    pub fn plan_dto(&mut self, input: PlanningInputDto, cancel: &CancellationToken) -> Result<PlanningReport> {
        let requests: Vec<PathRequest> = input.path_requests.iter().map(PathRequest::from_dto).collect();
        let groups = input.disjunctions.iter().map(DisjunctionGroup::from_dto).collect::<Result<Vec<DisjunctionGroup>>>()?;

        self.plan(requests, groups, cancel)
    }

    /// Plans a batch of requests.
    ///
    /// ### Algorithm Logic
    /// 1. **Deduplication**: a request id seen before blocks the later request.
    /// 2. **Routing**: candidate paths per request, in ascending request id.
    /// 3. **Disjunctions**: groups are corrected, then one path is selected per request.
    /// 4. **Reverse paths and spectrum**: in ascending request id, the reverse path is looked
    ///    up and one slot is assigned on every OMS of both directions.
    ///
    /// The token is checked before each request in steps 2 and 4. Once it is cancelled, every
    /// request without a result yet is reported as `Cancelled`.
    ///
    /// # Returns
    /// One result per input request, in input order. Only fatal errors abort the batch.
    pub fn plan(&mut self, requests: Vec<PathRequest>, groups: Vec<DisjunctionGroup>, cancel: &CancellationToken) -> Result<PlanningReport> {
        log::info!("Planning {} requests with {} disjunctions.", requests.len(), groups.len());

        // 1. Deduplication
        let mut seen: HashSet<RequestId> = HashSet::new();
        let mut duplicates: HashSet<usize> = HashSet::new();
        let mut unique: BTreeMap<RequestId, &PathRequest> = BTreeMap::new();

        for (index, request) in requests.iter().enumerate() {
            if seen.insert(request.request_id.clone()) {
                unique.insert(request.request_id.clone(), request);
            } else {
                log::warn!("Request id {} appears more than once; later occurrence blocked.", request.request_id);
                duplicates.insert(index);
            }
        }

        // 2. Routing
        let router = PathRouter::new(&self.topology, &self.config.routing);
        let mut candidates = CandidateMap::new();

        for (request_id, request) in &unique {
            if cancel.is_cancelled() {
                log::warn!("Planning cancelled during routing.");
                break;
            }

            let span = tracing::info_span!("route", request = %request_id);
            let _enter = span.enter();

            let result = router.candidate_paths(request);
            match &result {
                Ok(paths) => tracing::debug!("{} candidate paths.", paths.len()),
                Err(reason) => tracing::info!("Routing failed: {}", reason),
            }
            candidates.insert(request_id.clone(), result);
        }

        // 3. Disjunctions
        let known: BTreeSet<RequestId> = unique.keys().cloned().collect();
        let groups = correct_disjunctions(groups, &known);
        let selection = resolve(&candidates, &groups, &self.topology);

        // 4. Reverse paths and spectrum
        let mut results: BTreeMap<RequestId, PathResult> = BTreeMap::new();
        let mut orchestrator = SpectrumOrchestrator::new(&mut self.oms_list, &self.band);

        for (request_id, request) in &unique {
            if cancel.is_cancelled() {
                break;
            }

            let Some(selected) = selection.selected.get(request_id) else {
                continue;
            };

            let span = tracing::info_span!("assign", request = %request_id);
            let _enter = span.enter();

            let blocked = |reason: BlockingReason| {
                PathResult::blocked(request_id.clone(), request.source.clone(), request.destination.clone(), reason)
            };

            let path = match selected {
                Ok(path) => path,
                Err(reason) => {
                    results.insert(request_id.clone(), blocked(reason.clone()));
                    continue;
                }
            };

            let reversed_path = match find_reversed_path(path, &self.topology) {
                Ok(reversed_path) => reversed_path,
                Err(reason) => {
                    tracing::info!("Reverse path missing: {}", reason);
                    results.insert(request_id.clone(), blocked(reason).with_paths(Some(path.clone()), None));
                    continue;
                }
            };

            let oms_ids = path_oms_ids(&[path, &reversed_path], &self.topology, &self.oms_index);
            let demand = match request.required_m() {
                Ok(required_m) => SlotDemand { required_m, requested_n: request.requested_n, requested_m: request.requested_m },
                Err(reason) => {
                    tracing::info!("Channel parameters rejected: {}", reason);
                    results.insert(request_id.clone(), blocked(reason).with_paths(Some(path.clone()), Some(reversed_path)));
                    continue;
                }
            };

            let result = match orchestrator.assign(&oms_ids, &demand)? {
                Ok(assignment) => {
                    tracing::info!("Assigned n={} m={} on {} OMS.", assignment.n, assignment.m, oms_ids.len());
                    PathResult::served(
                        request_id.clone(),
                        request.source.clone(),
                        request.destination.clone(),
                        path.clone(),
                        reversed_path,
                        assignment,
                    )
                }
                Err(reason) => {
                    tracing::info!("Spectrum assignment failed: {}", reason);
                    blocked(reason).with_paths(Some(path.clone()), Some(reversed_path))
                }
            };
            results.insert(request_id.clone(), result);
        }

        // 5. Input order
        let ordered: Vec<PathResult> = requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                if duplicates.contains(&index) {
                    return PathResult::blocked(
                        request.request_id.clone(),
                        request.source.clone(),
                        request.destination.clone(),
                        BlockingReason::NoPathFound(DUPLICATE_REQUEST_REASON.to_string()),
                    );
                }

                results.remove(&request.request_id).unwrap_or_else(|| {
                    PathResult::blocked(request.request_id.clone(), request.source.clone(), request.destination.clone(), BlockingReason::Cancelled)
                })
            })
            .collect();

        let report = PlanningReport::new(ordered, selection.groups);
        log::info!(
            "Planning run {} finished: {} served, {} blocked out of {} requests.",
            report.run_id,
            report.served_count(),
            report.blocked_count(),
            report.results.len()
        );

        Ok(report)
    }

    /// Occupancy and fragmentation of every OMS.
    pub fn oms_utilization(&self) -> Vec<OmsUtilization> {
        self.oms_list
            .iter()
            .filter_map(|oms| {
                let first = oms.el_id_list.first()?.clone();
                let last = oms.el_id_list.last()?.clone();
                let bitmap = oms.spectrum_bitmap();

                let occupied_cells = bitmap.occupied_count();
                let usable_cells = bitmap.usable_len();

                Some(OmsUtilization {
                    oms_id: oms.oms_id,
                    first,
                    last,
                    occupied_cells,
                    usable_cells,
                    utilization: if usable_cells == 0 { 0.0 } else { occupied_cells as f64 / usable_cells as f64 },
                    fragmentation: bitmap.fragmentation(),
                })
            })
            .collect()
    }
}
