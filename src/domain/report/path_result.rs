use serde::Serialize;
use uuid::Uuid;

use crate::domain::assignment::orchestrator::SpectrumAssignment;
use crate::domain::routing::computed_path::ComputedPath;
use crate::domain::routing::disjunction::GroupReport;
use crate::domain::utils::id::{ElementId, OmsId, RequestId};
use crate::error::{BlockingReason, Result};

pub const STATUS_SERVED: &str = "SERVED";

/// Outcome of one path request. Exactly one of `assignment` and `blocking` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathResult {
    pub request_id: RequestId,
    pub source: ElementId,
    pub destination: ElementId,

    /// Selected forward path, kept when a later stage blocked the request.
    pub path: Option<ComputedPath>,

    pub reversed_path: Option<ComputedPath>,

    pub assignment: Option<SpectrumAssignment>,

    pub blocking: Option<BlockingReason>,
}

impl PathResult {
    pub fn served(
        request_id: RequestId,
        source: ElementId,
        destination: ElementId,
        path: ComputedPath,
        reversed_path: ComputedPath,
        assignment: SpectrumAssignment,
    ) -> Self {
        Self { request_id, source, destination, path: Some(path), reversed_path: Some(reversed_path), assignment: Some(assignment), blocking: None }
    }

    pub fn blocked(request_id: RequestId, source: ElementId, destination: ElementId, reason: BlockingReason) -> Self {
        Self { request_id, source, destination, path: None, reversed_path: None, assignment: None, blocking: Some(reason) }
    }

    /// Keeps the paths found before the request got blocked.
    pub fn with_paths(mut self, path: Option<ComputedPath>, reversed_path: Option<ComputedPath>) -> Self {
        self.path = path;
        self.reversed_path = reversed_path;
        self
    }

    pub fn is_served(&self) -> bool {
        self.assignment.is_some() && self.blocking.is_none()
    }

    /// `SERVED`, or the kind of the blocking reason.
    pub fn status(&self) -> &'static str {
        match &self.blocking {
            Some(reason) => reason.kind(),
            None => STATUS_SERVED,
        }
    }
}

/// Result of one planning run.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningReport {
    pub run_id: Uuid,

    /// One entry per input request, in input order.
    pub results: Vec<PathResult>,

    pub groups: Vec<GroupReport>,
}

impl PlanningReport {
    pub fn new(results: Vec<PathResult>, groups: Vec<GroupReport>) -> Self {
        Self { run_id: Uuid::new_v4(), results, groups }
    }

    pub fn result(&self, request_id: &RequestId) -> Option<&PathResult> {
        self.results.iter().find(|result| &result.request_id == request_id)
    }

    pub fn served_count(&self) -> usize {
        self.results.iter().filter(|result| result.is_served()).count()
    }

    pub fn blocked_count(&self) -> usize {
        self.results.len() - self.served_count()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Spectrum usage of one OMS.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OmsUtilization {
    pub oms_id: OmsId,
    pub first: ElementId,
    pub last: ElementId,
    pub occupied_cells: usize,
    pub usable_cells: usize,

    /// Occupied share of the usable band in [0, 1].
    pub utilization: f64,

    pub fragmentation: f64,
}
