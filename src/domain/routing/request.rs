use serde::Serialize;

use crate::api::request_dto::{DisjunctionDto, PathRequestDto};
use crate::domain::spectrum::grid::required_m;
use crate::domain::utils::id::{DisjunctionId, ElementId, RequestId};
use crate::error::{BlockingReason, Error, Result};

pub const DEFAULT_SPACING: f64 = 50e9;

/// A point-to-point service to route between two transceivers.
#[derive(Debug, Clone, PartialEq)]
pub struct PathRequest {
    pub request_id: RequestId,
    pub source: ElementId,
    pub destination: ElementId,

    /// Elements to traverse, in order.
    pub include: Vec<ElementId>,

    /// Elements to avoid.
    pub exclude: Vec<ElementId>,

    /// Channel spacing in Hz.
    pub spacing: f64,

    pub nb_channel: u32,

    pub requested_n: Option<i64>,

    pub requested_m: Option<i64>,
}

impl PathRequest {
    pub fn new(request_id: impl Into<String>, source: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(request_id),
            source: ElementId::new(source),
            destination: ElementId::new(destination),
            include: Vec::new(),
            exclude: Vec::new(),
            spacing: DEFAULT_SPACING,
            nb_channel: 1,
            requested_n: None,
            requested_m: None,
        }
    }

    pub fn from_dto(dto: &PathRequestDto) -> Self {
        Self {
            request_id: RequestId::new(dto.request_id.clone()),
            source: ElementId::new(dto.source.clone()),
            destination: ElementId::new(dto.destination.clone()),
            include: dto.include.iter().cloned().map(ElementId::new).collect(),
            exclude: dto.exclude.iter().cloned().map(ElementId::new).collect(),
            spacing: dto.spacing.unwrap_or(DEFAULT_SPACING),
            nb_channel: dto.nb_channel.unwrap_or(1),
            requested_n: dto.requested_n,
            requested_m: dto.requested_m,
        }
    }

    /// Half-width in grid cells needed by the channels of this request.
    ///
    /// # Returns
    /// `SpectrumAssignmentError` for a spacing that is not a positive number or a request
    /// without channels.
    pub fn required_m(&self) -> std::result::Result<i64, BlockingReason> {
        if !self.spacing.is_finite() || self.spacing <= 0.0 {
            return Err(BlockingReason::SpectrumAssignmentError(format!("channel spacing {} Hz is not positive", self.spacing)));
        }
        if self.nb_channel == 0 {
            return Err(BlockingReason::SpectrumAssignmentError("request carries no channel".to_string()));
        }

        Ok(required_m(self.spacing, self.nb_channel))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum DisjointnessKind {
    /// No shared directed link.
    LinkDisjoint,
    /// No shared switch other than a common add/drop switch, and no shared directed link.
    NodeDisjoint,
}

impl DisjointnessKind {
    pub fn from_type_str(typ: &str) -> Option<Self> {
        match typ.to_ascii_lowercase().as_str() {
            "link" | "link-disjoint" => Some(DisjointnessKind::LinkDisjoint),
            "node" | "node-disjoint" | "srlg" => Some(DisjointnessKind::NodeDisjoint),
            _ => None,
        }
    }
}

/// Requests that must not share links (or nodes) with each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisjunctionGroup {
    pub group_id: DisjunctionId,
    pub kind: DisjointnessKind,
    pub members: Vec<RequestId>,
}

impl DisjunctionGroup {
    pub fn new(group_id: impl Into<String>, kind: DisjointnessKind, members: &[&str]) -> Self {
        Self { group_id: DisjunctionId::new(group_id), kind, members: members.iter().map(|m| RequestId::new(*m)).collect() }
    }

    pub fn from_dto(dto: &DisjunctionDto) -> Result<Self> {
        let kind = DisjointnessKind::from_type_str(&dto.disjunction_type).ok_or_else(|| {
            Error::InvalidConfiguration(format!("Disjunction {} has unknown type '{}'.", dto.disjunction_id, dto.disjunction_type))
        })?;

        Ok(Self {
            group_id: DisjunctionId::new(dto.disjunction_id.clone()),
            kind,
            members: dto.request_ids.iter().cloned().map(RequestId::new).collect(),
        })
    }
}
