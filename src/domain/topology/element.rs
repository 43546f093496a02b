use serde::Serialize;
use std::fmt;

use crate::api::topology_dto::{ElementDto, ElementParamsDto};
use crate::domain::utils::id::{ElementId, OmsId};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementKind {
    Transceiver,
    /// Switching node. OMS boundaries sit on these.
    Roadm,
    Edfa,
    Fiber,
    /// Passive attenuator.
    Fused,
}

impl ElementKind {
    pub fn from_type_str(typ: &str) -> Option<Self> {
        match typ {
            "Transceiver" => Some(ElementKind::Transceiver),
            "Roadm" => Some(ElementKind::Roadm),
            "Edfa" | "Amplifier" => Some(ElementKind::Edfa),
            "Fiber" | "RamanFiber" => Some(ElementKind::Fiber),
            "Fused" => Some(ElementKind::Fused),
            _ => None,
        }
    }

    pub fn is_switch(&self) -> bool {
        matches!(self, ElementKind::Roadm)
    }

    /// Elements that carry both directions of traffic and are therefore their own
    /// reverse counterpart.
    pub fn is_bidirectional(&self) -> bool {
        matches!(self, ElementKind::Roadm | ElementKind::Transceiver)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::Transceiver => "Transceiver",
            ElementKind::Roadm => "Roadm",
            ElementKind::Edfa => "Edfa",
            ElementKind::Fiber => "Fiber",
            ElementKind::Fused => "Fused",
        };
        write!(f, "{}", name)
    }
}

/// Scalar equipment parameters. Not interpreted by the planner.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ElementParams {
    pub gain: Option<f64>,
    pub loss: Option<f64>,
    pub length: Option<f64>,
}

impl From<&ElementParamsDto> for ElementParams {
    fn from(dto: &ElementParamsDto) -> Self {
        Self { gain: dto.gain, loss: dto.loss, length: dto.length }
    }
}

/// Back-reference from an interior element to the OMS that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OmsRef {
    pub oms_id: OmsId,
    /// Index of the element in the OMS element list.
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    pub params: ElementParams,

    /// Set by the OMS partitioner for interior elements only.
    pub oms: Option<OmsRef>,
}

impl Element {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        Self { id, kind, params: ElementParams::default(), oms: None }
    }

    pub fn from_dto(dto: &ElementDto) -> Result<Self> {
        let kind = ElementKind::from_type_str(&dto.typ)
            .ok_or_else(|| Error::TopologyError(format!("Element {} has unknown type '{}'.", dto.uid, dto.typ)))?;

        let params = dto.params.as_ref().map(ElementParams::from).unwrap_or_default();

        Ok(Self { id: ElementId::new(dto.uid.clone()), kind, params, oms: None })
    }

    pub fn is_switch(&self) -> bool {
        self.kind.is_switch()
    }
}
